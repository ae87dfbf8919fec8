//! Contact record: a bag of lowercase field names mapped to raw values.

use std::{borrow::Cow, collections::BTreeMap, io};

use hashbrown::HashMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer, ser::SerializeMap};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::{
    core::tokenizer::{MalformedTag, TokenError, Tokenizer},
    registry::FieldRegistry,
    types::END_OF_RECORD,
};

/// Identity fields hashed by [`Record::fingerprint`], in hashing order.
pub const FINGERPRINT_FIELDS: [&str; 8] = [
    "call",
    "station_callsign",
    "band",
    "freq",
    "mode",
    "qso_date",
    "time_on",
    "time_off",
];

const FINGERPRINT_SEPARATOR: u8 = b'|';

/// Record access and parse failures.
#[derive(Debug, Error)]
pub enum RecordError {
    /// Requested field is not set.
    #[error("no such field: {0}")]
    NoSuchField(String),
    /// Record content was empty or whitespace only.
    #[error("no data to parse")]
    EmptyInput,
    /// Record content contained a malformed tag.
    #[error(transparent)]
    Malformed(#[from] MalformedTag),
    /// Reading the record content failed.
    #[error("read failed: {0}")]
    Io(#[from] io::Error),
}

/// One contact entry.
///
/// Values are kept as the exact bytes found on the wire; nothing is
/// validated or converted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    values: HashMap<String, Vec<u8>>,
}

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses record content such as `<call:4>W1AW<band:3>20m`.
    ///
    /// Stops at the first `<eor>`; anything after it is ignored.
    pub fn parse(buf: &[u8]) -> Result<Self, RecordError> {
        if buf.iter().all(u8::is_ascii_whitespace) {
            return Err(RecordError::EmptyInput);
        }

        let mut tokens = Tokenizer::new(buf);
        let mut record = Self::new();
        loop {
            match tokens.next_element() {
                Ok(Some(el)) => match el.value {
                    Some(value) => {
                        record.values.insert(el.name, value);
                    }
                    None if el.name == END_OF_RECORD => break,
                    None => {}
                },
                Ok(None) | Err(TokenError::Truncated) => break,
                Err(TokenError::Malformed(err)) => return Err(err.into()),
                Err(TokenError::Io(err)) => return Err(err.into()),
            }
        }
        Ok(record)
    }

    /// Returns the raw value of `name` (any case).
    pub fn get(&self, name: &str) -> Result<&[u8], RecordError> {
        self.values
            .get(normalize(name).as_ref())
            .map(Vec::as_slice)
            .ok_or_else(|| RecordError::NoSuchField(name.to_ascii_lowercase()))
    }

    /// Returns the value of `name` as text, replacing invalid UTF-8.
    pub fn get_str(&self, name: &str) -> Result<Cow<'_, str>, RecordError> {
        self.get(name).map(String::from_utf8_lossy)
    }

    /// Sets `name` (any case) to `value`, replacing any previous value.
    pub fn set(&mut self, name: &str, value: impl Into<Vec<u8>>) {
        self.values.insert(normalize(name).into_owned(), value.into());
    }

    /// Removes `name` and returns its value.
    pub fn delete(&mut self, name: &str) -> Result<Vec<u8>, RecordError> {
        self.values
            .remove(normalize(name).as_ref())
            .ok_or_else(|| RecordError::NoSuchField(name.to_ascii_lowercase()))
    }

    /// Names of all populated fields, in no particular order.
    pub fn fields(&self) -> Vec<&str> {
        self.values.keys().map(String::as_str).collect()
    }

    /// True when `name` (any case) is set.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(normalize(name).as_ref())
    }

    /// Number of populated fields.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Encodes the record body (without `<eor>`).
    ///
    /// Registry fields come first in registry order, then custom fields
    /// sorted by name.
    pub fn serialize(&self, registry: &FieldRegistry) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.values.len() * 24);
        for name in registry.names() {
            if let Some(value) = self.values.get(name) {
                encode_field(&mut out, name, value);
            }
        }

        let mut custom: Vec<(&String, &Vec<u8>)> = self
            .values
            .iter()
            .filter(|(name, _)| !registry.is_standard(name))
            .collect();
        custom.sort_unstable_by(|a, b| a.0.cmp(b.0));
        for (name, value) in custom {
            encode_field(&mut out, name, value);
        }
        out
    }

    /// Lowercase hex SHA-256 over the identity fields that are present.
    ///
    /// Absent fields are skipped, so a record with none of them hashes the
    /// empty string.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        let mut first = true;
        for name in FINGERPRINT_FIELDS {
            if let Some(value) = self.values.get(name) {
                if !first {
                    hasher.update([FINGERPRINT_SEPARATOR]);
                }
                hasher.update(value);
                first = false;
            }
        }
        hex::encode(hasher.finalize())
    }

    pub(crate) fn insert_normalized(&mut self, name: String, value: Vec<u8>) {
        self.values.insert(name, value);
    }
}

fn normalize(name: &str) -> Cow<'_, str> {
    if name.bytes().any(|b| b.is_ascii_uppercase()) {
        Cow::Owned(name.to_ascii_lowercase())
    } else {
        Cow::Borrowed(name)
    }
}

fn encode_field(out: &mut Vec<u8>, name: &str, value: &[u8]) {
    out.push(b'<');
    out.extend_from_slice(name.as_bytes());
    out.push(b':');
    out.extend_from_slice(value.len().to_string().as_bytes());
    out.push(b'>');
    out.extend_from_slice(value);
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut names: Vec<&String> = self.values.keys().collect();
        names.sort_unstable();
        let mut map = serializer.serialize_map(Some(names.len()))?;
        for name in names {
            map.serialize_entry(name, &String::from_utf8_lossy(&self.values[name]))?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, String>::deserialize(deserializer)?;
        let mut record = Self::new();
        for (name, value) in raw {
            record.set(&name, value);
        }
        Ok(record)
    }
}
