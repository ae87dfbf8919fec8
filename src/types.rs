//! Shared tag names and the ADIF data-type enum.

use serde::{Deserialize, Serialize};

/// Bare tag closing a record.
pub const END_OF_RECORD: &str = "eor";
/// Bare tag closing the header block.
pub const END_OF_HEADER: &str = "eoh";
/// Header field declaring the format version.
pub const ADIF_VERSION: &str = "adif_ver";
/// Non-standard bare tag some LoTW exports append after the last record.
pub const LOTW_EOF: &str = "app_lotw_eof";
/// Version reported when the header does not declare one.
pub const DEFAULT_VERSION: &str = "2";

/// Declared type of a field value.
///
/// Informational only: values are never coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// `Y`/`N` flag.
    Boolean,
    /// Decimal number.
    Number,
    /// Free text.
    #[default]
    String,
    /// `YYYYMMDD` date.
    Date,
    /// `HHMM` or `HHMMSS` time.
    Time,
    /// Latitude/longitude in `XDDD MM.MMM` form.
    Location,
}

impl DataType {
    /// Maps a wire type code (`<name:len:T>`) to its data type.
    pub fn from_type_code(code: char) -> Option<Self> {
        match code.to_ascii_uppercase() {
            'A' | 'S' | 'M' => Some(Self::String),
            'B' => Some(Self::Boolean),
            'N' => Some(Self::Number),
            'D' => Some(Self::Date),
            'T' => Some(Self::Time),
            'L' => Some(Self::Location),
            _ => None,
        }
    }
}
