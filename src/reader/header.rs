use std::{io::BufRead, mem};

use tracing::{debug, warn};

use crate::{
    core::tokenizer::{TokenError, Tokenizer},
    record::Record,
    types::{ADIF_VERSION, DEFAULT_VERSION, END_OF_HEADER, END_OF_RECORD, LOTW_EOF},
};

use super::ReadError;

/// Header block as seen at the start of a stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// True when an `<eoh>` marker was found.
    pub present: bool,
    /// Declared `adif_ver`, or [`DEFAULT_VERSION`].
    pub version: String,
    /// Every valued field found in the header, `adif_ver` included.
    pub fields: Record,
}

impl Header {
    fn absent() -> Self {
        Self::from_fields(false, Record::new())
    }

    fn from_fields(present: bool, fields: Record) -> Self {
        let version = fields
            .get_str(ADIF_VERSION)
            .map(|v| v.trim().to_string())
            .unwrap_or_else(|_| DEFAULT_VERSION.to_string());
        Self {
            present,
            version,
            fields,
        }
    }
}

impl Default for Header {
    fn default() -> Self {
        Self::absent()
    }
}

/// What the probe found.
pub(crate) struct ProbeOutcome {
    pub header: Header,
    /// Fields pulled before an `<eor>` when the stream had no header.
    pub first: Option<Record>,
    /// The stream ended during the probe.
    pub ended: bool,
}

impl ProbeOutcome {
    fn ended(header: Header) -> Self {
        Self {
            header,
            first: None,
            ended: true,
        }
    }
}

/// Header detection that can be resumed after a malformed tag.
///
/// A stream that opens with free text is a header preamble; one that opens
/// with a tag is ambiguous until either `<eoh>` or `<eor>` shows up, so the
/// fields seen up to that point are held back and assigned to whichever
/// block turns out to own them. A malformed tag in the ambiguous case is
/// reported, but the probe stays open: the held-back fields still go to the
/// header on `<eoh>`, and are dropped with the aborted record on `<eor>`.
#[derive(Debug, Default)]
pub(crate) struct HeaderProbe {
    preamble: Option<bool>,
    fields: Record,
    aborted: bool,
}

impl HeaderProbe {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Pulls elements until the header question is settled.
    pub(crate) fn resume<R: BufRead>(
        &mut self,
        tokens: &mut Tokenizer<R>,
    ) -> Result<ProbeOutcome, ReadError> {
        let preamble = match self.preamble {
            Some(preamble) => preamble,
            None => {
                let preamble = match tokens.peek_significant() {
                    Ok(Some(lead)) => lead != b'<',
                    Ok(None) | Err(TokenError::Truncated) => {
                        return Ok(ProbeOutcome::ended(Header::absent()));
                    }
                    Err(TokenError::Io(err)) => return Err(err.into()),
                    Err(TokenError::Malformed(err)) => return Err(err.into()),
                };
                self.preamble = Some(preamble);
                preamble
            }
        };

        loop {
            match tokens.next_element() {
                Ok(Some(el)) => match el.value {
                    Some(value) => self.fields.insert_normalized(el.name, value),
                    None if el.name == END_OF_HEADER => {
                        let header = Header::from_fields(true, mem::take(&mut self.fields));
                        debug!(version = %header.version, "read header");
                        return Ok(ProbeOutcome {
                            header,
                            first: None,
                            ended: false,
                        });
                    }
                    None if el.name == END_OF_RECORD => {
                        let fields = mem::take(&mut self.fields);
                        let first = if self.aborted {
                            debug!(
                                dropped_fields = fields.len(),
                                "no header, dropping first record after malformed tag"
                            );
                            None
                        } else {
                            debug!(preamble, "no header, first record already complete");
                            (!fields.is_empty()).then_some(fields)
                        };
                        return Ok(ProbeOutcome {
                            header: Header::absent(),
                            first,
                            ended: false,
                        });
                    }
                    None if el.name == LOTW_EOF => {
                        return Ok(ProbeOutcome::ended(Header::absent()));
                    }
                    None => {}
                },
                Ok(None) | Err(TokenError::Truncated) => {
                    debug!(preamble, "input ended before header or first record closed");
                    return Ok(ProbeOutcome::ended(Header::absent()));
                }
                Err(TokenError::Malformed(err)) if preamble => {
                    debug!(%err, "skipping malformed tag in header preamble");
                }
                Err(TokenError::Malformed(err)) => {
                    warn!(%err, "malformed tag before first <eoh> or <eor>");
                    self.aborted = true;
                    return Err(err.into());
                }
                Err(TokenError::Io(err)) => return Err(err.into()),
            }
        }
    }
}
