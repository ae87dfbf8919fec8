use std::io::{BufRead, BufReader, Read};

use tracing::{debug, trace, warn};

use crate::{
    core::tokenizer::{TokenError, Tokenizer},
    record::Record,
    types::{END_OF_RECORD, LOTW_EOF},
};

use super::{
    ReadError, RecordSource,
    header::{Header, HeaderProbe},
};

/// Streaming ADIF record reader.
///
/// The header is probed lazily on the first pull. Records are returned one
/// per `<eor>`. A stream that stops before the final `<eor>`, or that ends
/// with the LoTW `<app_lotw_eof>` marker, simply reports end-of-input. A
/// bare `<eor>` with no fields before it is skipped rather than returned as
/// an empty record.
pub struct AdifReader<R> {
    tokens: Tokenizer<R>,
    header: Option<Header>,
    probe: Option<HeaderProbe>,
    pending: Option<Record>,
    finished: bool,
    records: usize,
}

impl<R: Read> AdifReader<BufReader<R>> {
    /// Reads from an unbuffered source.
    pub fn new(src: R) -> Self {
        Self::from_buf_read(BufReader::new(src))
    }
}

impl<R: BufRead> AdifReader<R> {
    /// Reads from an already buffered source.
    pub fn from_buf_read(src: R) -> Self {
        Self {
            tokens: Tokenizer::new(src),
            header: None,
            probe: None,
            pending: None,
            finished: false,
            records: 0,
        }
    }

    /// Header, once the first pull has settled it.
    pub fn header(&self) -> Option<&Header> {
        self.header.as_ref()
    }

    /// Declared format version, once the header is settled.
    pub fn version(&self) -> Option<&str> {
        self.header.as_ref().map(|h| h.version.as_str())
    }

    fn ensure_header(&mut self) -> Result<(), ReadError> {
        if self.header.is_some() {
            return Ok(());
        }
        let probe = self.probe.get_or_insert_with(HeaderProbe::new);
        let outcome = probe.resume(&mut self.tokens)?;
        self.probe = None;
        self.header = Some(outcome.header);
        self.pending = outcome.first;
        self.finished = outcome.ended;
        Ok(())
    }

    fn finish(&mut self, partial: &Record, why: &str) -> Result<Option<Record>, ReadError> {
        if !partial.is_empty() {
            debug!(fields = partial.len(), why, "dropping unterminated trailing record");
        }
        self.finished = true;
        Ok(None)
    }
}

impl<R: BufRead> RecordSource for AdifReader<R> {
    fn next_record(&mut self) -> Result<Option<Record>, ReadError> {
        self.ensure_header()?;
        if let Some(record) = self.pending.take() {
            self.records += 1;
            return Ok(Some(record));
        }
        if self.finished {
            return Ok(None);
        }

        let mut record = Record::new();
        loop {
            match self.tokens.next_element() {
                Ok(Some(el)) => match el.value {
                    Some(value) => record.insert_normalized(el.name, value),
                    None if el.name == END_OF_RECORD => {
                        if record.is_empty() {
                            trace!("skipping empty record");
                            continue;
                        }
                        self.records += 1;
                        return Ok(Some(record));
                    }
                    None if el.name == LOTW_EOF => return self.finish(&record, "lotw eof marker"),
                    None => trace!(tag = %el.name, "ignoring bare tag inside record"),
                },
                Ok(None) => return self.finish(&record, "end of input"),
                Err(TokenError::Truncated) => return self.finish(&record, "truncated tag or value"),
                Err(TokenError::Malformed(err)) => {
                    warn!(%err, dropped_fields = record.len(), "malformed tag");
                    return Err(err.into());
                }
                Err(TokenError::Io(err)) => return Err(err.into()),
            }
        }
    }

    fn record_count(&self) -> usize {
        self.records
    }
}
