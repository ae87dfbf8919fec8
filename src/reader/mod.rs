//! Pull-based record sources.

/// Record reader over a byte stream.
pub mod adif;
/// Fingerprint-based duplicate filter.
pub mod dedupe;
/// One-shot header probe.
pub mod header;

use std::io;

use thiserror::Error;

use crate::{core::tokenizer::MalformedTag, record::Record};

/// Failures surfaced by a [`RecordSource`].
///
/// End-of-input is not an error: it is `Ok(None)` from
/// [`RecordSource::next_record`].
#[derive(Debug, Error)]
pub enum ReadError {
    /// Underlying byte source failed.
    #[error("read failed: {0}")]
    Io(#[from] io::Error),
    /// A tag could not be parsed; the record being built was dropped.
    #[error(transparent)]
    Malformed(#[from] MalformedTag),
}

/// Anything that hands out records one pull at a time.
pub trait RecordSource {
    /// Next record, `Ok(None)` once the input is exhausted.
    fn next_record(&mut self) -> Result<Option<Record>, ReadError>;

    /// Records returned so far.
    fn record_count(&self) -> usize;

    /// Wraps the source in an [`Iterator`].
    fn records(self) -> Records<Self>
    where
        Self: Sized,
    {
        Records { source: self }
    }
}

impl<S: RecordSource + ?Sized> RecordSource for &mut S {
    fn next_record(&mut self) -> Result<Option<Record>, ReadError> {
        (**self).next_record()
    }

    fn record_count(&self) -> usize {
        (**self).record_count()
    }
}

impl<S: RecordSource + ?Sized> RecordSource for Box<S> {
    fn next_record(&mut self) -> Result<Option<Record>, ReadError> {
        (**self).next_record()
    }

    fn record_count(&self) -> usize {
        (**self).record_count()
    }
}

/// Iterator adapter returned by [`RecordSource::records`].
pub struct Records<S> {
    source: S,
}

impl<S> Records<S> {
    /// Unwraps the source.
    pub fn into_inner(self) -> S {
        self.source
    }
}

impl<S: RecordSource> Iterator for Records<S> {
    type Item = Result<Record, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.source.next_record().transpose()
    }
}
