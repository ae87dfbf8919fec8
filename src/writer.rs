//! ADIF output.

use std::io::{self, BufWriter, Write};

use thiserror::Error;

use crate::{
    record::Record,
    registry::FieldRegistry,
    types::{END_OF_HEADER, END_OF_RECORD},
};

/// Writer failures.
#[derive(Debug, Error)]
pub enum WriteError {
    /// A header comment was requested after records were written.
    #[error("output already started")]
    AlreadyStarted,
    /// Sink failed.
    #[error("write failed: {0}")]
    Io(#[from] io::Error),
}

/// Buffered record writer. Field order comes from the borrowed registry.
pub struct Writer<'r, W: Write> {
    sink: BufWriter<W>,
    registry: &'r FieldRegistry,
    written: usize,
}

impl<'r, W: Write> Writer<'r, W> {
    /// Wraps `sink`; nothing is written until the first call.
    pub fn new(sink: W, registry: &'r FieldRegistry) -> Self {
        Self {
            sink: BufWriter::new(sink),
            registry,
            written: 0,
        }
    }

    /// Writes `comment` followed by `<eoh>`. Must precede every record.
    pub fn set_comment(&mut self, comment: &str) -> Result<(), WriteError> {
        if self.written > 0 {
            return Err(WriteError::AlreadyStarted);
        }
        self.sink.write_all(comment.as_bytes())?;
        write_marker(&mut self.sink, END_OF_HEADER)?;
        Ok(())
    }

    /// Writes one record followed by `<eor>` and a newline.
    pub fn write_record(&mut self, record: &Record) -> Result<(), WriteError> {
        self.sink.write_all(&record.serialize(self.registry))?;
        write_marker(&mut self.sink, END_OF_RECORD)?;
        self.written += 1;
        Ok(())
    }

    /// Pushes buffered bytes through to the sink.
    pub fn flush(&mut self) -> Result<(), WriteError> {
        self.sink.flush()?;
        Ok(())
    }

    /// Records written so far.
    pub fn records_written(&self) -> usize {
        self.written
    }

    /// Flushes and returns the sink.
    pub fn into_inner(self) -> Result<W, WriteError> {
        self.sink
            .into_inner()
            .map_err(|err| WriteError::Io(err.into_error()))
    }
}

fn write_marker(sink: &mut impl Write, name: &str) -> io::Result<()> {
    sink.write_all(b"<")?;
    sink.write_all(name.as_bytes())?;
    sink.write_all(b">\n")
}
