//! Read → dedupe → write pipeline behind the `adifdedupe` binary.

use std::io::{self, BufWriter, Read, Write};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    reader::{ReadError, RecordSource, adif::AdifReader, dedupe::DedupeReader},
    record::Record,
    registry::FieldRegistry,
    writer::{WriteError, Writer},
};

/// Pipeline failures, tagged by stage.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Input could not be read.
    #[error(transparent)]
    Read(#[from] ReadError),
    /// ADIF output could not be written.
    #[error(transparent)]
    Write(#[from] WriteError),
    /// A record could not be encoded as JSON.
    #[error("encode json: {0}")]
    Json(#[from] serde_json::Error),
    /// JSON output could not be written.
    #[error("write failed: {0}")]
    Io(#[from] io::Error),
}

/// Output encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// ADIF records, one per line.
    #[default]
    Adif,
    /// One JSON object per record.
    Jsonl,
}

/// Pipeline options.
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    /// Drop records whose fingerprint was already written.
    pub dedupe: bool,
    /// Output encoding.
    pub format: OutputFormat,
    /// Header comment; ADIF output only.
    pub comment: Option<String>,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            dedupe: true,
            format: OutputFormat::Adif,
            comment: None,
        }
    }
}

/// Counters reported after a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ConvertStats {
    /// Records parsed from the input.
    pub read: usize,
    /// Records written to the output.
    pub written: usize,
    /// Records dropped as duplicates.
    pub duplicates: usize,
}

/// Streams every record from `input` to `output`.
pub fn convert<R: Read, W: Write>(
    input: R,
    output: W,
    registry: &FieldRegistry,
    config: &ConvertConfig,
) -> Result<ConvertStats, ConvertError> {
    let reader = AdifReader::new(input);
    let stats = if config.dedupe {
        let mut source = DedupeReader::new(reader);
        let written = write_all(&mut source, output, registry, config)?;
        ConvertStats {
            read: source.inner().record_count(),
            written,
            duplicates: source.duplicates(),
        }
    } else {
        let mut source = reader;
        let written = write_all(&mut source, output, registry, config)?;
        ConvertStats {
            read: source.record_count(),
            written,
            duplicates: 0,
        }
    };
    info!(
        read = stats.read,
        written = stats.written,
        duplicates = stats.duplicates,
        "conversion finished"
    );
    Ok(stats)
}

fn write_all<S: RecordSource, W: Write>(
    source: &mut S,
    output: W,
    registry: &FieldRegistry,
    config: &ConvertConfig,
) -> Result<usize, ConvertError> {
    match config.format {
        OutputFormat::Adif => {
            let mut writer = Writer::new(output, registry);
            if let Some(comment) = &config.comment {
                writer.set_comment(comment)?;
            }
            while let Some(record) = source.next_record()? {
                writer.write_record(&record)?;
            }
            writer.flush()?;
            Ok(writer.records_written())
        }
        OutputFormat::Jsonl => {
            if config.comment.is_some() {
                warn!("header comment is ignored for jsonl output");
            }
            let mut out = BufWriter::new(output);
            let mut written = 0;
            while let Some(record) = source.next_record()? {
                write_json_line(&mut out, &record)?;
                written += 1;
            }
            out.flush()?;
            Ok(written)
        }
    }
}

fn write_json_line(out: &mut impl Write, record: &Record) -> Result<(), ConvertError> {
    serde_json::to_writer(&mut *out, record)?;
    out.write_all(b"\n")?;
    Ok(())
}
