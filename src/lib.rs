//! Streaming ADIF log reading, deduplication, and rewriting.
//!
//! # Examples
//!
//! Reading records, with the header probed on the first pull:
//! ```
//! use adiflog::reader::{RecordSource, adif::AdifReader};
//!
//! let input = "<ADIF_VER:5>3.1.0<EOH>\n<call:4>W1AW<band:3>20m<eor>\n";
//! let mut reader = AdifReader::new(input.as_bytes());
//! let record = reader.next_record().expect("read").expect("one record");
//! assert_eq!(record.get("CALL").unwrap(), b"W1AW");
//! assert_eq!(reader.version(), Some("3.1.0"));
//! assert!(reader.next_record().expect("read").is_none());
//! ```
//!
//! Dropping duplicates and writing the result back out:
//! ```
//! use adiflog::{
//!     reader::{RecordSource, adif::AdifReader, dedupe::DedupeReader},
//!     registry::FieldRegistry,
//!     writer::Writer,
//! };
//!
//! let input = "<call:4>W1AW<eor><call:4>W1AW<eor>";
//! let registry = FieldRegistry::adif();
//! let mut reader = DedupeReader::new(AdifReader::new(input.as_bytes()));
//! let mut writer = Writer::new(Vec::new(), &registry);
//! while let Some(record) = reader.next_record().expect("read") {
//!     writer.write_record(&record).expect("write");
//! }
//! let out = writer.into_inner().expect("flush");
//! assert_eq!(out, b"<call:4>W1AW<eor>\n");
//! ```
#![deny(missing_docs)]

/// Read → dedupe → write pipeline.
pub mod convert;
/// Tokenizer and element types.
pub mod core;
/// Record readers and the duplicate filter.
pub mod reader;
/// Contact record model.
pub mod record;
/// Field order and type metadata.
pub mod registry;
/// Shared tag names and data types.
pub mod types;
/// ADIF writer.
pub mod writer;
