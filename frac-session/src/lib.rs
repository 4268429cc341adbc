//! Persistence and replay of fractal generation sessions.
//!
//! A session file is line-oriented UTF-8 text: one delimited header block carrying the
//! generation parameters, followed by zero or more expression records, each holding a sequence
//! number and the rendered (expression, derivative) pair for one generation cycle. The payload
//! text is opaque to this crate: it stores and returns exactly what the renderer produced,
//! byte for byte, which is what makes bit-exact replay possible.
//!
//! Reading is strict. A missing delimiter, an unrecognized or repeated header key, a record
//! missing one of its fields, or a truncated block all abort the parse with an error that
//! identifies the offending line; no partial result is ever returned.
//!
//! ```
//! use frac_session::{SessionHeader, SessionReader, SessionWriter};
//!
//! let mut writer = SessionWriter::new(Vec::new());
//! writer.write_header(&SessionHeader::default()).unwrap();
//! writer.write_record(0, "sin(Pt)", "(cos(Pt) * 1.0)").unwrap();
//!
//! let src = String::from_utf8(writer.into_inner()).unwrap();
//! let mut reader = SessionReader::new(&src);
//! let header = reader.read_header().unwrap();
//! let records = reader.read_records().unwrap();
//! assert_eq!(header, SessionHeader::default());
//! assert_eq!(records[0].expr, "sin(Pt)");
//! ```

pub mod error;
pub mod header;
pub mod reader;
pub mod record;
pub mod writer;

pub use header::{SessionHeader, HEADER_DELIMITER, KEYS, RECORD_DELIMITER};
pub use reader::SessionReader;
pub use record::SessionRecord;
pub use writer::SessionWriter;
