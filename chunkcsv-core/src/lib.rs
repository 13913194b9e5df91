//! chunkcsv core parser
//!
//! Delimited-text parser for input that arrives as independently sized
//! chunks. Records and quoted values may straddle a chunk boundary; the
//! parser keeps at most two chunks resident and decodes typed fields
//! (integer, float, double, string) straight from the raw bytes.
//!
//! # Architecture
//!
//! - **window.rs** - Two-chunk byte window with one logical index space
//! - **state.rs** - Tokenizer states, byte classes, field cursor
//! - **parser.rs** - Record state machine and record policy
//! - **decimal.rs** / **decode.rs** - Allocation-free numeric decoding
//! - **schema.rs** / **sink.rs** / **value.rs** - Column schema and row sinks
//! - **view.rs** - Borrowed field bytes, possibly split in two
//!
//! # Example
//!
//! ```
//! use chunkcsv_core::{Advance, ChunkParser, IndexedRow, ParserConfig, Schema, Value};
//!
//! let schema = Schema::parse("id:int, name:string, score:double").unwrap();
//! let mut parser = ChunkParser::new(schema, IndexedRow::<Value>::new(), ParserConfig::default()).unwrap();
//!
//! let mut rows = Vec::new();
//! for chunk in ["1,\"Ada", " L\",9", "9.5\n2,Bob,", "7\n"] {
//!     parser.supply(chunk.as_bytes().to_vec()).unwrap();
//!     while parser.next_record().unwrap() == Advance::Record {
//!         rows.push(parser.sink().to_vec());
//!     }
//! }
//! assert_eq!(rows[0][1], Value::from("Ada L"));
//! assert_eq!(rows[1][2], Value::Double(7.0));
//! ```
//!
//! Text fields map each byte to the code point of the same value, so
//! UTF-8 input with non-ASCII characters is not decoded as UTF-8.

pub mod config;
pub mod decimal;
pub mod decode;
pub mod error;
pub mod parser;
pub mod schema;
pub mod sink;
pub mod state;
pub mod value;
pub mod view;
pub mod window;

pub use config::{ConfigError, ParserConfig};
pub use decimal::{DecimalScratch, MAX_DIGITS};
pub use decode::{parse_int, parse_real, FieldDecoder};
pub use error::{ErrorKind, MalformedNumber, ParseError, SetupError};
pub use parser::{Advance, ChunkParser, FeedResult};
pub use schema::{Column, ColumnType, Schema, SchemaError};
pub use sink::{IndexedRow, NamedRecord, NamedRow, RowSink, Slot};
pub use state::{ByteClass, ParseState};
pub use value::Value;
pub use view::FieldView;
pub use window::{Backpressure, ByteWindow};
