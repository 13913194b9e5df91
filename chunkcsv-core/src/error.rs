//! Error taxonomy for the chunked parser.
//!
//! Malformed numbers never leave the decoder: they are reported as
//! [`MalformedNumber`] internally and replaced by the configured sentinel.
//! Everything else surfaces as a [`ParseError`] carrying absolute stream
//! offsets so a caller can log it and [`resync`](crate::ChunkParser::resync).

use thiserror::Error;

use crate::config::ConfigError;
use crate::schema::SchemaError;

/// A numeric field could not be decoded.
///
/// Absorbed by [`FieldDecoder`](crate::FieldDecoder); callers of the
/// parser never see it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("malformed number")]
pub struct MalformedNumber;

/// What went wrong while tokenizing a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A byte other than whitespace, a separator or a newline followed a
    /// closing quote.
    UnexpectedCharacter { byte: u8 },
    /// The record has more fields than the schema has columns.
    TooManyColumns { expected: usize },
    /// The record ended before every column was seen.
    PartialRecord { seen: usize, expected: usize },
    /// The field in progress needs a third resident chunk.
    BoundaryOverrun,
    /// `supply` was called while two unconsumed chunks are resident.
    Backpressure,
}

impl ErrorKind {
    /// Get a human-readable message for this error kind.
    pub fn message(self) -> &'static str {
        match self {
            Self::UnexpectedCharacter { .. } => "unexpected character after closing quote",
            Self::TooManyColumns { .. } => "too many columns",
            Self::PartialRecord { .. } => "partial record",
            Self::BoundaryOverrun => "field spans more than two resident chunks",
            Self::Backpressure => "two chunks already resident and unconsumed",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Self::UnexpectedCharacter { byte } => {
                write!(f, "{} ({:?})", self.message(), byte as char)
            }
            Self::TooManyColumns { expected } => {
                write!(f, "{} (schema has {})", self.message(), expected)
            }
            Self::PartialRecord { seen, expected } => {
                write!(f, "{} with {} of {} columns", self.message(), seen, expected)
            }
            Self::BoundaryOverrun | Self::Backpressure => f.write_str(self.message()),
        }
    }
}

/// A surfaced parse failure with its position in the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{kind} at byte {offset} (record starts at byte {record_start})")]
pub struct ParseError {
    pub kind: ErrorKind,
    /// Absolute stream offset of the first byte of the failing record.
    pub record_start: u64,
    /// Absolute stream offset of the byte that triggered the failure.
    pub offset: u64,
}

impl ParseError {
    pub fn new(kind: ErrorKind, record_start: u64, offset: u64) -> Self {
        Self { kind, record_start, offset }
    }
}

/// Failure while constructing a parser.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
}
