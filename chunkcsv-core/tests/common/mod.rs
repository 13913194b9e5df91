//! Test infrastructure for chunkcsv
//!
//! Provides stochastic document generation and a chunk-driving harness.

#![allow(dead_code)]

mod generators;

pub use generators::{Gen, MAX_FIELD};

use chunkcsv_core::{
    Advance, ChunkParser, ErrorKind, IndexedRow, ParseError, ParserConfig, Schema, Value,
};

/// Everything a run produced.
#[derive(Debug, Default, PartialEq)]
pub struct Outcome {
    pub rows: Vec<Vec<Value>>,
    pub errors: Vec<ErrorKind>,
    /// Bytes `close` reported as discarded
    pub discarded: u64,
}

pub fn parser(decl: &str, config: ParserConfig) -> ChunkParser<IndexedRow<Value>> {
    ChunkParser::new(Schema::parse(decl).unwrap(), IndexedRow::new(), config).unwrap()
}

/// Drain complete records; on error record it, resync and carry on.
pub fn drain(p: &mut ChunkParser<IndexedRow<Value>>, out: &mut Outcome) {
    loop {
        match p.next_record() {
            Ok(Advance::Record) => out.rows.push(p.sink().to_vec()),
            Ok(Advance::NeedData) => return,
            Err(ParseError { kind, .. }) => {
                out.errors.push(kind);
                p.resync();
            }
        }
    }
}

/// Feed `chunks` one at a time, draining after each, then close.
pub fn run<C: AsRef<[u8]>>(decl: &str, config: ParserConfig, chunks: &[C]) -> Outcome {
    let mut p = parser(decl, config);
    let mut out = Outcome::default();
    for chunk in chunks {
        p.supply(chunk.as_ref().to_vec()).unwrap();
        drain(&mut p, &mut out);
    }
    out.discarded = p.close();
    out
}

/// Parse `input` as a single chunk.
pub fn run_whole(decl: &str, config: ParserConfig, input: &[u8]) -> Outcome {
    run(decl, config, &[input])
}

pub fn ints(values: &[i64]) -> Vec<Value> {
    values.iter().map(|&v| Value::Int(v)).collect()
}

pub fn doubles(values: &[f64]) -> Vec<Value> {
    values.iter().map(|&v| Value::Double(v)).collect()
}

pub fn strs(values: &[&str]) -> Vec<Value> {
    values.iter().map(|&v| Value::from(v)).collect()
}
