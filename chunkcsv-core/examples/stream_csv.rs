//! Parse CSV from stdin in fixed-size chunks and print each record.
//!
//! Usage: stream_csv <schema> [chunk-size] < input.csv
//!
//!   stream_csv "id:int, name:string, score:double" 4096 < scores.csv
//!
//! Set RUST_LOG=debug (or trace) to watch the window at work.

use std::io::Read;

use chunkcsv_core::{Advance, ChunkParser, IndexedRow, ParseError, ParserConfig, Schema, Value};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let decl = args.next().ok_or("usage: stream_csv <schema> [chunk-size]")?;
    let chunk_size: usize = args.next().map(|s| s.parse::<usize>()).transpose()?.unwrap_or(4096);

    let schema = Schema::parse(&decl)?;
    let mut parser = ChunkParser::new(schema, IndexedRow::<Value>::new(), ParserConfig::default())?;

    let mut stdin = std::io::stdin().lock();
    let (mut records, mut errors) = (0usize, 0usize);
    loop {
        let mut chunk = vec![0u8; chunk_size];
        let n = stdin.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        chunk.truncate(n);
        parser.supply(chunk)?;

        loop {
            match parser.next_record() {
                Ok(Advance::Record) => {
                    records += 1;
                    let row: Vec<String> = parser.sink().values().iter().map(Value::to_string).collect();
                    println!("{}", row.join("\t"));
                }
                Ok(Advance::NeedData) => break,
                Err(ParseError { kind, offset, record_start }) => {
                    errors += 1;
                    tracing::warn!(%kind, offset, record_start, "record rejected");
                    parser.resync();
                }
            }
        }
    }

    let discarded = parser.close();
    tracing::info!(records, errors, discarded, "done");
    Ok(())
}
