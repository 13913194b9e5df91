//! Property-based tests for the chunked parser
//!
//! These tests verify invariants that must hold for ANY input and ANY way
//! of cutting it into chunks. proptest generates the inputs and shrinks
//! failures to minimal cases.

mod common;

use chunkcsv_core::ParserConfig;
use common::{run, run_whole, MAX_FIELD};
use proptest::prelude::*;

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: 200,
        max_shrink_iters: 200,
        ..ProptestConfig::default()
    }
}

// =============================================================================
// Generators
// =============================================================================

/// Parser settings worth mixing into arbitrary input.
fn gen_parser_config() -> impl Strategy<Value = ParserConfig> {
    (
        prop::sample::select(vec![b',', b';', b' ', b'\t']),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(sep, trim, collapse, partial, header, extra)| {
            ParserConfig::default()
                .with_separator(sep)
                .with_trim_spaces(trim)
                .with_collapse_separators(collapse)
                .with_tolerate_partial(partial)
                .with_parse_header(header)
                .with_ignore_extra_columns(extra)
        })
}

/// A field rendered as CSV, never longer than `MAX_FIELD` bytes.
fn gen_field() -> impl Strategy<Value = String> {
    prop_oneof![
        (-99_999i64..99_999).prop_map(|v| v.to_string()),
        (-999i32..999, 0u32..1000).prop_map(|(i, f)| format!("{i}.{f}")),
        "[a-z ]{0,4}".prop_map(|s| if s.is_empty() { "\"\"".to_string() } else { s }),
        "[a-z ,\"\r\n]{0,4}".prop_map(|s| format!("\"{}\"", s.replace('"', "\"\""))),
    ]
}

/// A well-formed document: `rows` records of exactly `cols` fields.
fn gen_document() -> impl Strategy<Value = (String, Vec<u8>)> {
    (1usize..5).prop_flat_map(|cols| {
        let record = prop::collection::vec(gen_field(), cols);
        let ending = prop::sample::select(vec!["\n", "\r\n", "\n\n"]);
        let decl = vec!["string"; cols].join(",");
        prop::collection::vec((record, ending), 0..20).prop_map(move |records| {
            let mut doc = Vec::new();
            for (fields, ending) in records {
                doc.extend(fields.join(",").into_bytes());
                doc.extend(ending.as_bytes());
            }
            (decl.clone(), doc)
        })
    })
}

/// Cut `input` into pieces whose sizes cycle through `sizes`.
fn cut(input: &[u8], sizes: &[usize]) -> Vec<Vec<u8>> {
    let mut pieces = Vec::new();
    let mut rest = input;
    for &n in sizes.iter().cycle() {
        if rest.is_empty() {
            break;
        }
        let n = n.min(rest.len());
        pieces.push(rest[..n].to_vec());
        rest = &rest[n..];
    }
    pieces
}

// =============================================================================
// Property: Parser Never Panics
// =============================================================================

proptest! {
    #![proptest_config(config())]

    /// Any bytes, any settings, any chunking: errors are fine, panics are not.
    #[test]
    fn parser_never_panics(
        input in prop::collection::vec(any::<u8>(), 0..600),
        sizes in prop::collection::vec(1usize..64, 1..8),
        parser_config in gen_parser_config(),
    ) {
        let _ = run("int,double,string,float", parser_config, &cut(&input, &sizes));
    }

    /// Same, biased toward the bytes the tokenizer cares about.
    #[test]
    fn parser_never_panics_csvish(
        input in "[0-9a-z,; \t\"\r\n.eE+-]{0,400}",
        sizes in prop::collection::vec(1usize..32, 1..8),
        parser_config in gen_parser_config(),
    ) {
        let _ = run("int,double,string", parser_config, &cut(input.as_bytes(), &sizes));
    }
}

// =============================================================================
// Property: Chunk-Split Invariance
// =============================================================================

proptest! {
    #![proptest_config(config())]

    /// Well-formed input yields the same rows however it is cut, as long as
    /// no field needs more than two chunks.
    #[test]
    fn split_matches_whole(
        (decl, input) in gen_document(),
        sizes in prop::collection::vec((MAX_FIELD + 4)..48, 1..6),
    ) {
        let whole = run_whole(&decl, ParserConfig::default(), &input);
        prop_assert!(whole.errors.is_empty(), "{:?}", whole.errors);
        prop_assert_eq!(whole.discarded, 0);

        let split = run(&decl, ParserConfig::default(), &cut(&input, &sizes));
        prop_assert_eq!(split, whole);
    }

    /// Any two-way cut of newline-terminated input behaves like one chunk,
    /// errors included.
    #[test]
    fn two_way_split_matches_whole(
        input in "[0-9a-c,\" \r\n]{0,200}",
        at in any::<prop::sample::Index>(),
        parser_config in gen_parser_config(),
    ) {
        let input = format!("{input}\n").into_bytes();
        let decl = "int,string,double";
        let whole = run_whole(decl, parser_config, &input);
        // An unterminated field at the very end would need a third chunk
        if whole.discarded == 0 {
            let (a, b) = input.split_at(at.index(input.len() + 1));
            let split = run(decl, parser_config, &[a, b]);
            prop_assert_eq!(split, whole);
        }
    }

    /// Rows never outnumber newlines.
    #[test]
    fn rows_bounded_by_newlines(input in "[0-9,\"\r\n]{0,300}") {
        let out = run_whole("int,int", ParserConfig::default().with_tolerate_partial(true), input.as_bytes());
        let newlines = input.bytes().filter(|&b| b == b'\n').count();
        prop_assert!(out.rows.len() <= newlines);
    }
}
