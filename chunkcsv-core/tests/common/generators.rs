//! Stochastic content generators for test variations
//!
//! Uses seeded RNG for reproducibility. Print seed on failure for replay.

use chunkcsv_core::{ColumnType, Value};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Longest raw field (quotes and escapes included) the generator emits.
pub const MAX_FIELD: usize = 12;

/// Seeded generator for reproducible stochastic tests
pub struct Gen {
    pub rng: StdRng,
    pub seed: u64,
}

impl Gen {
    /// Create with specific seed (for reproduction)
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Create from environment or random seed
    pub fn from_env_or_random() -> Self {
        let seed = std::env::var("CSV_TEST_SEED")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(rand::random);
        Self::new(seed)
    }

    /// Geometric distribution: count until rand > alpha
    pub fn geometric(&mut self, alpha: f64) -> usize {
        let mut n = 0;
        while self.rng.gen::<f64>() < alpha {
            n += 1;
        }
        n
    }

    /// Random boolean with probability p
    pub fn chance(&mut self, p: f64) -> bool {
        self.rng.gen::<f64>() < p
    }

    /// One of int, double, string
    pub fn column_type(&mut self) -> ColumnType {
        match self.rng.gen_range(0..3) {
            0 => ColumnType::Int,
            1 => ColumnType::Double,
            _ => ColumnType::String,
        }
    }

    /// Random integer literal and its value
    pub fn integer(&mut self) -> (Vec<u8>, i64) {
        let val: i64 = self.rng.gen_range(-99_999..99_999);
        (val.to_string().into_bytes(), val)
    }

    /// Random decimal literal and the value std parses it to
    pub fn double(&mut self) -> (Vec<u8>, f64) {
        let int: i32 = self.rng.gen_range(-999..999);
        let mut text = int.to_string();
        if self.chance(0.7) {
            let frac: u32 = self.rng.gen_range(0..1000);
            text.push_str(&format!(".{frac}"));
        }
        if self.chance(0.2) {
            let exp: i32 = self.rng.gen_range(-20..20);
            text.push_str(&format!("e{exp}"));
        }
        let value = text.parse().unwrap_or(f64::NAN);
        (text.into_bytes(), value)
    }

    /// Random text field, quoted whenever it needs to be
    pub fn text(&mut self) -> (Vec<u8>, String) {
        const CHARS: &[u8] = b"abcxyz ,\"\n\r";
        let len = self.rng.gen_range(0..=4);
        let content: Vec<u8> = (0..len)
            .map(|_| CHARS[self.rng.gen_range(0..CHARS.len())])
            .collect();
        let value: String = content.iter().map(|&b| char::from(b)).collect();

        let needs_quotes = content.is_empty()
            || content.iter().any(|b| matches!(b, b',' | b'"' | b'\n' | b'\r'))
            || self.chance(0.2);
        if !needs_quotes {
            return (content, value);
        }
        let mut raw = Vec::with_capacity(content.len() * 2 + 2);
        raw.push(b'"');
        for &b in &content {
            if b == b'"' {
                raw.push(b'"');
            }
            raw.push(b);
        }
        raw.push(b'"');
        (raw, value)
    }

    /// Field of the given type
    pub fn field(&mut self, ty: ColumnType) -> (Vec<u8>, Value) {
        match ty {
            ColumnType::Int => {
                let (raw, v) = self.integer();
                (raw, Value::Int(v))
            }
            ColumnType::Double => {
                let (raw, v) = self.double();
                (raw, Value::Double(v))
            }
            _ => {
                let (raw, v) = self.text();
                (raw, Value::Str(v))
            }
        }
    }

    /// `rows` records over `types`, with mixed line endings and the
    /// occasional blank line. Returns the bytes and the expected rows.
    pub fn document(&mut self, types: &[ColumnType], rows: usize) -> (Vec<u8>, Vec<Vec<Value>>) {
        let mut out = Vec::new();
        let mut expected = Vec::with_capacity(rows);
        for _ in 0..rows {
            let mut row = Vec::with_capacity(types.len());
            for (i, &ty) in types.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                let (raw, value) = self.field(ty);
                out.extend(raw);
                row.push(value);
            }
            out.extend(self.line_ending());
            if self.chance(0.1) {
                out.extend(self.line_ending());
            }
            expected.push(row);
        }
        (out, expected)
    }

    pub fn line_ending(&mut self) -> &'static [u8] {
        if self.chance(0.3) {
            b"\r\n"
        } else {
            b"\n"
        }
    }

    /// Cut `input` into pieces of `min..=max` bytes (the last may be shorter).
    pub fn split(&mut self, input: &[u8], min: usize, max: usize) -> Vec<Vec<u8>> {
        let mut pieces = Vec::new();
        let mut rest = input;
        while !rest.is_empty() {
            let n = self.rng.gen_range(min..=max).min(rest.len());
            pieces.push(rest[..n].to_vec());
            rest = &rest[n..];
        }
        pieces
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reproducibility() {
        let mut g1 = Gen::new(42);
        let mut g2 = Gen::new(42);
        let types = [ColumnType::Int, ColumnType::String, ColumnType::Double];
        assert_eq!(g1.document(&types, 5), g2.document(&types, 5));
    }

    #[test]
    fn test_fields_stay_short() {
        let mut gen = Gen::new(7);
        for _ in 0..1000 {
            let ty = gen.column_type();
            let (raw, _) = gen.field(ty);
            assert!(raw.len() <= MAX_FIELD, "{:?}", String::from_utf8_lossy(&raw));
        }
    }
}
