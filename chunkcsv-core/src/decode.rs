//! Typed field decoding.
//!
//! Numbers are decoded straight from the raw bytes in one pass; no string
//! is built. Decoding never fails from the caller's point of view: a
//! malformed number becomes the configured sentinel.

use crate::config::ParserConfig;
use crate::decimal::DecimalScratch;
use crate::error::MalformedNumber;
use crate::state::is_blank;
use crate::view::FieldView;

/// Value of an alphanumeric digit: `0-9` then `a-z` / `A-Z` for 10..35.
#[inline]
pub fn digit_value(byte: u8) -> Option<u32> {
    match byte {
        b'0'..=b'9' => Some(u32::from(byte - b'0')),
        b'a'..=b'z' => Some(u32::from(byte - b'a') + 10),
        b'A'..=b'Z' => Some(u32::from(byte - b'A') + 10),
        _ => None,
    }
}

/// Parse a signed integer in `radix`, tolerating surrounding whitespace.
pub fn parse_int<I>(bytes: I, radix: u32) -> Result<i64, MalformedNumber>
where
    I: IntoIterator<Item = u8>,
{
    let mut bytes = bytes.into_iter().skip_while(|&b| is_blank(b)).peekable();
    let negative = match bytes.peek() {
        Some(b'-') => {
            bytes.next();
            true
        }
        Some(b'+') => {
            bytes.next();
            false
        }
        _ => false,
    };

    // Accumulate negatively so i64::MIN is reachable
    let mut acc: i64 = 0;
    let mut seen = false;
    while let Some(b) = bytes.next() {
        if is_blank(b) {
            if bytes.all(is_blank) {
                break;
            }
            return Err(MalformedNumber);
        }
        let digit = digit_value(b)
            .filter(|&d| d < radix)
            .ok_or(MalformedNumber)?;
        acc = acc
            .checked_mul(i64::from(radix))
            .and_then(|a| a.checked_sub(i64::from(digit)))
            .ok_or(MalformedNumber)?;
        seen = true;
    }

    if !seen {
        return Err(MalformedNumber);
    }
    if negative {
        Ok(acc)
    } else {
        acc.checked_neg().ok_or(MalformedNumber)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Phase {
    Lead,
    Integer,
    Fraction,
    Trailing,
}

/// Scan a decimal number into `scratch`.
///
/// On success the scratch holds the unrounded numeral, ready for
/// [`DecimalScratch::to_f64`] or [`DecimalScratch::to_f32`].
pub fn parse_real<I>(bytes: I, scratch: &mut DecimalScratch) -> Result<(), MalformedNumber>
where
    I: IntoIterator<Item = u8>,
{
    scratch.reset();
    let mut phase = Phase::Lead;
    let mut bytes = bytes.into_iter();

    while let Some(b) = bytes.next() {
        match (phase, b) {
            (Phase::Lead, b'-') => scratch.negate(),
            (Phase::Lead, b'+') => {}
            (Phase::Lead, b) if is_blank(b) => {}
            (Phase::Lead | Phase::Integer, b'.') => phase = Phase::Fraction,
            (Phase::Lead | Phase::Integer, b'0'..=b'9') => {
                scratch.integer_digit(b)?;
                phase = Phase::Integer;
            }
            (Phase::Fraction, b'0'..=b'9') => scratch.fraction_digit(b)?,
            (Phase::Integer | Phase::Fraction, b'e' | b'E') => {
                if !scratch.has_mantissa() {
                    return Err(MalformedNumber);
                }
                scratch.add_exponent(parse_exponent(bytes)?);
                return Ok(());
            }
            (Phase::Integer | Phase::Fraction | Phase::Trailing, b) if is_blank(b) => {
                phase = Phase::Trailing;
            }
            _ => return Err(MalformedNumber),
        }
    }

    if scratch.has_mantissa() {
        Ok(())
    } else {
        Err(MalformedNumber)
    }
}

/// Decimal exponent following `e`: optional sign directly after it, then
/// digits, then only blanks.
///
/// Saturates rather than overflowing; the scratch clamps the result to a
/// range that already converts to zero or infinity.
fn parse_exponent<I>(bytes: I) -> Result<i64, MalformedNumber>
where
    I: Iterator<Item = u8>,
{
    let mut bytes = bytes.peekable();
    let negative = match bytes.peek() {
        Some(b'-') => {
            bytes.next();
            true
        }
        Some(b'+') => {
            bytes.next();
            false
        }
        _ => false,
    };

    let mut magnitude: i64 = 0;
    let mut seen = false;
    while let Some(b) = bytes.next() {
        match b {
            b'0'..=b'9' => {
                magnitude = magnitude
                    .saturating_mul(10)
                    .saturating_add(i64::from(b - b'0'));
                seen = true;
            }
            b if seen && is_blank(b) && bytes.all(is_blank) => break,
            _ => return Err(MalformedNumber),
        }
    }

    if !seen {
        return Err(MalformedNumber);
    }
    Ok(if negative { -magnitude } else { magnitude })
}

/// Turns field views into typed values, substituting sentinels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldDecoder {
    radix: u32,
    default_int: i64,
    default_float: f32,
    default_double: f64,
}

impl FieldDecoder {
    pub fn new(config: &ParserConfig) -> Self {
        Self {
            radix: config.radix,
            default_int: config.default_int,
            default_float: config.default_float,
            default_double: config.default_double,
        }
    }

    #[inline]
    pub fn int(&self, field: &FieldView<'_>) -> i64 {
        parse_int(field.bytes(), self.radix).unwrap_or(self.default_int)
    }

    #[inline]
    pub fn double(&self, field: &FieldView<'_>, scratch: &mut DecimalScratch) -> f64 {
        parse_real(field.bytes(), scratch)
            .and_then(|()| scratch.to_f64())
            .unwrap_or(self.default_double)
    }

    #[inline]
    pub fn float(&self, field: &FieldView<'_>, scratch: &mut DecimalScratch) -> f32 {
        parse_real(field.bytes(), scratch)
            .and_then(|()| scratch.to_f32())
            .unwrap_or(self.default_float)
    }

    /// Replace `out` with the field's text.
    #[inline]
    pub fn text(&self, field: &FieldView<'_>, out: &mut String) {
        out.clear();
        field.write_text(out);
    }
}

impl Default for FieldDecoder {
    fn default() -> Self {
        Self::new(&ParserConfig::default())
    }
}
