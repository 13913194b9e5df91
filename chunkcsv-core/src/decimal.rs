//! Reusable decimal scratch for float and double decoding.
//!
//! The decoder records a number as `(negative, digits, exponent)` meaning
//! `±0.d1d2...dn × 10^exponent`. Zero runs are deferred and only stored
//! when a nonzero digit follows, so `1000`, `1.000` and `0.001` store a
//! single digit each.
//!
//! Binary conversion writes the numeral into a stack buffer and hands it to
//! the standard library's correctly rounded parser.

use crate::error::MalformedNumber;

/// Most significant digits a scratch will hold, deferred zeros between
/// them included. A longer mantissa is malformed rather than rounded.
pub const MAX_DIGITS: usize = 768;

/// Exponents beyond this already saturate to zero or infinity.
const EXPONENT_LIMIT: i64 = 100_000;

/// `-0.` + digits + `e-` + exponent digits
const NUMERAL_CAPACITY: usize = MAX_DIGITS + 16;

/// Unrounded decimal numeral, owned by one parser and reset per field.
#[derive(Debug, Clone)]
pub struct DecimalScratch {
    is_negative: bool,
    digits: Box<[u8]>,
    n_digits: usize,
    dec_exponent: i64,
    /// Zeros seen but not yet stored.
    deferred_zeros: usize,
    /// Any mantissa digit at all, including zeros that were never stored.
    saw_digit: bool,
}

impl DecimalScratch {
    pub fn new() -> Self {
        Self {
            is_negative: false,
            digits: vec![b'0'; MAX_DIGITS].into_boxed_slice(),
            n_digits: 0,
            dec_exponent: 0,
            deferred_zeros: 0,
            saw_digit: false,
        }
    }

    /// Forget the previous number.
    #[inline]
    pub fn reset(&mut self) {
        self.is_negative = false;
        self.n_digits = 0;
        self.dec_exponent = 0;
        self.deferred_zeros = 0;
        self.saw_digit = false;
    }

    #[inline]
    pub fn negate(&mut self) {
        self.is_negative = !self.is_negative;
    }

    /// Digit before the decimal point.
    #[inline]
    pub fn integer_digit(&mut self, digit: u8) -> Result<(), MalformedNumber> {
        self.saw_digit = true;
        if digit == b'0' {
            if self.n_digits > 0 {
                self.deferred_zeros += 1;
                self.dec_exponent += 1;
            }
            return Ok(());
        }
        self.push(digit)?;
        self.dec_exponent += 1;
        Ok(())
    }

    /// Digit after the decimal point.
    #[inline]
    pub fn fraction_digit(&mut self, digit: u8) -> Result<(), MalformedNumber> {
        self.saw_digit = true;
        if digit == b'0' {
            if self.n_digits == 0 {
                self.dec_exponent -= 1;
            } else {
                self.deferred_zeros += 1;
            }
            return Ok(());
        }
        self.push(digit)
    }

    /// Add an explicit `e` exponent.
    #[inline]
    pub fn add_exponent(&mut self, exponent: i64) {
        self.dec_exponent = self.dec_exponent.saturating_add(exponent);
    }

    /// Was at least one mantissa digit seen?
    #[inline]
    pub fn has_mantissa(&self) -> bool {
        self.saw_digit
    }

    #[inline]
    pub fn is_negative(&self) -> bool {
        self.is_negative
    }

    /// Stored significant digits as ASCII.
    #[inline]
    pub fn digits(&self) -> &[u8] {
        &self.digits[..self.n_digits]
    }

    #[inline]
    pub fn dec_exponent(&self) -> i64 {
        self.dec_exponent
    }

    pub fn to_f64(&self) -> Result<f64, MalformedNumber> {
        if !self.saw_digit {
            return Err(MalformedNumber);
        }
        if self.n_digits == 0 {
            return Ok(if self.is_negative { -0.0 } else { 0.0 });
        }
        let mut buf = [0u8; NUMERAL_CAPACITY];
        self.numeral(&mut buf)?.parse().map_err(|_| MalformedNumber)
    }

    /// Parsed directly as `f32` so the value is rounded once.
    pub fn to_f32(&self) -> Result<f32, MalformedNumber> {
        if !self.saw_digit {
            return Err(MalformedNumber);
        }
        if self.n_digits == 0 {
            return Ok(if self.is_negative { -0.0 } else { 0.0 });
        }
        let mut buf = [0u8; NUMERAL_CAPACITY];
        self.numeral(&mut buf)?.parse().map_err(|_| MalformedNumber)
    }

    fn push(&mut self, digit: u8) -> Result<(), MalformedNumber> {
        let needed = self.n_digits + self.deferred_zeros + 1;
        if needed > MAX_DIGITS {
            return Err(MalformedNumber);
        }
        self.digits[self.n_digits..self.n_digits + self.deferred_zeros].fill(b'0');
        self.n_digits += self.deferred_zeros;
        self.deferred_zeros = 0;
        self.digits[self.n_digits] = digit;
        self.n_digits += 1;
        Ok(())
    }

    /// Render `[-]0.<digits>e<exponent>` into `buf`.
    fn numeral<'b>(&self, buf: &'b mut [u8; NUMERAL_CAPACITY]) -> Result<&'b str, MalformedNumber> {
        let mut pos = 0;
        if self.is_negative {
            buf[pos] = b'-';
            pos += 1;
        }
        buf[pos..pos + 2].copy_from_slice(b"0.");
        pos += 2;
        buf[pos..pos + self.n_digits].copy_from_slice(self.digits());
        pos += self.n_digits;
        buf[pos] = b'e';
        pos += 1;

        let exponent = self.dec_exponent.clamp(-EXPONENT_LIMIT, EXPONENT_LIMIT);
        if exponent < 0 {
            buf[pos] = b'-';
            pos += 1;
        }
        let mut magnitude = exponent.unsigned_abs();
        let mut reversed = [0u8; 20];
        let mut len = 0;
        loop {
            reversed[len] = b'0' + (magnitude % 10) as u8;
            len += 1;
            magnitude /= 10;
            if magnitude == 0 {
                break;
            }
        }
        for &d in reversed[..len].iter().rev() {
            buf[pos] = d;
            pos += 1;
        }
        std::str::from_utf8(&buf[..pos]).map_err(|_| MalformedNumber)
    }
}

impl Default for DecimalScratch {
    fn default() -> Self {
        Self::new()
    }
}
