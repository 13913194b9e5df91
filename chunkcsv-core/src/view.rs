//! Borrowed view of a field's raw bytes.
//!
//! A field may start in one resident chunk and end in the next, so a view is
//! two slices rather than one. Nothing is copied until the field is
//! committed as text.

use std::fmt;

/// Raw bytes of one field, possibly split across the chunk boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldView<'a> {
    head: &'a [u8],
    tail: &'a [u8],
    quoted: bool,
}

impl<'a> FieldView<'a> {
    /// Create a view from the parts in *current* and *pending*.
    #[inline]
    pub fn new(head: &'a [u8], tail: &'a [u8], quoted: bool) -> Self {
        Self { head, tail, quoted }
    }

    /// A view over a single contiguous slice.
    #[inline]
    pub fn contiguous(bytes: &'a [u8]) -> Self {
        Self::new(bytes, &[], false)
    }

    /// Length of the raw range in bytes (escaped quotes count twice).
    #[inline]
    pub fn len(&self) -> usize {
        self.head.len() + self.tail.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.head.is_empty() && self.tail.is_empty()
    }

    /// Whether the field was enclosed in quotes.
    #[inline]
    pub fn is_quoted(&self) -> bool {
        self.quoted
    }

    /// The two underlying slices.
    #[inline]
    pub fn parts(&self) -> (&'a [u8], &'a [u8]) {
        (self.head, self.tail)
    }

    /// Iterate the raw bytes in order.
    #[inline]
    pub fn bytes(&self) -> impl Iterator<Item = u8> + 'a {
        self.head.iter().chain(self.tail.iter()).copied()
    }

    /// Compare raw bytes against a contiguous slice.
    pub fn eq_bytes(&self, other: &[u8]) -> bool {
        self.len() == other.len()
            && other.starts_with(self.head)
            && &other[self.head.len()..] == self.tail
    }

    /// Append the field's text to `out`.
    ///
    /// Every byte becomes the code point of the same value. Inside a quoted
    /// field each doubled quote is written once.
    pub fn write_text(&self, out: &mut String) {
        out.reserve(self.len());
        let mut half_pair = false;
        for b in self.bytes() {
            if self.quoted && b == b'"' {
                half_pair = !half_pair;
                if !half_pair {
                    continue;
                }
            } else {
                half_pair = false;
            }
            out.push(char::from(b));
        }
    }

    /// Owned copy of the raw bytes.
    pub fn to_vec(&self) -> Vec<u8> {
        let mut v = Vec::with_capacity(self.len());
        v.extend_from_slice(self.head);
        v.extend_from_slice(self.tail);
        v
    }
}

impl fmt::Display for FieldView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut text = String::new();
        self.write_text(&mut text);
        f.write_str(&text)
    }
}
