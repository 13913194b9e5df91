//! Tokenizer states, byte classes and the field cursor.

/// Where the tokenizer is within the current field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseState {
    /// Between fields; nothing accumulated yet.
    #[default]
    FieldStart,
    /// Inside a bare field.
    Unquoted,
    /// Inside quotes; every byte except `"` is literal.
    Quoted,
    /// Just saw a `"` inside a quoted field (close or first half of `""`).
    AfterQuote,
    /// Closed quote followed by whitespace.
    TrailingSpace,
}

/// Classification of a single input byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteClass {
    Separator,
    Newline,
    CarriageReturn,
    Quote,
    Whitespace,
    Other,
}

impl ByteClass {
    /// Classify `byte`. The separator wins over every other class so that
    /// whitespace-delimited input works.
    #[inline]
    pub fn of(byte: u8, separator: u8) -> Self {
        if byte == separator {
            return Self::Separator;
        }
        match byte {
            b'\n' => Self::Newline,
            b'\r' => Self::CarriageReturn,
            b'"' => Self::Quote,
            b if is_blank(b) => Self::Whitespace,
            _ => Self::Other,
        }
    }
}

/// Space, tab, vertical tab, form feed.
#[inline]
pub fn is_blank(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | 0x0B | 0x0C)
}

/// Half-open logical range of the field being accumulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FieldCursor {
    pub start: usize,
    pub end: usize,
    pub quoted: bool,
}

impl FieldCursor {
    /// Empty bare field starting at `at`.
    #[inline]
    pub fn begin(&mut self, at: usize) {
        self.start = at;
        self.end = at;
        self.quoted = false;
    }

    /// Empty quoted field whose content starts at `at`.
    #[inline]
    pub fn begin_quoted(&mut self, at: usize) {
        self.begin(at);
        self.quoted = true;
    }

    /// Include the byte at `pos`.
    #[inline]
    pub fn extend_to(&mut self, pos: usize) {
        self.end = pos + 1;
    }

    /// Shift both ends down after the window dropped `shift` bytes.
    #[inline]
    pub fn rebase(&mut self, shift: usize) {
        self.start = self.start.saturating_sub(shift);
        self.end = self.end.saturating_sub(shift);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}
