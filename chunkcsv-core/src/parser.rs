//! Chunked record parser.
//!
//! [`ChunkParser`] pulls bytes from a [`ByteWindow`], runs them through the
//! field/record state machine and hands each completed field to the
//! [`RowSink`] as a typed value.
//!
//! ```text
//!  supply(chunk) ──► ByteWindow ──► step/dispatch ──► commit ──► FieldDecoder ──► RowSink
//!                        ▲                                │
//!                        └──── release_consumed ◄─────────┘ (pin = field start)
//! ```
//!
//! The caller drives it: `supply` a chunk, call `next_record` until it
//! returns [`Advance::NeedData`], repeat. A record is only delivered once
//! its terminating newline has been seen.

use tracing::debug;

use crate::config::ParserConfig;
use crate::decimal::DecimalScratch;
use crate::decode::FieldDecoder;
use crate::error::{ErrorKind, ParseError, SetupError};
use crate::schema::{ColumnType, Schema};
use crate::sink::RowSink;
use crate::state::{ByteClass, FieldCursor, ParseState};
use crate::view::FieldView;
use crate::window::ByteWindow;

/// Outcome of [`ChunkParser::next_record`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Advance {
    /// A record was completed; the sink holds its values.
    Record,
    /// The window is drained; `supply` the next chunk and call again.
    NeedData,
}

/// Result of a [`ChunkParser::feed`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedResult {
    /// Records delivered to the callback
    pub records: usize,
    /// Bytes still held by the window (an unfinished record)
    pub resident_bytes: usize,
}

/// What completed records are used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Typed,
    /// Every field becomes a column name.
    Header,
    /// Tokenize and drop.
    Discard,
}

/// Streaming parser over a two-chunk window.
pub struct ChunkParser<K> {
    window: ByteWindow,
    config: ParserConfig,
    schema: Schema,
    sink: K,
    decoder: FieldDecoder,
    scratch: DecimalScratch,
    /// Reused buffer for string fields.
    text: String,
    state: ParseState,
    /// Position of a `\r` waiting for its successor.
    pending_cr: Option<usize>,
    /// Next logical byte to read.
    index: usize,
    field: FieldCursor,
    /// Absolute offset of the record's first byte.
    record_start: u64,
    column: usize,
    mode: Mode,
    column_names: Vec<String>,
    /// Scanning for a newline after `resync`.
    skipping: bool,
    /// A mid-record error left the tokenizer inside a record.
    desynced: bool,
}

impl<K: RowSink> ChunkParser<K> {
    /// Validate `config`, bind `sink` to `schema` and build the parser.
    pub fn new(schema: Schema, mut sink: K, config: ParserConfig) -> Result<Self, SetupError> {
        config.validate()?;
        sink.bind(&schema)?;
        Ok(Self {
            window: ByteWindow::new(),
            decoder: FieldDecoder::new(&config),
            mode: initial_mode(&config),
            config,
            schema,
            sink,
            scratch: DecimalScratch::new(),
            text: String::new(),
            state: ParseState::FieldStart,
            pending_cr: None,
            index: 0,
            field: FieldCursor::default(),
            record_start: 0,
            column: 0,
            column_names: Vec::new(),
            skipping: false,
            desynced: false,
        })
    }

    /// Hand the next chunk of the stream to the parser.
    ///
    /// Fails with [`ErrorKind::Backpressure`] when two chunks are resident
    /// and the older one is still needed.
    pub fn supply(&mut self, chunk: Vec<u8>) -> Result<(), ParseError> {
        self.release_consumed();
        self.window.supply(chunk).map_err(|_| {
            ParseError::new(
                ErrorKind::Backpressure,
                self.record_start,
                self.window.total_bytes(),
            )
        })
    }

    /// Parse up to the end of the next record.
    pub fn next_record(&mut self) -> Result<Advance, ParseError> {
        loop {
            if self.skipping && !self.skip_line() {
                return self.starve();
            }
            let Some((pos, byte)) = self.next_byte() else {
                return self.starve();
            };
            if !self.step(pos, byte)? {
                continue;
            }
            match self.mode {
                Mode::Typed => return Ok(Advance::Record),
                Mode::Header => {
                    debug!(columns = ?self.column_names, "header extracted");
                    self.mode = Mode::Typed;
                }
                Mode::Discard => {
                    debug!(record_start = self.record_start, "first record skipped");
                    self.mode = Mode::Typed;
                }
            }
        }
    }

    /// Supply `chunk` and deliver every record it completes to `on_record`.
    pub fn feed<F>(&mut self, chunk: Vec<u8>, mut on_record: F) -> Result<FeedResult, ParseError>
    where
        F: FnMut(&K),
    {
        self.supply(chunk)?;
        let mut records = 0;
        while self.next_record()? == Advance::Record {
            records += 1;
            on_record(&self.sink);
        }
        Ok(FeedResult {
            records,
            resident_bytes: self.window.len(),
        })
    }

    /// Skip the rest of the record an error interrupted.
    ///
    /// Scans (without honouring quotes) to the next newline, dropping
    /// chunks as it goes. Does nothing when the parser already sits at a
    /// record boundary.
    pub fn resync(&mut self) {
        if !self.desynced {
            return;
        }
        debug!(offset = self.offset(), record_start = self.record_start, "resync");
        self.desynced = false;
        self.skipping = true;
        self.state = ParseState::FieldStart;
        self.pending_cr = None;
        self.column = 0;
        self.field.begin(self.index);
    }

    /// Start over from the first resident byte.
    ///
    /// Header extraction and first-record skipping are re-armed. The
    /// schema and the sink binding are unchanged.
    pub fn reset(&mut self) {
        self.index = 0;
        self.pending_cr = None;
        self.skipping = false;
        self.mode = initial_mode(&self.config);
        if self.mode == Mode::Header {
            self.column_names.clear();
        }
        self.begin_record(0);
    }

    /// Release all buffers.
    ///
    /// Returns how many bytes of an unterminated trailing record were
    /// discarded. The parser can keep going with the next chunk.
    pub fn close(&mut self) -> u64 {
        let discarded = self.window.total_bytes().saturating_sub(self.record_start);
        if discarded > 0 {
            debug!(discarded, record_start = self.record_start, "unterminated record discarded");
        }
        self.window.clear();
        self.index = 0;
        self.pending_cr = None;
        self.skipping = false;
        self.begin_record(0);
        discarded
    }

    /// Absolute offset of the next unread byte.
    #[inline]
    pub fn offset(&self) -> u64 {
        self.window.stream_offset(self.index)
    }

    /// Absolute offset of the record in progress.
    #[inline]
    pub fn record_start(&self) -> u64 {
        self.record_start
    }

    /// Names read by header mode, empty until the header is parsed.
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    /// Raw bytes of the field in progress.
    pub fn pending_field(&self) -> FieldView<'_> {
        self.window.view(self.field.start, self.field.end, self.field.quoted)
    }

    /// Bytes held by the window.
    pub fn resident_bytes(&self) -> usize {
        self.window.len()
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut K {
        &mut self.sink
    }

    pub fn into_sink(self) -> K {
        self.sink
    }

    // --- window management ---

    /// Lowest logical offset still referenced.
    #[inline]
    fn pin(&self) -> usize {
        let pin = self.field.start.min(self.index);
        self.pending_cr.map_or(pin, |cr| pin.min(cr))
    }

    /// Drop chunks nothing points into any more.
    fn release_consumed(&mut self) {
        while self.window.has_current() && self.pin() >= self.window.current_len() {
            let shift = self.window.promote();
            self.index -= shift;
            self.field.rebase(shift);
            if let Some(cr) = self.pending_cr.as_mut() {
                *cr -= shift;
            }
        }
    }

    #[inline]
    fn next_byte(&mut self) -> Option<(usize, u8)> {
        self.release_consumed();
        let pos = self.index;
        let byte = self.window.byte_at(pos)?;
        self.index += 1;
        Some((pos, byte))
    }

    /// Out of bytes: ask for more, or fail if no more can be taken.
    fn starve(&mut self) -> Result<Advance, ParseError> {
        self.release_consumed();
        if self.window.is_full() {
            self.desynced = true;
            return Err(ParseError::new(
                ErrorKind::BoundaryOverrun,
                self.record_start,
                self.offset(),
            ));
        }
        Ok(Advance::NeedData)
    }

    /// Advance past the next newline. False when none is resident.
    fn skip_line(&mut self) -> bool {
        match self.window.find_byte(b'\n', self.index) {
            Some(newline) => {
                self.skipping = false;
                self.index = newline + 1;
                self.begin_record(newline + 1);
                debug!(record_start = self.record_start, "resynced");
                true
            }
            None => {
                self.index = self.window.len();
                self.field.begin(self.index);
                false
            }
        }
    }

    // --- state machine ---

    /// Feed one byte through CR folding. True when a record ended.
    fn step(&mut self, pos: usize, byte: u8) -> Result<bool, ParseError> {
        if let Some(cr) = self.pending_cr.take() {
            if byte == b'\n' {
                return self.dispatch(pos, byte, ByteClass::Newline);
            }
            self.dispatch(cr, b'\r', ByteClass::Other)?;
        }
        let class = ByteClass::of(byte, self.config.separator);
        if class == ByteClass::CarriageReturn && self.state != ParseState::Quoted {
            self.pending_cr = Some(pos);
            return Ok(false);
        }
        self.dispatch(pos, byte, class)
    }

    fn dispatch(&mut self, pos: usize, byte: u8, class: ByteClass) -> Result<bool, ParseError> {
        use ByteClass as C;
        use ParseState as S;

        match (self.state, class) {
            (S::FieldStart, C::Separator) => {
                if !self.config.collapse_separators {
                    self.field.begin(pos);
                    return self.end_field(pos, class);
                }
                self.field.begin(pos + 1);
            }
            (S::FieldStart, C::Newline) => {
                if self.column == 0 {
                    self.begin_record(pos + 1);
                    return Ok(false);
                }
                if self.config.collapse_separators && self.column >= self.schema.len() {
                    return self.end_record(pos).map(|()| true);
                }
                self.field.begin(pos);
                return self.end_field(pos, class);
            }
            (S::FieldStart, C::Whitespace) if self.config.skips_blanks() => {
                self.field.begin(pos + 1);
            }
            (S::FieldStart, C::Quote) => {
                self.field.begin_quoted(pos + 1);
                self.state = S::Quoted;
            }
            (S::FieldStart, _) => {
                self.field.begin(pos);
                self.field.extend_to(pos);
                self.state = S::Unquoted;
            }

            (S::Unquoted | S::AfterQuote | S::TrailingSpace, C::Separator | C::Newline) => {
                return self.end_field(pos, class);
            }

            (S::Unquoted, C::Whitespace) => {
                if !self.config.trim_spaces {
                    self.field.extend_to(pos);
                }
            }
            (S::Unquoted, _) => self.field.extend_to(pos),

            (S::Quoted, C::Quote) => self.state = S::AfterQuote,
            (S::Quoted, _) => self.field.extend_to(pos),

            // Escaped quote: keep both bytes, text decoding folds them
            (S::AfterQuote, C::Quote) => {
                self.field.extend_to(pos);
                self.state = S::Quoted;
            }
            (S::AfterQuote | S::TrailingSpace, C::Whitespace) => self.state = S::TrailingSpace,
            (S::AfterQuote | S::TrailingSpace, _) => {
                return Err(self.fail_field(ErrorKind::UnexpectedCharacter { byte }, pos));
            }
        }
        Ok(false)
    }

    /// Commit the field ended by the separator or newline at `pos`.
    fn end_field(&mut self, pos: usize, class: ByteClass) -> Result<bool, ParseError> {
        let committed = self.commit();
        if class == ByteClass::Newline {
            if let Err(kind) = committed {
                return Err(self.fail_record(kind, pos));
            }
            return self.end_record(pos).map(|()| true);
        }
        if let Err(kind) = committed {
            return Err(self.fail_field(kind, pos));
        }
        self.state = ParseState::FieldStart;
        self.field.begin(pos + 1);
        Ok(false)
    }

    /// Apply the record policy to the newline at `pos`.
    fn end_record(&mut self, pos: usize) -> Result<(), ParseError> {
        let expected = self.schema.len();
        if self.mode == Mode::Typed && self.column < expected {
            if !self.config.tolerate_partial {
                let kind = ErrorKind::PartialRecord { seen: self.column, expected };
                return Err(self.fail_record(kind, pos));
            }
            // Empty ranges decode to the configured defaults
            self.field.begin(pos);
            for column in self.column..expected {
                if let Some(ty) = self.schema.column_type(column) {
                    self.deliver(column, ty);
                }
            }
        }
        self.begin_record(pos + 1);
        Ok(())
    }

    fn commit(&mut self) -> Result<(), ErrorKind> {
        let column = self.column;
        match self.mode {
            Mode::Typed => match self.schema.column_type(column) {
                Some(ty) => self.deliver(column, ty),
                None if self.config.ignore_extra_columns => {}
                None => {
                    return Err(ErrorKind::TooManyColumns {
                        expected: self.schema.len(),
                    })
                }
            },
            Mode::Header => {
                let view = self.window.view(self.field.start, self.field.end, self.field.quoted);
                let mut name = String::with_capacity(view.len());
                view.write_text(&mut name);
                self.column_names.push(name);
            }
            Mode::Discard => {}
        }
        self.column += 1;
        Ok(())
    }

    /// Decode the current field as `ty` and pass it on.
    fn deliver(&mut self, column: usize, ty: ColumnType) {
        let view = self.window.view(self.field.start, self.field.end, self.field.quoted);
        match ty {
            ColumnType::Int => self.sink.set_int(column, self.decoder.int(&view)),
            ColumnType::Float => {
                let value = self.decoder.float(&view, &mut self.scratch);
                self.sink.set_float(column, value);
            }
            ColumnType::Double => {
                let value = self.decoder.double(&view, &mut self.scratch);
                self.sink.set_double(column, value);
            }
            ColumnType::String => {
                self.decoder.text(&view, &mut self.text);
                self.sink.set_string(column, &self.text);
            }
            ColumnType::Skip => {}
        }
    }

    /// Fresh record starting at logical `at`.
    fn begin_record(&mut self, at: usize) {
        self.column = 0;
        self.state = ParseState::FieldStart;
        self.field.begin(at);
        self.record_start = self.window.stream_offset(at);
        self.desynced = false;
    }

    /// Error on a newline: the record is over, the next one starts clean.
    fn fail_record(&mut self, kind: ErrorKind, pos: usize) -> ParseError {
        let err = ParseError::new(kind, self.record_start, self.window.stream_offset(pos));
        self.begin_record(pos + 1);
        err
    }

    /// Error inside a record: resume at the byte after `pos`.
    fn fail_field(&mut self, kind: ErrorKind, pos: usize) -> ParseError {
        let err = ParseError::new(kind, self.record_start, self.window.stream_offset(pos));
        self.state = ParseState::FieldStart;
        self.pending_cr = None;
        self.index = pos + 1;
        self.field.begin(pos + 1);
        self.desynced = true;
        err
    }
}

fn initial_mode(config: &ParserConfig) -> Mode {
    if config.parse_header {
        Mode::Header
    } else if config.skip_first_record {
        Mode::Discard
    } else {
        Mode::Typed
    }
}

impl<K: std::fmt::Debug> std::fmt::Debug for ChunkParser<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkParser")
            .field("state", &self.state)
            .field("mode", &self.mode)
            .field("column", &self.column)
            .field("index", &self.index)
            .field("record_start", &self.record_start)
            .field("resident", &self.window.resident())
            .field("sink", &self.sink)
            .finish()
    }
}
