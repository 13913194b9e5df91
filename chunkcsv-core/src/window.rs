//! Two-chunk byte window.
//!
//! Input arrives as independently sized chunks. At most two are resident:
//! *current* and *pending*. They share one logical index space:
//!
//! ```text
//!  logical   0 ............ len(current) ............ len(current)+len(pending)
//!            [   current chunk      ][        pending chunk         ]
//! ```
//!
//! Once the reader has moved past *current* and nothing still points into
//! it, [`ByteWindow::promote`] drops it, moves *pending* into its place and
//! returns the shift the caller must subtract from every live offset.

use memchr::memchr;
use thiserror::Error;
use tracing::trace;

use crate::view::FieldView;

/// Returned by [`ByteWindow::supply`] when both slots are occupied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot accept chunk: two chunks already resident")]
pub struct Backpressure;

/// A chunk of input data held by the window.
#[derive(Debug)]
pub struct Chunk {
    /// The actual bytes (owned)
    data: Box<[u8]>,
    /// Offset of this chunk in the overall input stream
    stream_offset: u64,
}

impl Chunk {
    /// Create a new chunk from bytes.
    pub fn new(data: Vec<u8>, stream_offset: u64) -> Self {
        Self {
            data: data.into_boxed_slice(),
            stream_offset,
        }
    }

    /// Get the full data.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get the stream offset.
    #[inline]
    pub fn stream_offset(&self) -> u64 {
        self.stream_offset
    }
}

/// Double-buffered view over the resident chunks.
#[derive(Debug, Default)]
pub struct ByteWindow {
    current: Option<Chunk>,
    pending: Option<Chunk>,
    /// Total bytes received so far (for stream offset calculation)
    total_bytes: u64,
}

impl ByteWindow {
    /// Create a new empty window.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a chunk behind whatever is resident.
    ///
    /// Empty chunks are accepted and dropped. Fails when both slots are
    /// occupied; the caller must drain and [`promote`](Self::promote) first.
    pub fn supply(&mut self, data: Vec<u8>) -> Result<(), Backpressure> {
        if data.is_empty() {
            return Ok(());
        }
        if self.pending.is_some() {
            return Err(Backpressure);
        }
        let chunk = Chunk::new(data, self.total_bytes);
        self.total_bytes += chunk.len() as u64;
        trace!(len = chunk.len(), stream_offset = chunk.stream_offset(), "chunk supplied");
        if self.current.is_none() {
            self.current = Some(chunk);
        } else {
            self.pending = Some(chunk);
        }
        Ok(())
    }

    /// Drop *current* and move *pending* into its slot.
    ///
    /// Returns the number of bytes every live logical offset must be
    /// reduced by. A window with nothing resident returns 0.
    pub fn promote(&mut self) -> usize {
        let Some(old) = self.current.take() else {
            return 0;
        };
        self.current = self.pending.take();
        trace!(
            released = old.len(),
            stream_offset = old.stream_offset(),
            "chunk released"
        );
        old.len()
    }

    /// Byte at a logical offset, reading through to *pending*.
    #[inline]
    pub fn byte_at(&self, index: usize) -> Option<u8> {
        let head = self.current_data();
        match head.get(index) {
            Some(&b) => Some(b),
            None => self.pending_data().get(index - head.len()).copied(),
        }
    }

    /// Split a logical range into its parts in *current* and *pending*.
    ///
    /// Out-of-window parts come back empty rather than panicking.
    pub fn slices(&self, start: usize, end: usize) -> (&[u8], &[u8]) {
        let head = self.current_data();
        let split = head.len();
        let end = end.min(self.len());
        let start = start.min(end);
        let head_part = head
            .get(start.min(split)..end.min(split))
            .unwrap_or_default();
        let tail_part = self
            .pending_data()
            .get(start.max(split) - split..end.max(split) - split)
            .unwrap_or_default();
        (head_part, tail_part)
    }

    /// Borrow a logical range as a field view.
    #[inline]
    pub fn view(&self, start: usize, end: usize, quoted: bool) -> FieldView<'_> {
        let (head, tail) = self.slices(start, end);
        FieldView::new(head, tail, quoted)
    }

    /// Position of the first `needle` at or after `from`.
    pub fn find_byte(&self, needle: u8, from: usize) -> Option<usize> {
        let head = self.current_data();
        if from < head.len() {
            if let Some(i) = memchr(needle, &head[from..]) {
                return Some(from + i);
            }
        }
        let skip = from.saturating_sub(head.len());
        let tail = self.pending_data().get(skip..)?;
        memchr(needle, tail).map(|i| head.len() + skip + i)
    }

    /// Logical length across both chunks.
    #[inline]
    pub fn len(&self) -> usize {
        self.current_data().len() + self.pending_data().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.current.is_none()
    }

    /// Length of the *current* chunk (0 when nothing is resident).
    #[inline]
    pub fn current_len(&self) -> usize {
        self.current_data().len()
    }

    #[inline]
    pub fn has_current(&self) -> bool {
        self.current.is_some()
    }

    /// True when both slots are occupied.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.pending.is_some()
    }

    /// Number of resident chunks (0, 1 or 2).
    pub fn resident(&self) -> usize {
        usize::from(self.current.is_some()) + usize::from(self.pending.is_some())
    }

    /// Stream offset of logical index 0.
    #[inline]
    pub fn base_offset(&self) -> u64 {
        self.current
            .as_ref()
            .map_or(self.total_bytes, Chunk::stream_offset)
    }

    /// Stream offset of a logical index.
    #[inline]
    pub fn stream_offset(&self, index: usize) -> u64 {
        self.base_offset() + index as u64
    }

    /// Total bytes received through this window.
    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    /// Drop both chunks. The stream position is kept.
    pub fn clear(&mut self) {
        self.current = None;
        self.pending = None;
    }

    #[inline]
    fn current_data(&self) -> &[u8] {
        self.current.as_ref().map(Chunk::data).unwrap_or_default()
    }

    #[inline]
    fn pending_data(&self) -> &[u8] {
        self.pending.as_ref().map(Chunk::data).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(chunks: &[&[u8]]) -> ByteWindow {
        let mut w = ByteWindow::new();
        for chunk in chunks {
            w.supply(chunk.to_vec()).unwrap();
        }
        w
    }

    #[test]
    fn test_logical_addressing_spans_chunks() {
        let w = window(&[b"abc", b"de"]);
        assert_eq!(w.len(), 5);
        assert_eq!(w.byte_at(0), Some(b'a'));
        assert_eq!(w.byte_at(2), Some(b'c'));
        assert_eq!(w.byte_at(3), Some(b'd'));
        assert_eq!(w.byte_at(4), Some(b'e'));
        assert_eq!(w.byte_at(5), None);
    }

    #[test]
    fn test_third_chunk_is_refused() {
        let mut w = window(&[b"abc", b"de"]);
        assert!(w.is_full());
        assert_eq!(w.supply(b"f".to_vec()), Err(Backpressure));
        assert_eq!(w.resident(), 2);
    }

    #[test]
    fn test_empty_chunk_is_ignored() {
        let mut w = window(&[b"abc", b"de"]);
        assert_eq!(w.supply(Vec::new()), Ok(()));
        assert_eq!(w.total_bytes(), 5);
    }

    #[test]
    fn test_promote_rebases() {
        let mut w = window(&[b"abc", b"de"]);
        assert_eq!(w.promote(), 3);
        assert_eq!(w.byte_at(0), Some(b'd'));
        assert_eq!(w.base_offset(), 3);
        assert_eq!(w.stream_offset(1), 4);
        assert!(!w.is_full());

        assert_eq!(w.promote(), 2);
        assert!(w.is_empty());
        assert_eq!(w.base_offset(), 5);
        assert_eq!(w.promote(), 0);
    }

    #[test]
    fn test_slices_split_at_boundary() {
        let w = window(&[b"abc", b"def"]);
        assert_eq!(w.slices(1, 5), (b"bc".as_slice(), b"de".as_slice()));
        assert_eq!(w.slices(0, 2), (b"ab".as_slice(), b"".as_slice()));
        assert_eq!(w.slices(4, 6), (b"".as_slice(), b"ef".as_slice()));
        assert_eq!(w.slices(3, 3), (b"".as_slice(), b"".as_slice()));
        // Out of range never panics
        assert_eq!(w.slices(5, 9), (b"".as_slice(), b"f".as_slice()));
    }

    #[test]
    fn test_find_byte_across_chunks() {
        let w = window(&[b"a,b", b"c\nd"]);
        assert_eq!(w.find_byte(b'\n', 0), Some(4));
        assert_eq!(w.find_byte(b',', 0), Some(1));
        assert_eq!(w.find_byte(b',', 2), None);
        assert_eq!(w.find_byte(b'\n', 5), None);
        assert_eq!(w.find_byte(b'd', 4), Some(5));
    }
}
