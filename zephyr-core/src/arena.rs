//! Bump arena over linked fixed-capacity segments.
//!
//! The arena hands out [`Span`] handles instead of pointers. A span names a
//! segment, an offset and a length, and remembers the arena generation it was
//! allocated in. [`Arena::clear`] releases every segment and bumps the
//! generation, so any span handed out before the clear is rejected by
//! [`Arena::get`] rather than aliasing fresh data.
//!
//! Allocation never reuses space: when a request does not fit in the current
//! segment a new one of `max(requested, segment_size)` bytes is appended and
//! the tail of the old one is abandoned.

use crate::error::{Error, Result};

/// Default segment size (16 KiB).
pub const DEFAULT_SEGMENT_SIZE: usize = 1 << 14;

/// Handle to a region allocated from an [`Arena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    segment: u32,
    offset: u32,
    len: u32,
    generation: u32,
}

impl Span {
    /// Returns the length of the region in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len as usize
    }

    /// Returns true if the region is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the byte offset of the region inside its segment.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset as usize
    }

    /// Returns the arena generation the span was allocated in.
    #[must_use]
    pub const fn generation(&self) -> u32 {
        self.generation
    }
}

struct Segment {
    data: Box<[u8]>,
    used: usize,
}

impl Segment {
    fn new(capacity: usize) -> Self {
        Self {
            data: vec![0u8; capacity].into_boxed_slice(),
            used: 0,
        }
    }
}

/// Monotonic bump allocator reclaimed only in bulk.
///
/// Not synchronized: share it read-only or keep one per thread.
pub struct Arena {
    segments: Vec<Segment>,
    segment_size: usize,
    generation: u32,
}

impl Arena {
    /// Creates an empty arena with the default segment size.
    #[must_use]
    pub fn new() -> Self {
        Self::with_segment_size(DEFAULT_SEGMENT_SIZE)
    }

    /// Creates an empty arena whose fresh segments hold at least
    /// `segment_size` bytes.
    ///
    /// # Arguments
    /// * `segment_size` - Minimum capacity of each appended segment
    #[must_use]
    pub fn with_segment_size(segment_size: usize) -> Self {
        Self {
            segments: Vec::new(),
            segment_size: segment_size.max(1),
            generation: 0,
        }
    }

    /// Allocates zeroed room for `count` values of `T`, aligned to `T`.
    ///
    /// Alignment is applied to the offset inside the segment.
    ///
    /// # Panics
    /// Panics if the requested size overflows `u32`.
    pub fn allocate<T>(&mut self, count: usize) -> Span {
        let size = count
            .checked_mul(std::mem::size_of::<T>())
            .filter(|&s| s <= u32::MAX as usize)
            .expect("arena allocation size overflows u32");
        self.bump(size, std::mem::align_of::<T>())
    }

    /// Copies `bytes` into the arena and returns the span holding them.
    pub fn alloc_bytes(&mut self, bytes: &[u8]) -> Span {
        let span = self.allocate::<u8>(bytes.len());
        let segment = &mut self.segments[span.segment as usize];
        segment.data[span.offset()..span.offset() + span.len()].copy_from_slice(bytes);
        span
    }

    /// Returns the bytes of a span allocated since the last clear.
    ///
    /// # Errors
    /// Returns [`Error::StaleSpan`] if the arena was cleared after `span`
    /// was handed out.
    pub fn get(&self, span: Span) -> Result<&[u8]> {
        self.check(span)?;
        if span.is_empty() && self.segments.is_empty() {
            return Ok(&[]);
        }
        let segment = &self.segments[span.segment as usize];
        Ok(&segment.data[span.offset()..span.offset() + span.len()])
    }

    /// Returns the bytes of a live span for writing.
    ///
    /// # Errors
    /// Returns [`Error::StaleSpan`] if the arena was cleared after `span`
    /// was handed out.
    pub fn get_mut(&mut self, span: Span) -> Result<&mut [u8]> {
        self.check(span)?;
        if span.is_empty() && self.segments.is_empty() {
            return Ok(&mut []);
        }
        let segment = &mut self.segments[span.segment as usize];
        Ok(&mut segment.data[span.offset()..span.offset() + span.len()])
    }

    /// Releases every segment. All previously returned spans become invalid.
    pub fn clear(&mut self) {
        self.segments.clear();
        self.generation = self.generation.wrapping_add(1);
    }

    /// Returns the current generation.
    #[must_use]
    pub const fn generation(&self) -> u32 {
        self.generation
    }

    /// Returns the number of live segments.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Returns the default segment size.
    #[must_use]
    pub const fn segment_size(&self) -> usize {
        self.segment_size
    }

    /// Returns the total bytes handed out, including alignment padding.
    #[must_use]
    pub fn used_bytes(&self) -> usize {
        self.segments.iter().map(|s| s.used).sum()
    }

    /// Returns the total capacity of all live segments.
    #[must_use]
    pub fn capacity_bytes(&self) -> usize {
        self.segments.iter().map(|s| s.data.len()).sum()
    }

    fn check(&self, span: Span) -> Result<()> {
        if span.generation != self.generation {
            return Err(Error::StaleSpan {
                span: span.generation,
                arena: self.generation,
            });
        }
        Ok(())
    }

    fn bump(&mut self, size: usize, align: usize) -> Span {
        if let Some(index) = self.segments.len().checked_sub(1) {
            let segment = &mut self.segments[index];
            let start = segment.used.next_multiple_of(align);
            if start
                .checked_add(size)
                .is_some_and(|end| end <= segment.data.len())
            {
                segment.used = start + size;
                return self.span(index, start, size);
            }
        }

        let capacity = size.max(self.segment_size);
        tracing::trace!(capacity, segment = self.segments.len(), "arena segment appended");
        let mut segment = Segment::new(capacity);
        segment.used = size;
        self.segments.push(segment);
        self.span(self.segments.len() - 1, 0, size)
    }

    fn span(&self, segment: usize, offset: usize, len: usize) -> Span {
        Span {
            segment: segment as u32,
            offset: offset as u32,
            len: len as u32,
            generation: self.generation,
        }
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Arena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Arena")
            .field("segments", &self.segments.len())
            .field("segment_size", &self.segment_size)
            .field("used", &self.used_bytes())
            .field("generation", &self.generation)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_bytes_round_trip() {
        let mut arena = Arena::new();
        let a = arena.alloc_bytes(b"hello");
        let b = arena.alloc_bytes(b"world");
        assert_eq!(arena.get(a).unwrap(), b"hello");
        assert_eq!(arena.get(b).unwrap(), b"world");
        assert_eq!(arena.segment_count(), 1);
    }

    #[test]
    fn test_allocate_honors_alignment() {
        let mut arena = Arena::with_segment_size(64);
        let _ = arena.allocate::<u8>(3);
        let span = arena.allocate::<u64>(2);
        assert_eq!(span.offset() % std::mem::align_of::<u64>(), 0);
        assert_eq!(span.len(), 16);
        assert!(arena.get(span).unwrap().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_overflowing_request_appends_segment() {
        let mut arena = Arena::with_segment_size(16);
        let _ = arena.allocate::<u8>(10);
        let span = arena.allocate::<u8>(10);
        assert_eq!(arena.segment_count(), 2);
        assert_eq!(span.offset(), 0);
        // The abandoned tail of the first segment is never reused.
        let _ = arena.allocate::<u8>(4);
        assert_eq!(arena.segment_count(), 2);
        assert_eq!(arena.used_bytes(), 24);
    }

    #[test]
    fn test_oversized_request_gets_own_segment() {
        let mut arena = Arena::with_segment_size(16);
        let span = arena.alloc_bytes(&[7u8; 100]);
        assert_eq!(arena.capacity_bytes(), 100);
        assert_eq!(arena.get(span).unwrap().len(), 100);
    }

    #[test]
    fn test_clear_invalidates_spans() {
        let mut arena = Arena::new();
        let span = arena.alloc_bytes(b"stale");
        arena.clear();
        assert_eq!(arena.segment_count(), 0);
        assert!(matches!(arena.get(span), Err(Error::StaleSpan { .. })));

        let fresh = arena.alloc_bytes(b"fresh");
        assert_eq!(arena.get(fresh).unwrap(), b"fresh");
        assert!(arena.get(span).is_err());
    }

    #[test]
    fn test_get_mut_writes_through() {
        let mut arena = Arena::new();
        let span = arena.allocate::<u32>(1);
        arena.get_mut(span).unwrap().copy_from_slice(&7u32.to_le_bytes());
        assert_eq!(arena.get(span).unwrap(), &7u32.to_le_bytes());
    }

    #[test]
    fn test_empty_span_on_empty_arena() {
        let mut arena = Arena::new();
        let span = arena.alloc_bytes(b"");
        assert!(span.is_empty());
        assert_eq!(arena.get(span).unwrap(), b"");
    }
}
