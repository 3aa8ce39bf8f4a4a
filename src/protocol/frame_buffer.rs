//! Owned, growable backing storage for a single frame.
//!
//! Uses `bytes::BytesMut` as the allocation. The buffer is split into a fixed
//! 16-byte header region and a payload region; both are borrowed views, so
//! the borrow checker keeps any view from outliving a growth:
//!
//! ```text
//! ┌──────────────┬──────────────────────────────────────────┐
//! │ header (16)  │ payload (capacity - 16)                  │
//! └──────────────┴──────────────────────────────────────────┘
//! └──────────── len (valid bytes) ─────────┘
//! ```
//!
//! Growth doubles from the current capacity until the requirement fits,
//! allocates a fresh buffer and copies the valid prefix. It never grows in
//! place.

use bytes::BytesMut;

use super::wire_format::HEADER_SIZE;

/// Backing buffer of a [`Frame`](super::Frame).
#[derive(Debug)]
pub(crate) struct FrameBuffer {
    /// Zero-initialised storage; `buf.len()` is the capacity.
    buf: BytesMut,
    /// Number of leading bytes that hold meaningful data (at least the header).
    len: usize,
}

impl FrameBuffer {
    /// Allocate `capacity` bytes in total, header included.
    ///
    /// Capacities below [`HEADER_SIZE`] are raised to it.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::zeroed(capacity.max(HEADER_SIZE)),
            len: HEADER_SIZE,
        }
    }

    /// Total allocated bytes, header included.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Payload bytes available without growing.
    #[inline]
    pub fn payload_capacity(&self) -> usize {
        self.buf.len() - HEADER_SIZE
    }

    /// Number of valid bytes (header plus written payload).
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Mark the first `len` bytes as valid.
    ///
    /// Clamped to `[HEADER_SIZE, capacity]`.
    pub fn set_len(&mut self, len: usize) {
        self.len = len.clamp(HEADER_SIZE, self.capacity());
    }

    /// Ensure at least `required` total bytes are allocated.
    ///
    /// Returns `true` if the buffer was replaced. Views taken before a
    /// growth cannot survive it; the borrow checker enforces that.
    pub fn ensure_capacity(&mut self, required: usize) -> bool {
        let current = self.capacity();
        if current >= required {
            return false;
        }

        let mut capacity = current;
        while capacity < required {
            capacity <<= 1;
        }

        let mut grown = BytesMut::zeroed(capacity);
        grown[..self.len].copy_from_slice(&self.buf[..self.len]);
        self.buf = grown;

        tracing::trace!(from = current, to = capacity, required, "frame buffer grown");
        true
    }

    /// Header view.
    #[inline]
    pub fn header(&self) -> &[u8] {
        &self.buf[..HEADER_SIZE]
    }

    /// Mutable header view.
    #[inline]
    pub fn header_mut(&mut self) -> &mut [u8] {
        &mut self.buf[..HEADER_SIZE]
    }

    /// Whole payload region, up to capacity.
    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.buf[HEADER_SIZE..]
    }

    /// Mutable view of the whole payload region, up to capacity.
    #[inline]
    pub fn payload_mut(&mut self) -> &mut [u8] {
        &mut self.buf[HEADER_SIZE..]
    }

    /// The first `len` bytes, header included.
    ///
    /// # Panics
    ///
    /// Panics if `len` exceeds the capacity.
    #[inline]
    pub fn prefix(&self, len: usize) -> &[u8] {
        &self.buf[..len]
    }

    /// Zero the header and forget any payload, keeping the allocation.
    pub fn clear(&mut self) {
        self.buf[..HEADER_SIZE].fill(0);
        self.len = HEADER_SIZE;
    }
}
