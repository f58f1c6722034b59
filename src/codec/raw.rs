//! Raw accumulator - zero-copy collection of byte payloads.
//!
//! Each absorbed range is retained as a `bytes::Bytes` view into the
//! caller's buffer (a reference-count bump, no copy). The views are joined
//! only when the terminator arrives, and not at all when the whole payload
//! came in a single chunk.
//!
//! Because `Bytes` keeps its backing storage alive, the caller is free to
//! drop or split its own handle after each call. A transport that recycles
//! one `BytesMut` must `split().freeze()` before handing data over, as
//! `FrameBuffer`-style readers already do.
//!
//! # Example
//!
//! ```
//! use bytes::Bytes;
//! use cstring_wire::codec::RawAccumulator;
//!
//! let chunk = Bytes::from_static(b"hello world");
//! let mut acc = RawAccumulator::new();
//! acc.absorb(&chunk, 0, 5);
//!
//! let value = acc.finish();
//! assert_eq!(&value[..], b"hello");
//! assert_eq!(value.as_ptr(), chunk.as_ptr()); // Same memory
//! ```

use bytes::{Bytes, BytesMut};

/// Ordered list of payload slices awaiting concatenation.
#[derive(Debug, Default)]
pub struct RawAccumulator {
    /// Retained views, in arrival order. Empty ranges are never stored.
    slices: Vec<Bytes>,
    /// Sum of `slices` lengths.
    len: usize,
}

impl RawAccumulator {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Retain a view of `buffer[start..end]` and return the byte count absorbed.
    ///
    /// The range must already be validated by the caller.
    pub fn absorb(&mut self, buffer: &Bytes, start: usize, end: usize) -> usize {
        let n = end - start;
        if n > 0 {
            self.slices.push(buffer.slice(start..end));
            self.len += n;
        }
        n
    }

    /// Total bytes retained so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if nothing has been retained.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of distinct views held.
    #[inline]
    pub fn slice_count(&self) -> usize {
        self.slices.len()
    }

    /// Produce the contiguous payload.
    ///
    /// A single retained view is returned as-is; several are copied once
    /// into a buffer of exactly the right size.
    pub fn finish(mut self) -> Bytes {
        match self.slices.len() {
            0 => Bytes::new(),
            1 => self.slices.pop().unwrap_or_default(),
            _ => {
                let mut out = BytesMut::with_capacity(self.len);
                for slice in &self.slices {
                    out.extend_from_slice(slice);
                }
                out.freeze()
            }
        }
    }
}
