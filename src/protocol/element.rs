//! Contract shared by protocol elements.
//!
//! A message is a sequence of elements. The framing layer encodes a message
//! by asking each element for its wire length and letting it serialize
//! itself at the right offset, and decodes one by feeding each element the
//! bytes that follow the previous one.
//!
//! # Example
//!
//! ```
//! use cstring_wire::protocol::{encode_elements, Element, NullTerminatedString};
//! use cstring_wire::Encoding;
//!
//! let user = NullTerminatedString::text(Encoding::Utf8, "root").unwrap();
//! let db = NullTerminatedString::text(Encoding::Utf8, "app").unwrap();
//!
//! let bytes = encode_elements(&[&user, &db]).unwrap();
//! assert_eq!(&bytes[..], b"root\0app\0");
//! ```

use bytes::{Bytes, BytesMut};

use crate::error::{ElementError, Result};

/// A value with a known wire length that can write itself into a buffer.
pub trait Element {
    /// Bytes this element occupies on the wire, or `None` while unknown.
    fn length(&self) -> Option<usize>;

    /// Write the element into `buf` starting at `offset`.
    ///
    /// # Errors
    ///
    /// Fails if the value is not known yet or `buf` is too short.
    fn serialize_into(&self, buf: &mut [u8], offset: usize) -> Result<()>;
}

/// An element that can be decoded from successive byte ranges.
pub trait Decode {
    /// Absorb `buffer[start..end]`; returns `true` once the element is complete.
    ///
    /// After a `false` return the next call must carry only new bytes.
    fn feed(&mut self, buffer: &Bytes, start: usize, end: usize) -> Result<bool>;

    /// Bytes consumed so far, including any terminator.
    fn bytes_written(&self) -> usize;
}

/// Serialize `elements` back to back into one buffer.
///
/// # Errors
///
/// Returns [`ElementError::ValueUnknown`] if any element has no length yet,
/// or the first serialization error.
pub fn encode_elements(elements: &[&dyn Element]) -> Result<Bytes> {
    let mut total = 0usize;
    for element in elements {
        total += element.length().ok_or(ElementError::ValueUnknown)?;
    }

    let mut buf = BytesMut::zeroed(total);
    let mut offset = 0;
    for element in elements {
        element.serialize_into(&mut buf, offset)?;
        offset += element.length().ok_or(ElementError::ValueUnknown)?;
    }
    Ok(buf.freeze())
}
