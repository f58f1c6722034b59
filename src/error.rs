//! Error types for cstring-wire.

use thiserror::Error;

use crate::encoding::Encoding;

/// Main error type for all element operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ElementError {
    /// Serialization requested before the value is known.
    #[error("Element value is not known yet")]
    ValueUnknown,

    /// `feed` called on an element that already holds its value.
    #[error("Element already complete")]
    AlreadyComplete,

    /// `feed` called after a previous call failed.
    #[error("Element decode previously failed")]
    Poisoned,

    /// Byte range does not lie within the supplied buffer.
    #[error("Range {start}..{end} is invalid for a buffer of {len} bytes")]
    InvalidRange {
        /// Range start (inclusive).
        start: usize,
        /// Range end (exclusive).
        end: usize,
        /// Buffer length.
        len: usize,
    },

    /// Output buffer cannot hold the serialized element.
    #[error("Buffer too small: need {needed} bytes at offset {offset}, buffer holds {available}")]
    BufferTooSmall {
        /// Bytes the element occupies on the wire.
        needed: usize,
        /// Write offset.
        offset: usize,
        /// Output buffer length.
        available: usize,
    },

    /// Value no longer encodes to the element's wire length.
    ///
    /// Happens when a decoded text value had malformed bytes replaced.
    #[error("Value encodes to {encoded} payload bytes but element length is {length}")]
    LengthMismatch {
        /// Element length, terminator included.
        length: usize,
        /// Encoded payload size of the current value.
        encoded: usize,
    },

    /// Value would encode with a zero byte before its terminator.
    #[error("Value contains a NUL byte at position {position}")]
    InteriorNul {
        /// Byte offset of the zero byte within the encoded payload.
        position: usize,
    },

    /// Character outside the repertoire of the configured encoding.
    #[error("Character {ch:?} cannot be encoded as {encoding}")]
    Unencodable {
        /// The offending character.
        ch: char,
        /// Target encoding.
        encoding: Encoding,
    },

    /// Invalid byte sequence under [`MalformedPolicy::Reject`](crate::MalformedPolicy::Reject).
    #[error("Malformed {encoding} sequence: {bytes:02x?}")]
    MalformedText {
        /// Encoding being decoded.
        encoding: Encoding,
        /// The invalid bytes.
        bytes: Vec<u8>,
    },

    /// Encoding identifier not recognised.
    #[error("Unknown encoding: {0}")]
    UnknownEncoding(String),
}

/// Result type alias using ElementError.
pub type Result<T> = std::result::Result<T, ElementError>;
