//! Null-terminated string element.
//!
//! A variable-length field whose end is marked by a single zero byte:
//!
//! ```text
//! ┌──────────────────────────┬──────┐
//! │ payload (no 0x00 inside) │ 0x00 │
//! └──────────────────────────┴──────┘
//! ```
//!
//! With an [`Encoding`] the payload is text; without one it is opaque bytes.
//! `length` always counts the terminator, whichever way the element was made.
//!
//! Decoding is incremental. The framing layer presents ranges of its
//! incoming buffer until `feed` reports completion:
//!
//! - `Idle`: value-less, no bytes seen yet
//! - `Decoding`: accumulator chosen, waiting for the terminator
//! - `Complete`: value and length known
//!
//! # Example
//!
//! ```
//! use bytes::Bytes;
//! use cstring_wire::protocol::NullTerminatedString;
//! use cstring_wire::Encoding;
//!
//! let mut field = NullTerminatedString::new(Some(Encoding::Utf8));
//!
//! let first = Bytes::from_static(b"a");
//! assert!(!field.feed(&first, 0, 1).unwrap());
//!
//! let second = Bytes::from_static(b"b\0trailing");
//! assert!(field.feed(&second, 0, second.len()).unwrap());
//!
//! assert_eq!(field.value().and_then(|v| v.as_text()), Some("ab"));
//! assert_eq!(field.length(), Some(3));
//! ```

use bytes::{Bytes, BytesMut};

use super::element::{Decode, Element};
use super::scan::{find_terminator, TERMINATOR};
use crate::codec::Accumulator;
use crate::config::ElementConfig;
use crate::encoding::Encoding;
use crate::error::{ElementError, Result};

/// Value carried by a null-terminated field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Decoded text (an encoding is configured).
    Text(String),
    /// Opaque payload bytes (no encoding).
    Bytes(Bytes),
}

impl Value {
    /// Text, if this is a text value.
    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            Value::Bytes(_) => None,
        }
    }

    /// Payload bytes, if this is a raw value.
    #[inline]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Text(_) => None,
            Value::Bytes(bytes) => Some(bytes),
        }
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Text(text)
    }
}

impl From<Bytes> for Value {
    fn from(bytes: Bytes) -> Self {
        Value::Bytes(bytes)
    }
}

/// Decode progress.
#[derive(Debug)]
enum State {
    /// Built with a value; nothing to decode.
    Known,
    /// No bytes seen yet.
    Idle,
    /// Accumulator selected, terminator not seen.
    Decoding(Accumulator),
    /// Terminator seen, value finalized.
    Complete,
    /// A previous `feed` returned an error.
    Failed,
}

/// A null-terminated string field.
///
/// Built either with a known value (for encoding) or value-less (for
/// decoding). An instance decodes at most once; there is no reset.
#[derive(Debug)]
pub struct NullTerminatedString {
    config: ElementConfig,
    value: Option<Value>,
    /// Wire length including the terminator.
    length: Option<usize>,
    /// Bytes consumed by `feed` so far.
    bytes_written: usize,
    state: State,
}

impl NullTerminatedString {
    /// Create a value-less element for decoding.
    ///
    /// `None` decodes the payload as raw bytes.
    pub fn new(encoding: Option<Encoding>) -> Self {
        Self::with_config(ElementConfig {
            encoding,
            ..ElementConfig::default()
        })
    }

    /// Create a value-less element from a field configuration.
    pub fn with_config(config: ElementConfig) -> Self {
        Self {
            config,
            value: None,
            length: None,
            bytes_written: 0,
            state: State::Idle,
        }
    }

    /// Create a text element ready to serialize.
    ///
    /// # Errors
    ///
    /// Returns [`ElementError::Unencodable`] if `value` has characters the
    /// encoding cannot represent, or [`ElementError::InteriorNul`] if it
    /// contains U+0000.
    pub fn text(encoding: Encoding, value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        let encoded = encoding.encoded_len(&value)?;
        if let Some(idx) = value.find('\0') {
            return Err(ElementError::InteriorNul {
                position: encoding.encoded_len(&value[..idx])?,
            });
        }

        Ok(Self {
            config: ElementConfig::new().with_encoding(encoding),
            value: Some(Value::Text(value)),
            length: Some(encoded + 1),
            bytes_written: 0,
            state: State::Known,
        })
    }

    /// Create a raw-bytes element ready to serialize.
    ///
    /// # Errors
    ///
    /// Returns [`ElementError::InteriorNul`] if `value` contains a zero byte.
    pub fn bytes(value: impl Into<Bytes>) -> Result<Self> {
        let value = value.into();
        if let Some(position) = find_terminator(&value, 0, value.len()) {
            return Err(ElementError::InteriorNul { position });
        }

        Ok(Self {
            config: ElementConfig::new(),
            length: Some(value.len() + 1),
            value: Some(Value::Bytes(value)),
            bytes_written: 0,
            state: State::Known,
        })
    }

    /// Configured text encoding, if any.
    #[inline]
    pub fn encoding(&self) -> Option<Encoding> {
        self.config.encoding
    }

    /// Field configuration.
    #[inline]
    pub fn config(&self) -> &ElementConfig {
        &self.config
    }

    /// Wire length including the terminator, once known.
    #[inline]
    pub fn length(&self) -> Option<usize> {
        self.length
    }

    /// The value, once supplied or fully decoded.
    #[inline]
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Take the value out of the element.
    #[inline]
    pub fn into_value(self) -> Option<Value> {
        self.value
    }

    /// Bytes consumed by `feed` so far, terminator included once seen.
    #[inline]
    pub fn bytes_written(&self) -> usize {
        self.bytes_written
    }

    /// Check if the value is known.
    #[inline]
    pub fn is_complete(&self) -> bool {
        matches!(self.state, State::Known | State::Complete)
    }

    /// Absorb `buffer[start..end]`; returns `true` once the terminator is seen.
    ///
    /// Bytes after the terminator are left untouched for the next element;
    /// `bytes_written` tells the caller how far this element reached. After
    /// a `false` return the next call must present only new bytes.
    ///
    /// # Errors
    ///
    /// - [`ElementError::InvalidRange`] if the range is not inside `buffer`
    /// - [`ElementError::AlreadyComplete`] if the value is already known
    /// - [`ElementError::MalformedText`] under the reject policy
    /// - [`ElementError::Poisoned`] once a call has failed with `MalformedText`
    pub fn feed(&mut self, buffer: &Bytes, start: usize, end: usize) -> Result<bool> {
        if start > end || end > buffer.len() {
            return Err(ElementError::InvalidRange {
                start,
                end,
                len: buffer.len(),
            });
        }

        let mut acc = match std::mem::replace(&mut self.state, State::Failed) {
            State::Idle => {
                let acc = Accumulator::for_config(&self.config);
                tracing::trace!(kind = acc.kind(), "Selected accumulator");
                acc
            }
            State::Decoding(acc) => acc,
            State::Known => {
                self.state = State::Known;
                return Err(ElementError::AlreadyComplete);
            }
            State::Complete => {
                self.state = State::Complete;
                return Err(ElementError::AlreadyComplete);
            }
            State::Failed => return Err(ElementError::Poisoned),
        };

        let terminator = find_terminator(buffer, start, end);
        let payload_end = terminator.unwrap_or(end);

        // Errors below leave the element in `Failed`
        self.bytes_written += acc.absorb(buffer, start, payload_end)?;

        if terminator.is_none() {
            self.state = State::Decoding(acc);
            return Ok(false);
        }

        self.bytes_written += 1;
        self.value = Some(acc.finish()?);
        self.length = Some(self.bytes_written);
        self.state = State::Complete;

        tracing::trace!(length = self.bytes_written, "Null-terminated element complete");
        Ok(true)
    }

    /// Write payload and terminator into `buf` at `offset`.
    ///
    /// # Errors
    ///
    /// - [`ElementError::ValueUnknown`] before the value is known
    /// - [`ElementError::BufferTooSmall`] if `buf` cannot hold `length` bytes at `offset`
    /// - [`ElementError::LengthMismatch`] if a decoded text value no longer
    ///   encodes to its wire length (malformed bytes were replaced)
    pub fn serialize_into(&self, buf: &mut [u8], offset: usize) -> Result<()> {
        let (value, length) = match (&self.value, self.length) {
            (Some(value), Some(length)) => (value, length),
            _ => return Err(ElementError::ValueUnknown),
        };

        let end = offset
            .checked_add(length)
            .filter(|&end| end <= buf.len())
            .ok_or(ElementError::BufferTooSmall {
                needed: length,
                offset,
                available: buf.len(),
            })?;
        let payload = &mut buf[offset..end - 1];

        match value {
            Value::Text(text) => {
                let encoding = self.config.encoding.unwrap_or(Encoding::Utf8);
                let encoded = encoding.encoded_len(text)?;
                if encoded != payload.len() {
                    return Err(ElementError::LengthMismatch { length, encoded });
                }
                encoding.encode_into(text, payload)?;
            }
            Value::Bytes(bytes) => {
                if bytes.len() != payload.len() {
                    return Err(ElementError::LengthMismatch {
                        length,
                        encoded: bytes.len(),
                    });
                }
                payload.copy_from_slice(bytes);
            }
        }

        buf[end - 1] = TERMINATOR;
        Ok(())
    }

    /// Serialize into a freshly allocated buffer.
    pub fn encode(&self) -> Result<Bytes> {
        let length = self.length.ok_or(ElementError::ValueUnknown)?;
        let mut buf = BytesMut::zeroed(length);
        self.serialize_into(&mut buf, 0)?;
        Ok(buf.freeze())
    }
}

impl Element for NullTerminatedString {
    #[inline]
    fn length(&self) -> Option<usize> {
        self.length
    }

    #[inline]
    fn serialize_into(&self, buf: &mut [u8], offset: usize) -> Result<()> {
        NullTerminatedString::serialize_into(self, buf, offset)
    }
}

impl Decode for NullTerminatedString {
    #[inline]
    fn feed(&mut self, buffer: &Bytes, start: usize, end: usize) -> Result<bool> {
        NullTerminatedString::feed(self, buffer, start, end)
    }

    #[inline]
    fn bytes_written(&self) -> usize {
        self.bytes_written
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MalformedPolicy;

    /// Feed `chunks` one by one, collecting every completion flag.
    fn feed_chunks(element: &mut NullTerminatedString, chunks: &[&[u8]]) -> Vec<bool> {
        chunks
            .iter()
            .map(|chunk| {
                let buffer = Bytes::copy_from_slice(chunk);
                element.feed(&buffer, 0, buffer.len()).unwrap()
            })
            .collect()
    }

    #[test]
    fn test_text_length_counts_terminator() {
        let element = NullTerminatedString::text(Encoding::Utf8, "héllo").unwrap();
        assert_eq!(element.length(), Some(7));
        assert!(element.is_complete());
    }

    #[test]
    fn test_bytes_length_counts_terminator() {
        let element = NullTerminatedString::bytes(&b"abc"[..]).unwrap();
        assert_eq!(element.length(), Some(4));
        assert_eq!(&element.encode().unwrap()[..], b"abc\0");
    }

    #[test]
    fn test_value_less_has_no_length() {
        let element = NullTerminatedString::new(Some(Encoding::Utf8));
        assert_eq!(element.length(), None);
        assert!(element.value().is_none());
        assert_eq!(element.bytes_written(), 0);
        assert!(!element.is_complete());
    }

    #[test]
    fn test_interior_nul_rejected() {
        let err = NullTerminatedString::text(Encoding::Utf8, "é\0x").unwrap_err();
        assert_eq!(err, ElementError::InteriorNul { position: 2 });

        let err = NullTerminatedString::text(Encoding::Latin1, "é\0x").unwrap_err();
        assert_eq!(err, ElementError::InteriorNul { position: 1 });

        let err = NullTerminatedString::bytes(vec![1u8, 0, 2]).unwrap_err();
        assert_eq!(err, ElementError::InteriorNul { position: 1 });
    }

    #[test]
    fn test_unencodable_rejected() {
        let err = NullTerminatedString::text(Encoding::Ascii, "naïve").unwrap_err();
        assert!(matches!(err, ElementError::Unencodable { ch: 'ï', .. }));
    }

    #[test]
    fn test_serialize_at_offset() {
        let element = NullTerminatedString::text(Encoding::Utf8, "abc").unwrap();
        let mut buf = [0xffu8; 8];
        element.serialize_into(&mut buf, 2).unwrap();
        assert_eq!(buf, [0xff, 0xff, b'a', b'b', b'c', 0, 0xff, 0xff]);
    }

    #[test]
    fn test_serialize_latin1() {
        let element = NullTerminatedString::text(Encoding::Latin1, "café").unwrap();
        assert_eq!(&element.encode().unwrap()[..], b"caf\xe9\0");
    }

    #[test]
    fn test_serialize_empty_value() {
        let element = NullTerminatedString::text(Encoding::Utf8, "").unwrap();
        assert_eq!(element.length(), Some(1));
        assert_eq!(&element.encode().unwrap()[..], b"\0");
    }

    #[test]
    fn test_serialize_buffer_too_small() {
        let element = NullTerminatedString::text(Encoding::Utf8, "abc").unwrap();
        let mut buf = [0u8; 5];
        let err = element.serialize_into(&mut buf, 2).unwrap_err();
        assert_eq!(
            err,
            ElementError::BufferTooSmall {
                needed: 4,
                offset: 2,
                available: 5
            }
        );
    }

    #[test]
    fn test_serialize_without_value() {
        let element = NullTerminatedString::new(None);
        let mut buf = [0u8; 8];
        assert_eq!(
            element.serialize_into(&mut buf, 0).unwrap_err(),
            ElementError::ValueUnknown
        );
        assert_eq!(element.encode().unwrap_err(), ElementError::ValueUnknown);
    }

    #[test]
    fn test_decode_single_call() {
        let mut element = NullTerminatedString::new(Some(Encoding::Utf8));
        assert_eq!(feed_chunks(&mut element, &[b"ab\0"]), vec![true]);
        assert_eq!(element.value(), Some(&Value::Text("ab".into())));
        assert_eq!(element.length(), Some(3));
    }

    #[test]
    fn test_decode_split_call() {
        let mut element = NullTerminatedString::new(Some(Encoding::Utf8));
        assert_eq!(feed_chunks(&mut element, &[b"a", b"b\0"]), vec![false, true]);
        assert_eq!(element.value(), Some(&Value::Text("ab".into())));
        assert_eq!(element.length(), Some(3));
    }

    #[test]
    fn test_value_hidden_until_complete() {
        let mut element = NullTerminatedString::new(Some(Encoding::Utf8));
        feed_chunks(&mut element, &[b"partial"]);
        assert!(element.value().is_none());
        assert_eq!(element.length(), None);
        assert_eq!(element.bytes_written(), 7);
    }

    #[test]
    fn test_decode_raw_chunks() {
        let mut element = NullTerminatedString::new(None);
        assert_eq!(
            feed_chunks(&mut element, &[&[0x41, 0x42], &[0x43, 0x00]]),
            vec![false, true]
        );
        assert_eq!(
            element.value().and_then(Value::as_bytes),
            Some(&[0x41, 0x42, 0x43][..])
        );
        assert_eq!(element.length(), Some(4));
    }

    #[test]
    fn test_decode_raw_single_chunk_is_zero_copy() {
        let buffer = Bytes::from_static(b"xxpayload\0rest");
        let mut element = NullTerminatedString::new(None);

        assert!(element.feed(&buffer, 2, buffer.len()).unwrap());

        let value = element.into_value().unwrap();
        let bytes = value.as_bytes().unwrap();
        assert_eq!(bytes, b"payload");
        assert_eq!(bytes.as_ptr(), buffer[2..].as_ptr());
    }

    #[test]
    fn test_decode_empty_payload() {
        let mut element = NullTerminatedString::new(None);
        assert_eq!(feed_chunks(&mut element, &[b"\0"]), vec![true]);
        assert_eq!(element.value().and_then(Value::as_bytes), Some(&b""[..]));
        assert_eq!(element.length(), Some(1));
    }

    #[test]
    fn test_empty_feed_is_not_completion() {
        let mut element = NullTerminatedString::new(Some(Encoding::Utf8));
        assert_eq!(
            feed_chunks(&mut element, &[b"", b"x", b"", b"\0"]),
            vec![false, false, false, true]
        );
        assert_eq!(element.length(), Some(2));
    }

    #[test]
    fn test_stops_at_first_terminator() {
        let buffer = Bytes::from_static(b"one\0two\0");
        let mut element = NullTerminatedString::new(Some(Encoding::Ascii));

        assert!(element.feed(&buffer, 0, buffer.len()).unwrap());
        assert_eq!(element.value().and_then(Value::as_text), Some("one"));
        assert_eq!(element.bytes_written(), 4);
    }

    #[test]
    fn test_feed_range_in_middle_of_buffer() {
        let buffer = Bytes::from_static(b"\0\0abc\0\0");
        let mut element = NullTerminatedString::new(Some(Encoding::Utf8));

        assert!(!element.feed(&buffer, 2, 4).unwrap());
        assert!(element.feed(&buffer, 4, 7).unwrap());
        assert_eq!(element.value().and_then(Value::as_text), Some("abc"));
        assert_eq!(element.length(), Some(4));
    }

    #[test]
    fn test_split_multibyte_char() {
        let mut bytes = "€".as_bytes().to_vec();
        bytes.push(0);

        let mut element = NullTerminatedString::new(Some(Encoding::Utf8));
        assert_eq!(
            feed_chunks(&mut element, &[&bytes[..1], &bytes[1..]]),
            vec![false, true]
        );
        assert_eq!(element.value().and_then(Value::as_text), Some("€"));
        assert_eq!(element.length(), Some(4));
    }

    #[test]
    fn test_truncated_char_replaced_at_completion() {
        let mut element = NullTerminatedString::new(Some(Encoding::Utf8));
        assert_eq!(feed_chunks(&mut element, &[b"a\xe2\x82", b"\0"]), vec![false, true]);
        assert_eq!(element.value().and_then(Value::as_text), Some("a\u{FFFD}"));
        assert_eq!(element.length(), Some(4));

        // The replacement widens the value, so it cannot be re-serialized as-is
        assert_eq!(
            element.encode().unwrap_err(),
            ElementError::LengthMismatch {
                length: 4,
                encoded: 4
            }
        );
    }

    #[test]
    fn test_reject_policy_poisons_element() {
        let config = ElementConfig::new()
            .with_encoding(Encoding::Utf8)
            .with_malformed(MalformedPolicy::Reject);
        let mut element = NullTerminatedString::with_config(config);

        let buffer = Bytes::from_static(b"a\xe2\x82\0");
        let err = element.feed(&buffer, 0, buffer.len()).unwrap_err();
        assert_eq!(
            err,
            ElementError::MalformedText {
                encoding: Encoding::Utf8,
                bytes: vec![0xe2, 0x82],
            }
        );
        assert!(element.value().is_none());
        assert_eq!(element.length(), None);

        let err = element.feed(&buffer, 0, buffer.len()).unwrap_err();
        assert_eq!(err, ElementError::Poisoned);
    }

    #[test]
    fn test_feed_after_complete() {
        let mut element = NullTerminatedString::new(None);
        feed_chunks(&mut element, &[b"x\0"]);

        let buffer = Bytes::from_static(b"y\0");
        assert_eq!(
            element.feed(&buffer, 0, 2).unwrap_err(),
            ElementError::AlreadyComplete
        );
        // Still usable
        assert_eq!(element.length(), Some(2));
    }

    #[test]
    fn test_feed_on_known_value() {
        let mut element = NullTerminatedString::text(Encoding::Utf8, "abc").unwrap();
        let buffer = Bytes::from_static(b"z\0");
        assert_eq!(
            element.feed(&buffer, 0, 2).unwrap_err(),
            ElementError::AlreadyComplete
        );
        assert_eq!(element.length(), Some(4));
    }

    #[test]
    fn test_invalid_range_does_not_poison() {
        let mut element = NullTerminatedString::new(None);
        let buffer = Bytes::from_static(b"abc\0");

        assert_eq!(
            element.feed(&buffer, 3, 2).unwrap_err(),
            ElementError::InvalidRange {
                start: 3,
                end: 2,
                len: 4
            }
        );
        assert!(matches!(
            element.feed(&buffer, 0, 9),
            Err(ElementError::InvalidRange { .. })
        ));

        assert!(element.feed(&buffer, 0, 4).unwrap());
        assert_eq!(element.length(), Some(4));
    }

    #[test]
    fn test_decoded_value_reserializes() {
        let mut element = NullTerminatedString::new(Some(Encoding::Latin1));
        feed_chunks(&mut element, &[b"na\xefve\0"]);
        assert_eq!(element.value().and_then(Value::as_text), Some("naïve"));
        assert_eq!(&element.encode().unwrap()[..], b"na\xefve\0");
    }
}
