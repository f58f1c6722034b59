//! Text accumulator - incremental character decoding.
//!
//! Network chunks do not respect character boundaries, so a UTF-8 sequence
//! may start in one chunk and finish in the next. [`TextDecoder`] keeps the
//! unfinished lead bytes (at most three) between calls and completes the
//! character once the rest arrives. Input bytes are always consumed in full;
//! only the emission of a character can be deferred.
//!
//! # Example
//!
//! ```
//! use cstring_wire::codec::TextDecoder;
//! use cstring_wire::{Encoding, MalformedPolicy};
//!
//! let euro = "€".as_bytes(); // e2 82 ac
//! let mut decoder = TextDecoder::new(Encoding::Utf8, MalformedPolicy::Replace);
//! let mut out = String::new();
//!
//! decoder.decode(&euro[..1], &mut out).unwrap();
//! assert_eq!(out, "");
//! decoder.decode(&euro[1..], &mut out).unwrap();
//! assert_eq!(out, "€");
//! ```

use bytes::Bytes;

use crate::config::MalformedPolicy;
use crate::encoding::Encoding;
use crate::error::{ElementError, Result};

/// Stateful decoder carrying partial characters across calls.
#[derive(Debug, Clone)]
pub struct TextDecoder {
    encoding: Encoding,
    policy: MalformedPolicy,
    /// Lead bytes of a UTF-8 sequence cut off by a chunk boundary.
    pending: [u8; 4],
    pending_len: usize,
}

impl TextDecoder {
    /// Create a decoder with no carried state.
    pub fn new(encoding: Encoding, policy: MalformedPolicy) -> Self {
        Self {
            encoding,
            policy,
            pending: [0; 4],
            pending_len: 0,
        }
    }

    /// Encoding being decoded.
    #[inline]
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Bytes held back awaiting the rest of their character.
    #[inline]
    pub fn pending(&self) -> &[u8] {
        &self.pending[..self.pending_len]
    }

    /// Decode `input`, appending every completed character to `out`.
    ///
    /// # Errors
    ///
    /// Under [`MalformedPolicy::Reject`], returns
    /// [`ElementError::MalformedText`] on the first invalid sequence.
    pub fn decode(&mut self, input: &[u8], out: &mut String) -> Result<()> {
        match self.encoding {
            Encoding::Utf8 => self.decode_utf8(input, out),
            Encoding::Latin1 => {
                out.reserve(input.len());
                out.extend(input.iter().map(|&b| b as char));
                Ok(())
            }
            Encoding::Ascii => {
                out.reserve(input.len());
                for &b in input {
                    if b.is_ascii() {
                        out.push(b as char);
                    } else {
                        self.malformed(&[b], out)?;
                    }
                }
                Ok(())
            }
        }
    }

    /// Flush carried state at end of input.
    ///
    /// An unfinished sequence is malformed: it becomes one U+FFFD or an
    /// error, depending on the policy.
    pub fn finish(&mut self, out: &mut String) -> Result<()> {
        if self.pending_len == 0 {
            return Ok(());
        }
        let pending = self.pending;
        let len = self.pending_len;
        self.pending_len = 0;
        self.malformed(&pending[..len], out)
    }

    fn decode_utf8(&mut self, input: &[u8], out: &mut String) -> Result<()> {
        let mut input = input;
        if self.pending_len > 0 {
            input = self.complete_pending(input, out)?;
            if self.pending_len > 0 {
                return Ok(());
            }
        }

        out.reserve(input.len());
        let mut chunks = input.utf8_chunks().peekable();
        while let Some(chunk) = chunks.next() {
            out.push_str(chunk.valid());

            let invalid = chunk.invalid();
            if invalid.is_empty() {
                continue;
            }
            if chunks.peek().is_none() && is_incomplete_utf8(invalid) {
                self.pending[..invalid.len()].copy_from_slice(invalid);
                self.pending_len = invalid.len();
            } else {
                self.malformed(invalid, out)?;
            }
        }
        Ok(())
    }

    /// Feed leading bytes of `input` to the carried sequence.
    ///
    /// Returns the part of `input` not used to finish it.
    fn complete_pending<'a>(&mut self, input: &'a [u8], out: &mut String) -> Result<&'a [u8]> {
        let held = self.pending_len;
        let width = utf8_width(self.pending[0]);
        let take = width.saturating_sub(held).min(input.len());

        let mut candidate = self.pending;
        candidate[held..held + take].copy_from_slice(&input[..take]);
        let candidate = &candidate[..held + take];

        match std::str::from_utf8(candidate) {
            Ok(ch) => {
                out.push_str(ch);
                self.pending_len = 0;
                Ok(&input[take..])
            }
            Err(e) => match e.error_len() {
                // Still short; everything offered was absorbed
                None => {
                    self.pending[..candidate.len()].copy_from_slice(candidate);
                    self.pending_len = candidate.len();
                    Ok(&input[take..])
                }
                Some(bad) => {
                    self.pending_len = 0;
                    self.malformed(&candidate[..bad], out)?;
                    Ok(&input[bad.saturating_sub(held)..])
                }
            },
        }
    }

    fn malformed(&self, bytes: &[u8], out: &mut String) -> Result<()> {
        match self.policy {
            MalformedPolicy::Replace => {
                tracing::warn!(
                    encoding = %self.encoding,
                    bytes = ?bytes,
                    "Replacing malformed text sequence"
                );
                out.push(char::REPLACEMENT_CHARACTER);
                Ok(())
            }
            MalformedPolicy::Reject => Err(ElementError::MalformedText {
                encoding: self.encoding,
                bytes: bytes.to_vec(),
            }),
        }
    }
}

/// Sequence length announced by a UTF-8 lead byte.
#[inline]
fn utf8_width(lead: u8) -> usize {
    match lead {
        0xc0..=0xdf => 2,
        0xe0..=0xef => 3,
        _ => 4,
    }
}

/// True if `bytes` is a valid but unfinished UTF-8 sequence.
#[inline]
fn is_incomplete_utf8(bytes: &[u8]) -> bool {
    matches!(std::str::from_utf8(bytes), Err(e) if e.error_len().is_none())
}

/// Decoded text built up across `absorb` calls.
#[derive(Debug, Clone)]
pub struct TextAccumulator {
    decoder: TextDecoder,
    text: String,
}

impl TextAccumulator {
    /// Create an empty accumulator.
    pub fn new(encoding: Encoding, policy: MalformedPolicy) -> Self {
        Self {
            decoder: TextDecoder::new(encoding, policy),
            text: String::new(),
        }
    }

    /// Decode `buffer[start..end]` and return the byte count consumed.
    ///
    /// The count is always `end - start`: a split character is held by the
    /// decoder, not left in the caller's buffer. The range must already be
    /// validated by the caller.
    pub fn absorb(&mut self, buffer: &Bytes, start: usize, end: usize) -> Result<usize> {
        self.decoder.decode(&buffer[start..end], &mut self.text)?;
        Ok(end - start)
    }

    /// Text decoded so far, excluding any held partial character.
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Flush the decoder and return the accumulated text.
    pub fn finish(mut self) -> Result<String> {
        self.decoder.finish(&mut self.text)?;
        Ok(self.text)
    }
}
