//! Text encodings understood by null-terminated fields.
//!
//! Only encodings in which the byte `0x00` stands for U+0000 and nothing
//! else are offered, so a single zero byte always marks the end of a field.
//! Multi-byte-unit encodings such as UTF-16 are excluded for that reason.
//!
//! # Example
//!
//! ```
//! use cstring_wire::Encoding;
//!
//! let enc: Encoding = "UTF-8".parse().unwrap();
//! assert_eq!(enc, Encoding::Utf8);
//! assert_eq!(enc.encoded_len("héllo").unwrap(), 6);
//! assert_eq!(Encoding::Latin1.encoded_len("héllo").unwrap(), 5);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ElementError, Result};

/// Character encoding applied to a text field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// UTF-8, one to four bytes per character.
    #[serde(alias = "utf-8")]
    Utf8,
    /// ISO-8859-1, one byte per character (U+0000..=U+00FF).
    #[serde(alias = "binary", alias = "iso-8859-1")]
    Latin1,
    /// 7-bit ASCII, one byte per character (U+0000..=U+007F).
    Ascii,
}

impl Encoding {
    /// Canonical lowercase identifier.
    pub fn name(self) -> &'static str {
        match self {
            Encoding::Utf8 => "utf8",
            Encoding::Latin1 => "latin1",
            Encoding::Ascii => "ascii",
        }
    }

    /// Highest code point representable in a single byte, if the encoding is single-byte.
    fn single_byte_max(self) -> Option<u32> {
        match self {
            Encoding::Utf8 => None,
            Encoding::Latin1 => Some(0xff),
            Encoding::Ascii => Some(0x7f),
        }
    }

    /// Number of bytes `text` occupies once encoded (terminator excluded).
    ///
    /// # Errors
    ///
    /// Returns [`ElementError::Unencodable`] if a character is outside the
    /// encoding's repertoire.
    pub fn encoded_len(self, text: &str) -> Result<usize> {
        match self.single_byte_max() {
            None => Ok(text.len()),
            Some(max) => {
                let mut len = 0;
                for ch in text.chars() {
                    if ch as u32 > max {
                        return Err(ElementError::Unencodable { ch, encoding: self });
                    }
                    len += 1;
                }
                Ok(len)
            }
        }
    }

    /// Encode `text` into the front of `buf`, returning the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns [`ElementError::Unencodable`] for characters outside the
    /// repertoire and [`ElementError::BufferTooSmall`] if `buf` is short.
    pub fn encode_into(self, text: &str, buf: &mut [u8]) -> Result<usize> {
        let needed = self.encoded_len(text)?;
        if buf.len() < needed {
            return Err(ElementError::BufferTooSmall {
                needed,
                offset: 0,
                available: buf.len(),
            });
        }

        match self {
            Encoding::Utf8 => buf[..needed].copy_from_slice(text.as_bytes()),
            // encoded_len already rejected anything wider than one byte
            Encoding::Latin1 | Encoding::Ascii => {
                for (slot, ch) in buf.iter_mut().zip(text.chars()) {
                    *slot = ch as u8;
                }
            }
        }
        Ok(needed)
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Encoding {
    type Err = ElementError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "utf8" | "utf-8" => Ok(Encoding::Utf8),
            "latin1" | "binary" | "iso-8859-1" => Ok(Encoding::Latin1),
            "ascii" | "us-ascii" => Ok(Encoding::Ascii),
            _ => Err(ElementError::UnknownEncoding(s.to_string())),
        }
    }
}
