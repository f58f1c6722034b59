//! # cstring-wire
//!
//! Incremental codec for null-terminated string fields in binary
//! client/server protocols.
//!
//! A field is a payload followed by a single `0x00`. Network reads rarely
//! line up with field boundaries, so decoding is driven one byte range at a
//! time until the terminator shows up; encoding writes a known value in
//! one shot.
//!
//! ## Architecture
//!
//! - **Protocol**: the [`Element`](protocol::Element) contract, terminator
//!   scanning, and [`NullTerminatedString`](protocol::NullTerminatedString)
//! - **Codec**: payload accumulators, resumable text decoding and
//!   zero-copy raw collection
//!
//! ## Example
//!
//! ```
//! use bytes::Bytes;
//! use cstring_wire::{Encoding, NullTerminatedString};
//!
//! // Encode
//! let field = NullTerminatedString::text(Encoding::Utf8, "abc").unwrap();
//! let wire = field.encode().unwrap();
//! assert_eq!(&wire[..], b"abc\0");
//!
//! // Decode, one chunk at a time
//! let mut decoded = NullTerminatedString::new(Some(Encoding::Utf8));
//! assert!(!decoded.feed(&wire, 0, 2).unwrap());
//! assert!(decoded.feed(&wire, 2, 4).unwrap());
//! assert_eq!(decoded.value().and_then(|v| v.as_text()), Some("abc"));
//! assert_eq!(decoded.length(), Some(4));
//! ```

pub mod codec;
pub mod config;
pub mod encoding;
pub mod error;
pub mod protocol;

pub use config::{ElementConfig, MalformedPolicy};
pub use encoding::Encoding;
pub use error::ElementError;
pub use protocol::{NullTerminatedString, Value};
