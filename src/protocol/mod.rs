//! Protocol module - element contract, terminator scanning, and the
//! null-terminated string element.
//!
//! This module implements the wire-level side of the field:
//! - `Element`/`Decode` traits shared with other element kinds
//! - Terminator scanning within a chunk
//! - `NullTerminatedString` with one-shot encode and incremental decode

mod element;
mod null_terminated;
mod scan;

pub use element::{encode_elements, Decode, Element};
pub use null_terminated::{NullTerminatedString, Value};
pub use scan::{find_terminator, TERMINATOR};
