//! Codec module - payload accumulators for incremental decoding.
//!
//! An element absorbs its payload through exactly one accumulator:
//!
//! - [`TextAccumulator`] - resumable character decoding into a `String`
//! - [`RawAccumulator`] - zero-copy retention of `Bytes` views
//!
//! # Design
//!
//! [`Accumulator`] is a plain enum rather than a trait object. The variant is
//! chosen once, on the first `feed`, from the element's configuration and
//! never changes afterwards.

mod raw;
mod text;

pub use raw::RawAccumulator;
pub use text::{TextAccumulator, TextDecoder};

use bytes::Bytes;

use crate::config::ElementConfig;
use crate::error::Result;
use crate::protocol::Value;

/// Payload accumulator selected by the presence of an encoding.
#[derive(Debug)]
pub enum Accumulator {
    /// Decoding text.
    Text(TextAccumulator),
    /// Collecting raw bytes.
    Raw(RawAccumulator),
}

impl Accumulator {
    /// Pick the accumulator a field with this configuration needs.
    pub fn for_config(config: &ElementConfig) -> Self {
        match config.encoding {
            Some(encoding) => Accumulator::Text(TextAccumulator::new(encoding, config.malformed)),
            None => Accumulator::Raw(RawAccumulator::new()),
        }
    }

    /// Absorb `buffer[start..end]`, returning the number of bytes consumed.
    #[inline]
    pub fn absorb(&mut self, buffer: &Bytes, start: usize, end: usize) -> Result<usize> {
        match self {
            Accumulator::Text(acc) => acc.absorb(buffer, start, end),
            Accumulator::Raw(acc) => Ok(acc.absorb(buffer, start, end)),
        }
    }

    /// Convert the absorbed payload into the element's value.
    pub fn finish(self) -> Result<Value> {
        match self {
            Accumulator::Text(acc) => acc.finish().map(Value::Text),
            Accumulator::Raw(acc) => Ok(Value::Bytes(acc.finish())),
        }
    }

    /// Short name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Accumulator::Text(_) => "text",
            Accumulator::Raw(_) => "raw",
        }
    }
}
