//! Per-field decoding configuration.
//!
//! A framing layer usually knows its field layout up front (from a protocol
//! table or a config file). [`ElementConfig`] captures what a single
//! null-terminated field needs and can be deserialized from JSON or any
//! other serde format.
//!
//! # Example
//!
//! ```
//! use cstring_wire::{ElementConfig, Encoding, MalformedPolicy};
//!
//! let config = ElementConfig::new()
//!     .with_encoding(Encoding::Utf8)
//!     .with_malformed(MalformedPolicy::Reject);
//!
//! assert_eq!(config.encoding, Some(Encoding::Utf8));
//! ```

use serde::{Deserialize, Serialize};

use crate::encoding::Encoding;

/// What to do with byte sequences that are not valid in the configured encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPolicy {
    /// Substitute U+FFFD for each invalid sequence.
    #[default]
    Replace,
    /// Fail the `feed` call that observed the invalid sequence.
    Reject,
}

/// Configuration for one null-terminated field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementConfig {
    /// Text encoding; `None` decodes the field as raw bytes.
    pub encoding: Option<Encoding>,
    /// Handling of invalid text. Ignored for raw fields.
    pub malformed: MalformedPolicy,
}

impl ElementConfig {
    /// Raw-bytes field with the default policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the text encoding.
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = Some(encoding);
        self
    }

    /// Set the malformed-input policy.
    pub fn with_malformed(mut self, malformed: MalformedPolicy) -> Self {
        self.malformed = malformed;
        self
    }
}
