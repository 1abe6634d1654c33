//! Options loaded from JSON
//!
//! ```json
//! { "writer": { "use_braces": false }, "key_format": "%a%Y", "merge_policy": "overwrite" }
//! ```
//!
//! Every section is optional.

use crate::error::Result;
use crate::keygen::KeyFormat;
use crate::model::MergePolicy;
use crate::writer::WriterConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Everything configurable in one place
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Output options
    pub writer: WriterConfig,
    /// Template for generated keys
    pub key_format: KeyFormat,
    /// How re-parsed data is merged into a document
    pub merge_policy: MergePolicy,
}

impl Config {
    /// Parse a JSON configuration
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read a JSON configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}
