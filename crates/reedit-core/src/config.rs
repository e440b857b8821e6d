//! Engine configuration
//!
//! Every field has a default, so `{}` is a complete configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{EditError, Result};
use crate::logging_facility::Profile;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Logging profile passed to `logging_facility::init`
    pub profile: Profile,

    /// Whether the edit registry accepts registrations from the start
    pub open_on_start: bool,

    /// Whether edits sharing a stack key undo and redo together
    pub stack_edits: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            profile: Profile::Development,
            open_on_start: true,
            stack_edits: true,
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from JSON
    ///
    /// # Errors
    ///
    /// Returns `EditError::Config` for malformed JSON or unknown fields.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON configuration file
    ///
    /// # Errors
    ///
    /// Returns `EditError::Config` if the file cannot be read or parsed.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| EditError::Config {
            reason: format!("cannot read {}: {}", path.display(), e),
        })?;
        Self::from_json_str(&json)
    }
}
