// SPDX-License-Identifier: AGPL-3.0-or-later
//! Handle configuration
//!
//! ```toml
//! fallback_mime_type = "application/octet-stream"
//!
//! [raw]
//! append_extension = true
//! sort_listings = true
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{PfError, PfResult};
use crate::mime::OCTET_STREAM;

/// Settings shared by every handle created from one factory call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderFileConfig {
    /// MIME type reported for raw files with an unknown extension
    pub fallback_mime_type: String,
    pub raw: RawConfig,
}

/// Raw (native filesystem) handle settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// Append the MIME type's extension to names passed to `create_file`
    pub append_extension: bool,
    /// Sort `list_files` results by file name
    pub sort_listings: bool,
}

impl Default for ProviderFileConfig {
    fn default() -> Self {
        Self {
            fallback_mime_type: OCTET_STREAM.to_string(),
            raw: RawConfig::default(),
        }
    }
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            append_extension: true,
            sort_listings: true,
        }
    }
}

impl ProviderFileConfig {
    pub fn from_toml_str(s: &str) -> PfResult<Self> {
        toml::from_str(s).map_err(|e| PfError::Config(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> PfResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| PfError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> PfResult<String> {
        toml::to_string_pretty(self).map_err(|e| PfError::Config(e.to_string()))
    }
}
