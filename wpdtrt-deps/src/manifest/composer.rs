//! Composer manifest parser.
//!
//! Plugin dependencies are listed under an installer tag in the manifest's
//! `extra` section:
//!
//! ```json
//! {
//!   "extra": {
//!     "require-wp": [
//!       {
//!         "name": "Better Anchor Links (1.7.*)",
//!         "slug": "better-anchor-links",
//!         "required": true,
//!         "file": "auto-anchor-list.php",
//!         "version": "1.7.*",
//!         "vendor": "wpackagist-plugin"
//!       }
//!     ]
//!   }
//! }
//! ```

use serde_json::Value;

use crate::{
    descriptor::RawDependency,
    error::{DepsError, Result},
    manifest::traits::ManifestParser,
};

/// Installer tag used when none is configured.
pub const DEFAULT_TAG: &str = "require-wp";

/// Reads dependency entries from `extra.<tag>` of a `composer.json`.
pub struct ComposerManifestParser {
    tag: String,
}

impl Default for ComposerManifestParser {
    fn default() -> Self {
        Self::new(DEFAULT_TAG)
    }
}

impl ComposerManifestParser {
    /// Creates a parser for the given installer tag.
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }

    /// The installer tag this parser reads.
    pub fn tag(&self) -> &str {
        &self.tag
    }
}

impl ManifestParser for ComposerManifestParser {
    fn parse(&self, bytes: &[u8]) -> Result<Vec<RawDependency>> {
        let manifest: Value = serde_json::from_slice(bytes)?;

        let Some(entries) = manifest.get("extra").and_then(|e| e.get(&self.tag)) else {
            debug!("no `extra.{}` section in manifest", self.tag);
            return Ok(Vec::new());
        };

        let Value::Array(entries) = entries else {
            return Err(DepsError::parse_error(format!(
                "`extra.{}` must be a list, found {}",
                self.tag, entries
            )));
        };

        entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| {
                serde_json::from_value::<RawDependency>(entry.clone()).map_err(|e| {
                    DepsError::parse_error(format!("`extra.{}[{idx}]`: {e}", self.tag))
                })
            })
            .collect()
    }

    fn get_name(&self) -> &'static str {
        "composer"
    }
}
