//! Dependency descriptor types.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Vendor name Composer uses for plugins mirrored from the plugin directory.
pub const WPACKAGIST_VENDOR: &str = "wpackagist-plugin";

/// An external plugin the host plugin requires, keyed by slug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyDescriptor {
    /// Display name.
    pub name: String,
    /// Unique identifier.
    pub slug: String,
    /// Whether activation should insist on the dependency.
    #[serde(default)]
    pub required: bool,
    /// Declared version. Never compared, only recorded.
    pub version: String,
    /// Download URL of a release archive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Project homepage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,
}

/// One entry of a dependency manifest, as written by the plugin author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDependency {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub required: bool,
    /// Plugin entry file, relative to the plugin directory.
    pub file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,
    /// Composer vendor the package is installed under.
    pub vendor: String,
}

impl RawDependency {
    /// Where a unit-test bootstrap finds this plugin's entry file under `root`.
    ///
    /// Plugins installed from the plugin directory land in
    /// `wp-content/plugins`, everything else stays in Composer's `vendor`.
    pub fn wpunit_path(&self, root: &Path) -> PathBuf {
        if self.vendor == WPACKAGIST_VENDOR {
            root.join("wp-content")
                .join("plugins")
                .join(&self.slug)
                .join(&self.file)
        } else {
            root.join("vendor")
                .join(&self.vendor)
                .join(&self.slug)
                .join(&self.file)
        }
    }
}

impl From<RawDependency> for DependencyDescriptor {
    fn from(raw: RawDependency) -> Self {
        DependencyDescriptor {
            name: raw.name,
            slug: raw.slug,
            required: raw.required,
            version: raw.version,
            source: raw.source,
            external_url: raw.external_url,
        }
    }
}

/// Entry files to load for every dependency, in manifest order.
pub fn wpunit_paths(deps: &[RawDependency], root: &Path) -> Vec<PathBuf> {
    deps.iter().map(|d| d.wpunit_path(root)).collect()
}
