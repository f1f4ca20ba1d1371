//! Plugin configuration types.
//!
//! A plugin is described by a TOML file (`wpdtrt.toml` by default) holding
//! its identity, admin messages and the coded option config.
//!
//! # Configuration File Format
//!
//! ```toml
//! prefix = "wpdtrt_test"
//! slug = "wpdtrt-test"
//! menu_title = "Test"
//! developer_prefix = "DTRT"
//! version = "1.1.8"
//! path = "${env:WP_PLUGIN_DIR}/wpdtrt-test"
//!
//! [messages]
//! options_form_title = "General Settings"
//!
//! [plugin_options.google_static_maps_api_key]
//! type = "text"
//! label = "Google Static Maps API Key"
//! size = 50
//!
//! [instance_options.term_id]
//! type = "number"
//! label = "Term ID"
//! ```

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use wpdtrt_deps::manifest::composer::DEFAULT_TAG;
use wpdtrt_options::OptionStore;

use crate::utils::replace_env_placeholders;

/// Default configuration file name.
pub const DEFAULT_CONFIG_PATH: &str = "wpdtrt.toml";

/// Root plugin configuration.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct PluginConfig {
    /// Option-name prefix, also the options table key.
    pub prefix: String,
    /// Plugin slug and text domain.
    pub slug: String,
    /// Title of the settings menu entry.
    pub menu_title: String,
    /// Short developer tag shown before the menu title.
    #[serde(default)]
    pub developer_prefix: String,
    /// Plugin version.
    pub version: String,
    /// Plugin directory. Supports `${env:VAR}` placeholders.
    #[serde(default)]
    pub path: Option<String>,
    /// Plugin URL. Supports `${env:VAR}` placeholders.
    #[serde(default)]
    pub url: Option<String>,
    /// Admin page messages keyed by purpose.
    #[serde(default)]
    pub messages: BTreeMap<String, String>,
    /// Options shown on the settings page, in display order.
    #[serde(default)]
    #[schemars(with = "BTreeMap<String, BTreeMap<String, serde_json::Value>>")]
    pub plugin_options: OptionStore,
    /// Options available to widgets, shortcodes and taxonomies.
    #[serde(default)]
    #[schemars(with = "BTreeMap<String, BTreeMap<String, serde_json::Value>>")]
    pub instance_options: OptionStore,
    /// Persisted options file. Defaults to `<prefix>.json`.
    #[serde(default)]
    pub state_file: Option<String>,
    /// Composer manifest listing plugin dependencies. Defaults to
    /// `composer.json` in the plugin directory.
    #[serde(default)]
    pub manifest: Option<String>,
    /// JSON endpoint the plugin data is fetched from. Supports `${env:VAR}`
    /// placeholders.
    #[serde(default)]
    pub api_endpoint: Option<String>,
    /// Key under the manifest's `extra` section listing dependencies.
    #[serde(default = "default_manifest_tag")]
    pub manifest_tag: String,
}

fn default_manifest_tag() -> String {
    DEFAULT_TAG.to_string()
}

impl PluginConfig {
    /// Loads a configuration file, expanding `${env:VAR}` placeholders in
    /// path-like fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("can not open config file: {}", path.display()))?;
        let mut config: PluginConfig = toml::from_str(&content)
            .with_context(|| format!("invalid config file: {}", path.display()))?;
        config.expand_placeholders();
        debug!(
            "loaded {} with {} plugin options",
            path.display(),
            config.plugin_options.len()
        );
        Ok(config)
    }

    fn expand_placeholders(&mut self) {
        for field in [
            &mut self.path,
            &mut self.url,
            &mut self.state_file,
            &mut self.manifest,
            &mut self.api_endpoint,
        ] {
            if let Some(v) = field {
                *v = replace_env_placeholders(v);
            }
        }
    }

    /// Options page heading, e.g. `DTRT Test`.
    pub fn title(&self) -> String {
        if self.developer_prefix.is_empty() {
            self.menu_title.clone()
        } else {
            format!("{} {}", self.developer_prefix, self.menu_title)
        }
    }

    /// Message lookup.
    pub fn message(&self, key: &str) -> Option<&str> {
        self.messages.get(key).map(String::as_str)
    }

    /// Plugin directory, relative paths resolved against `base`.
    pub fn plugin_dir(&self, base: &Path) -> PathBuf {
        match &self.path {
            Some(p) => base.join(p),
            None => base.to_path_buf(),
        }
    }

    /// Persisted options file, relative paths resolved against `base`.
    pub fn state_path(&self, base: &Path) -> PathBuf {
        match &self.state_file {
            Some(f) => base.join(f),
            None => base.join(format!("{}.json", self.prefix)),
        }
    }

    /// Dependency manifest, relative paths resolved against the plugin dir.
    pub fn manifest_path(&self, base: &Path) -> PathBuf {
        let dir = self.plugin_dir(base);
        match &self.manifest {
            Some(m) => dir.join(m),
            None => dir.join("composer.json"),
        }
    }
}
