//! Persisted plugin state.
//!
//! The single structure the host keeps under the plugin prefix in its
//! options table. Every field falls back to empty, so a missing or partial
//! file reads back as a usable value.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use wpdtrt_deps::DependencyDescriptor;
use wpdtrt_options::OptionStore;

/// Everything a plugin persists between requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedOptions {
    /// Settings page options with user values.
    pub plugin_options: OptionStore,
    /// Data fetched from the plugin's remote API.
    pub plugin_data: Value,
    /// Flags controlling the data fetch, e.g. `force_refresh`.
    pub plugin_data_options: Map<String, Value>,
    /// Widget, shortcode and taxonomy options.
    pub instance_options: OptionStore,
    /// Declared plugin dependencies.
    pub plugin_dependencies: Vec<DependencyDescriptor>,
}

impl Default for PersistedOptions {
    fn default() -> Self {
        Self {
            plugin_options: OptionStore::new(),
            plugin_data: Value::Array(Vec::new()),
            plugin_data_options: Map::new(),
            instance_options: OptionStore::new(),
            plugin_dependencies: Vec::new(),
        }
    }
}
