//! Plugin context and state management.
//!
//! This module provides the [`PluginContext`] type, the explicit owner of a
//! plugin's option stores and dependency registry. Components that need the
//! plugin's options receive a reference to it instead of looking up a global.

use std::{
    path::{Path, PathBuf},
    time::SystemTime,
};

use anyhow::Context;
use serde_json::{Map, Value};
use wpdtrt_deps::{ComposerManifestParser, DependencyDescriptor, DependencyRegistry};
use wpdtrt_options::{OptionRecord, OptionStore, data::persist};

use crate::{
    api::{DataSource, FORCE_REFRESH_KEY, LAST_UPDATED_KEY, is_truthy},
    config::PluginConfig,
    state::PersistedOptions,
};

/// The central state container of one plugin.
///
/// Lifecycle: [`PluginContext::new`] applies the coded option config,
/// [`PluginContext::bootstrap`] (or [`PluginContext::load`]) merges persisted
/// values on top, [`PluginContext::snapshot`] (or [`PluginContext::save`])
/// hands the merged state back for persistence.
#[derive(Debug, Clone)]
pub struct PluginContext {
    /// Plugin configuration.
    pub config: PluginConfig,
    /// Settings page options.
    pub plugin_options: OptionStore,
    /// Widget, shortcode and taxonomy options.
    pub instance_options: OptionStore,
    /// Declared plugin dependencies.
    pub dependencies: DependencyRegistry,
    /// Data fetched from the plugin's remote API.
    pub plugin_data: Value,
    /// Flags controlling the data fetch.
    pub plugin_data_options: Map<String, Value>,
    /// Persisted options file.
    pub state_path: PathBuf,
}

impl PluginContext {
    /// Creates a context from its config, applying the coded option config.
    pub fn new(config: PluginConfig, state_path: impl Into<PathBuf>) -> Self {
        let mut plugin_options = OptionStore::new();
        plugin_options.set_config(config.plugin_options.config(), true);
        let mut instance_options = OptionStore::new();
        instance_options.set_config(config.instance_options.config(), true);

        Self {
            config,
            plugin_options,
            instance_options,
            dependencies: DependencyRegistry::new(),
            plugin_data: Value::Array(Vec::new()),
            plugin_data_options: Map::new(),
            state_path: state_path.into(),
        }
    }

    /// Loads the config file and builds a context whose state file sits next
    /// to it (unless the config names another).
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or parsed.
    pub fn from_config_file(config_path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let config_path = config_path.as_ref();
        let config = PluginConfig::load(config_path)?;
        let base = config_dir(config_path);
        let state_path = config.state_path(&base);
        Ok(Self::new(config, state_path))
    }

    /// Merges persisted state over the coded config.
    ///
    /// Persisted values land on the coded metadata, persisted metadata is
    /// ignored: the coded config always describes the current fields.
    pub fn bootstrap(&mut self, persisted: PersistedOptions) {
        self.plugin_options.set_values(persisted.plugin_options);
        self.instance_options.set_values(persisted.instance_options);
        self.dependencies.extend(persisted.plugin_dependencies);
        self.plugin_data = persisted.plugin_data;
        self.plugin_data_options = persisted.plugin_data_options;
        debug!(
            "bootstrapped `{}`: {} options, {} dependencies",
            self.config.prefix,
            self.plugin_options.len(),
            self.dependencies.len()
        );
    }

    /// Reads the state file and bootstraps from it.
    ///
    /// # Errors
    ///
    /// Returns an error if the state file exists but cannot be parsed.
    pub fn load(&mut self) -> anyhow::Result<()> {
        let persisted: PersistedOptions = persist::load(&self.state_path)
            .with_context(|| format!("Failed to read {}", self.state_path.display()))?;
        self.bootstrap(persisted);
        Ok(())
    }

    /// Writes the merged state to the state file.
    ///
    /// # Errors
    ///
    /// Returns an error if the state file cannot be written.
    pub fn save(&self) -> anyhow::Result<()> {
        persist::save(&self.state_path, &self.snapshot())
            .with_context(|| format!("Failed to write {}", self.state_path.display()))?;
        Ok(())
    }

    /// Merges user-submitted values into the settings page options.
    pub fn submit_values<K, I>(&mut self, values: I)
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        self.plugin_options
            .set_values(values.into_iter().map(|(k, v)| (k, OptionRecord::default().with_value(v))));
    }

    /// The merged state, ready for persistence.
    pub fn snapshot(&self) -> PersistedOptions {
        PersistedOptions {
            plugin_options: self.plugin_options.get_all(),
            plugin_data: self.plugin_data.clone(),
            plugin_data_options: self.plugin_data_options.clone(),
            instance_options: self.instance_options.get_all(),
            plugin_dependencies: self.dependencies.get_all(),
        }
    }

    /// Forgets every user value on the settings page.
    pub fn unset_options(&mut self) {
        self.plugin_options.reset_values();
    }

    /// Stores data fetched from the plugin's API.
    pub fn set_plugin_data(&mut self, data: Value) {
        self.plugin_data = data;
    }

    /// Whether `plugin_data_options` asks for data to be refetched.
    pub fn force_refresh(&self) -> bool {
        is_truthy(self.plugin_data_options.get(FORCE_REFRESH_KEY))
    }

    /// The plugin data, fetched from `endpoint` when nothing is cached or
    /// `force_refresh` is set.
    ///
    /// # Errors
    ///
    /// Returns an error if a fetch was needed and failed. Cached data is left
    /// untouched in that case.
    pub fn get_api_data(
        &mut self,
        source: &dyn DataSource,
        endpoint: &str,
    ) -> anyhow::Result<&Value> {
        if self.plugin_data_length() > 0 && !self.force_refresh() {
            debug!("using cached plugin data ({} entries)", self.plugin_data_length());
            return Ok(&self.plugin_data);
        }
        self.fetch_plugin_data(source, endpoint)
    }

    /// Fetches `endpoint` unconditionally and stores the result as the
    /// plugin data, stamping `last_updated`.
    ///
    /// # Errors
    ///
    /// Returns an error if the fetch fails.
    pub fn fetch_plugin_data(
        &mut self,
        source: &dyn DataSource,
        endpoint: &str,
    ) -> anyhow::Result<&Value> {
        let data = source.fetch(endpoint)?;
        self.set_plugin_data(data);
        let now = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        self.plugin_data_options
            .insert(LAST_UPDATED_KEY.to_string(), Value::from(now));
        info!(
            "plugin data updated from {endpoint}, {} entries",
            self.plugin_data_length()
        );
        Ok(&self.plugin_data)
    }

    /// Number of entries in the plugin data.
    pub fn plugin_data_length(&self) -> usize {
        match &self.plugin_data {
            Value::Array(a) => a.len(),
            Value::Object(o) => o.len(),
            _ => 0,
        }
    }

    /// Instance options for one widget, shortcode or taxonomy.
    pub fn instance_options_for(&self, selected: &[&str]) -> OptionStore {
        self.instance_options.select(selected.iter().copied())
    }

    /// Declares a dependency, superseding any earlier one with the same slug.
    pub fn set_plugin_dependency(&mut self, dependency: DependencyDescriptor) {
        self.dependencies.upsert(dependency);
    }

    /// Declares every dependency listed in a Composer manifest.
    ///
    /// Returns the descriptors the manifest produced, in manifest order.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest is missing or malformed.
    pub fn set_wp_composer_dependencies(
        &mut self,
        manifest: impl AsRef<Path>,
    ) -> anyhow::Result<Vec<DependencyDescriptor>> {
        let manifest = manifest.as_ref();
        let parser = ComposerManifestParser::new(&self.config.manifest_tag);
        let added = self
            .dependencies
            .set_from_manifest(manifest, &parser)
            .with_context(|| format!("Failed to load dependencies from {}", manifest.display()))?;
        Ok(added)
    }
}

/// Directory holding a config file, `.` for a bare file name.
pub fn config_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config() -> PluginConfig {
        toml::from_str(
            r#"
prefix = "wpdtrt_test"
slug = "wpdtrt-test"
menu_title = "Test"
version = "1.1.8"

[plugin_options.google_static_maps_api_key]
type = "text"
label = "Google Static Maps API Key"
size = 50

[instance_options.term_id]
type = "number"
label = "Term ID"

[instance_options.text_before]
type = "text"
label = "Text before"

[instance_options.posttype]
type = "text"
label = "Custom Post Type"
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_new_applies_coded_config() {
        let ctx = PluginContext::new(config(), "state.json");
        let record = ctx.plugin_options.get("google_static_maps_api_key").unwrap();
        assert_eq!(record.attr_str("label"), Some("Google Static Maps API Key"));
        assert!(record.value.is_none());
        assert_eq!(ctx.instance_options.len(), 3);
    }

    #[test]
    fn test_bootstrap_merges_values_not_metadata() {
        let mut ctx = PluginContext::new(config(), "state.json");
        let persisted: PersistedOptions = serde_json::from_value(json!({
            "plugin_options": {
                "google_static_maps_api_key": {"type": "password", "label": "Old", "value": "abc12345"}
            },
            "plugin_data": [{"id": 1}, {"id": 2}],
            "plugin_data_options": {"force_refresh": 1},
            "plugin_dependencies": [
                {"name": "DTRT Content Sections", "slug": "wpdtrt-contentsections", "required": true, "version": "0.0.1"}
            ]
        }))
        .unwrap();

        ctx.bootstrap(persisted);

        let record = ctx.plugin_options.get("google_static_maps_api_key").unwrap();
        assert_eq!(record.value, Some(json!("abc12345")));
        assert_eq!(record.attr_str("type"), Some("text"));
        assert_eq!(record.attr_str("label"), Some("Google Static Maps API Key"));
        assert_eq!(ctx.plugin_data_length(), 2);
        assert_eq!(ctx.plugin_data_options.get("force_refresh"), Some(&json!(1)));
        assert_eq!(ctx.dependencies.len(), 1);
    }

    #[test]
    fn test_submit_and_snapshot() {
        let mut ctx = PluginContext::new(config(), "state.json");
        ctx.submit_values(vec![("google_static_maps_api_key", json!("abc12345"))]);

        let snapshot = serde_json::to_value(ctx.snapshot()).unwrap();
        assert_eq!(
            snapshot["plugin_options"]["google_static_maps_api_key"],
            json!({
                "type": "text",
                "label": "Google Static Maps API Key",
                "size": 50,
                "value": "abc12345"
            })
        );

        ctx.unset_options();
        assert!(
            ctx.plugin_options
                .get("google_static_maps_api_key")
                .unwrap()
                .value
                .is_none()
        );
    }

    #[test]
    fn test_plugin_data_length() {
        let mut ctx = PluginContext::new(config(), "state.json");
        assert_eq!(ctx.plugin_data_length(), 0);
        ctx.set_plugin_data(json!({"id": 1, "title": "photo"}));
        assert_eq!(ctx.plugin_data_length(), 2);
        ctx.set_plugin_data(json!("scalar"));
        assert_eq!(ctx.plugin_data_length(), 0);
    }

    /// Serves a fixture document and counts how often it was asked for.
    struct FixtureSource {
        body: &'static str,
        calls: std::cell::Cell<usize>,
    }

    impl FixtureSource {
        fn new(body: &'static str) -> Self {
            Self {
                body,
                calls: std::cell::Cell::new(0),
            }
        }
    }

    impl DataSource for FixtureSource {
        fn fetch(&self, _endpoint: &str) -> anyhow::Result<Value> {
            self.calls.set(self.calls.get() + 1);
            Ok(serde_json::from_str(self.body)?)
        }
    }

    struct FailingSource;

    impl DataSource for FailingSource {
        fn fetch(&self, endpoint: &str) -> anyhow::Result<Value> {
            anyhow::bail!("{endpoint} unreachable")
        }
    }

    const PHOTO: &str = r#"{
        "albumId": 1,
        "id": 1,
        "title": "accusamus beatae ad facilis cum similique qui sunt",
        "url": "https://via.placeholder.com/600/92c952"
    }"#;

    const ENDPOINT: &str = "http://jsonplaceholder.typicode.com/photos/1";

    #[test]
    fn test_get_api_data_stores_plugin_data() {
        let mut ctx = PluginContext::new(config(), "state.json");
        let source = FixtureSource::new(PHOTO);

        let data = ctx.get_api_data(&source, ENDPOINT).unwrap().clone();
        assert_eq!(data["id"], json!(1));
        assert_eq!(data, ctx.plugin_data);
        assert_eq!(ctx.plugin_data_length(), 4);
        assert!(ctx.plugin_data_options.contains_key(LAST_UPDATED_KEY));
        assert_eq!(source.calls.get(), 1);
    }

    #[test]
    fn test_get_api_data_uses_cache_unless_forced() {
        let mut ctx = PluginContext::new(config(), "state.json");
        let source = FixtureSource::new(PHOTO);

        ctx.get_api_data(&source, ENDPOINT).unwrap();
        ctx.get_api_data(&source, ENDPOINT).unwrap();
        assert_eq!(source.calls.get(), 1);

        ctx.plugin_data_options
            .insert(FORCE_REFRESH_KEY.to_string(), json!(1));
        assert!(ctx.force_refresh());
        ctx.get_api_data(&source, ENDPOINT).unwrap();
        assert_eq!(source.calls.get(), 2);

        ctx.plugin_data_options
            .insert(FORCE_REFRESH_KEY.to_string(), json!(0));
        ctx.get_api_data(&source, ENDPOINT).unwrap();
        assert_eq!(source.calls.get(), 2);
    }

    #[test]
    fn test_failed_fetch_keeps_cached_data() {
        let mut ctx = PluginContext::new(config(), "state.json");
        ctx.fetch_plugin_data(&FixtureSource::new(PHOTO), ENDPOINT)
            .unwrap();
        ctx.plugin_data_options
            .insert(FORCE_REFRESH_KEY.to_string(), json!(true));

        let err = ctx.get_api_data(&FailingSource, ENDPOINT).unwrap_err();
        assert!(err.to_string().contains("unreachable"));
        assert_eq!(ctx.plugin_data["id"], json!(1));
    }

    #[test]
    fn test_plugin_data_survives_save_load() {
        let dir = tempfile::tempdir().unwrap();
        let state = dir.path().join("wpdtrt_test.json");

        let mut ctx = PluginContext::new(config(), &state);
        ctx.fetch_plugin_data(&FixtureSource::new(PHOTO), ENDPOINT)
            .unwrap();
        ctx.save().unwrap();

        let mut again = PluginContext::new(config(), &state);
        again.load().unwrap();
        assert_eq!(again.plugin_data, ctx.plugin_data);
        let source = FixtureSource::new(PHOTO);
        again.get_api_data(&source, ENDPOINT).unwrap();
        assert_eq!(source.calls.get(), 0);
    }

    #[test]
    fn test_instance_options_for() {
        let ctx = PluginContext::new(config(), "state.json");
        let picked = ctx.instance_options_for(&["posttype", "term_id"]);
        assert_eq!(picked.keys().collect::<Vec<_>>(), vec!["posttype", "term_id"]);
    }

    #[test]
    fn test_set_plugin_dependency_supersedes() {
        let mut ctx = PluginContext::new(config(), "state.json");
        let old = DependencyDescriptor {
            name: "DTRT Content Sections".into(),
            slug: "wpdtrt-contentsections".into(),
            required: true,
            version: "0.0.1".into(),
            source: None,
            external_url: None,
        };
        let new = DependencyDescriptor {
            version: "0.0.2".into(),
            ..old.clone()
        };
        ctx.set_plugin_dependency(old);
        ctx.set_plugin_dependency(new);

        let all = ctx.dependencies.get_all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].version, "0.0.2");
    }

    #[test]
    fn test_load_save_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let state = dir.path().join("wpdtrt_test.json");

        let mut ctx = PluginContext::new(config(), &state);
        ctx.load().unwrap();
        ctx.submit_values(vec![("google_static_maps_api_key", json!("abc12345"))]);
        ctx.save().unwrap();

        let mut again = PluginContext::new(config(), &state);
        again.load().unwrap();
        assert_eq!(
            again
                .plugin_options
                .get("google_static_maps_api_key")
                .unwrap()
                .value,
            Some(json!("abc12345"))
        );
        assert_eq!(again.plugin_options.len(), 1);
    }

    #[test]
    fn test_config_dir() {
        assert_eq!(config_dir(Path::new("wpdtrt.toml")), PathBuf::from("."));
        assert_eq!(config_dir(Path::new("site/wpdtrt.toml")), PathBuf::from("site"));
    }
}
