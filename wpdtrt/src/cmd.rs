//! Command handlers behind the `wpdtrt` binary.
//!
//! Each handler works on a [`PluginContext`] and prints its results, so the
//! binary only parses arguments and wires them through.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use colored::Colorize;
use serde_json::Value;
use wpdtrt_deps::{ComposerManifestParser, DependencyRegistry, RawDependency, wpunit_paths};
use wpdtrt_options::{FieldType, OptionRecord};

use crate::{api::DataSource, config::PluginConfig, ctx::PluginContext};

/// Handler for settings page options.
pub struct OptionsHandler;

impl OptionsHandler {
    /// Prints every option with its label, type and effective value.
    pub fn show(ctx: &PluginContext) {
        println!(
            "{} {}",
            ctx.config.title().bold(),
            ctx.config.version.dimmed()
        );
        if ctx.plugin_options.is_empty() {
            let msg = ctx
                .config
                .message("no_options_form_description")
                .unwrap_or("There aren't currently any options.");
            println!("{msg}");
            return;
        }
        for (name, record) in ctx.plugin_options.iter() {
            println!("{}", describe_option(name, record));
        }
    }

    /// Applies `KEY=VALUE` pairs and saves the state file.
    ///
    /// # Errors
    ///
    /// Returns an error for a malformed pair or when saving fails.
    pub fn set(ctx: &mut PluginContext, pairs: &[String]) -> Result<()> {
        let mut values = Vec::with_capacity(pairs.len());
        for pair in pairs {
            let Some((key, raw)) = pair.split_once('=') else {
                bail!("expected KEY=VALUE, got `{pair}`");
            };
            if ctx.plugin_options.get(key).is_none() {
                warn!("`{key}` is not a configured option");
            }
            let value = parse_value(ctx.plugin_options.get(key), raw);
            values.push((key.to_string(), value));
        }
        ctx.submit_values(values);
        ctx.save()?;

        let msg = ctx
            .config
            .message("success")
            .unwrap_or("settings successfully updated");
        println!("{}", msg.green());
        Ok(())
    }

    /// Clears every user value and saves the state file.
    ///
    /// # Errors
    ///
    /// Returns an error when saving fails.
    pub fn unset(ctx: &mut PluginContext) -> Result<()> {
        ctx.unset_options();
        ctx.save()?;
        println!("{}", "options cleared".yellow());
        Ok(())
    }
}

/// Handler for plugin dependencies.
pub struct DepsHandler;

impl DepsHandler {
    /// Prints the dependencies a manifest declares.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest is missing or malformed.
    pub fn list(manifest: &Path, tag: &str) -> Result<Vec<RawDependency>> {
        let deps = load_manifest(manifest, tag)?;
        if deps.is_empty() {
            println!("no `extra.{tag}` dependencies in {}", manifest.display());
        }
        for d in &deps {
            let required = if d.required { "required" } else { "optional" };
            println!(
                "{} {} ({}, {}/{})",
                d.slug.bold(),
                d.version.cyan(),
                required,
                d.vendor,
                d.file
            );
        }
        Ok(deps)
    }

    /// Declares the manifest's dependencies in the plugin state and saves it.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest is unreadable or saving fails.
    pub fn install(ctx: &mut PluginContext, manifest: &Path) -> Result<()> {
        let added = ctx.set_wp_composer_dependencies(manifest)?;
        ctx.save()?;
        println!(
            "{} dependencies declared, {} total",
            added.len().to_string().green(),
            ctx.dependencies.len()
        );
        for d in ctx.dependencies.iter() {
            println!("  {} {}", d.slug, d.version.cyan());
        }
        Ok(())
    }

    /// Prints the entry files a unit-test bootstrap must load.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest is missing or malformed.
    pub fn wpunit(manifest: &Path, root: &Path, tag: &str) -> Result<Vec<PathBuf>> {
        let deps = load_manifest(manifest, tag)?;
        let paths = wpunit_paths(&deps, root);
        for p in &paths {
            println!("{}", p.display());
        }
        Ok(paths)
    }
}

/// Handler for plugin data.
pub struct DataHandler;

impl DataHandler {
    /// Loads the plugin data from `endpoint` (or the configured
    /// `api_endpoint`) and saves the state file.
    ///
    /// Cached data is kept unless `force` or the stored `force_refresh`
    /// flag asks for a refetch.
    ///
    /// # Errors
    ///
    /// Returns an error if no endpoint is known, the fetch fails or saving
    /// fails.
    pub fn fetch(
        ctx: &mut PluginContext,
        source: &dyn DataSource,
        endpoint: Option<&str>,
        force: bool,
    ) -> Result<()> {
        let Some(endpoint) = endpoint
            .map(str::to_string)
            .or_else(|| ctx.config.api_endpoint.clone())
        else {
            bail!("no endpoint given and `api_endpoint` is not configured");
        };

        if force {
            ctx.fetch_plugin_data(source, &endpoint)?;
        } else {
            ctx.get_api_data(source, &endpoint)?;
        }
        ctx.save()?;

        println!(
            "{} entries of plugin data from {}",
            ctx.plugin_data_length().to_string().green(),
            endpoint
        );
        Ok(())
    }
}

/// Prints the JSON Schema of the plugin config file.
///
/// # Errors
///
/// Returns an error if the schema cannot be serialized.
pub fn print_schema() -> Result<()> {
    let schema = schemars::schema_for!(PluginConfig);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

fn load_manifest(manifest: &Path, tag: &str) -> Result<Vec<RawDependency>> {
    let parser = ComposerManifestParser::new(tag);
    DependencyRegistry::load_from_manifest(manifest, &parser)
        .with_context(|| format!("Failed to load dependencies from {}", manifest.display()))
}

/// One line per option: name, type, label and the value a form would show.
fn describe_option(name: &str, record: &OptionRecord) -> String {
    let field_type = record
        .field_type()
        .map(|t| t.to_string())
        .unwrap_or_else(|| "?".to_string());
    let label = record.attr_str("label").unwrap_or("");
    let value = match (&record.value, record.normalised_value()) {
        (Some(v), _) => display_value(v).normal(),
        (None, Some(v)) => format!("{} (default)", display_value(&v)).dimmed(),
        (None, None) => "(unset)".dimmed(),
    };
    format!("{} [{}] {}: {}", name.bold(), field_type, label, value)
}

fn display_value(v: &Value) -> String {
    match v {
        Value::String(s) => format!("{s:?}"),
        other => other.to_string(),
    }
}

/// Interpret a command-line value according to the option's field type.
///
/// Number fields take a JSON number when the text parses as one, everything
/// else is stored as the literal string.
pub fn parse_value(record: Option<&OptionRecord>, raw: &str) -> Value {
    if let Some(FieldType::Number) = record.and_then(OptionRecord::field_type)
        && let Ok(n) = raw.parse::<serde_json::Number>()
    {
        return Value::Number(n);
    }
    Value::String(raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(field_type: &str) -> OptionRecord {
        serde_json::from_value(json!({"type": field_type, "label": "Field label"})).unwrap()
    }

    #[test]
    fn test_parse_value_by_type() {
        assert_eq!(parse_value(Some(&record("number")), "10"), json!(10));
        assert_eq!(parse_value(Some(&record("number")), "2.5"), json!(2.5));
        assert_eq!(parse_value(Some(&record("number")), "ten"), json!("ten"));
        assert_eq!(parse_value(Some(&record("text")), "10"), json!("10"));
        assert_eq!(parse_value(Some(&record("text")), "007"), json!("007"));
        assert_eq!(parse_value(None, "abc12345"), json!("abc12345"));
    }

    const COMPOSER: &str = r#"{
        "name": "dotherightthing/wpdtrt-test",
        "extra": {
            "require-wp": [
                {
                    "name": "DTRT Content Sections",
                    "slug": "wpdtrt-contentsections",
                    "source": "https://github.com/dotherightthing/wpdtrt-contentsections/releases/download/0.1.2/release.zip",
                    "required": true,
                    "version": "0.1.2",
                    "external_url": "https://github.com/dotherightthing/wpdtrt-contentsections",
                    "file": "wpdtrt-contentsections.php",
                    "vendor": "dotherightthing"
                },
                {
                    "name": "Better Anchor Links",
                    "slug": "better-anchor-links",
                    "required": false,
                    "version": "1.7.5",
                    "file": "auto-anchor-list.php",
                    "vendor": "wpackagist-plugin"
                }
            ]
        }
    }"#;

    fn ctx_in(dir: &Path) -> PluginContext {
        let config: PluginConfig = toml::from_str(
            r#"
prefix = "wpdtrt_test"
slug = "wpdtrt-test"
menu_title = "Test"
version = "1.1.8"

[plugin_options.google_static_maps_api_key]
type = "text"
label = "Google Static Maps API Key"
size = 50

[plugin_options.zoom]
type = "number"
label = "Zoom"
"#,
        )
        .unwrap();
        PluginContext::new(config, dir.join("wpdtrt_test.json"))
    }

    #[test]
    fn test_options_set_and_unset() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = ctx_in(dir.path());
        OptionsHandler::set(
            &mut ctx,
            &["google_static_maps_api_key=abc12345".to_string(), "zoom=12".to_string()],
        )
        .unwrap();

        let mut reloaded = ctx_in(dir.path());
        reloaded.load().unwrap();
        let key = reloaded.plugin_options.get("google_static_maps_api_key").unwrap();
        assert_eq!(key.value, Some(json!("abc12345")));
        assert_eq!(key.attr_str("label"), Some("Google Static Maps API Key"));
        assert_eq!(reloaded.plugin_options.get("zoom").unwrap().value, Some(json!(12)));

        OptionsHandler::unset(&mut reloaded).unwrap();
        let mut cleared = ctx_in(dir.path());
        cleared.load().unwrap();
        assert!(cleared.plugin_options.get("zoom").unwrap().value.is_none());
        assert_eq!(cleared.plugin_options.len(), 2);
    }

    #[test]
    fn test_options_set_rejects_malformed_pair() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = ctx_in(dir.path());
        assert!(OptionsHandler::set(&mut ctx, &["zoom".to_string()]).is_err());
        assert!(!dir.path().join("wpdtrt_test.json").exists());
    }

    #[test]
    fn test_deps_install_and_wpunit() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("composer.json");
        std::fs::write(&manifest, COMPOSER).unwrap();

        let mut ctx = ctx_in(dir.path());
        DepsHandler::install(&mut ctx, &manifest).unwrap();
        // Installing twice must not duplicate anything.
        DepsHandler::install(&mut ctx, &manifest).unwrap();

        let mut reloaded = ctx_in(dir.path());
        reloaded.load().unwrap();
        let slugs: Vec<_> = reloaded.dependencies.iter().map(|d| d.slug.as_str()).collect();
        assert_eq!(slugs, vec!["wpdtrt-contentsections", "better-anchor-links"]);

        let paths = DepsHandler::wpunit(&manifest, Path::new("/srv/site"), "require-wp").unwrap();
        assert_eq!(
            paths,
            vec![
                PathBuf::from(
                    "/srv/site/vendor/dotherightthing/wpdtrt-contentsections/wpdtrt-contentsections.php"
                ),
                PathBuf::from("/srv/site/wp-content/plugins/better-anchor-links/auto-anchor-list.php"),
            ]
        );
    }

    #[test]
    fn test_deps_list_other_tag_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("composer.json");
        std::fs::write(&manifest, COMPOSER).unwrap();
        assert!(DepsHandler::list(&manifest, "require-dev-wp").unwrap().is_empty());
        assert_eq!(DepsHandler::list(&manifest, "require-wp").unwrap().len(), 2);
    }

    #[test]
    fn test_deps_missing_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let err = DepsHandler::list(&dir.path().join("composer.json"), "require-wp").unwrap_err();
        assert!(err.to_string().contains("Failed to load dependencies"));
    }

    struct CountingSource(std::cell::Cell<usize>);

    impl DataSource for CountingSource {
        fn fetch(&self, _endpoint: &str) -> anyhow::Result<Value> {
            self.0.set(self.0.get() + 1);
            Ok(json!([{"id": 1}, {"id": 2}]))
        }
    }

    #[test]
    fn test_data_fetch_saves_and_caches() {
        let dir = tempfile::tempdir().unwrap();
        let source = CountingSource(std::cell::Cell::new(0));

        let mut ctx = ctx_in(dir.path());
        DataHandler::fetch(&mut ctx, &source, Some("http://api.test/photos"), false).unwrap();

        let mut reloaded = ctx_in(dir.path());
        reloaded.load().unwrap();
        assert_eq!(reloaded.plugin_data_length(), 2);

        DataHandler::fetch(&mut reloaded, &source, Some("http://api.test/photos"), false).unwrap();
        assert_eq!(source.0.get(), 1);
        DataHandler::fetch(&mut reloaded, &source, Some("http://api.test/photos"), true).unwrap();
        assert_eq!(source.0.get(), 2);
    }

    #[test]
    fn test_data_fetch_needs_endpoint() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = ctx_in(dir.path());
        let source = CountingSource(std::cell::Cell::new(0));
        let err = DataHandler::fetch(&mut ctx, &source, None, false).unwrap_err();
        assert!(err.to_string().contains("api_endpoint"));

        ctx.config.api_endpoint = Some("http://api.test/photos".into());
        DataHandler::fetch(&mut ctx, &source, None, false).unwrap();
        assert_eq!(source.0.get(), 1);
    }

    #[test]
    fn test_describe_option() {
        colored::control::set_override(false);
        let text = record("text");
        assert_eq!(
            describe_option("api_key", &text),
            "api_key [text] Field label: \"\" (default)"
        );
        assert_eq!(
            describe_option("api_key", &text.clone().with_value("abc")),
            "api_key [text] Field label: \"abc\""
        );
        assert_eq!(
            describe_option("count", &record("number")),
            "count [number] Field label: (unset)"
        );
    }
}
