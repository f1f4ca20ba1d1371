//! Plugin data loaded from a remote JSON API.
//!
//! The fetched document is stored as the plugin's `plugin_data`, see
//! [`PluginContext::get_api_data`](crate::ctx::PluginContext::get_api_data).
//! Fetching sits behind the [`DataSource`] trait so the context never talks
//! to the network directly.

use std::time::Duration;

use anyhow::Context;
use serde_json::Value;

/// `plugin_data_options` flag: refetch even when data is cached.
pub const FORCE_REFRESH_KEY: &str = "force_refresh";

/// `plugin_data_options` entry: unix time of the last successful fetch.
pub const LAST_UPDATED_KEY: &str = "last_updated";

/// Somewhere plugin data can be fetched from.
pub trait DataSource {
    /// Fetches and decodes the JSON document at `endpoint`.
    fn fetch(&self, endpoint: &str) -> anyhow::Result<Value>;
}

/// Fetches plugin data over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpDataSource {
    timeout: Duration,
}

impl Default for HttpDataSource {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

impl HttpDataSource {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl DataSource for HttpDataSource {
    fn fetch(&self, endpoint: &str) -> anyhow::Result<Value> {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(self.timeout))
            .build()
            .into();

        debug!("fetching plugin data from {endpoint}");
        let mut response = agent
            .get(endpoint)
            .header("User-Agent", concat!("wpdtrt/", env!("CARGO_PKG_VERSION")))
            .call()
            .with_context(|| format!("Failed to download from {endpoint}"))?;
        let body = response
            .body_mut()
            .read_to_string()
            .with_context(|| format!("Failed to read response body from {endpoint}"))?;

        serde_json::from_str(&body).with_context(|| format!("{endpoint} did not return JSON"))
    }
}

/// Whether a stored flag counts as set: `true`, a non-zero number, or a
/// string other than `""` and `"0"`.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty() && s != "0",
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
        Some(Value::Null) | None => false,
    }
}
