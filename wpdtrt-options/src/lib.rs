//! # wpdtrt-options
//!
//! Option records for plugin settings pages, and the rules that merge coded
//! config, persisted values and submitted form values into one record set.
//!
//! ## Features
//!
//! - Flat option records: free-form metadata plus an optional value
//! - Config merge (`set_config`) and value merge (`set_values`) that survive
//!   repeated load/save cycles without losing or duplicating keys
//! - Per-field-type "nothing entered yet" defaults
//! - JSON and TOML snapshot files with automatic backup before overwrite
//!
//! ## Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use wpdtrt_options::data::{OptionRecord, OptionStore};
//!
//! let mut store = OptionStore::new();
//! let config = json!({"type": "text", "label": "Key", "size": 50});
//! store.set_config(
//!     vec![("api_key", config.as_object().unwrap().clone())],
//!     true,
//! );
//! store.set_values(vec![("api_key", OptionRecord::default().with_value("abc12345"))]);
//!
//! assert_eq!(store.get("api_key").unwrap().value, Some(json!("abc12345")));
//! ```
//!
//! ## Modules
//!
//! - [`data`] - Option records, the option store and snapshot files
//! - [`error`] - Persistence errors

#[macro_use]
extern crate log;

/// Option records, the option store and snapshot persistence.
pub mod data;

/// Error types and result alias.
pub mod error;

pub use data::{Attributes, FieldType, OptionRecord, OptionStore};
pub use error::{OptionsError, Result};
pub use serde_json::Value;

/// Shows the merge `debug!`/`warn!` output when running tests with
/// `--nocapture`.
#[cfg(test)]
pub(crate) fn init_test_logger() {
    let _ = env_logger::builder()
        .is_test(true)
        .filter_level(log::LevelFilter::Debug)
        .try_init();
}
