//! # wpdtrt
//!
//! Runtime-independent core of a plugin boilerplate.
//!
//! `wpdtrt` owns a plugin's option stores and dependency registry, merges
//! coded config with persisted and submitted values, and resolves plugin
//! dependencies from a Composer manifest.
//!
//! ## Features
//!
//! - **Plugin Context**: one explicit object holding all plugin state
//! - **Options**: coded config, persisted values and form input reconciled
//!   across repeated load/save cycles
//! - **Dependencies**: declared dependencies superseded by slug, loaded from
//!   `composer.json`
//! - **Plugin Data**: JSON fetched from the plugin's API, cached between
//!   requests unless `force_refresh` is set
//! - **Taxonomies and Widgets**: label derivation, permalink rewriting and
//!   widget instance merging
//!
//! ## Modules
//!
//! - [`api`] - Plugin data fetched from a remote JSON API
//! - [`cmd`] - Command handlers used by the binary
//! - [`config`] - Plugin configuration file
//! - [`ctx`] - Plugin context and state management
//! - [`state`] - Persisted plugin state
//! - [`taxonomy`] - Custom taxonomy helpers
//! - [`widget`] - Widget helpers
//! - [`utils`] - Common utilities and helper functions
//!
//! ## Example
//!
//! ```rust,no_run
//! use wpdtrt::ctx::PluginContext;
//!
//! let mut ctx = PluginContext::from_config_file("wpdtrt.toml").unwrap();
//! ctx.load().unwrap();
//! ctx.submit_values(vec![("google_static_maps_api_key", "abc12345".into())]);
//! ctx.save().unwrap();
//! ```

/// Plugin data fetched from a remote JSON API.
pub mod api;

/// Command handlers used by the `wpdtrt` binary.
pub mod cmd;

/// Plugin configuration file.
pub mod config;

/// Plugin context and state management.
pub mod ctx;

/// Persisted plugin state.
pub mod state;

/// Custom taxonomy helpers.
pub mod taxonomy;

/// Common utilities and helper functions.
pub mod utils;

/// Widget helpers.
pub mod widget;

#[macro_use]
extern crate log;

pub use wpdtrt_deps as deps;
pub use wpdtrt_options as options;
