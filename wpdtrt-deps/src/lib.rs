//! # wpdtrt-deps - Plugin Dependency Library
//!
//! Tracks the external plugins a host plugin depends on, and reads them from
//! a Composer manifest.
//!
//! ## Features
//!
//! - One descriptor per slug, later declarations always win
//! - Composer manifest parsing behind a pluggable [`ManifestParser`] trait
//! - Entry-file resolution for unit-test bootstraps
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use wpdtrt_deps::{ComposerManifestParser, DependencyRegistry};
//!
//! let mut registry = DependencyRegistry::new();
//! let parser = ComposerManifestParser::default();
//! let added = registry.set_from_manifest("composer.json", &parser).unwrap();
//! println!("{} dependencies", added.len());
//! ```
//!
//! ## Modules
//!
//! - [`descriptor`] - Descriptor and raw manifest entry types
//! - [`registry`] - The dependency registry
//! - [`manifest`] - Manifest parsers (Composer)
//! - [`error`] - Error types and result definitions

#[macro_use]
extern crate log;

/// Descriptor and raw manifest entry types.
pub mod descriptor;

/// Error types and result definitions.
pub mod error;

/// Manifest parsers.
pub mod manifest;

/// The dependency registry.
pub mod registry;

// Re-export main types for convenience
pub use descriptor::{DependencyDescriptor, RawDependency, wpunit_paths};
pub use error::{DepsError, Result};
pub use manifest::{ComposerManifestParser, ManifestParser};
pub use registry::DependencyRegistry;
