//! Manifest module.
//!
//! Provides a unified interface for dependency manifest formats. Currently supports Composer.

pub mod composer;
pub mod traits;

pub use composer::ComposerManifestParser;
pub use traits::ManifestParser;
