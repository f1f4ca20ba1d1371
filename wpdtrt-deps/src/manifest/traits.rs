//! Manifest parser interface definitions.
//!
//! Defines the interface every manifest format must implement.

use crate::{descriptor::RawDependency, error::Result};

/// Manifest parser trait.
///
/// Parsers are pure: they receive the manifest bytes and return the
/// dependency entries they recognise. File access stays with the loader.
pub trait ManifestParser {
    /// Extracts dependency entries.
    ///
    /// # Arguments
    ///
    /// * `bytes` - The raw manifest content
    ///
    /// # Returns
    ///
    /// The entries in manifest order. No matching entries is an empty list,
    /// not an error.
    fn parse(&self, bytes: &[u8]) -> Result<Vec<RawDependency>>;

    /// Returns the name of the manifest format.
    fn get_name(&self) -> &'static str;
}
