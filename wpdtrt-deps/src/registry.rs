//! Dependency registry.

use std::{fs, path::Path};

use indexmap::{IndexMap, map::Entry};

use crate::{
    descriptor::{DependencyDescriptor, RawDependency},
    error::{DepsError, Result},
    manifest::ManifestParser,
};

/// Dependencies declared by a host plugin, at most one per slug.
///
/// Later declarations always win. Versions are recorded, never compared, so
/// a declaration of `0.0.1` after `0.0.2` still replaces it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyRegistry {
    deps: IndexMap<String, DependencyDescriptor>,
}

impl DependencyRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a descriptor, replacing any existing one with the same slug.
    ///
    /// A replaced descriptor keeps its position, a new one is appended.
    pub fn upsert(&mut self, descriptor: DependencyDescriptor) {
        match self.deps.entry(descriptor.slug.clone()) {
            Entry::Occupied(mut e) => {
                debug!(
                    "dependency `{}` {} superseded by {}",
                    descriptor.slug,
                    e.get().version,
                    descriptor.version
                );
                e.insert(descriptor);
            }
            Entry::Vacant(e) => {
                debug!("dependency `{}` {} added", descriptor.slug, descriptor.version);
                e.insert(descriptor);
            }
        }
    }

    /// All descriptors, in declaration order.
    pub fn get_all(&self) -> Vec<DependencyDescriptor> {
        self.deps.values().cloned().collect()
    }

    /// Iterate descriptors in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &DependencyDescriptor> {
        self.deps.values()
    }

    /// Descriptor for `slug`.
    pub fn get(&self, slug: &str) -> Option<&DependencyDescriptor> {
        self.deps.get(slug)
    }

    /// Number of descriptors.
    pub fn len(&self) -> usize {
        self.deps.len()
    }

    /// Whether no dependency is registered.
    pub fn is_empty(&self) -> bool {
        self.deps.is_empty()
    }

    /// Read a manifest and extract its dependency entries.
    ///
    /// A missing path is [`DepsError::NotFound`]. A manifest without matching
    /// entries yields an empty list.
    pub fn load_from_manifest(
        path: impl AsRef<Path>,
        parser: &dyn ManifestParser,
    ) -> Result<Vec<RawDependency>> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DepsError::NotFound(path.to_path_buf()));
        }
        let bytes = fs::read(path).map_err(|source| DepsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let deps = parser.parse(&bytes)?;
        debug!(
            "{} dependencies in {} ({})",
            deps.len(),
            path.display(),
            parser.get_name()
        );
        Ok(deps)
    }

    /// Upsert every dependency a manifest declares.
    ///
    /// Returns the descriptors produced from this manifest, in manifest order.
    pub fn set_from_manifest(
        &mut self,
        path: impl AsRef<Path>,
        parser: &dyn ManifestParser,
    ) -> Result<Vec<DependencyDescriptor>> {
        let raw = Self::load_from_manifest(path, parser)?;
        let descriptors: Vec<DependencyDescriptor> =
            raw.into_iter().map(DependencyDescriptor::from).collect();
        for d in &descriptors {
            self.upsert(d.clone());
        }
        Ok(descriptors)
    }
}

impl Extend<DependencyDescriptor> for DependencyRegistry {
    fn extend<I: IntoIterator<Item = DependencyDescriptor>>(&mut self, iter: I) {
        for d in iter {
            self.upsert(d);
        }
    }
}
