use std::collections::{BTreeMap, BTreeSet};

use crate::foundation::error::{TextureError, TextureResult};
use crate::resource::location::ResourceLocation;
use crate::resource::source::{LocationFilter, PackType, ResourceSource, path_under};

/// Resources held in memory.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    entries: BTreeMap<(PackType, ResourceLocation), Vec<u8>>,
}

impl MemorySource {
    /// Empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a resource.
    pub fn insert(&mut self, pack: PackType, location: ResourceLocation, bytes: impl Into<Vec<u8>>) {
        self.entries.insert((pack, location), bytes.into());
    }

    /// Builder form of [`MemorySource::insert`] for client resources.
    pub fn with(mut self, location: ResourceLocation, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(PackType::ClientResources, location, bytes);
        self
    }

    /// Number of resources.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return `true` when empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ResourceSource for MemorySource {
    fn find(&self, pack: PackType, location: &ResourceLocation) -> TextureResult<Vec<u8>> {
        self.entries
            .get(&(pack, location.clone()))
            .cloned()
            .ok_or_else(|| TextureError::ResourceNotFound {
                location: location.to_string(),
            })
    }

    fn contains(&self, pack: PackType, location: &ResourceLocation) -> bool {
        self.entries.contains_key(&(pack, location.clone()))
    }

    fn list(
        &self,
        pack: PackType,
        namespace: &str,
        prefix: &str,
        filter: LocationFilter<'_>,
    ) -> TextureResult<Vec<ResourceLocation>> {
        Ok(self
            .entries
            .keys()
            .filter(|(p, loc)| {
                *p == pack
                    && loc.namespace() == namespace
                    && path_under(loc.path(), prefix)
                    && filter(loc)
            })
            .map(|(_, loc)| loc.clone())
            .collect())
    }

    fn namespaces(&self, pack: PackType) -> TextureResult<BTreeSet<String>> {
        Ok(self
            .entries
            .keys()
            .filter(|(p, _)| *p == pack)
            .map(|(_, loc)| loc.namespace().to_owned())
            .collect())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/resource/memory.rs"]
mod tests;
