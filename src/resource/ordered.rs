use std::collections::BTreeSet;
use std::sync::Arc;

use crate::foundation::error::{TextureError, TextureResult};
use crate::foundation::fingerprint::{Fingerprint, StableHasher};
use crate::resource::location::ResourceLocation;
use crate::resource::source::{LocationFilter, PackType, ResourceSource};

/// A stack of sources, highest priority first.
///
/// A location is served by the first source that contains it. Fingerprints include the index of
/// that source, so the same bytes moved to another pack count as a different resource.
#[derive(Clone, Default)]
pub struct OrderedSources {
    sources: Vec<Arc<dyn ResourceSource>>,
}

impl std::fmt::Debug for OrderedSources {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderedSources")
            .field("sources", &self.sources.len())
            .finish()
    }
}

impl OrderedSources {
    /// Stack `sources`, highest priority first.
    pub fn new(sources: Vec<Arc<dyn ResourceSource>>) -> Self {
        Self { sources }
    }

    /// Append a source below every existing one.
    pub fn push_lowest(&mut self, source: Arc<dyn ResourceSource>) {
        self.sources.push(source);
    }

    /// Number of stacked sources.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Return `true` when no source is stacked.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Index of the highest-priority source containing `location`.
    pub fn highest_source_with(
        &self,
        pack: PackType,
        location: &ResourceLocation,
    ) -> Option<usize> {
        self.sources.iter().position(|s| s.contains(pack, location))
    }
}

impl ResourceSource for OrderedSources {
    fn find(&self, pack: PackType, location: &ResourceLocation) -> TextureResult<Vec<u8>> {
        match self.highest_source_with(pack, location) {
            Some(i) => self.sources[i].find(pack, location),
            None => Err(TextureError::ResourceNotFound {
                location: location.to_string(),
            }),
        }
    }

    fn contains(&self, pack: PackType, location: &ResourceLocation) -> bool {
        self.highest_source_with(pack, location).is_some()
    }

    fn list(
        &self,
        pack: PackType,
        namespace: &str,
        prefix: &str,
        filter: LocationFilter<'_>,
    ) -> TextureResult<Vec<ResourceLocation>> {
        let mut all = BTreeSet::new();
        for source in &self.sources {
            all.extend(source.list(pack, namespace, prefix, filter)?);
        }
        Ok(all.into_iter().collect())
    }

    fn namespaces(&self, pack: PackType) -> TextureResult<BTreeSet<String>> {
        let mut all = BTreeSet::new();
        for source in &self.sources {
            all.extend(source.namespaces(pack)?);
        }
        Ok(all)
    }

    fn fingerprint(
        &self,
        pack: PackType,
        location: &ResourceLocation,
    ) -> TextureResult<Fingerprint> {
        let i = self
            .highest_source_with(pack, location)
            .ok_or_else(|| TextureError::ResourceNotFound {
                location: location.to_string(),
            })?;
        let mut h = StableHasher::new();
        h.write_u64(i as u64);
        h.write_fingerprint(self.sources[i].fingerprint(pack, location)?);
        Ok(h.finish())
    }

    fn provider(&self, pack: PackType, location: &ResourceLocation) -> Option<usize> {
        self.highest_source_with(pack, location)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/resource/ordered.rs"]
mod tests;
