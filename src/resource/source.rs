use std::collections::BTreeSet;

use crate::foundation::error::TextureResult;
use crate::foundation::fingerprint::Fingerprint;
use crate::resource::location::ResourceLocation;

/// Which half of a pack a resource lives in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PackType {
    /// Client assets (textures, metadata).
    ClientResources,
    /// Server data.
    ServerData,
}

impl PackType {
    /// Top-level directory of this pack type.
    pub fn directory(self) -> &'static str {
        match self {
            Self::ClientResources => "assets",
            Self::ServerData => "data",
        }
    }
}

/// Return `true` when `path` is `prefix` itself or lies below it.
///
/// Matching is by whole segments, so `textures` covers `textures/a.png` but not
/// `textures_old/a.png`. An empty prefix covers everything.
pub fn path_under(path: &str, prefix: &str) -> bool {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        return true;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Filter applied to listed locations.
pub type LocationFilter<'a> = &'a dyn Fn(&ResourceLocation) -> bool;

/// Read-only view of a collection of resources.
///
/// The texture cache reads packs only through this trait.
pub trait ResourceSource: Send + Sync {
    /// Bytes of `location`; [`TextureError::ResourceNotFound`](crate::TextureError) when absent.
    fn find(&self, pack: PackType, location: &ResourceLocation) -> TextureResult<Vec<u8>>;

    /// Return `true` when `location` exists.
    fn contains(&self, pack: PackType, location: &ResourceLocation) -> bool;

    /// Locations in `namespace` under the `prefix` directory that pass `filter`, sorted.
    fn list(
        &self,
        pack: PackType,
        namespace: &str,
        prefix: &str,
        filter: LocationFilter<'_>,
    ) -> TextureResult<Vec<ResourceLocation>>;

    /// Every namespace with at least one resource.
    fn namespaces(&self, pack: PackType) -> TextureResult<BTreeSet<String>>;

    /// Content identity of `location`. Equal fingerprints mean the same bytes from the same
    /// provider.
    fn fingerprint(
        &self,
        pack: PackType,
        location: &ResourceLocation,
    ) -> TextureResult<Fingerprint> {
        Ok(Fingerprint::of_bytes(&self.find(pack, location)?))
    }

    /// Index of the provider that serves `location`, or `None` when absent.
    ///
    /// Single sources report `0`; stacked sources report the winning layer.
    fn provider(&self, pack: PackType, location: &ResourceLocation) -> Option<usize> {
        self.contains(pack, location).then_some(0)
    }
}
