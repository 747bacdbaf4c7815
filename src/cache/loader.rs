use crate::cache::data::TextureData;
use crate::cache::options::LoadOptions;
use crate::foundation::error::TextureResult;
use crate::foundation::fingerprint::Fingerprint;
use crate::frame::decode::decode_image;
use crate::plugin::metadata::parse_metadata;
use crate::plugin::registry::PluginRegistry;
use crate::resource::location::ResourceLocation;
use crate::resource::source::{PackType, ResourceSource};

/// A loadable resource and the identity of its current content.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheEntry {
    /// Resource location.
    pub location: ResourceLocation,
    /// Content fingerprint; equal fingerprints allow reusing an already built value.
    pub fingerprint: Fingerprint,
}

/// Turns resources into cached values.
///
/// `scan` is expected to be cheap and runs on every load; `load` does the real work and only runs
/// for entries the cache has not seen with the same fingerprint.
pub trait CacheLoader<R>: Send + Sync {
    /// Every entry this loader would produce a value for.
    fn scan(&self, source: &dyn ResourceSource) -> TextureResult<Vec<CacheEntry>>;

    /// Build the value for `location`.
    fn load(&self, source: &dyn ResourceSource, location: &ResourceLocation) -> TextureResult<R>;
}

/// Loads animated textures: images with a metadata sibling that some plugin understands.
///
/// The metadata only counts when it comes from the same pack as the image.
#[derive(Clone, Debug)]
pub struct TextureDataLoader {
    plugins: PluginRegistry,
    options: LoadOptions,
}

impl TextureDataLoader {
    /// Loader for `plugins` with `options`.
    pub fn new(plugins: PluginRegistry, options: LoadOptions) -> Self {
        Self { plugins, options }
    }

    /// Plugins consulted for every texture.
    pub fn plugins(&self) -> &PluginRegistry {
        &self.plugins
    }

    /// Options in effect.
    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    fn metadata_location(&self, image: &ResourceLocation) -> TextureResult<ResourceLocation> {
        image.with_suffix(&self.options.metadata_suffix)
    }

    /// Whether `image` has same-pack metadata worth loading.
    fn is_animated(
        &self,
        source: &dyn ResourceSource,
        image: &ResourceLocation,
        metadata: &ResourceLocation,
    ) -> bool {
        let pack = PackType::ClientResources;
        let Some(meta_provider) = source.provider(pack, metadata) else {
            return false;
        };
        if source.provider(pack, image) != Some(meta_provider) {
            tracing::debug!(%image, "ignoring metadata from a different pack");
            return false;
        }
        // Unreadable metadata stays in so that `load` reports it for this texture alone.
        let Ok(bytes) = source.find(pack, metadata) else {
            return true;
        };
        match parse_metadata(&bytes) {
            Ok(sections) => self.plugins.sections().any(|s| sections.contains_key(s)),
            Err(_) => true,
        }
    }
}

impl CacheLoader<TextureData> for TextureDataLoader {
    #[tracing::instrument(skip_all)]
    fn scan(&self, source: &dyn ResourceSource) -> TextureResult<Vec<CacheEntry>> {
        let pack = PackType::ClientResources;
        let mut entries = Vec::new();
        for namespace in source.namespaces(pack)? {
            let images = source.list(pack, &namespace, &self.options.texture_prefix, &|loc| {
                loc.path().ends_with(".png")
            })?;
            for image in images {
                let metadata = self.metadata_location(&image)?;
                if !self.is_animated(source, &image, &metadata) {
                    continue;
                }
                let fingerprints = source
                    .fingerprint(pack, &image)
                    .and_then(|i| Ok([i, source.fingerprint(pack, &metadata)?]));
                let fingerprint = match fingerprints {
                    Ok(parts) => Fingerprint::combine(&parts),
                    Err(err) => {
                        tracing::warn!(%image, error = %err, "skipping unreadable texture");
                        continue;
                    }
                };
                entries.push(CacheEntry {
                    location: image,
                    fingerprint,
                });
            }
        }
        tracing::debug!(entries = entries.len(), "scanned textures");
        Ok(entries)
    }

    fn load(
        &self,
        source: &dyn ResourceSource,
        location: &ResourceLocation,
    ) -> TextureResult<TextureData> {
        let pack = PackType::ClientResources;
        let image = decode_image(&source.find(pack, location)?)?;
        let sections = parse_metadata(&source.find(pack, &self.metadata_location(location)?)?)?;
        TextureData::analyze(image, &sections, &self.plugins)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/cache/loader.rs"]
mod tests;
