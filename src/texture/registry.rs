use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::foundation::error::{TextureError, TextureResult};
use crate::resource::location::ResourceLocation;
use crate::texture::event_driven::EventDrivenTexture;
use crate::texture::render_thread::{RenderThreadHandle, Submission};

/// A texture shared between the registry and whoever renders it.
pub type SharedTexture = Arc<Mutex<EventDrivenTexture>>;

/// Textures currently registered for rendering, by location.
///
/// The registry is an ordinary value; create one per renderer and pass it to whatever needs to
/// look textures up.
#[derive(Default)]
pub struct TextureRegistry {
    textures: BTreeMap<ResourceLocation, SharedTexture>,
}

impl TextureRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered textures.
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    /// Return `true` when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Registered locations in sorted order.
    pub fn locations(&self) -> impl Iterator<Item = &ResourceLocation> {
        self.textures.keys()
    }

    /// Dispatch the register event and store `texture` under `location`.
    ///
    /// A texture previously registered at the same location is closed.
    pub fn register(
        &mut self,
        location: ResourceLocation,
        mut texture: EventDrivenTexture,
    ) -> TextureResult<SharedTexture> {
        texture.register()?;
        let shared = Arc::new(Mutex::new(texture));
        if let Some(previous) = self.textures.insert(location.clone(), shared.clone()) {
            previous.lock().close();
            tracing::debug!(%location, "replaced registered texture");
        }
        Ok(shared)
    }

    /// Texture registered at `location`.
    pub fn get(&self, location: &ResourceLocation) -> Option<SharedTexture> {
        self.textures.get(location).cloned()
    }

    /// Tick every texture once. Failures are logged and skipped.
    ///
    /// Returns how many textures ticked successfully.
    pub fn tick_all(&self) -> usize {
        let mut ok = 0;
        for (location, texture) in &self.textures {
            match texture.lock().tick() {
                Ok(()) => ok += 1,
                Err(err) => tracing::warn!(%location, error = %err, "texture tick failed"),
            }
        }
        ok
    }

    /// Upload the texture at `location` if it changed.
    ///
    /// Runs immediately on the render thread and is queued for it from anywhere else.
    pub fn bind(
        &self,
        location: &ResourceLocation,
        render: &RenderThreadHandle,
    ) -> TextureResult<Submission> {
        let texture = self
            .get(location)
            .ok_or_else(|| TextureError::ResourceNotFound {
                location: location.to_string(),
            })?;
        let location = location.clone();
        render.submit(move || {
            if let Err(err) = texture.lock().upload() {
                tracing::warn!(%location, error = %err, "texture upload failed");
            }
        })
    }

    /// Close and forget the texture at `location`. Returns whether one was registered.
    pub fn remove(&mut self, location: &ResourceLocation) -> bool {
        match self.textures.remove(location) {
            Some(texture) => {
                texture.lock().close();
                true
            }
            None => false,
        }
    }

    /// Close and forget every texture.
    pub fn close_all(&mut self) {
        for (_, texture) in std::mem::take(&mut self.textures) {
            texture.lock().close();
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/texture/registry.rs"]
mod tests;
