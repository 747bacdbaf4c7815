use crate::foundation::color::Color;
use crate::foundation::error::{TextureError, TextureResult};
use crate::frame::layered::Frame;
use crate::texture::component::{TextureComponent, TextureInfo};
use crate::texture::state::{EventScope, SharedState, TextureState};
use crate::texture::view::{
    CurrentFrameView, FrameGroup, MutableFrameView, PersistentFrameView, UploadableFrameView,
};

struct ComponentSlot {
    component: Box<dyn TextureComponent>,
    layer: usize,
}

/// A texture driven by its components.
///
/// Owns the predefined frames, one generated scratch frame and an ordered component list.
/// `register`, `tick`, `upload` and `close` dispatch to every component in registration order;
/// views issued during a dispatch are invalidated as soon as it ends. After `close` every event
/// fails with [`TextureError::TextureClosed`].
pub struct EventDrivenTexture {
    state: SharedState,
    components: Vec<ComponentSlot>,
}

impl std::fmt::Debug for EventDrivenTexture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDrivenTexture")
            .field("info", &self.info())
            .field("components", &self.components.len())
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl EventDrivenTexture {
    /// Start assembling a texture.
    pub fn builder() -> TextureBuilder {
        TextureBuilder::new()
    }

    /// Frame shape and counts.
    pub fn info(&self) -> TextureInfo {
        info(&self.state)
    }

    /// Number of attached components.
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Return `true` after [`EventDrivenTexture::close`].
    pub fn is_closed(&self) -> bool {
        self.state.lock().is_closed()
    }

    /// Index of the predefined frame on screen, or `None` for the generated frame.
    pub fn current_index(&self) -> Option<usize> {
        self.state.lock().current_index()
    }

    /// Return `true` when the next [`EventDrivenTexture::upload`] will dispatch.
    pub fn needs_upload(&self) -> bool {
        self.state.lock().needs_upload
    }

    /// Flattened pixels of the current frame at `level`.
    pub fn current_pixels(&self, level: u32) -> TextureResult<Vec<Color>> {
        let state = self.state.lock();
        if state.is_closed() {
            return Err(TextureError::TextureClosed);
        }
        state.current_frame().composite(level)
    }

    /// Announce the texture to its components and schedule an initial upload.
    pub fn register(&mut self) -> TextureResult<()> {
        let _scope = EventScope::begin(&self.state)?;
        let info = self.info();
        for slot in &mut self.components {
            slot.component.on_register(&info)?;
        }
        self.state.lock().needs_upload = true;
        Ok(())
    }

    /// Advance every component by one tick.
    ///
    /// The first component error aborts the dispatch; views are invalidated either way.
    pub fn tick(&mut self) -> TextureResult<()> {
        let scope = EventScope::begin(&self.state)?;
        let frames = self.state.lock().predefined.len();
        for slot in &mut self.components {
            let current = CurrentFrameView::new(self.state.clone(), scope.id(), slot.layer);
            let predefined = FrameGroup::new(
                (0..frames)
                    .map(|i| PersistentFrameView::new(self.state.clone(), scope.id(), slot.layer, i))
                    .collect(),
            );
            slot.component.on_tick(&current, &predefined)?;
        }
        Ok(())
    }

    /// Dispatch an upload if the current frame changed since the last one.
    ///
    /// Returns whether anything was dispatched.
    pub fn upload(&mut self) -> TextureResult<bool> {
        let scope = EventScope::begin(&self.state)?;
        if !self.state.lock().needs_upload {
            return Ok(false);
        }
        let view = UploadableFrameView::new(self.state.clone(), scope.id());
        for slot in &mut self.components {
            slot.component.on_upload(&view)?;
        }
        self.state.lock().needs_upload = false;
        Ok(true)
    }

    /// Run every close hook once and release all frames. Idempotent.
    pub fn close(&mut self) {
        if self.is_closed() {
            return;
        }
        for slot in &mut self.components {
            slot.component.on_close();
        }
        self.state.lock().close();
        tracing::trace!("texture closed");
    }
}

fn info(state: &SharedState) -> TextureInfo {
    let state = state.lock();
    let frame = state.current_frame();
    TextureInfo {
        width: frame.width(),
        height: frame.height(),
        mipmap_level: frame.mipmap_level(),
        predefined_frames: state.predefined.len(),
        layers: frame.layers(),
    }
}

/// Builder for [`EventDrivenTexture`].
///
/// Frames go in first; predefined frames may then be edited through
/// [`TextureBuilder::edit_frames`] before components are attached and the texture is built.
#[derive(Default)]
pub struct TextureBuilder {
    state: Option<SharedState>,
    components: Vec<ComponentSlot>,
}

impl std::fmt::Debug for TextureBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextureBuilder")
            .field("has_frames", &self.state.is_some())
            .field("components", &self.components.len())
            .finish()
    }
}

impl TextureBuilder {
    /// Empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the predefined frames and the generated frame. All must share one shape.
    pub fn frames(mut self, predefined: Vec<Frame>, generated: Frame) -> TextureResult<Self> {
        self.state = Some(TextureState::new(predefined, generated)?.shared());
        Ok(self)
    }

    /// Shape of the frames set so far.
    pub fn info(&self) -> TextureResult<TextureInfo> {
        Ok(info(self.require_state()?))
    }

    /// Run `edit` with writable views of every predefined frame's `layer`.
    ///
    /// The views stop working once `edit` returns.
    pub fn edit_frames<T>(
        &self,
        layer: usize,
        edit: impl FnOnce(&FrameGroup<MutableFrameView>) -> TextureResult<T>,
    ) -> TextureResult<T> {
        let state = self.require_state()?;
        state.lock().generated.check_layer(layer)?;

        let scope = EventScope::begin(state)?;
        let frames = state.lock().predefined.len();
        let group = FrameGroup::new(
            (0..frames)
                .map(|i| MutableFrameView::new(state.clone(), scope.id(), layer, i))
                .collect(),
        );
        edit(&group)
    }

    /// Attach `component` to `layer`.
    pub fn component(self, component: impl TextureComponent + 'static, layer: usize) -> Self {
        self.boxed_component(Box::new(component), layer)
    }

    /// Attach an already boxed component to `layer`.
    pub fn boxed_component(mut self, component: Box<dyn TextureComponent>, layer: usize) -> Self {
        self.components.push(ComponentSlot { component, layer });
        self
    }

    /// Validate component layers and freeze the texture.
    pub fn build(self) -> TextureResult<EventDrivenTexture> {
        let state = self
            .state
            .ok_or_else(|| TextureError::dimension("texture built without frames"))?;
        let layers = state.lock().generated.layers();
        if let Some(slot) = self.components.iter().find(|s| s.layer >= layers) {
            return Err(TextureError::dimension(format!(
                "component targets layer {} but frames have {layers} layers",
                slot.layer
            )));
        }
        Ok(EventDrivenTexture {
            state,
            components: self.components,
        })
    }

    fn require_state(&self) -> TextureResult<&SharedState> {
        self.state
            .as_ref()
            .ok_or_else(|| TextureError::dimension("texture frames have not been set"))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/texture/event_driven.rs"]
mod tests;
