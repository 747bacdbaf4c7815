use crate::foundation::color::Color;
use crate::foundation::error::{TextureError, TextureResult};
use crate::frame::layered::ColorTransform;
use crate::spatial::area::Area;
use crate::texture::component::GpuUploader;
use crate::texture::state::{CurrentFrame, EventId, SharedState, TextureState};

// Every view method locks the texture state and checks the issuing event before touching a
// frame. Transforms run with the lock held and must not call back into a view.

fn with_state<T>(
    state: &SharedState,
    event: EventId,
    f: impl FnOnce(&mut TextureState) -> TextureResult<T>,
) -> TextureResult<T> {
    let mut guard = state.lock();
    guard.check(event)?;
    f(&mut guard)
}

/// The frame a texture shows, as seen by one component during a tick.
///
/// Valid only while the tick that issued it is being dispatched; afterwards every method fails
/// with [`TextureError::IllegalFrameReference`].
#[derive(Clone)]
pub struct CurrentFrameView {
    state: SharedState,
    event: EventId,
    layer: usize,
}

impl CurrentFrameView {
    pub(crate) fn new(state: SharedState, event: EventId, layer: usize) -> Self {
        Self {
            state,
            event,
            layer,
        }
    }

    /// Level-0 width.
    pub fn width(&self) -> TextureResult<u32> {
        with_state(&self.state, self.event, |s| Ok(s.current_frame().width()))
    }

    /// Level-0 height.
    pub fn height(&self) -> TextureResult<u32> {
        with_state(&self.state, self.event, |s| Ok(s.current_frame().height()))
    }

    /// Index of the predefined frame on screen, or `None` while the generated frame is shown.
    pub fn index(&self) -> TextureResult<Option<usize>> {
        with_state(&self.state, self.event, |s| Ok(s.current_index()))
    }

    /// Number of predefined frames.
    pub fn predefined_frames(&self) -> TextureResult<usize> {
        with_state(&self.state, self.event, |s| Ok(s.predefined.len()))
    }

    /// Color of this component's layer at `(x, y)`.
    pub fn color(&self, x: i32, y: i32) -> TextureResult<Color> {
        with_state(&self.state, self.event, |s| {
            s.current_frame().color(x, y, self.layer)
        })
    }

    /// Recompute the generated frame over `area` and show it.
    ///
    /// When a predefined frame is on screen the generated frame is first seeded from it, so
    /// pixels outside `area` keep their current look. Nothing changes if `area` leaves the frame.
    pub fn generate_with(&self, transform: &dyn ColorTransform, area: &Area) -> TextureResult<()> {
        with_state(&self.state, self.event, |s| {
            s.generated.check_layer(self.layer)?;
            s.generated.check_area(area)?;
            s.refresh_generated()?;
            s.generated.apply_transform(transform, area, self.layer)?;
            s.current = CurrentFrame::Generated;
            s.needs_upload = true;
            Ok(())
        })
    }

    /// Show predefined frame `index`.
    pub fn replace_with(&self, index: usize) -> TextureResult<()> {
        with_state(&self.state, self.event, |s| {
            s.predefined(index)?;
            s.current = CurrentFrame::Predefined(index);
            s.needs_upload = true;
            Ok(())
        })
    }
}

/// Read-only access to one predefined frame during an event.
#[derive(Clone)]
pub struct PersistentFrameView {
    state: SharedState,
    event: EventId,
    layer: usize,
    index: usize,
}

impl PersistentFrameView {
    pub(crate) fn new(state: SharedState, event: EventId, layer: usize, index: usize) -> Self {
        Self {
            state,
            event,
            layer,
            index,
        }
    }

    /// Level-0 width.
    pub fn width(&self) -> TextureResult<u32> {
        with_state(&self.state, self.event, |s| Ok(s.predefined(self.index)?.width()))
    }

    /// Level-0 height.
    pub fn height(&self) -> TextureResult<u32> {
        with_state(&self.state, self.event, |s| {
            Ok(s.predefined(self.index)?.height())
        })
    }

    /// Predefined frame index.
    pub fn index(&self) -> TextureResult<usize> {
        with_state(&self.state, self.event, |_| Ok(self.index))
    }

    /// Color of this component's layer at `(x, y)`.
    pub fn color(&self, x: i32, y: i32) -> TextureResult<Color> {
        with_state(&self.state, self.event, |s| {
            s.predefined(self.index)?.color(x, y, self.layer)
        })
    }

    /// Level-0 pixels of this component's layer, row-major.
    pub fn pixels(&self) -> TextureResult<Vec<Color>> {
        with_state(&self.state, self.event, |s| {
            s.predefined(self.index)?.level_pixels(0, self.layer)
        })
    }
}

/// Write access to one predefined frame while a texture is being assembled.
#[derive(Clone)]
pub struct MutableFrameView {
    state: SharedState,
    event: EventId,
    layer: usize,
    index: usize,
}

impl MutableFrameView {
    pub(crate) fn new(state: SharedState, event: EventId, layer: usize, index: usize) -> Self {
        Self {
            state,
            event,
            layer,
            index,
        }
    }

    /// Level-0 width.
    pub fn width(&self) -> TextureResult<u32> {
        with_state(&self.state, self.event, |s| Ok(s.predefined(self.index)?.width()))
    }

    /// Level-0 height.
    pub fn height(&self) -> TextureResult<u32> {
        with_state(&self.state, self.event, |s| {
            Ok(s.predefined(self.index)?.height())
        })
    }

    /// Predefined frame index.
    pub fn index(&self) -> TextureResult<usize> {
        with_state(&self.state, self.event, |_| Ok(self.index))
    }

    /// Color of this view's layer at `(x, y)`.
    pub fn color(&self, x: i32, y: i32) -> TextureResult<Color> {
        with_state(&self.state, self.event, |s| {
            s.predefined(self.index)?.color(x, y, self.layer)
        })
    }

    /// Apply `transform` over `area` on this view's layer.
    pub fn transform(&self, transform: &dyn ColorTransform, area: &Area) -> TextureResult<()> {
        with_state(&self.state, self.event, |s| {
            s.predefined_mut(self.index)?
                .apply_transform(transform, area, self.layer)
        })
    }
}

/// The current frame as seen by an upload hook.
#[derive(Clone)]
pub struct UploadableFrameView {
    state: SharedState,
    event: EventId,
}

impl UploadableFrameView {
    pub(crate) fn new(state: SharedState, event: EventId) -> Self {
        Self { state, event }
    }

    /// Level-0 width.
    pub fn width(&self) -> TextureResult<u32> {
        with_state(&self.state, self.event, |s| Ok(s.current_frame().width()))
    }

    /// Level-0 height.
    pub fn height(&self) -> TextureResult<u32> {
        with_state(&self.state, self.event, |s| Ok(s.current_frame().height()))
    }

    /// Deepest mip level.
    pub fn mipmap_level(&self) -> TextureResult<u32> {
        with_state(&self.state, self.event, |s| {
            Ok(s.current_frame().mipmap_level())
        })
    }

    /// Index of the predefined frame on screen, or `None` for the generated frame.
    pub fn index(&self) -> TextureResult<Option<usize>> {
        with_state(&self.state, self.event, |s| Ok(s.current_index()))
    }

    /// Send every mip level of the current frame, layers flattened, to `uploader` with the
    /// top-left corner at device `(x, y)`.
    pub fn upload(&self, uploader: &dyn GpuUploader, x: i32, y: i32) -> TextureResult<()> {
        if x < 0 || y < 0 {
            return Err(TextureError::NegativeUploadPoint { x, y });
        }
        with_state(&self.state, self.event, |s| {
            let frame = s.current_frame();
            for level in 0..=frame.mipmap_level() {
                let pixels = frame.composite(level)?;
                uploader.upload(
                    x as u32 >> level,
                    y as u32 >> level,
                    level,
                    frame.width() >> level,
                    frame.height() >> level,
                    &pixels,
                )?;
            }
            Ok(())
        })
    }
}

/// Views onto every predefined frame of a texture, indexed like the frames themselves.
pub struct FrameGroup<V> {
    frames: Vec<V>,
}

impl<V> FrameGroup<V> {
    pub(crate) fn new(frames: Vec<V>) -> Self {
        Self { frames }
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Return `true` when the group holds no frames.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// View for frame `index`.
    pub fn frame(&self, index: usize) -> TextureResult<&V> {
        self.frames
            .get(index)
            .ok_or(TextureError::FrameIndexOutOfBounds {
                index: index as i64,
                len: self.frames.len(),
            })
    }

    /// Iterate views in frame order.
    pub fn iter(&self) -> std::slice::Iter<'_, V> {
        self.frames.iter()
    }
}

impl<'a, V> IntoIterator for &'a FrameGroup<V> {
    type Item = &'a V;
    type IntoIter = std::slice::Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/texture/view.rs"]
mod tests;
