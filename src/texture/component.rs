use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::foundation::color::Color;
use crate::foundation::error::{TextureError, TextureResult};
use crate::texture::view::{
    CurrentFrameView, FrameGroup, PersistentFrameView, UploadableFrameView,
};

/// Shape of a built texture, handed to components when they are registered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextureInfo {
    /// Level-0 frame width.
    pub width: u32,
    /// Level-0 frame height.
    pub height: u32,
    /// Deepest mip level.
    pub mipmap_level: u32,
    /// Number of predefined frames.
    pub predefined_frames: usize,
    /// Number of layers per frame.
    pub layers: usize,
}

/// A behavior attached to one layer of an [`EventDrivenTexture`](crate::EventDrivenTexture).
///
/// Hooks run in registration order. Views passed to a hook are only usable until it returns.
pub trait TextureComponent: Send {
    /// The texture was registered for rendering.
    fn on_register(&mut self, _info: &TextureInfo) -> TextureResult<()> {
        Ok(())
    }

    /// One animation tick.
    fn on_tick(
        &mut self,
        _current: &CurrentFrameView,
        _predefined: &FrameGroup<PersistentFrameView>,
    ) -> TextureResult<()> {
        Ok(())
    }

    /// The current frame is about to be bound and needs uploading.
    fn on_upload(&mut self, _view: &UploadableFrameView) -> TextureResult<()> {
        Ok(())
    }

    /// The texture is being closed. Runs once.
    fn on_close(&mut self) {}
}

/// Writes pixels into device texture memory. Only called on the render thread.
pub trait GpuUploader: Send + Sync {
    /// Store `pixels` (`width x height`, row-major) at `(x, y)` of mip level `level`.
    fn upload(
        &self,
        x: u32,
        y: u32,
        level: u32,
        width: u32,
        height: u32,
        pixels: &[Color],
    ) -> TextureResult<()>;
}

/// Uploads the current frame at a fixed device position on every upload event.
pub struct UploadComponent {
    uploader: Arc<dyn GpuUploader>,
    x: i32,
    y: i32,
}

impl UploadComponent {
    /// Upload at device `(x, y)`; negative coordinates are rejected.
    pub fn new(uploader: Arc<dyn GpuUploader>, x: i32, y: i32) -> TextureResult<Self> {
        if x < 0 || y < 0 {
            return Err(TextureError::NegativeUploadPoint { x, y });
        }
        Ok(Self { uploader, x, y })
    }
}

impl TextureComponent for UploadComponent {
    fn on_upload(&mut self, view: &UploadableFrameView) -> TextureResult<()> {
        view.upload(self.uploader.as_ref(), self.x, self.y)
    }
}

/// Runs a callback once when the texture closes.
pub struct CleanupComponent {
    callback: Option<Box<dyn FnOnce() + Send>>,
}

impl CleanupComponent {
    /// Wrap `callback`.
    pub fn new(callback: impl FnOnce() + Send + 'static) -> Self {
        Self {
            callback: Some(Box::new(callback)),
        }
    }
}

impl TextureComponent for CleanupComponent {
    fn on_close(&mut self) {
        if let Some(callback) = self.callback.take() {
            callback();
        }
    }
}

/// A device texture held in memory, one buffer per mip level.
///
/// Useful for headless rendering and for checking what reached the device.
#[derive(Debug)]
pub struct MemoryUploader {
    width: u32,
    height: u32,
    levels: Mutex<Vec<Vec<Color>>>,
    uploads: AtomicUsize,
}

impl MemoryUploader {
    /// Transparent `width x height` texture with levels `0..=mipmap_level`.
    pub fn new(width: u32, height: u32, mipmap_level: u32) -> Self {
        let levels = (0..=mipmap_level)
            .map(|level| {
                vec![Color::TRANSPARENT; (width >> level) as usize * (height >> level) as usize]
            })
            .collect();
        Self {
            width,
            height,
            levels: Mutex::new(levels),
            uploads: AtomicUsize::new(0),
        }
    }

    /// Copy of level `level`, or `None` if it does not exist.
    pub fn level_pixels(&self, level: u32) -> Option<Vec<Color>> {
        self.levels.lock().get(level as usize).cloned()
    }

    /// Number of successful `upload` calls.
    pub fn upload_count(&self) -> usize {
        self.uploads.load(Ordering::Relaxed)
    }
}

impl GpuUploader for MemoryUploader {
    fn upload(
        &self,
        x: u32,
        y: u32,
        level: u32,
        width: u32,
        height: u32,
        pixels: &[Color],
    ) -> TextureResult<()> {
        let level_width = self.width >> level;
        let level_height = self.height >> level;
        let fits = u64::from(x) + u64::from(width) <= u64::from(level_width)
            && u64::from(y) + u64::from(height) <= u64::from(level_height);
        if !fits || pixels.len() != width as usize * height as usize {
            return Err(TextureError::dimension(format!(
                "cannot upload {width}x{height} ({} pixels) at ({x}, {y}) into \
                 {level_width}x{level_height} level {level}",
                pixels.len()
            )));
        }

        let mut levels = self.levels.lock();
        let dst = levels
            .get_mut(level as usize)
            .ok_or_else(|| TextureError::dimension(format!("no mip level {level}")))?;
        if width > 0 {
            for (row, line) in pixels.chunks_exact(width as usize).enumerate() {
                let start = (y as usize + row) * level_width as usize + x as usize;
                dst[start..start + line.len()].copy_from_slice(line);
            }
        }
        self.uploads.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/texture/component.rs"]
mod tests;
