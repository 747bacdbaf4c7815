use std::sync::Arc;

use parking_lot::RwLock;

use crate::foundation::color::Color;
use crate::foundation::error::{TextureError, TextureResult};
use crate::frame::close::CloseStatus;
use crate::frame::decode::DecodedImage;

/// One mip level's pixel buffer.
///
/// Planes are shared between frames through `Arc`; the buffer is dropped in place by
/// [`Plane::release`] and every later access fails with [`TextureError::ImageClosed`].
#[derive(Debug)]
pub struct Plane {
    width: u32,
    height: u32,
    pixels: RwLock<Option<Vec<Color>>>,
}

impl Plane {
    /// Wrap a row-major buffer.
    pub fn new(width: u32, height: u32, pixels: Vec<Color>) -> TextureResult<Self> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(TextureError::dimension(format!(
                "plane buffer holds {} pixels, expected {width}x{height}",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels: RwLock::new(Some(pixels)),
        })
    }

    /// Fully transparent plane.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: RwLock::new(Some(vec![
                Color::TRANSPARENT;
                width as usize * height as usize
            ])),
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Return `true` after [`Plane::release`].
    pub fn is_released(&self) -> bool {
        self.pixels.read().is_none()
    }

    /// Drop the pixel buffer. Idempotent.
    pub fn release(&self) {
        self.pixels.write().take();
    }

    /// Bounds-checked read.
    pub fn color(&self, x: u32, y: u32) -> TextureResult<Color> {
        self.check_bounds(x, y)?;
        self.read(|px| px[self.index(x, y)])
    }

    /// Bounds-checked write.
    pub fn set_color(&self, x: u32, y: u32, color: Color) -> TextureResult<()> {
        self.check_bounds(x, y)?;
        let idx = self.index(x, y);
        self.write(|px| px[idx] = color)
    }

    pub(crate) fn read<T>(&self, f: impl FnOnce(&[Color]) -> T) -> TextureResult<T> {
        let guard = self.pixels.read();
        let px = guard.as_deref().ok_or(TextureError::ImageClosed)?;
        Ok(f(px))
    }

    pub(crate) fn write<T>(&self, f: impl FnOnce(&mut [Color]) -> T) -> TextureResult<T> {
        let mut guard = self.pixels.write();
        let px = guard.as_deref_mut().ok_or(TextureError::ImageClosed)?;
        Ok(f(px))
    }

    pub(crate) fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    fn check_bounds(&self, x: u32, y: u32) -> TextureResult<()> {
        if x >= self.width || y >= self.height {
            return Err(TextureError::pixel_out_of_bounds(x, y));
        }
        Ok(())
    }
}

/// Deepest mip level usable for tiles of `width x height`, capped at `requested`.
///
/// A level is usable only while both dimensions stay divisible by `2^level`, so every tile maps
/// onto whole pixels of each level.
pub fn max_mipmap_level(width: u32, height: u32, requested: u32) -> u32 {
    if width == 0 || height == 0 {
        return 0;
    }
    requested
        .min(width.trailing_zeros())
        .min(height.trailing_zeros())
}

/// A decoded image with all of its mip levels.
///
/// Level `n + 1` is level `n` downsampled with a 2x2 box filter. Every level shares one
/// [`CloseStatus`]; closing it releases all levels.
#[derive(Debug, Clone)]
pub struct MipImage {
    levels: Vec<Arc<Plane>>,
    close_status: Arc<CloseStatus>,
}

impl MipImage {
    /// Copy `image` into fresh planes and generate `mipmap_level` extra levels.
    pub fn from_decoded(image: &DecodedImage, mipmap_level: u32) -> TextureResult<Self> {
        Self::from_pixels(
            image.width,
            image.height,
            image.pixels.as_ref().clone(),
            mipmap_level,
        )
    }

    /// Build from an owned level-0 buffer.
    pub fn from_pixels(
        width: u32,
        height: u32,
        pixels: Vec<Color>,
        mipmap_level: u32,
    ) -> TextureResult<Self> {
        if mipmap_level > 0 && (width >> mipmap_level == 0 || height >> mipmap_level == 0) {
            return Err(TextureError::dimension(format!(
                "{width}x{height} image is too small for mipmap level {mipmap_level}"
            )));
        }

        let mut buffers = vec![(width, height, pixels)];
        for _ in 0..mipmap_level {
            let Some((w, h, prev)) = buffers.last() else {
                break;
            };
            buffers.push(downsample(*w, *h, prev));
        }

        let close_status = Arc::new(CloseStatus::new());
        let mut levels = Vec::with_capacity(buffers.len());
        for (w, h, px) in buffers {
            let plane = Arc::new(Plane::new(w, h, px)?);
            let weak = Arc::downgrade(&plane);
            close_status.subscribe(move || {
                if let Some(p) = weak.upgrade() {
                    p.release();
                }
            });
            levels.push(plane);
        }

        Ok(Self {
            levels,
            close_status,
        })
    }

    /// Width of level 0.
    pub fn width(&self) -> u32 {
        self.levels.first().map_or(0, |p| p.width())
    }

    /// Height of level 0.
    pub fn height(&self) -> u32 {
        self.levels.first().map_or(0, |p| p.height())
    }

    /// Deepest level index.
    pub fn mipmap_level(&self) -> u32 {
        self.levels.len().saturating_sub(1) as u32
    }

    /// Plane for `level`.
    pub fn level(&self, level: u32) -> Option<&Arc<Plane>> {
        self.levels.get(level as usize)
    }

    /// Status shared by every frame cut from this image.
    pub fn close_status(&self) -> &Arc<CloseStatus> {
        &self.close_status
    }

    /// Release every level. Idempotent.
    pub fn close(&self) {
        self.close_status.close();
    }
}

fn downsample(width: u32, height: u32, src: &[Color]) -> (u32, u32, Vec<Color>) {
    let w = (width >> 1).max(1);
    let h = (height >> 1).max(1);
    let at = |x: u32, y: u32| -> Color {
        let x = x.min(width - 1);
        let y = y.min(height - 1);
        src[y as usize * width as usize + x as usize]
    };

    let mut out = Vec::with_capacity(w as usize * h as usize);
    for y in 0..h {
        for x in 0..w {
            out.push(Color::average4(
                at(2 * x, 2 * y),
                at(2 * x + 1, 2 * y),
                at(2 * x, 2 * y + 1),
                at(2 * x + 1, 2 * y + 1),
            ));
        }
    }
    (w, h, out)
}

#[cfg(test)]
#[path = "../../tests/unit/frame/plane.rs"]
mod tests;
