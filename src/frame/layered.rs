use std::sync::Arc;

use rayon::prelude::*;

use crate::foundation::color::Color;
use crate::foundation::error::{TextureError, TextureResult};
use crate::frame::close::CloseStatus;
use crate::frame::plane::{MipImage, Plane};
use crate::frame::reader::FrameDescriptor;
use crate::spatial::area::Area;
use crate::spatial::point::Point;

// Areas at least this large have their transform evaluated on the rayon pool.
const PARALLEL_MIN_POINTS: u64 = 4096;
const PARALLEL_CHUNK_POINTS: i32 = 1024;

/// Computes the color of one pixel from its level-0 coordinates.
///
/// Transforms see coordinates only; anything that depends on earlier pixel values has to be
/// captured before the transform runs.
pub trait ColorTransform: Sync {
    /// Color for `(x, y)`.
    fn transform(&self, x: i32, y: i32) -> Color;
}

impl<F> ColorTransform for F
where
    F: Fn(i32, i32) -> Color + Sync,
{
    fn transform(&self, x: i32, y: i32) -> Color {
        self(x, y)
    }
}

// Every level of a frame has to land on whole pixels, so size and offset must be
// multiples of 2^mipmap_level.
fn check_mip_alignment(values: [u32; 4], mipmap_level: u32) -> TextureResult<()> {
    let mask = (1u32 << mipmap_level.min(31)) - 1;
    if values.iter().any(|v| v & mask != 0) {
        let [width, height, x, y] = values;
        return Err(TextureError::dimension(format!(
            "{width}x{height} frame at ({x}, {y}) is not aligned to mipmap level {mipmap_level}"
        )));
    }
    Ok(())
}

/// A window onto one level of a (possibly shared) plane.
#[derive(Clone, Debug)]
struct PlaneRegion {
    plane: Arc<Plane>,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
}

impl PlaneRegion {
    fn owned(plane: Plane) -> Self {
        Self {
            width: plane.width(),
            height: plane.height(),
            plane: Arc::new(plane),
            x: 0,
            y: 0,
        }
    }

    fn pixels(&self) -> TextureResult<Vec<Color>> {
        self.plane.read(|px| {
            let stride = self.plane.width() as usize;
            let mut out = Vec::with_capacity(self.width as usize * self.height as usize);
            for row in 0..self.height as usize {
                let start = (self.y as usize + row) * stride + self.x as usize;
                out.extend_from_slice(&px[start..start + self.width as usize]);
            }
            out
        })
    }

    fn write_pixels(&self, src: &[Color]) -> TextureResult<()> {
        self.plane.write(|px| {
            let stride = self.plane.width() as usize;
            for (row, line) in src.chunks_exact(self.width as usize).enumerate() {
                let start = (self.y as usize + row) * stride + self.x as usize;
                px[start..start + line.len()].copy_from_slice(line);
            }
        })
    }
}

/// One spatial tile of an image across every mip level and layer.
///
/// Layer 0 of a frame cut from a [`MipImage`] is a view into that image's shared planes; other
/// layers own transparent planes. All of them hang off one [`CloseStatus`], so closing any frame
/// cut from an image releases the image for every frame that shares it.
#[derive(Debug)]
pub struct Frame {
    width: u32,
    height: u32,
    x_offset: u32,
    y_offset: u32,
    // Indexed as [layer][level].
    layers: Vec<Vec<PlaneRegion>>,
    close_status: Arc<CloseStatus>,
}

impl Frame {
    /// Cut the tile described by `descriptor` out of `image`, with `layers` logical layers.
    pub fn from_image(
        image: &MipImage,
        descriptor: &FrameDescriptor,
        layers: usize,
    ) -> TextureResult<Self> {
        if layers == 0 {
            return Err(TextureError::dimension("a frame needs at least one layer"));
        }
        let right = u64::from(descriptor.x_offset) + u64::from(descriptor.width);
        let bottom = u64::from(descriptor.y_offset) + u64::from(descriptor.height);
        if right > u64::from(image.width()) || bottom > u64::from(image.height()) {
            return Err(TextureError::dimension(format!(
                "frame {}x{} at ({}, {}) exceeds {}x{} image",
                descriptor.width,
                descriptor.height,
                descriptor.x_offset,
                descriptor.y_offset,
                image.width(),
                image.height()
            )));
        }
        check_mip_alignment(
            [
                descriptor.width,
                descriptor.height,
                descriptor.x_offset,
                descriptor.y_offset,
            ],
            image.mipmap_level(),
        )?;

        let mut base = Vec::with_capacity(image.mipmap_level() as usize + 1);
        for level in 0..=image.mipmap_level() {
            let plane = image.level(level).ok_or_else(|| {
                TextureError::dimension(format!("image has no mip level {level}"))
            })?;
            base.push(PlaneRegion {
                plane: plane.clone(),
                x: descriptor.x_offset >> level,
                y: descriptor.y_offset >> level,
                width: descriptor.width >> level,
                height: descriptor.height >> level,
            });
        }

        let close_status = image.close_status().clone();
        let mut all_layers = Vec::with_capacity(layers);
        all_layers.push(base);
        for _ in 1..layers {
            all_layers.push(Self::transparent_levels(
                descriptor.width,
                descriptor.height,
                image.mipmap_level(),
                &close_status,
            ));
        }

        Ok(Self {
            width: descriptor.width,
            height: descriptor.height,
            x_offset: descriptor.x_offset,
            y_offset: descriptor.y_offset,
            layers: all_layers,
            close_status,
        })
    }

    /// A transparent frame that owns all of its planes.
    pub fn blank(width: u32, height: u32, mipmap_level: u32, layers: usize) -> TextureResult<Self> {
        if layers == 0 {
            return Err(TextureError::dimension("a frame needs at least one layer"));
        }
        if mipmap_level > 0
            && (width.checked_shr(mipmap_level).unwrap_or(0) == 0
                || height.checked_shr(mipmap_level).unwrap_or(0) == 0)
        {
            return Err(TextureError::dimension(format!(
                "{width}x{height} frame is too small for mipmap level {mipmap_level}"
            )));
        }
        check_mip_alignment([width, height, 0, 0], mipmap_level)?;
        let close_status = Arc::new(CloseStatus::new());
        let layers = (0..layers)
            .map(|_| Self::transparent_levels(width, height, mipmap_level, &close_status))
            .collect();
        Ok(Self {
            width,
            height,
            x_offset: 0,
            y_offset: 0,
            layers,
            close_status,
        })
    }

    /// A frame with the same contents that owns its planes and close status.
    pub fn detached_copy(&self) -> TextureResult<Self> {
        let mut copy = Self::blank(
            self.width,
            self.height,
            self.mipmap_level(),
            self.layers.len(),
        )?;
        copy.x_offset = self.x_offset;
        copy.y_offset = self.y_offset;
        copy.copy_from(self)?;
        Ok(copy)
    }

    fn transparent_levels(
        width: u32,
        height: u32,
        mipmap_level: u32,
        close_status: &Arc<CloseStatus>,
    ) -> Vec<PlaneRegion> {
        (0..=mipmap_level)
            .map(|level| {
                let region = PlaneRegion::owned(Plane::transparent(width >> level, height >> level));
                let weak = Arc::downgrade(&region.plane);
                close_status.subscribe(move || {
                    if let Some(p) = weak.upgrade() {
                        p.release();
                    }
                });
                region
            })
            .collect()
    }

    /// Level-0 width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Level-0 height.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Left edge within the source image.
    pub fn x_offset(&self) -> u32 {
        self.x_offset
    }

    /// Top edge within the source image.
    pub fn y_offset(&self) -> u32 {
        self.y_offset
    }

    /// Deepest mip level.
    pub fn mipmap_level(&self) -> u32 {
        self.layers
            .first()
            .map_or(0, |levels| levels.len().saturating_sub(1) as u32)
    }

    /// Number of logical layers.
    pub fn layers(&self) -> usize {
        self.layers.len()
    }

    /// Return `true` once the frame (or any frame sharing its image) was closed.
    pub fn is_closed(&self) -> bool {
        self.close_status.is_closed()
    }

    /// Level-0 color of `layer` at `(x, y)`.
    pub fn color(&self, x: i32, y: i32, layer: usize) -> TextureResult<Color> {
        self.color_at_level(0, x, y, layer)
    }

    /// Color of `layer` at `(x, y)` in `level` coordinates.
    pub fn color_at_level(&self, level: u32, x: i32, y: i32, layer: usize) -> TextureResult<Color> {
        let region = self.region(layer, level)?;
        if x < 0 || y < 0 || x as u32 >= region.width || y as u32 >= region.height {
            return Err(TextureError::pixel_out_of_bounds(x, y));
        }
        region.plane.color(region.x + x as u32, region.y + y as u32)
    }

    /// Write one level-0 pixel; deeper levels follow the same rule as
    /// [`Frame::apply_transform`].
    pub fn set_color(&mut self, x: i32, y: i32, color: Color, layer: usize) -> TextureResult<()> {
        self.check_layer(layer)?;
        self.check_point(x, y)?;
        self.write_levels(layer, &[(Point::new(x, y), color)])
    }

    /// Evaluate `transform` for every point of `area` and store the result in `layer`.
    ///
    /// The whole area is bounds-checked before anything is written. The transform runs once per
    /// point; its color lands at `(x, y)` on level 0 and, on each deeper level `L`, at
    /// `(x >> L, y >> L)` when both coordinates are multiples of `2^L`. Levels are written
    /// independently rather than re-derived from level 0.
    pub fn apply_transform(
        &mut self,
        transform: &dyn ColorTransform,
        area: &Area,
        layer: usize,
    ) -> TextureResult<()> {
        self.check_layer(layer)?;
        self.check_area(area)?;
        if area.is_empty() {
            return Ok(());
        }

        let writes: Vec<(Point, Color)> = if area.size() >= PARALLEL_MIN_POINTS {
            let parts = area.split(PARALLEL_CHUNK_POINTS)?;
            parts
                .par_iter()
                .flat_map_iter(|part| {
                    part.iter()
                        .map(|p| (p, transform.transform(p.x(), p.y())))
                        .collect::<Vec<_>>()
                })
                .collect()
        } else {
            area.iter()
                .map(|p| (p, transform.transform(p.x(), p.y())))
                .collect()
        };

        self.write_levels(layer, &writes)
    }

    fn write_levels(&self, layer: usize, writes: &[(Point, Color)]) -> TextureResult<()> {
        for (level, region) in self.layers[layer].iter().enumerate() {
            let mask = (1i32 << level) - 1;
            region.plane.write(|px| {
                let stride = region.plane.width() as usize;
                for &(p, color) in writes {
                    let (x, y) = (p.x(), p.y());
                    if x & mask != 0 || y & mask != 0 {
                        continue;
                    }
                    let (lx, ly) = ((x >> level) as u32, (y >> level) as u32);
                    if lx >= region.width || ly >= region.height {
                        continue;
                    }
                    let lx = (region.x + lx) as usize;
                    let ly = (region.y + ly) as usize;
                    px[ly * stride + lx] = color;
                }
            })?;
        }
        Ok(())
    }

    /// Pixels of one layer and level, row-major.
    pub fn level_pixels(&self, level: u32, layer: usize) -> TextureResult<Vec<Color>> {
        self.region(layer, level)?.pixels()
    }

    /// All layers of `level` flattened bottom-to-top with [`Color::over`].
    pub fn composite(&self, level: u32) -> TextureResult<Vec<Color>> {
        let mut out = self.level_pixels(level, 0)?;
        for layer in 1..self.layers.len() {
            let top = self.level_pixels(level, layer)?;
            for (dst, src) in out.iter_mut().zip(top) {
                *dst = Color::over(src, *dst);
            }
        }
        Ok(out)
    }

    /// Copy every layer and level of `other` into this frame.
    pub fn copy_from(&mut self, other: &Frame) -> TextureResult<()> {
        if other.width != self.width
            || other.height != self.height
            || other.layers.len() != self.layers.len()
            || other.mipmap_level() != self.mipmap_level()
        {
            return Err(TextureError::dimension(format!(
                "cannot copy {}x{} frame ({} layers, mip {}) into {}x{} frame ({} layers, mip {})",
                other.width,
                other.height,
                other.layers.len(),
                other.mipmap_level(),
                self.width,
                self.height,
                self.layers.len(),
                self.mipmap_level()
            )));
        }
        for (dst_levels, src_levels) in self.layers.iter().zip(&other.layers) {
            for (dst, src) in dst_levels.iter().zip(src_levels) {
                let px = src.pixels()?;
                dst.write_pixels(&px)?;
            }
        }
        Ok(())
    }

    /// Release this frame's storage and every plane sharing its close status. Idempotent.
    pub fn close(&self) {
        self.close_status.close();
    }

    fn region(&self, layer: usize, level: u32) -> TextureResult<&PlaneRegion> {
        self.check_layer(layer)?;
        self.layers[layer].get(level as usize).ok_or_else(|| {
            TextureError::dimension(format!(
                "mip level {level} out of range (max {})",
                self.mipmap_level()
            ))
        })
    }

    pub(crate) fn check_layer(&self, layer: usize) -> TextureResult<()> {
        if layer >= self.layers.len() {
            return Err(TextureError::dimension(format!(
                "layer {layer} out of range ({} layers)",
                self.layers.len()
            )));
        }
        Ok(())
    }

    fn check_point(&self, x: i32, y: i32) -> TextureResult<()> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return Err(TextureError::pixel_out_of_bounds(x, y));
        }
        Ok(())
    }

    pub(crate) fn check_area(&self, area: &Area) -> TextureResult<()> {
        let Some(b) = area.bounds() else {
            return Ok(());
        };
        let inside = b.min_x >= 0
            && b.min_y >= 0
            && (b.max_x as u32) < self.width
            && (b.max_y as u32) < self.height;
        if inside {
            return Ok(());
        }
        let offending = area
            .iter()
            .find(|p| self.check_point(p.x(), p.y()).is_err())
            .unwrap_or(Point::new(b.max_x, b.max_y));
        Err(TextureError::pixel_out_of_bounds(
            offending.x(),
            offending.y(),
        ))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/frame/layered.rs"]
mod tests;
