use crate::foundation::error::{TextureError, TextureResult};

/// Source image size plus the tile size frames are cut at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameLayout {
    /// Source image width.
    pub image_width: u32,
    /// Source image height.
    pub image_height: u32,
    /// Width of one frame.
    pub frame_width: u32,
    /// Height of one frame.
    pub frame_height: u32,
}

impl FrameLayout {
    /// Frames per row.
    pub fn columns(&self) -> u32 {
        self.image_width.checked_div(self.frame_width).unwrap_or(0)
    }

    /// Frames per column.
    pub fn rows(&self) -> u32 {
        self.image_height.checked_div(self.frame_height).unwrap_or(0)
    }

    /// Number of complete frames in the image.
    pub fn frame_count(&self) -> usize {
        self.columns() as usize * self.rows() as usize
    }
}

/// Position and size of one frame within its source image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameDescriptor {
    /// Row-major frame index.
    pub index: usize,
    /// Left edge in the source image.
    pub x_offset: u32,
    /// Top edge in the source image.
    pub y_offset: u32,
    /// Frame width.
    pub width: u32,
    /// Frame height.
    pub height: u32,
}

/// Slices a source image into a grid of equally sized frames.
pub struct FrameReader;

impl FrameReader {
    /// Call `make` for every complete frame, left to right then top to bottom.
    ///
    /// Partial tiles along the right and bottom edges are skipped.
    pub fn read<T>(
        layout: FrameLayout,
        mut make: impl FnMut(FrameDescriptor) -> TextureResult<T>,
    ) -> TextureResult<Vec<T>> {
        Self::validate(layout)?;

        let mut frames = Vec::with_capacity(layout.frame_count());
        for row in 0..layout.rows() {
            for column in 0..layout.columns() {
                frames.push(make(FrameDescriptor {
                    index: frames.len(),
                    x_offset: column * layout.frame_width,
                    y_offset: row * layout.frame_height,
                    width: layout.frame_width,
                    height: layout.frame_height,
                })?);
            }
        }
        Ok(frames)
    }

    /// Descriptors only.
    pub fn descriptors(layout: FrameLayout) -> TextureResult<Vec<FrameDescriptor>> {
        Self::read(layout, Ok)
    }

    fn validate(layout: FrameLayout) -> TextureResult<()> {
        if layout.frame_width == 0 || layout.frame_height == 0 {
            return Err(TextureError::dimension(format!(
                "frame size must be non-zero, got {}x{}",
                layout.frame_width, layout.frame_height
            )));
        }
        if layout.frame_width > layout.image_width || layout.frame_height > layout.image_height {
            return Err(TextureError::dimension(format!(
                "frame size {}x{} does not fit in {}x{} image",
                layout.frame_width, layout.frame_height, layout.image_width, layout.image_height
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/frame/reader.rs"]
mod tests;
