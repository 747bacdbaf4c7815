use std::io::Cursor;
use std::sync::Arc;

use anyhow::Context;

use crate::foundation::color::Color;
use crate::foundation::error::{TextureError, TextureResult};

/// Decoded straight-alpha image, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major packed colors, `width * height` long.
    pub pixels: Arc<Vec<Color>>,
}

impl DecodedImage {
    /// Wrap already packed colors, validating the buffer length.
    pub fn from_colors(width: u32, height: u32, pixels: Vec<Color>) -> TextureResult<Self> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(TextureError::dimension(format!(
                "image buffer holds {} pixels, expected {width}x{height} = {expected}",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels: Arc::new(pixels),
        })
    }

    /// Color at `(x, y)`; `None` outside the image.
    pub fn color(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }
}

/// Decode any format the `image` crate understands into packed straight-alpha colors.
pub fn decode_image(bytes: &[u8]) -> TextureResult<DecodedImage> {
    let dyn_img =
        image::load_from_memory(bytes).map_err(|e| TextureError::decode(e.to_string()))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let pixels = rgba
        .into_raw()
        .chunks_exact(4)
        .map(|px| Color::from_le_bytes([px[0], px[1], px[2], px[3]]))
        .collect();

    DecodedImage::from_colors(width, height, pixels)
}

/// Encode packed colors as a PNG.
pub fn encode_png(width: u32, height: u32, pixels: &[Color]) -> TextureResult<Vec<u8>> {
    let raw: Vec<u8> = pixels.iter().flat_map(|c| c.to_le_bytes()).collect();
    let img = image::RgbaImage::from_raw(width, height, raw).ok_or_else(|| {
        TextureError::dimension(format!(
            "pixel buffer of {} colors does not match {width}x{height}",
            pixels.len()
        ))
    })?;

    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .context("encode png")?;
    Ok(buf)
}

#[cfg(test)]
#[path = "../../tests/unit/frame/decode.rs"]
mod tests;
