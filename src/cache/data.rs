use std::collections::BTreeMap;
use std::sync::Arc;

use crate::cache::options::LoadOptions;
use crate::foundation::error::{TextureError, TextureResult};
use crate::frame::decode::DecodedImage;
use crate::frame::layered::Frame;
use crate::frame::plane::{MipImage, max_mipmap_level};
use crate::frame::reader::{FrameLayout, FrameReader};
use crate::plugin::metadata::{AnalyzedMetadata, MetadataView, merge_metadata};
use crate::plugin::registry::PluginRegistry;
use crate::texture::component::{CleanupComponent, GpuUploader, UploadComponent};
use crate::texture::event_driven::{EventDrivenTexture, TextureBuilder};

/// Where an assembled texture uploads its frames.
#[derive(Clone)]
pub struct UploadTarget {
    /// Device uploader.
    pub uploader: Arc<dyn GpuUploader>,
    /// Device x coordinate of the top-left corner.
    pub x: i32,
    /// Device y coordinate of the top-left corner.
    pub y: i32,
}

/// A decoded image plus everything its plugins agreed on.
///
/// Cheap to keep around: frames and components are only created by
/// [`TextureData::assemble`], and every call builds an independent texture.
#[derive(Clone, Debug)]
pub struct TextureData {
    image: DecodedImage,
    frame_width: u32,
    frame_height: u32,
    blur: bool,
    clamp: bool,
    // Registry order; position is the layer the section's component targets.
    sections: Vec<(String, Arc<dyn AnalyzedMetadata>)>,
}

impl TextureData {
    /// Run every registered analyzer whose section is present and merge the results.
    pub fn analyze(
        image: DecodedImage,
        sections: &BTreeMap<String, MetadataView>,
        plugins: &PluginRegistry,
    ) -> TextureResult<Self> {
        let mut analyzed = Vec::new();
        for plugin in plugins.iter() {
            if let Some(view) = sections.get(plugin.section()) {
                let meta = plugin.analyzer().analyze(view, image.width, image.height)?;
                analyzed.push((plugin.section().to_owned(), meta));
            }
        }
        if analyzed.is_empty() {
            return Err(TextureError::metadata(
                "metadata has no section handled by a registered plugin",
            ));
        }

        let values: Vec<Arc<dyn AnalyzedMetadata>> =
            analyzed.iter().map(|(_, m)| m.clone()).collect();
        let merged = merge_metadata(&values, image.width, image.height)?;
        let layout = FrameLayout {
            image_width: image.width,
            image_height: image.height,
            frame_width: merged.frame_width,
            frame_height: merged.frame_height,
        };
        if merged.frame_width == 0 || merged.frame_height == 0 || layout.frame_count() == 0 {
            return Err(TextureError::metadata(format!(
                "frame size {}x{} does not fit the {}x{} image",
                merged.frame_width, merged.frame_height, image.width, image.height
            )));
        }

        Ok(Self {
            image,
            frame_width: merged.frame_width,
            frame_height: merged.frame_height,
            blur: merged.blur,
            clamp: merged.clamp,
            sections: analyzed,
        })
    }

    /// Source image.
    pub fn image(&self) -> &DecodedImage {
        &self.image
    }

    /// Frame width.
    pub fn frame_width(&self) -> u32 {
        self.frame_width
    }

    /// Frame height.
    pub fn frame_height(&self) -> u32 {
        self.frame_height
    }

    /// Blur flag.
    pub fn blur(&self) -> bool {
        self.blur
    }

    /// Clamp flag.
    pub fn clamp(&self) -> bool {
        self.clamp
    }

    /// Number of complete frames in the image.
    pub fn frame_count(&self) -> usize {
        self.layout().frame_count()
    }

    /// Analyzed sections in layer order.
    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|(name, _)| name.as_str())
    }

    /// Analysis result for `section`.
    pub fn analyzed(&self, section: &str) -> Option<&dyn AnalyzedMetadata> {
        self.sections
            .iter()
            .find(|(name, _)| name == section)
            .map(|(_, meta)| meta.as_ref())
    }

    fn layout(&self) -> FrameLayout {
        FrameLayout {
            image_width: self.image.width,
            image_height: self.image.height,
            frame_width: self.frame_width,
            frame_height: self.frame_height,
        }
    }

    /// Build a ready-to-register texture.
    ///
    /// Each analyzed section gets one layer and one component from its plugin; an upload
    /// component (when `upload` is given) and a cleanup component that releases the image follow.
    #[tracing::instrument(skip_all, fields(width = self.image.width, height = self.image.height))]
    pub fn assemble(
        &self,
        plugins: &PluginRegistry,
        opts: &LoadOptions,
        upload: Option<UploadTarget>,
    ) -> TextureResult<EventDrivenTexture> {
        let mip = max_mipmap_level(self.frame_width, self.frame_height, opts.mipmap_level);
        let image = MipImage::from_decoded(&self.image, mip)?;
        let layers = self.sections.len().max(1);

        let frames = FrameReader::read(self.layout(), |d| Frame::from_image(&image, &d, layers))?;
        let generated = frames
            .first()
            .ok_or_else(|| TextureError::dimension("image yields no frames"))?
            .detached_copy()?;

        let mut builder = TextureBuilder::new().frames(frames, generated)?;
        for (layer, (section, meta)) in self.sections.iter().enumerate() {
            let plugin = plugins.get(section).ok_or_else(|| {
                TextureError::plugin(format!("no plugin registered for section '{section}'"))
            })?;
            let component =
                builder.edit_frames(layer, |frames| plugin.builder().build(meta.as_ref(), frames))?;
            builder = builder.boxed_component(component, layer);
        }
        if let Some(target) = upload {
            builder = builder.component(UploadComponent::new(target.uploader, target.x, target.y)?, 0);
        }
        let release = image.clone();
        builder = builder.component(CleanupComponent::new(move || release.close()), 0);

        let texture = builder.build()?;
        tracing::debug!(
            frames = texture.info().predefined_frames,
            layers,
            mip,
            "assembled texture"
        );
        Ok(texture)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/cache/data.rs"]
mod tests;
