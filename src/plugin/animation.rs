use std::any::Any;
use std::sync::Arc;

use serde::Deserialize;

use crate::foundation::color::Color;
use crate::foundation::error::{TextureError, TextureResult};
use crate::plugin::metadata::{AnalyzedMetadata, ComponentBuilder, MetadataAnalyzer, MetadataView};
use crate::spatial::area::Area;
use crate::texture::component::TextureComponent;
use crate::texture::view::{CurrentFrameView, FrameGroup, MutableFrameView, PersistentFrameView};

/// Metadata section read by the built-in animation plugin.
pub const ANIMATION_SECTION: &str = "animation";

fn default_frametime() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
struct AnimationSection {
    #[serde(default = "default_frametime")]
    frametime: u32,
    #[serde(default)]
    interpolate: bool,
    width: Option<u32>,
    height: Option<u32>,
    frames: Option<Vec<FrameEntry>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FrameEntry {
    Index(u32),
    Timed { index: u32, time: Option<u32> },
}

/// One step of an animation: a predefined frame shown for `time` ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnimationFrame {
    /// Predefined frame index.
    pub index: usize,
    /// Ticks the frame stays on screen, at least 1.
    pub time: u32,
}

/// Parsed `animation` section.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnimationMetadata {
    frame_width: u32,
    frame_height: u32,
    interpolate: bool,
    frames: Vec<AnimationFrame>,
}

impl AnimationMetadata {
    /// Frame width.
    pub fn width(&self) -> u32 {
        self.frame_width
    }

    /// Frame height.
    pub fn height(&self) -> u32 {
        self.frame_height
    }

    /// Blend towards the next frame between frame boundaries.
    pub fn interpolate(&self) -> bool {
        self.interpolate
    }

    /// Steps in playback order.
    pub fn frames(&self) -> &[AnimationFrame] {
        &self.frames
    }
}

impl AnalyzedMetadata for AnimationMetadata {
    fn frame_width(&self) -> Option<u32> {
        Some(self.frame_width)
    }

    fn frame_height(&self) -> Option<u32> {
        Some(self.frame_height)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Analyzer for [`ANIMATION_SECTION`].
///
/// Missing `width`/`height` default to the smaller image side; a missing `frames` list plays
/// every frame in order for `frametime` ticks each.
pub struct AnimationAnalyzer;

impl MetadataAnalyzer for AnimationAnalyzer {
    fn analyze(
        &self,
        metadata: &MetadataView,
        image_width: u32,
        image_height: u32,
    ) -> TextureResult<Arc<dyn AnalyzedMetadata>> {
        let section: AnimationSection = metadata.deserialize()?;
        if section.frametime == 0 {
            return Err(TextureError::metadata("animation frametime must be at least 1"));
        }

        let side = image_width.min(image_height);
        let frame_width = section.width.unwrap_or(side);
        let frame_height = section.height.unwrap_or(side);
        if frame_width == 0 || frame_height == 0 {
            return Err(TextureError::metadata(format!(
                "animation frame size {frame_width}x{frame_height} must be positive"
            )));
        }
        let available =
            (image_width / frame_width) as usize * (image_height / frame_height) as usize;
        if available == 0 {
            return Err(TextureError::metadata(format!(
                "animation frame size {frame_width}x{frame_height} exceeds the \
                 {image_width}x{image_height} image"
            )));
        }

        let frames = match section.frames {
            None => (0..available)
                .map(|index| AnimationFrame {
                    index,
                    time: section.frametime,
                })
                .collect(),
            Some(entries) => entries
                .into_iter()
                .map(|entry| {
                    let (index, time) = match entry {
                        FrameEntry::Index(index) => (index, section.frametime),
                        FrameEntry::Timed { index, time } => {
                            (index, time.unwrap_or(section.frametime))
                        }
                    };
                    let index = index as usize;
                    if index >= available {
                        return Err(TextureError::metadata(format!(
                            "animation frame {index} is out of range ({available} frames)"
                        )));
                    }
                    if time == 0 {
                        return Err(TextureError::metadata(format!(
                            "animation frame {index} has a time of 0"
                        )));
                    }
                    Ok(AnimationFrame { index, time })
                })
                .collect::<TextureResult<Vec<_>>>()?,
        };

        Ok(Arc::new(AnimationMetadata {
            frame_width,
            frame_height,
            interpolate: section.interpolate,
            frames,
        }))
    }
}

/// Builds an [`AnimationComponent`] from [`AnimationMetadata`].
pub struct AnimationComponentBuilder;

impl ComponentBuilder for AnimationComponentBuilder {
    fn build(
        &self,
        metadata: &dyn AnalyzedMetadata,
        frames: &FrameGroup<MutableFrameView>,
    ) -> TextureResult<Box<dyn TextureComponent>> {
        let metadata = metadata
            .as_any()
            .downcast_ref::<AnimationMetadata>()
            .ok_or_else(|| TextureError::plugin("animation builder got foreign metadata"))?;
        if let Some(step) = metadata.frames.iter().find(|s| s.index >= frames.len()) {
            return Err(TextureError::metadata(format!(
                "animation frame {} is out of range ({} frames)",
                step.index,
                frames.len()
            )));
        }
        Ok(Box::new(AnimationComponent::new(
            metadata.frames.clone(),
            metadata.interpolate,
        )))
    }
}

/// Tick clock that steps through predefined frames.
///
/// The first tick shows the first step's frame. When interpolating, every tick inside a step
/// blends the step's frame towards the next one in the generated frame.
#[derive(Debug)]
pub struct AnimationComponent {
    frames: Vec<AnimationFrame>,
    interpolate: bool,
    step: usize,
    ticks: u32,
    started: bool,
}

impl AnimationComponent {
    /// Play `frames` in order, looping.
    pub fn new(frames: Vec<AnimationFrame>, interpolate: bool) -> Self {
        Self {
            frames,
            interpolate,
            step: 0,
            ticks: 0,
            started: false,
        }
    }

    /// Index of the current step.
    pub fn step(&self) -> usize {
        self.step
    }

    fn blend(
        &self,
        current: &CurrentFrameView,
        predefined: &FrameGroup<PersistentFrameView>,
    ) -> TextureResult<()> {
        let here = self.frames[self.step];
        let next = self.frames[(self.step + 1) % self.frames.len()];
        if here.index == next.index {
            return Ok(());
        }

        let from = predefined.frame(here.index)?.pixels()?;
        let to = predefined.frame(next.index)?.pixels()?;
        let width = current.width()?;
        let height = current.height()?;
        let t = self.ticks as f32 / here.time as f32;
        let stride = width as usize;
        let mix = move |x: i32, y: i32| -> Color {
            let i = y as usize * stride + x as usize;
            Color::lerp(from[i], to[i], t)
        };
        current.generate_with(&mix, &Area::rect(0, 0, width as i32, height as i32)?)
    }
}

impl TextureComponent for AnimationComponent {
    fn on_tick(
        &mut self,
        current: &CurrentFrameView,
        predefined: &FrameGroup<PersistentFrameView>,
    ) -> TextureResult<()> {
        if self.frames.is_empty() {
            return Ok(());
        }
        if !self.started {
            self.started = true;
            let first = self.frames[0].index;
            if current.index()? != Some(first) {
                current.replace_with(first)?;
            }
            return Ok(());
        }

        self.ticks += 1;
        if self.ticks >= self.frames[self.step].time {
            self.ticks = 0;
            self.step = (self.step + 1) % self.frames.len();
            return current.replace_with(self.frames[self.step].index);
        }
        if self.interpolate {
            self.blend(current, predefined)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/plugin/animation.rs"]
mod tests;
