use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::foundation::error::{TextureError, TextureResult};
use crate::texture::component::TextureComponent;
use crate::texture::view::{FrameGroup, MutableFrameView};

/// One top-level section of a texture's metadata file.
#[derive(Clone, Debug, PartialEq)]
pub struct MetadataView {
    section: String,
    value: serde_json::Map<String, serde_json::Value>,
}

impl MetadataView {
    /// Wrap a JSON value; only objects are valid sections.
    pub fn new(section: impl Into<String>, value: serde_json::Value) -> TextureResult<Self> {
        let section = section.into();
        match value {
            serde_json::Value::Object(value) => Ok(Self { section, value }),
            other => Err(TextureError::metadata(format!(
                "section '{section}' must be an object, found {other}"
            ))),
        }
    }

    /// Section name.
    pub fn section(&self) -> &str {
        &self.section
    }

    /// Raw value under `key`.
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.value.get(key)
    }

    /// Keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.value.keys().map(String::as_str)
    }

    /// Decode the whole section into `T`.
    pub fn deserialize<T: DeserializeOwned>(&self) -> TextureResult<T> {
        serde_json::from_value(serde_json::Value::Object(self.value.clone()))
            .map_err(|e| TextureError::metadata(format!("section '{}': {e}", self.section)))
    }
}

/// Split a metadata file into its object sections. Non-object members are ignored.
pub fn parse_metadata(bytes: &[u8]) -> TextureResult<BTreeMap<String, MetadataView>> {
    let root: serde_json::Value = serde_json::from_slice(bytes)
        .map_err(|e| TextureError::metadata(format!("metadata is not valid JSON: {e}")))?;
    let serde_json::Value::Object(members) = root else {
        return Err(TextureError::metadata("metadata root must be an object"));
    };

    let mut out = BTreeMap::new();
    for (name, value) in members {
        if value.is_object() {
            out.insert(name.clone(), MetadataView::new(name, value)?);
        }
    }
    Ok(out)
}

/// What a plugin learned from its metadata section.
///
/// The frame size, blur and clamp values of every plugin that reports them must agree.
pub trait AnalyzedMetadata: Send + Sync + std::fmt::Debug {
    /// Requested frame width.
    fn frame_width(&self) -> Option<u32> {
        None
    }

    /// Requested frame height.
    fn frame_height(&self) -> Option<u32> {
        None
    }

    /// Requested blur flag.
    fn blur(&self) -> Option<bool> {
        None
    }

    /// Requested clamp flag.
    fn clamp(&self) -> Option<bool> {
        None
    }

    /// Downcasting hook for the plugin's own component builder.
    fn as_any(&self) -> &dyn Any;
}

/// Reads one metadata section.
pub trait MetadataAnalyzer: Send + Sync {
    /// Analyze `metadata` for an image of `image_width x image_height`.
    fn analyze(
        &self,
        metadata: &MetadataView,
        image_width: u32,
        image_height: u32,
    ) -> TextureResult<Arc<dyn AnalyzedMetadata>>;
}

/// Turns analyzed metadata into a texture component.
pub trait ComponentBuilder: Send + Sync {
    /// Build the component. `frames` may be edited; the views expire when this returns.
    fn build(
        &self,
        metadata: &dyn AnalyzedMetadata,
        frames: &FrameGroup<MutableFrameView>,
    ) -> TextureResult<Box<dyn TextureComponent>>;
}

/// Frame size and sampling flags agreed on by every plugin of one texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MergedMetadata {
    /// Frame width.
    pub frame_width: u32,
    /// Frame height.
    pub frame_height: u32,
    /// Blur when sampling.
    pub blur: bool,
    /// Clamp when sampling.
    pub clamp: bool,
}

/// Fold the values reported by every analyzer.
///
/// Unreported frame dimensions default to the full image; flags default to `false`.
pub fn merge_metadata(
    analyzed: &[Arc<dyn AnalyzedMetadata>],
    image_width: u32,
    image_height: u32,
) -> TextureResult<MergedMetadata> {
    let frame_width = agree("frame width", analyzed.iter().map(|m| m.frame_width()))?;
    let frame_height = agree("frame height", analyzed.iter().map(|m| m.frame_height()))?;
    let blur = agree("blur", analyzed.iter().map(|m| m.blur()))?;
    let clamp = agree("clamp", analyzed.iter().map(|m| m.clamp()))?;
    Ok(MergedMetadata {
        frame_width: frame_width.unwrap_or(image_width),
        frame_height: frame_height.unwrap_or(image_height),
        blur: blur.unwrap_or(false),
        clamp: clamp.unwrap_or(false),
    })
}

fn agree<T>(key: &str, values: impl Iterator<Item = Option<T>>) -> TextureResult<Option<T>>
where
    T: PartialEq + std::fmt::Display,
{
    let mut seen: Option<T> = None;
    for value in values.flatten() {
        if let Some(first) = &seen {
            if *first != value {
                return Err(TextureError::conflict(key, first, value));
            }
        } else {
            seen = Some(value);
        }
    }
    Ok(seen)
}

#[cfg(test)]
#[path = "../../tests/unit/plugin/metadata.rs"]
mod tests;
