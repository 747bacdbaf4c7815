//! Flipbook animates textures at runtime.
//!
//! Images are cut into frames, every frame carries its mip levels and one plane per layer, and
//! each texture is driven by components that react to register, tick, upload and close events:
//!
//! - Describe pixel sets with [`Area`] and [`Point`]
//! - Cut an image into [`Frame`]s with [`FrameReader`]
//! - Assemble an [`EventDrivenTexture`] and drive it from a [`TextureRegistry`]
//! - Build textures from resource packs through a [`TextureCache`]
//!
//! Frame views handed to components are only valid inside the event that created them; using one
//! later fails with [`TextureError::IllegalFrameReference`].
#![forbid(unsafe_code)]
#![deny(missing_docs)]

/// Generation-keyed texture cache and texture assembly.
pub mod cache;
/// Colors, errors and fingerprints.
pub mod foundation;
/// Frames, mip planes and image decoding.
pub mod frame;
/// Metadata plugins.
pub mod plugin;
/// Resource locations and pack sources.
pub mod resource;
/// Points and run-length areas.
pub mod spatial;
/// Event-driven textures, components and frame views.
pub mod texture;

pub use crate::cache::data::{TextureData, UploadTarget};
pub use crate::cache::loader::{CacheEntry, CacheLoader, TextureDataLoader};
pub use crate::cache::options::LoadOptions;
pub use crate::cache::texture_cache::{LoadReport, TextureCache, TextureMap};
pub use crate::foundation::color::Color;
pub use crate::foundation::error::{TextureError, TextureResult};
pub use crate::foundation::fingerprint::Fingerprint;
pub use crate::frame::layered::{ColorTransform, Frame};
pub use crate::frame::reader::{FrameLayout, FrameReader};
pub use crate::plugin::registry::{ClientPlugin, PluginRegistry};
pub use crate::resource::location::ResourceLocation;
pub use crate::resource::source::{PackType, ResourceSource};
pub use crate::spatial::area::Area;
pub use crate::spatial::point::Point;
pub use crate::texture::component::{GpuUploader, TextureComponent, TextureInfo};
pub use crate::texture::event_driven::{EventDrivenTexture, TextureBuilder};
pub use crate::texture::registry::TextureRegistry;
pub use crate::texture::render_thread::{RenderThread, RenderThreadHandle};
