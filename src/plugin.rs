/// Built-in `animation` plugin.
pub mod animation;
/// Metadata sections, analysis and merging.
pub mod metadata;
/// Plugin registry.
pub mod registry;
