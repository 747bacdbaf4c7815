/// Analyzed texture data and texture assembly.
pub mod data;
/// Cache loaders.
pub mod loader;
/// Load options and the worker pool.
pub mod options;
/// The generation-keyed texture cache.
pub mod texture_cache;
