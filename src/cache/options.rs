use serde::{Deserialize, Serialize};

use crate::foundation::error::{TextureError, TextureResult};

/// Knobs for loading and assembling textures.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Mip levels requested beyond level 0.
    pub mipmap_level: u32,
    /// Worker pool size; `None` uses rayon's default.
    pub threads: Option<usize>,
    /// Suffix that turns an image path into its metadata path.
    pub metadata_suffix: String,
    /// Path prefix scanned for textures in every namespace.
    pub texture_prefix: String,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            mipmap_level: 0,
            threads: None,
            metadata_suffix: ".mcmeta".to_owned(),
            texture_prefix: "textures".to_owned(),
        }
    }
}

impl LoadOptions {
    /// Parse options from JSON. Missing fields keep their defaults.
    pub fn from_json(bytes: &[u8]) -> TextureResult<Self> {
        let opts: Self = serde_json::from_slice(bytes)
            .map_err(|e| TextureError::config(format!("invalid load options: {e}")))?;
        opts.validate()?;
        Ok(opts)
    }

    /// Reject settings that cannot work.
    pub fn validate(&self) -> TextureResult<()> {
        if self.threads == Some(0) {
            return Err(TextureError::config("'threads' must be >= 1 when set"));
        }
        if self.metadata_suffix.is_empty() {
            return Err(TextureError::config("'metadata_suffix' must be non-empty"));
        }
        Ok(())
    }
}

pub(crate) fn build_thread_pool(threads: Option<usize>) -> TextureResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(TextureError::config("'threads' must be >= 1 when set"));
    }

    let mut builder = rayon::ThreadPoolBuilder::new().thread_name(|i| format!("flipbook-load-{i}"));
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| TextureError::config(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/cache/options.rs"]
mod tests;
