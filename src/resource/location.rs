use crate::foundation::error::{TextureError, TextureResult};

/// Namespace assumed when a location string has none.
pub const DEFAULT_NAMESPACE: &str = "minecraft";

/// A `namespace:path` resource identifier.
///
/// Namespaces may contain `a-z 0-9 _ - .`; paths additionally allow `/` between non-empty
/// segments other than `..`. Neither part may be empty.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceLocation {
    namespace: String,
    path: String,
}

impl ResourceLocation {
    /// Validate and join `namespace` and `path`.
    pub fn new(namespace: impl Into<String>, path: impl Into<String>) -> TextureResult<Self> {
        let namespace = namespace.into();
        let path = path.into();
        if namespace.is_empty() || !namespace.bytes().all(is_namespace_byte) {
            return Err(TextureError::location(format!(
                "bad namespace '{namespace}' in '{namespace}:{path}'"
            )));
        }
        if path.is_empty()
            || !path.bytes().all(is_path_byte)
            || path.split('/').any(|seg| seg.is_empty() || seg == "..")
        {
            return Err(TextureError::location(format!(
                "bad path '{path}' in '{namespace}:{path}'"
            )));
        }
        Ok(Self { namespace, path })
    }

    /// Parse `namespace:path` or a bare `path` in [`DEFAULT_NAMESPACE`].
    pub fn parse(s: &str) -> TextureResult<Self> {
        match s.split_once(':') {
            Some((namespace, path)) => Self::new(namespace, path),
            None => Self::new(DEFAULT_NAMESPACE, s),
        }
    }

    /// Namespace part.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Path part.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Same namespace, with `suffix` appended to the path (`foo.png` -> `foo.png.mcmeta`).
    pub fn with_suffix(&self, suffix: &str) -> TextureResult<Self> {
        Self::new(self.namespace.clone(), format!("{}{suffix}", self.path))
    }
}

fn is_namespace_byte(b: u8) -> bool {
    matches!(b, b'a'..=b'z' | b'0'..=b'9' | b'_' | b'-' | b'.')
}

fn is_path_byte(b: u8) -> bool {
    is_namespace_byte(b) || b == b'/'
}

impl std::fmt::Display for ResourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

impl std::str::FromStr for ResourceLocation {
    type Err = TextureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/resource/location.rs"]
mod tests;
