use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::foundation::error::{TextureError, TextureResult};
use crate::resource::location::ResourceLocation;
use crate::resource::source::{LocationFilter, PackType, ResourceSource, path_under};

/// An unpacked pack on disk, laid out as `<root>/<assets|data>/<namespace>/<path>`.
#[derive(Clone, Debug)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    /// Serve resources below `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Pack root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn namespace_dir(&self, pack: PackType, namespace: &str) -> PathBuf {
        self.root.join(pack.directory()).join(namespace)
    }

    fn file_path(&self, pack: PackType, location: &ResourceLocation) -> PathBuf {
        let mut p = self.namespace_dir(pack, location.namespace());
        for segment in location.path().split('/') {
            p.push(segment);
        }
        p
    }
}

impl ResourceSource for DirSource {
    fn find(&self, pack: PackType, location: &ResourceLocation) -> TextureResult<Vec<u8>> {
        let path = self.file_path(pack, location);
        if !path.is_file() {
            return Err(TextureError::ResourceNotFound {
                location: location.to_string(),
            });
        }
        let bytes = std::fs::read(&path)
            .with_context(|| format!("failed to read '{}'", path.display()))?;
        Ok(bytes)
    }

    fn contains(&self, pack: PackType, location: &ResourceLocation) -> bool {
        self.file_path(pack, location).is_file()
    }

    #[tracing::instrument(skip(self, filter), fields(root = %self.root.display()))]
    fn list(
        &self,
        pack: PackType,
        namespace: &str,
        prefix: &str,
        filter: LocationFilter<'_>,
    ) -> TextureResult<Vec<ResourceLocation>> {
        let base = self.namespace_dir(pack, namespace);
        let mut files = Vec::new();
        collect_files(&base, &base, &mut files)?;

        let mut out: Vec<ResourceLocation> = files
            .into_iter()
            .filter(|rel| path_under(rel, prefix))
            .filter_map(|rel| match ResourceLocation::new(namespace, rel.as_str()) {
                Ok(loc) => Some(loc),
                Err(err) => {
                    tracing::debug!(file = %rel, error = %err, "skipping unaddressable file");
                    None
                }
            })
            .filter(|loc| filter(loc))
            .collect();
        out.sort();
        Ok(out)
    }

    fn namespaces(&self, pack: PackType) -> TextureResult<BTreeSet<String>> {
        let dir = self.root.join(pack.directory());
        let mut out = BTreeSet::new();
        if !dir.is_dir() {
            return Ok(out);
        }
        let entries = std::fs::read_dir(&dir)
            .with_context(|| format!("failed to list '{}'", dir.display()))?;
        for entry in entries {
            let entry = entry.with_context(|| format!("failed to list '{}'", dir.display()))?;
            if !entry.path().is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str()
                && ResourceLocation::new(name, "x").is_ok()
            {
                out.insert(name.to_owned());
            }
        }
        Ok(out)
    }
}

/// Push every file below `dir` as a `/`-separated path relative to `base`.
fn collect_files(base: &Path, dir: &Path, out: &mut Vec<String>) -> TextureResult<()> {
    if !dir.is_dir() {
        return Ok(());
    }
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("failed to list '{}'", dir.display()))?;
    for entry in entries {
        let path = entry
            .with_context(|| format!("failed to list '{}'", dir.display()))?
            .path();
        if path.is_dir() {
            collect_files(base, &path, out)?;
            continue;
        }
        let Ok(rel) = path.strip_prefix(base) else {
            continue;
        };
        let parts: Option<Vec<&str>> = rel.components().map(|c| c.as_os_str().to_str()).collect();
        if let Some(parts) = parts {
            out.push(parts.join("/"));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/resource/dir.rs"]
mod tests;
