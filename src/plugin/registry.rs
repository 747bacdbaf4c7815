use std::sync::Arc;

use crate::foundation::error::{TextureError, TextureResult};
use crate::plugin::animation::{ANIMATION_SECTION, AnimationAnalyzer, AnimationComponentBuilder};
use crate::plugin::metadata::{ComponentBuilder, MetadataAnalyzer};

/// A metadata section name plus the code that understands it.
pub struct ClientPlugin {
    section: String,
    analyzer: Arc<dyn MetadataAnalyzer>,
    builder: Arc<dyn ComponentBuilder>,
}

impl std::fmt::Debug for ClientPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientPlugin")
            .field("section", &self.section)
            .finish_non_exhaustive()
    }
}

impl ClientPlugin {
    /// Plugin handling `section`.
    pub fn new(
        section: impl Into<String>,
        analyzer: impl MetadataAnalyzer + 'static,
        builder: impl ComponentBuilder + 'static,
    ) -> Self {
        Self {
            section: section.into(),
            analyzer: Arc::new(analyzer),
            builder: Arc::new(builder),
        }
    }

    /// Metadata section handled by this plugin.
    pub fn section(&self) -> &str {
        &self.section
    }

    /// Section analyzer.
    pub fn analyzer(&self) -> &dyn MetadataAnalyzer {
        self.analyzer.as_ref()
    }

    /// Component builder.
    pub fn builder(&self) -> &dyn ComponentBuilder {
        self.builder.as_ref()
    }
}

/// Registered plugins in registration order.
///
/// The order decides which frame layer each plugin's component targets.
#[derive(Clone, Debug, Default)]
pub struct PluginRegistry {
    plugins: Vec<Arc<ClientPlugin>>,
}

impl PluginRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in `animation` plugin.
    pub fn with_defaults() -> Self {
        Self {
            plugins: vec![Arc::new(ClientPlugin::new(
                ANIMATION_SECTION,
                AnimationAnalyzer,
                AnimationComponentBuilder,
            ))],
        }
    }

    /// Add a plugin. Sections must be unique and non-empty.
    pub fn register(&mut self, plugin: ClientPlugin) -> TextureResult<()> {
        if plugin.section.is_empty() {
            return Err(TextureError::plugin("plugin section name must be non-empty"));
        }
        if self.get(&plugin.section).is_some() {
            return Err(TextureError::plugin(format!(
                "a plugin for section '{}' is already registered",
                plugin.section
            )));
        }
        self.plugins.push(Arc::new(plugin));
        Ok(())
    }

    /// Plugin handling `section`.
    pub fn get(&self, section: &str) -> Option<&ClientPlugin> {
        self.plugins
            .iter()
            .find(|p| p.section == section)
            .map(Arc::as_ref)
    }

    /// Plugins in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ClientPlugin> {
        self.plugins.iter().map(Arc::as_ref)
    }

    /// Section names in registration order.
    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.plugins.iter().map(|p| p.section.as_str())
    }

    /// Number of plugins.
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Return `true` when no plugin is registered.
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/plugin/registry.rs"]
mod tests;
