// Plugin system for tinypack
// Plugins attach callbacks to the compiler's lifecycle hooks

use crate::core::hooks::Hooks;
use crate::utils::Result;
use std::sync::Arc;

/// Main plugin trait that all plugins must implement
///
/// `apply` runs exactly once, while the compiler is being constructed.
/// Register callbacks on whichever hooks the plugin cares about; state a
/// callback needs later has to be moved or shared into its closure.
pub trait Plugin: Send + Sync {
    /// Unique name for this plugin
    fn name(&self) -> &str;

    /// Tap the hooks this plugin needs
    fn apply(&self, hooks: &mut Hooks) -> Result<()>;
}

/// Manages plugin registration and application
pub struct PluginManager {
    plugins: Vec<Arc<dyn Plugin>>,
}

impl PluginManager {
    /// Create a new empty plugin manager
    pub fn new() -> Self {
        Self {
            plugins: Vec::new(),
        }
    }

    /// Register a plugin
    pub fn register(&mut self, plugin: Arc<dyn Plugin>) {
        self.plugins.push(plugin);
    }

    /// Get number of registered plugins
    pub fn plugin_count(&self) -> usize {
        self.plugins.len()
    }

    pub fn names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    /// Apply every plugin to `hooks` in registration order
    pub fn apply_all(&self, hooks: &mut Hooks) -> Result<()> {
        for plugin in &self.plugins {
            tracing::debug!("🔌 Applying plugin {}", plugin.name());
            plugin.apply(hooks)?;
        }
        Ok(())
    }
}

impl Default for PluginManager {
    fn default() -> Self {
        Self::new()
    }
}
