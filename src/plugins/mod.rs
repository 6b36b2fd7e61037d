// Built-in plugins, selectable from the configuration by name

pub mod banner_plugin;
pub mod stats_plugin;

pub use banner_plugin::BannerPlugin;
pub use stats_plugin::StatsPlugin;

use crate::core::interfaces::FileSystemService;
use crate::core::models::PluginSpec;
use crate::core::plugin::Plugin;
use crate::utils::{Result, TinypackError};
use std::sync::Arc;

/// Names accepted in the `plugins` section
pub const BUILTIN_PLUGINS: &[&str] = &["banner", "banner-plugin", "stats", "stats-plugin"];

/// Instantiate the built-in plugin a configuration entry names.
///
/// Plugins that touch the emitted bundle do so through `fs_service`.
pub fn create(spec: &PluginSpec, fs_service: Arc<dyn FileSystemService>) -> Result<Arc<dyn Plugin>> {
    match spec.name.as_str() {
        "banner" | "banner-plugin" => {
            let banner = spec
                .options
                .get("banner")
                .and_then(|v| v.as_str())
                .ok_or_else(|| {
                    TinypackError::config(format!(
                        "Plugin '{}' needs a string `banner` option",
                        spec.name
                    ))
                })?;
            Ok(Arc::new(BannerPlugin::new(banner).with_file_system(fs_service)))
        }
        "stats" | "stats-plugin" => {
            let verbose = spec
                .options
                .get("verbose")
                .and_then(|v| v.as_bool())
                .unwrap_or(false);
            Ok(Arc::new(StatsPlugin::new(verbose)))
        }
        other => Err(TinypackError::config(format!(
            "Unknown plugin '{}' (available: {})",
            other,
            BUILTIN_PLUGINS.join(", ")
        ))),
    }
}
