// Banner Plugin: Adds a comment banner to the top of the emitted bundle

use crate::core::hooks::Hooks;
use crate::core::interfaces::FileSystemService;
use crate::core::models::Compilation;
use crate::core::plugin::Plugin;
use crate::infrastructure::StdFileSystem;
use crate::utils::{Logger, Result};
use std::sync::Arc;

/// Plugin that prepends a banner comment to the bundle once it is written
///
/// # Example
/// ```no_run
/// use tinypack::core::{BuildConfig, Compiler};
/// use tinypack::plugins::BannerPlugin;
/// use std::sync::Arc;
///
/// let compiler = Compiler::builder(BuildConfig::default())
///     .with_plugin(Arc::new(BannerPlugin::new("/*! MyApp v1.0.0 */")))
///     .build()
///     .unwrap();
/// ```
pub struct BannerPlugin {
    banner: String,
    fs_service: Arc<dyn FileSystemService>,
}

impl BannerPlugin {
    /// Create a new banner plugin with the specified banner text
    pub fn new(banner: impl Into<String>) -> Self {
        Self {
            banner: banner.into(),
            fs_service: Arc::new(StdFileSystem),
        }
    }

    /// Rewrite the bundle through `fs_service` instead of the real disk
    pub fn with_file_system(mut self, fs_service: Arc<dyn FileSystemService>) -> Self {
        self.fs_service = fs_service;
        self
    }
}

impl Plugin for BannerPlugin {
    fn name(&self) -> &str {
        "banner-plugin"
    }

    fn apply(&self, hooks: &mut Hooks) -> Result<()> {
        let banner = self.banner.clone();
        let fs_service = Arc::clone(&self.fs_service);
        hooks
            .after_emit
            .tap(self.name(), move |compilation: &Compilation| {
                // Nothing to decorate when the write failed
                if !compilation.emitted {
                    return Ok(());
                }

                let path = &compilation.output_path;
                let bundle = fs_service.read_file(path)?;
                fs_service.write_file(path, &format!("{}\n{}", banner, bundle))?;

                Logger::debug(&format!("🏷️  Banner added to {}", path.display()));
                Ok(())
            });
        Ok(())
    }
}
