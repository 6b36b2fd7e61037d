// Stats Plugin: Logs build statistics

use crate::core::hooks::Hooks;
use crate::core::models::Compilation;
use crate::core::plugin::Plugin;
use crate::utils::{Logger, Result};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;

/// Plugin that times the run and logs what ended up in the bundle
pub struct StatsPlugin {
    verbose: bool,
    start_time: Arc<Mutex<Option<Instant>>>,
}

impl StatsPlugin {
    /// Create a new stats plugin
    ///
    /// # Arguments
    /// * `verbose` - If true, also logs every module key
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            start_time: Arc::new(Mutex::new(None)),
        }
    }

    /// Start of the most recent run, set by the `compiler` hook
    pub fn started_at(&self) -> Option<Instant> {
        *self.start_time.lock()
    }
}

impl Plugin for StatsPlugin {
    fn name(&self) -> &str {
        "stats-plugin"
    }

    fn apply(&self, hooks: &mut Hooks) -> Result<()> {
        let start_time = Arc::clone(&self.start_time);
        hooks.compiler.tap(self.name(), move |_| {
            *start_time.lock() = Some(Instant::now());
            Ok(())
        });

        let verbose = self.verbose;
        hooks
            .after_emit
            .tap(self.name(), move |compilation: &Compilation| {
                Logger::info("📊 Stats Plugin: Build Statistics");
                Logger::info(&format!("  📦 Modules: {}", compilation.modules.len()));
                Logger::info(&format!("  🔁 Analyses: {}", compilation.analyses));

                if compilation.emitted {
                    let size = std::fs::metadata(&compilation.output_path)
                        .map(|m| m.len())
                        .unwrap_or(0);
                    Logger::info(&format!(
                        "  📂 Output: {} ({} bytes)",
                        compilation.output_path.display(),
                        size
                    ));
                } else {
                    Logger::warn("Stats Plugin: bundle was not written");
                }

                if verbose {
                    Logger::info("  📄 Modules:");
                    for (i, key) in compilation.modules.keys().enumerate() {
                        Logger::info(&format!("     {}. {}", i + 1, key));
                    }
                }
                Ok(())
            });

        let start_time = Arc::clone(&self.start_time);
        hooks.done.tap(self.name(), move |_| {
            if let Some(start) = *start_time.lock() {
                Logger::info(&format!("  ⚡ Total time: {:.2?}", start.elapsed()));
            }
            Ok(())
        });

        Ok(())
    }
}
