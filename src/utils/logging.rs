use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

pub struct Logger;

impl Logger {
    /// Install the global subscriber. `RUST_LOG` wins over the default filter.
    pub fn init() {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("tinypack=info"));

        // A second init (tests, embedding) keeps the first subscriber
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .try_init();
    }

    pub fn build_start(root: &str, entry: &str, output: &str) {
        info!("🔨 tinypack build");
        info!("📁 Root: {}", root);
        info!("🎯 Entry: {}", entry);
        info!("📦 Output: {}", output);
    }

    pub fn analyzing_module(key: &str) {
        debug!("🔍 Analyzing module: {}", key);
    }

    pub fn applying_loader(loader: &str, module: &str) {
        debug!("⚙️  Loader {} → {}", loader, module);
    }

    pub fn build_complete(modules: usize, analyses: usize, build_time: std::time::Duration, output: &str) {
        info!("📊 Modules: {} ({} analyses)", modules, analyses);
        info!("⏱️  Build time: {:.2?}", build_time);
        info!("✅ Bundle written to {}", output);
    }

    pub fn info(msg: &str) {
        info!("{}", msg);
    }

    pub fn debug(msg: &str) {
        debug!("{}", msg);
    }

    pub fn error(msg: &str) {
        error!("❌ {}", msg);
    }

    pub fn warn(msg: &str) {
        warn!("⚠️  {}", msg);
    }
}

pub struct Timer {
    start: Instant,
    name: String,
}

impl Timer {
    pub fn start(name: &str) -> Self {
        debug!("⏱️  Starting: {}", name);
        Self {
            start: Instant::now(),
            name: name.to_string(),
        }
    }

    pub fn elapsed(&self) -> std::time::Duration {
        self.start.elapsed()
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        debug!("⏱️  Completed: {} in {:.2?}", self.name, self.elapsed());
    }
}
