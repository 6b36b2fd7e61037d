use crate::core::models::{BuildConfig, ModuleOptions, OutputConfig, PluginSpec, Rule, UseEntry};
use crate::utils::{Logger, Result, TinypackError};
use std::path::{Path, PathBuf};

/// Configuration file looked up in the invocation root
pub const CONFIG_FILE: &str = "tinypack.config.json";

/// Reads `tinypack.config.json`
pub struct ConfigLoader;

impl ConfigLoader {
    /// Path the configuration is expected at for `root`
    pub fn config_path(root: &Path) -> PathBuf {
        root.join(CONFIG_FILE)
    }

    /// Load the configuration from the project root
    pub fn load_from_file(root: &Path) -> Result<BuildConfig> {
        Self::load(&Self::config_path(root))
    }

    /// Load configuration from an explicit path
    pub fn load(path: &Path) -> Result<BuildConfig> {
        if !path.is_file() {
            return Err(TinypackError::config(format!(
                "No configuration found at {} (run `tinypack init` to create one)",
                path.display()
            )));
        }

        Logger::debug(&format!("Loading config from {}", path.display()));

        let content = std::fs::read_to_string(path)?;
        let config: BuildConfig = serde_json::from_str(&content).map_err(|e| {
            TinypackError::config(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        Logger::debug("✅ Config file loaded successfully");
        Ok(config)
    }

    /// Example configuration written by `tinypack init`
    pub fn generate_example() -> String {
        let example = BuildConfig {
            entry: "./src/index.js".to_string(),
            source_root: "src".to_string(),
            output: OutputConfig {
                path: PathBuf::from("dist"),
                filename: "bundle.js".to_string(),
            },
            module: ModuleOptions {
                rules: vec![Rule {
                    test: r"\.json$".to_string(),
                    use_entry: UseEntry::Single("json-loader".to_string()),
                }],
            },
            plugins: vec![PluginSpec {
                name: "stats".to_string(),
                options: serde_json::json!({ "verbose": false }),
            }],
        };

        serde_json::to_string_pretty(&example).unwrap_or_else(|_| {
            r#"{
  "entry": "./src/index.js",
  "sourceRoot": "src",
  "output": { "path": "dist", "filename": "bundle.js" }
}"#
            .to_string()
        })
    }
}
