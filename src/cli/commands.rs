use crate::core::Compiler;
use crate::utils::{ConfigLoader, Logger, Result, CONFIG_FILE};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tinypack")]
#[command(about = "tinypack - a small module bundler")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Bundle the project in the current directory
    Build {
        /// Configuration file (default: tinypack.config.json in the current directory)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Write an example tinypack.config.json
    Init,
    /// Show bundler information
    Info,
}

pub struct CliHandler;

impl CliHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn run(&self) -> Result<()> {
        Logger::init();

        let cli = Cli::parse();

        match cli.command {
            Commands::Build { config } => self.handle_build_command(config),
            Commands::Init => self.handle_init_command(),
            Commands::Info => self.handle_info_command(),
        }
    }

    fn handle_build_command(&self, config_path: Option<PathBuf>) -> Result<()> {
        let root = std::env::current_dir()?;
        let config = match config_path {
            Some(path) => ConfigLoader::load(&root.join(path))?,
            None => ConfigLoader::load_from_file(&root)?,
        };

        let compiler = Compiler::builder(config).with_root(root).build()?;
        compiler.start()?;
        Ok(())
    }

    fn handle_init_command(&self) -> Result<()> {
        let root = std::env::current_dir()?;
        let path = ConfigLoader::config_path(&root);

        if path.exists() {
            Logger::warn(&format!("{} already exists, leaving it untouched", CONFIG_FILE));
            return Ok(());
        }

        std::fs::write(&path, ConfigLoader::generate_example())?;
        Logger::info(&format!("📝 Created {}", path.display()));
        Ok(())
    }

    fn handle_info_command(&self) -> Result<()> {
        tracing::info!("🦀 tinypack v{}", env!("CARGO_PKG_VERSION"));
        tracing::info!("══════════════════════════════════════");
        tracing::info!("");
        tracing::info!("🏗️  Pipeline:");
        tracing::info!("  • Loader chains matched by rule patterns");
        tracing::info!("  • oxc parser and code generator for import rewriting");
        tracing::info!("  • Depth-first dependency graph from a single entry");
        tracing::info!("  • minijinja bundle template");
        tracing::info!("");
        tracing::info!("🪝 Hooks:");
        for hook in crate::core::HookName::ALL {
            tracing::info!("  • {}", hook);
        }
        tracing::info!("");
        tracing::info!("🔌 Built-in plugins: {}", crate::plugins::BUILTIN_PLUGINS.join(", "));
        tracing::info!("⚙️  Built-in loaders: json-loader, replace-loader");

        Ok(())
    }
}

impl Default for CliHandler {
    fn default() -> Self {
        Self::new()
    }
}
