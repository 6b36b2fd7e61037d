//! The build driver.
//!
//! A `Compiler` is assembled once from a `BuildConfig`: plugins are applied
//! to a fresh hook registry and the loader rules are compiled. Each call to
//! `start` then runs one synchronous build:
//!
//! `compiler` → graph → `afterCompiler` → `emit` → write → `afterEmit` → `done`
//!
//! The remaining hooks (`afterPlugins`, `beforeRun`, `run`, `make`,
//! `shouldEmit`) accept taps but are never called by the driver.

use crate::core::graph::DependencyGraphBuilder;
use crate::core::hooks::Hooks;
use crate::core::interfaces::{FileSystemService, Loader};
use crate::core::models::{BuildConfig, Compilation};
use crate::core::plugin::{Plugin, PluginManager};
use crate::infrastructure::{
    BundleEmitter, LoaderRegistry, LoaderRunner, OxcJsProcessor, StdFileSystem,
};
use crate::plugins;
use crate::utils::{paths, Logger, Result, Timer, TinypackError};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

pub struct CompilerBuilder {
    config: BuildConfig,
    root: Option<PathBuf>,
    plugins: Vec<Arc<dyn Plugin>>,
    loaders: LoaderRegistry,
    fs_service: Arc<dyn FileSystemService>,
}

impl CompilerBuilder {
    /// Invocation root; defaults to the current working directory
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Add a plugin, applied after the ones named in the configuration
    pub fn with_plugin(mut self, plugin: Arc<dyn Plugin>) -> Self {
        self.plugins.push(plugin);
        self
    }

    /// Make an in-process loader available to rules under its name
    pub fn with_loader(mut self, loader: Arc<dyn Loader>) -> Self {
        self.loaders.register(loader);
        self
    }

    pub fn with_file_system(mut self, fs_service: Arc<dyn FileSystemService>) -> Self {
        self.fs_service = fs_service;
        self
    }

    /// Validate the configuration, apply plugins and compile the rules
    pub fn build(self) -> Result<Compiler> {
        validate(&self.config)?;

        let root = match self.root {
            Some(root) => paths::normalize(&root),
            None => std::env::current_dir()?,
        };

        let mut plugin_manager = PluginManager::new();
        for spec in &self.config.plugins {
            plugin_manager.register(plugins::create(spec, Arc::clone(&self.fs_service))?);
        }
        for plugin in self.plugins {
            plugin_manager.register(plugin);
        }

        let mut hooks = Hooks::new();
        plugin_manager.apply_all(&mut hooks)?;

        Logger::debug(&format!(
            "⚙️  {} loaders registered, {} rules",
            self.loaders.len(),
            self.config.module.rules.len()
        ));
        let loader_runner = LoaderRunner::new(root.clone(), &self.config.module.rules, self.loaders)?;
        let graph_builder = DependencyGraphBuilder::new(
            root.clone(),
            Arc::clone(&self.fs_service),
            Arc::new(loader_runner),
            Arc::new(OxcJsProcessor::new(self.config.source_root.clone())),
        );

        Logger::debug(&format!(
            "🔌 Plugins: [{}]",
            plugin_manager.names().join(", ")
        ));

        Ok(Compiler {
            config: self.config,
            root,
            hooks,
            plugin_manager,
            graph_builder,
            emitter: BundleEmitter::new(self.fs_service),
        })
    }
}

fn validate(config: &BuildConfig) -> Result<()> {
    if config.entry.trim().is_empty() {
        return Err(TinypackError::config("`entry` must not be empty"));
    }
    if config.output.filename.trim().is_empty() {
        return Err(TinypackError::config("`output.filename` must not be empty"));
    }
    Ok(())
}

pub struct Compiler {
    config: BuildConfig,
    root: PathBuf,
    hooks: Hooks,
    plugin_manager: PluginManager,
    graph_builder: DependencyGraphBuilder,
    emitter: BundleEmitter,
}

impl Compiler {
    pub fn builder(config: BuildConfig) -> CompilerBuilder {
        CompilerBuilder {
            config,
            root: None,
            plugins: Vec::new(),
            loaders: LoaderRegistry::with_builtins(),
            fs_service: Arc::new(StdFileSystem),
        }
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn hooks(&self) -> &Hooks {
        &self.hooks
    }

    pub fn plugin_names(&self) -> Vec<&str> {
        self.plugin_manager.names()
    }

    pub fn entry_path(&self) -> PathBuf {
        paths::resolve(&self.root, &self.config.entry)
    }

    pub fn output_path(&self) -> PathBuf {
        paths::normalize(
            &self
                .root
                .join(&self.config.output.path)
                .join(&self.config.output.filename),
        )
    }

    /// Run one build. Every failure except a bundle write error aborts
    /// the run and is returned unchanged.
    pub fn start(&self) -> Result<Compilation> {
        let started = Instant::now();
        let entry_path = self.entry_path();
        let output_path = self.output_path();

        Logger::build_start(
            &self.root.display().to_string(),
            &self.config.entry,
            &output_path.display().to_string(),
        );

        self.hooks.compiler.call(&())?;

        let graph = {
            let _timer = Timer::start("Dependency graph");
            self.graph_builder.build(&entry_path)?
        };

        self.hooks.after_compiler.call(&())?;
        self.hooks.emit.call(&())?;

        let entry = paths::module_key(&self.root, &entry_path);
        let emitted = {
            let _timer = Timer::start("Emit");
            self.emitter.emit(&entry, &graph.modules, &output_path)?
        };

        let compilation = Compilation {
            entry,
            modules: graph.modules,
            output_path,
            emitted,
            analyses: graph.analyses,
            build_time: started.elapsed(),
        };

        self.hooks.after_emit.call(&compilation)?;
        self.hooks.done.call(&())?;

        if compilation.emitted {
            Logger::build_complete(
                compilation.modules.len(),
                compilation.analyses,
                compilation.build_time,
                &compilation.output_path.display().to_string(),
            );
        } else {
            Logger::warn(&format!(
                "Build finished with {} modules but the bundle was not written",
                compilation.modules.len()
            ));
        }

        Ok(compilation)
    }
}
