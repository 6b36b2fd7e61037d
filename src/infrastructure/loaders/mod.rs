//! Loader chain execution.
//!
//! Every rule whose `test` matches a module contributes its loaders. Rules
//! are walked from the last declared to the first, and inside a rule the
//! last declared loader runs first, so the loader written closest to the
//! file sees the raw source.

pub mod builtin;
pub mod command;

pub use builtin::{JsonLoader, ReplaceLoader};
pub use command::CommandLoader;

use crate::core::interfaces::{Loader, LoaderContext};
use crate::core::models::{LoaderInvocation, Rule, UseEntry};
use crate::utils::{paths, Logger, Result, TinypackError};
use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// In-process loaders addressable by name from a rule's `use`
#[derive(Clone, Default)]
pub struct LoaderRegistry {
    loaders: HashMap<String, Arc<dyn Loader>>,
}

impl LoaderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with `json-loader` and `replace-loader`
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(JsonLoader));
        registry.register(Arc::new(ReplaceLoader));
        registry
    }

    /// Register a loader under its own name, replacing any previous one
    pub fn register(&mut self, loader: Arc<dyn Loader>) {
        self.loaders.insert(loader.name().to_string(), loader);
    }

    pub fn get(&self, reference: &str) -> Option<Arc<dyn Loader>> {
        self.loaders.get(reference).cloned()
    }

    pub fn len(&self) -> usize {
        self.loaders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loaders.is_empty()
    }
}

/// A rule with its pattern compiled
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub pattern: Regex,
    pub use_entry: UseEntry,
}

impl CompiledRule {
    pub fn compile(rule: &Rule) -> Result<Self> {
        let pattern = Regex::new(&rule.test).map_err(|e| {
            TinypackError::config(format!("Invalid rule test '{}': {}", rule.test, e))
        })?;

        let references = rule.use_entry.references();
        if references.is_empty() {
            return Err(TinypackError::config(format!(
                "Rule '{}' has an empty loader list",
                rule.test
            )));
        }
        if references.iter().any(|r| r.trim().is_empty()) {
            return Err(TinypackError::config(format!(
                "Rule '{}' has an empty loader reference",
                rule.test
            )));
        }

        Ok(Self {
            pattern,
            use_entry: rule.use_entry.clone(),
        })
    }
}

/// Applies the configured rules to module sources
pub struct LoaderRunner {
    root: PathBuf,
    rules: Vec<CompiledRule>,
    registry: LoaderRegistry,
}

impl LoaderRunner {
    pub fn new(root: PathBuf, rules: &[Rule], registry: LoaderRegistry) -> Result<Self> {
        let rules = rules
            .iter()
            .map(CompiledRule::compile)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            root,
            rules,
            registry,
        })
    }

    /// Loader invocations for `module_path`, in execution order
    pub fn matching_invocations(&self, module_path: &Path) -> Vec<LoaderInvocation> {
        let subject = paths::to_slash(&module_path.to_string_lossy());
        self.rules
            .iter()
            .rev()
            .filter(|rule| rule.pattern.is_match(&subject))
            .flat_map(|rule| rule.use_entry.invocations())
            .collect()
    }

    /// Pipe `source` through every matching loader.
    ///
    /// The whole chain is resolved before the first loader runs, so an
    /// unresolvable reference leaves the module untouched.
    pub fn apply_loaders(&self, module_path: &Path, source: String) -> Result<String> {
        let mut chain = Vec::new();
        for invocation in self.matching_invocations(module_path) {
            let loader = self.resolve(&invocation.reference)?;
            chain.push((loader, invocation));
        }

        let mut source = source;
        for (loader, invocation) in chain {
            Logger::applying_loader(&invocation.reference, &module_path.display().to_string());
            let context = LoaderContext {
                resource_path: module_path.to_path_buf(),
                root: self.root.clone(),
                options: invocation.options,
            };
            source = loader
                .run(source, &context)
                .map_err(|source| TinypackError::LoaderExecution {
                    loader: invocation.reference.clone(),
                    module: module_path.to_path_buf(),
                    source,
                })?;
        }
        Ok(source)
    }

    /// Registry name first, then a file relative to the invocation root
    fn resolve(&self, reference: &str) -> Result<Arc<dyn Loader>> {
        if let Some(loader) = self.registry.get(reference) {
            return Ok(loader);
        }

        let path = paths::resolve(&self.root, reference);
        if path.is_file() {
            return Ok(Arc::new(CommandLoader::new(reference, path)));
        }

        Err(TinypackError::LoaderResolution {
            loader: reference.to_string(),
            path,
        })
    }
}
