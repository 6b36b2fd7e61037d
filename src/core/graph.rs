//! Depth-first dependency graph construction.
//!
//! Starting at the entry, each module is read, piped through its loader
//! chain, parsed and rewritten, stored under its key, and then every
//! dependency it names is analyzed in source order. A module is stored
//! before its dependencies are visited, so the table lists modules in
//! pre-order.

use crate::core::interfaces::{FileSystemService, JsProcessor};
use crate::core::models::ModuleTable;
use crate::infrastructure::LoaderRunner;
use crate::utils::{paths, Logger, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Every module reachable from one entry
#[derive(Debug, Default)]
pub struct ModuleGraph {
    pub modules: ModuleTable,
    /// Number of read/load/parse passes; a module reached along two paths counts twice
    pub analyses: usize,
}

pub struct DependencyGraphBuilder {
    root: PathBuf,
    fs_service: Arc<dyn FileSystemService>,
    loader_runner: Arc<LoaderRunner>,
    js_processor: Arc<dyn JsProcessor>,
}

impl DependencyGraphBuilder {
    pub fn new(
        root: PathBuf,
        fs_service: Arc<dyn FileSystemService>,
        loader_runner: Arc<LoaderRunner>,
        js_processor: Arc<dyn JsProcessor>,
    ) -> Self {
        Self {
            root,
            fs_service,
            loader_runner,
            js_processor,
        }
    }

    /// Build the module table for `entry_path`.
    ///
    /// Any failure aborts the whole build; no partial table is returned.
    pub fn build(&self, entry_path: &Path) -> Result<ModuleGraph> {
        let mut graph = ModuleGraph::default();
        let mut ancestry = Vec::new();
        self.analyze(&paths::normalize(entry_path), &mut graph, &mut ancestry)?;
        Ok(graph)
    }

    fn analyze(
        &self,
        module_path: &Path,
        graph: &mut ModuleGraph,
        ancestry: &mut Vec<PathBuf>,
    ) -> Result<()> {
        let key = paths::module_key(&self.root, module_path);
        Logger::analyzing_module(&key);
        graph.analyses += 1;

        let raw = self.fs_service.read_file(module_path)?;
        let loaded = self.loader_runner.apply_loaders(module_path, raw)?;
        let processed = self.js_processor.process_module(&loaded, module_path)?;

        graph.modules.insert(key, processed.code);

        ancestry.push(module_path.to_path_buf());
        for dependency in &processed.dependencies {
            let dependency_path = paths::resolve(&self.root, dependency);

            // A module already on the current chain is being analyzed; its
            // entry will be complete once the chain unwinds
            if ancestry.contains(&dependency_path) {
                Logger::debug(&format!("↩️  Circular import of {} skipped", dependency));
                continue;
            }

            self.analyze(&dependency_path, graph, ancestry)?;
        }
        ancestry.pop();

        Ok(())
    }
}
