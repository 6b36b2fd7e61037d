use crate::core::models::ProcessedModule;
use crate::utils::Result;
use std::path::{Path, PathBuf};

/// File system operations interface
pub trait FileSystemService: Send + Sync {
    fn read_file(&self, path: &Path) -> Result<String>;
    fn write_file(&self, path: &Path, content: &str) -> Result<()>;
    fn create_directory(&self, path: &Path) -> Result<()>;
    fn file_exists(&self, path: &Path) -> bool;
}

/// JavaScript processing interface: parse, rewrite imports, regenerate
pub trait JsProcessor: Send + Sync {
    fn process_module(&self, source: &str, path: &Path) -> Result<ProcessedModule>;
}

/// What a loader knows about the module it is transforming
#[derive(Debug, Clone)]
pub struct LoaderContext {
    /// Absolute path of the module being loaded
    pub resource_path: PathBuf,
    /// Invocation root loaders are resolved against
    pub root: PathBuf,
    /// `options` of a `{ path, options }` rule entry, `Null` otherwise
    pub options: serde_json::Value,
}

/// A source-to-source transform bound to modules by a rule
pub trait Loader: Send + Sync {
    fn name(&self) -> &str;

    fn run(&self, source: String, context: &LoaderContext) -> anyhow::Result<String>;
}
