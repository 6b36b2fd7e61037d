use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Build configuration, read from `tinypack.config.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildConfig {
    /// Entry module, relative to the invocation root
    pub entry: String,
    /// Directory import arguments are resolved under
    #[serde(default = "default_source_root")]
    pub source_root: String,
    pub output: OutputConfig,
    #[serde(default)]
    pub module: ModuleOptions,
    #[serde(default)]
    pub plugins: Vec<PluginSpec>,
}

fn default_source_root() -> String {
    "src".to_string()
}

fn default_filename() -> String {
    "bundle.js".to_string()
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            entry: "./src/index.js".to_string(),
            source_root: default_source_root(),
            output: OutputConfig::default(),
            module: ModuleOptions::default(),
            plugins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(alias = "directory")]
    pub path: PathBuf,
    #[serde(default = "default_filename")]
    pub filename: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("dist"),
            filename: default_filename(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModuleOptions {
    #[serde(default)]
    pub rules: Vec<Rule>,
}

/// A `test` pattern and the loaders applied to every module it matches
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    pub test: String,
    #[serde(rename = "use")]
    pub use_entry: UseEntry,
}

/// The three shapes a rule's `use` may take
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UseEntry {
    Single(String),
    Sequence(Vec<String>),
    WithOptions {
        #[serde(alias = "loader")]
        path: String,
        #[serde(default)]
        options: serde_json::Value,
    },
}

impl UseEntry {
    /// Normalize into invocations in execution order: the last declared
    /// loader of a sequence runs first.
    pub fn invocations(&self) -> Vec<LoaderInvocation> {
        match self {
            UseEntry::Single(reference) => vec![LoaderInvocation::new(reference)],
            UseEntry::Sequence(references) => references
                .iter()
                .rev()
                .map(|reference| LoaderInvocation::new(reference))
                .collect(),
            UseEntry::WithOptions { path, options } => vec![LoaderInvocation {
                reference: path.clone(),
                options: options.clone(),
            }],
        }
    }

    pub fn references(&self) -> Vec<&str> {
        match self {
            UseEntry::Single(reference) => vec![reference.as_str()],
            UseEntry::Sequence(references) => references.iter().map(String::as_str).collect(),
            UseEntry::WithOptions { path, .. } => vec![path.as_str()],
        }
    }
}

/// One loader call: which loader, with which options
#[derive(Debug, Clone, PartialEq)]
pub struct LoaderInvocation {
    pub reference: String,
    pub options: serde_json::Value,
}

impl LoaderInvocation {
    pub fn new(reference: &str) -> Self {
        Self {
            reference: reference.to_string(),
            options: serde_json::Value::Null,
        }
    }
}

/// A plugin selected by name in the configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginSpec {
    pub name: String,
    #[serde(default)]
    pub options: serde_json::Value,
}

/// Bundle-relative module key to final module source, in traversal order
#[derive(Debug, Clone, Default, Serialize)]
pub struct ModuleTable {
    modules: IndexMap<String, String>,
}

impl ModuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a module, replacing the source of an existing key in place.
    pub fn insert(&mut self, key: String, source: String) -> Option<String> {
        self.modules.insert(key, source)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.modules.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.modules.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.modules.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// Output of the import rewrite for one module
#[derive(Debug, Clone)]
pub struct ProcessedModule {
    pub code: String,
    /// Rewritten keys, in source order
    pub dependencies: Vec<String>,
}

/// Result of one run, handed to `afterEmit` and returned by `Compiler::start`
#[derive(Debug, Clone)]
pub struct Compilation {
    pub entry: String,
    pub modules: ModuleTable,
    pub output_path: PathBuf,
    pub emitted: bool,
    /// Module analyses performed; exceeds `modules.len()` when a module is reachable twice
    pub analyses: usize,
    pub build_time: Duration,
}
