use parking_lot::Mutex;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::tempdir;
use tinypack::core::{BuildConfig, Compiler, Loader, LoaderContext, Rule, UseEntry};
use tinypack::TinypackError;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Appends a marker comment and records the module it ran on
struct MarkLoader {
    name: String,
    log: Arc<Mutex<Vec<String>>>,
}

impl Loader for MarkLoader {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, source: String, context: &LoaderContext) -> anyhow::Result<String> {
        let file = context
            .resource_path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.log.lock().push(format!("{}:{}", self.name, file));
        Ok(format!("{}\n// {}", source, self.name))
    }
}

struct FailingLoader;

impl Loader for FailingLoader {
    fn name(&self) -> &str {
        "failing"
    }

    fn run(&self, _source: String, _context: &LoaderContext) -> anyhow::Result<String> {
        anyhow::bail!("cannot handle this file")
    }
}

fn mark(name: &str, log: &Arc<Mutex<Vec<String>>>) -> Arc<MarkLoader> {
    Arc::new(MarkLoader {
        name: name.to_string(),
        log: Arc::clone(log),
    })
}

fn sequence(names: &[&str]) -> UseEntry {
    UseEntry::Sequence(names.iter().map(|s| s.to_string()).collect())
}

#[test]
fn test_loader_order_across_rules() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(root, "src/index.js", "module.exports = 1;\n");

    let log = Arc::new(Mutex::new(Vec::new()));
    let config = BuildConfig {
        entry: "./src/index.js".to_string(),
        module: tinypack::core::ModuleOptions {
            rules: vec![
                Rule {
                    test: r"\.js$".to_string(),
                    use_entry: sequence(&["a0", "a1"]),
                },
                Rule {
                    test: r"index\.js$".to_string(),
                    use_entry: sequence(&["b0", "b1"]),
                },
            ],
        },
        ..BuildConfig::default()
    };

    let compiler = Compiler::builder(config)
        .with_root(root)
        .with_loader(mark("a0", &log))
        .with_loader(mark("a1", &log))
        .with_loader(mark("b0", &log))
        .with_loader(mark("b1", &log))
        .build()
        .unwrap();
    compiler.start().unwrap();

    assert_eq!(
        *log.lock(),
        vec!["b1:index.js", "b0:index.js", "a1:index.js", "a0:index.js"]
    );
}

#[test]
fn test_loaders_only_touch_matching_modules() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(root, "src/index.js", "require('./data.json');\n");
    write(root, "src/data.json", "{ \"name\": \"tinypack\", \"tags\": [1, 2] }\n");

    let log = Arc::new(Mutex::new(Vec::new()));
    let config = BuildConfig {
        entry: "./src/index.js".to_string(),
        module: tinypack::core::ModuleOptions {
            rules: vec![
                Rule {
                    test: r"\.json$".to_string(),
                    use_entry: UseEntry::Single("json-loader".to_string()),
                },
                Rule {
                    test: r"\.js$".to_string(),
                    use_entry: UseEntry::Single("mark".to_string()),
                },
            ],
        },
        ..BuildConfig::default()
    };

    let compiler = Compiler::builder(config)
        .with_root(root)
        .with_loader(mark("mark", &log))
        .build()
        .unwrap();
    let compilation = compiler.start().unwrap();

    assert_eq!(*log.lock(), vec!["mark:index.js"]);
    let data = compilation.modules.get("./src/data.json").unwrap();
    assert!(data.contains("module.exports"));
    assert!(data.contains("tinypack"));
}

#[test]
fn test_replace_loader_options() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(root, "src/index.js", "console.log('__VERSION__');\n");

    let config: BuildConfig = serde_json::from_value(serde_json::json!({
        "entry": "./src/index.js",
        "output": { "path": "out" },
        "module": { "rules": [
            { "test": "\\.js$", "use": { "loader": "replace-loader", "options": { "search": "__VERSION__", "replace": "2.0.0" } } }
        ] }
    }))
    .unwrap();

    let compiler = Compiler::builder(config).with_root(root).build().unwrap();
    compiler.start().unwrap();

    let bundle = fs::read_to_string(root.join("out/bundle.js")).unwrap();
    assert!(bundle.contains("2.0.0"));
    assert!(!bundle.contains("__VERSION__"));
}

#[test]
fn test_unresolvable_loader_aborts_before_parse() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    // Would be a parse error if it ever reached the parser
    write(root, "src/index.js", "function (\n");

    let config = BuildConfig {
        entry: "./src/index.js".to_string(),
        module: tinypack::core::ModuleOptions {
            rules: vec![Rule {
                test: r"\.js$".to_string(),
                use_entry: UseEntry::Single("./loaders/missing".to_string()),
            }],
        },
        ..BuildConfig::default()
    };

    let compiler = Compiler::builder(config).with_root(root).build().unwrap();
    let err = compiler.start().unwrap_err();

    match err {
        TinypackError::LoaderResolution { loader, path } => {
            assert_eq!(loader, "./loaders/missing");
            assert!(path.ends_with("loaders/missing"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(!root.join("dist").exists());
}

#[test]
fn test_loader_failure_names_loader_and_module() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(root, "src/index.js", "module.exports = 1;\n");

    let config = BuildConfig {
        entry: "./src/index.js".to_string(),
        module: tinypack::core::ModuleOptions {
            rules: vec![Rule {
                test: r"\.js$".to_string(),
                use_entry: UseEntry::Single("failing".to_string()),
            }],
        },
        ..BuildConfig::default()
    };

    let compiler = Compiler::builder(config)
        .with_root(root)
        .with_loader(Arc::new(FailingLoader))
        .build()
        .unwrap();
    let err = compiler.start().unwrap_err();

    match err {
        TinypackError::LoaderExecution { loader, module, source } => {
            assert_eq!(loader, "failing");
            assert!(module.ends_with("src/index.js"));
            assert_eq!(source.to_string(), "cannot handle this file");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_invalid_rule_pattern_rejected_at_construction() {
    let config = BuildConfig {
        module: tinypack::core::ModuleOptions {
            rules: vec![Rule {
                test: "*.js".to_string(),
                use_entry: UseEntry::Single("json-loader".to_string()),
            }],
        },
        ..BuildConfig::default()
    };

    let err = Compiler::builder(config)
        .with_root("/project")
        .build()
        .err()
        .unwrap();
    assert!(matches!(err, TinypackError::Config(_)));
}
