use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::tempdir;
use tinypack::core::{BuildConfig, Compiler, FileSystemService, HookName, Hooks, Plugin, PluginSpec};
use tinypack::infrastructure::RUNTIME_REQUIRE;
use tinypack::TinypackError;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn config(entry: &str) -> BuildConfig {
    BuildConfig {
        entry: entry.to_string(),
        ..BuildConfig::default()
    }
}

/// Records every hook it sees, optionally failing on one of them
struct RecorderPlugin {
    seen: Arc<Mutex<Vec<String>>>,
    fail_on: Option<HookName>,
}

impl Plugin for RecorderPlugin {
    fn name(&self) -> &str {
        "recorder"
    }

    fn apply(&self, hooks: &mut Hooks) -> tinypack::Result<()> {
        for hook in HookName::ALL {
            let seen = Arc::clone(&self.seen);
            let fail = self.fail_on == Some(hook);
            hooks.register(hook.as_str(), self.name(), move || {
                seen.lock().push(hook.to_string());
                if fail {
                    anyhow::bail!("refusing {}", hook);
                }
                Ok(())
            })?;
        }
        Ok(())
    }
}

/// Keeps every file in memory
#[derive(Default)]
struct MemoryFileSystem {
    files: Mutex<HashMap<PathBuf, String>>,
}

impl FileSystemService for MemoryFileSystem {
    fn read_file(&self, path: &Path) -> tinypack::Result<String> {
        self.files
            .lock()
            .get(path)
            .cloned()
            .ok_or_else(|| TinypackError::ModuleRead {
                path: path.to_path_buf(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })
    }

    fn write_file(&self, path: &Path, content: &str) -> tinypack::Result<()> {
        self.files.lock().insert(path.to_path_buf(), content.to_string());
        Ok(())
    }

    fn create_directory(&self, _path: &Path) -> tinypack::Result<()> {
        Ok(())
    }

    fn file_exists(&self, path: &Path) -> bool {
        self.files.lock().contains_key(path)
    }
}

#[test]
fn test_entry_with_one_dependency() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(root, "src/index.js", "const util = require('./util.js');\nconsole.log(util.answer);\n");
    write(root, "src/util.js", "module.exports = { answer: 42 };\n");

    let compiler = Compiler::builder(config("./src/index.js"))
        .with_root(root)
        .build()
        .unwrap();
    let compilation = compiler.start().unwrap();

    assert_eq!(
        compilation.modules.keys().collect::<Vec<_>>(),
        vec!["./src/index.js", "./src/util.js"]
    );
    assert_eq!(compilation.entry, "./src/index.js");
    assert!(compilation.emitted);

    let bundle_path = root.join("dist/bundle.js");
    assert_eq!(compilation.output_path, bundle_path);
    let bundle = fs::read_to_string(&bundle_path).unwrap();
    assert!(bundle.contains("\"./src/index.js\": function"));
    assert!(bundle.contains("\"./src/util.js\": function"));
    assert!(bundle.contains("answer: 42"));
    assert!(bundle.contains(&format!("{}(\"./src/util.js\")", RUNTIME_REQUIRE)));
    assert!(bundle.contains(&format!("return {}(\"./src/index.js\");", RUNTIME_REQUIRE)));
}

#[test]
fn test_missing_entry_aborts_without_output() {
    let dir = tempdir().unwrap();
    let root = dir.path();

    let compiler = Compiler::builder(config("./src/missing.js"))
        .with_root(root)
        .build()
        .unwrap();
    let err = compiler.start().unwrap_err();

    assert!(matches!(err, TinypackError::ModuleRead { .. }));
    assert!(!root.join("dist/bundle.js").exists());
}

#[test]
fn test_parse_error_aborts_without_output() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(root, "src/index.js", "require('./broken.js');\n");
    write(root, "src/broken.js", "function (\n");

    let compiler = Compiler::builder(config("./src/index.js"))
        .with_root(root)
        .build()
        .unwrap();
    let err = compiler.start().unwrap_err();

    assert!(matches!(err, TinypackError::Parse { .. }));
    assert!(!root.join("dist").exists());
}

#[test]
fn test_hook_lifecycle_order() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(root, "src/index.js", "console.log('hi');\n");

    let seen = Arc::new(Mutex::new(Vec::new()));
    let compiler = Compiler::builder(config("./src/index.js"))
        .with_root(root)
        .with_plugin(Arc::new(RecorderPlugin {
            seen: Arc::clone(&seen),
            fail_on: None,
        }))
        .build()
        .unwrap();
    compiler.start().unwrap();

    assert_eq!(
        *seen.lock(),
        vec!["compiler", "afterCompiler", "emit", "afterEmit", "done"]
    );
}

#[test]
fn test_failing_hook_halts_run() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(root, "src/index.js", "console.log('hi');\n");

    let seen = Arc::new(Mutex::new(Vec::new()));
    let compiler = Compiler::builder(config("./src/index.js"))
        .with_root(root)
        .with_plugin(Arc::new(RecorderPlugin {
            seen: Arc::clone(&seen),
            fail_on: Some(HookName::Emit),
        }))
        .build()
        .unwrap();
    let err = compiler.start().unwrap_err();

    match err {
        TinypackError::HookInvocation { hook, plugin, .. } => {
            assert_eq!(hook, HookName::Emit);
            assert_eq!(plugin, "recorder");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(*seen.lock(), vec!["compiler", "afterCompiler", "emit"]);
    assert!(!root.join("dist/bundle.js").exists());
}

#[test]
fn test_write_failure_is_not_fatal() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(root, "src/index.js", "console.log('hi');\n");
    // A file where the output directory should go
    write(root, "dist", "");

    let seen = Arc::new(Mutex::new(Vec::new()));
    let compiler = Compiler::builder(config("./src/index.js"))
        .with_root(root)
        .with_plugin(Arc::new(RecorderPlugin {
            seen: Arc::clone(&seen),
            fail_on: None,
        }))
        .build()
        .unwrap();
    let compilation = compiler.start().unwrap();

    assert!(!compilation.emitted);
    assert_eq!(compilation.modules.len(), 1);
    assert_eq!(seen.lock().last().map(String::as_str), Some("done"));
}

#[test]
fn test_import_cycle_terminates() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(root, "src/index.js", "require('./a.js');\n");
    write(root, "src/a.js", "require('./b.js');\n");
    write(root, "src/b.js", "require('./a.js');\nrequire('./index.js');\n");

    let compiler = Compiler::builder(config("./src/index.js"))
        .with_root(root)
        .build()
        .unwrap();
    let compilation = compiler.start().unwrap();

    assert_eq!(
        compilation.modules.keys().collect::<Vec<_>>(),
        vec!["./src/index.js", "./src/a.js", "./src/b.js"]
    );
    assert_eq!(compilation.analyses, 3);
}

#[test]
fn test_diamond_is_analyzed_twice_but_stored_once() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(root, "src/index.js", "require('./a.js');\nrequire('./b.js');\n");
    write(root, "src/a.js", "require('./shared.js');\n");
    write(root, "src/b.js", "require('./shared.js');\n");
    write(root, "src/shared.js", "module.exports = 1;\n");

    let compiler = Compiler::builder(config("./src/index.js"))
        .with_root(root)
        .build()
        .unwrap();
    let compilation = compiler.start().unwrap();

    assert_eq!(
        compilation.modules.keys().collect::<Vec<_>>(),
        vec!["./src/index.js", "./src/a.js", "./src/shared.js", "./src/b.js"]
    );
    assert_eq!(compilation.analyses, 5);
}

#[test]
fn test_nested_directories_resolve_against_source_root() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(root, "src/index.js", "require('./lib/math.js');\n");
    write(root, "src/lib/math.js", "require('./lib/../helpers.js');\n");
    write(root, "src/helpers.js", "module.exports = {};\n");

    let compiler = Compiler::builder(config("./src/index.js"))
        .with_root(root)
        .build()
        .unwrap();
    let compilation = compiler.start().unwrap();

    assert_eq!(
        compilation.modules.keys().collect::<Vec<_>>(),
        vec!["./src/index.js", "./src/lib/math.js", "./src/helpers.js"]
    );
    assert!(compilation
        .modules
        .get("./src/lib/math.js")
        .unwrap()
        .contains("./src/helpers.js"));
}

#[test]
fn test_configured_banner_and_stats_plugins() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(root, "src/index.js", "console.log('hi');\n");

    let mut config = config("./src/index.js");
    config.output.filename = "app.js".to_string();
    config.plugins = vec![
        PluginSpec {
            name: "banner".to_string(),
            options: serde_json::json!({ "banner": "/*! app v1 */" }),
        },
        PluginSpec {
            name: "stats".to_string(),
            options: serde_json::json!({ "verbose": true }),
        },
    ];

    let compiler = Compiler::builder(config).with_root(root).build().unwrap();
    assert_eq!(compiler.hooks().tap_count(HookName::AfterEmit), 2);
    compiler.start().unwrap();

    let bundle = fs::read_to_string(root.join("dist/app.js")).unwrap();
    assert!(bundle.starts_with("/*! app v1 */\n"));
}

#[test]
fn test_compiler_can_run_twice() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(root, "src/index.js", "module.exports = 1;\n");

    let compiler = Compiler::builder(config("./src/index.js"))
        .with_root(root)
        .build()
        .unwrap();
    let first = compiler.start().unwrap();

    write(root, "src/index.js", "require('./extra.js');\n");
    write(root, "src/extra.js", "module.exports = 2;\n");
    let second = compiler.start().unwrap();

    assert_eq!(first.modules.len(), 1);
    assert_eq!(second.modules.len(), 2);
}

#[test]
fn test_custom_file_system_sees_whole_build() {
    let memory = Arc::new(MemoryFileSystem::default());
    memory
        .write_file(Path::new("/virtual/src/index.js"), "require('./util.js');\n")
        .unwrap();
    memory
        .write_file(Path::new("/virtual/src/util.js"), "module.exports = 1;\n")
        .unwrap();

    let mut config = config("./src/index.js");
    config.plugins = vec![PluginSpec {
        name: "banner".to_string(),
        options: serde_json::json!({ "banner": "/*! virtual */" }),
    }];

    let compiler = Compiler::builder(config)
        .with_root("/virtual")
        .with_file_system(memory.clone())
        .build()
        .unwrap();
    let compilation = compiler.start().unwrap();

    assert!(compilation.emitted);
    assert_eq!(compilation.modules.len(), 2);
    let bundle = memory.read_file(Path::new("/virtual/dist/bundle.js")).unwrap();
    assert!(bundle.starts_with("/*! virtual */\n"));
    assert!(bundle.contains("./src/util.js"));
    assert!(!Path::new("/virtual").exists());
}
