//! Lexical path helpers used to build bundle-relative module keys.
//!
//! Nothing here touches the file system: keys must come out identical on
//! every platform regardless of symlinks or whether the file exists yet.

use std::path::{Component, Path, PathBuf};

/// Prefix marking a key as living inside the bundle's logical root.
pub const KEY_PREFIX: &str = "./";

/// Resolve `.` and `..` components without consulting the file system.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(out.components().next_back(), Some(Component::Normal(_)));
                if popped {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Join `path` onto the invocation root and normalize the result.
pub fn resolve(root: &Path, path: &str) -> PathBuf {
    normalize(&root.join(to_slash(path)))
}

/// Replace any run of backslashes with a single forward slash.
pub fn to_slash(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut last_was_backslash = false;
    for ch in path.chars() {
        if ch == '\\' {
            if !last_was_backslash {
                out.push('/');
            }
            last_was_backslash = true;
        } else {
            out.push(ch);
            last_was_backslash = false;
        }
    }
    out
}

fn path_to_slash(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Key of a module located at `module_path`: its path relative to `root`,
/// forward-slashed and prefixed with `./`.
pub fn module_key(root: &Path, module_path: &Path) -> String {
    let root = normalize(root);
    let module_path = normalize(module_path);
    format!("{}{}", KEY_PREFIX, path_to_slash(&relative_to(&root, &module_path)))
}

/// Key an import argument maps to: the argument joined onto `source_root`.
///
/// A leading `/` on the argument does not escape `source_root`.
pub fn dependency_key(source_root: &str, specifier: &str) -> String {
    let specifier = to_slash(specifier);
    let joined = Path::new(&to_slash(source_root)).join(specifier.trim_start_matches('/'));
    format!("{}{}", KEY_PREFIX, path_to_slash(&normalize(&joined)))
}

fn relative_to(base: &Path, path: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix(base) {
        return stripped.to_path_buf();
    }

    let base_parts: Vec<_> = base.components().collect();
    let path_parts: Vec<_> = path.components().collect();
    let common = base_parts
        .iter()
        .zip(path_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut out = PathBuf::new();
    for _ in common..base_parts.len() {
        out.push("..");
    }
    for part in &path_parts[common..] {
        out.push(part.as_os_str());
    }
    out
}
