use crate::core::interfaces::FileSystemService;
use crate::utils::{Result, TinypackError};
use std::fs;
use std::path::Path;

pub struct StdFileSystem;

impl FileSystemService for StdFileSystem {
    fn read_file(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).map_err(|source| TinypackError::ModuleRead {
            path: path.to_path_buf(),
            source,
        })
    }

    fn write_file(&self, path: &Path, content: &str) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            self.create_directory(parent)?;
        }

        fs::write(path, content).map_err(|source| TinypackError::EmitWrite {
            path: path.to_path_buf(),
            source,
        })
    }

    fn create_directory(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).map_err(|source| TinypackError::EmitWrite {
            path: path.to_path_buf(),
            source,
        })
    }

    fn file_exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}
