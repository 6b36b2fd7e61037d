use std::path::PathBuf;
use thiserror::Error;

use crate::core::hooks::HookName;

/// Enhanced error with file location context
#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub file_path: Option<PathBuf>,
    pub line: Option<usize>,
    pub column: Option<usize>,
    pub code_snippet: Option<String>,
    /// File line number of the snippet's first line
    pub snippet_start: Option<usize>,
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            file_path: None,
            line: None,
            column: None,
            code_snippet: None,
            snippet_start: None,
        }
    }

    pub fn with_file(mut self, path: PathBuf) -> Self {
        self.file_path = Some(path);
        self
    }

    pub fn with_location(mut self, line: usize, column: usize) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }

    pub fn with_snippet(mut self, snippet: String) -> Self {
        self.code_snippet = Some(snippet);
        self
    }

    pub fn with_snippet_start(mut self, line: usize) -> Self {
        self.snippet_start = Some(line);
        self
    }

    /// Build a context pointing at a byte offset inside `source`.
    ///
    /// `line` is the file line of the offset. The snippet holds that line
    /// and up to two lines before it.
    pub fn at_offset(path: PathBuf, source: &str, offset: usize) -> Self {
        let offset = offset.min(source.len());
        let before = &source[..offset];
        let line = before.matches('\n').count() + 1;
        let column = offset - before.rfind('\n').map(|i| i + 1).unwrap_or(0) + 1;

        let first = line.saturating_sub(2).max(1);
        let snippet = source
            .lines()
            .skip(first - 1)
            .take(line - first + 1)
            .collect::<Vec<_>>()
            .join("\n");

        Self::new()
            .with_file(path)
            .with_location(line, column)
            .with_snippet(snippet)
            .with_snippet_start(first)
    }
}

#[derive(Error, Debug)]
pub enum TinypackError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown hook: {0}")]
    UnknownHook(String),

    #[error("Cannot read module {}: {source}", path.display())]
    ModuleRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot resolve loader '{loader}' (looked for {})", path.display())]
    LoaderResolution { loader: String, path: PathBuf },

    #[error("Loader '{loader}' failed on {}: {source}", module.display())]
    LoaderExecution {
        loader: String,
        module: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("Parse error: {message}")]
    Parse {
        message: String,
        context: Option<ErrorContext>,
    },

    #[error("Unsupported import: {message}")]
    UnsupportedImport {
        message: String,
        context: Option<ErrorContext>,
    },

    #[error("Plugin '{plugin}' failed in hook '{hook}': {source}")]
    HookInvocation {
        hook: HookName,
        plugin: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Cannot write bundle {}: {source}", path.display())]
    EmitWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),
}

impl TinypackError {
    /// Create a parse error with context
    pub fn parse_with_context(message: String, context: ErrorContext) -> Self {
        Self::Parse {
            message,
            context: Some(context),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Format error with enhanced context display
    pub fn format_detailed(&self) -> String {
        match self {
            TinypackError::Parse { message, context } => {
                self.format_error_with_context("Parse Error", message, context)
            }
            TinypackError::UnsupportedImport { message, context } => {
                self.format_error_with_context("Import Error", message, context)
            }
            _ => self.to_string(),
        }
    }

    fn format_error_with_context(
        &self,
        error_type: &str,
        message: &str,
        context: &Option<ErrorContext>,
    ) -> String {
        let mut output = format!("❌ {}: {}", error_type, message);

        if let Some(ctx) = context {
            if let Some(ref file_path) = ctx.file_path {
                output.push_str(&format!("\n📁 File: {}", file_path.display()));
            }

            if let (Some(line), Some(column)) = (ctx.line, ctx.column) {
                output.push_str(&format!("\n📍 Location: line {}, column {}", line, column));
            }

            if let Some(ref snippet) = ctx.code_snippet {
                output.push_str(&format!(
                    "\n📝 Code:\n{}",
                    self.format_code_snippet(snippet, ctx.snippet_start.unwrap_or(1), ctx.line)
                ));
            }
        }

        output
    }

    fn format_code_snippet(&self, snippet: &str, first_line: usize, error_line: Option<usize>) -> String {
        let lines: Vec<&str> = snippet.lines().collect();
        let mut output = String::new();

        for (i, line) in lines.iter().enumerate() {
            let line_num = first_line + i;
            let is_error_line = error_line == Some(line_num);

            if is_error_line {
                output.push_str(&format!("→ {:3} │ {}\n", line_num, line));
                output.push_str(&format!("     │ {}\n", "^^^".repeat(line.len().min(20))));
            } else {
                output.push_str(&format!("  {:3} │ {}\n", line_num, line));
            }
        }

        output
    }
}

pub type Result<T> = std::result::Result<T, TinypackError>;

impl From<regex::Error> for TinypackError {
    fn from(err: regex::Error) -> Self {
        TinypackError::config(format!("Invalid rule pattern: {}", err))
    }
}

impl From<serde_json::Error> for TinypackError {
    fn from(err: serde_json::Error) -> Self {
        TinypackError::config(format!("Invalid configuration: {}", err))
    }
}
