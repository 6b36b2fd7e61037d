// Built-in loaders, usable from any rule by name

use crate::core::interfaces::{Loader, LoaderContext};
use anyhow::{anyhow, Context};
use regex::Regex;

/// Turns a JSON document into a CommonJS module exporting it
pub struct JsonLoader;

impl Loader for JsonLoader {
    fn name(&self) -> &str {
        "json-loader"
    }

    fn run(&self, source: String, context: &LoaderContext) -> anyhow::Result<String> {
        let value: serde_json::Value = serde_json::from_str(&source)
            .with_context(|| format!("{} is not valid JSON", context.resource_path.display()))?;
        Ok(format!("module.exports = {};", serde_json::to_string(&value)?))
    }
}

/// Regex search and replace configured through rule options
///
/// ```json
/// { "test": "\\.js$", "use": { "loader": "replace-loader", "options": { "search": "__VERSION__", "replace": "1.0.0" } } }
/// ```
pub struct ReplaceLoader;

impl Loader for ReplaceLoader {
    fn name(&self) -> &str {
        "replace-loader"
    }

    fn run(&self, source: String, context: &LoaderContext) -> anyhow::Result<String> {
        let search = context
            .options
            .get("search")
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow!("replace-loader needs a string `search` option"))?;
        let replace = context
            .options
            .get("replace")
            .and_then(|v| v.as_str())
            .unwrap_or("");

        let re = Regex::new(search)
            .with_context(|| format!("Invalid regex pattern in replace-loader: {}", search))?;
        Ok(re.replace_all(&source, replace).into_owned())
    }
}
