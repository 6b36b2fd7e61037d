use crate::core::{interfaces::FileSystemService, models::ModuleTable};
use crate::infrastructure::processors::RUNTIME_REQUIRE;
use crate::utils::{Logger, Result, TinypackError};
use minijinja::{context, AutoEscape, Environment};
use once_cell::sync::OnceCell;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

const BUNDLE_TEMPLATE_NAME: &str = "bundle.js";
const BUNDLE_TEMPLATE: &str = include_str!("../../templates/bundle.js.j2");

static TEMPLATES: OnceCell<Environment<'static>> = OnceCell::new();

fn templates() -> Result<&'static Environment<'static>> {
    TEMPLATES.get_or_try_init(|| {
        let mut env = Environment::new();
        // Module sources are JavaScript, never escape them
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.add_template(BUNDLE_TEMPLATE_NAME, BUNDLE_TEMPLATE)?;
        Ok::<_, TinypackError>(env)
    })
}

#[derive(Serialize)]
struct ModuleEntry<'m> {
    id: &'m str,
    source: &'m str,
}

/// Renders the module table into the bundle template and writes it out
pub struct BundleEmitter {
    fs_service: Arc<dyn FileSystemService>,
}

impl BundleEmitter {
    pub fn new(fs_service: Arc<dyn FileSystemService>) -> Self {
        Self { fs_service }
    }

    /// Render the bundle text for `entry` and `modules`
    pub fn render(&self, entry: &str, modules: &ModuleTable) -> Result<String> {
        let entries: Vec<ModuleEntry<'_>> = modules
            .iter()
            .map(|(id, source)| ModuleEntry { id, source })
            .collect();

        let template = templates()?.get_template(BUNDLE_TEMPLATE_NAME)?;
        let rendered = template.render(context! {
            entry => entry,
            runtime => RUNTIME_REQUIRE,
            modules => entries,
        })?;
        Ok(rendered)
    }

    /// Render and write the bundle to `output_path`.
    ///
    /// A write failure is logged and reported as `Ok(false)`; the module
    /// table is already complete at this point so the run carries on.
    pub fn emit(&self, entry: &str, modules: &ModuleTable, output_path: &Path) -> Result<bool> {
        let bundle = self.render(entry, modules)?;

        match self.fs_service.write_file(output_path, &bundle) {
            Ok(()) => Ok(true),
            Err(err @ TinypackError::EmitWrite { .. }) => {
                Logger::error(&err.to_string());
                Ok(false)
            }
            Err(TinypackError::Io(source)) => {
                Logger::error(
                    &TinypackError::EmitWrite {
                        path: output_path.to_path_buf(),
                        source,
                    }
                    .to_string(),
                );
                Ok(false)
            }
            Err(other) => Err(other),
        }
    }
}
