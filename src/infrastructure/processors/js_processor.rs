use crate::core::{interfaces::JsProcessor, models::ProcessedModule};
use crate::utils::{paths, ErrorContext, Result, TinypackError};
use oxc_allocator::Allocator;
use oxc_ast::ast::{Argument, CallExpression, Expression};
use oxc_ast_visit::{walk_mut, VisitMut};
use oxc_codegen::Codegen;
use oxc_parser::Parser;
use oxc_span::{Atom, SourceType};
use std::path::Path;

/// Callee name marking a module import in source code
pub const IMPORT_IDENT: &str = "require";

/// Function the bundle shell defines to look modules up by key
pub const RUNTIME_REQUIRE: &str = "__tinypack_require__";

/// Parses a module with oxc, rewrites its imports and prints it back
pub struct OxcJsProcessor {
    source_root: String,
}

impl OxcJsProcessor {
    pub fn new(source_root: impl Into<String>) -> Self {
        Self {
            source_root: source_root.into(),
        }
    }
}

impl Default for OxcJsProcessor {
    fn default() -> Self {
        Self::new("src")
    }
}

impl JsProcessor for OxcJsProcessor {
    fn process_module(&self, source: &str, path: &Path) -> Result<ProcessedModule> {
        let allocator = Allocator::default();
        let source_type = SourceType::from_path(path).unwrap_or_default();

        let parser = Parser::new(&allocator, source, source_type);
        let result = parser.parse();

        if result.panicked || !result.errors.is_empty() {
            let errors: Vec<String> = result.errors.iter().map(|e| e.to_string()).collect();
            let message = if errors.is_empty() {
                format!("failed to parse {}", path.display())
            } else {
                errors.join("\n")
            };
            // Point at the first labeled span when the parser gave one
            let offset = result
                .errors
                .first()
                .and_then(|error| error.labels.as_ref())
                .and_then(|labels| labels.first())
                .map(|label| label.offset());
            let context = match offset {
                Some(offset) => ErrorContext::at_offset(path.to_path_buf(), source, offset),
                None => ErrorContext::new().with_file(path.to_path_buf()),
            };
            return Err(TinypackError::parse_with_context(message, context));
        }

        let mut program = result.program;
        let mut rewriter = ImportRewriter::new(&allocator, &self.source_root);
        rewriter.visit_program(&mut program);

        if let Some(offset) = rewriter.unsupported.first() {
            return Err(TinypackError::UnsupportedImport {
                message: format!(
                    "`{}` needs a string literal argument ({} unsupported call(s))",
                    IMPORT_IDENT,
                    rewriter.unsupported.len()
                ),
                context: Some(ErrorContext::at_offset(
                    path.to_path_buf(),
                    source,
                    *offset as usize,
                )),
            });
        }

        let dependencies = rewriter.dependencies;
        let code = Codegen::new().build(&program).code;

        Ok(ProcessedModule { code, dependencies })
    }
}

/// Renames `require(...)` calls to the runtime lookup and maps their
/// argument to a bundle key, recording each key in source order
struct ImportRewriter<'a, 's> {
    allocator: &'a Allocator,
    source_root: &'s str,
    dependencies: Vec<String>,
    /// Span starts of import calls without a string literal argument
    unsupported: Vec<u32>,
}

impl<'a, 's> ImportRewriter<'a, 's> {
    fn new(allocator: &'a Allocator, source_root: &'s str) -> Self {
        Self {
            allocator,
            source_root,
            dependencies: Vec::new(),
            unsupported: Vec::new(),
        }
    }
}

impl<'a> VisitMut<'a> for ImportRewriter<'a, '_> {
    fn visit_call_expression(&mut self, call: &mut CallExpression<'a>) {
        if let Expression::Identifier(callee) = &mut call.callee {
            if callee.name.as_str() == IMPORT_IDENT {
                callee.name = Atom::from(RUNTIME_REQUIRE);

                match call.arguments.first_mut() {
                    Some(Argument::StringLiteral(literal)) => {
                        let key = paths::dependency_key(self.source_root, literal.value.as_str());
                        literal.value = Atom::from(&*self.allocator.alloc_str(&key));
                        literal.raw = None;
                        self.dependencies.push(key);
                    }
                    _ => self.unsupported.push(call.span.start),
                }
            }
        }

        // Arguments may hold further imports, e.g. require(require("./a.js").name)
        walk_mut::walk_call_expression(self, call);
    }
}
