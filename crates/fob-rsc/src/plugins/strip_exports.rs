//! Per-target export stripping.
//!
//! Removes `export function|class|const|let|var` declarations whose declared
//! names are all in the configured list, e.g. data loaders that must never
//! reach the browser bundle. Imports only those declarations used are left
//! for tree-shaking to drop.

use oxc_allocator::Allocator;
use oxc_ast::ast::{BindingPatternKind, Declaration, ModuleDeclaration};
use oxc_parser::Parser;
use oxc_span::SourceType;
use rolldown_plugin::{
    HookTransformArgs, HookTransformOutput, HookTransformReturn, HookUsage, Plugin,
    SharedTransformPluginContext,
};
use std::borrow::Cow;
use std::sync::Arc;
use tracing::debug;

use crate::plugins::is_script_module;
use crate::plugins::registry::{PluginPhase, RscPlugin};

#[derive(Debug, Clone)]
pub struct StripExportsPlugin {
    names: Arc<Vec<String>>,
}

impl StripExportsPlugin {
    pub fn new(names: Vec<String>) -> Self {
        Self {
            names: Arc::new(names),
        }
    }
}

/// Strip the named export declarations from `code`.
///
/// Returns `None` when nothing was removed or the source does not parse.
pub fn strip_exports(code: &str, source_type: SourceType, names: &[String]) -> Option<String> {
    let allocator = Allocator::default();
    let parsed = Parser::new(&allocator, code, source_type).parse();
    if !parsed.errors.is_empty() {
        return None;
    }

    let mut removals: Vec<(usize, usize)> = Vec::new();
    for stmt in parsed.program.body.iter() {
        let Some(ModuleDeclaration::ExportNamedDeclaration(named)) = stmt.as_module_declaration()
        else {
            continue;
        };
        let Some(decl) = &named.declaration else {
            continue;
        };

        let declared: Vec<&str> = match decl {
            Declaration::FunctionDeclaration(func) => {
                func.id.iter().map(|id| id.name.as_str()).collect()
            }
            Declaration::ClassDeclaration(class) => {
                class.id.iter().map(|id| id.name.as_str()).collect()
            }
            Declaration::VariableDeclaration(var) => {
                let idents: Vec<&str> = var
                    .declarations
                    .iter()
                    .filter_map(|d| match &d.id.kind {
                        BindingPatternKind::BindingIdentifier(ident) => Some(ident.name.as_str()),
                        _ => None,
                    })
                    .collect();
                // Destructuring patterns are left alone
                if idents.len() != var.declarations.len() {
                    continue;
                }
                idents
            }
            _ => continue,
        };

        if !declared.is_empty() && declared.iter().all(|n| names.iter().any(|name| name == n)) {
            removals.push((named.span.start as usize, named.span.end as usize));
        }
    }

    if removals.is_empty() {
        return None;
    }

    let mut out = code.to_string();
    for (start, end) in removals.into_iter().rev() {
        out.replace_range(start..end, "");
    }
    Some(out)
}

impl Plugin for StripExportsPlugin {
    fn name(&self) -> Cow<'static, str> {
        "fob-rsc-strip-exports".into()
    }

    fn register_hook_usage(&self) -> HookUsage {
        HookUsage::Transform
    }

    fn transform(
        &self,
        _ctx: SharedTransformPluginContext,
        args: &HookTransformArgs<'_>,
    ) -> impl std::future::Future<Output = HookTransformReturn> + Send {
        let id = args.id.to_string();
        let stripped = if is_script_module(&id) {
            SourceType::from_path(&id)
                .ok()
                .and_then(|source_type| strip_exports(args.code, source_type, &self.names))
        } else {
            None
        };

        async move {
            Ok(stripped.map(|code| {
                debug!("[fob-rsc] stripped exports from {}", id);
                HookTransformOutput {
                    code: Some(code),
                    map: None,
                    side_effects: None,
                    module_type: None,
                }
            }))
        }
    }
}

impl RscPlugin for StripExportsPlugin {
    fn phase(&self) -> PluginPhase {
        PluginPhase::Transform
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn js() -> SourceType {
        SourceType::mjs()
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_strips_named_function() {
        let code = "export function loader() { return db(); }\nexport function Page() {}\n";
        let out = strip_exports(code, js(), &names(&["loader"])).unwrap();
        assert!(!out.contains("loader"));
        assert!(out.contains("export function Page() {}"));
    }

    #[test]
    fn test_strips_const_and_class() {
        let code = "export const config = { runtime: 'edge' };\nexport class Store {}\nexport const keep = 1;\n";
        let out = strip_exports(code, js(), &names(&["config", "Store"])).unwrap();
        assert!(!out.contains("config"));
        assert!(!out.contains("Store"));
        assert!(out.contains("export const keep = 1;"));
    }

    #[test]
    fn test_partial_multi_declaration_kept() {
        let code = "export const a = 1, b = 2;\n";
        assert!(strip_exports(code, js(), &names(&["a"])).is_none());
        assert!(strip_exports(code, js(), &names(&["a", "b"])).is_some());
    }

    #[test]
    fn test_nothing_to_strip() {
        let code = "export default function App() {}\n";
        assert!(strip_exports(code, js(), &names(&["loader"])).is_none());
    }

    #[test]
    fn test_parse_error_leaves_source() {
        assert!(strip_exports("export function (", js(), &names(&["x"])).is_none());
    }
}
