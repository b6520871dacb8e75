//! Server/client boundary detection.
//!
//! Runs on the server pass in split mode only. Every module the detector
//! accepts is recorded in the shared [`DiscoveryContext`]; the browser pass
//! later bundles each of them as its own entry point.

use anyhow::Context;
use oxc_allocator::Allocator;
use oxc_parser::Parser;
use oxc_span::SourceType;
use rolldown_plugin::{
    HookTransformArgs, HookTransformReturn, HookUsage, Plugin, SharedTransformPluginContext,
};
use std::borrow::Cow;
use std::path::PathBuf;
use std::sync::Arc;

use crate::discovery::DiscoveryContext;
use crate::plugins::is_script_module;
use crate::plugins::registry::{PluginPhase, RscPlugin};

/// Decides whether a module is a server/client boundary.
pub trait BoundaryDetector: std::fmt::Debug + Send + Sync {
    fn is_boundary(&self, id: &str, code: &str) -> bool;
}

/// Modules whose directive prologue contains `"use client"`.
#[derive(Debug, Default, Clone, Copy)]
pub struct UseClientDetector;

const USE_CLIENT: &str = "use client";

impl BoundaryDetector for UseClientDetector {
    fn is_boundary(&self, id: &str, code: &str) -> bool {
        if !code.contains(USE_CLIENT) {
            return false;
        }

        let source_type = SourceType::from_path(id).unwrap_or_default();
        let allocator = Allocator::default();
        let parsed = Parser::new(&allocator, code, source_type).parse();

        if parsed.errors.is_empty() {
            parsed
                .program
                .directives
                .iter()
                .any(|directive| directive.directive.as_str() == USE_CLIENT)
        } else {
            prologue_has_use_client(code)
        }
    }
}

/// Textual fallback for sources the parser rejects.
fn prologue_has_use_client(code: &str) -> bool {
    code.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("//"))
        .take_while(|line| line.starts_with('"') || line.starts_with('\''))
        .any(|line| {
            let line = line.trim_end_matches(';');
            line == "\"use client\"" || line == "'use client'"
        })
}

/// Records boundary modules seen during the server pass.
#[derive(Debug, Clone)]
pub struct BoundaryDetectionPlugin {
    discovery: Arc<DiscoveryContext>,
    detector: Arc<dyn BoundaryDetector>,
}

impl BoundaryDetectionPlugin {
    pub fn new(discovery: Arc<DiscoveryContext>) -> Self {
        Self::with_detector(discovery, Arc::new(UseClientDetector))
    }

    pub fn with_detector(
        discovery: Arc<DiscoveryContext>,
        detector: Arc<dyn BoundaryDetector>,
    ) -> Self {
        Self {
            discovery,
            detector,
        }
    }
}

impl Plugin for BoundaryDetectionPlugin {
    fn name(&self) -> Cow<'static, str> {
        "fob-rsc-boundary".into()
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
        let is_boundary = is_script_module(&id) && self.detector.is_boundary(&id, args.code);
        let discovery = Arc::clone(&self.discovery);

        async move {
            if is_boundary {
                discovery
                    .record(PathBuf::from(&id))
                    .with_context(|| format!("recording boundary module {id}"))?;
            }
            // Observation only; the module is left untouched.
            Ok(None)
        }
    }
}

impl RscPlugin for BoundaryDetectionPlugin {
    fn phase(&self) -> PluginPhase {
        PluginPhase::Transform
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_double_quoted_directive() {
        let code = "\"use client\";\nexport default function Counter() { return 1; }\n";
        assert!(UseClientDetector.is_boundary("/app/src/Counter.js", code));
    }

    #[test]
    fn test_detects_single_quoted_directive_in_tsx() {
        let code = "'use client'\nexport const Button = (): JSX.Element => <button />;\n";
        assert!(UseClientDetector.is_boundary("/app/src/Button.tsx", code));
    }

    #[test]
    fn test_ignores_directive_outside_prologue() {
        let code = "import x from './x.js';\n\"use client\";\nexport default x;\n";
        assert!(!UseClientDetector.is_boundary("/app/src/a.js", code));

        let code = "export const label = \"use client\";\n";
        assert!(!UseClientDetector.is_boundary("/app/src/b.js", code));
    }

    #[test]
    fn test_fallback_prologue_scan() {
        assert!(prologue_has_use_client("// header\n\"use strict\";\n'use client';\n"));
        assert!(!prologue_has_use_client("const a = 1;\n\"use client\";\n"));
    }
}
