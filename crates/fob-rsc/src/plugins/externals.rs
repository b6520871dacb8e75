//! Server-side externalisation.
//!
//! The server bundle runs under Node with `node_modules` available, so bare
//! specifiers and Node built-ins are left as imports and treated as
//! side-effect-free. Reserved virtual specifiers look bare but must stay
//! internal; they are listed in `keep` and also claimed earlier by the
//! virtual-module plugin.

use rolldown_common::ResolvedExternal;
use rolldown_common::side_effects::HookSideEffects;
use rolldown_plugin::{
    HookResolveIdArgs, HookResolveIdOutput, HookResolveIdReturn, HookUsage, Plugin, PluginContext,
};
use std::borrow::Cow;
use std::path::Path;

use crate::plugins::registry::{PluginPhase, RscPlugin};
use crate::target::is_node_builtin;

#[derive(Debug, Clone)]
pub struct ExternalsPlugin {
    keep: Vec<&'static str>,
}

impl ExternalsPlugin {
    pub fn new(keep: Vec<&'static str>) -> Self {
        Self { keep }
    }

    /// Whether `specifier` stays out of the bundle.
    pub fn is_external(&self, specifier: &str) -> bool {
        if self.keep.contains(&specifier) {
            return false;
        }
        is_node_builtin(specifier) || is_bare_specifier(specifier)
    }
}

/// Neither relative, absolute, nor a virtual id.
fn is_bare_specifier(specifier: &str) -> bool {
    !specifier.is_empty()
        && !specifier.starts_with('.')
        && !specifier.starts_with('/')
        && !specifier.starts_with('\0')
        && !Path::new(specifier).is_absolute()
}

impl Plugin for ExternalsPlugin {
    fn name(&self) -> Cow<'static, str> {
        "fob-rsc-externals".into()
    }

    fn register_hook_usage(&self) -> HookUsage {
        HookUsage::ResolveId
    }

    fn resolve_id(
        &self,
        _ctx: &PluginContext,
        args: &HookResolveIdArgs,
    ) -> impl std::future::Future<Output = HookResolveIdReturn> + Send {
        let external = self
            .is_external(args.specifier)
            .then(|| args.specifier.to_string());

        async move {
            Ok(external.map(|id| HookResolveIdOutput {
                id: id.into(),
                external: Some(ResolvedExternal::Bool(true)),
                side_effects: Some(HookSideEffects::False),
                ..Default::default()
            }))
        }
    }
}

impl RscPlugin for ExternalsPlugin {
    fn phase(&self) -> PluginPhase {
        PluginPhase::Resolve
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::RESERVED_SPECIFIERS;

    #[test]
    fn test_bare_and_builtins_external() {
        let plugin = ExternalsPlugin::new(RESERVED_SPECIFIERS.to_vec());
        assert!(plugin.is_external("react"));
        assert!(plugin.is_external("react-dom/server"));
        assert!(plugin.is_external("@scope/pkg"));
        assert!(plugin.is_external("fs"));
        assert!(plugin.is_external("node:path"));
    }

    #[test]
    fn test_relative_and_absolute_internal() {
        let plugin = ExternalsPlugin::new(vec![]);
        assert!(!plugin.is_external("./App.js"));
        assert!(!plugin.is_external("../lib/util"));
        assert!(!plugin.is_external("/app/src/index.js"));
        assert!(!plugin.is_external("\0@fob/build-target"));
    }

    #[test]
    fn test_reserved_specifiers_kept() {
        let plugin = ExternalsPlugin::new(RESERVED_SPECIFIERS.to_vec());
        for specifier in RESERVED_SPECIFIERS {
            assert!(!plugin.is_external(specifier), "{specifier} must stay internal");
        }
        assert!(plugin.is_external("@fob/something-else"));
    }
}
