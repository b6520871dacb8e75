//! Reserved virtual modules.
//!
//! `@fob/build-target` is resolved to real content at bundle time: a module
//! whose default export is the target name, so shared source can branch on it
//! without probing the environment. `@fob/client-entry` and
//! `@fob/webpack-chunk-map` depend on the finished browser pass, so they are
//! bundled around placeholder tokens that `OutputWriter` replaces later.

use rolldown_common::{ModuleType, ResolvedExternal};
use rolldown_plugin::{
    HookLoadArgs, HookLoadOutput, HookLoadReturn, HookResolveIdArgs, HookResolveIdOutput,
    HookResolveIdReturn, HookUsage, Plugin, PluginContext,
};
use std::borrow::Cow;

use crate::placeholder::Placeholder;
use crate::plugins::registry::{PluginPhase, RscPlugin};
use crate::target::BuildTarget;

pub const BUILD_TARGET_SPECIFIER: &str = "@fob/build-target";
pub const CLIENT_ENTRY_SPECIFIER: &str = "@fob/client-entry";
pub const CHUNK_MAP_SPECIFIER: &str = "@fob/webpack-chunk-map";

/// Specifiers that must never be externalised.
pub const RESERVED_SPECIFIERS: [&str; 3] = [
    BUILD_TARGET_SPECIFIER,
    CLIENT_ENTRY_SPECIFIER,
    CHUNK_MAP_SPECIFIER,
];

/// Resolved ids get the conventional `\0` prefix so no other plugin or the
/// filesystem loader touches them.
const VIRTUAL_PREFIX: &str = "\0";

/// Synthetic module kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VirtualModule {
    BuildTarget,
    ClientEntry,
    ChunkMap,
}

impl VirtualModule {
    /// Module source for `target`.
    pub fn source(&self, target: BuildTarget) -> String {
        match self {
            VirtualModule::BuildTarget => format!("export default \"{}\";\n", target.as_str()),
            // Both placeholders are replaced by string literals.
            VirtualModule::ClientEntry => {
                format!("export default {};\n", Placeholder::ClientEntry.token())
            }
            VirtualModule::ChunkMap => format!(
                "export default JSON.parse({});\n",
                Placeholder::ChunkMap.token()
            ),
        }
    }
}

/// Serves the reserved specifiers. Rules are checked in order; first match wins.
#[derive(Debug, Clone)]
pub struct VirtualModulePlugin {
    target: BuildTarget,
    rules: Vec<(&'static str, VirtualModule)>,
}

impl VirtualModulePlugin {
    pub fn new(target: BuildTarget) -> Self {
        Self {
            target,
            rules: vec![
                (BUILD_TARGET_SPECIFIER, VirtualModule::BuildTarget),
                (CLIENT_ENTRY_SPECIFIER, VirtualModule::ClientEntry),
                (CHUNK_MAP_SPECIFIER, VirtualModule::ChunkMap),
            ],
        }
    }

    /// Rule matching an import specifier.
    pub fn match_specifier(&self, specifier: &str) -> Option<VirtualModule> {
        self.rules
            .iter()
            .find(|(reserved, _)| *reserved == specifier)
            .map(|(_, module)| *module)
    }

    /// Resolved id for a matched specifier.
    pub fn resolved_id(specifier: &str) -> String {
        format!("{VIRTUAL_PREFIX}{specifier}")
    }

    /// Source for a resolved id, if it is one of ours.
    pub fn load_source(&self, id: &str) -> Option<String> {
        id.strip_prefix(VIRTUAL_PREFIX)
            .and_then(|specifier| self.match_specifier(specifier))
            .map(|module| module.source(self.target))
    }
}

impl Plugin for VirtualModulePlugin {
    fn name(&self) -> Cow<'static, str> {
        "fob-rsc-virtual".into()
    }

    fn register_hook_usage(&self) -> HookUsage {
        HookUsage::ResolveId | HookUsage::Load
    }

    fn resolve_id(
        &self,
        _ctx: &PluginContext,
        args: &HookResolveIdArgs,
    ) -> impl std::future::Future<Output = HookResolveIdReturn> + Send {
        let matched = self
            .match_specifier(args.specifier)
            .map(|_| Self::resolved_id(args.specifier));

        async move {
            Ok(matched.map(|id| HookResolveIdOutput {
                id: id.into(),
                external: Some(ResolvedExternal::Bool(false)),
                ..Default::default()
            }))
        }
    }

    fn load(
        &self,
        _ctx: &PluginContext,
        args: &HookLoadArgs<'_>,
    ) -> impl std::future::Future<Output = HookLoadReturn> + Send {
        let source = self.load_source(args.id);

        async move {
            Ok(source.map(|code| HookLoadOutput {
                code: code.into(),
                module_type: Some(ModuleType::Js),
                ..Default::default()
            }))
        }
    }
}

impl RscPlugin for VirtualModulePlugin {
    fn phase(&self) -> PluginPhase {
        PluginPhase::Virtual
    }
}
