//! The bundling engine seam.
//!
//! [`BuildRunner`](crate::BuildRunner) only knows [`BundleEngine`]. The
//! production implementation drives Rolldown; tests substitute an in-memory
//! engine.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rolldown::{
    BundleOutput, BundlerBuilder as RolldownBundlerBuilder, BundlerOptions, InputItem,
    OutputFormat, Platform, RawMinifyOptions,
};
use rolldown_common::{Output, OutputChunk};
use rustc_hash::FxHashSet;
use tracing::debug;

use crate::diagnostics::{Diagnostic, DiagnosticSeverity};
use crate::manifest::{BuildManifest, ImportedModule, OutputFile, OutputMeta};
use crate::plugins::{
    BoundaryDetectionPlugin, ExternalsPlugin, PluginRegistry, StripExportsPlugin,
    VirtualModulePlugin,
};
use crate::target::BuildTarget;
use crate::targets::{ExternalPolicy, TargetOptions};

/// A completed engine invocation.
#[derive(Debug, Clone, Default)]
pub struct EngineOutput {
    pub manifest: BuildManifest,
    /// Non-blocking diagnostics
    pub diagnostics: Vec<Diagnostic>,
}

/// Runs one bundler invocation.
///
/// `Err` carries the blocking diagnostics of a failed invocation.
#[async_trait]
pub trait BundleEngine: Send + Sync {
    async fn bundle(
        &self,
        options: &TargetOptions,
    ) -> std::result::Result<EngineOutput, Vec<Diagnostic>>;
}

/// Rolldown-backed engine.
#[derive(Debug, Clone, Default)]
pub struct RolldownEngine;

impl RolldownEngine {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl BundleEngine for RolldownEngine {
    async fn bundle(
        &self,
        options: &TargetOptions,
    ) -> std::result::Result<EngineOutput, Vec<Diagnostic>> {
        let rolldown_options = configure_rolldown_options(options);
        let plugins = configure_plugins(options).into_rolldown_plugins();

        debug!(
            "[fob-rsc] {} pass: {} entries, {} plugins",
            options.target,
            options.entries.len(),
            plugins.len()
        );

        let mut bundler = RolldownBundlerBuilder::default()
            .with_options(rolldown_options)
            .with_plugins(plugins)
            .build()
            .map_err(|e| vec![Diagnostic::from_rolldown(&e, DiagnosticSeverity::Error)])?;

        // generate() keeps output in memory; placeholders are resolved before
        // anything is written.
        let bundle = bundler
            .generate()
            .await
            .map_err(|e| vec![Diagnostic::from_rolldown(&e, DiagnosticSeverity::Error)])?;

        Ok(EngineOutput {
            manifest: manifest_from_bundle(&bundle, &options.out_dir),
            diagnostics: bundle
                .warnings
                .iter()
                .map(|w| Diagnostic::from_rolldown(w, DiagnosticSeverity::Warning))
                .collect(),
        })
    }
}

/// Map target options onto Rolldown's options.
fn configure_rolldown_options(options: &TargetOptions) -> BundlerOptions {
    let mut rolldown_options = BundlerOptions {
        input: Some(
            options
                .entries
                .iter()
                .map(|entry| InputItem {
                    name: None,
                    import: entry.to_string_lossy().into_owned(),
                })
                .collect(),
        ),
        cwd: Some(options.cwd.clone()),
        platform: Some(match options.target {
            BuildTarget::Browser => Platform::Browser,
            BuildTarget::Server => Platform::Node,
        }),
        ..Default::default()
    };

    if options.esm {
        rolldown_options.format = Some(OutputFormat::Esm);
    }
    if options.minify {
        rolldown_options.minify = Some(RawMinifyOptions::from(true));
    }
    if !options.defines.is_empty() {
        rolldown_options.define = Some(options.defines.iter().cloned().collect());
    }
    // Rolldown splits shared modules into chunks by default for multi-entry
    // ESM output; `code_splitting` needs no extra option.

    rolldown_options
}

/// Plugins for one pass, in phase order.
fn configure_plugins(options: &TargetOptions) -> PluginRegistry {
    let mut registry = PluginRegistry::new();
    registry.add(VirtualModulePlugin::new(options.target));

    if let ExternalPolicy::BareAndBuiltins { keep } = &options.externals {
        registry.add(ExternalsPlugin::new(keep.clone()));
    }
    if !options.strip_exports.is_empty() {
        registry.add(StripExportsPlugin::new(options.strip_exports.clone()));
    }
    if let Some(discovery) = &options.boundary_detection {
        registry.add(BoundaryDetectionPlugin::new(std::sync::Arc::clone(discovery)));
    }

    registry
}

/// Convert Rolldown's in-memory output into a manifest.
///
/// A chunk import naming another emitted chunk is a bundled dependency;
/// anything else is external.
pub(crate) fn manifest_from_bundle(bundle: &BundleOutput, out_dir: &Path) -> BuildManifest {
    let emitted: FxHashSet<String> = bundle
        .assets
        .iter()
        .filter_map(|output| match output {
            Output::Chunk(chunk) => Some(chunk.filename.to_string()),
            Output::Asset(_) => None,
        })
        .collect();

    let mut manifest = BuildManifest::new();
    for output in &bundle.assets {
        match output {
            Output::Chunk(chunk) => {
                let path = out_dir.join(chunk.filename.as_str());
                let meta = chunk_meta(chunk, out_dir, &emitted);
                manifest.push_chunk(OutputFile::text(path, chunk.code.clone()), meta);
            }
            Output::Asset(asset) => {
                let path = out_dir.join(asset.filename.as_str());
                let bytes = asset.source.as_bytes();
                let file = match std::str::from_utf8(bytes) {
                    Ok(text) => OutputFile::text(path, text),
                    Err(_) => OutputFile::binary(path, bytes.to_vec()),
                };
                manifest.push_asset(file);
            }
        }
    }
    manifest
}

fn chunk_meta(chunk: &OutputChunk, out_dir: &Path, emitted: &FxHashSet<String>) -> OutputMeta {
    let import_edge = |specifier: String, static_import: bool| {
        if emitted.contains(&specifier) {
            ImportedModule {
                path: out_dir.join(&specifier),
                external: false,
                static_import,
            }
        } else {
            ImportedModule {
                path: PathBuf::from(specifier),
                external: true,
                static_import,
            }
        }
    };

    let imported_modules = chunk
        .imports
        .iter()
        .map(|s| import_edge(s.to_string(), true))
        .chain(
            chunk
                .dynamic_imports
                .iter()
                .map(|s| import_edge(s.to_string(), false)),
        )
        .collect();

    OutputMeta {
        is_entry_point: chunk.is_entry,
        entry_point: chunk
            .facade_module_id
            .as_ref()
            .map(|id| PathBuf::from(id.to_string())),
        input_modules: chunk
            .modules
            .keys
            .iter()
            .map(|id| PathBuf::from(id.to_string()))
            .collect(),
        exported_names: chunk.exports.iter().map(|name| name.to_string()).collect(),
        imported_modules,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuildConfig;
    use crate::discovery::DiscoveryContext;
    use crate::targets::{browser_options, server_options};
    use crate::plugins::PluginPhase;
    use std::sync::Arc;

    #[test]
    fn test_browser_plugins() {
        let config = BuildConfig::new("/app");
        let registry = configure_plugins(&browser_options(&config, None));
        assert_eq!(registry.ordered_phases(), vec![PluginPhase::Virtual]);
    }

    #[test]
    fn test_server_split_plugins() {
        let config = BuildConfig::new("/app")
            .split_mode(true)
            .server_strip_exports(["clientOnly"]);
        let discovery = Arc::new(DiscoveryContext::new());
        let registry = configure_plugins(&server_options(&config, Some(&discovery)).unwrap());
        assert_eq!(
            registry.ordered_phases(),
            vec![
                PluginPhase::Virtual,
                PluginPhase::Resolve,
                PluginPhase::Transform,
                PluginPhase::Transform,
            ]
        );
    }

    #[test]
    fn test_rolldown_options_for_browser() {
        let config = BuildConfig::new("/app");
        let opts = configure_rolldown_options(&browser_options(&config, None));
        assert!(matches!(opts.format, Some(OutputFormat::Esm)));
        assert!(matches!(opts.platform, Some(Platform::Browser)));
        assert!(opts.minify.is_some());
        assert_eq!(opts.input.as_ref().map(|i| i.len()), Some(1));
    }

    #[test]
    fn test_rolldown_options_for_server() {
        let config = BuildConfig::new("/app");
        let opts = configure_rolldown_options(&server_options(&config, None).unwrap());
        assert!(matches!(opts.platform, Some(Platform::Node)));
        assert!(opts.minify.is_none());
    }
}
