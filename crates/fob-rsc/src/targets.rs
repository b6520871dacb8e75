//! Per-target bundler invocation options.
//!
//! These builders are pure: they read the configuration and, for the browser
//! target, the discovery context's contents at call time. Turning the options
//! into Rolldown options and plugins is the engine's job.

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::BuildConfig;
use crate::discovery::DiscoveryContext;
use crate::plugins::virtual_module::RESERVED_SPECIFIERS;
use crate::target::BuildTarget;
use crate::{Error, Result};

/// Which imports the engine leaves out of the bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExternalPolicy {
    /// Bundle everything
    None,
    /// Bare specifiers and host built-ins stay external and side-effect-free,
    /// except the listed specifiers
    BareAndBuiltins { keep: Vec<&'static str> },
}

/// Options for one bundler invocation.
#[derive(Debug, Clone)]
pub struct TargetOptions {
    pub target: BuildTarget,
    pub cwd: PathBuf,
    /// Absolute entry modules; the configured entry always comes first
    pub entries: Vec<PathBuf>,
    pub out_dir: PathBuf,
    /// Compile-time replacements (`process.env.NODE_ENV`, ...)
    pub defines: Vec<(String, String)>,
    pub minify: bool,
    pub code_splitting: bool,
    pub esm: bool,
    /// Ask the engine for chunk metadata
    pub manifest: bool,
    /// Let the engine write files itself; always `false` here, output stays
    /// in memory until placeholders are resolved
    pub write: bool,
    pub externals: ExternalPolicy,
    pub strip_exports: Vec<String>,
    /// Present only for the server pass in split mode
    pub boundary_detection: Option<Arc<DiscoveryContext>>,
}

impl TargetOptions {
    /// The configured (first) entry module.
    pub fn primary_entry(&self) -> Option<&PathBuf> {
        self.entries.first()
    }
}

fn production_defines() -> Vec<(String, String)> {
    vec![
        ("process.env.NODE_ENV".to_string(), "\"production\"".to_string()),
        ("import.meta.env.PROD".to_string(), "true".to_string()),
        ("import.meta.env.DEV".to_string(), "false".to_string()),
    ]
}

/// Browser pass options.
///
/// Entry points are the configured entry plus every path in `discovery` at
/// call time. Outside split mode pass `None`: the context is never read.
pub fn browser_options(config: &BuildConfig, discovery: Option<&DiscoveryContext>) -> TargetOptions {
    let mut entries = vec![config.browser_entry_path()];
    if let Some(discovery) = discovery {
        for path in discovery.snapshot() {
            if !entries.contains(&path) {
                entries.push(path);
            }
        }
    }

    TargetOptions {
        target: BuildTarget::Browser,
        cwd: config.cwd.clone(),
        entries,
        out_dir: config.browser_out_path(),
        defines: production_defines(),
        minify: true,
        code_splitting: true,
        esm: true,
        manifest: true,
        write: false,
        externals: ExternalPolicy::None,
        strip_exports: config.browser.strip_exports.clone(),
        boundary_detection: None,
    }
}

/// Server pass options.
///
/// In split mode the boundary-detection transform is registered against
/// `discovery`; requesting split mode without one is a wiring error.
pub fn server_options(
    config: &BuildConfig,
    discovery: Option<&Arc<DiscoveryContext>>,
) -> Result<TargetOptions> {
    let boundary_detection = if config.split_mode {
        let discovery = discovery.ok_or_else(|| {
            Error::Configuration(
                "split mode requires a discovery context for the server pass".to_string(),
            )
        })?;
        Some(Arc::clone(discovery))
    } else {
        None
    };

    Ok(TargetOptions {
        target: BuildTarget::Server,
        cwd: config.cwd.clone(),
        entries: vec![config.server_entry_path()],
        out_dir: config.server_out_path(),
        defines: production_defines(),
        minify: false,
        code_splitting: true,
        esm: true,
        manifest: true,
        write: false,
        externals: ExternalPolicy::BareAndBuiltins {
            keep: RESERVED_SPECIFIERS.to_vec(),
        },
        strip_exports: config.server.strip_exports.clone(),
        boundary_detection,
    })
}
