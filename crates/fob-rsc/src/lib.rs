#![cfg_attr(docsrs, feature(doc_cfg))]

//! # fob-rsc
//!
//! Coordinated browser + server builds for the server/client component split.
//!
//! Two Rolldown passes are produced from one [`BuildConfig`]. In split mode the
//! server pass runs first and discovers boundary modules (modules marked with a
//! `"use client"` directive); those become extra entry points of the browser
//! pass, and a chunk-reference map is derived from the browser output so a
//! server renderer can tell the client runtime which chunks to load.
//!
//! Values that depend on both passes (the public client-entry URL and the
//! serialized chunk map) are bundled as placeholder tokens and substituted
//! when output is written.
//!
//! ## Quick Start
//!
//! ```no_run
//! use fob_rsc::{BuildConfig, BuildOrchestrator, RolldownEngine};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = BuildConfig::new("./app")
//!     .browser_entry("src/client.js")
//!     .browser_out_dir("dist/browser")
//!     .public_path("/static/")
//!     .server_entry("src/server.js")
//!     .server_out_dir("dist/server")
//!     .split_mode(true);
//!
//! let report = BuildOrchestrator::new(RolldownEngine::new())
//!     .build(&config)
//!     .await?;
//!
//! println!("client entry: {}", report.client_entry);
//! # Ok(()) }
//! ```
//!
//! ### Importing build-time values
//!
//! Bundled source can import three reserved specifiers, resolved as
//! compile-time constants:
//!
//! ```js
//! import target from "@fob/build-target";         // "browser" | "server"
//! import clientEntry from "@fob/client-entry";    // "/static/client.js"
//! import chunkMap from "@fob/webpack-chunk-map";  // { [path]: { [export]: ... } }
//! ```

pub mod chunk_map;
pub mod config;
pub mod diagnostics;
pub mod discovery;
pub mod engine;
pub mod manifest;
pub mod orchestrator;
pub mod placeholder;
pub mod plugins;
pub mod runner;
pub mod target;
pub mod targets;
pub mod writer;

// Logging utilities (optional, enabled with "logging" feature)
#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub mod logging;

#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub use logging::{LogLevel, LogOptions, init_logging, init_logging_from_env, init_logging_with};

pub use chunk_map::{ChunkDescriptor, ChunkMapBuilder, ChunkReferenceMap, EMPTY_CHUNK_MAP};
pub use config::{BrowserConfig, BuildConfig, ServerConfig};
pub use diagnostics::{Diagnostic, DiagnosticSeverity};
pub use discovery::DiscoveryContext;
pub use engine::{BundleEngine, EngineOutput, RolldownEngine};
pub use manifest::{BuildManifest, ImportedModule, OutputContents, OutputFile, OutputMeta};
pub use orchestrator::{BuildOrchestrator, BuildReport, TargetReport, client_entry_url};
pub use placeholder::{Placeholder, PlaceholderValues};
pub use plugins::{BoundaryDetector, UseClientDetector};
pub use runner::{BuildRunner, PassOutcome, PassStatus};
pub use target::BuildTarget;
pub use targets::{ExternalPolicy, TargetOptions};
pub use writer::{OutputWriter, RenderedOutput};

use std::path::PathBuf;

/// Error types for fob-rsc operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A precondition was violated by the caller (programmer error).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The bundling engine reported blocking diagnostics for a target.
    #[error("{target} build failed: {}", format_diagnostics(.diagnostics))]
    Compile {
        target: BuildTarget,
        diagnostics: Vec<Diagnostic>,
    },

    /// A boundary module was recorded after the discovery context was frozen.
    #[error("Discovery context is frozen; cannot record '{}'", .0.display())]
    DiscoveryFrozen(PathBuf),

    /// The browser manifest has no usable client entry output.
    #[error("Missing client entry: {0}")]
    MissingClientEntry(String),

    /// A placeholder token survived substitution.
    #[error("Unresolved placeholder {placeholder} in '{}'", path.display())]
    UnresolvedPlaceholder {
        placeholder: Placeholder,
        path: PathBuf,
    },

    /// Invalid output path (e.g., directory traversal attempt).
    #[error("Invalid output path: {0}")]
    InvalidOutputPath(String),

    /// File write operation failed.
    #[error("Write failure: {0}")]
    WriteFailure(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Chunk map (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for fob-rsc operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// The target a compile failure belongs to, if any.
    pub fn failed_target(&self) -> Option<BuildTarget> {
        match self {
            Error::Compile { target, .. } => Some(*target),
            _ => None,
        }
    }
}

/// Format compile diagnostics for display.
fn format_diagnostics(diagnostics: &[Diagnostic]) -> String {
    match diagnostics {
        [] => "Unknown bundler error".to_string(),
        [diag] => diag.to_string(),
        many => format!(
            "{} errors: {}",
            many.len(),
            many.iter()
                .map(|d| d.to_string())
                .collect::<Vec<_>>()
                .join("; ")
        ),
    }
}

impl miette::Diagnostic for Error {
    fn code(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        Some(Box::new(match self {
            Error::Configuration(_) => "CONFIGURATION_ERROR",
            Error::Compile { .. } => "COMPILE_ERROR",
            Error::DiscoveryFrozen(_) => "DISCOVERY_FROZEN",
            Error::MissingClientEntry(_) => "MISSING_CLIENT_ENTRY",
            Error::UnresolvedPlaceholder { .. } => "UNRESOLVED_PLACEHOLDER",
            Error::InvalidOutputPath(_) => "INVALID_OUTPUT_PATH",
            Error::WriteFailure(_) => "WRITE_FAILURE",
            Error::Io(_) => "IO_ERROR",
            Error::Json(_) => "JSON_ERROR",
        }))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(miette::Severity::Error)
    }

    fn help(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        match self {
            Error::Configuration(msg) => Some(Box::new(format!(
                "This is a wiring mistake in the caller, not a source problem.\nError: {}",
                msg
            ))),
            Error::Compile {
                target,
                diagnostics,
            } => {
                if diagnostics.len() == 1 {
                    Some(Box::new(format!(
                        "Fix the error in the {} sources and rebuild.",
                        target
                    )))
                } else {
                    Some(Box::new(format!(
                        "{} errors in the {} pass. See details above.",
                        diagnostics.len(),
                        target
                    )))
                }
            }
            Error::MissingClientEntry(_) => Some(Box::new(
                "Check that browser.entry points at a module that produces an entry chunk.",
            )),
            Error::UnresolvedPlaceholder { .. } => Some(Box::new(
                "A placeholder token was emitted in a form the writer does not substitute.",
            )),
            Error::InvalidOutputPath(path) => Some(Box::new(format!(
                "The output path '{}' is invalid. Ensure it stays within the target's output directory.",
                path
            ))),
            Error::WriteFailure(msg) => Some(Box::new(format!(
                "Failed to write file. Check disk space and permissions.\nError: {}",
                msg
            ))),
            _ => None,
        }
    }
}
