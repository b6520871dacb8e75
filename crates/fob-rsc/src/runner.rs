//! One bundler invocation per target, with diagnostics classified.

use std::sync::Arc;

use tracing::{info, warn};

use crate::diagnostics::Diagnostic;
use crate::engine::BundleEngine;
use crate::manifest::BuildManifest;
use crate::target::BuildTarget;
use crate::targets::TargetOptions;
use crate::{Error, Result};

/// How a successful pass finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassStatus {
    Clean,
    /// Completed with this many warnings
    Warnings(usize),
}

impl PassStatus {
    pub fn has_warnings(&self) -> bool {
        matches!(self, PassStatus::Warnings(_))
    }
}

/// Result of a successful pass.
#[derive(Debug, Clone)]
pub struct PassOutcome {
    pub target: BuildTarget,
    pub manifest: BuildManifest,
    pub status: PassStatus,
    pub warnings: Vec<Diagnostic>,
}

/// Runs passes against an engine. Errors are fatal and never retried.
pub struct BuildRunner<E> {
    engine: Arc<E>,
}

impl<E> Clone for BuildRunner<E> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
        }
    }
}

impl<E: BundleEngine> BuildRunner<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Run one pass.
    ///
    /// Any error-severity diagnostic fails the pass with
    /// [`Error::Compile`] labelled with the target; warnings are logged and
    /// reported on the outcome.
    pub async fn run(&self, options: TargetOptions) -> Result<PassOutcome> {
        let target = options.target;
        info!("[fob-rsc] building {} ({} entries)", target, options.entries.len());

        let output = match self.engine.bundle(&options).await {
            Ok(output) => output,
            Err(mut diagnostics) => {
                if diagnostics.is_empty() {
                    diagnostics.push(Diagnostic::error("bundler failed without diagnostics"));
                }
                return Err(Error::Compile {
                    target,
                    diagnostics,
                });
            }
        };

        let (errors, warnings): (Vec<_>, Vec<_>) = output
            .diagnostics
            .into_iter()
            .partition(Diagnostic::is_error);

        if !errors.is_empty() {
            return Err(Error::Compile {
                target,
                diagnostics: errors,
            });
        }

        for warning in &warnings {
            warn!("[fob-rsc] {} warning: {}", target, warning);
        }

        let status = if warnings.is_empty() {
            info!(
                "[fob-rsc] {} build complete ({} files)",
                target,
                output.manifest.outputs.len()
            );
            PassStatus::Clean
        } else {
            info!(
                "[fob-rsc] {} build complete with {} warning(s)",
                target,
                warnings.len()
            );
            PassStatus::Warnings(warnings.len())
        };

        Ok(PassOutcome {
            target,
            manifest: output.manifest,
            status,
            warnings,
        })
    }
}
