//! Boundary-module discovery shared between the server and browser passes.
//!
//! The context has two phases. While open, the boundary-detection plugin
//! appends module paths to it during the server pass. Once the server pass
//! completes the orchestrator freezes it; from then on it is read-only. The
//! server pass finishing before the browser pass starts is the only
//! synchronisation the data needs; the lock exists because Rolldown may run
//! transform hooks on several threads within the server pass.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use tracing::debug;

use crate::{Error, Result};

/// Set of absolute boundary-module paths discovered during the server pass.
#[derive(Debug, Default)]
pub struct DiscoveryContext {
    paths: RwLock<BTreeSet<PathBuf>>,
    frozen: AtomicBool,
}

impl DiscoveryContext {
    /// Create an empty, open context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a boundary module. Fails once the context is frozen.
    ///
    /// Returns `true` if the path was not already present.
    pub fn record(&self, path: impl Into<PathBuf>) -> Result<bool> {
        let path = path.into();
        if self.is_frozen() {
            return Err(Error::DiscoveryFrozen(path));
        }
        let inserted = self.paths.write().insert(path.clone());
        if inserted {
            debug!("[fob-rsc] discovered boundary module {}", path.display());
        }
        Ok(inserted)
    }

    /// End the append phase.
    pub fn freeze(&self) {
        self.frozen.store(true, Ordering::Release);
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::Acquire)
    }

    /// Paths present right now, sorted.
    pub fn snapshot(&self) -> Vec<PathBuf> {
        self.paths.read().iter().cloned().collect()
    }

    /// Paths after the append phase ended. Reading before the freeze is an
    /// ordering bug in the caller.
    pub fn frozen_paths(&self) -> Result<Vec<PathBuf>> {
        if !self.is_frozen() {
            return Err(Error::Configuration(
                "discovery context read before the server pass completed".to_string(),
            ));
        }
        Ok(self.snapshot())
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.paths.read().contains(path)
    }

    pub fn len(&self) -> usize {
        self.paths.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.read().is_empty()
    }
}
