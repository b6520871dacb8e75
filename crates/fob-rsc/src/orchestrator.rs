//! Sequencing of the two passes and the write-out.
//!
//! Outside split mode the passes share nothing and run concurrently. In
//! split mode the server pass runs first and populates a fresh
//! [`DiscoveryContext`]; the context is frozen before the browser pass reads
//! it. Nothing is written until both targets are rendered.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::chunk_map::{ChunkMapBuilder, ChunkReferenceMap, EMPTY_CHUNK_MAP, public_url};
use crate::config::BuildConfig;
use crate::discovery::DiscoveryContext;
use crate::engine::BundleEngine;
use crate::manifest::BuildManifest;
use crate::placeholder::PlaceholderValues;
use crate::runner::{BuildRunner, PassOutcome, PassStatus};
use crate::target::BuildTarget;
use crate::targets::{browser_options, server_options};
use crate::writer::OutputWriter;
use crate::{Error, Result};

/// Per-target summary of a finished build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetReport {
    pub target: BuildTarget,
    pub status: PassStatus,
    pub files_written: usize,
    pub out_dir: PathBuf,
}

/// Summary of a finished build.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub server: TargetReport,
    pub browser: TargetReport,
    /// Public URL of the browser entry chunk
    pub client_entry: String,
    /// Empty outside split mode
    pub chunk_map: ChunkReferenceMap,
    /// Boundary modules found by the server pass (split mode only), as the
    /// bundler reports them
    pub discovered: Vec<PathBuf>,
}

impl BuildReport {
    pub fn has_warnings(&self) -> bool {
        self.server.status.has_warnings() || self.browser.status.has_warnings()
    }
}

struct Passes {
    server: PassOutcome,
    browser: PassOutcome,
    chunk_map: ChunkReferenceMap,
    discovered: Vec<PathBuf>,
}

/// Drives one complete build.
pub struct BuildOrchestrator<E> {
    runner: BuildRunner<E>,
}

impl<E: BundleEngine> BuildOrchestrator<E> {
    pub fn new(engine: E) -> Self {
        Self {
            runner: BuildRunner::new(engine),
        }
    }

    pub fn runner(&self) -> &BuildRunner<E> {
        &self.runner
    }

    /// Build both targets and write their output trees.
    ///
    /// Any fatal diagnostic aborts the whole build before a file is written.
    pub async fn build(&self, config: &BuildConfig) -> Result<BuildReport> {
        config.validate()?;
        info!(
            "[fob-rsc] build started in {} (split mode: {})",
            config.cwd.display(),
            config.split_mode
        );

        let passes = if config.split_mode {
            self.run_split(config).await?
        } else {
            self.run_concurrent(config).await?
        };

        let browser_out = config.browser_out_path();
        let server_out = config.server_out_path();

        let client_entry = client_entry_url(
            &passes.browser.manifest,
            &config.browser_entry_path(),
            &browser_out,
            &config.browser.public_path,
        )?;
        debug!("[fob-rsc] client entry: {}", client_entry);

        let encoded_map = if config.split_mode {
            passes.chunk_map.encode()?
        } else {
            EMPTY_CHUNK_MAP.to_string()
        };

        let server_values = PlaceholderValues::new(BuildTarget::Server, &client_entry, encoded_map);
        let browser_values = server_values.for_target(BuildTarget::Browser);

        let server_rendered =
            OutputWriter::new(&server_out, &server_values).render(&passes.server.manifest)?;
        let browser_rendered =
            OutputWriter::new(&browser_out, &browser_values).render(&passes.browser.manifest)?;

        let server_written = server_rendered.write()?;
        let browser_written = browser_rendered.write()?;

        info!(
            "[fob-rsc] build finished: {} server files, {} browser files",
            server_written, browser_written
        );

        Ok(BuildReport {
            server: TargetReport {
                target: BuildTarget::Server,
                status: passes.server.status,
                files_written: server_written,
                out_dir: server_out,
            },
            browser: TargetReport {
                target: BuildTarget::Browser,
                status: passes.browser.status,
                files_written: browser_written,
                out_dir: browser_out,
            },
            client_entry,
            chunk_map: passes.chunk_map,
            discovered: passes.discovered,
        })
    }

    async fn run_concurrent(&self, config: &BuildConfig) -> Result<Passes> {
        let server_opts = server_options(config, None)?;
        let browser_opts = browser_options(config, None);

        let (server, browser) = tokio::try_join!(
            self.runner.run(server_opts),
            self.runner.run(browser_opts)
        )?;

        Ok(Passes {
            server,
            browser,
            chunk_map: ChunkReferenceMap::new(),
            discovered: Vec::new(),
        })
    }

    async fn run_split(&self, config: &BuildConfig) -> Result<Passes> {
        let discovery = Arc::new(DiscoveryContext::new());

        let server = self
            .runner
            .run(server_options(config, Some(&discovery))?)
            .await?;

        discovery.freeze();
        let discovered = discovery.frozen_paths()?;
        info!(
            "[fob-rsc] server pass discovered {} boundary module(s)",
            discovered.len()
        );

        let browser = self
            .runner
            .run(browser_options(config, Some(&discovery)))
            .await?;

        let chunk_map = ChunkMapBuilder::new(
            &browser.manifest,
            &discovery,
            &config.browser_out_path(),
            &config.browser.public_path,
        )
        .build()?;

        Ok(Passes {
            server,
            browser,
            chunk_map,
            discovered,
        })
    }
}

/// Public URL of the browser entry chunk.
///
/// Picks the entry output generated for `entry_module`; a manifest with a
/// single entry output uses that one. Module ids from the bundler have
/// symlinks resolved, so `entry_module` also matches through its canonical
/// path.
pub fn client_entry_url(
    manifest: &BuildManifest,
    entry_module: &Path,
    out_dir: &Path,
    public_path: &str,
) -> Result<String> {
    let entries: Vec<_> = manifest.entry_outputs().collect();
    let canonical = entry_module.canonicalize().ok();

    let output = entries
        .iter()
        .find(|(_, meta)| {
            meta.contains_input(entry_module)
                || canonical.as_deref().is_some_and(|path| meta.contains_input(path))
        })
        .or_else(|| match entries.as_slice() {
            [single] => Some(single),
            _ => None,
        })
        .map(|(path, _)| *path)
        .ok_or_else(|| {
            Error::MissingClientEntry(format!(
                "no browser output is the entry chunk for '{}' ({} entry outputs)",
                entry_module.display(),
                entries.len()
            ))
        })?;

    Ok(public_url(public_path, out_dir, output))
}
