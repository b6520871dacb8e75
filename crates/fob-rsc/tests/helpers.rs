//! Shared test utilities for fob-rsc integration tests
//!
//! `FakeEngine` stands in for Rolldown: it emits one entry chunk per entry
//! module plus a shared chunk and an asset, and behaves like the boundary
//! detection transform when the server pass carries a discovery context.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use fob_rsc::{
    BuildConfig, BuildManifest, BuildTarget, BundleEngine, Diagnostic, EngineOutput,
    ImportedModule, OutputFile, OutputMeta, Placeholder, TargetOptions,
};
use parking_lot::Mutex;
use tempfile::TempDir;
use tokio::sync::Barrier;

/// One recorded engine invocation.
#[derive(Debug, Clone)]
pub struct EngineCall {
    pub target: BuildTarget,
    pub entries: Vec<PathBuf>,
    pub boundary_detection: bool,
}

#[derive(Default)]
pub struct FakeEngine {
    calls: Mutex<Vec<EngineCall>>,
    boundaries: Vec<PathBuf>,
    fail: Option<BuildTarget>,
    warn: Option<BuildTarget>,
    rendezvous: Option<Arc<Barrier>>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Modules the server pass reports as boundaries.
    pub fn with_boundaries(mut self, paths: impl IntoIterator<Item = PathBuf>) -> Self {
        self.boundaries = paths.into_iter().collect();
        self
    }

    pub fn failing(mut self, target: BuildTarget) -> Self {
        self.fail = Some(target);
        self
    }

    pub fn warning(mut self, target: BuildTarget) -> Self {
        self.warn = Some(target);
        self
    }

    /// Both passes must be in flight at once or neither finishes.
    pub fn with_rendezvous(mut self) -> Self {
        self.rendezvous = Some(Arc::new(Barrier::new(2)));
        self
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().clone()
    }

    pub fn targets(&self) -> Vec<BuildTarget> {
        self.calls.lock().iter().map(|c| c.target).collect()
    }
}

#[async_trait]
impl BundleEngine for FakeEngine {
    async fn bundle(&self, options: &TargetOptions) -> Result<EngineOutput, Vec<Diagnostic>> {
        self.calls.lock().push(EngineCall {
            target: options.target,
            entries: options.entries.clone(),
            boundary_detection: options.boundary_detection.is_some(),
        });

        if let Some(barrier) = &self.rendezvous {
            barrier.wait().await;
        }

        if self.fail == Some(options.target) {
            return Err(vec![
                Diagnostic::error("Unexpected token").with_file("src/broken.js"),
            ]);
        }

        if let Some(discovery) = &options.boundary_detection {
            for path in &self.boundaries {
                discovery
                    .record(path.clone())
                    .map_err(|e| vec![Diagnostic::error(e.to_string())])?;
            }
        }

        let diagnostics = if self.warn == Some(options.target) {
            vec![Diagnostic::warning("Use of eval is discouraged")]
        } else {
            Vec::new()
        };

        Ok(EngineOutput {
            manifest: fake_manifest(options),
            diagnostics,
        })
    }
}

/// Source text every fake entry chunk carries.
pub fn entry_code(name: &str) -> String {
    format!(
        "const target = \"{target}\";\nexport const clientEntry = {entry};\nexport const chunkMap = JSON.parse({map});\nexport default function {name}() {{ return target; }}\n",
        target = Placeholder::BuildTarget.token(),
        entry = Placeholder::ClientEntry.token(),
        map = Placeholder::ChunkMap.token(),
    )
}

fn fake_manifest(options: &TargetOptions) -> BuildManifest {
    let shared = options.out_dir.join("chunks").join("shared.js");
    let mut manifest = BuildManifest::new();

    for entry in &options.entries {
        let stem = entry
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "entry".to_string());
        manifest.push_chunk(
            OutputFile::text(options.out_dir.join(format!("{stem}.js")), entry_code(&stem)),
            OutputMeta {
                is_entry_point: true,
                entry_point: Some(entry.clone()),
                input_modules: vec![entry.clone()],
                exported_names: vec!["chunkMap".into(), "clientEntry".into(), "default".into()],
                imported_modules: vec![
                    ImportedModule {
                        path: shared.clone(),
                        external: false,
                        static_import: true,
                    },
                    ImportedModule {
                        path: "react".into(),
                        external: true,
                        static_import: true,
                    },
                ],
            },
        );
    }

    manifest.push_chunk(
        OutputFile::text(&shared, "export const shared = 1;\n"),
        OutputMeta {
            input_modules: vec![options.cwd.join("src/shared.js")],
            exported_names: vec!["shared".into()],
            ..Default::default()
        },
    );
    manifest.push_asset(OutputFile::binary(
        options.out_dir.join("assets").join("logo.png"),
        vec![0x89, b'P', b'N', b'G'],
    ));
    manifest
}

/// A temp project root with the conventional layout configured.
pub fn test_project() -> (TempDir, BuildConfig) {
    let dir = TempDir::new().expect("temp dir");
    let config = BuildConfig::new(dir.path())
        .browser_entry("src/client.js")
        .browser_out_dir("dist/browser")
        .public_path("/static/")
        .server_entry("src/server.js")
        .server_out_dir("dist/server");
    (dir, config)
}

/// Every file under `dir`, sorted, with its contents read lossily.
pub fn read_tree(dir: &Path) -> Vec<(PathBuf, String)> {
    let mut files = Vec::new();
    let mut stack = vec![dir.to_path_buf()];
    while let Some(current) = stack.pop() {
        for entry in std::fs::read_dir(&current).expect("read dir") {
            let path = entry.expect("dir entry").path();
            if path.is_dir() {
                stack.push(path);
            } else {
                let bytes = std::fs::read(&path).expect("read file");
                files.push((path, String::from_utf8_lossy(&bytes).into_owned()));
            }
        }
    }
    files.sort();
    files
}

/// Assert no placeholder token remains anywhere under `dir`.
pub fn assert_no_placeholders(dir: &Path) {
    for (path, contents) in read_tree(dir) {
        for placeholder in Placeholder::ALL {
            assert!(
                !contents.contains(placeholder.token()),
                "{} still contains the {} placeholder",
                path.display(),
                placeholder
            );
        }
    }
}

/// The encoded chunk map embedded in a fake entry chunk.
pub fn embedded_chunk_map(contents: &str) -> &str {
    let start = contents.find("JSON.parse(").expect("chunk map call") + "JSON.parse(".len();
    let end = contents[start..].find(");\n").expect("end of chunk map call") + start;
    &contents[start..end]
}
