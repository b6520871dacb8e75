//! Engine-neutral description of one completed build pass.
//!
//! Output paths are absolute: the target's output directory joined with the
//! file name the engine emitted.

use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Contents of one output file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "lowercase")]
pub enum OutputContents {
    Text(String),
    Binary(Vec<u8>),
}

impl OutputContents {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            OutputContents::Text(text) => Some(text),
            OutputContents::Binary(_) => None,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            OutputContents::Text(text) => text.as_bytes(),
            OutputContents::Binary(bytes) => bytes,
        }
    }
}

/// One emitted file, still in memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputFile {
    pub path: PathBuf,
    pub contents: OutputContents,
}

impl OutputFile {
    pub fn text(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            contents: OutputContents::Text(text.into()),
        }
    }

    pub fn binary(path: impl Into<PathBuf>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            contents: OutputContents::Binary(bytes.into()),
        }
    }
}

/// An import edge from an output chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedModule {
    /// Output path for chunk imports, the raw specifier for externals
    pub path: PathBuf,
    pub external: bool,
    /// `false` for dynamic `import()` edges
    pub static_import: bool,
}

/// Metadata for one output chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputMeta {
    pub is_entry_point: bool,
    /// Module the entry chunk was generated for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_point: Option<PathBuf>,
    pub input_modules: Vec<PathBuf>,
    pub exported_names: Vec<String>,
    pub imported_modules: Vec<ImportedModule>,
}

impl OutputMeta {
    /// Statically imported, bundled (non-external) dependency chunks, in order.
    pub fn static_chunk_imports(&self) -> impl Iterator<Item = &Path> {
        self.imported_modules
            .iter()
            .filter(|import| import.static_import && !import.external)
            .map(|import| import.path.as_path())
    }

    pub fn contains_input(&self, module: &Path) -> bool {
        self.entry_point.as_deref() == Some(module)
            || self.input_modules.iter().any(|m| m == module)
    }
}

/// Everything one pass produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildManifest {
    /// Output files in emission order
    pub outputs: Vec<OutputFile>,
    /// Chunk metadata keyed by output path (assets have no entry)
    pub meta: FxHashMap<PathBuf, OutputMeta>,
}

impl BuildManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a chunk with its metadata.
    pub fn push_chunk(&mut self, file: OutputFile, meta: OutputMeta) {
        self.meta.insert(file.path.clone(), meta);
        self.outputs.push(file);
    }

    /// Add a file without chunk metadata.
    pub fn push_asset(&mut self, file: OutputFile) {
        self.outputs.push(file);
    }

    /// Entry-point chunks in emission order.
    pub fn entry_outputs(&self) -> impl Iterator<Item = (&Path, &OutputMeta)> {
        self.outputs.iter().filter_map(|file| {
            self.meta
                .get(&file.path)
                .filter(|meta| meta.is_entry_point)
                .map(|meta| (file.path.as_path(), meta))
        })
    }

    pub fn meta_for(&self, path: &Path) -> Option<&OutputMeta> {
        self.meta.get(path)
    }
}
