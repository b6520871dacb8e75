//! Chunk-reference map derived from the browser pass.
//!
//! Maps each boundary module's absolute path to its exported names, and each
//! name to the browser chunks a client runtime has to load to resolve it.
//! The map is embedded in bundled code as a JS string literal, so it is
//! serialized twice: once to compact JSON, then that JSON as a JSON string.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::discovery::DiscoveryContext;
use crate::manifest::BuildManifest;
use crate::Result;

/// The encoded empty map: a string literal holding `{}`.
pub const EMPTY_CHUNK_MAP: &str = "\"{}\"";

/// How a client runtime loads one export of a boundary module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkDescriptor {
    /// Public URL of the module's own entry chunk
    pub id: String,
    /// Exported name
    pub name: String,
    /// The entry chunk URL followed by its static chunk dependencies
    pub chunks: Vec<String>,
}

/// Boundary module path → exported name → descriptor.
///
/// Keys are ordered so the encoded text is stable across builds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChunkReferenceMap {
    modules: BTreeMap<String, BTreeMap<String, ChunkDescriptor>>,
}

impl ChunkReferenceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, module: impl Into<String>, descriptor: ChunkDescriptor) {
        self.modules
            .entry(module.into())
            .or_default()
            .insert(descriptor.name.clone(), descriptor);
    }

    pub fn get(&self, module: &str, export: &str) -> Option<&ChunkDescriptor> {
        self.modules.get(module)?.get(export)
    }

    pub fn exports(&self, module: &str) -> Option<&BTreeMap<String, ChunkDescriptor>> {
        self.modules.get(module)
    }

    pub fn modules(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Encode as a JS string literal whose content is the compact JSON map.
    pub fn encode(&self) -> Result<String> {
        let json = serde_json::to_string(self)?;
        Ok(serde_json::to_string(&json)?)
    }

    /// Inverse of [`encode`](Self::encode): unwrap the string, then parse.
    pub fn decode(encoded: &str) -> Result<Self> {
        let json: String = serde_json::from_str(encoded)?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// Public URL of an output file: `public_path` joined with the path relative
/// to `out_dir`, with exactly one `/` between them and forward slashes only.
pub(crate) fn public_url(public_path: &str, out_dir: &Path, file: &Path) -> String {
    let relative = file.strip_prefix(out_dir).unwrap_or(file);
    let relative = relative.to_string_lossy().replace('\\', "/");
    let relative = relative.trim_start_matches('/');

    if public_path.ends_with('/') {
        format!("{public_path}{relative}")
    } else {
        format!("{public_path}/{relative}")
    }
}

/// Builds the [`ChunkReferenceMap`] from a finished browser manifest.
pub struct ChunkMapBuilder<'a> {
    manifest: &'a BuildManifest,
    discovery: &'a DiscoveryContext,
    out_dir: &'a Path,
    public_path: &'a str,
}

impl<'a> ChunkMapBuilder<'a> {
    pub fn new(
        manifest: &'a BuildManifest,
        discovery: &'a DiscoveryContext,
        out_dir: &'a Path,
        public_path: &'a str,
    ) -> Self {
        Self {
            manifest,
            discovery,
            out_dir,
            public_path,
        }
    }

    /// Walk every entry output and describe each boundary module it carries.
    ///
    /// Fails when the discovery context is still open.
    pub fn build(&self) -> Result<ChunkReferenceMap> {
        let boundaries = self.discovery.frozen_paths()?;
        let mut map = ChunkReferenceMap::new();
        if boundaries.is_empty() {
            return Ok(map);
        }

        for (output, meta) in self.manifest.entry_outputs() {
            let chunk_url = public_url(self.public_path, self.out_dir, output);
            let chunks: Vec<String> = std::iter::once(chunk_url.clone())
                .chain(
                    meta.static_chunk_imports()
                        .map(|dep| public_url(self.public_path, self.out_dir, dep)),
                )
                .collect();

            for module in boundaries.iter().filter(|m| meta.contains_input(m)) {
                let key = module.to_string_lossy().into_owned();
                debug!(
                    "[fob-rsc] chunk map: {} -> {} ({} exports)",
                    key,
                    chunk_url,
                    meta.exported_names.len()
                );
                for name in &meta.exported_names {
                    map.insert(
                        key.clone(),
                        ChunkDescriptor {
                            id: chunk_url.clone(),
                            name: name.clone(),
                            chunks: chunks.clone(),
                        },
                    );
                }
            }
        }

        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{ImportedModule, OutputFile, OutputMeta};
    use std::path::PathBuf;

    #[test]
    fn test_public_url_joins_with_single_slash() {
        let out = Path::new("/app/dist/browser");
        let file = Path::new("/app/dist/browser/assets/client.js");
        assert_eq!(public_url("/static/", out, file), "/static/assets/client.js");
        assert_eq!(public_url("/static", out, file), "/static/assets/client.js");
        assert_eq!(public_url("/", out, file), "/assets/client.js");
        assert_eq!(
            public_url("https://cdn.example.com/app/", out, file),
            "https://cdn.example.com/app/assets/client.js"
        );
    }

    #[test]
    fn test_empty_constant_matches_encoding() {
        assert_eq!(ChunkReferenceMap::new().encode().unwrap(), EMPTY_CHUNK_MAP);
        assert!(ChunkReferenceMap::decode(EMPTY_CHUNK_MAP).unwrap().is_empty());
    }

    #[test]
    fn test_encoding_is_a_string_literal() {
        let mut map = ChunkReferenceMap::new();
        map.insert(
            "/app/src/Counter.js",
            ChunkDescriptor {
                id: "/Counter.js".into(),
                name: "default".into(),
                chunks: vec!["/Counter.js".into()],
            },
        );
        let encoded = map.encode().unwrap();
        assert!(encoded.starts_with('"') && encoded.ends_with('"'));
        assert!(encoded.contains(r#"\"/app/src/Counter.js\""#));
    }

    #[test]
    fn test_build_requires_frozen_discovery() {
        let manifest = BuildManifest::new();
        let discovery = DiscoveryContext::new();
        let builder = ChunkMapBuilder::new(&manifest, &discovery, Path::new("/out"), "/");
        assert!(builder.build().is_err());
    }

    #[test]
    fn test_build_skips_non_boundary_entries() {
        let mut manifest = BuildManifest::new();
        manifest.push_chunk(
            OutputFile::text("/out/client.js", ""),
            OutputMeta {
                is_entry_point: true,
                entry_point: Some(PathBuf::from("/app/src/client.js")),
                input_modules: vec![PathBuf::from("/app/src/client.js")],
                exported_names: vec!["default".into()],
                imported_modules: vec![ImportedModule {
                    path: "/out/shared.js".into(),
                    external: false,
                    static_import: true,
                }],
            },
        );
        let discovery = DiscoveryContext::new();
        discovery.record("/app/src/Counter.js").unwrap();
        discovery.freeze();

        let map = ChunkMapBuilder::new(&manifest, &discovery, Path::new("/out"), "/")
            .build()
            .unwrap();
        assert!(map.is_empty());
    }
}
