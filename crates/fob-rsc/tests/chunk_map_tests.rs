//! Chunk-reference map derivation and encoding.

use std::path::{Path, PathBuf};

use fob_rsc::{
    BuildManifest, ChunkDescriptor, ChunkMapBuilder, ChunkReferenceMap, DiscoveryContext,
    ImportedModule, OutputFile, OutputMeta,
};

fn import(path: &str, external: bool, static_import: bool) -> ImportedModule {
    ImportedModule {
        path: PathBuf::from(path),
        external,
        static_import,
    }
}

fn frozen(paths: &[&str]) -> DiscoveryContext {
    let discovery = DiscoveryContext::new();
    for path in paths {
        discovery.record(*path).unwrap();
    }
    discovery.freeze();
    discovery
}

fn boundary_manifest() -> BuildManifest {
    let mut manifest = BuildManifest::new();
    manifest.push_chunk(
        OutputFile::text("/out/client.js", ""),
        OutputMeta {
            is_entry_point: true,
            entry_point: Some("/app/src/client.js".into()),
            input_modules: vec!["/app/src/client.js".into()],
            exported_names: vec![],
            imported_modules: vec![import("/out/chunk-a.js", false, true)],
        },
    );
    manifest.push_chunk(
        OutputFile::text("/out/Counter.js", ""),
        OutputMeta {
            is_entry_point: true,
            entry_point: Some("/app/src/Counter.js".into()),
            input_modules: vec!["/app/src/Counter.js".into(), "/app/src/format.js".into()],
            exported_names: vec!["default".into(), "Counter".into()],
            imported_modules: vec![
                import("/out/chunk-a.js", false, true),
                import("react", true, true),
                import("/out/chunk-b.js", false, true),
                import("/out/lazy.js", false, false),
                import("/out/chunk-a.js", false, true),
            ],
        },
    );
    manifest.push_chunk(OutputFile::text("/out/chunk-a.js", ""), OutputMeta::default());
    manifest.push_chunk(OutputFile::text("/out/chunk-b.js", ""), OutputMeta::default());
    manifest.push_chunk(OutputFile::text("/out/lazy.js", ""), OutputMeta::default());
    manifest
}

#[test]
fn descriptor_per_export_with_own_chunk_first() {
    let manifest = boundary_manifest();
    let discovery = frozen(&["/app/src/Counter.js"]);

    let map = ChunkMapBuilder::new(&manifest, &discovery, Path::new("/out"), "/assets/")
        .build()
        .unwrap();

    assert_eq!(map.modules().collect::<Vec<_>>(), vec!["/app/src/Counter.js"]);
    let exports = map.exports("/app/src/Counter.js").unwrap();
    assert_eq!(exports.keys().collect::<Vec<_>>(), vec!["Counter", "default"]);

    let expected_chunks = vec![
        "/assets/Counter.js".to_string(),
        "/assets/chunk-a.js".to_string(),
        "/assets/chunk-b.js".to_string(),
        "/assets/chunk-a.js".to_string(),
    ];
    for (name, descriptor) in exports {
        assert_eq!(&descriptor.name, name);
        assert_eq!(descriptor.id, "/assets/Counter.js");
        assert_eq!(descriptor.chunks, expected_chunks);
    }
}

#[test]
fn boundary_merged_into_another_entry_is_found() {
    let manifest = boundary_manifest();
    let discovery = frozen(&["/app/src/format.js"]);

    let map = ChunkMapBuilder::new(&manifest, &discovery, Path::new("/out"), "/")
        .build()
        .unwrap();

    let descriptor = map.get("/app/src/format.js", "default").unwrap();
    assert_eq!(descriptor.id, "/Counter.js");
}

#[test]
fn empty_discovery_gives_empty_map() {
    let manifest = boundary_manifest();
    let discovery = frozen(&[]);

    let map = ChunkMapBuilder::new(&manifest, &discovery, Path::new("/out"), "/")
        .build()
        .unwrap();

    assert!(map.is_empty());
    assert_eq!(map.encode().unwrap(), fob_rsc::EMPTY_CHUNK_MAP);
}

#[test]
fn encode_then_decode_preserves_keys_and_chunk_order() {
    let mut map = ChunkReferenceMap::new();
    for (module, name, chunks) in [
        ("/app/src/b.js", "default", vec!["/b.js", "/z.js", "/a.js", "/z.js"]),
        ("/app/src/a.js", "Widget", vec!["/a.js"]),
        ("/app/src/a.js", "default", vec!["/a.js", "/shared.js"]),
    ] {
        map.insert(
            module,
            ChunkDescriptor {
                id: chunks[0].to_string(),
                name: name.to_string(),
                chunks: chunks.iter().map(|c| c.to_string()).collect(),
            },
        );
    }

    let encoded = map.encode().unwrap();
    let decoded = ChunkReferenceMap::decode(&encoded).unwrap();

    assert_eq!(decoded, map);
    assert_eq!(
        decoded.get("/app/src/b.js", "default").unwrap().chunks,
        vec!["/b.js", "/z.js", "/a.js", "/z.js"]
    );

    // Inner form is compact JSON with sorted keys.
    let inner: String = serde_json::from_str(&encoded).unwrap();
    assert!(inner.starts_with(r#"{"/app/src/a.js":{"Widget":"#));
    assert!(!inner.contains(' '));
}

#[test]
fn decode_rejects_unwrapped_json() {
    assert!(ChunkReferenceMap::decode("{}").is_err());
}
