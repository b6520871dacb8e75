//! Placeholder tokens for values only known after both passes finish.
//!
//! The virtual modules emit these tokens at bundle time. `OutputWriter`
//! replaces them with final values in one pass per file, then checks that no
//! token survived.

use std::borrow::Cow;
use std::path::Path;

use crate::target::BuildTarget;
use crate::{Error, Result};

/// A build-time value substituted into output text at write time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placeholder {
    /// Target identity string (`browser` / `server`)
    BuildTarget,
    /// Public URL of the browser entry chunk, as a JS string literal
    ClientEntry,
    /// Chunk-reference map, encoded as a JS string literal
    ChunkMap,
}

impl Placeholder {
    pub const ALL: [Placeholder; 3] = [
        Placeholder::BuildTarget,
        Placeholder::ClientEntry,
        Placeholder::ChunkMap,
    ];

    /// The literal token. Tokens are valid JS identifiers so minifiers keep
    /// them intact both inside string literals and in expression position.
    pub const fn token(&self) -> &'static str {
        match self {
            Placeholder::BuildTarget => "__FOB_RSC_BUILD_TARGET_7c1e9a4d52b83f06e1d7__",
            Placeholder::ClientEntry => "__FOB_RSC_CLIENT_ENTRY_b94f2d0e6a1c835f7e20__",
            Placeholder::ChunkMap => "__FOB_RSC_CHUNK_MAP_3e8a61f0c2d94b7a5d13__",
        }
    }
}

impl std::fmt::Display for Placeholder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Placeholder::BuildTarget => write!(f, "build-target"),
            Placeholder::ClientEntry => write!(f, "client-entry"),
            Placeholder::ChunkMap => write!(f, "chunk-map"),
        }
    }
}

/// Final values for every placeholder, for one target's output tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderValues {
    pub build_target: BuildTarget,
    /// Raw URL; quoted and escaped when substituted
    pub client_entry: String,
    /// Already encoded as a string literal (see [`crate::ChunkReferenceMap::encode`])
    pub chunk_map: String,
}

impl PlaceholderValues {
    pub fn new(
        build_target: BuildTarget,
        client_entry: impl Into<String>,
        chunk_map: impl Into<String>,
    ) -> Self {
        Self {
            build_target,
            client_entry: client_entry.into(),
            chunk_map: chunk_map.into(),
        }
    }

    /// Same values, different target identity.
    pub fn for_target(&self, build_target: BuildTarget) -> Self {
        Self {
            build_target,
            ..self.clone()
        }
    }

    /// Text that replaces `placeholder`.
    pub fn value(&self, placeholder: Placeholder) -> Cow<'_, str> {
        match placeholder {
            Placeholder::BuildTarget => Cow::Borrowed(self.build_target.as_str()),
            Placeholder::ClientEntry => {
                Cow::Owned(serde_json::Value::from(self.client_entry.as_str()).to_string())
            }
            Placeholder::ChunkMap => Cow::Borrowed(&self.chunk_map),
        }
    }

    /// Replace every placeholder in `text`; `path` is only used for errors.
    pub fn substitute(&self, text: &str, path: &Path) -> Result<String> {
        let mut out = text.to_string();
        for placeholder in Placeholder::ALL {
            if out.contains(placeholder.token()) {
                out = out.replace(placeholder.token(), &self.value(placeholder));
            }
        }

        // A value may not reintroduce a token.
        if let Some(placeholder) = Placeholder::ALL
            .into_iter()
            .find(|p| out.contains(p.token()))
        {
            return Err(Error::UnresolvedPlaceholder {
                placeholder,
                path: path.to_path_buf(),
            });
        }

        Ok(out)
    }
}
