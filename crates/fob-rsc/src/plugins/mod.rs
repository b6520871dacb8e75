//! Rolldown plugins for the split build.
//!
//! - [`VirtualModulePlugin`]: reserved `@fob/*` specifiers
//! - [`ExternalsPlugin`]: server-side externalisation of bare imports
//! - [`StripExportsPlugin`]: removes named export declarations per target
//! - [`BoundaryDetectionPlugin`]: records boundary modules into the discovery context

pub mod boundary;
pub mod externals;
pub mod registry;
pub mod strip_exports;
pub mod virtual_module;

pub use boundary::{BoundaryDetectionPlugin, BoundaryDetector, UseClientDetector};
pub use externals::ExternalsPlugin;
pub use registry::{PluginPhase, PluginRegistry, RscPlugin};
pub use strip_exports::StripExportsPlugin;
pub use virtual_module::{
    BUILD_TARGET_SPECIFIER, CHUNK_MAP_SPECIFIER, CLIENT_ENTRY_SPECIFIER, RESERVED_SPECIFIERS,
    VirtualModule, VirtualModulePlugin,
};

use std::path::Path;

/// Whether a module id points at JS/TS source the transforms understand.
pub(crate) fn is_script_module(id: &str) -> bool {
    if id.starts_with('\0') {
        return false;
    }
    matches!(
        Path::new(id).extension().and_then(|e| e.to_str()),
        Some("js" | "jsx" | "mjs" | "cjs" | "ts" | "tsx" | "mts" | "cts")
    )
}
