//! Diagnostics reported by the bundling engine.
//!
//! Rolldown's diagnostic types change between releases, so they are reduced
//! to this cloneable form right at the engine boundary.

use serde::{Deserialize, Serialize};

/// Diagnostic severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    /// Blocking: the pass failed
    Error,
    /// Advisory: logged, the pass continues
    Warning,
}

/// A single engine diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: DiagnosticSeverity,
    pub message: String,
    pub file: Option<String>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Error,
            message: message.into(),
            file: None,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Warning,
            message: message.into(),
            file: None,
        }
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == DiagnosticSeverity::Error
    }

    /// Build a diagnostic from a Rolldown error or warning value.
    ///
    /// Uses the debug rendering, the only representation stable across
    /// Rolldown versions, and pulls out a file path when one is visible.
    pub fn from_rolldown(value: &dyn std::fmt::Debug, severity: DiagnosticSeverity) -> Self {
        let message = format!("{value:?}");
        let file = extract_file_path(&message);
        Self {
            severity,
            message,
            file,
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.file {
            Some(file) => write!(f, "{}: {}", file, self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Find the first quoted token that looks like a source path.
fn extract_file_path(text: &str) -> Option<String> {
    const EXTENSIONS: &[&str] = &[".js", ".jsx", ".ts", ".tsx", ".mjs", ".cjs", ".json"];

    text.split('"')
        .skip(1)
        .step_by(2)
        .find(|candidate| {
            !candidate.contains(' ') && EXTENSIONS.iter().any(|ext| candidate.ends_with(ext))
        })
        .map(str::to_string)
}
