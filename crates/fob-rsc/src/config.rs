//! Build configuration types.
//!
//! `BuildConfig` is immutable for the duration of one build. It is usually
//! produced by an external loader (see `fob-rsc-cli`), but the builder methods
//! make it easy to assemble in code and tests.

use std::path::{Path, PathBuf};

use path_clean::PathClean;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Browser target configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowserConfig {
    /// Client entry module, relative to the working directory
    pub entry: String,
    /// Output directory, relative to the working directory
    pub out_dir: PathBuf,
    /// URL prefix the output directory is served under
    pub public_path: String,
    /// Export names removed from every browser module
    #[serde(default)]
    pub strip_exports: Vec<String>,
}

/// Server target configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    pub entry: String,
    pub out_dir: PathBuf,
    #[serde(default)]
    pub strip_exports: Vec<String>,
}

/// Configuration for one orchestrated build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildConfig {
    /// Working directory all relative paths resolve against
    pub cwd: PathBuf,
    pub browser: BrowserConfig,
    pub server: ServerConfig,
    /// Run the server pass first and feed discovered boundary modules into the
    /// browser pass
    #[serde(default)]
    pub split_mode: bool,
}

impl BuildConfig {
    /// Create a configuration rooted at `cwd` with conventional defaults.
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            browser: BrowserConfig {
                entry: "src/client.js".to_string(),
                out_dir: PathBuf::from("dist/browser"),
                public_path: "/".to_string(),
                strip_exports: Vec::new(),
            },
            server: ServerConfig {
                entry: "src/server.js".to_string(),
                out_dir: PathBuf::from("dist/server"),
                strip_exports: Vec::new(),
            },
            split_mode: false,
        }
    }

    pub fn browser_entry(mut self, entry: impl Into<String>) -> Self {
        self.browser.entry = entry.into();
        self
    }

    pub fn browser_out_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.browser.out_dir = dir.into();
        self
    }

    pub fn public_path(mut self, public_path: impl Into<String>) -> Self {
        self.browser.public_path = public_path.into();
        self
    }

    pub fn browser_strip_exports<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.browser.strip_exports = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn server_entry(mut self, entry: impl Into<String>) -> Self {
        self.server.entry = entry.into();
        self
    }

    pub fn server_out_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.server.out_dir = dir.into();
        self
    }

    pub fn server_strip_exports<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.server.strip_exports = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn split_mode(mut self, enabled: bool) -> Self {
        self.split_mode = enabled;
        self
    }

    /// Absolute path of the browser entry module.
    pub fn browser_entry_path(&self) -> PathBuf {
        self.resolve(Path::new(&self.browser.entry))
    }

    /// Absolute path of the server entry module.
    pub fn server_entry_path(&self) -> PathBuf {
        self.resolve(Path::new(&self.server.entry))
    }

    /// Absolute browser output directory.
    pub fn browser_out_path(&self) -> PathBuf {
        self.resolve(&self.browser.out_dir)
    }

    /// Absolute server output directory.
    pub fn server_out_path(&self) -> PathBuf {
        self.resolve(&self.server.out_dir)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf().clean()
        } else {
            self.cwd.join(path).clean()
        }
    }

    /// Check the configuration for values no build could succeed with.
    pub fn validate(&self) -> Result<()> {
        if self.browser.entry.trim().is_empty() {
            return Err(Error::Configuration(
                "browser.entry must not be empty".to_string(),
            ));
        }
        if self.server.entry.trim().is_empty() {
            return Err(Error::Configuration(
                "server.entry must not be empty".to_string(),
            ));
        }
        if self.browser.public_path.is_empty() {
            return Err(Error::Configuration(
                "browser.publicPath must not be empty (use \"/\" for the site root)".to_string(),
            ));
        }
        if self.browser_out_path() == self.server_out_path() {
            return Err(Error::Configuration(format!(
                "browser and server share the output directory '{}'",
                self.browser_out_path().display()
            )));
        }
        Ok(())
    }
}
