//! Configuration loading.
//!
//! Priority: CLI flags > `FOB_RSC_*` environment variables > config file >
//! defaults. Nested environment keys use `__`, and each segment is converted
//! to camelCase: `FOB_RSC_BROWSER__PUBLIC_PATH=/static/` sets
//! `browser.publicPath`.

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format as _, Json, Serialized},
};
use fob_rsc::BuildConfig;

use crate::cli::BuildArgs;
use crate::error::{CliError, Result};

/// File looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "fob-rsc.config.json";

const ENV_PREFIX: &str = "FOB_RSC_";

/// Load the build configuration for `args`.
pub fn load(args: &BuildArgs) -> Result<BuildConfig> {
    let base = match &args.cwd {
        Some(cwd) => absolutize(cwd)?,
        None => std::env::current_dir()?,
    };

    let mut figment = Figment::new().merge(Serialized::defaults(BuildConfig::new(&base)));

    let config_file = match &args.config {
        Some(path) => {
            let path = base.join(path);
            if !path.is_file() {
                return Err(CliError::FileNotFound(path));
            }
            Some(path)
        }
        None => Some(base.join(DEFAULT_CONFIG_FILE)).filter(|p| p.is_file()),
    };
    if let Some(path) = &config_file {
        figment = figment.merge(Json::file(path));
    }

    figment = figment.merge(
        Env::prefixed(ENV_PREFIX)
            .map(|key| env_key_to_path(key.as_str()).into())
            .lowercase(false),
    );

    if let Some(cwd) = &args.cwd {
        figment = figment.merge(Serialized::default("cwd", absolutize(cwd)?));
    }
    if args.split {
        figment = figment.merge(Serialized::default("splitMode", true));
    }

    let mut config: BuildConfig = figment.extract().map_err(|e| CliError::InvalidConfig {
        message: e.to_string(),
        hint: format!(
            "Check {} syntax and field names (camelCase)",
            config_file
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string())
        ),
    })?;

    // A relative cwd in the file is relative to the directory it was loaded from.
    if config.cwd.is_relative() {
        config.cwd = base.join(&config.cwd);
    }

    Ok(config)
}

fn absolutize(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

/// `BROWSER__PUBLIC_PATH` -> `browser.publicPath`.
fn env_key_to_path(key: &str) -> String {
    key.split("__")
        .map(|segment| {
            let mut out = String::with_capacity(segment.len());
            for (i, word) in segment.split('_').filter(|w| !w.is_empty()).enumerate() {
                let word = word.to_ascii_lowercase();
                if i == 0 {
                    out.push_str(&word);
                } else {
                    let mut chars = word.chars();
                    if let Some(first) = chars.next() {
                        out.push(first.to_ascii_uppercase());
                        out.push_str(chars.as_str());
                    }
                }
            }
            out
        })
        .collect::<Vec<_>>()
        .join(".")
}
