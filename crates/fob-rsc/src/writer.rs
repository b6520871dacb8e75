//! Final placeholder substitution and persistence of one target's output.
//!
//! Every file is rendered before anything touches the disk, so a placeholder
//! or path error aborts the target with nothing written. Files are written to
//! a `.tmp` sibling and renamed into place; existing files are overwritten.

use std::fs;
use std::path::{Path, PathBuf};

use path_clean::PathClean;
use rustc_hash::FxHashSet;
use tracing::debug;

use crate::manifest::{BuildManifest, OutputContents};
use crate::placeholder::PlaceholderValues;
use crate::{Error, Result};

/// Writes a [`BuildManifest`] under its target's output directory.
#[derive(Debug)]
pub struct OutputWriter<'a> {
    out_dir: PathBuf,
    values: &'a PlaceholderValues,
}

impl<'a> OutputWriter<'a> {
    pub fn new(out_dir: impl AsRef<Path>, values: &'a PlaceholderValues) -> Self {
        Self {
            out_dir: out_dir.as_ref().clean(),
            values,
        }
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Substitute and write every output file. Returns the number written.
    pub fn write(&self, manifest: &BuildManifest) -> Result<usize> {
        self.render(manifest)?.write()
    }

    /// Validate paths and substitute placeholders for every file without
    /// touching the disk.
    pub fn render(&self, manifest: &BuildManifest) -> Result<RenderedOutput> {
        let files = manifest
            .outputs
            .iter()
            .map(|file| {
                let path = validate_output_path(&self.out_dir, &file.path)?;
                let bytes = match &file.contents {
                    OutputContents::Text(text) => {
                        self.values.substitute(text, &path)?.into_bytes()
                    }
                    OutputContents::Binary(bytes) => bytes.clone(),
                };
                Ok((path, bytes))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(RenderedOutput {
            out_dir: self.out_dir.clone(),
            files,
        })
    }
}

/// Fully substituted output, ready to be written.
#[derive(Debug, Clone)]
pub struct RenderedOutput {
    out_dir: PathBuf,
    files: Vec<(PathBuf, Vec<u8>)>,
}

impl RenderedOutput {
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn contents(&self, path: &Path) -> Option<&[u8]> {
        self.files
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, bytes)| bytes.as_slice())
    }

    /// Write every file, creating each parent directory once.
    pub fn write(&self) -> Result<usize> {
        let mut visited_dirs: FxHashSet<PathBuf> = FxHashSet::default();
        let mut written = 0;

        for (path, bytes) in &self.files {
            if let Some(parent) = path.parent() {
                if visited_dirs.insert(parent.to_path_buf()) {
                    fs::create_dir_all(parent).map_err(|e| {
                        Error::WriteFailure(format!(
                            "Failed to create directory '{}': {}",
                            parent.display(),
                            e
                        ))
                    })?;
                }
            }

            if let Err(e) = write_file_atomic(path, bytes) {
                debug!(
                    "[fob-rsc] write failed after {} files in {}",
                    written,
                    self.out_dir.display()
                );
                return Err(e);
            }
            debug!("[fob-rsc] wrote {}", path.display());
            written += 1;
        }

        Ok(written)
    }
}

/// Ensure `path` stays inside `base_dir` once normalized.
///
/// Relative paths are taken relative to `base_dir`.
fn validate_output_path(base_dir: &Path, path: &Path) -> Result<PathBuf> {
    if path.as_os_str().to_string_lossy().contains('\0') {
        return Err(Error::InvalidOutputPath(
            "Filename contains null byte".to_string(),
        ));
    }

    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    };
    let cleaned = joined.clean();

    if !cleaned.starts_with(base_dir) || cleaned == base_dir {
        return Err(Error::InvalidOutputPath(format!(
            "'{}' escapes output directory '{}'",
            path.display(),
            base_dir.display()
        )));
    }

    Ok(cleaned)
}

fn write_file_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut temp = path.as_os_str().to_owned();
    temp.push(".tmp");
    let temp = PathBuf::from(temp);

    fs::write(&temp, bytes).map_err(|e| {
        Error::WriteFailure(format!("Failed to write '{}': {}", temp.display(), e))
    })?;

    if let Err(e) = fs::rename(&temp, path) {
        let _ = fs::remove_file(&temp);
        return Err(Error::WriteFailure(format!(
            "Failed to move '{}' into place: {}",
            path.display(),
            e
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_output_path_accepts_nested() {
        let base = Path::new("/out");
        assert_eq!(
            validate_output_path(base, Path::new("/out/chunks/a.js")).unwrap(),
            PathBuf::from("/out/chunks/a.js")
        );
        assert_eq!(
            validate_output_path(base, Path::new("b.js")).unwrap(),
            PathBuf::from("/out/b.js")
        );
    }

    #[test]
    fn test_validate_output_path_rejects_traversal() {
        let base = Path::new("/out");
        assert!(validate_output_path(base, Path::new("../etc/passwd")).is_err());
        assert!(validate_output_path(base, Path::new("/out/../secret.js")).is_err());
        assert!(validate_output_path(base, Path::new("/elsewhere/a.js")).is_err());
        assert!(validate_output_path(base, Path::new("/out")).is_err());
    }
}
