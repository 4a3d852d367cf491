//! Verbatim copies from the project into the output directory.
//!
//! Each passthrough entry is a project-relative file or directory. Entries
//! under the input directory lose that prefix:
//!
//! ```text
//! src/robots.txt          →  _site/robots.txt
//! src/assets/js/app.js    →  _site/assets/js/app.js
//! CNAME                   →  _site/CNAME
//! ```
//!
//! A missing entry is logged and skipped; the rest of the build goes on.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum PassthroughError {
    #[error("Failed to copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Where `entry` lands, relative to the output directory.
pub fn output_location(entry: &Path, input_dir: &Path) -> PathBuf {
    entry.strip_prefix(input_dir).unwrap_or(entry).to_path_buf()
}

fn copy_file(from: &Path, to: &Path) -> Result<(), PassthroughError> {
    let wrap = |source| PassthroughError::Copy {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(wrap)?;
    }
    fs::copy(from, to).map_err(wrap)?;
    Ok(())
}

/// Copy every entry, returning the output paths written (relative to `output_dir`).
pub fn copy_passthrough(
    root: &Path,
    input_dir: &Path,
    output_dir: &Path,
    entries: &[PathBuf],
) -> Result<Vec<PathBuf>, PassthroughError> {
    let mut copied = Vec::new();

    for entry in entries {
        let source = root.join(entry);
        let target = output_location(entry, input_dir);

        if source.is_file() {
            copy_file(&source, &output_dir.join(&target))?;
            copied.push(target);
        } else if source.is_dir() {
            for file in WalkDir::new(&source).sort_by_file_name() {
                let file = file?;
                if !file.file_type().is_file() {
                    continue;
                }
                let Ok(rel) = file.path().strip_prefix(&source) else {
                    continue;
                };
                let dest = target.join(rel);
                copy_file(file.path(), &output_dir.join(&dest))?;
                copied.push(dest);
            }
        } else {
            warn!(path = %entry.display(), "passthrough path does not exist, skipping");
            continue;
        }
        debug!(path = %entry.display(), "copied passthrough");
    }

    Ok(copied)
}
