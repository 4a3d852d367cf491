//! Content-addressed naming for generated image variants.
//!
//! Encoding is the slow part of a build, and the same image is usually
//! referenced by several pages and rebuilt many times over a site's life.
//! Every variant is therefore written under a name derived from *what* it
//! is, not *where* it is used:
//!
//! ```text
//! {id}-{width}.{ext}        e.g. 3f9a1c02be-800.webp
//! ```
//!
//! - **`source_hash`**: SHA-256 of the source file contents. Content-based
//!   rather than mtime-based so it survives `git checkout` (which resets
//!   modification times).
//! - **`params_hash`**: SHA-256 of the encoding parameters (width, format,
//!   quality, effort). Changing any config value yields a new name.
//! - **`id`**: the first 10 hex characters of SHA-256 over both hashes.
//!
//! If a file with the computed name already exists in the output directory,
//! the encode is skipped. Stale variants are never deleted; wipe the output
//! directory to reclaim space.

use crate::imaging::{EncodeOptions, OutputFormat};
use sha2::{Digest, Sha256};
use std::fmt;
use std::io;
use std::path::Path;

/// Length of the hex id prefix in variant file names.
const ID_LEN: usize = 10;

/// SHA-256 hash of a file's contents, returned as a hex string.
pub fn hash_file(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    let digest = Sha256::digest(&bytes);
    Ok(format!("{:x}", digest))
}

/// SHA-256 hash of the encoding parameters for one variant.
pub fn hash_variant_params(width: u32, format: OutputFormat, options: &EncodeOptions) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"variant\0");
    hasher.update(width.to_le_bytes());
    hasher.update(format.extension().as_bytes());
    hasher.update(b"\0");
    hasher.update(options.quality.value().to_le_bytes());
    match options.effort {
        Some(effort) => {
            hasher.update(b"\x01");
            hasher.update([effort]);
        }
        None => hasher.update(b"\x00"),
    }
    format!("{:x}", hasher.finalize())
}

/// File name for a variant: `{id}-{width}.{ext}`.
pub fn variant_file_name(source_hash: &str, params_hash: &str, width: u32, format: OutputFormat) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source_hash.as_bytes());
    hasher.update(b":");
    hasher.update(params_hash.as_bytes());
    let id = format!("{:x}", hasher.finalize());
    format!("{}-{}.{}", &id[..ID_LEN], width, format.extension())
}

/// Summary of cache performance for a build run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u32,
    pub misses: u32,
}

impl CacheStats {
    pub fn hit(&mut self) {
        self.hits += 1;
    }

    pub fn miss(&mut self) {
        self.misses += 1;
    }

    pub fn total(&self) -> u32 {
        self.hits + self.misses
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hits > 0 {
            write!(
                f,
                "{} cached, {} encoded ({} total)",
                self.hits,
                self.misses,
                self.total()
            )
        } else {
            write!(f, "{} encoded", self.misses)
        }
    }
}
