//! Responsive variant generation.
//!
//! A [`Transcoder`] turns one source image plus a [`TranscodeRequest`] into a
//! set of encoded variants, one per (format, width) pair, and reports their
//! public URLs and pixel dimensions. Shortcodes only ever see this trait.
//!
//! [`ImageTranscoder`] is the production implementation. Per request it:
//!
//! 1. reads the source dimensions through the [`ImageBackend`],
//! 2. drops widths wider than the source (see
//!    [`calculate_variant_sizes`](super::calculations::calculate_variant_sizes)),
//! 3. for each format and width, reuses an existing content-addressed output
//!    file or encodes a new one (see [`crate::cache`]).
//!
//! New files are encoded into a temporary file inside the output directory
//! and renamed into place, so two pages rendering the same image at the same
//! time never read a half-written variant.

use super::backend::{BackendError, ImageBackend};
use super::calculations::calculate_variant_sizes;
use super::params::{EncodeOptions, OutputFormat, ResizeParams};
use crate::cache::{self, CacheStats};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum TranscodeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image processing failed: {0}")]
    Backend(#[from] BackendError),
    #[error("Source image not found: {0}")]
    SourceNotFound(PathBuf),
    #[error("Transcode request for {0} lists no widths or no formats")]
    EmptyRequest(PathBuf),
}

/// What to generate for one source image.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscodeRequest {
    /// Target widths. Order does not matter; results are ascending.
    pub widths: Vec<u32>,
    pub formats: Vec<OutputFormat>,
    /// Filesystem directory the variants are written to.
    pub output_dir: PathBuf,
    /// Public URL prefix the file names are appended to.
    pub url_path: String,
    pub webp: EncodeOptions,
    pub jpeg: EncodeOptions,
}

impl TranscodeRequest {
    /// Encoder settings for `format`.
    pub fn options_for(&self, format: OutputFormat) -> EncodeOptions {
        match format {
            OutputFormat::Webp => self.webp,
            OutputFormat::Jpeg => self.jpeg,
        }
    }
}

/// One generated file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    pub url: String,
    pub width: u32,
    pub height: u32,
}

/// Generated variants per format, each list ascending by width.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranscodeResult {
    variants: BTreeMap<OutputFormat, Vec<Variant>>,
}

impl TranscodeResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the variants for a format, sorting them ascending by width.
    pub fn insert(&mut self, format: OutputFormat, mut variants: Vec<Variant>) {
        variants.sort_by_key(|v| v.width);
        self.variants.insert(format, variants);
    }

    /// Variants for `format`; empty if the format was not requested.
    pub fn get(&self, format: OutputFormat) -> &[Variant] {
        self.variants.get(&format).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Produces encoded variants of a source image.
pub trait Transcoder: Send + Sync {
    fn transcode(
        &self,
        source: &Path,
        request: &TranscodeRequest,
    ) -> Result<TranscodeResult, TranscodeError>;
}

/// Join a URL prefix and a file name with exactly one `/` between them.
pub fn join_url(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        return name.to_string();
    }
    format!(
        "{}/{}",
        prefix.trim_end_matches('/'),
        name.trim_start_matches('/')
    )
}

/// Backend-driven transcoder with an on-disk, content-addressed cache.
pub struct ImageTranscoder<B: ImageBackend> {
    backend: B,
    stats: Mutex<CacheStats>,
}

impl<B: ImageBackend> ImageTranscoder<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            stats: Mutex::new(CacheStats::default()),
        }
    }

    /// Cache hits and encodes since construction.
    pub fn cache_stats(&self) -> CacheStats {
        self.stats.lock().map(|s| *s).unwrap_or_default()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn record(&self, hit: bool) {
        if let Ok(mut stats) = self.stats.lock() {
            if hit {
                stats.hit();
            } else {
                stats.miss();
            }
        }
    }

    /// Encode one variant into `final_path` via a temp file in the same directory.
    fn encode_variant(
        &self,
        source: &Path,
        final_path: &Path,
        width: u32,
        height: u32,
        format: OutputFormat,
        options: EncodeOptions,
    ) -> Result<(), TranscodeError> {
        let dir = final_path.parent().unwrap_or(Path::new("."));
        let tmp = tempfile::Builder::new()
            .prefix(".variant-")
            .suffix(&format!(".{}", format.extension()))
            .tempfile_in(dir)?;

        self.backend.resize(&ResizeParams {
            source: source.to_path_buf(),
            output: tmp.path().to_path_buf(),
            width,
            height,
            format,
            options,
        })?;

        tmp.persist(final_path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl<B: ImageBackend> Transcoder for ImageTranscoder<B> {
    fn transcode(
        &self,
        source: &Path,
        request: &TranscodeRequest,
    ) -> Result<TranscodeResult, TranscodeError> {
        if request.widths.is_empty() || request.formats.is_empty() {
            return Err(TranscodeError::EmptyRequest(source.to_path_buf()));
        }
        if !source.is_file() {
            return Err(TranscodeError::SourceNotFound(source.to_path_buf()));
        }

        let dims = self.backend.identify(source)?;
        let sizes = calculate_variant_sizes((dims.width, dims.height), &request.widths);
        let source_hash = cache::hash_file(source)?;

        std::fs::create_dir_all(&request.output_dir)?;

        let mut result = TranscodeResult::new();
        for &format in &request.formats {
            let options = request.options_for(format);
            let mut variants = Vec::with_capacity(sizes.len());

            for size in &sizes {
                let params_hash = cache::hash_variant_params(size.width, format, &options);
                let name = cache::variant_file_name(&source_hash, &params_hash, size.width, format);
                let path = request.output_dir.join(&name);

                let hit = path.is_file();
                if !hit {
                    self.encode_variant(source, &path, size.width, size.height, format, options)?;
                }
                self.record(hit);
                debug!(
                    source = %source.display(),
                    %format,
                    width = size.width,
                    cached = hit,
                    "variant ready"
                );

                variants.push(Variant {
                    url: join_url(&request.url_path, &name),
                    width: size.width,
                    height: size.height,
                });
            }
            result.insert(format, variants);
        }

        Ok(result)
    }
}
