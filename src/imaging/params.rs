//! Parameter types for image operations.
//!
//! These structs describe *what* to encode, not *how*. They sit between the
//! [`transcoder`](super::transcoder) (which decides which variants to create)
//! and the [`backend`](super::backend) (which does the pixel work), so tests
//! can swap in a recording backend without touching transcoding logic.
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (1–100). Clamped on construction.
//! - [`OutputFormat`]: The encoded formats a page can request (WebP, JPEG).
//! - [`EncodeOptions`]: Per-format encoder settings (quality, optional effort).
//! - [`ResizeParams`]: One resize + encode: source, output, dimensions, format, options.

use std::fmt;
use std::path::PathBuf;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Quality(u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

/// Encoded output format of a generated variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OutputFormat {
    Webp,
    Jpeg,
}

impl OutputFormat {
    /// File extension for generated files.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Webp => "webp",
            OutputFormat::Jpeg => "jpeg",
        }
    }

    /// MIME type for `<source type=...>`.
    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Webp => "image/webp",
            OutputFormat::Jpeg => "image/jpeg",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Encoder settings for one output format.
///
/// `effort` is the WebP compression effort (0 = fastest, 6 = smallest);
/// JPEG ignores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EncodeOptions {
    pub quality: Quality,
    pub effort: Option<u8>,
}

impl EncodeOptions {
    pub fn with_quality(quality: u32) -> Self {
        Self {
            quality: Quality::new(quality),
            effort: None,
        }
    }

    pub fn effort(mut self, effort: u8) -> Self {
        self.effort = Some(effort);
        self
    }
}

/// Parameters for a single resize + encode.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
    pub format: OutputFormat,
    pub options: EncodeOptions,
}
