//! Pure Rust image processing backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP) | `image` crate decoders, format sniffed from content |
//! | Resize | `image::DynamicImage::resize_exact` with `Lanczos3` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` with the requested quality |
//! | Encode → WebP | `webp::Encoder::encode_advanced` (libwebp, lossy) with the requested quality and effort |
//!
//! The `image` crate's own WebP encoder is lossless only, so lossy WebP goes
//! through libwebp. Effort maps to libwebp's `method` (0-6, default 4).

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::{EncodeOptions, OutputFormat, ResizeParams};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use std::io::BufWriter;
use std::path::Path;

/// Pure Rust backend using the `image` crate ecosystem.
#[derive(Debug, Default)]
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

/// Load and decode an image from disk.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })
}

/// libwebp's `method` when the request carries no effort.
const DEFAULT_WEBP_METHOD: i32 = 4;

/// Lossy WebP bytes for `img`.
fn encode_webp(img: &DynamicImage, options: &EncodeOptions) -> Result<Vec<u8>, BackendError> {
    // libwebp takes 8-bit RGB or RGBA only
    let pixels = if img.color().has_alpha() {
        DynamicImage::ImageRgba8(img.to_rgba8())
    } else {
        DynamicImage::ImageRgb8(img.to_rgb8())
    };
    let encoder = webp::Encoder::from_image(&pixels)
        .map_err(|e| BackendError::ProcessingFailed(format!("WebP encode failed: {}", e)))?;

    let mut config = webp::WebPConfig::new().map_err(|_| {
        BackendError::ProcessingFailed("WebP encoder config could not be initialised".into())
    })?;
    config.lossless = 0;
    config.quality = options.quality.value() as f32;
    config.method = options
        .effort
        .map_or(DEFAULT_WEBP_METHOD, |effort| i32::from(effort.min(6)));

    let encoded = encoder
        .encode_advanced(&config)
        .map_err(|e| BackendError::ProcessingFailed(format!("WebP encode failed: {:?}", e)))?;
    Ok(encoded.to_vec())
}

/// Encode `img` into `params.output` using the requested format.
fn save_image(img: &DynamicImage, params: &ResizeParams) -> Result<(), BackendError> {
    match params.format {
        OutputFormat::Jpeg => {
            let writer = BufWriter::new(std::fs::File::create(&params.output)?);
            // JPEG has no alpha channel
            let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
            let encoder =
                JpegEncoder::new_with_quality(writer, params.options.quality.value() as u8);
            rgb.write_with_encoder(encoder)
                .map_err(|e| BackendError::ProcessingFailed(format!("JPEG encode failed: {}", e)))
        }
        OutputFormat::Webp => {
            let bytes = encode_webp(img, &params.options)?;
            std::fs::write(&params.output, bytes)?;
            Ok(())
        }
    }
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) = ImageReader::open(path)?
            .with_guessed_format()?
            .into_dimensions()
            .map_err(|e| {
                BackendError::ProcessingFailed(format!(
                    "Failed to read dimensions of {}: {}",
                    path.display(),
                    e
                ))
            })?;
        Ok(Dimensions { width, height })
    }

    fn resize(&self, params: &ResizeParams) -> Result<(), BackendError> {
        let img = load_image(&params.source)?;
        let resized = img.resize_exact(params.width, params.height, FilterType::Lanczos3);
        save_image(&resized, params)
    }
}
