//! Image processing, pure Rust.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::ImageReader::into_dimensions` |
//! | **Resize** | Lanczos3 via `resize_exact` |
//! | **Encode → JPEG** | `JpegEncoder` with quality |
//! | **Encode → WebP** | `webp` crate (libwebp, lossy, quality + method) |
//!
//! The module is split into:
//! - **Calculations**: pure functions for variant dimension math
//! - **Parameters**: data structures describing one encode
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Transcoder**: [`Transcoder`] trait + cached [`ImageTranscoder`]

pub mod backend;
mod calculations;
mod params;
pub mod rust_backend;
pub mod transcoder;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{VariantSize, calculate_variant_sizes, scale_to_width};
pub use params::{EncodeOptions, OutputFormat, Quality, ResizeParams};
pub use rust_backend::RustBackend;
pub use transcoder::{
    ImageTranscoder, TranscodeError, TranscodeRequest, TranscodeResult, Transcoder, Variant,
    join_url,
};
