//! The `image` shortcode: responsive `<picture>` markup with a blurred placeholder.
//!
//! `{% image "tree.jpg", "A tree at dusk", "large" %}` produces two transcodes
//! of `src/assets/images/source/tree.jpg`:
//!
//! - **full size**: the preset's widths, as WebP and JPEG,
//! - **placeholder**: one tiny low-quality WebP, used as the CSS background
//!   of the `<picture>` until the real image has loaded.
//!
//! The two requests are independent and run side by side on the rayon pool.
//!
//! The `class` attribute on `<picture>` and `<img>` is the resolved preset
//! name, not the caller's text: `"Large"` or `"hero"` render as `class="regular"`
//! because neither is a preset name, so the stylesheet always sees one of the
//! four preset classes.
//! Output (with whitespace added):
//!
//! ```html
//! <picture class="large" style="background: url('…/lqip/3f…-20.webp') center/cover no-repeat;">
//!   <source type="image/webp" srcset="…-1010.webp 1010w, …" sizes="…">
//!   <source type="image/jpeg" srcset="…-1010.jpeg 1010w, …" sizes="…">
//!   <img src="…-1010.jpeg" width="1600" height="1067" alt="A tree at dusk"
//!        loading="lazy" decoding="async" class="large" style="background: none;">
//! </picture>
//! ```

use super::{Shortcode, ShortcodeError, arg};
use crate::config::SiteConfig;
use crate::imaging::{
    EncodeOptions, OutputFormat, TranscodeRequest, TranscodeResult, Transcoder, Variant, join_url,
};
use crate::preset::Preset;
use maud::html;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Resolved image settings: config values with paths anchored at the project root.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageSettings {
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
    pub url_path: String,
    pub webp: EncodeOptions,
    pub jpeg: EncodeOptions,
    pub placeholder_width: u32,
    pub placeholder: EncodeOptions,
    pub placeholder_subdir: String,
}

impl ImageSettings {
    pub fn from_config(config: &SiteConfig, root: &Path) -> Self {
        let images = &config.images;
        Self {
            source_dir: root.join(&images.source_dir),
            output_dir: config.image_output_dir(root),
            url_path: images.url_path.clone(),
            webp: EncodeOptions::with_quality(images.webp_quality).effort(images.webp_effort),
            jpeg: EncodeOptions::with_quality(images.jpeg_quality),
            placeholder_width: config.placeholder.width,
            placeholder: EncodeOptions::with_quality(config.placeholder.quality),
            placeholder_subdir: config.placeholder.subdir.clone(),
        }
    }

    /// Full-size request: every preset width, WebP and JPEG.
    pub fn full_request(&self, preset: Preset) -> TranscodeRequest {
        TranscodeRequest {
            widths: preset.widths().to_vec(),
            formats: vec![OutputFormat::Webp, OutputFormat::Jpeg],
            output_dir: self.output_dir.clone(),
            url_path: self.url_path.clone(),
            webp: self.webp,
            jpeg: self.jpeg,
        }
    }

    /// Placeholder request: a single tiny WebP in the placeholder subdirectory.
    pub fn placeholder_request(&self) -> TranscodeRequest {
        TranscodeRequest {
            widths: vec![self.placeholder_width],
            formats: vec![OutputFormat::Webp],
            output_dir: self.output_dir.join(&self.placeholder_subdir),
            url_path: format!("{}/", join_url(&self.url_path, &self.placeholder_subdir)),
            webp: self.placeholder,
            jpeg: self.placeholder,
        }
    }
}

/// `srcset` value: `"{url} {width}w"` entries joined by `", "`.
pub fn srcset(variants: &[Variant]) -> String {
    variants
        .iter()
        .map(|v| format!("{} {}w", v.url, v.width))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Build the `<picture>` element from the two transcode results.
pub fn compose_markup(
    full: &TranscodeResult,
    placeholder: &TranscodeResult,
    alt: &str,
    preset: Preset,
) -> Result<String, ShortcodeError> {
    let webp = full.get(OutputFormat::Webp);
    let jpeg = full.get(OutputFormat::Jpeg);

    let lqip = placeholder
        .get(OutputFormat::Webp)
        .first()
        .ok_or(ShortcodeError::MissingVariants(OutputFormat::Webp))?;
    let largest = webp
        .last()
        .ok_or(ShortcodeError::MissingVariants(OutputFormat::Webp))?;
    let fallback = jpeg
        .first()
        .ok_or(ShortcodeError::MissingVariants(OutputFormat::Jpeg))?;

    let background = format!("background: url('{}') center/cover no-repeat;", lqip.url);
    let class = preset.name();

    let markup = html! {
        picture class=(class) style=(background) {
            source type=(OutputFormat::Webp.mime_type()) srcset=(srcset(webp)) sizes=(preset.sizes());
            source type=(OutputFormat::Jpeg.mime_type()) srcset=(srcset(jpeg)) sizes=(preset.sizes());
            img src=(fallback.url)
                width=(largest.width)
                height=(largest.height)
                alt=(alt)
                loading="lazy"
                decoding="async"
                class=(class)
                style="background: none;";
        }
    };
    Ok(markup.into_string())
}

/// The `image` shortcode.
pub struct ResponsiveImage {
    transcoder: Arc<dyn Transcoder>,
    settings: ImageSettings,
}

impl ResponsiveImage {
    pub fn new(transcoder: Arc<dyn Transcoder>, settings: ImageSettings) -> Self {
        Self {
            transcoder,
            settings,
        }
    }

    /// Render `src` (relative to the source-images directory) at `class`'s preset.
    pub fn render_image(&self, src: &str, alt: &str, class: &str) -> Result<String, ShortcodeError> {
        let preset = Preset::from_class_name(class);
        let source = self.settings.source_dir.join(src);
        let full_request = self.settings.full_request(preset);
        let placeholder_request = self.settings.placeholder_request();

        let (full, placeholder) = rayon::join(
            || self.transcoder.transcode(&source, &full_request),
            || self.transcoder.transcode(&source, &placeholder_request),
        );

        compose_markup(&full?, &placeholder?, alt, preset)
    }
}

impl Shortcode for ResponsiveImage {
    fn render(&self, args: &[String]) -> Result<String, ShortcodeError> {
        let src = arg(args, 0).ok_or(ShortcodeError::MissingArgument {
            shortcode: "image",
            argument: "src",
        })?;
        let alt = arg(args, 1).unwrap_or("");
        let class = arg(args, 2).unwrap_or(Preset::default().name());
        self.render_image(src, alt, class)
    }
}
