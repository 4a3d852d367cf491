//! Shortcodes: named functions that turn tag arguments into HTML.
//!
//! A page writes `{% image "tree.jpg", "A tree", "large" %}` and the tag
//! expander calls the registered `image` shortcode with
//! `["tree.jpg", "A tree", "large"]`. The returned string replaces the tag.
//!
//! | Name | Implementation |
//! |---|---|
//! | `image` | [`ResponsiveImage`]: `<picture>` with WebP/JPEG srcsets and a blurred placeholder |
//! | `breadcrumbs` | [`Breadcrumbs`]: `<nav>` trail for a URL path |

pub mod breadcrumbs;
pub mod image;

pub use breadcrumbs::{Breadcrumbs, Crumb, breadcrumbs, render_breadcrumbs};
pub use image::{ImageSettings, ResponsiveImage, compose_markup, srcset};

use crate::imaging::{OutputFormat, TranscodeError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShortcodeError {
    #[error("Image transcode failed: {0}")]
    Transcode(#[from] TranscodeError),
    #[error("Transcoder returned no {0} variants")]
    MissingVariants(OutputFormat),
    #[error("Shortcode `{shortcode}` requires argument `{argument}`")]
    MissingArgument {
        shortcode: &'static str,
        argument: &'static str,
    },
}

/// A callable that renders tag arguments to markup.
pub trait Shortcode: Send + Sync {
    fn render(&self, args: &[String]) -> Result<String, ShortcodeError>;
}

impl<F> Shortcode for F
where
    F: Fn(&[String]) -> Result<String, ShortcodeError> + Send + Sync,
{
    fn render(&self, args: &[String]) -> Result<String, ShortcodeError> {
        self(args)
    }
}

/// Positional argument `index`, or `None` if absent.
pub(crate) fn arg(args: &[String], index: usize) -> Option<&str> {
    args.get(index).map(String::as_str)
}
