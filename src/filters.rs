//! Content filters applied to `{% filter name %}…{% endfilter %}` blocks.
//!
//! Only `cssmin` ships by default, used to inline critical CSS:
//!
//! ```text
//! <style>{% filter cssmin %}
//!   body { margin: 0 auto; color: #ff0000; }
//! {% endfilter %}</style>
//! ```

use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("CSS minification failed: {0}")]
    Css(String),
}

/// A text-to-text transformation.
pub trait Filter: Send + Sync {
    fn apply(&self, input: &str) -> Result<String, FilterError>;
}

impl<F> Filter for F
where
    F: Fn(&str) -> Result<String, FilterError> + Send + Sync,
{
    fn apply(&self, input: &str) -> Result<String, FilterError> {
        self(input)
    }
}

/// Minify a stylesheet.
pub fn minify_css(css: &str) -> Result<String, FilterError> {
    let mut sheet = StyleSheet::parse(css, ParserOptions::default())
        .map_err(|e| FilterError::Css(e.to_string()))?;
    sheet
        .minify(MinifyOptions::default())
        .map_err(|e| FilterError::Css(e.to_string()))?;
    let printed = sheet
        .to_css(PrinterOptions {
            minify: true,
            ..PrinterOptions::default()
        })
        .map_err(|e| FilterError::Css(e.to_string()))?;
    Ok(printed.code)
}
