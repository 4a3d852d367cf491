//! Shortcode and filter tag expansion.
//!
//! Pages are plain text with embedded tags:
//!
//! ```text
//! {% image "harbour.jpg", "Harbour at dawn", "large" %}
//! {% breadcrumbs "works/paintings" %}
//! <style>{% filter cssmin %} … {% endfilter %}</style>
//! ```
//!
//! Tag names found in the [`ExtensionTable`] are replaced by their output.
//! Any other tag (`{% for %}`, `{% if %}`, `{% include %}`) is left in place
//! untouched. Filter blocks nest; their bodies are expanded before the filter
//! runs.
//!
//! Liquid whitespace control works on the tags expanded here: `{%-` drops
//! the whitespace before the tag and `-%}` the whitespace after it.
//!
//! Arguments are double- or single-quoted strings (with `\` escapes) or bare
//! words, separated by commas and/or whitespace.

use crate::filters::FilterError;
use crate::registry::ExtensionTable;
use crate::shortcodes::ShortcodeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TagError {
    #[error("line {line}: tag is never closed with `%}}`")]
    Unterminated { line: usize },
    #[error("line {line}: `{{% filter {name} %}}` has no matching `{{% endfilter %}}`")]
    UnterminatedFilter { name: String, line: usize },
    #[error("line {line}: `{{% endfilter %}}` without an open filter")]
    UnexpectedEndFilter { line: usize },
    #[error("line {line}: unknown filter `{name}`")]
    UnknownFilter { name: String, line: usize },
    #[error("line {line}: {message}")]
    BadArguments { line: usize, message: String },
    #[error("line {line}: shortcode `{name}` failed: {source}")]
    Shortcode {
        name: String,
        line: usize,
        source: ShortcodeError,
    },
    #[error("line {line}: filter `{name}` failed: {source}")]
    Filter {
        name: String,
        line: usize,
        source: FilterError,
    },
}

/// Expand every known tag in `source`.
pub fn expand(source: &str, table: &ExtensionTable) -> Result<String, TagError> {
    let mut expander = Expander {
        src: source,
        table,
        pos: 0,
    };
    expander.expand_block(None)
}

/// Split tag arguments into values.
pub fn parse_args(input: &str) -> Result<Vec<String>, String> {
    let mut args = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c == ',' || c.is_whitespace() {
            chars.next();
            continue;
        }
        if c == '"' || c == '\'' {
            chars.next();
            let mut value = String::new();
            let mut closed = false;
            while let Some(ch) = chars.next() {
                match ch {
                    '\\' => match chars.next() {
                        Some(escaped) => value.push(escaped),
                        None => break,
                    },
                    _ if ch == c => {
                        closed = true;
                        break;
                    }
                    _ => value.push(ch),
                }
            }
            if !closed {
                return Err(format!("unterminated string starting with {c}"));
            }
            args.push(value);
        } else {
            let mut value = String::new();
            while let Some(&ch) = chars.peek() {
                if ch == ',' || ch.is_whitespace() {
                    break;
                }
                value.push(ch);
                chars.next();
            }
            args.push(value);
        }
    }
    Ok(args)
}

fn line_at(src: &str, offset: usize) -> usize {
    src[..offset].matches('\n').count() + 1
}

struct Expander<'a> {
    src: &'a str,
    table: &'a ExtensionTable,
    pos: usize,
}

impl Expander<'_> {
    /// Expand until end of input, or until the `endfilter` closing `open`.
    fn expand_block(&mut self, open: Option<(&str, usize)>) -> Result<String, TagError> {
        let mut out = String::new();

        let src = self.src;
        loop {
            let rest = &src[self.pos..];
            let Some(start) = rest.find("{%") else {
                if let Some((name, line)) = open {
                    return Err(TagError::UnterminatedFilter {
                        name: name.to_string(),
                        line,
                    });
                }
                out.push_str(rest);
                self.pos = src.len();
                return Ok(out);
            };
            out.push_str(&rest[..start]);

            let tag_start = self.pos + start;
            let line = line_at(src, tag_start);
            let inner_start = tag_start + 2;
            let Some(len) = src[inner_start..].find("%}") else {
                return Err(TagError::Unterminated { line });
            };
            let tag_end = inner_start + len + 2;
            let raw = &src[inner_start..inner_start + len];
            self.pos = tag_end;

            let trim_before = raw.starts_with('-');
            let inner = raw.strip_prefix('-').unwrap_or(raw);
            let trim_after = inner.ends_with('-');
            let inner = inner.strip_suffix('-').unwrap_or(inner).trim();

            let (name, args) = inner
                .split_once(char::is_whitespace)
                .map(|(n, a)| (n, a.trim()))
                .unwrap_or((inner, ""));

            let handled = matches!(name, "filter" | "endfilter") || self.table.shortcode(name).is_some();
            if handled {
                if trim_before {
                    out.truncate(out.trim_end().len());
                }
                if trim_after {
                    let rest = &src[self.pos..];
                    self.pos += rest.len() - rest.trim_start().len();
                }
            }

            match name {
                "filter" => {
                    let body = self.expand_block(Some((args, line)))?;
                    let filter = self.table.filter(args).ok_or_else(|| TagError::UnknownFilter {
                        name: args.to_string(),
                        line,
                    })?;
                    let filtered = filter.apply(&body).map_err(|source| TagError::Filter {
                        name: args.to_string(),
                        line,
                        source,
                    })?;
                    out.push_str(&filtered);
                }
                "endfilter" => {
                    return match open {
                        Some(_) => Ok(out),
                        None => Err(TagError::UnexpectedEndFilter { line }),
                    };
                }
                _ => match self.table.shortcode(name) {
                    Some(shortcode) => {
                        let values = parse_args(args)
                            .map_err(|message| TagError::BadArguments { line, message })?;
                        let rendered =
                            shortcode
                                .render(&values)
                                .map_err(|source| TagError::Shortcode {
                                    name: name.to_string(),
                                    line,
                                    source,
                                })?;
                        out.push_str(&rendered);
                    }
                    None => out.push_str(&src[tag_start..tag_end]),
                },
            }
        }
    }
}
