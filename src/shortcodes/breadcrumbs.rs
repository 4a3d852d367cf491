//! The `breadcrumbs` shortcode.
//!
//! `{% breadcrumbs "works/020-paintings/harbour" %}` renders
//! Home › Works › Paintings › Harbour, each level linking to its
//! cumulative URL.

use super::{Shortcode, ShortcodeError, arg};
use crate::naming::display_label;
use maud::html;

/// One level of the trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crumb {
    pub label: String,
    pub url: String,
}

/// Split `path` into crumbs with cumulative URLs.
///
/// Empty segments and `.` are skipped, so `/a//b/` and `a/b` are the same
/// trail. An empty path gives an empty trail.
pub fn breadcrumbs(path: &str) -> Vec<Crumb> {
    let mut url = String::from("/");
    path.split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .map(|segment| {
            url.push_str(segment);
            url.push('/');
            Crumb {
                label: display_label(segment),
                url: url.clone(),
            }
        })
        .collect()
}

/// `<nav>` markup for `path`. Always starts at Home; the last level is
/// marked as the current page and not linked.
pub fn render_breadcrumbs(path: &str) -> String {
    let crumbs = breadcrumbs(path);
    let last = crumbs.len().checked_sub(1);

    html! {
        nav.breadcrumbs aria-label="Breadcrumb" {
            ol {
                @if crumbs.is_empty() {
                    li aria-current="page" { "Home" }
                } @else {
                    li { a href="/" { "Home" } }
                }
                @for (i, crumb) in crumbs.iter().enumerate() {
                    @if Some(i) == last {
                        li aria-current="page" { (crumb.label) }
                    } @else {
                        li { a href=(crumb.url) { (crumb.label) } }
                    }
                }
            }
        }
    }
    .into_string()
}

/// Shortcode wrapper around [`render_breadcrumbs`].
#[derive(Debug, Default)]
pub struct Breadcrumbs;

impl Shortcode for Breadcrumbs {
    fn render(&self, args: &[String]) -> Result<String, ShortcodeError> {
        Ok(render_breadcrumbs(arg(args, 0).unwrap_or("")))
    }
}
