//! CLI output formatting.
//!
//! Output is information-first: each entity leads with its positional index
//! and identity (title or URL), with filesystem paths shown as indented
//! `Source:` context lines.
//!
//! ## Check
//!
//! ```text
//! Collections
//! posts (2 items)
//!     001 Second post → /posts/second/
//!         Source: src/posts/second.liquid
//!         Date: 2024-05-01
//! ```
//!
//! ## Build
//!
//! ```text
//! (collections as above)
//!
//! Passthrough
//!     CNAME
//!     robots.txt
//!
//! Pages
//! 001 / → index.html
//! 002 /posts/second/ → posts/second/index.html
//!
//! Images: 4 cached, 2 encoded (6 total)
//! Built 2 pages, copied 2 files
//! ```
//!
//! Each section has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout.
//! `check --json` prints [`collections_json`] instead.

use crate::cache::CacheStats;
use crate::collections::Collection;
use crate::generator::BuildReport;
use serde_json::{Value, json};

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, one: &str, many: &str) -> String {
    format!("{} {}", n, if n == 1 { one } else { many })
}

/// Format resolved collections with their items in order.
pub fn format_collections(collections: &[Collection]) -> Vec<String> {
    let mut lines = vec!["Collections".to_string()];
    for collection in collections {
        lines.push(format!(
            "{} ({})",
            collection.name,
            plural(collection.items.len(), "item", "items")
        ));
        for (i, item) in collection.items.iter().enumerate() {
            lines.push(format!(
                "{}{} {} → {}",
                indent(1),
                format_index(i + 1),
                item.title(),
                item.url
            ));
            lines.push(format!("{}Source: {}", indent(2), item.input_path.display()));
            lines.push(format!("{}Date: {}", indent(2), item.date.format("%Y-%m-%d")));
        }
    }
    lines
}

/// Format the report of a finished build.
pub fn format_build_report(report: &BuildReport, images: Option<CacheStats>) -> Vec<String> {
    let mut lines = format_collections(&report.collections);

    if !report.copied.is_empty() {
        lines.push(String::new());
        lines.push("Passthrough".to_string());
        for path in &report.copied {
            lines.push(format!("{}{}", indent(1), path.display()));
        }
    }

    if !report.pages.is_empty() {
        lines.push(String::new());
        lines.push("Pages".to_string());
        for (i, page) in report.pages.iter().enumerate() {
            lines.push(format!(
                "{} {} → {}",
                format_index(i + 1),
                page.url,
                page.output_path.display()
            ));
        }
    }

    lines.push(String::new());
    if let Some(stats) = images
        && stats.total() > 0
    {
        lines.push(format!("Images: {}", stats));
    }
    lines.push(format!(
        "Built {}, copied {}",
        plural(report.pages.len(), "page", "pages"),
        plural(report.copied.len(), "file", "files")
    ));
    lines
}

/// Collections as JSON, keyed by name, items in collection order.
pub fn collections_json(collections: &[Collection]) -> Value {
    let mut map = serde_json::Map::new();
    for collection in collections {
        let items: Vec<Value> = collection
            .items
            .iter()
            .map(|item| {
                json!({
                    "title": item.title(),
                    "url": item.url,
                    "date": item.date.format("%Y-%m-%d").to_string(),
                    "input": item.input_path.display().to_string(),
                })
            })
            .collect();
        map.insert(collection.name.clone(), Value::Array(items));
    }
    Value::Object(map)
}

/// Print collections to stdout.
pub fn print_collections(collections: &[Collection]) {
    for line in format_collections(collections) {
        println!("{}", line);
    }
}

/// Print the build report to stdout.
pub fn print_build_report(report: &BuildReport, images: Option<CacheStats>) {
    for line in format_build_report(report, images) {
        println!("{}", line);
    }
}
