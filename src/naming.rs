//! Turning path segments into human-readable labels.
//!
//! Content files and directories may carry an ordering prefix (`NNN-`) and
//! use dashes or underscores as word separators:
//!
//! - `020-selected-works` → "Selected works"
//! - `hello_world.liquid` → "Hello world"
//! - `2024` → "2024"
//!
//! Breadcrumb labels are built from these rules.

/// Remove an `NNN-` ordering prefix (`020-selected-works` → `selected-works`).
///
/// A bare number (`"2024"`) counts as a name, not a prefix, since year
/// directories are common in blog URLs. So does a prefix with nothing after it.
pub fn strip_order_prefix(segment: &str) -> &str {
    match segment.split_once('-') {
        Some((prefix, rest))
            if !prefix.is_empty()
                && prefix.chars().all(|c| c.is_ascii_digit())
                && !rest.is_empty() =>
        {
            rest
        }
        _ => segment,
    }
}

/// Drop a trailing file extension (`hello.liquid` → `hello`).
///
/// Leading dots are kept (`.well-known` stays as is).
pub fn strip_extension(segment: &str) -> &str {
    match segment.rfind('.') {
        Some(0) | None => segment,
        Some(pos) => &segment[..pos],
    }
}

/// Human-readable label for a path segment.
pub fn display_label(segment: &str) -> String {
    let spaced = strip_order_prefix(strip_extension(segment)).replace(['-', '_'], " ");
    let trimmed = spaced.trim();

    let mut chars = trimmed.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
