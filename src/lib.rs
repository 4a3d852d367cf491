//! # Simple Folio
//!
//! A small static site builder for a personal portfolio and blog. It turns a
//! `src/` tree of pages into `_site/`, with:
//!
//! - **collections** (`posts`, `works`) selected by glob and sorted newest first,
//! - a **`cssmin` filter** for inline stylesheets,
//! - **passthrough copies** for favicons, scripts, raw images, `robots.txt` and `CNAME`,
//! - an **`image` shortcode** emitting `<picture>` markup with WebP/JPEG srcsets
//!   and a blurred low-quality placeholder,
//! - a **`breadcrumbs` shortcode**.
//!
//! # Build Flow
//!
//! ```text
//! site.toml ─► SiteConfig ─► ExtensionTable ─► Generator::build
//!                                                │
//!                      passthrough ◄─────────────┤
//!                      collections ◄─────────────┤
//!                      pages (tags) ◄────────────┘
//!                         │
//!                         └─ {% image %} ─► Transcoder ─► ImageBackend
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `site.toml` loading, validation, and the documented stock config |
//! | [`registry`] | [`ExtensionTable`](registry::ExtensionTable): collections, filters, shortcodes, passthrough paths |
//! | [`generator`] | Runs a build against a table and reports what it wrote |
//! | [`collections`] | Template discovery, front matter, permalinks, newest-first sorting |
//! | [`tags`] | `{% name args %}` and `{% filter %}` block expansion |
//! | [`shortcodes`] | `image` and `breadcrumbs` |
//! | [`filters`] | `cssmin` |
//! | [`passthrough`] | Verbatim file and directory copies |
//! | [`preset`] | Image size presets (`small`, `regular`, `medium`, `large`) |
//! | [`imaging`] | Pure-Rust decode/resize/encode and the cached transcoder |
//! | [`cache`] | Content-addressed variant names and cache statistics |
//! | [`naming`] | Path segment → human-readable label |
//! | [`output`] | CLI report formatting |
//! | [`logging`] | `tracing` subscriber setup |
//!
//! # Design Decisions
//!
//! ## Explicit Extension Table
//!
//! Extensions are values in a table passed to the generator, not global
//! registrations. Tests build small tables with closures; the binary builds
//! the full one with [`registry::ExtensionTable::site`].
//!
//! ## Content-Addressed Variants
//!
//! Generated image names derive from the source bytes and encoder settings,
//! so unchanged images are never re-encoded and stale names never collide.
//! See [`cache`].
//!
//! ## Maud for Markup
//!
//! Shortcode HTML is built with [Maud](https://maud.lambda.xyz/), so every
//! interpolated value (alt text, URLs, labels) is escaped.

pub mod cache;
pub mod collections;
pub mod config;
pub mod filters;
pub mod generator;
pub mod imaging;
pub mod logging;
pub mod naming;
pub mod output;
pub mod passthrough;
pub mod preset;
pub mod registry;
pub mod shortcodes;
pub mod tags;
