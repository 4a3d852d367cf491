//! The extension table: every named hook the generator can call.
//!
//! Nothing registers itself globally. A table is built up front and handed
//! to [`Generator::new`](crate::generator::Generator::new):
//!
//! ```no_run
//! # use simple_folio::registry::ExtensionTable;
//! # use simple_folio::collections::sort_newest_first;
//! # use simple_folio::filters::minify_css;
//! let table = ExtensionTable::new()
//!     .with_glob_collection("posts", "src/posts/*.liquid", sort_newest_first)
//!     .with_filter("cssmin", minify_css)
//!     .with_passthrough("CNAME");
//! ```
//!
//! [`ExtensionTable::site`] builds the table for a loaded [`SiteConfig`].

use crate::collections::{CollectionError, ContentIndex, ContentItem, sort_newest_first};
use crate::config::SiteConfig;
use crate::filters::{Filter, minify_css};
use crate::imaging::Transcoder;
use crate::shortcodes::{Breadcrumbs, ImageSettings, ResponsiveImage, Shortcode};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Selects and orders a collection's items from the full content index.
pub type CollectionFn =
    Box<dyn Fn(&ContentIndex) -> Result<Vec<ContentItem>, CollectionError> + Send + Sync>;

#[derive(Default)]
pub struct ExtensionTable {
    collections: BTreeMap<String, CollectionFn>,
    filters: BTreeMap<String, Box<dyn Filter>>,
    shortcodes: BTreeMap<String, Box<dyn Shortcode>>,
    passthrough: Vec<PathBuf>,
}

impl ExtensionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table for a site: configured collections and passthrough paths, the
    /// `cssmin` filter, and the `image` and `breadcrumbs` shortcodes.
    pub fn site(config: &SiteConfig, root: &Path, transcoder: Arc<dyn Transcoder>) -> Self {
        let mut table = Self::new()
            .with_filter("cssmin", minify_css)
            .with_shortcode(
                "image",
                ResponsiveImage::new(transcoder, ImageSettings::from_config(config, root)),
            )
            .with_shortcode("breadcrumbs", Breadcrumbs);

        for collection in &config.collections {
            table = table.with_glob_collection(&collection.name, &collection.glob, sort_newest_first);
        }
        for entry in &config.passthrough {
            table = table.with_passthrough(entry);
        }
        table
    }

    pub fn with_collection<F>(mut self, name: &str, select: F) -> Self
    where
        F: Fn(&ContentIndex) -> Result<Vec<ContentItem>, CollectionError> + Send + Sync + 'static,
    {
        self.collections.insert(name.to_string(), Box::new(select));
        self
    }

    /// Collection of the items matching `glob`, ordered by `sort`.
    pub fn with_glob_collection<S>(self, name: &str, glob: &str, sort: S) -> Self
    where
        S: Fn(Vec<ContentItem>) -> Vec<ContentItem> + Send + Sync + 'static,
    {
        let glob = glob.to_string();
        self.with_collection(name, move |index| Ok(sort(index.filtered_by_glob(&glob)?)))
    }

    pub fn with_filter(mut self, name: &str, filter: impl Filter + 'static) -> Self {
        self.filters.insert(name.to_string(), Box::new(filter));
        self
    }

    pub fn with_shortcode(mut self, name: &str, shortcode: impl Shortcode + 'static) -> Self {
        self.shortcodes.insert(name.to_string(), Box::new(shortcode));
        self
    }

    pub fn with_passthrough(mut self, path: impl Into<PathBuf>) -> Self {
        self.passthrough.push(path.into());
        self
    }

    pub fn filter(&self, name: &str) -> Option<&dyn Filter> {
        self.filters.get(name).map(|f| f.as_ref())
    }

    pub fn shortcode(&self, name: &str) -> Option<&dyn Shortcode> {
        self.shortcodes.get(name).map(|s| s.as_ref())
    }

    /// Collections by name, in name order.
    pub fn collections(&self) -> impl Iterator<Item = (&str, &CollectionFn)> {
        self.collections.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn passthrough(&self) -> &[PathBuf] {
        &self.passthrough
    }

    pub fn filter_names(&self) -> impl Iterator<Item = &str> {
        self.filters.keys().map(String::as_str)
    }

    pub fn shortcode_names(&self) -> impl Iterator<Item = &str> {
        self.shortcodes.keys().map(String::as_str)
    }
}
