//! Site generation.
//!
//! A build runs three stages against one [`ExtensionTable`]:
//!
//! 1. **Passthrough**: copy the table's passthrough paths verbatim.
//! 2. **Collections**: load every template under the input directory and
//!    resolve each registered collection against it.
//! 3. **Pages**: expand shortcode and filter tags in every template (in
//!    parallel on the rayon pool) and write the result to its permalink.
//!    Markdown templates are converted to HTML after tag expansion.
//!
//! The first failing page aborts the build; its path is part of the error.

use crate::collections::{Collection, CollectionError, ContentIndex, ContentItem};
use crate::config::SiteConfig;
use crate::passthrough::{PassthroughError, copy_passthrough};
use crate::registry::ExtensionTable;
use crate::tags::{self, TagError};
use pulldown_cmark::{Parser, html as md_html};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Collection(#[from] CollectionError),
    #[error(transparent)]
    Passthrough(#[from] PassthroughError),
    #[error("{path}: {source}")]
    Page { path: PathBuf, source: TagError },
    #[error("{} is the output of more than one template: {}", .path.display(), format_inputs(.inputs))]
    DuplicateOutput { path: PathBuf, inputs: Vec<PathBuf> },
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

fn format_inputs(inputs: &[PathBuf]) -> String {
    inputs
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Fail if two items would write the same output file.
fn check_unique_outputs(items: &[ContentItem]) -> Result<(), BuildError> {
    let mut owners: BTreeMap<&Path, Vec<PathBuf>> = BTreeMap::new();
    for item in items {
        if let Some(output_path) = item.output_path.as_deref() {
            owners
                .entry(output_path)
                .or_default()
                .push(item.input_path.clone());
        }
    }
    match owners.into_iter().find(|(_, inputs)| inputs.len() > 1) {
        Some((path, inputs)) => Err(BuildError::DuplicateOutput {
            path: path.to_path_buf(),
            inputs,
        }),
        None => Ok(()),
    }
}

/// A page written by the build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    pub input_path: PathBuf,
    /// Relative to the output directory.
    pub output_path: PathBuf,
    pub url: String,
}

/// Everything a build produced.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    pub collections: Vec<Collection>,
    /// Passthrough files, relative to the output directory.
    pub copied: Vec<PathBuf>,
    pub pages: Vec<RenderedPage>,
}

pub struct Generator {
    root: PathBuf,
    config: SiteConfig,
    table: ExtensionTable,
}

impl Generator {
    pub fn new(root: impl Into<PathBuf>, config: SiteConfig, table: ExtensionTable) -> Self {
        Self {
            root: root.into(),
            config,
            table,
        }
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root.join(&self.config.output_dir)
    }

    /// Load every template under the input directory, minus passthrough paths.
    pub fn load_content(&self) -> Result<ContentIndex, CollectionError> {
        ContentIndex::load(
            &self.root,
            Path::new(&self.config.input_dir),
            self.table.passthrough(),
        )
    }

    /// Resolve every registered collection, in name order.
    pub fn collections(&self, index: &ContentIndex) -> Result<Vec<Collection>, CollectionError> {
        self.table
            .collections()
            .map(|(name, select)| {
                Ok(Collection {
                    name: name.to_string(),
                    items: select(index)?,
                })
            })
            .collect()
    }

    /// Expand tags in `item`, then convert Markdown to HTML.
    pub fn render_item(&self, item: &ContentItem) -> Result<String, TagError> {
        let expanded = tags::expand(&item.body, &self.table)?;
        let is_markdown = item.input_path.extension().is_some_and(|e| e == "md");
        if !is_markdown {
            return Ok(expanded);
        }
        let mut html = String::with_capacity(expanded.len() * 2);
        md_html::push_html(&mut html, Parser::new(&expanded));
        Ok(html)
    }

    fn write_page(&self, item: &ContentItem, output_path: &Path) -> Result<RenderedPage, BuildError> {
        let html = self.render_item(item).map_err(|source| BuildError::Page {
            path: item.input_path.clone(),
            source,
        })?;

        let target = self.output_dir().join(output_path);
        let write_err = |source| BuildError::Write {
            path: target.clone(),
            source,
        };
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        fs::write(&target, html).map_err(write_err)?;
        debug!(input = %item.input_path.display(), output = %output_path.display(), "wrote page");

        Ok(RenderedPage {
            input_path: item.input_path.clone(),
            output_path: output_path.to_path_buf(),
            url: item.url.clone(),
        })
    }

    /// Run the full build.
    pub fn build(&self) -> Result<BuildReport, BuildError> {
        let output_dir = self.output_dir();

        info!(count = self.table.passthrough().len(), "copying passthrough paths");
        let copied = copy_passthrough(
            &self.root,
            Path::new(&self.config.input_dir),
            &output_dir,
            self.table.passthrough(),
        )?;

        let index = self.load_content()?;
        info!(templates = index.len(), "loaded content");
        let collections = self.collections(&index)?;
        check_unique_outputs(index.items())?;

        info!(output = %output_dir.display(), "rendering pages");
        let pages = index
            .items()
            .par_iter()
            .filter_map(|item| {
                item.output_path
                    .as_deref()
                    .map(|output_path| self.write_page(item, output_path))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(BuildReport {
            collections,
            copied,
            pages,
        })
    }
}
