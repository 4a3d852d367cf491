//! Site configuration module.
//!
//! Handles loading, validating, and merging `site.toml`. Stock defaults
//! describe the portfolio layout this tool was built for; a `site.toml` at
//! the project root overrides any subset of them.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! input_dir = "src"
//! output_dir = "_site"
//! passthrough = ["CNAME", "src/assets/favicon/", "src/assets/js/",
//!                "src/assets/images/source", "src/robots.txt"]
//!
//! [[collections]]
//! name = "posts"
//! glob = "src/posts/*.liquid"
//!
//! [[collections]]
//! name = "works"
//! glob = "src/works/*.liquid"
//!
//! [images]
//! source_dir = "src/assets/images/source"
//! output_dir = "assets/images/optimised"   # Relative to the top-level output_dir
//! url_path = "assets/images/optimised/"
//! webp_quality = 70
//! webp_effort = 4
//! jpeg_quality = 80
//!
//! [placeholder]
//! width = 20
//! quality = 20
//! subdir = "lqip"
//!
//! [processing]
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! ## Partial Configuration
//!
//! Tables merge key by key; arrays (`passthrough`, `collections`) replace the
//! stock value entirely:
//!
//! ```toml
//! [images]
//! jpeg_quality = 85
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::preset::Preset;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Default config file name, looked up in the project root.
pub const CONFIG_FILE: &str = "site.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `site.toml`.
///
/// All paths are relative to the project root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Directory holding renderable content. Page output paths are relative to it.
    pub input_dir: String,
    /// Directory the built site is written to.
    pub output_dir: String,
    /// Files and directories copied verbatim.
    pub passthrough: Vec<String>,
    /// Named content collections.
    pub collections: Vec<CollectionConfig>,
    pub images: ImagesConfig,
    pub placeholder: PlaceholderConfig,
    pub processing: ProcessingConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            input_dir: "src".to_string(),
            output_dir: "_site".to_string(),
            passthrough: [
                "CNAME",
                "src/assets/favicon/",
                "src/assets/js/",
                "src/assets/images/source",
                "src/robots.txt",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            collections: vec![
                CollectionConfig::new("posts", "src/posts/*.liquid"),
                CollectionConfig::new("works", "src/works/*.liquid"),
            ],
            images: ImagesConfig::default(),
            placeholder: PlaceholderConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Directory image variants are written to, inside the site output.
    pub fn image_output_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.output_dir).join(&self.images.output_dir)
    }

    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, quality) in [
            ("images.webp_quality", self.images.webp_quality),
            ("images.jpeg_quality", self.images.jpeg_quality),
            ("placeholder.quality", self.placeholder.quality),
        ] {
            if !(1..=100).contains(&quality) {
                return Err(ConfigError::Validation(format!("{key} must be 1-100")));
            }
        }
        if self.images.webp_effort > 6 {
            return Err(ConfigError::Validation(
                "images.webp_effort must be 0-6".into(),
            ));
        }
        if self.placeholder.width == 0 || self.placeholder.width >= Preset::min_width() {
            return Err(ConfigError::Validation(format!(
                "placeholder.width must be between 1 and {}",
                Preset::min_width() - 1
            )));
        }

        let images_out = Path::new(&self.images.output_dir);
        if images_out.is_absolute()
            || images_out
                .components()
                .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)))
        {
            return Err(ConfigError::Validation(
                "images.output_dir must be a relative path inside output_dir".into(),
            ));
        }

        let mut seen = BTreeSet::new();
        for collection in &self.collections {
            if collection.name.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "collection names must not be empty".into(),
                ));
            }
            if !seen.insert(collection.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate collection name `{}`",
                    collection.name
                )));
            }
        }
        Ok(())
    }
}

/// A named collection of content files matched by a glob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CollectionConfig {
    pub name: String,
    /// Glob relative to the project root.
    pub glob: String,
}

impl CollectionConfig {
    pub fn new(name: &str, glob: &str) -> Self {
        Self {
            name: name.to_string(),
            glob: glob.to_string(),
        }
    }
}

/// Responsive image generation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    /// Where `{% image "name.jpg" %}` looks for `name.jpg`.
    pub source_dir: String,
    /// Where generated variants are written, relative to the site `output_dir`.
    pub output_dir: String,
    /// Public URL prefix of `output_dir`.
    pub url_path: String,
    pub webp_quality: u32,
    /// WebP compression effort (0 = fastest, 6 = smallest).
    pub webp_effort: u8,
    pub jpeg_quality: u32,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            source_dir: "src/assets/images/source".to_string(),
            output_dir: "assets/images/optimised".to_string(),
            url_path: "assets/images/optimised/".to_string(),
            webp_quality: 70,
            webp_effort: 4,
            jpeg_quality: 80,
        }
    }
}

/// Low-quality placeholder (LQIP) settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlaceholderConfig {
    /// Placeholder width in pixels. Must be below every preset width.
    pub width: u32,
    /// WebP quality of the placeholder.
    pub quality: u32,
    /// Subdirectory of `images.output_dir` (and `images.url_path`).
    pub subdir: String,
}

impl Default for PlaceholderConfig {
    fn default() -> Self {
        Self {
            width: 20,
            quality: 20,
            subdir: "lqip".to_string(),
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel page-rendering workers.
    /// When absent or null, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// Base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay (arrays included) replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`, falling back to stock defaults when it is missing.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `site.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# simple-folio configuration
# ==========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Paths are relative to the project root.
# Unknown keys will cause an error.

# Directory holding pages and collection content.
input_dir = "src"

# Directory the built site is written to.
output_dir = "_site"

# Files and directories copied verbatim into the output directory.
# Paths under input_dir lose that prefix (src/robots.txt -> _site/robots.txt).
# Missing paths are skipped with a warning.
passthrough = [
    "CNAME",
    "src/assets/favicon/",
    "src/assets/js/",
    "src/assets/images/source",
    "src/robots.txt",
]

# ---------------------------------------------------------------------------
# Collections (sorted newest first by front-matter date)
# ---------------------------------------------------------------------------
[[collections]]
name = "posts"
glob = "src/posts/*.liquid"

[[collections]]
name = "works"
glob = "src/works/*.liquid"

# ---------------------------------------------------------------------------
# Responsive images ({% image "file.jpg", "alt", "preset" %})
# ---------------------------------------------------------------------------
[images]
source_dir = "src/assets/images/source"
# Where variants are written, relative to the top-level output_dir.
output_dir = "assets/images/optimised"
url_path = "assets/images/optimised/"

# Encoder quality (1 = worst, 100 = best).
webp_quality = 70
jpeg_quality = 80

# WebP compression effort (0 = fastest, 6 = smallest).
webp_effort = 4

# ---------------------------------------------------------------------------
# Blurred low-quality placeholder shown while the image loads
# ---------------------------------------------------------------------------
[placeholder]
width = 20
quality = 20
subdir = "lqip"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel page-rendering workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_matches_site_layout() {
        let config = SiteConfig::default();
        assert_eq!(config.input_dir, "src");
        assert_eq!(config.output_dir, "_site");
        assert_eq!(config.passthrough.len(), 5);
        assert!(config.passthrough.contains(&"CNAME".to_string()));
        assert_eq!(
            config.collections,
            vec![
                CollectionConfig::new("posts", "src/posts/*.liquid"),
                CollectionConfig::new("works", "src/works/*.liquid"),
            ]
        );
    }

    #[test]
    fn default_config_has_image_settings() {
        let config = SiteConfig::default();
        assert_eq!(config.images.webp_quality, 70);
        assert_eq!(config.images.webp_effort, 4);
        assert_eq!(config.images.jpeg_quality, 80);
        assert_eq!(config.images.url_path, "assets/images/optimised/");
        assert_eq!(config.placeholder.width, 20);
        assert_eq!(config.placeholder.quality, 20);
        assert_eq!(config.placeholder.subdir, "lqip");
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[images]
jpeg_quality = 85
"#;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.images.jpeg_quality, 85);
        assert_eq!(config.images.webp_quality, 70);
        assert_eq!(config.output_dir, "_site");
    }

    #[test]
    fn parse_collections_array() {
        let toml = r#"
[[collections]]
name = "notes"
glob = "src/notes/*.md"
"#;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(
            config.collections,
            vec![CollectionConfig::new("notes", "src/notes/*.md")]
        );
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config, SiteConfig::default());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILE);
        fs::write(
            &path,
            r#"
output_dir = "public"

[placeholder]
width = 32
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.output_dir, "public");
        assert_eq!(
            config.image_output_dir(Path::new("/site")),
            Path::new("/site/public/assets/images/optimised")
        );
        assert_eq!(config.placeholder.width, 32);
        // Unspecified values are defaults
        assert_eq!(config.placeholder.quality, 20);
        assert_eq!(config.collections.len(), 2);
    }

    #[test]
    fn load_config_arrays_replace_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILE);
        fs::write(&path, "passthrough = [\"static\"]\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.passthrough, vec!["static".to_string()]);
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILE);
        fs::write(&path, "this is not [valid toml").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Toml(_))));
    }

    // =========================================================================
    // Processing
    // =========================================================================

    #[test]
    fn default_processing_config() {
        assert_eq!(ProcessingConfig::default().max_processes, None);
    }

    #[test]
    fn effective_threads_auto() {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(effective_threads(&ProcessingConfig::default()), cores);
    }

    #[test]
    fn effective_threads_clamped_to_cores() {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let config = ProcessingConfig {
            max_processes: Some(99999),
        };
        assert_eq!(effective_threads(&config), cores);
    }

    #[test]
    fn effective_threads_user_constrains_down() {
        let config = ProcessingConfig {
            max_processes: Some(1),
        };
        assert_eq!(effective_threads(&config), 1);
    }

    #[test]
    fn effective_threads_zero_means_one() {
        let config = ProcessingConfig {
            max_processes: Some(0),
        };
        assert_eq!(effective_threads(&config), 1);
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str(r#"quality = 90"#).unwrap();
        let overlay: toml::Value = toml::from_str(r#"quality = 70"#).unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("quality").unwrap().as_integer(), Some(70));
    }

    #[test]
    fn merge_toml_table_merge() {
        let base: toml::Value = toml::from_str(
            r#"
[images]
webp_quality = 70
jpeg_quality = 80
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(
            r#"
[images]
jpeg_quality = 60
"#,
        )
        .unwrap();
        let merged = merge_toml(base, overlay);
        let images = merged.get("images").unwrap();
        assert_eq!(images.get("jpeg_quality").unwrap().as_integer(), Some(60));
        assert_eq!(images.get("webp_quality").unwrap().as_integer(), Some(70));
    }

    #[test]
    fn merge_toml_array_replaces() {
        let base: toml::Value = toml::from_str(r#"passthrough = ["a", "b"]"#).unwrap();
        let overlay: toml::Value = toml::from_str(r#"passthrough = ["c"]"#).unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("passthrough").unwrap().as_array().unwrap().len(), 1);
    }

    // =========================================================================
    // Unknown key rejection tests
    // =========================================================================

    #[test]
    fn unknown_key_rejected() {
        let result: Result<SiteConfig, _> = toml::from_str("[images]\nqualty = 90\n");
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown field"));
    }

    #[test]
    fn unknown_section_rejected() {
        let result: Result<SiteConfig, _> = toml::from_str("[imagez]\nwebp_quality = 90\n");
        assert!(result.is_err());
    }

    #[test]
    fn unknown_collection_key_rejected() {
        let result: Result<SiteConfig, _> = toml::from_str(
            "[[collections]]\nname = \"posts\"\nglob = \"*.md\"\nsort = \"asc\"\n",
        );
        assert!(result.is_err());
    }

    // =========================================================================
    // Validation tests
    // =========================================================================

    #[test]
    fn validate_default_config_passes() {
        assert!(SiteConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_quality_bounds() {
        let mut config = SiteConfig::default();
        config.images.jpeg_quality = 100;
        assert!(config.validate().is_ok());

        config.images.jpeg_quality = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("images.jpeg_quality"));

        config.images.jpeg_quality = 80;
        config.placeholder.quality = 101;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("placeholder.quality"));
    }

    #[test]
    fn validate_effort_too_high() {
        let mut config = SiteConfig::default();
        config.images.webp_effort = 7;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_placeholder_must_be_smaller_than_presets() {
        let mut config = SiteConfig::default();
        config.placeholder.width = Preset::min_width();
        assert!(config.validate().is_err());

        config.placeholder.width = 0;
        assert!(config.validate().is_err());

        config.placeholder.width = Preset::min_width() - 1;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_image_output_stays_inside_site() {
        let mut config = SiteConfig::default();
        config.images.output_dir = "../elsewhere".into();
        assert!(config.validate().is_err());

        config.images.output_dir = "/var/www/images".into();
        assert!(config.validate().is_err());

        config.images.output_dir = "img".into();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_collection_names() {
        let mut config = SiteConfig::default();
        config.collections.push(CollectionConfig::new("posts", "x/*.md"));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate collection name `posts`"));

        config.collections = vec![CollectionConfig::new(" ", "x/*.md")];
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILE);
        fs::write(&path, "[images]\nwebp_quality = 200\n").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Validation(_))));
    }

    // =========================================================================
    // resolve_config / load_raw_config tests
    // =========================================================================

    #[test]
    fn load_raw_config_returns_none_when_no_file() {
        let tmp = TempDir::new().unwrap();
        assert!(load_raw_config(&tmp.path().join(CONFIG_FILE)).unwrap().is_none());
    }

    #[test]
    fn resolve_config_with_overlay() {
        let overlay: toml::Value = toml::from_str("[images]\nwebp_effort = 6\n").unwrap();
        let config = resolve_config(stock_defaults_value(), Some(overlay)).unwrap();
        assert_eq!(config.images.webp_effort, 6);
        assert_eq!(config.images.webp_quality, 70);
    }

    // =========================================================================
    // stock_config_toml tests
    // =========================================================================

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: SiteConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config, SiteConfig::default());
    }

    #[test]
    fn stock_config_toml_contains_all_sections() {
        let content = stock_config_toml();
        for section in ["[[collections]]", "[images]", "[placeholder]", "[processing]"] {
            assert!(content.contains(section), "missing {section}");
        }
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let val = stock_defaults_value();
        assert!(val.is_table());
        for key in ["input_dir", "passthrough", "collections", "images", "placeholder"] {
            assert!(val.get(key).is_some(), "missing {key}");
        }
    }
}
