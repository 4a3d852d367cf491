//! Content discovery, front matter, and collections.
//!
//! Every renderable file under the input directory becomes a [`ContentItem`]:
//!
//! ```text
//! src/posts/hello.liquid   →  url /posts/hello/   →  _site/posts/hello/index.html
//! src/index.html           →  url /               →  _site/index.html
//! src/about/index.md       →  url /about/         →  _site/about/index.html
//! ```
//!
//! A file may open with a YAML front matter block:
//!
//! ```text
//! ---
//! title: Hello
//! date: 2024-03-01
//! permalink: /greetings/
//! ---
//! ```
//!
//! `date` accepts RFC 3339, `YYYY-MM-DD HH:MM:SS` (UTC) or `YYYY-MM-DD`; files
//! without one are dated by modification time. `permalink` overrides the
//! output location, and `permalink: false` keeps the item out of the output.
//!
//! Collections are views over the loaded [`ContentIndex`], selected by glob
//! and ordered by a sorter such as [`sort_newest_first`].

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_yaml::Value;
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

/// File extensions treated as renderable templates.
pub const TEMPLATE_EXTENSIONS: &[&str] = &["liquid", "html", "md"];

#[derive(Error, Debug)]
pub enum CollectionError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid front matter in {path}: {source}")]
    FrontMatter {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("Invalid date {value:?} in {path}")]
    InvalidDate { path: PathBuf, value: String },
    #[error("Invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
}

/// One piece of content.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentItem {
    /// Path relative to the project root, e.g. `src/posts/hello.liquid`.
    pub input_path: PathBuf,
    /// Public URL, e.g. `/posts/hello/`.
    pub url: String,
    /// Output location relative to the output directory. `None` when the
    /// front matter sets `permalink: false`.
    pub output_path: Option<PathBuf>,
    pub date: DateTime<Utc>,
    /// Parsed front matter, if any.
    pub data: Option<Value>,
    /// Content after the front matter.
    pub body: String,
}

impl ContentItem {
    /// String field from the front matter.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.data.as_ref()?.get(key)?.as_str()
    }

    /// Front matter `title`, or the file stem.
    pub fn title(&self) -> String {
        self.get_str("title").map(str::to_string).unwrap_or_else(|| {
            self.input_path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default()
        })
    }
}

/// Split `content` into its YAML front matter and body.
///
/// Content that does not open with a `---` line, or never closes the block,
/// has no front matter. An empty block yields `Some(Value::Null)`.
pub fn parse_front_matter(content: &str) -> Result<(Option<Value>, &str), serde_yaml::Error> {
    let Some(after_open) = content
        .strip_prefix("---\n")
        .or_else(|| content.strip_prefix("---\r\n"))
    else {
        return Ok((None, content));
    };

    let Some((yaml, body)) = split_at_closing_fence(after_open) else {
        return Ok((None, content));
    };
    let value = serde_yaml::from_str::<Value>(yaml)?;
    Ok((Some(value), body))
}

/// Find the first line that is exactly `---` and split around it.
fn split_at_closing_fence(text: &str) -> Option<(&str, &str)> {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        let bare = line.trim_end_matches(['\n', '\r']);
        if bare == "---" {
            let yaml = text[..offset].trim_end_matches(['\n', '\r']);
            return Some((yaml, &text[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

/// Parse a front matter date string.
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// URL and output path for a template at `rel` (relative to the input directory).
///
/// `index.*` maps to its directory; any other file gets its own directory.
pub fn default_permalink(rel: &Path) -> (String, PathBuf) {
    let stem = rel
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let mut segments: Vec<String> = rel
        .parent()
        .into_iter()
        .flat_map(|p| p.components())
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().to_string()),
            _ => None,
        })
        .collect();
    if stem != "index" {
        segments.push(stem);
    }

    let mut output: PathBuf = segments.iter().collect();
    output.push("index.html");
    let url = if segments.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", segments.join("/"))
    };
    (url, output)
}

/// URL and output path for an explicit `permalink` value.
///
/// `/about/` writes `about/index.html`; `feed.xml` writes `feed.xml`.
pub fn explicit_permalink(permalink: &str) -> (String, PathBuf) {
    let trimmed = permalink.trim().trim_start_matches('/');
    if trimmed.is_empty() {
        return ("/".to_string(), PathBuf::from("index.html"));
    }
    if trimmed.ends_with('/') {
        (format!("/{trimmed}"), Path::new(trimmed).join("index.html"))
    } else {
        (format!("/{trimmed}"), PathBuf::from(trimmed))
    }
}

/// `true` if any component of `rel` starts with `_` (`_includes/`, `_drafts/`).
fn is_hidden(rel: &Path) -> bool {
    rel.components().any(|c| match c {
        Component::Normal(s) => s.to_string_lossy().starts_with('_'),
        _ => false,
    })
}

fn is_template(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| TEMPLATE_EXTENSIONS.contains(&e))
}

/// Load one template. `input_path` is relative to `root`.
pub fn load_item(root: &Path, input_dir: &Path, input_path: &Path) -> Result<ContentItem, CollectionError> {
    let full = root.join(input_path);
    let io_err = |source| CollectionError::Io {
        path: input_path.to_path_buf(),
        source,
    };
    let content = fs::read_to_string(&full).map_err(io_err)?;
    let (data, body) =
        parse_front_matter(&content).map_err(|source| CollectionError::FrontMatter {
            path: input_path.to_path_buf(),
            source,
        })?;

    let date = match data.as_ref().and_then(|d| d.get("date")) {
        Some(value) => {
            let text = match value {
                Value::String(s) => s.clone(),
                other => serde_yaml::to_string(other).unwrap_or_default(),
            };
            parse_date(&text).ok_or_else(|| CollectionError::InvalidDate {
                path: input_path.to_path_buf(),
                value: text.trim().to_string(),
            })?
        }
        None => {
            let modified = fs::metadata(&full).and_then(|m| m.modified()).map_err(io_err)?;
            DateTime::<Utc>::from(modified)
        }
    };

    let rel = input_path.strip_prefix(input_dir).unwrap_or(input_path);
    let (url, output_path) = match data.as_ref().and_then(|d| d.get("permalink")) {
        Some(Value::Bool(false)) => (String::new(), None),
        Some(Value::String(permalink)) => {
            let (url, out) = explicit_permalink(permalink);
            (url, Some(out))
        }
        _ => {
            let (url, out) = default_permalink(rel);
            (url, Some(out))
        }
    };

    Ok(ContentItem {
        input_path: input_path.to_path_buf(),
        url,
        output_path,
        date,
        data,
        body: body.to_string(),
    })
}

/// All templates of a site, ordered by input path.
#[derive(Debug, Clone, Default)]
pub struct ContentIndex {
    items: Vec<ContentItem>,
}

impl ContentIndex {
    pub fn new(mut items: Vec<ContentItem>) -> Self {
        items.sort_by(|a, b| a.input_path.cmp(&b.input_path));
        Self { items }
    }

    /// Walk `input_dir` (relative to `root`) and load every template.
    ///
    /// Paths under any of `excluded` (project-relative) are skipped, as are
    /// files inside `_`-prefixed directories.
    pub fn load(root: &Path, input_dir: &Path, excluded: &[PathBuf]) -> Result<Self, CollectionError> {
        let base = root.join(input_dir);
        let mut items = Vec::new();
        if !base.is_dir() {
            return Ok(Self::new(items));
        }

        for entry in WalkDir::new(&base).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() || !is_template(entry.path()) {
                continue;
            }
            let Ok(input_path) = entry.path().strip_prefix(root) else {
                continue;
            };
            let rel = input_path.strip_prefix(input_dir).unwrap_or(input_path);
            if is_hidden(rel) || excluded.iter().any(|ex| input_path.starts_with(ex)) {
                debug!(path = %input_path.display(), "skipping template");
                continue;
            }
            items.push(load_item(root, input_dir, input_path)?);
        }
        Ok(Self::new(items))
    }

    pub fn items(&self) -> &[ContentItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items whose project-relative input path matches `pattern`.
    pub fn filtered_by_glob(&self, pattern: &str) -> Result<Vec<ContentItem>, CollectionError> {
        let pattern = glob::Pattern::new(pattern.trim_start_matches("./"))?;
        let options = glob::MatchOptions {
            case_sensitive: true,
            require_literal_separator: true,
            require_literal_leading_dot: false,
        };
        Ok(self
            .items
            .iter()
            .filter(|item| pattern.matches_path_with(&item.input_path, options))
            .cloned()
            .collect())
    }
}

/// Newest first. Items with the same date are ordered by input path.
pub fn sort_newest_first(mut items: Vec<ContentItem>) -> Vec<ContentItem> {
    items.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then_with(|| a.input_path.cmp(&b.input_path))
    });
    items
}

/// A resolved, ordered collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    pub name: String,
    pub items: Vec<ContentItem>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn item(path: &str, date: &str) -> ContentItem {
        ContentItem {
            input_path: PathBuf::from(path),
            url: String::new(),
            output_path: None,
            date: parse_date(date).unwrap(),
            data: None,
            body: String::new(),
        }
    }

    fn paths(items: &[ContentItem]) -> Vec<&str> {
        items
            .iter()
            .map(|i| i.input_path.to_str().unwrap())
            .collect()
    }

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    // =========================================================================
    // Sorting
    // =========================================================================

    #[test]
    fn sort_newest_first_orders_by_date_descending() {
        let sorted = sort_newest_first(vec![
            item("src/posts/a.liquid", "2023-01-01"),
            item("src/posts/b.liquid", "2024-06-01"),
            item("src/posts/c.liquid", "2023-12-31"),
        ]);
        assert_eq!(
            paths(&sorted),
            vec!["src/posts/b.liquid", "src/posts/c.liquid", "src/posts/a.liquid"]
        );
    }

    #[test]
    fn sort_newest_first_preserves_length_and_is_non_increasing() {
        let input: Vec<ContentItem> = (1..=9)
            .map(|d| item(&format!("p{}.md", (d * 7) % 9), &format!("2024-0{d}-01")))
            .collect();
        let sorted = sort_newest_first(input.clone());
        assert_eq!(sorted.len(), input.len());
        assert!(sorted.windows(2).all(|w| w[0].date >= w[1].date));
    }

    #[test]
    fn sort_ties_broken_by_path() {
        let sorted = sort_newest_first(vec![
            item("src/works/zebra.liquid", "2024-01-01"),
            item("src/works/apple.liquid", "2024-01-01"),
        ]);
        assert_eq!(
            paths(&sorted),
            vec!["src/works/apple.liquid", "src/works/zebra.liquid"]
        );
    }

    #[test]
    fn sort_empty() {
        assert!(sort_newest_first(Vec::new()).is_empty());
    }

    // =========================================================================
    // Front matter and dates
    // =========================================================================

    #[test]
    fn front_matter_split() {
        let (data, body) = parse_front_matter("---\ntitle: Hello\n---\nBody\n").unwrap();
        assert_eq!(data.unwrap().get("title").unwrap().as_str(), Some("Hello"));
        assert_eq!(body, "Body\n");
    }

    #[test]
    fn no_front_matter() {
        let (data, body) = parse_front_matter("<h1>Hi</h1>").unwrap();
        assert!(data.is_none());
        assert_eq!(body, "<h1>Hi</h1>");
    }

    #[test]
    fn unclosed_front_matter_is_body() {
        let content = "---\ntitle: x\nno end";
        let (data, body) = parse_front_matter(content).unwrap();
        assert!(data.is_none());
        assert_eq!(body, content);
    }

    #[test]
    fn empty_front_matter() {
        let (data, body) = parse_front_matter("---\n---\nBody").unwrap();
        assert_eq!(data, Some(Value::Null));
        assert_eq!(body, "Body");
    }

    #[test]
    fn closing_fence_must_be_a_whole_line() {
        let content = "---\nsummary: |\n  ---- notes\n  more\ntitle: Hi\n---\nBody ----\n";
        let (data, body) = parse_front_matter(content).unwrap();
        let data = data.unwrap();
        assert_eq!(data.get("title").unwrap().as_str(), Some("Hi"));
        assert_eq!(data.get("summary").unwrap().as_str(), Some("---- notes\nmore\n"));
        assert_eq!(body, "Body ----\n");
    }

    #[test]
    fn closing_fence_at_end_of_file() {
        let (data, body) = parse_front_matter("---\ntitle: Hi\n---").unwrap();
        assert_eq!(data.unwrap().get("title").unwrap().as_str(), Some("Hi"));
        assert_eq!(body, "");
    }

    #[test]
    fn crlf_front_matter() {
        let (data, body) = parse_front_matter("---\r\ntitle: Hi\r\n---\r\nBody").unwrap();
        assert_eq!(data.unwrap().get("title").unwrap().as_str(), Some("Hi"));
        assert_eq!(body, "Body");
    }

    #[test]
    fn invalid_yaml_is_error() {
        assert!(parse_front_matter("---\ntitle: [unclosed\n---\n").is_err());
    }

    #[test]
    fn date_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        assert_eq!(parse_date("2024-03-01"), Some(expected));
        assert_eq!(
            parse_date("2024-03-01 14:30:00"),
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 14, 30, 0).unwrap())
        );
        assert_eq!(
            parse_date("2024-03-01T14:30:00+02:00"),
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap())
        );
        assert_eq!(parse_date("March 1st"), None);
    }

    // =========================================================================
    // Permalinks
    // =========================================================================

    #[test]
    fn default_permalinks() {
        assert_eq!(
            default_permalink(Path::new("posts/hello.liquid")),
            ("/posts/hello/".to_string(), PathBuf::from("posts/hello/index.html"))
        );
        assert_eq!(
            default_permalink(Path::new("index.html")),
            ("/".to_string(), PathBuf::from("index.html"))
        );
        assert_eq!(
            default_permalink(Path::new("about/index.md")),
            ("/about/".to_string(), PathBuf::from("about/index.html"))
        );
    }

    #[test]
    fn explicit_permalinks() {
        assert_eq!(
            explicit_permalink("/greetings/"),
            ("/greetings/".to_string(), PathBuf::from("greetings/index.html"))
        );
        assert_eq!(
            explicit_permalink("feed.xml"),
            ("/feed.xml".to_string(), PathBuf::from("feed.xml"))
        );
    }

    // =========================================================================
    // Loading
    // =========================================================================

    #[test]
    fn load_item_with_front_matter() {
        let tmp = TempDir::new().unwrap();
        write(
            tmp.path(),
            "src/posts/hello.liquid",
            "---\ntitle: Hello\ndate: 2024-03-01\n---\n<p>Hi</p>\n",
        );

        let item = load_item(tmp.path(), Path::new("src"), Path::new("src/posts/hello.liquid")).unwrap();
        assert_eq!(item.url, "/posts/hello/");
        assert_eq!(item.output_path, Some(PathBuf::from("posts/hello/index.html")));
        assert_eq!(item.date, Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
        assert_eq!(item.title(), "Hello");
        assert_eq!(item.body, "<p>Hi</p>\n");
    }

    #[test]
    fn load_item_without_date_uses_mtime() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "src/note.md", "plain");
        let before = Utc::now() - chrono::Duration::minutes(5);

        let item = load_item(tmp.path(), Path::new("src"), Path::new("src/note.md")).unwrap();
        assert!(item.date > before);
        assert_eq!(item.title(), "note");
    }

    #[test]
    fn load_item_bad_date_is_error() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "src/a.liquid", "---\ndate: someday\n---\n");
        let result = load_item(tmp.path(), Path::new("src"), Path::new("src/a.liquid"));
        assert!(matches!(result, Err(CollectionError::InvalidDate { .. })));
    }

    #[test]
    fn load_item_permalink_false_has_no_output() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "src/draft.liquid", "---\npermalink: false\n---\n");
        let item = load_item(tmp.path(), Path::new("src"), Path::new("src/draft.liquid")).unwrap();
        assert_eq!(item.output_path, None);
    }

    #[test]
    fn index_load_skips_excluded_hidden_and_non_templates() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        write(root, "src/index.html", "home");
        write(root, "src/posts/a.liquid", "a");
        write(root, "src/_includes/base.liquid", "layout");
        write(root, "src/assets/js/app.html", "vendored");
        write(root, "src/robots.txt", "User-agent: *");

        let index = ContentIndex::load(
            root,
            Path::new("src"),
            &[PathBuf::from("src/assets/js/")],
        )
        .unwrap();
        assert_eq!(paths(index.items()), vec!["src/index.html", "src/posts/a.liquid"]);
    }

    #[test]
    fn index_load_missing_input_dir_is_empty() {
        let tmp = TempDir::new().unwrap();
        let index = ContentIndex::load(tmp.path(), Path::new("src"), &[]).unwrap();
        assert!(index.is_empty());
    }

    #[test]
    fn filtered_by_glob_selects_collection() {
        let index = ContentIndex::new(vec![
            item("src/works/b.liquid", "2024-01-01"),
            item("src/posts/a.liquid", "2024-01-01"),
            item("src/posts/nested/c.liquid", "2024-01-01"),
            item("src/posts/d.md", "2024-01-01"),
        ]);
        let posts = index.filtered_by_glob("src/posts/*.liquid").unwrap();
        assert_eq!(paths(&posts), vec!["src/posts/a.liquid"]);
        assert_eq!(index.filtered_by_glob("./src/works/*.liquid").unwrap().len(), 1);
    }

    #[test]
    fn bad_glob_is_error() {
        let index = ContentIndex::default();
        assert!(matches!(
            index.filtered_by_glob("src/[posts"),
            Err(CollectionError::Pattern(_))
        ));
    }
}
