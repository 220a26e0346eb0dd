//! Markdown-backed informational pages.
//!
//! Pages are loaded from `<content_dir>/pages/*.md` at startup. Each file
//! carries YAML frontmatter (`title`, optional `description` and
//! `updated_at`) and is rendered to HTML once.

use chrono::NaiveDate;
use comrak::{Options, markdown_to_html};
use gray_matter::{Matter, ParsedEntity, engine::YAML};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Metadata for static pages (about, terms, privacy, etc.)
#[derive(Debug, Clone, Deserialize)]
pub struct PageMeta {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub updated_at: Option<NaiveDate>,
}

/// A rendered page with metadata and HTML content
#[derive(Debug, Clone)]
pub struct Page {
    pub slug: String,
    pub meta: PageMeta,
    pub content_html: String,
}

/// Content store that holds all loaded pages in memory
#[derive(Debug, Clone, Default)]
pub struct ContentStore {
    pages: Arc<HashMap<String, Page>>,
}

impl ContentStore {
    /// Load all pages from the filesystem.
    ///
    /// A missing `pages` directory yields an empty store. Files that fail to
    /// parse are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the pages directory exists but cannot be read.
    pub fn load(content_dir: &Path) -> Result<Self, ContentError> {
        let dir = content_dir.join("pages");
        let mut pages = HashMap::new();

        if !dir.exists() {
            tracing::warn!("Pages directory does not exist: {:?}", dir);
            return Ok(Self::default());
        }

        let entries = std::fs::read_dir(&dir).map_err(|e| ContentError::Io(e.to_string()))?;

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "md") {
                match Self::load_page(&path) {
                    Ok(page) => {
                        tracing::info!("Loaded page: {}", page.slug);
                        pages.insert(page.slug.clone(), page);
                    }
                    Err(e) => {
                        tracing::error!("Failed to load page {:?}: {}", path, e);
                    }
                }
            }
        }

        Ok(Self {
            pages: Arc::new(pages),
        })
    }

    /// Load a single page from a markdown file
    fn load_page(path: &Path) -> Result<Page, ContentError> {
        let content = std::fs::read_to_string(path).map_err(|e| ContentError::Io(e.to_string()))?;

        let slug = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| ContentError::Parse("Invalid filename".to_string()))?
            .to_string();

        parse_page(slug, &content)
    }

    /// Get a page by slug
    #[must_use]
    pub fn get_page(&self, slug: &str) -> Option<&Page> {
        self.pages.get(slug)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

fn parse_page(slug: String, content: &str) -> Result<Page, ContentError> {
    let matter = Matter::<YAML>::new();
    let parsed: ParsedEntity<PageMeta> = matter
        .parse(content)
        .map_err(|e| ContentError::Parse(format!("Failed to parse frontmatter: {e}")))?;
    let meta = parsed
        .data
        .ok_or_else(|| ContentError::Parse("Missing frontmatter".to_string()))?;

    Ok(Page {
        slug,
        meta,
        content_html: render_markdown(&parsed.content),
    })
}

/// Render markdown to HTML with GitHub Flavored Markdown support.
fn render_markdown(content: &str) -> String {
    let mut options = Options::default();

    // Enable GFM extensions
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.header_ids = Some(String::new());

    markdown_to_html(content, &options)
}

/// Content loading errors
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_page_with_frontmatter() {
        let page = parse_page(
            "about".to_string(),
            "---\ntitle: About Us\nupdated_at: 2024-10-01\n---\n\n# Who we are\n\nA pharmacy.\n",
        )
        .unwrap();

        assert_eq!(page.meta.title, "About Us");
        assert_eq!(page.meta.updated_at, NaiveDate::from_ymd_opt(2024, 10, 1));
        assert!(page.content_html.contains("<h1"));
        assert!(page.content_html.contains("Who we are"));
        assert!(page.content_html.contains("<p>A pharmacy.</p>"));
    }

    #[test]
    fn test_parse_page_without_frontmatter_fails() {
        let err = parse_page("x".to_string(), "# Just markdown\n").unwrap_err();
        assert!(matches!(err, ContentError::Parse(_)));
    }

    #[test]
    fn test_raw_html_is_not_rendered() {
        let page = parse_page(
            "x".to_string(),
            "---\ntitle: X\n---\n\n<script>alert(1)</script>\n",
        )
        .unwrap();
        assert!(!page.content_html.contains("<script>"));
    }

    #[test]
    fn test_bundled_pages_load() {
        let store = ContentStore::load(&Path::new(env!("CARGO_MANIFEST_DIR")).join("content")).unwrap();
        for slug in [
            "about",
            "contact",
            "careers",
            "terms-of-service",
            "privacy-policy",
            "disclaimer",
        ] {
            assert!(store.get_page(slug).is_some(), "missing page {slug}");
        }
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let store = ContentStore::load(Path::new("/nonexistent/medicart")).unwrap();
        assert!(store.is_empty());
    }
}
