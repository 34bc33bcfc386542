//! Content model shared by the extract and generate stages.
//!
//! These types are serialized to `content.json` by the extract stage and read
//! back by the generate stage. The field names are the on-disk contract, so
//! renaming a field here breaks every existing `content.json` and every
//! template that references it.

use serde::{Deserialize, Serialize};

/// Record discriminator written alongside every post and page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Post,
    Page,
}

/// A dated blog post recovered from `YYYY/MM/DD/slug/index.html`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    #[serde(rename = "type")]
    pub kind: RecordKind,
    /// URL path relative to the site root, e.g. `2017/07/11/first-snow`
    pub slug: String,
    pub title: Option<String>,
    /// Value of the `datetime` attribute, e.g. `2017-07-11T08:00:00+00:00`
    pub date_iso: Option<String>,
    /// Human-readable date as printed by the theme
    pub date_display: Option<String>,
    /// Canonical upload path, or empty when the post has no images at all
    pub featured_image: String,
    /// Distinct canonical upload paths in order of first appearance
    pub images: Vec<String>,
    pub content_html: String,
    /// Path of the source document relative to the docs root
    pub source_file: String,
}

impl Post {
    /// Sort key for date ordering. Missing dates compare as the empty string.
    pub fn date_key(&self) -> &str {
        self.date_iso.as_deref().unwrap_or("")
    }
}

/// A static page such as `about` or `contact`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    #[serde(rename = "type")]
    pub kind: RecordKind,
    pub slug: String,
    pub title: Option<String>,
    pub content_html: String,
    pub source_file: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteMeta {
    pub title: String,
    /// Local timestamp of the extract run
    pub extracted_at: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub total_posts: usize,
    pub total_pages: usize,
    pub total_featured_images: usize,
}

impl Stats {
    pub fn count(posts: &[Post], pages: &[Page]) -> Self {
        Self {
            total_posts: posts.len(),
            total_pages: pages.len(),
            total_featured_images: posts
                .iter()
                .filter(|p| !p.featured_image.is_empty())
                .count(),
        }
    }
}

/// The `content.json` artifact.
///
/// Self-describing: rendering needs nothing but this value and the templates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentModel {
    pub site: SiteMeta,
    /// Newest first
    pub posts: Vec<Post>,
    pub pages: Vec<Page>,
    pub stats: Stats,
}

impl ContentModel {
    pub fn page(&self, slug: &str) -> Option<&Page> {
        self.pages.iter().find(|p| p.slug == slug)
    }
}
