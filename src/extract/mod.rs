//! Field extraction from WordPress-exported HTML.
//!
//! | Operation | Structural | Pattern |
//! |---|---|---|
//! | **Title** | `h1.entry-title` text | `<h1 class="entry-title">TEXT</h1>` |
//! | **Date** | `time.entry-date.published` | `<time class="entry-date published" datetime=…>` |
//! | **Body** | `div.entry-content`, widgets removed | text up to `<!-- .entry-content -->` |
//! | **Featured images** | `article.hentry` + `.entry-thumbnail img` | one regex per article |
//! | **Site title** | `h1.site-title` text | `<h1 class="site-title">` regex |
//!
//! Both backends implement [`ExtractBackend`] and return the same [`Fields`],
//! so nothing downstream knows which one ran. The pattern backend is a
//! fallback: it cannot see through nested tags, so a title like
//! `<h1 class="entry-title"><em>Snow</em> day</h1>` comes back as `None`.

pub mod pattern;
pub mod structural;

use crate::config::Strategy;
use std::collections::BTreeMap;

pub use pattern::PatternBackend;
pub use structural::StructuralBackend;

/// Fields recovered from one post or page document.
///
/// Every field is optional: a missing element is not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields {
    pub title: Option<String>,
    pub date_iso: Option<String>,
    pub date_display: Option<String>,
    pub content_html: Option<String>,
}

/// Homepage thumbnails keyed by the permalink as written on the homepage,
/// e.g. `2017/07/11/first-snow/index.html`.
pub type FeaturedImages = BTreeMap<String, String>;

/// Trait for extraction backends.
///
/// Implementations never fail: malformed or unexpected markup yields empty
/// fields. `Sync` so one backend can serve a rayon pool.
pub trait ExtractBackend: Sync {
    /// Short name for log output.
    fn name(&self) -> &'static str;

    /// Extract title, date and body from a post or page document.
    fn extract(&self, document: &str) -> Fields;

    /// Map each homepage article permalink to its canonical thumbnail path.
    fn featured_images(&self, homepage: &str) -> FeaturedImages;

    /// The site title printed in the homepage header.
    fn site_title(&self, homepage: &str) -> Option<String>;
}

/// Construct the backend selected in `[extract] strategy`.
pub fn backend_for(strategy: Strategy) -> Box<dyn ExtractBackend> {
    match strategy {
        Strategy::Structural => Box::new(StructuralBackend),
        Strategy::Pattern => Box::new(PatternBackend),
    }
}

/// Drop empty strings so "present but blank" reads the same as "absent".
pub(crate) fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}
