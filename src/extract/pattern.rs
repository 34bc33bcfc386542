//! Regex extraction backend.
//!
//! Matches the theme's literal markup without building a tree. Cheaper and
//! more brittle than [`StructuralBackend`](super::StructuralBackend):
//! attribute order matters, and a title with a nested tag is not matched at
//! all.

use super::{ExtractBackend, FeaturedImages, Fields, non_empty};
use crate::normalize::canonical_upload_path;
use html5ever::data::NAMED_ENTITIES;
use regex::{Captures, Regex};
use std::sync::LazyLock;

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<h1[^>]*class="entry-title"[^>]*>([^<]+)</h1>"#).unwrap());
static DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"<time[^>]*class="entry-date published"[^>]*datetime="([^"]+)"[^>]*>([^<]+)</time>"#,
    )
    .unwrap()
});
static CONTENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<div class="entry-content">(.*?)</div><!-- \.entry-content -->"#).unwrap()
});
static ARTICLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)<article[^>]*>.*?<div class="entry-thumbnail">\s*<img[^>]*src="([^"]+)"[^>]*>.*?<a href="([^"]+)"[^>]*class="entry-link""#,
    )
    .unwrap()
});
static SITE_TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<h1[^>]*class="site-title"[^>]*>\s*(?:<a[^>]*>)?([^<]+)"#).unwrap()
});
static ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z][a-zA-Z0-9]*);").unwrap());

pub struct PatternBackend;

impl ExtractBackend for PatternBackend {
    fn name(&self) -> &'static str {
        "pattern"
    }

    fn extract(&self, document: &str) -> Fields {
        let title = TITLE_RE
            .captures(document)
            .map(|c| decode_entities(c[1].trim()));

        let (date_iso, date_display) = match DATE_RE.captures(document) {
            Some(c) => (Some(c[1].to_string()), Some(decode_entities(c[2].trim()))),
            None => (None, None),
        };

        let content_html = CONTENT_RE
            .captures(document)
            .map(|c| c[1].trim().to_string());

        Fields {
            title,
            date_iso,
            date_display,
            content_html,
        }
    }

    fn featured_images(&self, homepage: &str) -> FeaturedImages {
        ARTICLE_RE
            .captures_iter(homepage)
            .map(|c| {
                let src = canonical_upload_path(&c[1]).unwrap_or_else(|| c[1].to_string());
                (c[2].to_string(), src)
            })
            .collect()
    }

    fn site_title(&self, homepage: &str) -> Option<String> {
        SITE_TITLE_RE
            .captures(homepage)
            .map(|c| decode_entities(c[1].trim()))
            .and_then(non_empty)
    }
}

/// Decode named and numeric character references.
///
/// Names come from the HTML5 entity table; unknown names and numeric
/// references outside Unicode are left as written.
pub fn decode_entities(text: &str) -> String {
    ENTITY_RE
        .replace_all(text, |c: &Captures| {
            let entity = &c[1];
            let decoded = if let Some(hex) = entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .map(String::from)
            } else if let Some(dec) = entity.strip_prefix('#') {
                dec.parse::<u32>()
                    .ok()
                    .and_then(char::from_u32)
                    .map(String::from)
            } else {
                named_entity(entity)
            };
            decoded.unwrap_or_else(|| c[0].to_string())
        })
        .into_owned()
}

/// Some names expand to two code points, e.g. `&NotEqualTilde;`.
fn named_entity(name: &str) -> Option<String> {
    let &(first, second) = NAMED_ENTITIES.get(format!("{name};").as_str())?;
    [first, second]
        .into_iter()
        .filter(|&cp| cp != 0)
        .map(char::from_u32)
        .collect()
}
