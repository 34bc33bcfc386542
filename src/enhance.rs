//! Render-time rewrites of post and page bodies.
//!
//! [`enhance`] runs on `content_html` just before it is handed to a
//! template. Unlike [`normalize`](crate::normalize), which cleans content
//! once at extraction, these rewrites depend on the target site (lightbox
//! markup, hosting subpath) and are redone on every generate.
//!
//! Rewrites are textual. The input is markup this crate serialized itself,
//! so attribute quoting is uniform.

use regex::{Captures, NoExpand, Regex};
use std::sync::LazyLock;

static IMAGE_QUERY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(src="[^"]+\.(?:jpg|jpeg|png|gif))(?:%3F[^"]*|\?[^"]*)""#).unwrap()
});
static GALLERY_GROUP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<div class="gallery-group[^"]*"[^>]*>"#).unwrap());
static STYLE_WIDTH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"style="[^"]*width:\s*(\d+)px"#).unwrap());
static STYLE_OPEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"style=""#).unwrap());
static IMG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<img[^>]+>").unwrap());
static ORIG_SIZE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"data-orig-size="(\d+),(\d+)""#).unwrap());
static CLASS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"class="([^"]*)""#).unwrap());
static LINKED_IMG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<a\s[^>]*>\s*<img[^>]+>\s*</a>").unwrap());
static SRC_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"src="([^"]+)""#).unwrap());

/// Class marking standalone, full-width images in the WordPress editor.
const STANDALONE_IMAGE: &str = "alignnone size-full";

/// Apply every render-time rewrite to a body, in order: strip image query
/// strings, gallery flex widths, orientation classes, lightbox links, and
/// finally the `base_url` prefix on upload paths.
///
/// `base_url` is empty for root hosting or a path like `/gnarwall`.
pub fn enhance(content_html: &str, base_url: &str) -> String {
    let html = strip_image_queries(content_html);
    let html = gallery_flex_widths(&html);
    let html = classify_standalone_images(&html);
    let html = wrap_images_for_lightbox(&html);
    prefix_upload_paths(&html, base_url)
}

/// `src="….jpg?w=768"` and `src="….jpg%3Fw%3D768"` lose everything after
/// the extension.
pub fn strip_image_queries(html: &str) -> String {
    IMAGE_QUERY_RE.replace_all(html, "${1}\"").into_owned()
}

/// Give each gallery group a `--flex-grow` custom property proportional to
/// its pixel width, so the row keeps its proportions when it reflows.
pub fn gallery_flex_widths(html: &str) -> String {
    GALLERY_GROUP_RE
        .replace_all(html, |c: &Captures| {
            let tag = &c[0];
            let Some(width) = STYLE_WIDTH_RE
                .captures(tag)
                .and_then(|w| w[1].parse::<u64>().ok())
            else {
                return tag.to_string();
            };
            let style = format!(r#"style="--flex-grow: {:.2}; "#, width as f64 / 100.0);
            STYLE_OPEN_RE.replace_all(tag, NoExpand(&style)).into_owned()
        })
        .into_owned()
}

/// Append `img-landscape` or `img-portrait` to standalone images that
/// record their original size.
pub fn classify_standalone_images(html: &str) -> String {
    IMG_RE
        .replace_all(html, |c: &Captures| {
            let tag = &c[0];
            match orientation(tag) {
                Some(class) => CLASS_RE
                    .replace_all(tag, |k: &Captures| format!(r#"class="{} {class}""#, &k[1]))
                    .into_owned(),
                None => tag.to_string(),
            }
        })
        .into_owned()
}

fn orientation(img_tag: &str) -> Option<&'static str> {
    if !img_tag.contains(STANDALONE_IMAGE) {
        return None;
    }
    let size = ORIG_SIZE_RE.captures(img_tag)?;
    let width: f64 = size[1].parse().ok()?;
    let height: f64 = size[2].parse().ok()?;
    if height == 0.0 {
        return None;
    }
    Some(if width / height >= 1.0 {
        "img-landscape"
    } else {
        "img-portrait"
    })
}

/// Wrap every image in `<a href="SRC" class="glightbox">`, except images
/// that are already the sole content of a link.
pub fn wrap_images_for_lightbox(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut last = 0;
    for linked in LINKED_IMG_RE.find_iter(html) {
        out.push_str(&wrap_bare_images(&html[last..linked.start()]));
        out.push_str(linked.as_str());
        last = linked.end();
    }
    out.push_str(&wrap_bare_images(&html[last..]));
    out
}

fn wrap_bare_images(segment: &str) -> String {
    IMG_RE
        .replace_all(segment, |c: &Captures| {
            let tag = &c[0];
            match SRC_RE.captures(tag) {
                Some(src) => format!(r#"<a href="{}" class="glightbox">{tag}</a>"#, &src[1]),
                None => tag.to_string(),
            }
        })
        .into_owned()
}

/// Point root-relative upload paths at the hosting subpath.
pub fn prefix_upload_paths(html: &str, base_url: &str) -> String {
    if base_url.is_empty() {
        return html.to_string();
    }
    html.replace(r#"src="/wp-content/"#, &format!(r#"src="{base_url}/wp-content/"#))
        .replace(r#"href="/wp-content/"#, &format!(r#"href="{base_url}/wp-content/"#))
}
