//! Content normalization: turn a WordPress post body into plain markup the
//! new theme can use.
//!
//! [`normalize`] applies four edits, in this order:
//!
//! 1. Image `src` values under `wp-content/uploads/` become canonical paths
//!    (`/wp-content/uploads/2017/07/x.jpg`): CDN host and query string gone.
//! 2. `srcset`, `sizes` and `data-*` attributes are dropped from images.
//!    They only carry responsive hints and leak CDN URLs.
//! 3. Links to attachment pages (`…/index.html`) wrapping an image are
//!    unwrapped. Those pages do not exist on the new site.
//! 4. Jetpack tiled galleries become `<div class="gallery">` with one
//!    `<figure>` per image, captions carried over as `<figcaption>`.
//!
//! Every step is a no-op when there is nothing to change, and the whole
//! function is idempotent.
//!
//! The module also owns the upload-path rules ([`canonical_upload_path`],
//! [`clean_image_path`]) and the image inventory ([`content_images`]) since
//! all three must agree on what a canonical path looks like.

use crate::dom;
use kuchikiki::NodeRef;
use regex::Regex;
use std::sync::LazyLock;

/// Path segment that marks a WordPress media upload.
pub const UPLOADS_MARKER: &str = "wp-content/uploads/";

static UPLOAD_PATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/wp-content/uploads/[^\s?#&]+").unwrap());
static ENCODED_QUERY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)%3F").unwrap());
static IMAGE_REF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:\bsrc|data-orig-file)="([^"]*wp-content/uploads/[^"\s]+)"#).unwrap()
});

/// Reduce an image URL to its canonical `/wp-content/uploads/…` path.
///
/// Returns `None` if the URL has no rooted uploads segment. Cuts at the first
/// whitespace, `?`, `#`, `&` or URL-encoded `?` (`%3F`).
///
/// ```
/// use wp_static::normalize::canonical_upload_path;
///
/// assert_eq!(
///     canonical_upload_path("https://i0.wp.com/site.org/wp-content/uploads/2017/07/a.jpg?w=200").as_deref(),
///     Some("/wp-content/uploads/2017/07/a.jpg"),
/// );
/// assert_eq!(canonical_upload_path("/images/a.jpg"), None);
/// ```
pub fn canonical_upload_path(src: &str) -> Option<String> {
    if !src.contains(UPLOADS_MARKER) {
        return None;
    }
    let path = UPLOAD_PATH_RE.find(src)?.as_str();
    let path = match ENCODED_QUERY_RE.find(path) {
        Some(m) => &path[..m.start()],
        None => path,
    };
    Some(path.to_string())
}

/// Clean an image reference pulled from raw markup.
///
/// Raw attribute text may still contain `&amp;` and URL-encoded query
/// strings, so this decodes those before cutting, then canonicalizes.
/// References outside the uploads directory come back trimmed but otherwise
/// unchanged.
pub fn clean_image_path(path: &str) -> String {
    let path = path.split('?').next().unwrap_or_default();
    let path = path.replace("&amp;", "&");
    let path = path.split('&').next().unwrap_or_default();
    let path = path.replace("%3F", "?").replace("%3D", "=");
    let path = path.split('?').next().unwrap_or_default();
    canonical_upload_path(path).unwrap_or_else(|| path.to_string())
}

/// Every upload image referenced by `src` or `data-orig-file`, cleaned and
/// de-duplicated, in order of first appearance.
///
/// Runs on raw markup, before [`normalize`] strips `data-*` attributes, so
/// full-size originals that only appear in `data-orig-file` are still found.
pub fn content_images(content_html: &str) -> Vec<String> {
    let mut images: Vec<String> = Vec::new();
    for caps in IMAGE_REF_RE.captures_iter(content_html) {
        let path = clean_image_path(&caps[1]);
        if !path.is_empty() && !images.contains(&path) {
            images.push(path);
        }
    }
    images
}

/// Normalize a post or page body. See the [module docs](self).
pub fn normalize(content_html: &str) -> String {
    if content_html.is_empty() {
        return String::new();
    }

    let document = dom::parse_fragment(content_html);
    canonicalize_images(&document);
    unwrap_attachment_links(&document);
    rebuild_galleries(&document);
    dom::fragment_html(&document)
}

fn canonicalize_images(document: &NodeRef) {
    for img in dom::select_all(document, "img") {
        let Some(el) = img.as_element() else {
            continue;
        };
        let mut attrs = el.attributes.borrow_mut();

        let canonical = attrs.get("src").and_then(canonical_upload_path);
        if let Some(src) = canonical {
            attrs.insert("src", src);
        }

        attrs.map.retain(|name, _| {
            let name: &str = name.local.as_ref();
            name != "srcset" && name != "sizes" && !name.starts_with("data-")
        });
    }
}

fn unwrap_attachment_links(document: &NodeRef) {
    for anchor in dom::select_all(document, "a") {
        let to_attachment = dom::attr(&anchor, "href").is_some_and(|h| h.contains("/index.html"));
        if to_attachment && dom::select_first(&anchor, "img").is_some() {
            dom::unwrap(&anchor);
        }
    }
}

fn rebuild_galleries(document: &NodeRef) {
    for gallery in dom::select_all(document, ".tiled-gallery") {
        // An inner gallery goes away with its outer one.
        if gallery.ancestors().any(|a| dom::has_class(&a, "tiled-gallery")) {
            continue;
        }
        if let Some(replacement) = simple_gallery(&gallery) {
            gallery.insert_before(replacement);
            gallery.detach();
        }
    }
}

/// Build `<div class="gallery">` with one figure per image in `gallery`.
fn simple_gallery(gallery: &NodeRef) -> Option<NodeRef> {
    let container = dom::new_element("div")?;
    dom::set_attr(&container, "class", "gallery");

    for img in dom::select_all(gallery, "img") {
        let figure = dom::new_element("figure")?;
        let plain = dom::new_element("img")?;
        dom::set_attr(&plain, "alt", &dom::attr(&img, "alt").unwrap_or_default());
        dom::set_attr(&plain, "src", &dom::attr(&img, "src").unwrap_or_default());
        figure.append(plain);

        if let Some(caption) = gallery_caption(&img) {
            let figcaption = dom::new_element("figcaption")?;
            figcaption.append(NodeRef::new_text(caption));
            figure.append(figcaption);
        }

        container.append(figure);
    }

    Some(container)
}

/// The caption of the gallery item that holds `img`, if it has any text.
///
/// Matched through the image's own `div.tiled-gallery-item` ancestor, not by
/// position: captions are sparse, so the n-th caption rarely belongs to the
/// n-th image.
fn gallery_caption(img: &NodeRef) -> Option<String> {
    let item = img
        .ancestors()
        .find(|a| dom::is_tag(a, "div") && dom::has_class(a, "tiled-gallery-item"))?;
    let caption = dom::select_first(&item, ".tiled-gallery-caption")?;
    let text = dom::trimmed_text(&caption);
    if text.is_empty() { None } else { Some(text) }
}
