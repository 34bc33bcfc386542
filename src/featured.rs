//! Featured-image resolution.
//!
//! The WordPress homepage shows a thumbnail next to each post. That listing
//! is the only place the export records which image the author picked, so it
//! is read once and consulted for every post. Posts missing from the listing
//! fall back to the first image in their own body.

use crate::extract::{ExtractBackend, FeaturedImages};

/// Read the homepage listing, or return an empty map when there is none.
pub fn resolve(backend: &dyn ExtractBackend, homepage: Option<&str>) -> FeaturedImages {
    homepage
        .map(|html| backend.featured_images(html))
        .unwrap_or_default()
}

/// The key a post is listed under on the homepage.
///
/// Homepage permalinks are relative (`2017/07/11/first-snow/index.html`).
pub fn homepage_key(slug: &str) -> String {
    format!("{slug}/index.html")
}

/// Choose the featured image for one post.
///
/// Priority: homepage thumbnail for exactly `post_url`, then the first image
/// in the post body, then the empty string.
pub fn pick_featured_image(post_url: &str, images: &[String], homepage: &FeaturedImages) -> String {
    homepage
        .get(post_url)
        .filter(|src| !src.is_empty())
        .or_else(|| images.first())
        .cloned()
        .unwrap_or_default()
}
