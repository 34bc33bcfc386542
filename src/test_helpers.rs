//! Shared test utilities for the wp-static test suite.
//!
//! Provides the fixture export, small synthetic documents shaped like the
//! WordPress theme's markup, and lookup helpers over [`ContentModel`].
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let model = assemble(tmp.path()).unwrap();
//!
//! let post = find_post(&model, "2017/07/11/first-snow");
//! assert_eq!(post.title.as_deref(), Some("First Snow"));
//! ```

use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::types::{ContentModel, Page, Post};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/docs/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    copy_dir_recursive(&fixtures_root().join("docs"), tmp.path()).unwrap();
    tmp
}

/// The checked-in templates. Read-only: tests that edit templates copy them.
pub fn fixture_templates() -> PathBuf {
    fixtures_root().join("templates")
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

pub fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Write `document` as `<root>/<slug>/index.html`.
pub fn write_post(root: &Path, slug: &str, document: &str) {
    let dir = root.join(slug);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("index.html"), document).unwrap();
}

// =========================================================================
// Synthetic documents
// =========================================================================

/// A post document in the theme's markup, including the Jetpack sharing
/// block that the exporter appends to every body.
///
/// Attribute order matches what WordPress emits, so both extraction
/// backends read it.
pub fn post_document(title: &str, date_iso: &str, date_display: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en-US">
<head><meta charset="UTF-8"><title>{title} | Gnarwall</title></head>
<body class="single">
<article class="post type-post status-publish hentry">
<header class="entry-header">
<h1 class="entry-title">{title}</h1>
<div class="entry-meta"><span class="posted-on"><time class="entry-date published" datetime="{date_iso}">{date_display}</time></span></div>
</header>
<div class="entry-content">{body}<div id="jp-post-flair" class="sharedaddy sd-like-enabled"><h3 class="sd-title">Share this:</h3></div></div><!-- .entry-content -->
</article>
</body>
</html>"#
    )
}

/// A homepage listing with a site title and two thumbnailed articles.
pub const SAMPLE_HOMEPAGE: &str = r#"<!DOCTYPE html>
<html lang="en-US">
<body class="home blog">
<header class="site-header">
<h1 class="site-title"><a href="/" rel="home">Gnarwall</a></h1>
</header>
<main>
<article class="post hentry">
<div class="entry-thumbnail"><img src="https://gnarwall.files.wordpress.com/wp-content/uploads/2017/07/snow.jpg?w=300&amp;h=200" alt=""></div>
<h1 class="entry-title"><a href="2017/07/11/first-snow/index.html" rel="bookmark">First Snow</a></h1>
<a href="2017/07/11/first-snow/index.html" class="entry-link">Continue reading</a>
</article>
<article class="post hentry">
<div class="entry-thumbnail"><img src="https://i0.wp.com/gnarwall.org/wp-content/uploads/2017/08/ridge.jpg%3Fresize%3D300%2C200" alt=""></div>
<h1 class="entry-title"><a href="2017/08/02/ridge/index.html" rel="bookmark">Ridge</a></h1>
<a href="2017/08/02/ridge/index.html" class="entry-link">Continue reading</a>
</article>
</main>
</body>
</html>"#;

/// A tiled gallery between two paragraphs. Only the second item has a
/// caption.
pub const SAMPLE_GALLERY: &str = concat!(
    r#"<p>Before</p>"#,
    r#"<div class="tiled-gallery type-rectangular" data-original-width="640">"#,
    r#"<div class="gallery-row" style="width: 640px; height: 240px;">"#,
    r#"<div class="gallery-group images-1" style="width: 320px; height: 240px;">"#,
    r#"<div class="tiled-gallery-item tiled-gallery-item-large">"#,
    r#"<a href="https://gnarwall.org/2017/07/11/post/one/index.html" border="0">"#,
    r#"<img data-attachment-id="101" data-orig-file="https://gnarwall.files.wordpress.com/wp-content/uploads/2017/07/one.jpg" src="https://i0.wp.com/gnarwall.org/wp-content/uploads/2017/07/one.jpg?w=320&amp;h=240" width="320" height="240" alt="Lake">"#,
    r#"</a>"#,
    r#"</div>"#,
    r#"</div>"#,
    r#"<div class="gallery-group images-1" style="width: 320px; height: 240px;">"#,
    r#"<div class="tiled-gallery-item tiled-gallery-item-large">"#,
    r#"<a href="https://gnarwall.org/2017/07/11/post/two/index.html" border="0">"#,
    r#"<img data-attachment-id="102" src="https://i0.wp.com/gnarwall.org/wp-content/uploads/2017/07/two.jpg?w=320" width="320" height="240" alt="Peak">"#,
    r#"</a>"#,
    r#"<div class="tiled-gallery-caption" itemprop="caption description"> Summit at dawn </div>"#,
    r#"</div>"#,
    r#"</div>"#,
    r#"</div>"#,
    r#"</div>"#,
    r#"<p>After</p>"#,
);

// =========================================================================
// Model lookups: panic with a clear message on miss
// =========================================================================

/// Find a post by slug. Panics if not found.
pub fn find_post<'a>(model: &'a ContentModel, slug: &str) -> &'a Post {
    model
        .posts
        .iter()
        .find(|p| p.slug == slug)
        .unwrap_or_else(|| panic!("post '{slug}' not found. Available: {:?}", slugs(model)))
}

/// Find a page by slug. Panics if not found.
pub fn find_page<'a>(model: &'a ContentModel, slug: &str) -> &'a Page {
    model
        .pages
        .iter()
        .find(|p| p.slug == slug)
        .unwrap_or_else(|| {
            let slugs: Vec<&str> = model.pages.iter().map(|p| p.slug.as_str()).collect();
            panic!("page '{slug}' not found. Available: {slugs:?}")
        })
}

/// All post slugs in model order.
pub fn slugs(model: &ContentModel) -> Vec<&str> {
    model.posts.iter().map(|p| p.slug.as_str()).collect()
}
