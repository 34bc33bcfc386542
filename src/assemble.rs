//! Content assembly: WordPress export → content model.
//!
//! Stage 1 of the build. Walks the exported docs directory, runs extraction,
//! normalization and featured-image resolution on every document, and
//! produces the [`ContentModel`] that the generate stage renders.
//!
//! ## Directory Structure
//!
//! ```text
//! docs/                              # WordPress export root
//! ├── config.toml                    # Optional, see config module
//! ├── index.html                     # Homepage: site title + post thumbnails
//! ├── about/index.html               # Static page
//! ├── contact/index.html             # Static page
//! └── 2017/07/11/first-snow/
//!     └── index.html                 # Post; slug = 2017/07/11/first-snow
//! ```
//!
//! Posts are any `index.html` exactly four directories deep whose first
//! three directories look like a date (`20YY/MM/DD`). Anything else in the
//! export (attachment pages, feeds, category archives) is ignored.
//!
//! ## Failure Isolation
//!
//! A post that cannot be read is logged and left out; the rest of the batch
//! carries on. The same goes for directories the walk cannot enter. Missing
//! homepage or static pages only produce a warning. The only hard errors are
//! an unreadable config or a missing docs directory.

use crate::config::{self, SiteConfig};
use crate::extract::{self, ExtractBackend, FeaturedImages};
use crate::featured;
use crate::normalize::{content_images, normalize};
use crate::types::{ContentModel, Page, Post, RecordKind, SiteMeta, Stats};
use log::{debug, info, warn};
use rayon::prelude::*;
use std::fmt::Display;
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

#[derive(Error, Debug)]
pub enum AssembleError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Docs directory not found: {0}")]
    MissingDocs(PathBuf),
}

/// Load config from the docs root and assemble the content model.
pub fn assemble(docs: &Path) -> Result<ContentModel, AssembleError> {
    if !docs.is_dir() {
        return Err(AssembleError::MissingDocs(docs.to_path_buf()));
    }
    let config = config::load_config(docs)?;
    assemble_with(docs, &config)
}

/// Assemble the content model with an already-resolved config.
pub fn assemble_with(docs: &Path, config: &SiteConfig) -> Result<ContentModel, AssembleError> {
    if !docs.is_dir() {
        return Err(AssembleError::MissingDocs(docs.to_path_buf()));
    }
    let backend = extract::backend_for(config.extract.strategy);
    info!("Extracting with the {} backend", backend.name());

    let homepage = read_optional(&docs.join("index.html"));
    if homepage.is_none() {
        warn!("No homepage at {}; featured images come from post bodies", docs.display());
    }
    let featured = featured::resolve(backend.as_ref(), homepage.as_deref());
    info!("Found {} featured images on the homepage", featured.len());

    let site_title = homepage
        .as_deref()
        .and_then(|html| backend.site_title(html))
        .unwrap_or_else(|| config.site.title.clone());

    let post_paths = discover_posts(docs);
    let mut posts = load_posts(docs, &post_paths, backend.as_ref(), &featured);
    info!("Processed {} of {} posts", posts.len(), post_paths.len());
    sort_posts(&mut posts);

    let pages = load_pages(docs, &config.site.static_pages, backend.as_ref());

    let stats = Stats::count(&posts, &pages);
    Ok(ContentModel {
        site: SiteMeta {
            title: site_title,
            extracted_at: extracted_at(),
        },
        posts,
        pages,
        stats,
    })
}

/// Find every post document, in lexical path order.
///
/// Directories that cannot be read are logged and skipped.
pub fn discover_posts(docs: &Path) -> Vec<PathBuf> {
    post_paths(docs, WalkDir::new(docs).min_depth(5).max_depth(5))
}

fn post_paths<E: Display>(
    docs: &Path,
    entries: impl IntoIterator<Item = Result<DirEntry, E>>,
) -> Vec<PathBuf> {
    let mut found = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping part of {}: {e}", docs.display());
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry.path().strip_prefix(docs).unwrap_or(entry.path());
        if is_post_path(rel) {
            found.push(entry.into_path());
        }
    }
    found.sort();
    found
}

/// Whether `rel` has the shape `20YY/MM/DD/slug/index.html`.
fn is_post_path(rel: &Path) -> bool {
    let parts: Vec<&str> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => s.to_str(),
            _ => None,
        })
        .collect();
    fn two_digits(s: &str) -> bool {
        s.len() == 2 && s.bytes().all(|b| b.is_ascii_digit())
    }
    matches!(
        parts.as_slice(),
        [year, month, day, slug, "index.html"]
            if year.starts_with("20") && two_digits(month) && two_digits(day) && !slug.is_empty()
    )
}

/// Relative path with `/` separators, whatever the platform.
fn url_path(rel: &Path) -> String {
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Slug of a post: its directory path relative to the docs root.
pub fn post_slug(rel: &Path) -> String {
    rel.parent().map(url_path).unwrap_or_default()
}

/// Extract one post document into a [`Post`]. Pure: no filesystem access.
pub fn build_post(
    backend: &dyn ExtractBackend,
    document: &str,
    rel: &Path,
    featured_images: &FeaturedImages,
) -> Post {
    let fields = backend.extract(document);
    let slug = post_slug(rel);
    let raw_content = fields.content_html.unwrap_or_default();

    // Inventory runs on the raw body; normalize drops data-orig-file.
    let images = content_images(&raw_content);
    let featured_image =
        featured::pick_featured_image(&featured::homepage_key(&slug), &images, featured_images);

    Post {
        kind: RecordKind::Post,
        slug,
        title: fields.title,
        date_iso: fields.date_iso,
        date_display: fields.date_display,
        featured_image,
        images,
        content_html: normalize(&raw_content),
        source_file: url_path(rel),
    }
}

/// Extract one static page document into a [`Page`].
pub fn build_page(backend: &dyn ExtractBackend, document: &str, slug: &str, rel: &Path) -> Page {
    let fields = backend.extract(document);
    Page {
        kind: RecordKind::Page,
        slug: slug.to_string(),
        title: fields.title,
        content_html: normalize(&fields.content_html.unwrap_or_default()),
        source_file: url_path(rel),
    }
}

/// Sort posts newest first. Stable, so equal dates keep discovery order;
/// a missing date compares as `""` and lands at the end.
pub fn sort_posts(posts: &mut [Post]) {
    posts.sort_by(|a, b| b.date_key().cmp(a.date_key()));
}

fn load_posts(
    docs: &Path,
    paths: &[PathBuf],
    backend: &dyn ExtractBackend,
    featured_images: &FeaturedImages,
) -> Vec<Post> {
    let results: Vec<Result<Post, (PathBuf, std::io::Error)>> = paths
        .par_iter()
        .map(|path| {
            let rel = path.strip_prefix(docs).unwrap_or(path);
            let document = fs::read_to_string(path).map_err(|e| (rel.to_path_buf(), e))?;
            Ok(build_post(backend, &document, rel, featured_images))
        })
        .collect();

    results
        .into_iter()
        .filter_map(|result| match result {
            Ok(post) => {
                debug!("{}: {}", post.slug, post.title.as_deref().unwrap_or("(untitled)"));
                Some(post)
            }
            Err((rel, e)) => {
                warn!("Skipping {}: {e}", rel.display());
                None
            }
        })
        .collect()
}

fn load_pages(docs: &Path, slugs: &[String], backend: &dyn ExtractBackend) -> Vec<Page> {
    let mut pages = Vec::new();
    for slug in slugs {
        let rel = Path::new(slug).join("index.html");
        let path = docs.join(&rel);
        if !path.exists() {
            debug!("No static page at {}", rel.display());
            continue;
        }
        match fs::read_to_string(&path) {
            Ok(document) => pages.push(build_page(backend, &document, slug, &rel)),
            Err(e) => warn!("Skipping {}: {e}", rel.display()),
        }
    }
    pages
}

/// Read a file that is allowed to be missing. Unreadable counts as missing.
fn read_optional(path: &Path) -> Option<String> {
    if !path.exists() {
        return None;
    }
    match fs::read_to_string(path) {
        Ok(content) => Some(content),
        Err(e) => {
            warn!("Ignoring unreadable {}: {e}", path.display());
            None
        }
    }
}

fn extracted_at() -> String {
    chrono::Local::now()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Strategy;
    use crate::extract::{PatternBackend, StructuralBackend};
    use crate::test_helpers::*;
    use tempfile::TempDir;

    fn undated(slug: &str) -> Post {
        Post {
            kind: RecordKind::Post,
            slug: slug.to_string(),
            title: None,
            date_iso: None,
            date_display: None,
            featured_image: String::new(),
            images: vec![],
            content_html: String::new(),
            source_file: String::new(),
        }
    }

    fn dated(slug: &str, date: &str) -> Post {
        Post {
            date_iso: Some(date.to_string()),
            ..undated(slug)
        }
    }

    // =========================================================================
    // Discovery
    // =========================================================================

    #[test]
    fn post_path_shape() {
        assert!(is_post_path(Path::new("2017/07/11/first-snow/index.html")));
        assert!(!is_post_path(Path::new("2017/07/11/index.html")));
        assert!(!is_post_path(Path::new("2017/07/11/a/b/index.html")));
        assert!(!is_post_path(Path::new("1999/07/11/old/index.html")));
        assert!(!is_post_path(Path::new("2017/7/11/a/index.html")));
        assert!(!is_post_path(Path::new("2017/07/11/a/feed.xml")));
        assert!(!is_post_path(Path::new("about/index.html")));
    }

    #[test]
    fn discover_finds_fixture_posts_in_lexical_order() {
        let tmp = setup_fixtures();
        let found: Vec<String> = discover_posts(tmp.path())
            .iter()
            .map(|p| post_slug(p.strip_prefix(tmp.path()).unwrap()))
            .collect();
        assert_eq!(
            found,
            vec![
                "2017/07/11/first-snow",
                "2017/08/02/ridge-gallery",
                "2018/01/15/no-date",
                "2018/02/20/quiet-week",
            ]
        );
    }

    #[test]
    fn walk_errors_skip_only_the_failing_entry() {
        let tmp = setup_fixtures();
        let mut entries: Vec<Result<DirEntry, String>> = WalkDir::new(tmp.path())
            .min_depth(5)
            .max_depth(5)
            .into_iter()
            .map(|entry| entry.map_err(|e| e.to_string()))
            .collect();
        entries.insert(1, Err("permission denied: wp-admin/private".to_string()));
        entries.push(Err("I/O error reading 2019/03".to_string()));

        let found = post_paths(tmp.path(), entries);
        assert_eq!(found, discover_posts(tmp.path()));
        assert_eq!(found.len(), 4);
    }

    #[test]
    fn slug_and_source_use_forward_slashes() {
        let rel = Path::new("2017").join("07").join("11").join("a").join("index.html");
        assert_eq!(post_slug(&rel), "2017/07/11/a");
        assert_eq!(url_path(&rel), "2017/07/11/a/index.html");
    }

    // =========================================================================
    // Sorting
    // =========================================================================

    #[test]
    fn posts_sorted_newest_first_missing_last() {
        let mut posts = vec![
            undated("x"),
            dated("a", "2017-01-01"),
            dated("b", "2018-05-05"),
            dated("c", "2017-06-01"),
        ];
        sort_posts(&mut posts);
        let order: Vec<&str> = posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(order, vec!["b", "c", "a", "x"]);
    }

    #[test]
    fn equal_dates_keep_discovery_order() {
        let mut posts = vec![
            dated("first", "2017-01-01"),
            undated("u1"),
            dated("second", "2017-01-01"),
            undated("u2"),
            dated("third", "2017-01-01"),
        ];
        sort_posts(&mut posts);
        let order: Vec<&str> = posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(order, vec!["first", "second", "third", "u1", "u2"]);
    }

    // =========================================================================
    // build_post
    // =========================================================================

    #[test]
    fn build_post_uses_homepage_thumbnail() {
        let doc = post_document(
            "Ridge",
            "2017-08-02T10:00:00+00:00",
            "August 2, 2017",
            r#"<p><img src="https://x.org/wp-content/uploads/2017/08/body.jpg?w=640" srcset="a 1w"></p>"#,
        );
        let mut featured = FeaturedImages::new();
        featured.insert(
            "2017/08/02/ridge/index.html".to_string(),
            "/wp-content/uploads/2017/08/thumb.jpg".to_string(),
        );
        let rel = Path::new("2017/08/02/ridge/index.html");
        let post = build_post(&StructuralBackend, &doc, rel, &featured);

        assert_eq!(post.slug, "2017/08/02/ridge");
        assert_eq!(post.source_file, "2017/08/02/ridge/index.html");
        assert_eq!(post.featured_image, "/wp-content/uploads/2017/08/thumb.jpg");
        assert_eq!(post.images, vec!["/wp-content/uploads/2017/08/body.jpg"]);
        assert!(post.content_html.contains(r#"<img src="/wp-content/uploads/2017/08/body.jpg">"#));
        assert!(!post.content_html.contains("srcset"));
    }

    #[test]
    fn build_post_falls_back_to_first_image() {
        let doc = post_document(
            "Two",
            "2017-01-01",
            "Jan 1",
            r#"<img src="/wp-content/uploads/one.jpg"><img src="/wp-content/uploads/two.jpg">"#,
        );
        let post = build_post(
            &StructuralBackend,
            &doc,
            Path::new("2017/01/01/two/index.html"),
            &FeaturedImages::new(),
        );
        assert_eq!(post.featured_image, "/wp-content/uploads/one.jpg");
    }

    #[test]
    fn build_post_without_content() {
        let post = build_post(
            &StructuralBackend,
            "<html><body>nothing here</body></html>",
            Path::new("2017/01/01/empty/index.html"),
            &FeaturedImages::new(),
        );
        assert_eq!(post.title, None);
        assert_eq!(post.date_iso, None);
        assert_eq!(post.content_html, "");
        assert!(post.images.is_empty());
        assert_eq!(post.featured_image, "");
    }

    #[test]
    fn build_page_has_no_date() {
        let doc = post_document("About", "2016-01-01", "Jan 1", "<p>Who we are</p>");
        let page = build_page(&PatternBackend, &doc, "about", Path::new("about/index.html"));
        assert_eq!(page.slug, "about");
        assert_eq!(page.title.as_deref(), Some("About"));
        assert!(page.content_html.contains("Who we are"));
        assert_eq!(page.kind, RecordKind::Page);
    }

    // =========================================================================
    // assemble
    // =========================================================================

    #[test]
    fn assemble_fixtures() {
        let tmp = setup_fixtures();
        let model = assemble(tmp.path()).unwrap();

        assert_eq!(model.site.title, "Gnarwall");
        assert_eq!(
            slugs(&model),
            vec![
                "2018/02/20/quiet-week",
                "2017/08/02/ridge-gallery",
                "2017/07/11/first-snow",
                "2018/01/15/no-date",
            ]
        );
        assert_eq!(model.stats.total_posts, 4);
        assert_eq!(model.stats.total_pages, 2);

        let snow = find_post(&model, "2017/07/11/first-snow");
        assert_eq!(snow.featured_image, "/wp-content/uploads/2017/07/snow.jpg");

        let gallery = find_post(&model, "2017/08/02/ridge-gallery");
        assert!(gallery.content_html.contains(r#"<div class="gallery">"#));
        assert_eq!(gallery.featured_image, gallery.images[0]);

        let quiet = find_post(&model, "2018/02/20/quiet-week");
        assert_eq!(quiet.featured_image, "");
        assert_eq!(model.stats.total_featured_images, 3);

        assert_eq!(find_page(&model, "about").title.as_deref(), Some("About"));
        assert!(model.page("contact").is_some());
    }

    #[test]
    fn assemble_without_homepage_uses_fallback_title() {
        let tmp = TempDir::new().unwrap();
        write_post(
            tmp.path(),
            "2019/03/04/lone",
            &post_document("Lone", "2019-03-04", "March 4, 2019", "<p>x</p>"),
        );

        let model = assemble(tmp.path()).unwrap();
        assert_eq!(model.site.title, "Adventures of Gallivanter Ganter");
        assert_eq!(model.posts.len(), 1);
        assert!(model.pages.is_empty());
    }

    #[test]
    fn unreadable_post_is_skipped() {
        let tmp = TempDir::new().unwrap();
        write_post(
            tmp.path(),
            "2019/03/04/good",
            &post_document("Good", "2019-03-04", "March 4, 2019", "<p>x</p>"),
        );
        let bad = tmp.path().join("2019/03/05/bad");
        fs::create_dir_all(&bad).unwrap();
        fs::write(bad.join("index.html"), [0xff, 0xfe, 0x00, 0xc3]).unwrap();

        let model = assemble(tmp.path()).unwrap();
        assert_eq!(slugs(&model), vec!["2019/03/04/good"]);
    }

    #[test]
    fn missing_docs_dir_is_error() {
        let tmp = TempDir::new().unwrap();
        let result = assemble(&tmp.path().join("nope"));
        assert!(matches!(result, Err(AssembleError::MissingDocs(_))));
    }

    #[test]
    fn pattern_strategy_from_config() {
        let tmp = setup_fixtures();
        let mut config = config::load_config(tmp.path()).unwrap();
        config.extract.strategy = Strategy::Pattern;

        let model = assemble_with(tmp.path(), &config).unwrap();
        // The fixture post with an <em> in its title loses it under the
        // pattern backend.
        assert_eq!(find_post(&model, "2017/08/02/ridge-gallery").title, None);
        assert_eq!(
            find_post(&model, "2017/07/11/first-snow").title.as_deref(),
            Some("First Snow")
        );
    }

    #[test]
    fn model_round_trips_through_json() {
        let tmp = setup_fixtures();
        let model = assemble(tmp.path()).unwrap();
        let json = serde_json::to_string_pretty(&model).unwrap();
        let back: ContentModel = serde_json::from_str(&json).unwrap();
        assert_eq!(back, model);
    }
}
