//! HTML site generation.
//!
//! Stage 2 of the wp-static build pipeline. Takes the content model and
//! renders the final static site through three user templates.
//!
//! ## Generated Pages
//!
//! - **Index page** (`/index.html`): every post, newest first
//! - **Post pages** (`/{slug}/index.html`): one per post, with links to the
//!   newer (`prev_post`) and older (`next_post`) neighbours
//! - **About page** (`/about/index.html`): only if the model has an `about`
//!   page
//!
//! ## Templates
//!
//! ```text
//! templates/
//! ├── index.html    # { site, posts, year, base_url }
//! ├── post.html     # { site, post, prev_post, next_post, year, base_url }
//! └── about.html    # { site, page, year, base_url }
//! ```
//!
//! Templates use the [`template`](crate::template) syntax. Post and page
//! bodies pass through [`enhance`](crate::enhance::enhance) before they
//! reach a template; the index gets the model's posts untouched.
//!
//! ## Output Structure
//!
//! ```text
//! site/
//! ├── index.html
//! ├── about/index.html
//! └── 2017/07/11/first-snow/
//!     └── index.html
//! ```

use crate::enhance::enhance;
use crate::template::Template;
use crate::types::{ContentModel, Page, Post};
use log::{debug, info, warn};
use serde::Serialize;
use serde_json::{Value, json};
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Cannot read template {}: {source}", path.display())]
    Template {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Post slug {0:?} would write outside the output directory")]
    UnsafeSlug(String),
}

/// Slug of the static page rendered with `about.html`.
pub const ABOUT_SLUG: &str = "about";

/// Which template produced a [`GeneratedPage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PageKind {
    Index,
    Post,
    About,
}

/// One file written by [`generate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedPage {
    pub kind: PageKind,
    pub title: String,
    /// Path relative to the output directory, `/`-separated.
    pub path: String,
}

/// Everything [`generate`] wrote, in write order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GenerateReport {
    pub pages: Vec<GeneratedPage>,
}

impl GenerateReport {
    /// Pages of one kind, in write order.
    pub fn of_kind(&self, kind: PageKind) -> impl Iterator<Item = &GeneratedPage> {
        self.pages.iter().filter(move |page| page.kind == kind)
    }

    /// False when the model had no about page to render.
    pub fn has_about(&self) -> bool {
        self.of_kind(PageKind::About).next().is_some()
    }
}

/// The three page templates, compiled.
pub struct Templates {
    pub index: Template,
    pub post: Template,
    pub about: Template,
}

impl Templates {
    /// Load `index.html`, `post.html` and `about.html` from `dir`.
    pub fn load(dir: &Path) -> Result<Self, GenerateError> {
        Ok(Self {
            index: load_template(&dir.join("index.html"))?,
            post: load_template(&dir.join("post.html"))?,
            about: load_template(&dir.join("about.html"))?,
        })
    }
}

fn load_template(path: &Path) -> Result<Template, GenerateError> {
    let source = fs::read_to_string(path).map_err(|source| GenerateError::Template {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Template::parse(&source))
}

/// Read a content model written by the extract stage.
///
/// The file may have been edited by hand, so every post slug is checked to
/// be a plain relative path before it is used as an output directory.
pub fn load_model(path: &Path) -> Result<ContentModel, GenerateError> {
    let content = fs::read_to_string(path)?;
    let model: ContentModel = serde_json::from_str(&content)?;
    for post in &model.posts {
        check_slug(&post.slug)?;
    }
    Ok(model)
}

fn check_slug(slug: &str) -> Result<(), GenerateError> {
    let contained = !slug.is_empty()
        && Path::new(slug)
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
    if contained {
        Ok(())
    } else {
        Err(GenerateError::UnsafeSlug(slug.to_string()))
    }
}

/// Render the whole site into `output_dir`.
///
/// `base_url` is the hosting subpath (`""` or e.g. `/gnarwall`); `year` is
/// the copyright year handed to every template.
pub fn generate(
    model: &ContentModel,
    templates_dir: &Path,
    output_dir: &Path,
    base_url: &str,
    year: i32,
) -> Result<GenerateReport, GenerateError> {
    let templates = Templates::load(templates_dir)?;
    fs::create_dir_all(output_dir)?;
    let mut report = GenerateReport::default();

    let html = render_index(&templates.index, model, base_url, year)?;
    write_page(output_dir, "index.html", &html)?;
    report.pages.push(GeneratedPage {
        kind: PageKind::Index,
        title: model.site.title.clone(),
        path: "index.html".to_string(),
    });

    for (idx, post) in model.posts.iter().enumerate() {
        let prev = idx.checked_sub(1).and_then(|i| model.posts.get(i));
        let next = model.posts.get(idx + 1);

        let html = render_post(&templates.post, model, post, prev, next, base_url, year)?;
        let path = format!("{}/index.html", post.slug);
        write_page(output_dir, &path, &html)?;
        report.pages.push(GeneratedPage {
            kind: PageKind::Post,
            title: post.title.clone().unwrap_or_else(|| post.slug.clone()),
            path,
        });
    }

    match model.page(ABOUT_SLUG) {
        Some(page) => {
            let html = render_about(&templates.about, model, page, base_url, year)?;
            let path = format!("{ABOUT_SLUG}/index.html");
            write_page(output_dir, &path, &html)?;
            report.pages.push(GeneratedPage {
                kind: PageKind::About,
                title: page.title.clone().unwrap_or_else(|| ABOUT_SLUG.to_string()),
                path,
            });
        }
        None => warn!("No about page in the content model; skipping about/index.html"),
    }

    info!("Site generated at {}", output_dir.display());
    Ok(report)
}

fn write_page(output_dir: &Path, rel: &str, html: &str) -> Result<(), GenerateError> {
    let path = output_dir.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, html)?;
    debug!("Generated {rel}");
    Ok(())
}

// ============================================================================
// Page rendering
// ============================================================================

pub fn render_index(
    template: &Template,
    model: &ContentModel,
    base_url: &str,
    year: i32,
) -> Result<String, GenerateError> {
    let context = json!({
        "site": model.site,
        "posts": model.posts,
        "year": year,
        "base_url": base_url,
    });
    Ok(template.render(&context))
}

pub fn render_post(
    template: &Template,
    model: &ContentModel,
    post: &Post,
    prev: Option<&Post>,
    next: Option<&Post>,
    base_url: &str,
    year: i32,
) -> Result<String, GenerateError> {
    let post_value = with_enhanced_body(serde_json::to_value(post)?, &post.content_html, base_url);
    let context = json!({
        "site": model.site,
        "post": post_value,
        "prev_post": prev,
        "next_post": next,
        "year": year,
        "base_url": base_url,
    });
    Ok(template.render(&context))
}

pub fn render_about(
    template: &Template,
    model: &ContentModel,
    page: &Page,
    base_url: &str,
    year: i32,
) -> Result<String, GenerateError> {
    let page_value = with_enhanced_body(serde_json::to_value(page)?, &page.content_html, base_url);
    let context = json!({
        "site": model.site,
        "page": page_value,
        "year": year,
        "base_url": base_url,
    });
    Ok(template.render(&context))
}

/// Swap `content_html` in a serialized record for its enhanced form.
fn with_enhanced_body(mut record: Value, content_html: &str, base_url: &str) -> Value {
    if let Some(map) = record.as_object_mut() {
        map.insert(
            "content_html".to_string(),
            Value::String(enhance(content_html, base_url)),
        );
    }
    record
}
