//! # wp-static
//!
//! Rebuilds a WordPress site from its HTML export. The export is the data
//! source: dated `index.html` files become posts, the homepage supplies the
//! site title and each post's featured image, and a handful of named
//! directories become static pages.
//!
//! # Architecture: Two-Stage Pipeline
//!
//! ```text
//! 1. Extract   docs/              →  content.json   (WordPress HTML → content model)
//! 2. Generate  content.json       →  site/          (templates → final HTML)
//! ```
//!
//! The content model between the stages is plain JSON you can inspect and
//! edit by hand. Generation needs nothing else, so a site can be re-themed
//! without touching the export again.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`assemble`] | Stage 1: walks the export, runs extraction per document, produces the content model |
//! | [`extract`] | Field extraction behind the [`extract::ExtractBackend`] trait: DOM or regex |
//! | [`normalize`] | Body cleanup: canonical image paths, attachment links, galleries |
//! | [`featured`] | Featured image per post, from homepage thumbnails or the body |
//! | [`generate`] | Stage 2: renders index, post and about pages from the content model |
//! | [`template`] | The `{{ }}` / `{% if %}` / `{% for %}` template engine |
//! | [`enhance`] | Render-time body rewrites: lightbox links, orientation classes, base URL |
//! | [`config`] | `config.toml` loading, validation and merging over stock defaults |
//! | [`types`] | The content model serialized between stages |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Two Extraction Strategies
//!
//! The structural backend parses each document with html5ever and reads it
//! with CSS selectors. The pattern backend matches the theme's literal
//! markup with regular expressions. Both produce the same [`extract::Fields`];
//! the pattern backend is kept as a fallback for exports that confuse the
//! parser, with the known limitation that a title containing markup is lost.
//!
//! ## Canonical Image Paths
//!
//! WordPress serves uploads through CDN hosts with resize query strings.
//! Every image reference is reduced to `/wp-content/uploads/…` at extraction
//! time, so the content model is host-independent and the site can serve
//! the originals itself.
//!
//! ## Templates Over Code
//!
//! Page markup lives in user templates rather than in the binary. The
//! template language is deliberately tiny: variables, conditionals and loops
//! over the content model. Bodies are emitted unescaped; they are HTML.

pub mod assemble;
pub mod config;
pub mod dom;
pub mod enhance;
pub mod extract;
pub mod featured;
pub mod generate;
pub mod logger;
pub mod normalize;
pub mod output;
pub mod template;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
