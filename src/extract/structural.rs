//! DOM-based extraction backend.
//!
//! Parses the document with html5ever (through `kuchikiki`) and reads fields
//! with CSS selectors matching the WordPress theme's markup.

use super::{ExtractBackend, FeaturedImages, Fields, non_empty};
use crate::dom;
use crate::normalize::canonical_upload_path;

const TITLE: &str = "h1.entry-title";
const PUBLISHED: &str = "time.entry-date.published";
const CONTENT: &str = "div.entry-content";
/// Jetpack sharing buttons and related-post widgets appended to every body.
const WIDGETS: &str = "#jp-post-flair, .sharedaddy, #jp-relatedposts";

const ARTICLE: &str = "article.hentry";
const PERMALINK: &str = "a.entry-link, h1.entry-title a";
const THUMBNAIL: &str = ".entry-thumbnail img";
const SITE_TITLE: &str = "h1.site-title";

pub struct StructuralBackend;

impl ExtractBackend for StructuralBackend {
    fn name(&self) -> &'static str {
        "structural"
    }

    fn extract(&self, document: &str) -> Fields {
        let doc = dom::parse(document);

        let title = dom::select_first(&doc, TITLE).map(|h1| dom::trimmed_text(&h1));

        let (date_iso, date_display) = match dom::select_first(&doc, PUBLISHED) {
            // A <time> without datetime still counts as found: the ISO value
            // is empty rather than absent, as the theme printed it.
            Some(time) => (
                Some(dom::attr(&time, "datetime").unwrap_or_default()),
                Some(dom::trimmed_text(&time)),
            ),
            None => (None, None),
        };

        let content_html = dom::select_first(&doc, CONTENT).map(|body| {
            for widget in dom::select_all(&body, WIDGETS) {
                widget.detach();
            }
            dom::outer_html(&body)
        });

        Fields {
            title,
            date_iso,
            date_display,
            content_html,
        }
    }

    fn featured_images(&self, homepage: &str) -> FeaturedImages {
        let doc = dom::parse(homepage);
        let mut featured = FeaturedImages::new();

        for article in dom::select_all(&doc, ARTICLE) {
            let Some(link) = dom::select_first(&article, PERMALINK) else {
                continue;
            };
            let href = dom::attr(&link, "href").unwrap_or_default();

            if let Some(img) = dom::select_first(&article, THUMBNAIL) {
                let src = dom::attr(&img, "src").unwrap_or_default();
                let src = canonical_upload_path(&src).unwrap_or(src);
                featured.insert(href, src);
            }
        }

        featured
    }

    fn site_title(&self, homepage: &str) -> Option<String> {
        let doc = dom::parse(homepage);
        dom::select_first(&doc, SITE_TITLE)
            .map(|h1| dom::trimmed_text(&h1))
            .and_then(non_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::post_document;

    #[test]
    fn title_includes_nested_tag_text() {
        let doc = r#"<h1 class="entry-title"><em>Snow</em> day &amp; night</h1>"#;
        let fields = StructuralBackend.extract(doc);
        assert_eq!(fields.title.as_deref(), Some("Snow day & night"));
    }

    #[test]
    fn sharing_widgets_removed_from_body() {
        let body = r#"<p>Text</p><div class="sharedaddy sd-sharing-enabled">Share this</div><div id="jp-relatedposts">Related</div>"#;
        let doc = post_document("T", "2017-01-01", "January 1, 2017", body);
        let content = StructuralBackend.extract(&doc).content_html.unwrap();

        assert!(content.starts_with(r#"<div class="entry-content">"#));
        assert!(content.contains("<p>Text</p>"));
        assert!(!content.contains("Share this"));
        assert!(!content.contains("Related"));
        assert!(!content.contains("jp-post-flair"));
    }

    #[test]
    fn only_published_time_is_read() {
        let doc = r#"
            <time class="updated" datetime="2020-01-01">January 1, 2020</time>
            <time class="entry-date published" datetime="2017-07-11T08:00:00+00:00">
                July 11, 2017
            </time>"#;
        let fields = StructuralBackend.extract(doc);
        assert_eq!(fields.date_iso.as_deref(), Some("2017-07-11T08:00:00+00:00"));
        assert_eq!(fields.date_display.as_deref(), Some("July 11, 2017"));
    }

    #[test]
    fn time_without_datetime_gives_empty_iso() {
        let doc = r#"<time class="entry-date published">Someday</time>"#;
        let fields = StructuralBackend.extract(doc);
        assert_eq!(fields.date_iso.as_deref(), Some(""));
        assert_eq!(fields.date_display.as_deref(), Some("Someday"));
    }

    #[test]
    fn missing_elements_are_none() {
        let fields = StructuralBackend.extract("<html><body><p>No theme markup</p></body></html>");
        assert_eq!(fields, Fields::default());
    }

    #[test]
    fn article_without_link_is_skipped() {
        let homepage = r#"
            <article class="post hentry">
                <div class="entry-thumbnail"><img src="/wp-content/uploads/a.jpg"></div>
            </article>"#;
        assert!(StructuralBackend.featured_images(homepage).is_empty());
    }

    #[test]
    fn article_without_thumbnail_is_skipped() {
        let homepage = r#"
            <article class="post hentry">
                <h1 class="entry-title"><a href="2017/01/01/a/index.html">A</a></h1>
            </article>"#;
        assert!(StructuralBackend.featured_images(homepage).is_empty());
    }

    #[test]
    fn thumbnail_cdn_url_canonicalized() {
        let homepage = r#"
            <article class="post hentry">
                <div class="entry-thumbnail">
                    <img src="https://i0.wp.com/example.org/wp-content/uploads/2017/07/x.jpg?resize=300%2C200&amp;ssl=1">
                </div>
                <a class="entry-link" href="2017/07/11/x/index.html">Read</a>
            </article>"#;
        let map = StructuralBackend.featured_images(homepage);
        assert_eq!(
            map.get("2017/07/11/x/index.html").map(String::as_str),
            Some("/wp-content/uploads/2017/07/x.jpg")
        );
    }

    #[test]
    fn blank_site_title_is_none() {
        assert_eq!(StructuralBackend.site_title(r#"<h1 class="site-title">  </h1>"#), None);
    }
}
