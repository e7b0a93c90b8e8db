//! Alternate-URL discovery for the fallback pass.
//!
//! When every cascade round fails, the page itself often points at a
//! better version of the same story: a canonical URL, an AMP rendition,
//! or a "read more" link out of a teaser page.

use scraper::{Html, Selector};
use std::sync::LazyLock;
use url::Url;

static CANONICAL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"link[rel="canonical"]"#).expect("static selector"));
static AMP: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"link[rel="amphtml"]"#).expect("static selector"));
static ANCHORS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("static selector"));

/// Anchor texts that mark a link to the full story.
const READ_MORE_MARKERS: &[&str] = &[
    "read more",
    "continue reading",
    "full story",
    "read the full",
    "view full article",
];

/// Collect alternate URLs for a page, canonical and AMP first, then
/// "read more" style anchors. Relative URLs are resolved against `base`;
/// the base URL itself and duplicates are dropped.
pub fn discover_alternates(html: &str, base: &Url) -> Vec<String> {
    let doc = Html::parse_document(html);
    let mut out: Vec<String> = Vec::new();

    let mut push = |href: &str| {
        if let Ok(resolved) = base.join(href) {
            if resolved.scheme() != "http" && resolved.scheme() != "https" {
                return;
            }
            let s = resolved.to_string();
            if s != base.as_str() && !out.contains(&s) {
                out.push(s);
            }
        }
    };

    for link in doc.select(&CANONICAL).chain(doc.select(&AMP)) {
        if let Some(href) = link.value().attr("href") {
            push(href);
        }
    }

    for a in doc.select(&ANCHORS) {
        let text = a.text().collect::<String>().trim().to_lowercase();
        if READ_MORE_MARKERS.iter().any(|m| text.contains(m)) {
            if let Some(href) = a.value().attr("href") {
                push(href);
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_and_amp_first() {
        let html = r#"<html><head>
            <link rel="canonical" href="https://news.example.com/story-full">
            <link rel="amphtml" href="/story-amp">
            </head><body>
            <a href="/story-full-text">Read more</a>
            </body></html>"#;
        let base = Url::parse("https://news.example.com/story?utm=x").unwrap();

        let alts = discover_alternates(html, &base);
        assert_eq!(alts[0], "https://news.example.com/story-full");
        assert_eq!(alts[1], "https://news.example.com/story-amp");
        assert_eq!(alts[2], "https://news.example.com/story-full-text");
    }

    #[test]
    fn skips_base_and_duplicates() {
        let html = r#"<html><head>
            <link rel="canonical" href="https://news.example.com/story">
            </head><body>
            <a href="https://news.example.com/more">Continue reading</a>
            <a href="https://news.example.com/more">continue reading here</a>
            </body></html>"#;
        let base = Url::parse("https://news.example.com/story").unwrap();

        let alts = discover_alternates(html, &base);
        assert_eq!(alts, vec!["https://news.example.com/more".to_string()]);
    }

    #[test]
    fn ignores_unrelated_anchors() {
        let html = r#"<html><body>
            <a href="/about">About us</a>
            <a href="mailto:desk@example.com">Read more by email</a>
            </body></html>"#;
        let base = Url::parse("https://news.example.com/story").unwrap();
        assert!(discover_alternates(html, &base).is_empty());
    }
}
