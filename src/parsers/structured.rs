//! Structured-data metadata extraction: JSON-LD first, meta tags second.

use scraper::{Html, Selector};
use serde_json::Value;
use std::sync::LazyLock;

use crate::parsers::html::normalize_whitespace;

/// Raw metadata pulled from a page, before date normalization.
#[derive(Debug, Clone, Default)]
pub struct PageMetadata {
    pub title: Option<String>,
    pub published: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
}

static LD_JSON: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"script[type="application/ld+json"]"#).expect("static selector")
});
static META: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("meta").expect("static selector"));
static TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("static selector"));
static TIME: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("time[datetime]").expect("static selector"));

/// Extract title, publication date, author, and description.
///
/// JSON-LD Article objects win; OpenGraph and plain meta tags fill the
/// remaining gaps. Malformed JSON-LD blocks are skipped, never fatal.
pub fn extract_metadata(html: &str) -> PageMetadata {
    let doc = Html::parse_document(html);
    let mut meta = PageMetadata::default();

    for script in doc.select(&LD_JSON) {
        let raw = script.text().collect::<String>();
        let Ok(value) = serde_json::from_str::<Value>(&raw) else {
            continue;
        };
        for article in article_nodes(&value) {
            merge_article(&mut meta, article);
        }
    }

    // Meta-tag fallbacks for anything JSON-LD did not provide.
    for el in doc.select(&META) {
        let content = el.value().attr("content").map(str::trim);
        let Some(content) = content.filter(|c| !c.is_empty()) else {
            continue;
        };
        let key = el
            .value()
            .attr("property")
            .or_else(|| el.value().attr("name"))
            .unwrap_or("");

        match key {
            "og:title" | "twitter:title" => fill(&mut meta.title, content),
            "article:published_time" | "datePublished" | "date" | "pubdate" => {
                fill(&mut meta.published, content)
            }
            "author" | "article:author" => fill(&mut meta.author, content),
            "og:description" | "description" | "twitter:description" => {
                fill(&mut meta.description, content)
            }
            _ => {}
        }
    }

    if meta.title.is_none() {
        if let Some(t) = doc.select(&TITLE).next() {
            let text = normalize_whitespace(&t.text().collect::<String>());
            fill(&mut meta.title, &text);
        }
    }

    if meta.published.is_none() {
        if let Some(t) = doc.select(&TIME).next() {
            if let Some(dt) = t.value().attr("datetime") {
                fill(&mut meta.published, dt);
            }
        }
    }

    meta
}

/// Walk a JSON-LD value and collect every Article-like node, including
/// those nested inside @graph arrays.
fn article_nodes(value: &Value) -> Vec<&Value> {
    let mut found = Vec::new();
    match value {
        Value::Array(items) => {
            for item in items {
                found.extend(article_nodes(item));
            }
        }
        Value::Object(map) => {
            if let Some(graph) = map.get("@graph") {
                found.extend(article_nodes(graph));
            }
            let is_article = map
                .get("@type")
                .map(|t| match t {
                    Value::String(s) => s.contains("Article"),
                    Value::Array(a) => a
                        .iter()
                        .any(|v| v.as_str().map(|s| s.contains("Article")).unwrap_or(false)),
                    _ => false,
                })
                .unwrap_or(false);
            if is_article {
                found.push(value);
            }
        }
        _ => {}
    }
    found
}

fn merge_article(meta: &mut PageMetadata, article: &Value) {
    if let Some(headline) = article.get("headline").and_then(Value::as_str) {
        fill(&mut meta.title, headline);
    }
    if let Some(date) = article.get("datePublished").and_then(Value::as_str) {
        fill(&mut meta.published, date);
    }
    if let Some(desc) = article.get("description").and_then(Value::as_str) {
        fill(&mut meta.description, desc);
    }
    if let Some(author) = article.get("author") {
        if let Some(name) = author_name(author) {
            fill(&mut meta.author, &name);
        }
    }
}

/// JSON-LD authors come as a string, an object with `name`, or an array
/// of either.
fn author_name(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => map.get("name").and_then(Value::as_str).map(String::from),
        Value::Array(items) => {
            let names: Vec<String> = items.iter().filter_map(author_name).collect();
            if names.is_empty() {
                None
            } else {
                Some(names.join(", "))
            }
        }
        _ => None,
    }
}

fn fill(slot: &mut Option<String>, value: &str) {
    let value = value.trim();
    if slot.is_none() && !value.is_empty() {
        *slot = Some(value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_ld_article() {
        let html = r#"<html><head>
            <script type="application/ld+json">
            {"@type": "NewsArticle",
             "headline": "Transit Plan Approved",
             "datePublished": "2024-03-01T08:30:00Z",
             "author": {"@type": "Person", "name": "Jordan Ruiz"},
             "description": "Council approves new bus network."}
            </script>
            </head><body></body></html>"#;

        let meta = extract_metadata(html);
        assert_eq!(meta.title.as_deref(), Some("Transit Plan Approved"));
        assert_eq!(meta.published.as_deref(), Some("2024-03-01T08:30:00Z"));
        assert_eq!(meta.author.as_deref(), Some("Jordan Ruiz"));
        assert_eq!(
            meta.description.as_deref(),
            Some("Council approves new bus network.")
        );
    }

    #[test]
    fn json_ld_graph_and_author_array() {
        let html = r#"<html><head>
            <script type="application/ld+json">
            {"@graph": [
              {"@type": "WebSite", "name": "ignored"},
              {"@type": ["Article"], "headline": "Graph Story",
               "author": [{"name": "A. One"}, {"name": "B. Two"}]}
            ]}
            </script>
            </head><body></body></html>"#;

        let meta = extract_metadata(html);
        assert_eq!(meta.title.as_deref(), Some("Graph Story"));
        assert_eq!(meta.author.as_deref(), Some("A. One, B. Two"));
    }

    #[test]
    fn meta_tag_fallbacks() {
        let html = r#"<html><head>
            <meta property="og:title" content="OG Headline">
            <meta property="article:published_time" content="2024-02-10">
            <meta name="author" content="Sam Lee">
            <meta name="description" content="Short standfirst.">
            <title>Ignored - OG wins</title>
            </head><body></body></html>"#;

        let meta = extract_metadata(html);
        assert_eq!(meta.title.as_deref(), Some("OG Headline"));
        assert_eq!(meta.published.as_deref(), Some("2024-02-10"));
        assert_eq!(meta.author.as_deref(), Some("Sam Lee"));
        assert_eq!(meta.description.as_deref(), Some("Short standfirst."));
    }

    #[test]
    fn malformed_json_ld_skipped() {
        let html = r#"<html><head>
            <script type="application/ld+json">{not json</script>
            <title>Plain Title</title>
            </head><body><time datetime="2024-01-05"></time></body></html>"#;

        let meta = extract_metadata(html);
        assert_eq!(meta.title.as_deref(), Some("Plain Title"));
        assert_eq!(meta.published.as_deref(), Some("2024-01-05"));
    }
}
