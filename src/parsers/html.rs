//! Structural HTML extraction: selector application, a generic
//! main-content heuristic, and the tag-stripping last resort.

use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

/// Curated catalogue of content-container selectors, ordered from most to
/// least specific. Semantic tags first, then common content classes, then
/// schema.org microdata.
pub const CONTENT_SELECTORS: &[&str] = &[
    "article",
    "main",
    "[role=\"main\"]",
    "[itemprop=\"articleBody\"]",
    ".article-body",
    ".article-content",
    ".article__content",
    ".post-content",
    ".post-body",
    ".entry-content",
    ".story-body",
    ".story-content",
    "#article-body",
    "#content article",
    ".rich-text",
];

/// Containers below this many characters are ignored by the readability
/// heuristic.
const READABLE_MIN_CHARS: usize = 250;

/// Containers whose text is mostly links are navigation, not content.
const READABLE_MAX_LINK_DENSITY: f64 = 0.5;

static P_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p").expect("static selector"));
static A_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a").expect("static selector"));

/// Apply a CSS selector to the document and return the first matching
/// element's text. Invalid selectors and empty matches both yield None.
pub fn select_text(html: &str, selector: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    let sel = Selector::parse(selector).ok()?;
    let element = doc.select(&sel).next()?;
    let text = element_text(&element);
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Generic main-content heuristic.
///
/// Scores candidate containers by text length, paragraph count, and link
/// density, and returns the best one's text. Works on static article pages
/// without any site knowledge.
pub fn extract_readable(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    let candidates = Selector::parse("article, main, section, div").ok()?;

    let mut best: Option<(f64, String)> = None;
    for el in doc.select(&candidates) {
        let text = element_text(&el);
        let len = text.chars().count();
        if len < READABLE_MIN_CHARS {
            continue;
        }

        let link_chars: usize = el
            .select(&A_SELECTOR)
            .map(|a| a.text().map(|t| t.chars().count()).sum::<usize>())
            .sum();
        let link_density = link_chars as f64 / len as f64;
        if link_density > READABLE_MAX_LINK_DENSITY {
            continue;
        }

        let paragraph_count = el.select(&P_SELECTOR).count();
        let score = len as f64 * (1.0 - link_density) + paragraph_count as f64 * 25.0;

        if best.as_ref().map_or(true, |(s, _)| score > *s) {
            best = Some((score, text));
        }
    }

    best.map(|(_, text)| text)
}

/// All paragraph texts in document order, whitespace-normalized.
pub fn paragraphs(html: &str) -> Vec<String> {
    let doc = Html::parse_document(html);
    doc.select(&P_SELECTOR)
        .map(|p| normalize_whitespace(&p.text().collect::<String>()))
        .filter(|t| !t.is_empty())
        .collect()
}

/// Text of an element, preserving paragraph breaks where the markup has
/// them and collapsing the rest of the whitespace.
pub fn element_text(el: &ElementRef<'_>) -> String {
    let parts: Vec<String> = el
        .select(&P_SELECTOR)
        .map(|p| normalize_whitespace(&p.text().collect::<String>()))
        .filter(|t| !t.is_empty())
        .collect();

    if parts.is_empty() {
        normalize_whitespace(&el.text().collect::<String>())
    } else {
        parts.join("\n\n")
    }
}

/// Strip script/style/navigation/ad markup and return whatever text is
/// left. The raw-text last resort builds directly on this.
pub fn strip_boilerplate(html: &str) -> String {
    static KILL_BLOCKS: LazyLock<regex::Regex> = LazyLock::new(|| {
        let tags = [
            "script", "style", "nav", "header", "footer", "aside", "noscript", "form", "iframe",
            "svg",
        ];
        let pattern = tags
            .iter()
            .map(|t| format!(r"<{t}[^>]*>.*?</{t}>"))
            .collect::<Vec<_>>()
            .join("|");
        regex::Regex::new(&format!("(?is){pattern}")).expect("static regex")
    });
    static COMMENTS: LazyLock<regex::Regex> =
        LazyLock::new(|| regex::Regex::new(r"(?s)<!--.*?-->").expect("static regex"));
    static AD_BLOCKS: LazyLock<regex::Regex> = LazyLock::new(|| {
        regex::Regex::new(
            r#"(?is)<div[^>]*(?:class|id)="[^"]*(?:\bad\b|advert|promo|banner|sponsor|sidebar)[^"]*"[^>]*>.*?</div>"#,
        )
        .expect("static regex")
    });
    static BLOCK_ENDS: LazyLock<regex::Regex> =
        LazyLock::new(|| regex::Regex::new(r"(?i)</(p|div|li|h[1-6]|tr|blockquote)>").expect("static regex"));
    static TAGS: LazyLock<regex::Regex> =
        LazyLock::new(|| regex::Regex::new(r"<[^>]+>").expect("static regex"));
    static BLANK_RUNS: LazyLock<regex::Regex> =
        LazyLock::new(|| regex::Regex::new(r"\n{3,}").expect("static regex"));

    let mut text = KILL_BLOCKS.replace_all(html, "").into_owned();
    text = COMMENTS.replace_all(&text, "").into_owned();
    text = AD_BLOCKS.replace_all(&text, "").into_owned();
    text = BLOCK_ENDS.replace_all(&text, "\n").into_owned();
    text = TAGS.replace_all(&text, " ").into_owned();

    text = decode_entities(&text);

    let lines: Vec<String> = text
        .lines()
        .map(|l| normalize_whitespace(l))
        .filter(|l| !l.is_empty())
        .collect();
    BLANK_RUNS.replace_all(&lines.join("\n"), "\n\n").into_owned()
}

/// Collapse runs of whitespace into single spaces.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&rsquo;", "'")
        .replace("&lsquo;", "'")
        .replace("&mdash;", "--")
        .replace("&hellip;", "...")
}
