//! The content quality gate.
//!
//! A composite heuristic that adjudicates every candidate the cascade
//! produces. Pure function of the text and thresholds, no state. This is
//! the single chokepoint: strategies may pre-check for efficiency, but the
//! orchestrator re-validates every candidate here before accepting it.

use crate::types::config::QualityThresholds;

/// Word fragments that indicate navigation chrome rather than prose.
const NAV_KEYWORDS: &[&str] = &[
    "home",
    "menu",
    "login",
    "signin",
    "register",
    "subscribe",
    "newsletter",
    "cookie",
    "cookies",
    "privacy",
    "policy",
    "terms",
    "contact",
    "search",
    "share",
    "tweet",
    "facebook",
    "twitter",
    "instagram",
    "advertisement",
    "sponsored",
    "comments",
    "trending",
    "related",
    "copyright",
    "sitemap",
];

/// Phrases that mark error pages and JS walls, never article text.
const BOILERPLATE_PHRASES: &[&str] = &[
    "page not found",
    "404 not found",
    "error 404",
    "enable javascript",
    "javascript is required",
    "please turn on javascript",
    "javascript is disabled",
    "access denied",
    "are you a robot",
    "unusual traffic",
    "complete the captcha",
    "browser is not supported",
];

/// Outcome of a gate evaluation.
#[derive(Debug, Clone)]
pub struct QualityVerdict {
    /// Whether the candidate passed every check
    pub accepted: bool,

    /// Fraction of checks passed, in [0, 1]; feeds pattern averages
    pub score: f32,

    /// First failing check, for attempt records
    pub rejection: Option<&'static str>,
}

/// The composite quality gate.
#[derive(Debug, Clone)]
pub struct QualityGate {
    thresholds: QualityThresholds,
}

impl Default for QualityGate {
    fn default() -> Self {
        Self::new(QualityThresholds::default())
    }
}

impl QualityGate {
    pub fn new(thresholds: QualityThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &QualityThresholds {
        &self.thresholds
    }

    /// The boolean chokepoint.
    ///
    /// `full_article_hint` relaxes the length and sentence requirements for
    /// candidates that came out of a dedicated article container, where
    /// short but legitimate pieces are common.
    pub fn is_good_content(&self, text: &str, full_article_hint: bool) -> bool {
        self.evaluate(text, full_article_hint).accepted
    }

    /// Full evaluation with score and rejection reason.
    pub fn evaluate(&self, text: &str, full_article_hint: bool) -> QualityVerdict {
        let t = &self.thresholds;
        let text = text.trim();
        let char_count = text.chars().count();

        let min_length = if full_article_hint {
            t.min_length / 2
        } else {
            t.min_length
        };
        let min_sentences = if full_article_hint { 1 } else { t.min_sentences };
        let nav_ceiling = if full_article_hint {
            t.relaxed_nav_keyword_ratio
        } else {
            t.max_nav_keyword_ratio
        };

        let mut checks: Vec<(&'static str, bool)> = Vec::with_capacity(8);

        checks.push(("too short", char_count >= min_length));

        // Whitespace ratio outside the band means either a wall of
        // unbroken text or markup soup.
        let whitespace = text.chars().filter(|c| c.is_whitespace()).count();
        let ws_ratio = if char_count == 0 {
            0.0
        } else {
            whitespace as f32 / char_count as f32
        };
        checks.push((
            "whitespace ratio out of band",
            ws_ratio >= t.min_whitespace_ratio && ws_ratio <= t.max_whitespace_ratio,
        ));

        let sentences: Vec<&str> = text
            .split(['.', '!', '?'])
            .map(str::trim)
            .filter(|s| s.chars().count() > t.min_sentence_chars)
            .collect();
        checks.push(("too few sentences", sentences.len() >= min_sentences));

        let avg_sentence_len = if sentences.is_empty() {
            0.0
        } else {
            sentences.iter().map(|s| s.chars().count()).sum::<usize>() as f32
                / sentences.len() as f32
        };
        checks.push((
            "sentences too short",
            avg_sentence_len >= t.min_avg_sentence_chars,
        ));

        let words: Vec<String> = text.split_whitespace().map(clean_word).collect();
        let total_words = words.len().max(1);

        let mut unique = std::collections::HashSet::new();
        let mut long_words = 0usize;
        for w in words.iter().filter(|w| w.chars().count() > 3) {
            long_words += 1;
            unique.insert(w.as_str());
        }
        let unique_ratio = if long_words == 0 {
            0.0
        } else {
            unique.len() as f32 / total_words as f32
        };
        checks.push((
            "vocabulary too repetitive",
            unique_ratio >= t.min_unique_word_ratio,
        ));

        let nav_hits = words
            .iter()
            .filter(|w| NAV_KEYWORDS.contains(&w.as_str()))
            .count();
        checks.push((
            "navigation keyword density too high",
            (nav_hits as f32 / total_words as f32) <= nav_ceiling,
        ));

        // Anti-repetition: one dominant word means a listing or a glitch.
        let mut counts: std::collections::HashMap<&str, usize> = std::collections::HashMap::new();
        for w in words.iter().filter(|w| w.chars().count() > 4) {
            *counts.entry(w.as_str()).or_insert(0) += 1;
        }
        let max_word_share = counts
            .values()
            .map(|&c| c as f32 / total_words as f32)
            .fold(0.0f32, f32::max);
        checks.push((
            "single word dominates",
            max_word_share <= t.max_single_word_ratio,
        ));

        checks.push(("boilerplate phrase", !has_boilerplate(text)));

        let passed = checks.iter().filter(|(_, ok)| *ok).count();
        let score = passed as f32 / checks.len() as f32;
        let rejection = checks.iter().find(|(_, ok)| !ok).map(|(name, _)| *name);

        QualityVerdict {
            accepted: rejection.is_none(),
            score,
            rejection,
        }
    }
}

/// Whether the text contains an error-page or JS-wall phrase. Exposed for
/// the last-resort strategy, which skips the full gate but must never
/// accept an error page.
pub fn has_boilerplate(text: &str) -> bool {
    let lowered = text.to_lowercase();
    BOILERPLATE_PHRASES.iter().any(|p| lowered.contains(p))
}

fn clean_word(raw: &str) -> String {
    raw.trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase()
}
