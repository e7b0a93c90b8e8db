//! End-to-end pipeline tests: cascade ordering, learning, stability,
//! optimization, and the failure contract, all over the mock seams.

use std::sync::Arc;
use std::time::Duration;

use article_extraction::strategies::names;
use article_extraction::{
    DomainStabilityTracker, ExtractionMemory, Extractor, MemoryStore, MockAdvisor, MockBrowser,
    MockFetcher, ParsedSelectors, RenderMethod, SelectorOptimizer, SelectorProposal,
};

const FULL_ARTICLE: &str = r#"
    <html><head>
    <title>Transit Plan Approved | Example News</title>
    <script type="application/ld+json">
    {"@type": "NewsArticle",
     "headline": "Transit Plan Approved",
     "datePublished": "2024-03-15T10:30:00Z",
     "author": {"@type": "Person", "name": "Jordan Ruiz"},
     "description": "Council approves the expanded bus network."}
    </script>
    </head><body>
    <nav><a href="/">Home</a><a href="/news">News</a></nav>
    <article>
    <p>The city council voted on Tuesday evening to approve the expanded
    transit plan after months of public hearings and revisions. Supporters
    argued the investment would reshape commuting patterns for a generation
    of residents in the fast-growing outer neighborhoods.</p>
    <p>Opponents questioned the cost projections and asked for an
    independent audit before construction begins next spring. The mayor
    said groundbreaking remains on schedule regardless.</p>
    </article>
    </body></html>
"#;

// Short enough that the readability heuristic passes on it, found only
// through the selector catalogue, so a pattern gets learned.
const SHORT_ARTICLE: &str = r#"
    <html><body>
    <div class="article-body">
    <p>Harbor crews finished the seawall repairs two weeks early. The
    project came in under budget despite a stormy January along the coast.</p>
    </div>
    </body></html>
"#;

// A JavaScript wall: nothing extractable from static HTML, and the
// boilerplate phrase keeps the raw-text last resort honest.
const JS_WALL: &str = r#"
    <html><body>
    <div id="root">Please enable JavaScript to continue reading this page.</div>
    </body></html>
"#;

const RENDERED_TEXT: &str = "The archive digitization project reached its halfway \
    point this week, with volunteers scanning the last of the 1950s city records. \
    Organizers expect the full collection to be searchable online by autumn, \
    including thousands of photographs never displayed publicly before.";

fn extractor_with(fetcher: MockFetcher, memory: Arc<MemoryStore>) -> Extractor {
    Extractor::new(memory, Arc::new(fetcher))
}

#[tokio::test]
async fn new_domain_extracts_and_records_success() {
    let memory = Arc::new(MemoryStore::new());
    let fetcher = MockFetcher::new().with_page("https://news.example/story", FULL_ARTICLE);
    let extractor = extractor_with(fetcher, Arc::clone(&memory));

    let result = extractor.extract("https://news.example/story").await;
    assert!(result.is_success());
    assert_eq!(result.method_used, names::READABILITY);
    assert!(result.content.as_ref().unwrap().contains("transit plan"));

    // Metadata enrichment from JSON-LD, with the date normalized.
    assert_eq!(result.title.as_deref(), Some("Transit Plan Approved"));
    assert_eq!(result.author.as_deref(), Some("Jordan Ruiz"));
    assert!(result.publication_date.unwrap().starts_with("2024-03-15"));

    let stats = memory.domain_stats("news.example").await.unwrap().unwrap();
    assert_eq!(stats.successes, 1);
    assert_eq!(stats.total_attempts, 1);
}

#[tokio::test]
async fn catalog_hit_becomes_learned_pattern_and_domain_stabilizes() {
    let memory = Arc::new(MemoryStore::new());
    let fetcher = MockFetcher::new().with_page("https://coast.example/seawall", SHORT_ARTICLE);
    let extractor = extractor_with(fetcher, Arc::clone(&memory));

    // First visit: readability fails (too little text), the catalogue
    // finds .article-body and the selector is learned.
    let first = extractor.extract("https://coast.example/seawall").await;
    assert!(first.is_success());
    assert_eq!(first.method_used, names::SELECTOR_CATALOG);

    let best = memory.best_pattern("coast.example").await.unwrap().unwrap();
    assert_eq!(best.selector, ".article-body");
    assert_eq!(best.success_count, 1);

    // Subsequent visits go straight through the learned pattern.
    for _ in 0..3 {
        let again = extractor.extract("https://coast.example/seawall").await;
        assert!(again.is_success());
        assert_eq!(again.method_used, "learned_pattern_.article-body");
    }

    let best = memory.best_pattern("coast.example").await.unwrap().unwrap();
    assert_eq!(best.success_count, 4);
    assert!(best.stable);

    // 5 attempts (1 readability failure + 4 successes) at 80%: stable.
    let stats = memory.domain_stats("coast.example").await.unwrap().unwrap();
    assert_eq!(stats.total_attempts, 5);
    assert!(stats.is_stable());

    let tracker = DomainStabilityTracker::new(
        Arc::clone(&memory) as Arc<dyn ExtractionMemory>,
        Duration::from_secs(10),
    );
    assert!(tracker.is_stable("coast.example").await.unwrap());
}

#[tokio::test]
async fn proven_pattern_skips_the_browser_entirely() {
    let memory = Arc::new(MemoryStore::new());
    // Seed a pattern with an 80% track record.
    for _ in 0..4 {
        let a = article_extraction::ExtractionAttempt::succeeded(
            "https://coast.example/old",
            "coast.example",
            names::LEARNED_PATTERN,
        )
        .with_selector(".article-body")
        .with_quality_score(0.9)
        .with_content_length(500);
        memory.record_attempt(&a).await.unwrap();
    }
    let miss = article_extraction::ExtractionAttempt::failed(
        "https://coast.example/old",
        "coast.example",
        names::LEARNED_PATTERN,
        "rejected",
    )
    .with_selector(".article-body");
    memory.record_attempt(&miss).await.unwrap();

    let fetcher = MockFetcher::new().with_page("https://coast.example/seawall", SHORT_ARTICLE);
    let browser = MockBrowser::returning_text(RENDERED_TEXT, RenderMethod::FullDocument);
    let extractor =
        extractor_with(fetcher, Arc::clone(&memory)).with_browser(Arc::new(browser.clone()));

    let result = extractor.extract("https://coast.example/seawall").await;
    assert!(result.is_success());
    assert_eq!(result.method_used, "learned_pattern_.article-body");
    assert_eq!(browser.render_count(), 0);
}

#[tokio::test]
async fn js_page_renders_exactly_once() {
    let memory = Arc::new(MemoryStore::new());
    let fetcher = MockFetcher::new().with_page("https://spa.example/story", JS_WALL);
    let browser = MockBrowser::returning_text(RENDERED_TEXT, RenderMethod::Selector("article".into()));
    let extractor =
        extractor_with(fetcher, Arc::clone(&memory)).with_browser(Arc::new(browser.clone()));

    let result = extractor.extract("https://spa.example/story").await;
    assert!(result.is_success());
    assert_eq!(result.method_used, names::BROWSER);
    assert_eq!(browser.render_count(), 1);

    // The static strategies that applied recorded their failures.
    let attempts = memory.attempts_for_domain("spa.example").await.unwrap();
    assert!(attempts.iter().any(|a| a.strategy == names::READABILITY && !a.success));
    assert!(attempts.iter().any(|a| a.strategy == names::BROWSER && a.success));
}

#[tokio::test]
async fn unreachable_url_records_one_fetch_failure_per_round() {
    let memory = Arc::new(MemoryStore::new());
    let fetcher = MockFetcher::failing();
    let extractor = extractor_with(fetcher.clone(), Arc::clone(&memory));

    let result = extractor.extract("https://down.example/story").await;
    assert!(!result.is_success());
    assert_eq!(result.method_used, "failed");
    assert!(result.content.is_none());

    let retry_budget = extractor.config().retry_budget as usize;
    assert_eq!(fetcher.call_count(), retry_budget);

    let attempts = memory.attempts_for_domain("down.example").await.unwrap();
    assert_eq!(attempts.len(), retry_budget);
    assert!(attempts.iter().all(|a| a.strategy == names::FETCH && !a.success));
}

#[tokio::test]
async fn failing_domain_gets_optimized_then_recovers() {
    let memory = Arc::new(MemoryStore::new());
    // The article text hides in a container no built-in strategy knows.
    let page = r#"
        <html><body>
        <div id="root">Please enable JavaScript to continue reading this page.</div>
        <div class="js-article-slot">
        <p>Negotiators reached a tentative agreement late Thursday night,
        ending the nine-day strike at the regional ports. Union members vote
        on the contract terms early next week.</p>
        </div>
        </body></html>
    "#;
    let fetcher = MockFetcher::new().with_page("https://hard.example/story", page);
    let extractor = extractor_with(fetcher.clone(), Arc::clone(&memory));

    // The cascade fails; failure history accumulates.
    let result = extractor.extract("https://hard.example/story").await;
    assert!(!result.is_success());
    let stats = memory.domain_stats("hard.example").await.unwrap().unwrap();
    assert!(stats.total_attempts >= 3);
    assert_eq!(stats.successes, 0);

    // The optimizer asks the advisor and seeds its proposal.
    let tracker = DomainStabilityTracker::new(
        Arc::clone(&memory) as Arc<dyn ExtractionMemory>,
        Duration::from_secs(10),
    );
    let advisor = MockAdvisor::returning(ParsedSelectors {
        content_selectors: vec![SelectorProposal {
            selector: ".js-article-slot".to_string(),
            confidence: 0.85,
            reasoning: "main text container".to_string(),
        }],
        date_selectors: vec![],
        requires_link_following: false,
        link_patterns: vec![],
    });
    let optimizer = SelectorOptimizer::new(
        Arc::clone(&memory) as Arc<dyn ExtractionMemory>,
        Arc::new(fetcher.clone()),
        Arc::new(advisor.clone()),
        tracker,
        Default::default(),
    );
    let stored = optimizer
        .optimize_domain("hard.example", "https://hard.example/story")
        .await
        .unwrap();
    assert_eq!(stored, 1);
    assert_eq!(advisor.calls(), 1);

    // Next extraction tries the untested proposal and succeeds with it.
    let result = extractor.extract("https://hard.example/story").await;
    assert!(result.is_success());
    assert_eq!(result.method_used, "learned_pattern_.js-article-slot");
    assert!(result.content.unwrap().contains("tentative agreement"));

    let best = memory.best_pattern("hard.example").await.unwrap().unwrap();
    assert_eq!(best.selector, ".js-article-slot");
    assert_eq!(best.success_count, 1);
}

#[tokio::test]
async fn alternate_url_rescues_exhausted_budget() {
    let memory = Arc::new(MemoryStore::new());
    let teaser = r#"
        <html><head>
        <link rel="canonical" href="https://news.example/full-story">
        </head><body>
        <div id="root">Please enable JavaScript to continue reading this page.</div>
        </body></html>
    "#;
    let fetcher = MockFetcher::new()
        .with_page("https://news.example/teaser", teaser)
        .with_page("https://news.example/full-story", FULL_ARTICLE);
    let extractor = extractor_with(fetcher.clone(), Arc::clone(&memory));

    let result = extractor.extract("https://news.example/teaser").await;
    assert!(result.is_success());
    assert_eq!(result.method_used, names::READABILITY);
    assert!(fetcher
        .calls()
        .iter()
        .any(|u| u == "https://news.example/full-story"));
}

#[tokio::test]
async fn cancelled_call_returns_null_result_without_fetching() {
    let memory = Arc::new(MemoryStore::new());
    let fetcher = MockFetcher::new().with_page("https://news.example/story", FULL_ARTICLE);
    let extractor = extractor_with(fetcher.clone(), Arc::clone(&memory));

    let token = tokio_util::sync::CancellationToken::new();
    token.cancel();

    let result = extractor
        .extract_cancellable("https://news.example/story", &token)
        .await;
    assert!(!result.is_success());
    assert_eq!(fetcher.call_count(), 0);
    assert!(memory
        .attempts_for_domain("news.example")
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn learned_state_survives_snapshot_restart() {
    let memory = Arc::new(MemoryStore::new());
    let fetcher = MockFetcher::new().with_page("https://coast.example/seawall", SHORT_ARTICLE);
    let extractor = extractor_with(fetcher.clone(), Arc::clone(&memory));
    assert!(extractor.extract("https://coast.example/seawall").await.is_success());

    let restored = Arc::new(MemoryStore::from_snapshot(memory.snapshot()));
    let extractor = extractor_with(fetcher, Arc::clone(&restored));

    let result = extractor.extract("https://coast.example/seawall").await;
    assert_eq!(result.method_used, "learned_pattern_.article-body");
}

#[tokio::test]
async fn gate_rejected_text_never_becomes_a_success() {
    let memory = Arc::new(MemoryStore::new());
    // Long enough to clear the raw-text floor, but one word repeated has
    // no vocabulary and no sentences; the gate must refuse it.
    let junk = format!(
        "<html><body><div>{}</div></body></html>",
        "widget ".repeat(40)
    );
    let fetcher = MockFetcher::new().with_page("https://spam.example/story", &junk);
    let extractor = extractor_with(fetcher, Arc::clone(&memory));

    let result = extractor.extract("https://spam.example/story").await;
    assert!(!result.is_success());
    assert_eq!(result.method_used, "failed");

    // Every rejection landed as a failed attempt, none as a success.
    let attempts = memory.attempts_for_domain("spam.example").await.unwrap();
    assert!(!attempts.is_empty());
    assert!(attempts.iter().all(|a| !a.success));
}

#[tokio::test]
async fn garbage_url_fails_without_side_effects() {
    let memory = Arc::new(MemoryStore::new());
    let fetcher = MockFetcher::new();
    let extractor = extractor_with(fetcher.clone(), Arc::clone(&memory));

    for url in ["", "not a url", "ftp://example.com/x", "javascript:void(0)"] {
        let result = extractor.extract(url).await;
        assert!(!result.is_success(), "{url:?} should fail");
    }
    assert_eq!(fetcher.call_count(), 0);
    assert_eq!(memory.domain_count(), 0);
}
