//! Hand-rolled mocks for the pipeline seams.
//!
//! All mocks are cheap to clone and share their interior state, so a test
//! can hand one to the pipeline and keep a handle for assertions.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::{AdvisorError, AdvisorResult, BrowserError, BrowserResult, FetchError, FetchResult};
use crate::traits::advisor::{ParsedSelectors, SelectorAdvisor, SelectorRequest};
use crate::traits::browser::{BrowserEngine, RenderMethod, RenderedPage};
use crate::traits::fetcher::{FetchedPage, PageFetcher};

/// Serves canned HTML by URL; unknown URLs 404 and fetches can be forced
/// to fail wholesale.
#[derive(Clone, Default)]
pub struct MockFetcher {
    pages: Arc<RwLock<HashMap<String, String>>>,
    fail_all: bool,
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `html` for `url`.
    pub fn with_page(self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.write().unwrap().insert(url.into(), html.into());
        self
    }

    /// Every fetch fails as if retries were exhausted.
    pub fn failing() -> Self {
        Self {
            fail_all: true,
            ..Self::default()
        }
    }

    /// URLs fetched, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> FetchResult<FetchedPage> {
        self.calls.write().unwrap().push(url.to_string());
        if self.fail_all {
            return Err(FetchError::RetriesExhausted {
                url: url.to_string(),
                attempts: 3,
            });
        }
        match self.pages.read().unwrap().get(url) {
            Some(html) => Ok(FetchedPage::from_html(url, html.clone())),
            None => Err(FetchError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}

/// Returns a fixed rendered page (or a fixed error) and counts renders.
#[derive(Clone)]
pub struct MockBrowser {
    response: Arc<std::result::Result<RenderedPage, String>>,
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockBrowser {
    /// Render every URL to the same text via the given method.
    pub fn returning_text(text: impl Into<String>, method: RenderMethod) -> Self {
        let text = text.into();
        Self {
            response: Arc::new(Ok(RenderedPage {
                html: format!("<html><body>{text}</body></html>"),
                text,
                title: None,
                method,
            })),
            calls: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Every render fails.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            response: Arc::new(Err(message.into())),
            calls: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn render_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }
}

#[async_trait]
impl BrowserEngine for MockBrowser {
    async fn render(&self, url: &str) -> BrowserResult<RenderedPage> {
        self.calls.write().unwrap().push(url.to_string());
        match self.response.as_ref() {
            Ok(page) => Ok(page.clone()),
            Err(message) => Err(BrowserError::Navigation {
                url: url.to_string(),
                message: message.clone(),
            }),
        }
    }
}

/// Returns a fixed proposal set (or always fails) and records every
/// request it sees.
#[derive(Clone)]
pub struct MockAdvisor {
    response: Arc<std::result::Result<ParsedSelectors, ()>>,
    requests: Arc<RwLock<Vec<SelectorRequest>>>,
}

impl MockAdvisor {
    pub fn returning(parsed: ParsedSelectors) -> Self {
        Self {
            response: Arc::new(Ok(parsed)),
            requests: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Every call fails as an unparseable response.
    pub fn failing() -> Self {
        Self {
            response: Arc::new(Err(())),
            requests: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.read().unwrap().len()
    }

    pub fn requests(&self) -> Vec<SelectorRequest> {
        self.requests.read().unwrap().clone()
    }
}

#[async_trait]
impl SelectorAdvisor for MockAdvisor {
    async fn propose_selectors(&self, request: &SelectorRequest) -> AdvisorResult<ParsedSelectors> {
        self.requests.write().unwrap().push(request.clone());
        match self.response.as_ref() {
            Ok(parsed) => Ok(parsed.clone()),
            Err(()) => Err(AdvisorError::InvalidResponse(
                "mock advisor configured to fail".to_string(),
            )),
        }
    }
}
