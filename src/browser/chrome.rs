//! Chromium-backed implementation of [`BrowserEngine`].
//!
//! One browser process serves the whole pipeline. A semaphore caps the
//! number of concurrent tabs; each render opens a fresh page and closes it
//! on every exit path, including cancellation, via a drop guard.

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as ChromeConfig};
use chromiumoxide::cdp::browser_protocol::network::{EnableParams, SetBlockedUrLsParams};
use chromiumoxide::Page;
use futures::StreamExt;
use std::time::{Duration, Instant};
use tokio::sync::{OnceCell, Semaphore, SemaphorePermit};
use tracing::{debug, warn};

use crate::error::{BrowserError, BrowserResult};
use crate::parsers::html::CONTENT_SELECTORS;
use crate::traits::browser::{BrowserEngine, RenderMethod, RenderedPage};
use crate::types::config::BrowserConfig;

/// Resource URL patterns never worth downloading for text extraction.
const BLOCKED_RESOURCES: &[&str] = &[
    "*.png", "*.jpg", "*.jpeg", "*.gif", "*.webp", "*.svg", "*.ico", "*.mp4", "*.webm", "*.mp3",
    "*.woff", "*.woff2", "*.ttf", "*.otf",
];

/// Minimum innerText length for a selector hit inside the page.
const SELECTOR_MIN_CHARS: usize = 200;

const SETTLE_POLL: Duration = Duration::from_millis(250);
const SETTLE_MAX: Duration = Duration::from_secs(5);

/// Shared headless Chrome engine.
///
/// The browser process launches lazily on the first render and is reused
/// for the lifetime of the engine.
pub struct HeadlessChrome {
    config: BrowserConfig,
    browser: OnceCell<Browser>,
    sessions: Semaphore,
}

/// Closes the page when dropped, whichever way the render ends.
struct PageGuard<'a> {
    page: Page,
    _permit: SemaphorePermit<'a>,
}

impl Drop for PageGuard<'_> {
    fn drop(&mut self) {
        let page = self.page.clone();
        tokio::spawn(async move {
            if let Err(e) = page.close().await {
                warn!(error = %e, "failed to close browser page");
            }
        });
    }
}

impl HeadlessChrome {
    /// Create an engine. No browser process is launched until the first
    /// render.
    pub fn new(config: BrowserConfig) -> Self {
        let sessions = Semaphore::new(config.max_sessions);
        Self {
            config,
            browser: OnceCell::new(),
            sessions,
        }
    }

    async fn browser(&self) -> BrowserResult<&Browser> {
        self.browser
            .get_or_try_init(|| async {
                let chrome_config = ChromeConfig::builder()
                    .no_sandbox()
                    .build()
                    .map_err(BrowserError::Launch)?;

                let (browser, mut handler) = Browser::launch(chrome_config)
                    .await
                    .map_err(|e| BrowserError::Launch(e.to_string()))?;

                tokio::spawn(async move {
                    while let Some(event) = handler.next().await {
                        if let Err(e) = event {
                            debug!(error = %e, "browser handler event error");
                        }
                    }
                });

                Ok(browser)
            })
            .await
    }

    async fn open_page<'a>(
        &self,
        url: &str,
        permit: SemaphorePermit<'a>,
    ) -> BrowserResult<PageGuard<'a>> {
        let browser = self.browser().await?;
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        // Guard before any CDP call so a failed setup still closes the tab.
        let guard = PageGuard {
            page,
            _permit: permit,
        };

        guard
            .page
            .execute(EnableParams::default())
            .await
            .map_err(|e| BrowserError::Evaluation(e.to_string()))?;
        guard
            .page
            .execute(SetBlockedUrLsParams::new(
                BLOCKED_RESOURCES.iter().map(|s| s.to_string()).collect::<Vec<_>>(),
            ))
            .await
            .map_err(|e| BrowserError::Evaluation(e.to_string()))?;

        Ok(guard)
    }

    async fn navigate(&self, page: &Page, url: &str, deadline: Instant) -> BrowserResult<()> {
        let allowance = remaining(deadline, url)?.min(self.config.navigation_timeout);

        let nav = async {
            page.goto(url).await.map_err(|e| BrowserError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;
            page.wait_for_navigation()
                .await
                .map_err(|e| BrowserError::Navigation {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;
            Ok::<_, BrowserError>(())
        };

        tokio::time::timeout(allowance, nav)
            .await
            .map_err(|_| BrowserError::Timeout {
                url: url.to_string(),
            })?
    }

    /// Poll until substantial text appears in the body or the allowance
    /// runs out. Not reaching the threshold is not an error; slow pages
    /// just get extracted with whatever rendered.
    async fn wait_for_settle(&self, page: &Page, url: &str, deadline: Instant) {
        let allowance = deadline
            .saturating_duration_since(Instant::now())
            .min(SETTLE_MAX);
        let settle_deadline = Instant::now() + allowance;

        loop {
            let length: usize = page
                .evaluate("document.body ? document.body.innerText.length : 0")
                .await
                .ok()
                .and_then(|v| v.into_value().ok())
                .unwrap_or(0);

            if length >= self.config.settle_chars || Instant::now() >= settle_deadline {
                if length < self.config.settle_chars {
                    debug!(url, length, "page never settled, extracting anyway");
                }
                return;
            }
            tokio::time::sleep(SETTLE_POLL).await;
        }
    }

    async fn extract_text(&self, page: &Page, url: &str) -> BrowserResult<(String, RenderMethod)> {
        // Tier 1: the shared selector catalogue, evaluated in the page so
        // innerText reflects the rendered DOM.
        let selectors =
            serde_json::to_string(CONTENT_SELECTORS).map_err(|e| BrowserError::Evaluation(e.to_string()))?;
        let script = format!(
            r#"
            (() => {{
                const selectors = {selectors};
                for (const selector of selectors) {{
                    const el = document.querySelector(selector);
                    if (el && el.innerText && el.innerText.length > {min}) {{
                        return {{ text: el.innerText, selector }};
                    }}
                }}
                return null;
            }})()
            "#,
            min = SELECTOR_MIN_CHARS,
        );

        let hit: Option<serde_json::Value> = self.eval(page, &script).await?;
        if let Some(hit) = hit {
            let text = hit["text"].as_str().unwrap_or("").to_string();
            let selector = hit["selector"].as_str().unwrap_or("").to_string();
            if !text.is_empty() {
                return Ok((text, RenderMethod::Selector(selector)));
            }
        }

        // Tier 2: aggregate substantial paragraphs.
        let script = format!(
            r#"
            (() => {{
                const parts = [];
                for (const p of document.querySelectorAll('p')) {{
                    const text = p.innerText ? p.innerText.trim() : '';
                    if (text.length > {min_chars}) parts.push(text);
                }}
                return parts.length >= {min_count} ? parts.join('\n\n') : null;
            }})()
            "#,
            min_chars = self.config.min_paragraph_chars,
            min_count = self.config.min_paragraphs,
        );
        let paragraphs: Option<String> = self.eval(page, &script).await?;
        if let Some(text) = paragraphs {
            return Ok((text, RenderMethod::Paragraphs));
        }

        // Tier 3: the whole document.
        let text: String = self
            .eval(page, "document.body ? document.body.innerText : ''")
            .await?;
        if text.trim().is_empty() {
            return Err(BrowserError::NoContent {
                url: url.to_string(),
            });
        }
        Ok((text, RenderMethod::FullDocument))
    }

    async fn eval<T: serde::de::DeserializeOwned>(
        &self,
        page: &Page,
        script: &str,
    ) -> BrowserResult<T> {
        page.evaluate(script)
            .await
            .map_err(|e| BrowserError::Evaluation(e.to_string()))?
            .into_value()
            .map_err(|e| BrowserError::Evaluation(e.to_string()))
    }
}

fn remaining(deadline: Instant, url: &str) -> BrowserResult<Duration> {
    let left = deadline.saturating_duration_since(Instant::now());
    if left.is_zero() {
        Err(BrowserError::Timeout {
            url: url.to_string(),
        })
    } else {
        Ok(left)
    }
}

#[async_trait]
impl BrowserEngine for HeadlessChrome {
    async fn render(&self, url: &str) -> BrowserResult<RenderedPage> {
        let deadline = Instant::now() + self.config.total_budget;

        let permit = self
            .sessions
            .acquire()
            .await
            .map_err(|_| BrowserError::SessionUnavailable)?;

        let guard = self.open_page(url, permit).await?;

        self.navigate(&guard.page, url, deadline).await?;
        self.wait_for_settle(&guard.page, url, deadline).await;

        let allowance = remaining(deadline, url)?;
        let work = async {
            let (text, method) = self.extract_text(&guard.page, url).await?;
            let html: String = self
                .eval(&guard.page, "document.documentElement.outerHTML")
                .await
                .unwrap_or_default();
            let title: Option<String> = self
                .eval::<String>(&guard.page, "document.title")
                .await
                .ok()
                .filter(|t| !t.trim().is_empty());
            Ok::<_, BrowserError>(RenderedPage {
                text,
                html,
                title,
                method,
            })
        };

        let rendered = tokio::time::timeout(allowance, work)
            .await
            .map_err(|_| BrowserError::Timeout {
                url: url.to_string(),
            })??;

        debug!(
            url,
            chars = rendered.text.len(),
            method = ?rendered.method,
            "rendered page"
        );
        Ok(rendered)
    }
}
