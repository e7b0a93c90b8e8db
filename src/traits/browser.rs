//! Headless rendering abstraction.

use async_trait::async_trait;

use crate::error::BrowserResult;

/// How the browser engine arrived at the rendered text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderMethod {
    /// A named content selector matched
    Selector(String),

    /// Aggregated paragraphs (no container matched)
    Paragraphs,

    /// Whole-document text, the last resort within the strategy
    FullDocument,
}

/// Output of one headless render.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// Extracted text
    pub text: String,

    /// Post-JavaScript document HTML
    pub html: String,

    /// Document title if available
    pub title: Option<String>,

    /// Which tier produced the text
    pub method: RenderMethod,
}

/// Renders JavaScript-built pages.
///
/// Implementations own their concurrency ceiling and lifecycle; callers
/// just render. The context backing a render is guaranteed closed on
/// every exit path, including cancellation.
#[async_trait]
pub trait BrowserEngine: Send + Sync {
    /// Render a URL and extract its main text.
    async fn render(&self, url: &str) -> BrowserResult<RenderedPage>;
}
