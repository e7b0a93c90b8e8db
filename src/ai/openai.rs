//! OpenAI-backed selector advisor.
//!
//! Talks to the chat completions API directly over reqwest with a strict
//! JSON schema response format, so the model can only answer in the shape
//! [`ParsedSelectors`] expects. Any response that does not deserialize is
//! rejected whole.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::error::{AdvisorError, AdvisorResult};
use crate::traits::advisor::{ParsedSelectors, SelectorAdvisor, SelectorRequest};
use crate::types::config::AdvisorConfig;

const API_URL: &str = "https://api.openai.com/v1/chat/completions";

const SYSTEM_PROMPT: &str = "You are an expert at analyzing news and article web pages. \
Given an HTML excerpt, propose CSS selectors that isolate the main article text and the \
publication date. Propose 3 to 5 content selectors, best first. Prefer specific, durable \
selectors over positional ones. Never propose selectors that match navigation, comments, \
or related-article widgets.";

/// Selector advisor backed by the OpenAI chat completions API.
pub struct OpenAiAdvisor {
    client: reqwest::Client,
    api_key: SecretString,
    config: AdvisorConfig,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    content: Option<String>,
}

impl OpenAiAdvisor {
    pub fn new(api_key: SecretString, config: AdvisorConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            config,
        }
    }

    /// Read the API key from `OPENAI_API_KEY`.
    pub fn from_env(config: AdvisorConfig) -> AdvisorResult<Self> {
        let key = std::env::var("OPENAI_API_KEY").map_err(|_| AdvisorError::MissingApiKey)?;
        if key.trim().is_empty() {
            return Err(AdvisorError::MissingApiKey);
        }
        Ok(Self::new(SecretString::from(key), config))
    }

    fn user_prompt(request: &SelectorRequest) -> String {
        let mut prompt = format!(
            "Domain: {}\nSample URL: {}\n\n",
            request.domain, request.sample_url
        );
        if !request.known_patterns.is_empty() {
            prompt.push_str("Selectors already tried on this domain (do not re-propose):\n");
            for p in &request.known_patterns {
                prompt.push_str(&format!(
                    "- {} (strategy {}, {:.0}% success over {} attempts)\n",
                    p.selector,
                    p.strategy,
                    p.success_rate * 100.0,
                    p.attempts
                ));
            }
            prompt.push('\n');
        }
        prompt.push_str("HTML excerpt:\n");
        prompt.push_str(&request.html_excerpt);
        prompt
    }

    fn response_schema() -> serde_json::Value {
        let proposal = json!({
            "type": "object",
            "properties": {
                "selector": { "type": "string" },
                "confidence": { "type": "number" },
                "reasoning": { "type": "string" }
            },
            "required": ["selector", "confidence", "reasoning"],
            "additionalProperties": false
        });
        json!({
            "type": "object",
            "properties": {
                "content_selectors": { "type": "array", "items": proposal },
                "date_selectors": { "type": "array", "items": proposal },
                "requires_link_following": { "type": "boolean" },
                "link_patterns": { "type": "array", "items": { "type": "string" } }
            },
            "required": [
                "content_selectors",
                "date_selectors",
                "requires_link_following",
                "link_patterns"
            ],
            "additionalProperties": false
        })
    }
}

#[async_trait]
impl SelectorAdvisor for OpenAiAdvisor {
    async fn propose_selectors(&self, request: &SelectorRequest) -> AdvisorResult<ParsedSelectors> {
        let body = json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": Self::user_prompt(request) }
            ],
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": "selector_proposals",
                    "strict": true,
                    "schema": Self::response_schema()
                }
            }
        });

        debug!(domain = %request.domain, model = %self.config.model, "advisor call");
        let response = self
            .client
            .post(API_URL)
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| AdvisorError::Http(Box::new(e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AdvisorError::InvalidResponse(format!(
                "HTTP {status}: {body}"
            )));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| AdvisorError::Http(Box::new(e)))?;

        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(AdvisorError::EmptyResponse)?;
        if content.trim().is_empty() {
            return Err(AdvisorError::EmptyResponse);
        }

        serde_json::from_str(&content).map_err(|e| AdvisorError::InvalidResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::advisor::KnownPattern;

    #[test]
    fn prompt_cites_known_patterns() {
        let request = SelectorRequest {
            domain: "hard.example".to_string(),
            sample_url: "https://hard.example/story".to_string(),
            html_excerpt: "<html></html>".to_string(),
            known_patterns: vec![KnownPattern {
                selector: ".old-body".to_string(),
                strategy: "learned_pattern".to_string(),
                success_rate: 0.2,
                attempts: 10,
            }],
        };
        let prompt = OpenAiAdvisor::user_prompt(&request);
        assert!(prompt.contains(".old-body"));
        assert!(prompt.contains("20% success over 10 attempts"));
        assert!(prompt.contains("hard.example"));
    }

    #[test]
    fn system_prompt_bounds_proposal_count() {
        assert!(SYSTEM_PROMPT.contains("3 to 5 content selectors"));
    }

    #[test]
    fn schema_matches_parsed_shape() {
        let schema = OpenAiAdvisor::response_schema();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert!(required.contains(&"content_selectors"));
        assert!(required.contains(&"date_selectors"));
    }

    #[test]
    fn missing_key_is_an_error() {
        std::env::remove_var("OPENAI_API_KEY");
        assert!(matches!(
            OpenAiAdvisor::from_env(AdvisorConfig::default()),
            Err(AdvisorError::MissingApiKey)
        ));
    }
}
