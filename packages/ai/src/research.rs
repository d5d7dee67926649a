// ABOUTME: Web-grounded research client backed by the Perplexity chat completions API
// ABOUTME: Fixed 30-second timeout per call, retried with exponential backoff

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::error::{AIServiceError, AIServiceResult};
use crate::retry::{with_retry, RetryPolicy};

const PERPLEXITY_API_URL: &str = "https://api.perplexity.ai";
const DEFAULT_MODEL: &str = "sonar";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    citations: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

/// Answer to one research query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchAnswer {
    pub query: String,
    pub content: String,
    pub citations: Vec<String>,
}

pub struct ResearchClient {
    client: Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
    retry: RetryPolicy,
}

impl ResearchClient {
    fn create_client() -> Client {
        Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|e| {
                error!("Failed to build configured HTTP client, using defaults: {}", e);
                Client::new()
            })
    }

    /// Key and model normally come from PERPLEXITY_API_KEY and PERPLEXITY_MODEL
    pub fn with_api_key_and_model(api_key: Option<String>, model: Option<String>) -> Self {
        let api_key = api_key.filter(|k| !k.is_empty());
        if api_key.is_none() {
            info!("PERPLEXITY_API_KEY not set - research calls will fail until configured");
        }

        Self {
            client: Self::create_client(),
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: PERPLEXITY_API_URL.to_string(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Run one research query
    pub async fn search(&self, query: &str, system_prompt: &str) -> AIServiceResult<ResearchAnswer> {
        with_retry(&self.retry, "perplexity.chat", || {
            self.send(query, system_prompt)
        })
        .await
    }

    async fn send(&self, query: &str, system_prompt: &str) -> AIServiceResult<ResearchAnswer> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or(AIServiceError::NoApiKey("perplexity"))?;

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: query,
                },
            ],
        };

        info!("Making Perplexity research request: model={}", self.model);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("Perplexity request failed: {}", e);
                AIServiceError::from_transport(e)
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!("Perplexity API error: {} - {}", status, error_text);
            return Err(AIServiceError::Http {
                status: status.as_u16(),
                body: error_text,
            });
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| AIServiceError::ParseError(e.to_string()))?;

        let content = body
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(AIServiceError::InvalidResponse)?;

        Ok(ResearchAnswer {
            query: query.to_string(),
            content,
            citations: body.citations,
        })
    }
}
