// ABOUTME: LLM provider integration for Just Start
// ABOUTME: Anthropic structured generation, Perplexity research, and transient-failure retry

pub mod error;
pub mod research;
pub mod retry;
pub mod service;

pub use error::{AIServiceError, AIServiceResult};
pub use research::{ResearchAnswer, ResearchClient};
pub use retry::{with_retry, RetryPolicy};
pub use service::{AIResponse, AIService, Usage};
