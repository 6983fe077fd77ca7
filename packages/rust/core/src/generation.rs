//! Section content generation via a chat-completion collaborator.
//!
//! The assembler talks to [`SectionGenerator`], never to the network
//! directly; [`HttpGenerator`] is the one production implementation. The
//! bearer credential is an explicit per-call parameter, not client state.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use brdgen_shared::{BrdError, GenerationConfig, Result};

/// Sentence substituted for a section whose generation call failed.
pub const FALLBACK_CONTENT: &str = "An error occurred while generating content.";

const SYSTEM_PERSONA: &str = "You are a professional business document writer \
specializing in technical Business Requirements Documents.";

/// Fixed sampling temperature for all generation calls.
const TEMPERATURE: f64 = 0.7;

/// Fixed output-length cap for all generation calls.
const MAX_TOKENS: u32 = 2000;

/// Build the fixed prompt for one output section.
pub fn section_prompt(section_name: &str, use_case: &str, logic: &str) -> String {
    format!(
        "Based on the following information, generate professional content for \
the '{section_name}' section of a Business Requirements Document:\n\n\
Business Use Case:\n{use_case}\n\n\
Business Logic:\n{logic}\n\n\
Please provide well-structured, detailed content suitable for a professional \
BRD. Include appropriate subsections and formatting."
    )
}

// ---------------------------------------------------------------------------
// Generator seam
// ---------------------------------------------------------------------------

/// One synchronous generation call per output section.
#[async_trait]
pub trait SectionGenerator: Send + Sync {
    /// Generate markdown prose for the given prompt. `api_key` is the
    /// bearer credential resolved for this run; it may be empty, in which
    /// case the collaborator is expected to reject the call.
    async fn generate(&self, prompt: &str, api_key: &str) -> Result<String>;
}

// ---------------------------------------------------------------------------
// Wire types (chat-completion protocol)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

// ---------------------------------------------------------------------------
// HTTP implementation
// ---------------------------------------------------------------------------

/// Production generator: one HTTPS POST per call to the configured
/// chat-completion endpoint.
pub struct HttpGenerator {
    client: reqwest::Client,
    endpoint: Url,
    model: String,
}

impl HttpGenerator {
    pub fn new(config: &GenerationConfig) -> Result<Self> {
        let endpoint = config.endpoint_url()?;

        let client = reqwest::Client::builder()
            .user_agent(concat!("brdgen/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BrdError::Generation(format!("client build: {e}")))?;

        Ok(Self {
            client,
            endpoint,
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl SectionGenerator for HttpGenerator {
    async fn generate(&self, prompt: &str, api_key: &str) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PERSONA,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| BrdError::Generation(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail: String = response
                .text()
                .await
                .unwrap_or_default()
                .chars()
                .take(200)
                .collect();
            warn!(%status, "generation endpoint returned an error");
            return Err(BrdError::Generation(format!("HTTP {status}: {detail}")));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| BrdError::Generation(format!("invalid response body: {e}")))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| BrdError::Generation("response contained no content".into()))?;

        debug!(chars = content.len(), "generation call succeeded");
        Ok(content)
    }
}

// ---------------------------------------------------------------------------
// Test doubles (shared by assembler and pipeline tests)
// ---------------------------------------------------------------------------

/// Generator returning the same markdown for every call.
#[cfg(test)]
pub(crate) struct FixedGenerator(pub String);

#[cfg(test)]
#[async_trait]
impl SectionGenerator for FixedGenerator {
    async fn generate(&self, _prompt: &str, _api_key: &str) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// Generator failing every call, as a dead endpoint would.
#[cfg(test)]
pub(crate) struct FailingGenerator;

#[cfg(test)]
#[async_trait]
impl SectionGenerator for FailingGenerator {
    async fn generate(&self, _prompt: &str, _api_key: &str) -> Result<String> {
        Err(BrdError::Generation("HTTP 503 Service Unavailable".into()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_section_and_narrative() {
        let prompt = section_prompt("Functional Requirements", "Sell widgets.", "Ledger rules.");
        assert!(prompt.contains("'Functional Requirements' section"));
        assert!(prompt.contains("Business Use Case:\nSell widgets."));
        assert!(prompt.contains("Business Logic:\nLedger rules."));
    }

    #[test]
    fn chat_request_serializes_protocol_shape() {
        let body = ChatRequest {
            model: "gpt-4-turbo-preview",
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PERSONA,
                },
                ChatMessage {
                    role: "user",
                    content: "draft the scope",
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains(r#""model":"gpt-4-turbo-preview""#));
        assert!(json.contains(r#""role":"system""#));
        assert!(json.contains(r#""temperature":0.7"#));
        assert!(json.contains(r#""max_tokens":2000"#));
    }

    #[test]
    fn chat_response_deserializes_content_path() {
        let json = r###"{
            "id": "chatcmpl-1",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "## Scope\n\nText."}}
            ],
            "usage": {"total_tokens": 120}
        }"###;
        let parsed: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.choices[0].message.content, "## Scope\n\nText.");
    }

    #[test]
    fn chat_response_without_choices_is_rejected_downstream() {
        let json = r#"{"choices": []}"#;
        let parsed: ChatResponse = serde_json::from_str(json).unwrap();
        assert!(parsed.choices.is_empty());
    }

    #[test]
    fn http_generator_builds_from_default_config() {
        let config = GenerationConfig::default();
        let generator = HttpGenerator::new(&config).unwrap();
        assert_eq!(generator.model, "gpt-4-turbo-preview");
        assert_eq!(
            generator.endpoint.as_str(),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn http_generator_rejects_bad_endpoint() {
        let config = GenerationConfig {
            endpoint: "not a url".into(),
            ..GenerationConfig::default()
        };
        assert!(HttpGenerator::new(&config).is_err());
    }

    #[tokio::test]
    async fn fixed_generator_returns_its_text() {
        let generator = FixedGenerator("## A\n\nB".into());
        let text = generator.generate("p", "key").await.unwrap();
        assert_eq!(text, "## A\n\nB");
    }

    #[tokio::test]
    async fn failing_generator_errors() {
        let err = FailingGenerator.generate("p", "key").await.unwrap_err();
        assert!(err.to_string().contains("503"));
    }
}
