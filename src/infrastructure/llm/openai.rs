//! OpenAI chat-completions backed README summarizer

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::summarizer::{RepoSummarizer, RepoSummary};
use crate::domain::DomainError;
use crate::infrastructure::http_client::HttpClientTrait;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_SUMMARY_MODEL: &str = "gpt-4o";

const SYSTEM_PROMPT: &str = "You are a helpful assistant. Summarize this GitHub repository \
from this readme file content. Your response should include a concise summary and a list \
of cool or interesting facts about the repository.";

/// Summarizes READMEs with a strict JSON-schema structured output
#[derive(Debug)]
pub struct OpenAiSummarizer<C: HttpClientTrait> {
    client: C,
    auth_header: String,
    base_url: String,
    model: String,
}

impl<C: HttpClientTrait> OpenAiSummarizer<C> {
    pub fn new(client: C, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, DEFAULT_OPENAI_BASE_URL)
    }

    pub fn with_base_url(
        client: C,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            auth_header: format!("Bearer {}", api_key.into()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: DEFAULT_SUMMARY_MODEL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn chat_completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    fn build_request(&self, readme: &str) -> serde_json::Value {
        let messages = [
            OpenAiMessage {
                role: "system",
                content: SYSTEM_PROMPT,
            },
            OpenAiMessage {
                role: "user",
                content: readme,
            },
        ];

        serde_json::json!({
            "model": self.model,
            "temperature": 0,
            "messages": messages,
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": "repo_summary",
                    "strict": true,
                    "schema": {
                        "type": "object",
                        "properties": {
                            "summary": {
                                "type": "string",
                                "description": "A concise summary of the repository"
                            },
                            "cool_facts": {
                                "type": "array",
                                "items": { "type": "string" },
                                "description": "A list of cool or interesting facts about the repository"
                            }
                        },
                        "required": ["summary", "cool_facts"],
                        "additionalProperties": false
                    }
                }
            }
        })
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<RepoSummary, DomainError> {
        let response: OpenAiResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::provider("openai", format!("Failed to parse response: {}", e))
        })?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| DomainError::provider("openai", "No content in response"))?;

        let summary: RepoSummary = serde_json::from_str(&content).map_err(|e| {
            DomainError::provider("openai", format!("Response does not match schema: {}", e))
        })?;

        if summary.cool_facts.is_empty() {
            return Err(DomainError::provider(
                "openai",
                "Response contained no cool facts",
            ));
        }

        Ok(summary)
    }
}

#[async_trait]
impl<C: HttpClientTrait> RepoSummarizer for OpenAiSummarizer<C> {
    async fn summarize(&self, readme: &str) -> Result<RepoSummary, DomainError> {
        debug!(model = %self.model, readme_len = readme.len(), "Requesting README summary");

        let headers = vec![
            ("Authorization", self.auth_header.as_str()),
            ("Content-Type", "application/json"),
        ];

        let response = self
            .client
            .post_json(&self.chat_completions_url(), headers, &self.build_request(readme))
            .await?;

        self.parse_response(response)
    }
}

/// Summarizer used when no OpenAI API key is configured
#[derive(Debug, Default)]
pub struct UnconfiguredSummarizer;

#[async_trait]
impl RepoSummarizer for UnconfiguredSummarizer {
    async fn summarize(&self, _readme: &str) -> Result<RepoSummary, DomainError> {
        Err(DomainError::configuration("OpenAI API key is not configured"))
    }
}

#[derive(Debug, Serialize)]
struct OpenAiMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http_client::mock::MockHttpClient;
    use crate::infrastructure::http_client::HttpClient;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TEST_URL: &str = "https://api.openai.com/v1/chat/completions";

    fn completion(content: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "chatcmpl-123",
            "model": "gpt-4o",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }]
        })
    }

    #[tokio::test]
    async fn test_summarize() {
        let client = MockHttpClient::new().with_response(
            TEST_URL,
            completion(r#"{"summary":"A web framework","cool_facts":["Built on tower"]}"#),
        );
        let summarizer = OpenAiSummarizer::new(client, "sk-test");

        let summary = summarizer.summarize("# axum").await.unwrap();
        assert_eq!(summary.summary, "A web framework");
        assert_eq!(summary.cool_facts, vec!["Built on tower".to_string()]);
    }

    #[tokio::test]
    async fn test_request_shape() {
        let client = MockHttpClient::new().with_response(
            TEST_URL,
            completion(r#"{"summary":"s","cool_facts":["f"]}"#),
        );
        let summarizer = OpenAiSummarizer::new(client, "sk-test");
        summarizer.summarize("# readme").await.unwrap();

        let posted = summarizer.client.posted();
        let body = &posted[0].1;
        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["temperature"], 0);
        assert_eq!(body["messages"][1]["content"], "# readme");
        assert_eq!(body["response_format"]["json_schema"]["name"], "repo_summary");
        assert_eq!(body["response_format"]["json_schema"]["strict"], true);
    }

    #[tokio::test]
    async fn test_empty_facts_rejected() {
        let client = MockHttpClient::new()
            .with_response(TEST_URL, completion(r#"{"summary":"s","cool_facts":[]}"#));
        let summarizer = OpenAiSummarizer::new(client, "sk-test");

        assert!(summarizer.summarize("x").await.is_err());
    }

    #[tokio::test]
    async fn test_malformed_content() {
        let client = MockHttpClient::new().with_response(TEST_URL, completion("not json"));
        let summarizer = OpenAiSummarizer::new(client, "sk-test");

        let err = summarizer.summarize("x").await.unwrap_err();
        assert!(matches!(err, DomainError::Provider { .. }));
    }

    #[tokio::test]
    async fn test_provider_error() {
        let client = MockHttpClient::new().with_error(TEST_URL, "HTTP 401");
        let summarizer = OpenAiSummarizer::new(client, "sk-test");

        assert!(summarizer.summarize("x").await.is_err());
    }

    #[tokio::test]
    async fn test_custom_base_url_and_model() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-live"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(completion(r#"{"summary":"ok","cool_facts":["one"]}"#)),
            )
            .mount(&server)
            .await;

        let summarizer = OpenAiSummarizer::with_base_url(HttpClient::new(), "sk-live", server.uri())
            .with_model("gpt-4o-mini");

        let summary = summarizer.summarize("# readme").await.unwrap();
        assert_eq!(summary.summary, "ok");
    }

    #[tokio::test]
    async fn test_unconfigured_summarizer() {
        let err = UnconfiguredSummarizer.summarize("x").await.unwrap_err();
        assert!(matches!(err, DomainError::Configuration { .. }));
    }
}
