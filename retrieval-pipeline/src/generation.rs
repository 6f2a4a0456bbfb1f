use std::time::Duration;

use common::{error::AppError, utils::config::AppConfig};
use reqwest::StatusCode;
use serde_json::{json, Value};
use tracing::debug;

// Fixed request policy. These are constants of the service, not per-call
// configuration.
const SYSTEM_PROMPT: &str = "You are a helpful assistant.";
const TEMPERATURE: f32 = 0.7;
const MAX_COMPLETION_TOKENS: u32 = 512;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Client for the Groq OpenAI-compatible chat-completion endpoint.
///
/// `complete` never fails from the caller's point of view: every failure mode
/// degrades to a human-readable warning string returned in place of an
/// answer.
#[derive(Clone)]
pub struct GenerationClient {
    inner: GenerationInner,
}

#[derive(Clone)]
enum GenerationInner {
    Groq {
        http: reqwest::Client,
        api_url: String,
        api_key: String,
        model: String,
    },
    #[cfg(any(test, feature = "test-utils"))]
    Scripted(ScriptedCompletions),
}

impl GenerationClient {
    pub fn groq(config: &AppConfig) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            inner: GenerationInner::Groq {
                http,
                api_url: config.groq_api_url.clone(),
                api_key: config.groq_api_key.clone(),
                model: config.groq_model.clone(),
            },
        })
    }

    /// Backend that replays queued responses and records every prompt,
    /// so routing behavior is assertable without a network.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn scripted(script: ScriptedCompletions) -> Self {
        Self {
            inner: GenerationInner::Scripted(script),
        }
    }

    pub async fn complete(&self, prompt: &str) -> String {
        match &self.inner {
            GenerationInner::Groq {
                http,
                api_url,
                api_key,
                model,
            } => {
                let payload = json!({
                    "model": model,
                    "messages": [
                        {"role": "system", "content": SYSTEM_PROMPT},
                        {"role": "user", "content": prompt},
                    ],
                    "temperature": TEMPERATURE,
                    "max_tokens": MAX_COMPLETION_TOKENS,
                });

                let response = match http
                    .post(api_url)
                    .bearer_auth(api_key)
                    .json(&payload)
                    .send()
                    .await
                {
                    Ok(response) => response,
                    Err(err) => return format!("⚠️ Groq API exception: {err}"),
                };

                let status = response.status();
                debug!(status = %status, "chat completion response received");

                match response.text().await {
                    Ok(body) => interpret_response(status, &body),
                    Err(err) => format!("⚠️ Groq API exception: {err}"),
                }
            }
            #[cfg(any(test, feature = "test-utils"))]
            GenerationInner::Scripted(script) => script.next(prompt),
        }
    }
}

/// Maps a response onto the fixed failure taxonomy, in priority order:
/// unparseable body, then non-success status, then content extraction.
fn interpret_response(status: StatusCode, body: &str) -> String {
    let data: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(_) => return "⚠️ Groq API returned non-JSON response".to_string(),
    };

    if !status.is_success() {
        let detail = data.get("error").unwrap_or(&data);
        return format!("⚠️ Groq API error: {} {detail}", status.as_u16());
    }

    let choice = &data["choices"][0];
    choice
        .pointer("/message/content")
        .and_then(Value::as_str)
        .filter(|content| !content.is_empty())
        .or_else(|| choice.get("text").and_then(Value::as_str))
        .unwrap_or_default()
        .trim()
        .to_string()
}

#[cfg(any(test, feature = "test-utils"))]
pub use scripted::ScriptedCompletions;

#[cfg(any(test, feature = "test-utils"))]
mod scripted {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Shared playback state for the scripted generation backend. Clones see
    /// the same queue and call log.
    #[derive(Clone, Default)]
    pub struct ScriptedCompletions {
        responses: Arc<Mutex<VecDeque<String>>>,
        prompts: Arc<Mutex<Vec<String>>>,
    }

    impl ScriptedCompletions {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn push_response(&self, response: impl Into<String>) {
            lock(&self.responses).push_back(response.into());
        }

        /// Number of completions requested so far.
        pub fn calls(&self) -> usize {
            lock(&self.prompts).len()
        }

        /// Every prompt passed to `complete`, in call order.
        pub fn prompts(&self) -> Vec<String> {
            lock(&self.prompts).clone()
        }

        pub(super) fn next(&self, prompt: &str) -> String {
            lock(&self.prompts).push(prompt.to_owned());
            lock(&self.responses)
                .pop_front()
                .unwrap_or_else(|| "scripted answer".to_string())
        }
    }

    fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
        mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::utils::embedding::EmbeddingBackend;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(api_url: String) -> AppConfig {
        AppConfig {
            groq_api_key: "test-key".to_string(),
            groq_model: "test-model".to_string(),
            groq_api_url: api_url,
            surrealdb_address: "mem://".to_string(),
            surrealdb_username: "root".to_string(),
            surrealdb_password: "root".to_string(),
            surrealdb_namespace: "test".to_string(),
            surrealdb_database: "test".to_string(),
            http_port: 0,
            embedding_backend: EmbeddingBackend::Hashed,
            embedding_model: None,
            embedding_dimensions: 64,
            openai_api_key: String::new(),
            openai_base_url: "https://example.com".to_string(),
        }
    }

    fn client_for(server: &MockServer) -> GenerationClient {
        let config = test_config(format!("{}/openai/v1/chat/completions", server.uri()));
        GenerationClient::groq(&config).expect("client")
    }

    #[tokio::test]
    async fn test_successful_completion_is_trimmed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/openai/v1/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content": "  The answer.  "}}]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert_eq!(client.complete("question").await, "The answer.");
    }

    #[tokio::test]
    async fn test_missing_message_content_falls_back_to_text_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"text": "legacy completion"}]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert_eq!(client.complete("question").await, "legacy completion");
    }

    #[tokio::test]
    async fn test_error_status_reports_status_and_detail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(json!({"error": "rate_limited"})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        let answer = client.complete("question").await;

        assert!(answer.starts_with("⚠️ Groq API error"), "got: {answer}");
        assert!(answer.contains("500"), "got: {answer}");
        assert!(answer.contains("rate_limited"), "got: {answer}");
    }

    #[tokio::test]
    async fn test_non_json_body_is_reported_as_such() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert_eq!(
            client.complete("question").await,
            "⚠️ Groq API returned non-JSON response"
        );
    }

    #[tokio::test]
    async fn test_transport_failure_degrades_to_exception_string() {
        // Bind a server to reserve an address, then drop it so the request
        // hits a closed port.
        let server = MockServer::start().await;
        let dead_url = format!("{}/openai/v1/chat/completions", server.uri());
        drop(server);

        let client = GenerationClient::groq(&test_config(dead_url)).expect("client");
        let answer = client.complete("question").await;

        assert!(
            answer.starts_with("⚠️ Groq API exception"),
            "got: {answer}"
        );
    }

    #[test]
    fn test_unparseable_body_outranks_error_status() {
        let answer = interpret_response(StatusCode::INTERNAL_SERVER_ERROR, "not json at all");
        assert_eq!(answer, "⚠️ Groq API returned non-JSON response");
    }

    #[test]
    fn test_error_without_error_field_echoes_body() {
        let answer = interpret_response(
            StatusCode::BAD_GATEWAY,
            r#"{"detail":"upstream unavailable"}"#,
        );
        assert!(answer.starts_with("⚠️ Groq API error: 502"), "got: {answer}");
        assert!(answer.contains("upstream unavailable"), "got: {answer}");
    }

    #[test]
    fn test_scripted_backend_records_prompts() {
        let script = ScriptedCompletions::new();
        script.push_response("first");

        assert_eq!(script.calls(), 0);
        assert_eq!(script.next("hello"), "first");
        assert_eq!(script.next("again"), "scripted answer");
        assert_eq!(script.calls(), 2);
        assert_eq!(script.prompts(), vec!["hello", "again"]);
    }
}
