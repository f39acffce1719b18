use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::CommonError;
use crate::generation::TextGenerator;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-1.5-flash";

#[derive(Clone, Debug)]
pub struct GeminiClientConfig {
    pub base_url: String,
    pub model: String,
    pub default_timeout: Duration,
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub max_error_body_bytes: usize,
}

impl GeminiClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable lookup. Unparseable values fall back
    /// to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let base_url = lookup("GEMINI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let model = lookup("GEMINI_MODEL")
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let default_timeout = lookup("GEMINI_TIMEOUT_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(30));

        // The assistant answers one message per webhook call; retries are opt-in.
        let max_retries = lookup("GEMINI_MAX_RETRIES")
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(0);

        let initial_backoff = lookup("GEMINI_RETRY_INITIAL_MS")
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or_else(|| Duration::from_millis(200));

        let max_backoff = lookup("GEMINI_RETRY_MAX_MS")
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or_else(|| Duration::from_millis(5_000));

        let max_error_body_bytes = lookup("GEMINI_MAX_ERROR_BODY_BYTES")
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(8 * 1024);

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            default_timeout,
            max_retries,
            initial_backoff,
            max_backoff,
            max_error_body_bytes,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GeminiClientError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("invalid response JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("upstream returned error: status={status} message={message}")]
    Upstream { status: StatusCode, message: String },

    #[error("upstream returned non-JSON error: status={status} body={body}")]
    UpstreamBody { status: StatusCode, body: String },

    #[error("response contained no text (block reason: {})", .block_reason.as_deref().unwrap_or("none"))]
    EmptyCompletion { block_reason: Option<String> },
}

#[derive(Clone)]
pub struct GeminiClient {
    config: GeminiClientConfig,
    api_key: String,
    http: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: GeminiClientConfig, api_key: impl Into<String>) -> Result<Self, GeminiClientError> {
        let http = reqwest::Client::builder()
            .user_agent("whatsapp-assistant/admissions-bot")
            .build()?;
        Ok(Self {
            config,
            api_key: api_key.into(),
            http,
        })
    }

    /// Single-turn `generateContent` call. Returns the trimmed text of the first candidate.
    pub async fn generate_content(&self, prompt: &str) -> Result<String, GeminiClientError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
        };
        let response = self.post_generate(&request).await?;
        let candidate = response.candidates.first();
        debug!(
            model = %self.config.model,
            finish_reason = candidate.and_then(|c| c.finish_reason.as_deref()).unwrap_or("none"),
            prompt_tokens = response.usage_metadata.as_ref().and_then(|u| u.prompt_token_count),
            total_tokens = response.usage_metadata.as_ref().and_then(|u| u.total_token_count),
            "gemini completion received"
        );
        response.text().ok_or_else(|| GeminiClientError::EmptyCompletion {
            block_reason: response
                .prompt_feedback
                .as_ref()
                .and_then(|f| f.block_reason.clone()),
        })
    }

    async fn post_generate(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GeminiClientError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.base_url, self.config.model
        );
        let timeout = self.config.default_timeout;
        self.request_with_retry(|| {
            let url = url.clone();
            async move {
                let resp = self
                    .http
                    .post(&url)
                    .header("x-goog-api-key", &self.api_key)
                    .timeout(timeout)
                    .json(request)
                    .send()
                    .await?;
                Self::parse_json_response(resp, self.config.max_error_body_bytes).await
            }
        })
        .await
    }

    async fn parse_json_response<T: for<'de> Deserialize<'de>>(
        resp: reqwest::Response,
        max_error_body_bytes: usize,
    ) -> Result<T, GeminiClientError> {
        if resp.status().is_success() {
            let bytes = resp.bytes().await?;
            return Ok(serde_json::from_slice(&bytes)?);
        }
        Err(Self::to_upstream_error(resp, max_error_body_bytes).await)
    }

    async fn to_upstream_error(
        resp: reqwest::Response,
        max_error_body_bytes: usize,
    ) -> GeminiClientError {
        let status = resp.status();
        let body = read_error_body(resp).await;
        if let Ok(parsed) = serde_json::from_slice::<GoogleErrorEnvelope>(&body) {
            let message = parsed
                .error
                .message
                .unwrap_or_else(|| "unknown upstream error".to_string());
            let message = match parsed.error.status {
                Some(code) => format!("{code}: {message}"),
                None => message,
            };
            return GeminiClientError::Upstream { status, message };
        }
        let kept = &body[..body.len().min(max_error_body_bytes)];
        GeminiClientError::UpstreamBody {
            status,
            body: String::from_utf8_lossy(kept).to_string(),
        }
    }

    async fn request_with_retry<T, Fut, F>(&self, mut f: F) -> Result<T, GeminiClientError>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, GeminiClientError>>,
    {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match f().await {
                Ok(v) => return Ok(v),
                Err(e) => {
                    if attempt > self.config.max_retries || !should_retry(&e) {
                        return Err(e);
                    }
                    let delay = backoff_delay(
                        self.config.initial_backoff,
                        self.config.max_backoff,
                        attempt - 1,
                    );
                    warn!(
                        attempt,
                        delay_ms = delay.as_millis(),
                        error = %e,
                        "gemini request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    fn backend(&self) -> String {
        format!("gemini:{}", self.config.model)
    }

    async fn generate_text(&self, prompt: &str) -> Result<String, CommonError> {
        Ok(self.generate_content(prompt).await?)
    }
}

fn should_retry(err: &GeminiClientError) -> bool {
    match err {
        GeminiClientError::Request(e) => {
            e.is_timeout() || e.is_connect() || e.is_request() || e.is_body()
        }
        GeminiClientError::Upstream { status, .. }
        | GeminiClientError::UpstreamBody { status, .. } => {
            *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
        }
        GeminiClientError::InvalidJson(_) | GeminiClientError::EmptyCompletion { .. } => false,
    }
}

fn backoff_delay(initial: Duration, max: Duration, exponent: u32) -> Duration {
    let mult = 1u128.checked_shl(exponent).unwrap_or(u128::MAX);
    let base_ms = initial.as_millis().saturating_mul(mult);
    let capped_ms = std::cmp::min(base_ms, max.as_millis()) as u64;
    let jitter_cap = std::cmp::max(1, capped_ms / 4);
    let jitter_ms = pseudo_jitter_ms(jitter_cap);
    Duration::from_millis(capped_ms.saturating_add(jitter_ms))
}

fn pseudo_jitter_ms(max_inclusive: u64) -> u64 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| Duration::from_secs(0));
    let nanos = now.subsec_nanos() as u64;
    nanos % (max_inclusive + 1)
}

/// Error bodies are parsed whole; only the fallback text kept in the error is truncated.
async fn read_error_body(resp: reqwest::Response) -> Vec<u8> {
    match resp.bytes().await {
        Ok(b) => b.to_vec(),
        Err(e) => {
            warn!(error = %e, "failed to read upstream error body");
            b"<failed to read error body>".to_vec()
        }
    }
}

#[derive(Debug, Deserialize)]
struct GoogleErrorEnvelope {
    error: GoogleErrorObject,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorObject {
    message: Option<String>,
    status: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
    pub usage_metadata: Option<UsageMetadata>,
}

impl GenerateContentResponse {
    /// Concatenated, trimmed text of the first candidate; `None` when there is nothing to say.
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<Content>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    pub prompt_token_count: Option<u64>,
    pub total_token_count: Option<u64>,
}
