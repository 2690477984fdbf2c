//! Layer 3: optional generative review pass.
//!
//! A reviewer receives the original text plus the substrings already caught
//! by the earlier layers and proposes PII the pipeline missed. The layer is
//! disabled unless the host environment advertises an endpoint, and it is
//! fail-open end to end: timeouts, transport errors, and unparseable
//! responses all collapse to "no additional spans".

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

/// Environment variable naming an OpenAI-compatible chat completions URL.
pub const REVIEWER_URL_VAR: &str = "REDACT_REVIEWER_URL";
/// Model name for the reviewer endpoint.
pub const REVIEWER_MODEL_VAR: &str = "REDACT_REVIEWER_MODEL";
/// Optional bearer token.
pub const REVIEWER_API_KEY_VAR: &str = "REDACT_REVIEWER_API_KEY";

/// A candidate produced by the reviewer. `text` must appear verbatim in the
/// input at `[start, end)`; the engine re-checks that before accepting.
#[derive(Debug, Clone)]
pub struct ReviewedSpan {
    pub text: String,
    pub entity_type: String,
    pub start: usize,
    pub end: usize,
}

#[async_trait]
pub trait SpanReviewer: Send + Sync {
    async fn review(&self, text: &str, already_found: &[String]) -> Result<Vec<ReviewedSpan>>;
}

/// Reviewer backed by an OpenAI-compatible `/v1/chat/completions` endpoint.
/// Requests run at temperature zero with a fixed seed so reruns are stable;
/// residual nondeterminism is tolerated by the engine's post-validation.
pub struct HttpReviewer {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl HttpReviewer {
    /// Construct from the environment; `None` when no endpoint is
    /// advertised, which disables the layer entirely.
    pub fn from_env() -> Option<Self> {
        let endpoint = std::env::var(REVIEWER_URL_VAR).ok()?;
        let model =
            std::env::var(REVIEWER_MODEL_VAR).unwrap_or_else(|_| "gpt-4o-mini".to_string());
        let api_key = std::env::var(REVIEWER_API_KEY_VAR).ok();
        Some(Self {
            client: reqwest::Client::new(),
            endpoint,
            model,
            api_key,
        })
    }

    fn prompt(text: &str, already_found: &[String]) -> String {
        let known = if already_found.is_empty() {
            "(none)".to_string()
        } else {
            already_found
                .iter()
                .map(|s| format!("- {s}"))
                .collect::<Vec<_>>()
                .join("\n")
        };
        format!(
            "You are a privacy reviewer. The following text will be shared with an \
             external service. These substrings were already identified as PII and \
             will be removed:\n{known}\n\n\
             List any remaining personally identifiable information. Respond with a \
             JSON array only, no prose. Each element: {{\"text\": \"<exact substring \
             copied verbatim from the input>\", \"entity_type\": \"<UPPERCASE_TAG>\"}}. \
             Respond with [] if nothing remains.\n\nTEXT:\n{text}"
        )
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct RawFinding {
    text: String,
    entity_type: String,
}

#[async_trait]
impl SpanReviewer for HttpReviewer {
    async fn review(&self, text: &str, already_found: &[String]) -> Result<Vec<ReviewedSpan>> {
        let body = json!({
            "model": self.model,
            "temperature": 0,
            "seed": 0,
            "messages": [
                {"role": "user", "content": Self::prompt(text, already_found)}
            ],
        });

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.context("reviewer request failed")?;
        if !response.status().is_success() {
            return Err(anyhow!("reviewer returned status {}", response.status()));
        }
        let parsed: ChatResponse = response.json().await.context("reviewer response decode")?;
        let content = parsed
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .unwrap_or("[]");

        let findings = parse_findings(content);
        debug!(count = findings.len(), "reviewer returned findings");
        Ok(locate_findings(text, findings))
    }
}

/// Parse the model reply, tolerating markdown code fences around the array.
fn parse_findings(content: &str) -> Vec<RawFinding> {
    let trimmed = content
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();
    match serde_json::from_str::<Vec<RawFinding>>(trimmed) {
        Ok(findings) => findings,
        Err(e) => {
            warn!(error = %e, "reviewer reply was not a JSON array; ignoring");
            Vec::new()
        }
    }
}

/// Resolve each finding to every verbatim occurrence in the text. Findings
/// that never occur verbatim are dropped.
fn locate_findings(text: &str, findings: Vec<RawFinding>) -> Vec<ReviewedSpan> {
    let mut spans = Vec::new();
    for finding in findings {
        if finding.text.is_empty() {
            continue;
        }
        let entity_type: String = finding
            .entity_type
            .trim()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect();
        if entity_type.is_empty() {
            continue;
        }
        for (start, matched) in text.match_indices(&finding.text) {
            spans.push(ReviewedSpan {
                text: matched.to_string(),
                entity_type: entity_type.clone(),
                start,
                end: start + matched.len(),
            });
        }
    }
    spans
}
