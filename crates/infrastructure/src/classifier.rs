//! Gemini `generateContent` 情绪分类适配器

use std::time::Duration;

use application::sentiment::{build_prompt, ClassificationError, RemoteClassifier};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub struct GeminiClassifier {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl GeminiClassifier {
    /// `api_key` 为空时不会发出任何请求，直接返回 `MissingCredential`
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            timeout,
        }
    }

    fn request_body(text: &str) -> GeminiRequest {
        GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: build_prompt(text),
                }],
            }],
        }
    }

    fn reply_text(response: GeminiResponse) -> Result<String, ClassificationError> {
        response
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .and_then(|content| content.parts.into_iter().next())
            .map(|part| part.text.trim().to_owned())
            .ok_or_else(|| ClassificationError::Malformed("response carries no candidate text".into()))
    }
}

#[async_trait]
impl RemoteClassifier for GeminiClassifier {
    async fn classify(&self, text: &str) -> Result<String, ClassificationError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ClassificationError::MissingCredential)?;

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", api_key)
            .timeout(self.timeout)
            .json(&Self::request_body(text))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ClassificationError::Timeout(self.timeout)
                } else {
                    ClassificationError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ClassificationError::Transport(format!("failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(ClassificationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GeminiResponse = serde_json::from_str(&body)
            .map_err(|e| ClassificationError::Malformed(e.to_string()))?;
        let reply = Self::reply_text(parsed)?;
        tracing::debug!(reply = %reply, "远程分类器已返回");
        Ok(reply)
    }
}

// Gemini API types

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}
