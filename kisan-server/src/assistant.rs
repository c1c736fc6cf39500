use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config;

/// Shown to the user whenever the assistant cannot produce an answer
pub const FALLBACK_REPLY: &str =
    "Sorry, Krishi Mitra is not available right now. Please try again in a little while.";

const CHAT_PROMPT: &str = "You are Krishi Mitra, an agricultural expert helping small farmers in India. \
Answer in simple language, in the same language as the question, with practical steps. Question: ";

const IMAGE_PROMPT: &str = "You are a plant pathologist. Look at this crop photo and report: \
1) the crop, 2) any disease or pest you see, 3) its likely cause, \
4) an organic treatment and 5) a chemical treatment with dosage. \
If the plant looks healthy, say so.";

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("assistant API key is not configured")]
    MissingApiKey,
    /// Carries the error with its URL stripped
    #[error("request to assistant failed: {0}")]
    Transport(reqwest::Error),
    #[error("assistant returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("assistant returned no text")]
    EmptyReply,
}

impl From<reqwest::Error> for AssistantError {
    fn from(err: reqwest::Error) -> Self {
        AssistantError::Transport(err.without_url())
    }
}

/// Generative AI backend used for chat and photo analysis
#[async_trait]
pub trait Assistant: Send + Sync {
    async fn chat(&self, message: &str) -> Result<String, AssistantError>;

    async fn analyze_image(&self, mime_type: &str, image: &[u8]) -> Result<String, AssistantError>;
}

/// Collapse any assistant failure into the fallback reply
pub fn reply_or_fallback(result: Result<String, AssistantError>) -> String {
    match result {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!("Assistant call failed, using fallback: {}", e);
            FALLBACK_REPLY.to_string()
        }
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text { text: String },
    Image { inline_data: InlineData<'a> },
}

#[derive(Serialize)]
struct InlineData<'a> {
    mime_type: &'a str,
    data: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateResponse {
    /// Text parts of the first candidate, joined
    fn into_text(self) -> Option<String> {
        let text: String = self
            .candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .filter_map(|p| p.text)
            .collect::<Vec<_>>()
            .join("\n");
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

/// Gemini `generateContent` client
pub struct GeminiAssistant {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiAssistant {
    pub fn new(settings: &config::Assistant) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    async fn generate(&self, parts: Vec<Part<'_>>) -> Result<String, AssistantError> {
        if self.api_key.is_empty() {
            return Err(AssistantError::MissingApiKey);
        }

        let request = GenerateRequest {
            contents: vec![Content { parts }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", self.api_key.as_str())
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(AssistantError::Status { status, body });
        }

        let body: GenerateResponse = response.json().await?;
        body.into_text().ok_or(AssistantError::EmptyReply)
    }
}

#[async_trait]
impl Assistant for GeminiAssistant {
    async fn chat(&self, message: &str) -> Result<String, AssistantError> {
        self.generate(vec![Part::Text {
            text: format!("{CHAT_PROMPT}{message}"),
        }])
        .await
    }

    async fn analyze_image(&self, mime_type: &str, image: &[u8]) -> Result<String, AssistantError> {
        self.generate(vec![
            Part::Text {
                text: IMAGE_PROMPT.to_string(),
            },
            Part::Image {
                inline_data: InlineData {
                    mime_type,
                    data: STANDARD.encode(image),
                },
            },
        ])
        .await
    }
}
