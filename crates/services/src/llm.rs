use std::env;
use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::error::GatewayError;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Clone, Debug)]
pub struct LlmConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    /// Model used for image inputs.
    pub vision_model: String,
    pub timeout: Duration,
}

impl LlmConfig {
    /// Read `QUIZ_AI_*` variables. Returns `None` when no API key is set or
    /// the base URL does not parse.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("QUIZ_AI_API_KEY").ok()?;
        if api_key.trim().is_empty() {
            return None;
        }
        let base_url = env::var("QUIZ_AI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
        if let Err(err) = Url::parse(&base_url) {
            warn!(%base_url, error = %err, "ignoring AI config with invalid base URL");
            return None;
        }
        let model = env::var("QUIZ_AI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());
        let vision_model = env::var("QUIZ_AI_VISION_MODEL").unwrap_or_else(|_| model.clone());
        let timeout = env::var("QUIZ_AI_TIMEOUT_SECS")
            .ok()
            .and_then(|raw| raw.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Some(Self {
            base_url,
            api_key,
            model,
            vision_model,
            timeout: Duration::from_secs(timeout),
        })
    }
}

/// OpenAI-compatible chat client that asks for JSON objects back.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    config: Option<LlmConfig>,
}

impl LlmClient {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(LlmConfig::from_env())
    }

    #[must_use]
    pub fn new(config: Option<LlmConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }

    /// Send `messages` and decode the reply content as `T`.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` when the client is disabled, the request fails,
    /// or the reply is empty or does not decode as `T`.
    pub async fn complete_json<T: DeserializeOwned>(
        &self,
        messages: Vec<ChatMessage>,
        vision: bool,
    ) -> Result<T, GatewayError> {
        let config = self.config.as_ref().ok_or(GatewayError::Disabled)?;

        let url = format!(
            "{}/chat/completions",
            config.base_url.trim_end_matches('/')
        );
        let model = if vision {
            config.vision_model.clone()
        } else {
            config.model.clone()
        };
        debug!(%model, messages = messages.len(), "sending chat completion");
        let payload = ChatRequest {
            model,
            messages,
            temperature: 0.2,
            response_format: ResponseFormat { kind: "json_object" },
        };

        let response = self
            .client
            .post(url)
            .bearer_auth(&config.api_key)
            .timeout(config.timeout)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GatewayError::HttpStatus(response.status()));
        }

        let body: ChatResponse = response.json().await?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(GatewayError::EmptyResponse)?;

        decode_json_content(&content)
    }
}

/// Parse a reply that should be a JSON object, tolerating a Markdown code
/// fence around it.
pub(crate) fn decode_json_content<T: DeserializeOwned>(content: &str) -> Result<T, GatewayError> {
    let trimmed = content.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed);
    serde_json::from_str(unfenced.trim()).map_err(|err| GatewayError::Malformed(err.to_string()))
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: MessageContent,
}

impl ChatMessage {
    #[must_use]
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: "system",
            content: MessageContent::Text(text.into()),
        }
    }

    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: MessageContent::Text(text.into()),
        }
    }

    #[must_use]
    pub fn user_parts(parts: Vec<ContentPart>) -> Self {
        Self {
            role: "user",
            content: MessageContent::Parts(parts),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Reply {
        text: String,
    }

    #[test]
    fn decodes_plain_and_fenced_json() {
        let plain: Reply = decode_json_content(r#"{"text": "hi"}"#).unwrap();
        assert_eq!(plain.text, "hi");
        let fenced: Reply = decode_json_content("```json\n{\"text\": \"hi\"}\n```").unwrap();
        assert_eq!(fenced.text, "hi");
    }

    #[test]
    fn malformed_content_is_normalized() {
        let err = decode_json_content::<Reply>("not json").unwrap_err();
        assert!(matches!(err, GatewayError::Malformed(_)));
    }

    #[tokio::test]
    async fn disabled_client_refuses() {
        let client = LlmClient::new(None);
        assert!(!client.enabled());
        let err = client
            .complete_json::<Reply>(vec![ChatMessage::user("hi")], false)
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Disabled));
    }

    #[test]
    fn image_parts_serialize_in_chat_format() {
        let message = ChatMessage::user_parts(vec![
            ContentPart::Text { text: "Page".into() },
            ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: "data:image/png;base64,AAAA".into(),
                },
            },
        ]);
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["content"][0]["type"], "text");
        assert_eq!(value["content"][1]["type"], "image_url");
        assert_eq!(value["content"][1]["image_url"]["url"], "data:image/png;base64,AAAA");
    }
}
