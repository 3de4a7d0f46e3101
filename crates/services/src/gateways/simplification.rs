use serde::{Deserialize, Serialize};

use crate::error::GatewayError;
use crate::llm::ChatMessage;

const SYSTEM_PROMPT: &str = "You are an expert at explaining complex topics in simple terms. \
You always answer with a single JSON object of the form {\"simplifiedText\": string}.";

/// Explanation text to be rewritten in plain words.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimplificationRequest {
    text_to_simplify: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SimplificationReply {
    simplified_text: String,
}

impl SimplificationRequest {
    /// # Errors
    ///
    /// Returns `GatewayError::InvalidInput` for blank text.
    pub fn new(text: &str) -> Result<Self, GatewayError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(GatewayError::InvalidInput(
                "There is no explanation to simplify.".to_string(),
            ));
        }
        Ok(Self {
            text_to_simplify: text.to_string(),
        })
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text_to_simplify
    }

    pub(crate) fn messages(&self) -> Vec<ChatMessage> {
        let prompt = format!(
            "Your task is to take the following text and rewrite it in a much simpler, \
             easy-to-understand way. Avoid jargon and use analogies if helpful. Keep the \
             core meaning intact.\n\nOriginal Text: {}",
            self.text_to_simplify
        );
        vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(prompt)]
    }

    /// # Errors
    ///
    /// Returns `GatewayError::Malformed` for a reply without
    /// `simplifiedText` and `GatewayError::EmptyResponse` for blank text.
    pub fn parse_reply(reply: serde_json::Value) -> Result<String, GatewayError> {
        let reply: SimplificationReply = serde_json::from_value(reply)
            .map_err(|err| GatewayError::Malformed(err.to_string()))?;
        let text = reply.simplified_text.trim();
        if text.is_empty() {
            return Err(GatewayError::EmptyResponse);
        }
        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MessageContent;
    use serde_json::json;

    #[test]
    fn blank_text_is_rejected() {
        assert!(matches!(
            SimplificationRequest::new("  "),
            Err(GatewayError::InvalidInput(_))
        ));
    }

    #[test]
    fn serializes_with_wire_field_name() {
        let request = SimplificationRequest::new("Entropy increases.").unwrap();
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({ "textToSimplify": "Entropy increases." })
        );
        match &request.messages()[1].content {
            MessageContent::Text(prompt) => assert!(prompt.contains("Entropy increases.")),
            MessageContent::Parts(_) => panic!("expected a text prompt"),
        }
    }

    #[test]
    fn parses_reply() {
        let text = SimplificationRequest::parse_reply(json!({ "simplifiedText": "Things mix." }));
        assert_eq!(text.unwrap(), "Things mix.");
        assert!(matches!(
            SimplificationRequest::parse_reply(json!({ "text": "x" })),
            Err(GatewayError::Malformed(_))
        ));
    }
}
