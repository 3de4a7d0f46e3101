use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;

use crate::error::GatewayError;
use crate::llm::{ChatMessage, ContentPart, ImageUrl};

const SYSTEM_PROMPT: &str = "You extract text from documents. You always answer with a single \
JSON object of the form {\"text\": string}.";

const USER_PROMPT: &str = "Extract all text from the following images/PDF pages in order. \
If the images are of a PDF, treat them as consecutive pages. \
Concatenate the text from all pages into a single string.";

/// One or more page images (or a PDF) encoded as data URIs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionRequest {
    pages: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ExtractionReply {
    text: String,
}

impl ExtractionRequest {
    /// # Errors
    ///
    /// Returns `GatewayError::InvalidInput` if no pages are given or a page
    /// is not a base64 `image/*` or `application/pdf` data URI.
    pub fn new(pages: Vec<String>) -> Result<Self, GatewayError> {
        if pages.is_empty() {
            return Err(GatewayError::InvalidInput(
                "Please upload at least one image or PDF.".to_string(),
            ));
        }
        for (position, page) in pages.iter().enumerate() {
            parse_data_uri(page).map_err(|reason| {
                GatewayError::InvalidInput(format!("page {}: {reason}", position + 1))
            })?;
        }
        Ok(Self { pages })
    }

    /// Build a request from raw file contents and their MIME types, in order.
    ///
    /// # Errors
    ///
    /// Same as [`ExtractionRequest::new`].
    pub fn from_pages<'p>(
        pages: impl IntoIterator<Item = (&'p [u8], &'p str)>,
    ) -> Result<Self, GatewayError> {
        let uris = pages
            .into_iter()
            .map(|(bytes, mime_type)| {
                format!("data:{mime_type};base64,{}", STANDARD.encode(bytes))
            })
            .collect();
        Self::new(uris)
    }

    /// # Errors
    ///
    /// Same as [`ExtractionRequest::new`].
    pub fn from_bytes(bytes: &[u8], mime_type: &str) -> Result<Self, GatewayError> {
        Self::from_pages([(bytes, mime_type)])
    }

    #[must_use]
    pub fn pages(&self) -> &[String] {
        &self.pages
    }

    pub(crate) fn messages(&self) -> Vec<ChatMessage> {
        let mut parts = Vec::with_capacity(self.pages.len() + 1);
        parts.push(ContentPart::Text {
            text: USER_PROMPT.to_string(),
        });
        parts.extend(self.pages.iter().map(|page| ContentPart::ImageUrl {
            image_url: ImageUrl { url: page.clone() },
        }));
        vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user_parts(parts),
        ]
    }

    /// # Errors
    ///
    /// Returns `GatewayError::Malformed` if the reply has no `text` field and
    /// `GatewayError::EmptyResponse` if the text is blank.
    pub fn parse_reply(reply: serde_json::Value) -> Result<String, GatewayError> {
        let reply: ExtractionReply = serde_json::from_value(reply)
            .map_err(|err| GatewayError::Malformed(err.to_string()))?;
        let text = reply.text.trim();
        if text.is_empty() {
            return Err(GatewayError::EmptyResponse);
        }
        Ok(text.to_string())
    }
}

/// Split a `data:<mime>;base64,<payload>` URI and decode its payload.
///
/// # Errors
///
/// Returns a short reason when the URI is not a supported base64 data URI.
pub fn parse_data_uri(uri: &str) -> Result<(&str, Vec<u8>), String> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| "expected a data URI".to_string())?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| "data URI has no payload".to_string())?;
    let mime_type = header
        .strip_suffix(";base64")
        .ok_or_else(|| "data URI must be base64 encoded".to_string())?;
    if !(mime_type.starts_with("image/") || mime_type == "application/pdf") {
        return Err(format!("unsupported media type `{mime_type}`"));
    }
    let bytes = STANDARD
        .decode(payload)
        .map_err(|err| format!("invalid base64 payload: {err}"))?;
    if bytes.is_empty() {
        return Err("data URI payload is empty".to_string());
    }
    Ok((mime_type, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_images_and_pdf() {
        let request = ExtractionRequest::new(vec![
            "data:image/png;base64,aGVsbG8=".into(),
            "data:application/pdf;base64,aGVsbG8=".into(),
        ])
        .unwrap();
        assert_eq!(request.pages().len(), 2);
        let (mime, bytes) = parse_data_uri(&request.pages()[0]).unwrap();
        assert_eq!(mime, "image/png");
        assert_eq!(bytes, b"hello");
    }

    #[test]
    fn rejects_bad_pages() {
        assert!(ExtractionRequest::new(Vec::new()).is_err());
        for page in [
            "https://example.com/a.png",
            "data:text/plain;base64,aGVsbG8=",
            "data:image/png,hello",
            "data:image/png;base64,!!!",
        ] {
            let err = ExtractionRequest::new(vec![page.into()]).unwrap_err();
            assert!(matches!(err, GatewayError::InvalidInput(_)), "{page}");
        }
    }

    #[test]
    fn from_bytes_encodes_payload() {
        let request = ExtractionRequest::from_bytes(b"\x89PNG", "image/png").unwrap();
        assert!(request.pages()[0].starts_with("data:image/png;base64,"));
    }

    #[test]
    fn from_pages_keeps_order_and_checks_types() {
        let request = ExtractionRequest::from_pages([
            (b"one".as_slice(), "image/jpeg"),
            (b"two".as_slice(), "application/pdf"),
        ])
        .unwrap();
        assert_eq!(parse_data_uri(&request.pages()[1]).unwrap().1, b"two");

        let err = ExtractionRequest::from_pages([(b"x".as_slice(), "text/plain")]).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidInput(_)));
    }

    #[test]
    fn messages_put_prompt_before_pages() {
        let request = ExtractionRequest::new(vec!["data:image/jpeg;base64,aGk=".into()]).unwrap();
        let value = serde_json::to_value(request.messages()).unwrap();
        let parts = &value[1]["content"];
        assert_eq!(parts[0]["type"], "text");
        assert_eq!(parts[1]["type"], "image_url");
        assert_eq!(parts[1]["image_url"]["url"], "data:image/jpeg;base64,aGk=");
    }

    #[test]
    fn parse_reply_requires_text() {
        assert_eq!(
            ExtractionRequest::parse_reply(json!({ "text": "  Page one. " })).unwrap(),
            "Page one."
        );
        assert!(matches!(
            ExtractionRequest::parse_reply(json!({ "text": "   " })),
            Err(GatewayError::EmptyResponse)
        ));
        assert!(matches!(
            ExtractionRequest::parse_reply(json!({ "pages": [] })),
            Err(GatewayError::Malformed(_))
        ));
    }
}
