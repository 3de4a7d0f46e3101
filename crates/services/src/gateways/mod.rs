//! Request/response boundaries to the hosted LLM.
//!
//! Every remote failure (transport, status, empty or malformed reply) is
//! turned into a [`GatewayError`] here; callers never see raw transport
//! errors.

mod extraction;
mod generation;
mod simplification;

use async_trait::async_trait;
use quiz_core::model::Question;

use crate::error::GatewayError;
use crate::llm::LlmClient;

pub use extraction::{ExtractionRequest, parse_data_uri};
pub use generation::{GenerationRequest, MIN_DOCUMENT_CHARS};
pub use simplification::SimplificationRequest;

#[async_trait]
pub trait QuizGenerator: Send + Sync {
    /// Generate validated questions for `request`.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` for any remote or schema failure.
    async fn generate(&self, request: &GenerationRequest) -> Result<Vec<Question>, GatewayError>;
}

#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// OCR every page of `request`, concatenated in order.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` for any remote or schema failure.
    async fn extract(&self, request: &ExtractionRequest) -> Result<String, GatewayError>;
}

#[async_trait]
pub trait ExplanationSimplifier: Send + Sync {
    /// Rewrite an explanation in plain words.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` for any remote or schema failure.
    async fn simplify(&self, request: &SimplificationRequest) -> Result<String, GatewayError>;
}

/// All three gateways backed by one [`LlmClient`].
#[derive(Clone)]
pub struct LlmGateway {
    client: LlmClient,
}

impl LlmGateway {
    #[must_use]
    pub fn new(client: LlmClient) -> Self {
        Self { client }
    }

    #[must_use]
    pub fn from_env() -> Self {
        Self::new(LlmClient::from_env())
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.client.enabled()
    }
}

#[async_trait]
impl QuizGenerator for LlmGateway {
    async fn generate(&self, request: &GenerationRequest) -> Result<Vec<Question>, GatewayError> {
        let reply = self.client.complete_json(request.messages(), false).await?;
        request.parse_reply(reply)
    }
}

#[async_trait]
impl TextExtractor for LlmGateway {
    async fn extract(&self, request: &ExtractionRequest) -> Result<String, GatewayError> {
        let reply = self.client.complete_json(request.messages(), true).await?;
        ExtractionRequest::parse_reply(reply)
    }
}

#[async_trait]
impl ExplanationSimplifier for LlmGateway {
    async fn simplify(&self, request: &SimplificationRequest) -> Result<String, GatewayError> {
        let reply = self.client.complete_json(request.messages(), false).await?;
        SimplificationRequest::parse_reply(reply)
    }
}
