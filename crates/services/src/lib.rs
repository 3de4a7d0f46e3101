#![forbid(unsafe_code)]

pub mod error;
pub mod gateways;
pub mod llm;
pub mod quiz;
pub mod ticker;

pub use quiz_core::Clock;

pub use error::{AppServicesError, GatewayError, GatewayOperation, QuizFlowError, Step};
pub use gateways::{
    ExplanationSimplifier, ExtractionRequest, GenerationRequest, LlmGateway, QuizGenerator,
    SimplificationRequest, TextExtractor,
};
pub use llm::{LlmClient, LlmConfig};
pub use quiz::{QuizContext, QuizCreationService, QuizTakingService, ResultsService};
pub use ticker::CountdownTicker;
