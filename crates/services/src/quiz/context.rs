use std::sync::Arc;

use quiz_core::Clock;
use storage::{QuizStore, Storage};
use tracing::info;

use crate::error::{AppServicesError, QuizFlowError};
use crate::gateways::{ExplanationSimplifier, LlmGateway, QuizGenerator, TextExtractor};
use crate::quiz::{QuizCreationService, QuizTakingService, ResultsService};

/// Everything the quiz flow needs: persisted slots, gateways and a clock.
#[derive(Clone)]
pub struct QuizContext {
    pub(crate) store: QuizStore,
    pub(crate) generator: Arc<dyn QuizGenerator>,
    pub(crate) extractor: Arc<dyn TextExtractor>,
    pub(crate) simplifier: Arc<dyn ExplanationSimplifier>,
    pub(crate) clock: Clock,
}

impl QuizContext {
    /// Use one LLM-backed gateway for all remote calls.
    #[must_use]
    pub fn new(storage: &Storage, gateway: Arc<LlmGateway>, clock: Clock) -> Self {
        Self::with_gateways(
            storage,
            Arc::clone(&gateway) as Arc<dyn QuizGenerator>,
            Arc::clone(&gateway) as Arc<dyn TextExtractor>,
            gateway as Arc<dyn ExplanationSimplifier>,
            clock,
        )
    }

    #[must_use]
    pub fn with_gateways(
        storage: &Storage,
        generator: Arc<dyn QuizGenerator>,
        extractor: Arc<dyn TextExtractor>,
        simplifier: Arc<dyn ExplanationSimplifier>,
        clock: Clock,
    ) -> Self {
        Self {
            store: storage.quiz_store(),
            generator,
            extractor,
            simplifier,
            clock,
        }
    }

    /// Build a context backed by `SQLite` with the gateway read from the
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the database cannot be opened or migrated.
    pub async fn sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        let gateway = LlmGateway::from_env();
        if !gateway.enabled() {
            info!("AI gateway disabled; generation and extraction will fail until configured");
        }
        Ok(Self::new(&storage, Arc::new(gateway), clock))
    }

    #[must_use]
    pub fn store(&self) -> &QuizStore {
        &self.store
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    #[must_use]
    pub fn creation(&self) -> QuizCreationService<'_> {
        QuizCreationService::new(self)
    }

    #[must_use]
    pub fn taking(&self) -> QuizTakingService<'_> {
        QuizTakingService::new(self)
    }

    #[must_use]
    pub fn results(&self) -> ResultsService<'_> {
        ResultsService::new(self)
    }

    /// Drop the document, draft and last result. History is kept.
    ///
    /// # Errors
    ///
    /// Returns `QuizFlowError::Storage` on backend failures.
    pub async fn clear_quiz_state(&self) -> Result<(), QuizFlowError> {
        self.store.clear_quiz_state().await?;
        info!("cleared quiz state");
        Ok(())
    }
}
