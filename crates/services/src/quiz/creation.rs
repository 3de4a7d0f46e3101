use quiz_core::model::{QuizConfiguration, QuizDraft};
use tracing::{info, instrument};

use crate::error::{GatewayOperation, QuizFlowError, Step};
use crate::gateways::{ExtractionRequest, GenerationRequest, MIN_DOCUMENT_CHARS};
use crate::quiz::QuizContext;

/// Built-in document for trying the flow without uploading anything.
pub const SAMPLE_TEXT: &str = "The Eiffel Tower is a wrought-iron lattice tower on the Champ de Mars in Paris, France. It is named after the engineer Gustave Eiffel, whose company designed and built the tower.
Constructed from 1887 to 1889 as the entrance to the 1889 World's Fair, it was initially criticized by some of France's leading artists and intellectuals for its design, but it has become a global cultural icon of France and one of the most recognizable structures in the world. The Eiffel Tower is the most-visited paid monument in the world; 6.91 million people ascended it in 2015.
The tower is 324 metres (1,063 ft) tall, about the same height as an 81-storey building, and the tallest structure in Paris. Its base is square, measuring 125 metres (410 ft) on each side. During its construction, the Eiffel Tower surpassed the Washington Monument to become the tallest man-made structure in the world, a title it held for 41 years until the Chrysler Building in New York City was finished in 1930.";

/// Upload, review and configure steps.
pub struct QuizCreationService<'a> {
    ctx: &'a QuizContext,
}

impl<'a> QuizCreationService<'a> {
    pub(crate) fn new(ctx: &'a QuizContext) -> Self {
        Self { ctx }
    }

    /// OCR the uploaded pages and keep the text for review.
    ///
    /// # Errors
    ///
    /// Returns `QuizFlowError::Gateway` if extraction fails; nothing is
    /// stored in that case.
    #[instrument(skip_all, fields(pages = request.pages().len()))]
    pub async fn extract_text(&self, request: &ExtractionRequest) -> Result<String, QuizFlowError> {
        let text = self
            .ctx
            .extractor
            .extract(request)
            .await
            .map_err(QuizFlowError::gateway(GatewayOperation::Extraction))?;
        self.ctx.store.save_document_text(&text).await?;
        info!(chars = text.chars().count(), "extracted document text");
        Ok(text)
    }

    /// Store reviewed or hand-entered text.
    ///
    /// # Errors
    ///
    /// Returns `QuizFlowError::DocumentTooShort` below the minimum length.
    pub async fn save_document_text(&self, text: &str) -> Result<(), QuizFlowError> {
        let text = text.trim();
        let len = text.chars().count();
        if len < MIN_DOCUMENT_CHARS {
            return Err(QuizFlowError::DocumentTooShort {
                len,
                min: MIN_DOCUMENT_CHARS,
            });
        }
        self.ctx.store.save_document_text(text).await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `QuizFlowError::Storage` on backend failures.
    pub async fn use_sample_text(&self) -> Result<(), QuizFlowError> {
        self.ctx.store.save_document_text(SAMPLE_TEXT).await?;
        Ok(())
    }

    /// The text awaiting review or configuration.
    ///
    /// # Errors
    ///
    /// Returns `QuizFlowError::MissingPrerequisite` when nothing was uploaded.
    pub async fn document_text(&self) -> Result<String, QuizFlowError> {
        self.ctx
            .store
            .document_text()
            .await?
            .ok_or(QuizFlowError::MissingPrerequisite(Step::Configure))
    }

    /// Generate a quiz from the stored text and make it the active draft.
    ///
    /// # Errors
    ///
    /// Returns `QuizFlowError::MissingPrerequisite` without document text and
    /// `QuizFlowError::Gateway` if generation fails. On error the previous
    /// draft is left untouched.
    #[instrument(skip_all, fields(questions = config.question_count()))]
    pub async fn generate(&self, config: QuizConfiguration) -> Result<QuizDraft, QuizFlowError> {
        let document_text = self.document_text().await?;
        let request = GenerationRequest::new(&document_text, &config)
            .map_err(QuizFlowError::gateway(GatewayOperation::Generation))?;
        let questions = self
            .ctx
            .generator
            .generate(&request)
            .await
            .map_err(QuizFlowError::gateway(GatewayOperation::Generation))?;

        let draft = QuizDraft {
            document_text,
            questions,
            config: Some(config),
        };
        self.ctx.store.save_draft(&draft).await?;
        info!(generated = draft.questions.len(), "quiz draft ready");
        Ok(draft)
    }
}
