use std::fmt::Write as _;

use quiz_core::model::{Difficulty, Question, QuestionFocus, QuestionRecord, QuizConfiguration};
use serde::Deserialize;
use tracing::warn;

use crate::error::GatewayError;
use crate::llm::ChatMessage;

/// Shortest document text worth generating a quiz from.
pub const MIN_DOCUMENT_CHARS: usize = 100;

const SYSTEM_PROMPT: &str = "You are an expert quiz generator for competitive exams. \
You always answer with a single JSON object.";

/// Validated input for quiz generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    document_text: String,
    number_of_questions: u32,
    options_per_question: u8,
    difficulty: Difficulty,
    question_type: QuestionFocus,
    keywords: Option<String>,
    enrich_explanations: bool,
}

#[derive(Debug, Deserialize)]
struct GenerationReply {
    quiz: Vec<serde_json::Value>,
}

impl GenerationRequest {
    /// # Errors
    ///
    /// Returns `GatewayError::InvalidInput` if the document text is shorter
    /// than [`MIN_DOCUMENT_CHARS`].
    pub fn new(document_text: &str, config: &QuizConfiguration) -> Result<Self, GatewayError> {
        let document_text = document_text.trim();
        let len = document_text.chars().count();
        if len < MIN_DOCUMENT_CHARS {
            return Err(GatewayError::InvalidInput(format!(
                "Please provide at least {MIN_DOCUMENT_CHARS} characters of text to generate a quiz."
            )));
        }
        Ok(Self {
            document_text: document_text.to_string(),
            number_of_questions: config.question_count(),
            options_per_question: config.options_per_question(),
            difficulty: config.difficulty(),
            question_type: config.question_focus(),
            keywords: config.keywords().map(str::to_string),
            enrich_explanations: config.explanation_enrichment(),
        })
    }

    #[must_use]
    pub fn document_text(&self) -> &str {
        &self.document_text
    }

    #[must_use]
    pub fn number_of_questions(&self) -> u32 {
        self.number_of_questions
    }

    #[must_use]
    pub fn options_per_question(&self) -> u8 {
        self.options_per_question
    }

    pub(crate) fn messages(&self) -> Vec<ChatMessage> {
        vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(self.prompt())]
    }

    #[must_use]
    pub fn prompt(&self) -> String {
        let mut prompt = String::from(
            "Given the following document text, generate a quiz with the specified number of \
             questions and options per question.\n\n",
        );
        let _ = writeln!(
            prompt,
            "The quiz should be of **{}** difficulty.\n",
            self.difficulty
        );
        let _ = writeln!(
            prompt,
            "The type of questions to generate should be: **{}**. {}\n",
            self.question_type,
            focus_guidance(self.question_type)
        );
        if self.enrich_explanations {
            prompt.push_str(
                "For each question, also provide a concise explanation for why the correct \
                 answer is correct. Highlight the most important parts of the explanation in \
                 bold using Markdown syntax (e.g., **this is important**).\n\n",
            );
        }
        if let Some(keywords) = &self.keywords {
            let _ = writeln!(
                prompt,
                "Focus the questions on the following keywords: **{keywords}**.\n"
            );
        }
        let _ = writeln!(prompt, "Document Text: {}\n", self.document_text);
        let _ = writeln!(prompt, "Number of Questions: {}", self.number_of_questions);
        let _ = writeln!(prompt, "Options Per Question: {}\n", self.options_per_question);
        prompt.push_str(
            "Ensure that each question has one correct answer, and that the correct answer \
             index is accurately represented.\n\
             Respond with JSON of the form {\"quiz\": [{\"question\": string, \"options\": \
             [string], \"correctAnswerIndex\": number, \"explanation\"?: string}]}.",
        );
        prompt
    }

    /// Validate a generator reply against this request.
    ///
    /// Entries that are not valid questions, or carry a different option
    /// count than requested, are dropped. Extra questions are truncated.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Malformed` if the reply has no `quiz` array or
    /// no valid question survives.
    pub fn parse_reply(&self, reply: serde_json::Value) -> Result<Vec<Question>, GatewayError> {
        let reply: GenerationReply = serde_json::from_value(reply)
            .map_err(|err| GatewayError::Malformed(err.to_string()))?;

        let expected_options = usize::from(self.options_per_question);
        let limit = usize::try_from(self.number_of_questions).unwrap_or(usize::MAX);
        let mut questions = Vec::with_capacity(reply.quiz.len().min(limit));
        for (position, raw) in reply.quiz.into_iter().enumerate() {
            let parsed = serde_json::from_value::<QuestionRecord>(raw)
                .map_err(|err| err.to_string())
                .and_then(|record| Question::try_from(record).map_err(|err| err.to_string()));
            match parsed {
                Ok(question) if question.option_count() == expected_options => {
                    questions.push(question);
                }
                Ok(question) => warn!(
                    position,
                    options = question.option_count(),
                    expected = expected_options,
                    "dropping generated question with wrong option count"
                ),
                Err(error) => warn!(position, %error, "dropping invalid generated question"),
            }
        }
        questions.truncate(limit);

        if questions.is_empty() {
            return Err(GatewayError::Malformed(
                "reply contained no valid questions".to_string(),
            ));
        }
        Ok(questions)
    }
}

fn focus_guidance(focus: QuestionFocus) -> &'static str {
    match focus {
        QuestionFocus::Any => "Use a mix of question types.",
        QuestionFocus::Facts => "Focus on facts and figures.",
        QuestionFocus::Concepts => "Focus on concepts and definitions.",
        QuestionFocus::CauseEffect => "Focus on cause and effect.",
    }
}
