use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fewest answer options a generated question may carry.
pub const MIN_OPTIONS: usize = 4;
/// Most answer options a generated question may carry.
pub const MAX_OPTIONS: usize = 5;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question text is empty")]
    EmptyText,

    #[error("question must have 4 or 5 options, got {0}")]
    OptionCount(usize),

    #[error("option {0} is empty")]
    EmptyOption(usize),

    #[error("correct answer index {index} is out of range for {len} options")]
    CorrectIndexOutOfRange { index: usize, len: usize },
}

/// A single multiple-choice question. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "QuestionRecord", into = "QuestionRecord")]
pub struct Question {
    text: String,
    options: Vec<String>,
    correct_option_index: usize,
    explanation: Option<String>,
}

impl Question {
    /// Build a validated question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the text or an option is blank, the option
    /// count is not 4 or 5, or the correct index does not point at an option.
    pub fn new(
        text: impl Into<String>,
        options: Vec<String>,
        correct_option_index: usize,
        explanation: Option<String>,
    ) -> Result<Self, QuestionError> {
        let text = text.into().trim().to_string();
        if text.is_empty() {
            return Err(QuestionError::EmptyText);
        }
        if !(MIN_OPTIONS..=MAX_OPTIONS).contains(&options.len()) {
            return Err(QuestionError::OptionCount(options.len()));
        }
        let options: Vec<String> = options
            .into_iter()
            .map(|option| option.trim().to_string())
            .collect();
        if let Some(blank) = options.iter().position(String::is_empty) {
            return Err(QuestionError::EmptyOption(blank));
        }
        if correct_option_index >= options.len() {
            return Err(QuestionError::CorrectIndexOutOfRange {
                index: correct_option_index,
                len: options.len(),
            });
        }
        let explanation = explanation
            .map(|val| val.trim().to_string())
            .filter(|val| !val.is_empty());

        Ok(Self {
            text,
            options,
            correct_option_index,
            explanation,
        })
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn option_count(&self) -> usize {
        self.options.len()
    }

    #[must_use]
    pub fn correct_option_index(&self) -> usize {
        self.correct_option_index
    }

    #[must_use]
    pub fn correct_option(&self) -> &str {
        &self.options[self.correct_option_index]
    }

    #[must_use]
    pub fn explanation(&self) -> Option<&str> {
        self.explanation.as_deref()
    }

    /// Whether the recorded answer matches. Unanswered is never correct.
    #[must_use]
    pub fn is_correct(&self, answer: Option<usize>) -> bool {
        answer == Some(self.correct_option_index)
    }
}

/// Wire shape of a question, as produced by the generator and stored in
/// drafts and results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub question: String,
    pub options: Vec<String>,
    #[serde(rename = "correctAnswerIndex")]
    pub correct_answer_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl TryFrom<QuestionRecord> for Question {
    type Error = QuestionError;

    fn try_from(record: QuestionRecord) -> Result<Self, Self::Error> {
        Question::new(
            record.question,
            record.options,
            record.correct_answer_index,
            record.explanation,
        )
    }
}

impl From<Question> for QuestionRecord {
    fn from(question: Question) -> Self {
        Self {
            question: question.text,
            options: question.options,
            correct_answer_index: question.correct_option_index,
            explanation: question.explanation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("Option {i}")).collect()
    }

    #[test]
    fn rejects_out_of_range_correct_index() {
        let err = Question::new("Q?", options(4), 4, None).unwrap_err();
        assert_eq!(err, QuestionError::CorrectIndexOutOfRange { index: 4, len: 4 });
    }

    #[test]
    fn rejects_wrong_option_count() {
        assert_eq!(
            Question::new("Q?", options(3), 0, None).unwrap_err(),
            QuestionError::OptionCount(3)
        );
        assert_eq!(
            Question::new("Q?", options(6), 0, None).unwrap_err(),
            QuestionError::OptionCount(6)
        );
        assert!(Question::new("Q?", options(5), 4, None).is_ok());
    }

    #[test]
    fn blank_explanation_is_dropped() {
        let q = Question::new("Q?", options(4), 1, Some("   ".into())).unwrap();
        assert_eq!(q.explanation(), None);
        assert!(q.is_correct(Some(1)));
        assert!(!q.is_correct(None));
    }

    #[test]
    fn deserializes_generator_json_and_validates() {
        let json = r#"{
            "question": "Capital of France?",
            "options": ["Rome", "Paris", "Berlin", "Madrid"],
            "correctAnswerIndex": 1,
            "explanation": "**Paris** is the capital."
        }"#;
        let q: Question = serde_json::from_str(json).unwrap();
        assert_eq!(q.correct_option(), "Paris");

        let bad = r#"{"question": "Q", "options": ["a","b","c","d"], "correctAnswerIndex": 9}"#;
        assert!(serde_json::from_str::<Question>(bad).is_err());
    }
}
