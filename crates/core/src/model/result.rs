use chrono::{DateTime, Utc};
use serde::de::{Deserializer, IgnoredAny};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::model::config::QuizConfiguration;
use crate::model::question::Question;
use crate::model::scoring::{accuracy, rounded_accuracy, score};

/// Accuracy above which a result counts as a pass.
pub const PASSING_ACCURACY: f64 = 60.0;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ResultError {
    #[error("result has {answers} answers for {questions} questions")]
    AnswerCountMismatch { questions: usize, answers: usize },

    #[error("score {score} exceeds question count {questions}")]
    ScoreOutOfRange { score: u32, questions: usize },
}

/// Which subset of a result to review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultFilter {
    #[default]
    All,
    Correct,
    Incorrect,
}

/// One question of a finished quiz, paired with the recorded answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewItem<'a> {
    pub index: usize,
    pub question: &'a Question,
    pub answer: Option<usize>,
    pub is_correct: bool,
}

/// Finalized, scored outcome of one attempt. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "QuizResultRecord", into = "QuizResultRecord")]
pub struct QuizResult {
    id: Uuid,
    questions: Vec<Question>,
    answers: Vec<Option<usize>>,
    score: u32,
    accuracy: f64,
    completed_at: DateTime<Utc>,
    topic: String,
    config: Option<QuizConfiguration>,
}

impl QuizResult {
    /// Score `answers` against `questions` and build a result.
    ///
    /// `answers` is padded with "unanswered" or truncated to match
    /// `questions`.
    #[must_use]
    pub fn new(
        questions: Vec<Question>,
        mut answers: Vec<Option<usize>>,
        completed_at: DateTime<Utc>,
        topic: impl Into<String>,
        config: Option<QuizConfiguration>,
    ) -> Self {
        answers.resize(questions.len(), None);
        let score = score(&questions, &answers);
        let accuracy = accuracy(score, questions.len());
        Self {
            id: Uuid::new_v4(),
            questions,
            answers,
            score,
            accuracy,
            completed_at,
            topic: topic.into(),
            config,
        }
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn answers(&self) -> &[Option<usize>] {
        &self.answers
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn accuracy(&self) -> f64 {
        self.accuracy
    }

    #[must_use]
    pub fn rounded_accuracy(&self) -> u32 {
        rounded_accuracy(self.accuracy)
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    #[must_use]
    pub fn config(&self) -> Option<&QuizConfiguration> {
        self.config.as_ref()
    }

    /// Results saved without a configuration cannot be retaken.
    #[must_use]
    pub fn can_retake(&self) -> bool {
        self.config.is_some()
    }

    #[must_use]
    pub fn is_passing(&self) -> bool {
        self.accuracy > PASSING_ACCURACY
    }

    #[must_use]
    pub fn incorrect_count(&self) -> usize {
        self.questions.len().saturating_sub(self.score as usize)
    }

    /// Questions paired with their answers, restricted by `filter`.
    pub fn review(&self, filter: ResultFilter) -> impl Iterator<Item = ReviewItem<'_>> {
        self.questions
            .iter()
            .zip(&self.answers)
            .enumerate()
            .map(|(index, (question, answer))| ReviewItem {
                index,
                question,
                answer: *answer,
                is_correct: question.is_correct(*answer),
            })
            .filter(move |item| match filter {
                ResultFilter::All => true,
                ResultFilter::Correct => item.is_correct,
                ResultFilter::Incorrect => !item.is_correct,
            })
    }
}

/// Persisted shape of a result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizResultRecord {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub quiz: Vec<Question>,
    pub answers: Vec<Option<usize>>,
    pub score: u32,
    pub accuracy: f64,
    pub time: DateTime<Utc>,
    pub topic: String,
    #[serde(
        default,
        deserialize_with = "lenient_config",
        skip_serializing_if = "Option::is_none"
    )]
    pub config: Option<QuizConfiguration>,
}

/// An unreadable configuration is treated as missing rather than failing the
/// whole result; the entry then simply cannot be retaken.
fn lenient_config<'de, D>(deserializer: D) -> Result<Option<QuizConfiguration>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum MaybeConfig {
        Valid(QuizConfiguration),
        Invalid(IgnoredAny),
    }

    Ok(match Option::<MaybeConfig>::deserialize(deserializer)? {
        Some(MaybeConfig::Valid(config)) => Some(config),
        Some(MaybeConfig::Invalid(_)) | None => None,
    })
}

impl TryFrom<QuizResultRecord> for QuizResult {
    type Error = ResultError;

    fn try_from(record: QuizResultRecord) -> Result<Self, Self::Error> {
        if record.answers.len() != record.quiz.len() {
            return Err(ResultError::AnswerCountMismatch {
                questions: record.quiz.len(),
                answers: record.answers.len(),
            });
        }
        if record.score as usize > record.quiz.len() {
            return Err(ResultError::ScoreOutOfRange {
                score: record.score,
                questions: record.quiz.len(),
            });
        }
        Ok(Self {
            id: record.id,
            questions: record.quiz,
            answers: record.answers,
            score: record.score,
            accuracy: record.accuracy.clamp(0.0, 100.0),
            completed_at: record.time,
            topic: record.topic,
            config: record.config,
        })
    }
}

impl From<QuizResult> for QuizResultRecord {
    fn from(result: QuizResult) -> Self {
        Self {
            id: result.id,
            quiz: result.questions,
            answers: result.answers,
            score: result.score,
            accuracy: result.accuracy,
            time: result.completed_at,
            topic: result.topic,
            config: result.config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn question(correct: usize) -> Question {
        Question::new(
            format!("Q{correct}"),
            vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct,
            Some("because **reasons**".into()),
        )
        .unwrap()
    }

    fn example() -> QuizResult {
        QuizResult::new(
            vec![question(1), question(0), question(2)],
            vec![Some(1), Some(0), Some(0)],
            fixed_now(),
            "Example topic...",
            Some(QuizConfiguration::default()),
        )
    }

    #[test]
    fn scores_on_construction() {
        let result = example();
        assert_eq!(result.score(), 2);
        assert_eq!(result.rounded_accuracy(), 67);
        assert_eq!(result.incorrect_count(), 1);
        assert!(result.is_passing());
    }

    #[test]
    fn review_filters_by_correctness() {
        let result = example();
        let incorrect: Vec<usize> = result
            .review(ResultFilter::Incorrect)
            .map(|item| item.index)
            .collect();
        assert_eq!(incorrect, vec![2]);
        assert_eq!(result.review(ResultFilter::Correct).count(), 2);
        assert_eq!(result.review(ResultFilter::All).count(), 3);
    }

    #[test]
    fn json_round_trip_keeps_score_fields() {
        let result = example();
        let json = serde_json::to_string(&result).unwrap();
        let back: QuizResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id(), result.id());
        assert_eq!(back.questions(), result.questions());
        assert_eq!(back.answers(), result.answers());
        assert_eq!(back.score(), 2);
        assert!((back.accuracy() - result.accuracy()).abs() < 1e-9);
        assert_eq!(back.completed_at(), result.completed_at());
        assert_eq!(back.config(), result.config());
    }

    #[test]
    fn malformed_config_loads_as_not_retakeable() {
        let mut value = serde_json::to_value(example()).unwrap();
        value["config"] = serde_json::json!({ "numberOfQuestions": 0, "optionsPerQuestion": 9 });
        let back: QuizResult = serde_json::from_value(value).unwrap();
        assert!(!back.can_retake());
    }

    #[test]
    fn rejects_mismatched_answers() {
        let mut value = serde_json::to_value(example()).unwrap();
        value["answers"] = serde_json::json!([1]);
        assert!(serde_json::from_value::<QuizResult>(value).is_err());
    }
}
