use crate::model::question::Question;

/// Characters of source text kept in a topic label.
pub const TOPIC_LABEL_CHARS: usize = 50;

/// Count answers that match the correct option. Unanswered never counts.
#[must_use]
pub fn score(questions: &[Question], answers: &[Option<usize>]) -> u32 {
    let correct = questions
        .iter()
        .zip(answers)
        .filter(|(question, answer)| question.is_correct(**answer))
        .count();
    u32::try_from(correct).unwrap_or(u32::MAX)
}

/// Percentage of correct answers in `[0, 100]`. Returns 0 for an empty quiz.
#[must_use]
pub fn accuracy(score: u32, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let total = total as f64;
    (100.0 * f64::from(score) / total).clamp(0.0, 100.0)
}

/// Accuracy rounded to the nearest whole percent, as shown in summaries.
#[must_use]
pub fn rounded_accuracy(accuracy: f64) -> u32 {
    // Accuracy is clamped to [0, 100] so the cast cannot truncate.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let rounded = accuracy.round().clamp(0.0, 100.0) as u32;
    rounded
}

/// Short label for a quiz: the first characters of its source text, taken
/// as-is, followed by `...`.
#[must_use]
pub fn topic_label(source_text: &str) -> String {
    let head: String = source_text.chars().take(TOPIC_LABEL_CHARS).collect();
    format!("{head}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(correct: usize) -> Question {
        Question::new(
            "Q",
            vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct,
            None,
        )
        .unwrap()
    }

    #[test]
    fn scores_three_question_example() {
        let questions = vec![question(1), question(0), question(2)];
        let answers = vec![Some(1), Some(0), Some(0)];
        let score = score(&questions, &answers);
        assert_eq!(score, 2);
        let acc = accuracy(score, questions.len());
        assert!((acc - 66.666_666).abs() < 0.001);
        assert_eq!(rounded_accuracy(acc), 67);
    }

    #[test]
    fn unanswered_is_not_correct() {
        let questions = vec![question(0), question(0)];
        assert_eq!(score(&questions, &[None, Some(0)]), 1);
    }

    #[test]
    fn accuracy_is_bounded() {
        for total in 1..=20_usize {
            for s in 0..=u32::try_from(total).unwrap() {
                let acc = accuracy(s, total);
                assert!((0.0..=100.0).contains(&acc));
            }
        }
        assert!(accuracy(0, 0).abs() < f64::EPSILON);
    }

    #[test]
    fn topic_label_is_char_safe() {
        let text = "é".repeat(80);
        let label = topic_label(&text);
        assert_eq!(label.chars().count(), TOPIC_LABEL_CHARS + 3);
        assert!(label.ends_with("..."));
    }

    #[test]
    fn topic_label_keeps_text_untrimmed() {
        assert_eq!(topic_label("  Paris\n"), "  Paris\n...");
        assert_eq!(topic_label(""), "...");
    }
}
