use std::fmt::Write as _;

use quiz_core::model::{
    ExplanationTiming, History, MarkupSpan, Question, QuizResult, QuizSession, ResultFilter,
    ReviewItem, parse_markup,
};

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Explanation text with `**bold**` spans turned into terminal bold.
pub fn markup(text: &str) -> String {
    parse_markup(text)
        .into_iter()
        .map(|span| match span {
            MarkupSpan::Plain(text) => text,
            MarkupSpan::Bold(text) => format!("{BOLD}{text}{RESET}"),
        })
        .collect()
}

pub fn question(session: &QuizSession) -> String {
    let progress = session.progress();
    let current = session.current_question();
    let answer = session.current_answer();
    let mut out = String::new();

    let _ = writeln!(
        out,
        "\nQuestion {} of {}  ({:.0}%, {} answered)",
        progress.current + 1,
        progress.total,
        progress.percent,
        progress.answered
    );
    let _ = writeln!(out, "{}", current.text());
    for (index, option) in current.options().iter().enumerate() {
        let marker = if answer == Some(index) { '>' } else { ' ' };
        let _ = writeln!(out, " {marker} {}) {option}", index + 1);
    }

    if answer.is_some() && session.config().explanation_timing() == ExplanationTiming::Immediate {
        out.push_str(&feedback(current, answer));
    }
    out
}

/// Correct/incorrect verdict plus explanation for an answered question.
pub fn feedback(question: &Question, answer: Option<usize>) -> String {
    let mut out = String::new();
    if question.is_correct(answer) {
        out.push_str("Correct!\n");
    } else {
        let _ = writeln!(
            out,
            "Incorrect. The correct answer is {}) {}",
            question.correct_option_index() + 1,
            question.correct_option()
        );
    }
    if let Some(explanation) = question.explanation() {
        let _ = writeln!(out, "Explanation: {}", markup(explanation));
    }
    out
}

pub fn prompt(session: &QuizSession) -> String {
    let len = session.current_question().option_count();
    let mut controls = vec![format!("1-{len} answer")];
    if session.current_index() > 0 {
        controls.push("p prev".into());
    }
    if session.can_advance() {
        controls.push("n next".into());
    }
    if session.current_answer().is_some() && session.current_question().explanation().is_some() {
        controls.push("s simplify".into());
    }
    controls.push("submit".into());
    format!("[{}] > ", controls.join(", "))
}

fn review_item(out: &mut String, item: &ReviewItem<'_>) {
    let verdict = if item.is_correct { "correct" } else { "incorrect" };
    let _ = writeln!(out, "\n{}. {} ({verdict})", item.index + 1, item.question.text());
    for (index, option) in item.question.options().iter().enumerate() {
        let mut tags = Vec::new();
        if index == item.question.correct_option_index() {
            tags.push("correct answer");
        }
        if item.answer == Some(index) {
            tags.push("your answer");
        }
        let tags = if tags.is_empty() {
            String::new()
        } else {
            format!("  <- {}", tags.join(", "))
        };
        let _ = writeln!(out, "   {}) {option}{tags}", index + 1);
    }
    if item.answer.is_none() {
        out.push_str("   (not answered)\n");
    }
    if let Some(explanation) = item.question.explanation() {
        let _ = writeln!(out, "   Explanation: {}", markup(explanation));
    }
}

pub fn result(result: &QuizResult, filter: ResultFilter) -> String {
    let mut out = String::new();
    let headline = if result.is_passing() {
        "Congratulations!"
    } else {
        "Keep practicing!"
    };
    let _ = writeln!(out, "{headline}");
    let _ = writeln!(
        out,
        "Score: {} / {}   Accuracy: {}%",
        result.score(),
        result.total(),
        result.rounded_accuracy()
    );
    let _ = writeln!(out, "Topic: {}", result.topic());
    let _ = writeln!(
        out,
        "Completed: {}",
        result.completed_at().format("%Y-%m-%d %H:%M UTC")
    );
    let _ = writeln!(
        out,
        "All ({})  Correct ({})  Incorrect ({})",
        result.total(),
        result.score(),
        result.incorrect_count()
    );

    let mut shown = 0;
    for item in result.review(filter) {
        review_item(&mut out, &item);
        shown += 1;
    }
    if shown == 0 {
        out.push_str("\nNo questions match this filter.\n");
    }
    out
}

pub fn history(history: &History) -> String {
    if history.is_empty() {
        return "No quizzes taken yet.\n".to_string();
    }
    let mut out = String::new();
    for (position, entry) in history.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>2}. {}  {:>3}%  {}/{}  {}",
            position + 1,
            entry.completed_at().format("%Y-%m-%d %H:%M"),
            entry.rounded_accuracy(),
            entry.score(),
            entry.total(),
            entry.topic()
        );
    }
    out
}
