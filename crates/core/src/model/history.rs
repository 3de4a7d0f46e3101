use serde::de::{Deserializer, IgnoredAny};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::result::QuizResult;

/// Maximum number of results kept in history.
pub const HISTORY_CAP: usize = 20;

/// Newest-first log of past results, capped at [`HISTORY_CAP`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct History {
    entries: Vec<QuizResult>,
}

impl History {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from stored entries, keeping the first [`HISTORY_CAP`].
    #[must_use]
    pub fn from_entries(mut entries: Vec<QuizResult>) -> Self {
        entries.truncate(HISTORY_CAP);
        Self { entries }
    }

    /// Prepend `result` and evict from the tail beyond the cap.
    ///
    /// No deduplication: recording the same result twice adds two entries.
    pub fn record(&mut self, result: QuizResult) {
        self.entries.insert(0, result);
        self.entries.truncate(HISTORY_CAP);
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&QuizResult> {
        self.entries.get(index)
    }

    #[must_use]
    pub fn find(&self, id: Uuid) -> Option<&QuizResult> {
        self.entries.iter().find(|entry| entry.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &QuizResult> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn into_entries(self) -> Vec<QuizResult> {
        self.entries
    }
}

/// Functional form of [`History::record`].
#[must_use]
pub fn record_to_history(result: QuizResult, mut history: History) -> History {
    history.record(result);
    history
}

// Entries that fail to parse are skipped so one bad record does not hide
// the rest of the history.
impl<'de> Deserialize<'de> for History {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum MaybeEntry {
            Valid(QuizResult),
            Invalid(IgnoredAny),
        }

        let raw = Vec::<MaybeEntry>::deserialize(deserializer)?;
        let entries = raw
            .into_iter()
            .filter_map(|entry| match entry {
                MaybeEntry::Valid(result) => Some(result),
                MaybeEntry::Invalid(_) => None,
            })
            .collect();
        Ok(Self::from_entries(entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::question::Question;
    use crate::time::fixed_now;

    fn result(topic: &str) -> QuizResult {
        let q = Question::new(
            "Q",
            vec!["a".into(), "b".into(), "c".into(), "d".into()],
            0,
            None,
        )
        .unwrap();
        QuizResult::new(vec![q], vec![Some(0)], fixed_now(), topic, None)
    }

    #[test]
    fn keeps_most_recent_twenty_newest_first() {
        let mut history = History::new();
        for n in 0..25 {
            history.record(result(&format!("quiz {n}")));
            assert!(history.len() <= HISTORY_CAP);
        }
        assert_eq!(history.len(), HISTORY_CAP);
        let topics: Vec<&str> = history.iter().map(QuizResult::topic).collect();
        let expected: Vec<String> = (5..25).rev().map(|n| format!("quiz {n}")).collect();
        assert_eq!(topics, expected);
    }

    #[test]
    fn recording_same_result_twice_adds_two_entries() {
        let r = result("same");
        let history = record_to_history(r.clone(), History::new());
        let history = record_to_history(r, history);
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn skips_unreadable_entries() {
        let good = serde_json::to_value(result("good")).unwrap();
        let raw = serde_json::json!([{ "nonsense": true }, good]);
        let history: History = serde_json::from_value(raw).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history.get(0).unwrap().topic(), "good");
    }
}
