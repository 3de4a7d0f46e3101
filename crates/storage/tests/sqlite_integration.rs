use quiz_core::model::{
    HISTORY_CAP, Question, QuizConfigDraft, QuizDraft, QuizResult, TimerMode,
};
use quiz_core::time::fixed_now;
use storage::repository::{Slot, SlotStore, Storage};
use storage::sqlite::SqliteRepository;

fn question(correct: usize) -> Question {
    Question::new(
        format!("Question {correct}"),
        vec!["A".into(), "B".into(), "C".into(), "D".into(), "E".into()],
        correct,
        Some("The answer is **bold**.".into()),
    )
    .unwrap()
}

fn result(topic: &str) -> QuizResult {
    let config = QuizConfigDraft {
        options_per_question: Some(5),
        timer_mode: Some(TimerMode::WholeQuiz),
        timer_seconds: Some(600),
        keywords: Some("iron, paris".into()),
        ..QuizConfigDraft::with_defaults()
    }
    .validate()
    .unwrap();
    QuizResult::new(
        vec![question(1), question(0), question(2)],
        vec![Some(1), Some(0), Some(0)],
        fixed_now(),
        topic,
        Some(config),
    )
}

#[tokio::test]
async fn sqlite_history_round_trip_keeps_score_and_config() {
    let storage = Storage::sqlite("sqlite:file:memdb_history?mode=memory&cache=shared")
        .await
        .expect("connect");
    let store = storage.quiz_store();

    let original = result("Eiffel Tower...");
    store.record_result(original.clone()).await.unwrap();

    let history = store.history().await.unwrap();
    assert_eq!(history.len(), 1);
    let loaded = history.get(0).unwrap();
    assert_eq!(loaded.id(), original.id());
    assert_eq!(loaded.score(), original.score());
    assert!((loaded.accuracy() - original.accuracy()).abs() < 1e-9);
    assert_eq!(loaded.config(), original.config());
    assert_eq!(loaded.answers(), original.answers());
}

#[tokio::test]
async fn sqlite_history_is_capped_newest_first() {
    let storage = Storage::sqlite("sqlite:file:memdb_cap?mode=memory&cache=shared")
        .await
        .expect("connect");
    let store = storage.quiz_store();

    for n in 0..25 {
        store.record_result(result(&format!("quiz {n}"))).await.unwrap();
    }

    let history = store.history().await.unwrap();
    assert_eq!(history.len(), HISTORY_CAP);
    assert_eq!(history.get(0).unwrap().topic(), "quiz 24");
    assert_eq!(history.get(HISTORY_CAP - 1).unwrap().topic(), "quiz 5");
}

#[tokio::test]
async fn sqlite_slots_overwrite_and_remove() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_slots?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");
    repo.migrate().await.expect("migrations are idempotent");

    repo.write(Slot::DocumentText, "first".into()).await.unwrap();
    repo.write(Slot::DocumentText, "second".into()).await.unwrap();
    assert_eq!(
        repo.read(Slot::DocumentText).await.unwrap().as_deref(),
        Some("second")
    );

    repo.remove(Slot::DocumentText).await.unwrap();
    assert_eq!(repo.read(Slot::DocumentText).await.unwrap(), None);
}

#[tokio::test]
async fn sqlite_corrupt_draft_reads_as_absent() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_corrupt?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");
    repo.write(Slot::ActiveDraft, "{\"quiz\": 7}".into())
        .await
        .unwrap();

    let store = storage::QuizStore::new(std::sync::Arc::new(repo));
    assert!(store.draft().await.unwrap().is_none());

    let draft = QuizDraft {
        document_text: "text".into(),
        questions: vec![question(0)],
        config: None,
    };
    store.save_draft(&draft).await.unwrap();
    assert_eq!(store.draft().await.unwrap(), Some(draft));
}
