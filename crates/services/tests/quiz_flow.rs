use std::path::Path;

use quiz_core::model::{Category, Difficulty, ExamError, ExamSpec};
use quiz_core::time::fixed_clock;
use serde_json::json;
use services::{
    AppServices, ExamComposer, LoopStep, ProgressBackend, QuizSession, SessionError,
    SourceLoadError,
};

fn question_source() -> serde_json::Value {
    let mut questions = Vec::new();
    for category in Category::ALL {
        for difficulty in Difficulty::ALL {
            for n in 0..2 {
                questions.push(json!({
                    "topic": category.name(),
                    "difficulty": difficulty.as_str(),
                    "question": format!("{} {} #{n}", category.name(), difficulty.as_str()),
                    "options": ["A", "B", "C", "D"],
                    "correct_answer": "B",
                    "explanation": "B is right."
                }));
            }
        }
    }
    json!({ "questions": questions })
}

fn write_questions(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("questions.json");
    std::fs::write(&path, question_source().to_string()).unwrap();
    path
}

async fn open(questions: &Path, backend: &ProgressBackend) -> AppServices {
    AppServices::open(questions, backend, ExamComposer::default(), fixed_clock())
        .await
        .unwrap()
}

async fn play_all(services: &mut AppServices, session: &mut QuizSession, right: bool) -> LoopStep {
    let quiz_loop = services.quiz_loop();
    loop {
        let question = session.current_question().unwrap();
        let choice = if right {
            question.correct_answer().to_string()
        } else {
            question
                .options()
                .iter()
                .find(|o| !question.is_correct(o))
                .unwrap()
                .clone()
        };
        quiz_loop.submit(session, &choice).unwrap();
        let step = quiz_loop
            .advance(session, services.progress_mut())
            .await
            .unwrap();
        if matches!(step, LoopStep::Completed { .. }) {
            return step;
        }
    }
}

#[tokio::test]
async fn quick_quiz_records_an_attempt() {
    let dir = tempfile::tempdir().unwrap();
    let questions = write_questions(dir.path());
    let mut services = open(&questions, &ProgressBackend::InMemory).await;

    assert_eq!(services.load_report().indexed, 60);
    assert!(services.load_report().warning.is_none());

    let mut session = services.quiz_loop().start_exam(ExamSpec::Quick).unwrap();
    assert_eq!(session.total(), 5);
    assert_eq!(session.label(), "Quick Quiz");

    let LoopStep::Completed { result, recorded } = play_all(&mut services, &mut session, true).await
    else {
        unreachable!()
    };
    assert_eq!(result.correct, 5);
    assert!((result.score - 1.0).abs() < 1e-9);
    assert_eq!(recorded.entry.attempt(), 1);
    assert!(recorded.persisted.is_ok());
    assert_eq!(services.progress().stats().attempts, 1);
}

#[tokio::test]
async fn wrong_answers_score_zero() {
    let dir = tempfile::tempdir().unwrap();
    let questions = write_questions(dir.path());
    let mut services = open(&questions, &ProgressBackend::InMemory).await;

    let mut session = services
        .quiz_loop()
        .start_exam(ExamSpec::ByDifficulty {
            difficulty: Difficulty::Hard,
        })
        .unwrap();
    assert_eq!(session.total(), 20);

    let LoopStep::Completed { result, .. } = play_all(&mut services, &mut session, false).await
    else {
        unreachable!()
    };
    assert_eq!(result.correct, 0);
    assert_eq!(result.score, 0.0);
}

#[tokio::test]
async fn json_ledger_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let questions = write_questions(dir.path());
    let backend = ProgressBackend::JsonFile(dir.path().join("Data").join("progress_data.json"));

    {
        let mut services = open(&questions, &backend).await;
        assert!(services.progress().ledger().is_empty());
        let mut session = services
            .quiz_loop()
            .start_exam(ExamSpec::Balanced { exam_number: 1 })
            .unwrap();
        assert_eq!(session.total(), 30);
        play_all(&mut services, &mut session, true).await;
        let click = services.progress_mut().record_registration_click().await;
        assert!(click.persisted.is_ok());
    }

    let services = open(&questions, &backend).await;
    let ledger = services.progress().ledger();
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger.entries()[0].attempt(), 1);
    assert!((ledger.entries()[0].score() - 1.0).abs() < 1e-9);
    assert_eq!(ledger.registration_clicks(), 1);
}

#[tokio::test]
async fn missing_source_degrades_to_empty_bank() {
    let dir = tempfile::tempdir().unwrap();
    let services = open(&dir.path().join("absent.json"), &ProgressBackend::InMemory).await;

    assert!(matches!(
        services.load_report().warning,
        Some(SourceLoadError::Missing { .. })
    ));
    assert!(services.bank().index().is_empty());

    let err = services
        .quiz_loop()
        .start_exam(ExamSpec::RandomMix)
        .unwrap_err();
    assert_eq!(
        err,
        SessionError::Exam(ExamError::NoQuestions {
            label: "Random Mix".into()
        })
    );
}

#[tokio::test]
async fn double_submit_through_loop_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let questions = write_questions(dir.path());
    let services = open(&questions, &ProgressBackend::InMemory).await;
    let quiz_loop = services.quiz_loop();

    let mut session = quiz_loop
        .start_exam(ExamSpec::ByCategory {
            category: Category::Derivatives,
        })
        .unwrap();
    assert_eq!(session.total(), 6);

    quiz_loop.submit(&mut session, "B").unwrap();
    let err = quiz_loop.submit(&mut session, "B").unwrap_err();
    assert!(matches!(err, SessionError::InvalidState { .. }));
    assert_eq!(session.score(), 1);
    assert_eq!(session.timings().len(), 1);
}
