mod common;

use quiz_backend::database::repository::{AnswerRepository, AttemptRepository};
use quiz_backend::error::Error;
use quiz_backend::models::question::OptionLabel;
use quiz_backend::services::pool_service::assign_pool;
use quiz_backend::services::scoring_service::SubmittedAnswer;

fn answer(question_id: i64, chosen: OptionLabel) -> SubmittedAnswer {
    SubmittedAnswer {
        question_id,
        chosen_option: chosen,
        time_spent_seconds: 4,
    }
}

#[tokio::test]
async fn perfect_run_scores_ten_and_locks_the_attempt() {
    let (store, state) = common::app_state();
    let event = common::open_event(&store, "E1", 10).await;
    let user = "00013";
    let pool = assign_pool(user);
    assert_eq!(pool, 3);
    let bank = common::ten_question_pool(&store, event.id, pool).await;

    let selected = state
        .selection_service
        .select_for_user(user, event.id, None)
        .await
        .unwrap();
    assert_eq!(selected.len(), 10);

    let answers: Vec<SubmittedAnswer> = selected
        .iter()
        .map(|p| {
            let q = bank.iter().find(|q| q.id == p.id).unwrap();
            answer(q.id, q.correct_option)
        })
        .collect();

    let result = state
        .scoring_service
        .submit(user, event.id, answers.clone())
        .await
        .unwrap();
    assert_eq!(result.score, 10);
    assert_eq!(result.total, 10);
    assert!(result.results.iter().all(|r| r.is_correct));

    let attempt = store.get_attempt(user, event.id).await.unwrap().unwrap();
    assert!(attempt.is_completed);
    assert_eq!(attempt.score, 10);
    assert_eq!(store.list_answers(user, event.id).await.unwrap().len(), 10);

    let err = state
        .scoring_service
        .submit(user, event.id, answers)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
    assert_eq!(store.answer_count(), 10);

    let err = state
        .selection_service
        .select_for_user(user, event.id, None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
}

#[tokio::test]
async fn wrong_answers_are_recorded_but_not_scored() {
    let (store, state) = common::app_state();
    let event = common::open_event(&store, "E1", 3).await;
    let q1 = common::add_question(&store, event.id, 1, OptionLabel::A).await;
    let q2 = common::add_question(&store, event.id, 1, OptionLabel::B).await;

    let result = state
        .scoring_service
        .submit(
            "user-1",
            event.id,
            vec![answer(q1.id, OptionLabel::A), answer(q2.id, OptionLabel::C)],
        )
        .await
        .unwrap();

    assert_eq!(result.score, 1);
    assert_eq!(result.total, 2);
    let wrong = result.results.iter().find(|r| r.question_id == q2.id).unwrap();
    assert_eq!(wrong.chosen_option, OptionLabel::C);
    assert_eq!(wrong.correct_option, OptionLabel::B);
    assert!(!wrong.is_correct);

    let rows = store.list_answers("user-1", event.id).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().any(|a| a.question_id == q2.id && !a.is_correct && a.chosen_option == "C"));
}

#[tokio::test]
async fn unknown_questions_are_skipped_not_fatal() {
    let (store, state) = common::app_state();
    let event = common::open_event(&store, "E1", 3).await;
    let other = common::open_event(&store, "E2", 3).await;
    let q = common::add_question(&store, event.id, 0, OptionLabel::D).await;
    let foreign = common::add_question(&store, other.id, 0, OptionLabel::D).await;

    let result = state
        .scoring_service
        .submit(
            "abc",
            event.id,
            vec![
                answer(q.id, OptionLabel::D),
                answer(9_999, OptionLabel::A),
                answer(foreign.id, OptionLabel::D),
            ],
        )
        .await
        .unwrap();

    assert_eq!(result.score, 1);
    assert_eq!(result.total, 1);
    assert_eq!(result.results.len(), 1);
    assert_eq!(store.list_answers("abc", event.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn duplicate_question_ids_are_rejected_before_writing() {
    let (store, state) = common::app_state();
    let event = common::open_event(&store, "E1", 3).await;
    let q = common::add_question(&store, event.id, 0, OptionLabel::A).await;

    let err = state
        .scoring_service
        .submit(
            "u0",
            event.id,
            vec![answer(q.id, OptionLabel::A), answer(q.id, OptionLabel::B)],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(store.answer_count(), 0);
    assert_eq!(store.attempt_count(), 0);
}

#[tokio::test]
async fn unknown_event_is_not_found() {
    let (_store, state) = common::app_state();
    let err = state
        .scoring_service
        .submit("u1", 42, vec![answer(1, OptionLabel::A)])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn record_completion_never_overwrites() {
    let (store, state) = common::app_state();
    let event = common::open_event(&store, "E1", 3).await;
    let guard = &state.participation_service;

    assert!(!guard.has_completed("u5", event.id).await.unwrap());
    let first = guard.record_completion("u5", event.id, 7).await.unwrap();
    assert!(guard.has_completed("u5", event.id).await.unwrap());

    let err = guard.record_completion("u5", event.id, 2).await.unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));

    let stored = store.get_attempt("u5", event.id).await.unwrap().unwrap();
    assert_eq!(stored, first);
    assert_eq!(stored.score, 7);
}
