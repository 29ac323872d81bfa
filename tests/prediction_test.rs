mod common;

use quiz_backend::error::Error;
use quiz_backend::models::prediction::Verdict;
use quiz_backend::models::question::OptionLabel;

fn verdict(text: &str, is_correct: bool, user_id: Option<&str>) -> Verdict {
    Verdict {
        predicted_answer: text.to_string(),
        is_correct,
        user_id: user_id.map(str::to_string),
    }
}

#[tokio::test]
async fn verdicts_fan_out_to_every_matching_prediction() {
    let (store, state) = common::app_state();
    let event = common::open_event(&store, "E1", 5).await;
    let q = common::add_question(&store, event.id, 0, OptionLabel::A).await;
    let svc = &state.prediction_service;

    svc.submit_prediction("u1", q.id, "800").await.unwrap();
    svc.submit_prediction("u2", q.id, "  800円 ").await.unwrap();
    svc.submit_prediction("u3", q.id, "800").await.unwrap();
    svc.submit_prediction("u4", q.id, "1200").await.unwrap();

    assert_eq!(svc.pending_texts(q.id).await.unwrap(), vec!["1200", "800", "800円"]);

    let n = svc
        .reconcile(
            q.id,
            "800円",
            &[verdict("800", true, None), verdict("800円", true, None), verdict("1200", false, None)],
        )
        .await
        .unwrap();
    assert_eq!(n, 4);

    let rows = svc.list(q.id).await.unwrap();
    assert!(rows.iter().all(|p| p.is_verified()));
    assert!(rows.iter().all(|p| p.actual_answer.as_deref() == Some("800円")));
    let wrong = rows.iter().find(|p| p.user_id == "u4").unwrap();
    assert_eq!(wrong.is_correct, Some(false));
    assert!(svc.pending_texts(q.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn verdict_leaves_other_texts_unverified() {
    let (store, state) = common::app_state();
    let event = common::open_event(&store, "E1", 5).await;
    let q = common::add_question(&store, event.id, 0, OptionLabel::A).await;
    let svc = &state.prediction_service;

    svc.submit_prediction("u1", q.id, "800").await.unwrap();
    svc.submit_prediction("u2", q.id, "800円").await.unwrap();
    svc.submit_prediction("u3", q.id, "900").await.unwrap();
    svc.submit_prediction("u4", q.id, "800").await.unwrap();

    let n = svc
        .reconcile(q.id, "800円", &[verdict("800", true, None)])
        .await
        .unwrap();
    assert_eq!(n, 2);

    for p in svc.list(q.id).await.unwrap() {
        if p.predicted_answer == "800" {
            assert_eq!(p.actual_answer.as_deref(), Some("800円"));
            assert_eq!(p.is_correct, Some(true));
            assert!(p.verified_at.is_some());
        } else {
            assert_eq!(p.actual_answer, None);
            assert_eq!(p.is_correct, None);
            assert_eq!(p.verified_at, None);
        }
    }
    assert_eq!(svc.pending_texts(q.id).await.unwrap(), vec!["800円", "900"]);
}

#[tokio::test]
async fn verified_predictions_are_not_revisited() {
    let (store, state) = common::app_state();
    let event = common::open_event(&store, "E1", 5).await;
    let q = common::add_question(&store, event.id, 0, OptionLabel::A).await;
    let svc = &state.prediction_service;

    svc.submit_prediction("u1", q.id, "yes").await.unwrap();
    svc.submit_prediction("u2", q.id, "yes").await.unwrap();

    let n = svc
        .reconcile(q.id, "yes", &[verdict("yes", true, Some("u1"))])
        .await
        .unwrap();
    assert_eq!(n, 1);
    assert_eq!(svc.pending_texts(q.id).await.unwrap(), vec!["yes"]);

    let n = svc
        .reconcile(q.id, "no", &[verdict("yes", false, None)])
        .await
        .unwrap();
    assert_eq!(n, 1);

    let rows = svc.list(q.id).await.unwrap();
    let u1 = rows.iter().find(|p| p.user_id == "u1").unwrap();
    assert_eq!(u1.is_correct, Some(true));
    assert_eq!(u1.actual_answer.as_deref(), Some("yes"));
    let u2 = rows.iter().find(|p| p.user_id == "u2").unwrap();
    assert_eq!(u2.is_correct, Some(false));
}

#[tokio::test]
async fn predictions_need_a_real_question_and_text() {
    let (_store, state) = common::app_state();
    let svc = &state.prediction_service;
    assert!(matches!(
        svc.submit_prediction("u1", 404, "x").await.unwrap_err(),
        Error::NotFound(_)
    ));
    assert!(matches!(
        svc.reconcile(404, "x", &[]).await.unwrap_err(),
        Error::NotFound(_)
    ));
    assert!(matches!(
        svc.submit_prediction("u1", 1, "   ").await.unwrap_err(),
        Error::Validation(_)
    ));
}
