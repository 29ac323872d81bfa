mod common;

use chrono::{Duration, Utc};
use quiz_backend::error::Error;
use quiz_backend::models::question::{NewQuestion, OptionLabel};

#[tokio::test]
async fn supersede_appends_a_version_and_retires_the_old_one() {
    let (store, state) = common::app_state();
    let event = common::open_event(&store, "E1", 5).await;
    let svc = &state.question_service;

    let root = svc
        .create(NewQuestion {
            event_id: event.id,
            pool_group: 2,
            content: common::content("Capital of France?", OptionLabel::A, "geo"),
        })
        .await
        .unwrap();
    assert_eq!(root.version, 1);
    assert_eq!(root.base_lineage_id, root.id);
    assert!(root.is_root());
    assert!(root.is_active);

    let v2 = svc
        .supersede(
            root.id,
            common::content("What is the capital of France?", OptionLabel::A, "geo"),
            None,
            Some("wording".to_string()),
        )
        .await
        .unwrap();
    assert_eq!(v2.version, 2);
    assert_eq!(v2.base_lineage_id, root.id);
    assert_eq!(v2.pool_group, 2);
    assert_eq!(v2.change_reason.as_deref(), Some("wording"));
    assert!(v2.is_active);

    let old = svc.get(root.id).await.unwrap();
    assert!(!old.is_active);
    assert_eq!(old.superseded_by, Some(v2.id));
    assert!(old.deprecated_at.is_some());
    assert_eq!(old.body, "Capital of France?");

    let v3 = svc
        .supersede(
            v2.id,
            common::content("Which city is the capital of France?", OptionLabel::B, "geo"),
            Some(4),
            None,
        )
        .await
        .unwrap();
    assert_eq!(v3.version, 3);
    assert_eq!(v3.pool_group, 4);

    let history = svc.history(v2.id).await.unwrap();
    let versions: Vec<i32> = history.iter().map(|q| q.version).collect();
    assert_eq!(versions, vec![3, 2, 1]);
    assert_eq!(history.iter().filter(|q| q.is_active).count(), 1);
    assert!(history.iter().all(|q| q.base_lineage_id == root.id));

    assert_eq!(svc.head(root.id).await.unwrap().id, v3.id);
    assert_eq!(svc.head(v3.id).await.unwrap().id, v3.id);
}

#[tokio::test]
async fn superseding_a_stale_version_is_rejected() {
    let (store, state) = common::app_state();
    let event = common::open_event(&store, "E1", 5).await;
    let root = common::add_question(&store, event.id, 0, OptionLabel::A).await;
    let svc = &state.question_service;

    svc.supersede(root.id, common::content("v2", OptionLabel::A, "general"), None, None)
        .await
        .unwrap();
    let err = svc
        .supersede(root.id, common::content("fork", OptionLabel::C, "general"), None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
    assert_eq!(svc.history(root.id).await.unwrap().len(), 2);

    let err = svc
        .supersede(999, common::content("nope", OptionLabel::A, "general"), None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn unknown_lineage_has_empty_history() {
    let (_store, state) = common::app_state();
    assert!(state.question_service.history(77).await.unwrap().is_empty());
    assert!(matches!(
        state.question_service.head(77).await.unwrap_err(),
        Error::NotFound(_)
    ));
}

#[tokio::test]
async fn creating_for_missing_event_is_not_found() {
    let (_store, state) = common::app_state();
    let err = state
        .question_service
        .create(NewQuestion {
            event_id: 5,
            pool_group: 0,
            content: common::content("q", OptionLabel::A, "general"),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn outdated_lists_old_active_non_exempt_questions_oldest_first() {
    let (store, state) = common::app_state();
    let event = common::open_event(&store, "E1", 5).await;
    let now = Utc::now();

    let old = common::add_question(&store, event.id, 0, OptionLabel::A).await;
    let older = common::add_question(&store, event.id, 1, OptionLabel::B).await;
    let fresh = common::add_question(&store, event.id, 2, OptionLabel::C).await;
    let evergreen = common::add_question_in(&store, event.id, 0, OptionLabel::A, "evergreen").await;
    let retired = common::add_question(&store, event.id, 3, OptionLabel::D).await;

    store.backdate_question(old.id, now - Duration::days(200)).unwrap();
    store.backdate_question(older.id, now - Duration::days(400)).unwrap();
    store.backdate_question(evergreen.id, now - Duration::days(900)).unwrap();
    store.backdate_question(retired.id, now - Duration::days(500)).unwrap();
    state
        .question_service
        .supersede(retired.id, common::content("new", OptionLabel::D, "general"), None, None)
        .await
        .unwrap();

    let flagged = state.question_service.outdated(None).await.unwrap();
    let ids: Vec<i64> = flagged.iter().map(|q| q.id).collect();
    assert_eq!(ids, vec![older.id, old.id]);
    assert!(!ids.contains(&fresh.id));

    let flagged = state
        .question_service
        .outdated(Some(Duration::days(300)))
        .await
        .unwrap();
    let ids: Vec<i64> = flagged.iter().map(|q| q.id).collect();
    assert_eq!(ids, vec![older.id]);
}

#[tokio::test]
async fn selection_only_offers_current_versions() {
    let (store, state) = common::app_state();
    let event = common::open_event(&store, "E1", 10).await;
    let a = common::add_question(&store, event.id, 5, OptionLabel::A).await;
    let b = common::add_question(&store, event.id, 5, OptionLabel::B).await;

    let b2 = state
        .question_service
        .supersede(b.id, common::content("b2", OptionLabel::B, "general"), None, None)
        .await
        .unwrap();

    let offered = state.selection_service.select(event.id, 5, 10).await.unwrap();
    let mut ids: Vec<i64> = offered.iter().map(|q| q.id).collect();
    ids.sort();
    assert_eq!(ids, vec![a.id, b2.id]);
}
