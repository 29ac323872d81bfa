mod common;

use chrono::{Duration, Utc};
use quiz_backend::database::repository::UserRepository;
use quiz_backend::error::Error;
use quiz_backend::models::event::NewEvent;

fn new_event(name: &str, start_offset_h: i64, end_offset_h: i64, qpu: i32) -> NewEvent {
    let now = Utc::now();
    NewEvent {
        name: name.to_string(),
        description: None,
        starts_at: now + Duration::hours(start_offset_h),
        ends_at: now + Duration::hours(end_offset_h),
        questions_per_user: qpu,
        is_active: true,
    }
}

#[tokio::test]
async fn create_event_rejects_bad_windows_and_sizes() {
    let (_store, state) = common::app_state();
    let svc = &state.event_service;

    let err = svc.create_event(new_event("Backwards", 2, 1, 5)).await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    let err = svc.create_event(new_event("Empty", -1, 1, 0)).await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    let created = svc.create_event(new_event("Good", -1, 1, 5)).await.unwrap();
    assert_eq!(created.name, "Good");
    assert_eq!(svc.current_event().await.unwrap().id, created.id);
}

#[tokio::test]
async fn current_event_ignores_closed_and_inactive_events() {
    let (_store, state) = common::app_state();
    let svc = &state.event_service;
    assert!(matches!(svc.current_event().await.unwrap_err(), Error::NotFound(_)));

    svc.create_event(new_event("Past", -5, -1, 5)).await.unwrap();
    svc.create_event(new_event("Future", 1, 5, 5)).await.unwrap();
    let mut paused = new_event("Paused", -1, 1, 5);
    paused.is_active = false;
    svc.create_event(paused).await.unwrap();
    assert!(matches!(svc.current_event().await.unwrap_err(), Error::NotFound(_)));

    let live = svc.create_event(new_event("Live", -1, 1, 5)).await.unwrap();
    assert_eq!(svc.current_event().await.unwrap().id, live.id);
}

#[tokio::test]
async fn check_in_registers_user_and_assigns_pool() {
    let (store, state) = common::app_state();
    let event = common::open_event(&store, "E1", 5).await;

    let first = state.event_service.check_in("user-8", "Eight").await.unwrap();
    assert_eq!(first.event.id, event.id);
    assert_eq!(first.pool_group, 8);

    let again = state.event_service.check_in("user-8", "Renamed").await.unwrap();
    assert_eq!(again.pool_group, 8);
    let stored = store.get_user("user-8").await.unwrap().unwrap();
    assert_eq!(stored.name, "Renamed");
    assert_eq!(stored.created_at, first.user.created_at);
}
