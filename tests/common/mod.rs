#![allow(dead_code)]

use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use quiz_backend::config::Settings;
use quiz_backend::database::repository::{EventRepository, QuestionRepository};
use quiz_backend::database::MemoryStore;
use quiz_backend::middleware::auth::Claims;
use quiz_backend::models::event::{Event, NewEvent};
use quiz_backend::models::question::{
    NewQuestion, OptionLabel, Question, QuestionContent, QuestionOptions,
};
use quiz_backend::AppState;

pub const JWT_SECRET: &str = "test_secret_key";

pub fn settings() -> Settings {
    Settings {
        jwt_secret: JWT_SECRET.to_string(),
        leaderboard_default_limit: 100,
        outdated_exempt_categories: vec!["evergreen".to_string()],
    }
}

pub fn app_state() -> (Arc<MemoryStore>, AppState) {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(store.clone(), settings());
    (store, state)
}

pub async fn open_event(store: &MemoryStore, name: &str, questions_per_user: i32) -> Event {
    let now = Utc::now();
    store
        .create_event(
            NewEvent {
                name: name.to_string(),
                description: Some(format!("{} description", name)),
                starts_at: now - Duration::hours(1),
                ends_at: now + Duration::hours(1),
                questions_per_user,
                is_active: true,
            },
            now,
        )
        .await
        .expect("create event")
}

pub fn content(body: &str, correct: OptionLabel, category: &str) -> QuestionContent {
    QuestionContent {
        body: body.to_string(),
        options: QuestionOptions {
            a: "alpha".to_string(),
            b: "bravo".to_string(),
            c: "charlie".to_string(),
            d: "delta".to_string(),
        },
        correct_option: correct,
        category: category.to_string(),
    }
}

pub async fn add_question(
    store: &MemoryStore,
    event_id: i64,
    pool_group: i16,
    correct: OptionLabel,
) -> Question {
    add_question_in(store, event_id, pool_group, correct, "general").await
}

pub async fn add_question_in(
    store: &MemoryStore,
    event_id: i64,
    pool_group: i16,
    correct: OptionLabel,
    category: &str,
) -> Question {
    store
        .insert_root(
            NewQuestion {
                event_id,
                pool_group,
                content: content("What is it?", correct, category),
            },
            Utc::now(),
        )
        .await
        .expect("insert question")
}

/// Ten questions in one pool with answer key A,B,A,C,D,A,B,C,D,A.
pub async fn ten_question_pool(store: &MemoryStore, event_id: i64, pool_group: i16) -> Vec<Question> {
    use OptionLabel::*;
    let key = [A, B, A, C, D, A, B, C, D, A];
    let mut out = Vec::new();
    for correct in key {
        out.push(add_question(store, event_id, pool_group, correct).await);
    }
    out
}

pub fn token(user_id: &str, name: Option<&str>, role: Option<&str>) -> String {
    let claims = Claims {
        sub: user_id.to_string(),
        exp: (Utc::now() + Duration::hours(1)).timestamp() as usize,
        name: name.map(str::to_string),
        role: role.map(str::to_string),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("encode token")
}
