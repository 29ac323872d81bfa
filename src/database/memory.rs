//! In-process store used by the test suite and for running without a database.
//!
//! A single mutex guards all tables, so every trait method is atomic with
//! respect to every other. That is what gives `commit_attempt` and
//! `supersede` the same all-or-nothing behaviour as their SQL transactions.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::database::repository::{
    AnswerRepository, AttemptRepository, EventRepository, PredictionRepository,
    QuestionRepository, UserRepository,
};
use crate::error::{Error, Result};
use crate::models::answer::{Answer, NewAnswer};
use crate::models::attempt::{AttemptStatus, LeaderboardEntry};
use crate::models::event::{Event, NewEvent};
use crate::models::prediction::{PredictionAnswer, Verdict};
use crate::models::question::{NewQuestion, Question, QuestionContent};
use crate::models::user::User;

#[derive(Default)]
struct Tables {
    users: HashMap<String, User>,
    events: BTreeMap<i64, Event>,
    questions: BTreeMap<i64, Question>,
    answers: Vec<Answer>,
    attempts: HashMap<(String, i64), AttemptStatus>,
    predictions: BTreeMap<i64, PredictionAnswer>,
    next_event_id: i64,
    next_question_id: i64,
    next_answer_id: i64,
    next_prediction_id: i64,
}

impl Tables {
    fn next_id(counter: &mut i64) -> i64 {
        *counter += 1;
        *counter
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| Error::Internal("memory store mutex poisoned".to_string()))
    }

    /// Inserts a completed attempt with an explicit timestamp, bypassing the
    /// scoring flow. Used to seed standings.
    pub fn seed_attempt(&self, attempt: AttemptStatus) -> Result<()> {
        let mut t = self.lock()?;
        t.attempts
            .insert((attempt.user_id.clone(), attempt.event_id), attempt);
        Ok(())
    }

    /// Shifts a question's `valid_from` into the past. Used to age content.
    pub fn backdate_question(&self, id: i64, valid_from: DateTime<Utc>) -> Result<()> {
        let mut t = self.lock()?;
        let q = t
            .questions
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound(format!("Question {} not found", id)))?;
        q.valid_from = valid_from;
        Ok(())
    }

    pub fn answer_count(&self) -> usize {
        self.lock().map(|t| t.answers.len()).unwrap_or_default()
    }

    pub fn attempt_count(&self) -> usize {
        self.lock().map(|t| t.attempts.len()).unwrap_or_default()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn upsert_user(&self, id: &str, name: &str, now: DateTime<Utc>) -> Result<User> {
        let mut t = self.lock()?;
        let user = t.users.entry(id.to_string()).or_insert_with(|| User {
            id: id.to_string(),
            name: name.to_string(),
            created_at: now,
        });
        user.name = name.to_string();
        Ok(user.clone())
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>> {
        Ok(self.lock()?.users.get(id).cloned())
    }
}

#[async_trait]
impl EventRepository for MemoryStore {
    async fn create_event(&self, event: NewEvent, now: DateTime<Utc>) -> Result<Event> {
        let mut t = self.lock()?;
        let id = Tables::next_id(&mut t.next_event_id);
        let row = Event {
            id,
            name: event.name,
            description: event.description,
            starts_at: event.starts_at,
            ends_at: event.ends_at,
            questions_per_user: event.questions_per_user,
            is_active: event.is_active,
            created_at: now,
        };
        t.events.insert(id, row.clone());
        Ok(row)
    }

    async fn get_event(&self, id: i64) -> Result<Option<Event>> {
        Ok(self.lock()?.events.get(&id).cloned())
    }

    async fn current_event(&self, now: DateTime<Utc>) -> Result<Option<Event>> {
        let t = self.lock()?;
        Ok(t.events
            .values()
            .filter(|e| e.is_open_at(now))
            .max_by_key(|e| (e.created_at, e.id))
            .cloned())
    }
}

#[async_trait]
impl QuestionRepository for MemoryStore {
    async fn insert_root(&self, question: NewQuestion, now: DateTime<Utc>) -> Result<Question> {
        let mut t = self.lock()?;
        let id = Tables::next_id(&mut t.next_question_id);
        let content = question.content;
        let row = Question {
            id,
            event_id: question.event_id,
            body: content.body,
            options: content.options,
            correct_option: content.correct_option,
            pool_group: question.pool_group,
            category: content.category,
            version: 1,
            base_lineage_id: id,
            is_active: true,
            valid_from: now,
            valid_until: None,
            deprecated_at: None,
            superseded_by: None,
            change_reason: None,
            created_at: now,
        };
        t.questions.insert(id, row.clone());
        Ok(row)
    }

    async fn get_question(&self, id: i64) -> Result<Option<Question>> {
        Ok(self.lock()?.questions.get(&id).cloned())
    }

    async fn supersede(
        &self,
        id: i64,
        content: QuestionContent,
        pool_group: Option<i16>,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Question> {
        let mut t = self.lock()?;
        let target = t
            .questions
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Question {} not found", id)))?;
        if !target.is_active || target.superseded_by.is_some() {
            return Err(Error::Conflict(format!(
                "Question {} has already been superseded",
                id
            )));
        }

        let new_id = Tables::next_id(&mut t.next_question_id);
        let successor = Question {
            id: new_id,
            event_id: target.event_id,
            body: content.body,
            options: content.options,
            correct_option: content.correct_option,
            pool_group: pool_group.unwrap_or(target.pool_group),
            category: content.category,
            version: target.version + 1,
            base_lineage_id: target.base_lineage_id,
            is_active: true,
            valid_from: now,
            valid_until: None,
            deprecated_at: None,
            superseded_by: None,
            change_reason: reason,
            created_at: now,
        };

        if let Some(old) = t.questions.get_mut(&id) {
            old.is_active = false;
            old.deprecated_at = Some(now);
            old.valid_until = Some(now);
            old.superseded_by = Some(new_id);
        }
        t.questions.insert(new_id, successor.clone());
        Ok(successor)
    }

    async fn list_lineage(&self, root_id: i64) -> Result<Vec<Question>> {
        let t = self.lock()?;
        let mut rows: Vec<Question> = t
            .questions
            .values()
            .filter(|q| q.base_lineage_id == root_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.version.cmp(&a.version));
        Ok(rows)
    }

    async fn list_active_in_pool(&self, event_id: i64, pool_group: i16) -> Result<Vec<Question>> {
        let t = self.lock()?;
        Ok(t.questions
            .values()
            .filter(|q| q.event_id == event_id && q.pool_group == pool_group && q.is_active)
            .cloned()
            .collect())
    }

    async fn list_active_older_than(
        &self,
        cutoff: DateTime<Utc>,
        exempt_categories: &[String],
    ) -> Result<Vec<Question>> {
        let t = self.lock()?;
        let mut rows: Vec<Question> = t
            .questions
            .values()
            .filter(|q| {
                q.is_active && q.valid_from < cutoff && !exempt_categories.contains(&q.category)
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.valid_from.cmp(&b.valid_from).then(a.id.cmp(&b.id)));
        Ok(rows)
    }
}

#[async_trait]
impl AnswerRepository for MemoryStore {
    async fn list_answers(&self, user_id: &str, event_id: i64) -> Result<Vec<Answer>> {
        let t = self.lock()?;
        Ok(t.answers
            .iter()
            .filter(|a| a.user_id == user_id && a.event_id == event_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AttemptRepository for MemoryStore {
    async fn get_attempt(&self, user_id: &str, event_id: i64) -> Result<Option<AttemptStatus>> {
        let t = self.lock()?;
        Ok(t.attempts.get(&(user_id.to_string(), event_id)).cloned())
    }

    async fn commit_attempt(
        &self,
        attempt: AttemptStatus,
        answers: Vec<NewAnswer>,
    ) -> Result<Option<AttemptStatus>> {
        let mut t = self.lock()?;
        let key = (attempt.user_id.clone(), attempt.event_id);
        if t.attempts.contains_key(&key) {
            return Ok(None);
        }
        for answer in answers {
            let id = Tables::next_id(&mut t.next_answer_id);
            t.answers.push(Answer {
                id,
                user_id: attempt.user_id.clone(),
                event_id: attempt.event_id,
                question_id: answer.question_id,
                chosen_option: answer.chosen_option,
                is_correct: answer.is_correct,
                time_spent_seconds: answer.time_spent_seconds,
                answered_at: attempt.completed_at,
            });
        }
        t.attempts.insert(key, attempt.clone());
        Ok(Some(attempt))
    }

    async fn leaderboard(&self, event_id: i64, limit: i64) -> Result<Vec<LeaderboardEntry>> {
        let t = self.lock()?;
        let mut rows: Vec<LeaderboardEntry> = t
            .attempts
            .values()
            .filter(|a| a.event_id == event_id && a.is_completed)
            .map(|a| LeaderboardEntry {
                user_id: a.user_id.clone(),
                name: t
                    .users
                    .get(&a.user_id)
                    .map(|u| u.name.clone())
                    .unwrap_or_else(|| a.user_id.clone()),
                score: a.score,
                completed_at: a.completed_at,
            })
            .collect();
        rows.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then(a.completed_at.cmp(&b.completed_at))
                .then(a.user_id.cmp(&b.user_id))
        });
        rows.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(rows)
    }

    async fn count_ahead(
        &self,
        event_id: i64,
        score: i32,
        completed_at: DateTime<Utc>,
    ) -> Result<i64> {
        let t = self.lock()?;
        let count = t
            .attempts
            .values()
            .filter(|a| a.event_id == event_id && a.is_completed)
            .filter(|a| a.score > score || (a.score == score && a.completed_at < completed_at))
            .count();
        Ok(count as i64)
    }
}

#[async_trait]
impl PredictionRepository for MemoryStore {
    async fn insert_prediction(
        &self,
        user_id: &str,
        question_id: i64,
        predicted_answer: &str,
        now: DateTime<Utc>,
    ) -> Result<PredictionAnswer> {
        let mut t = self.lock()?;
        let id = Tables::next_id(&mut t.next_prediction_id);
        let row = PredictionAnswer {
            id,
            user_id: user_id.to_string(),
            question_id,
            predicted_answer: predicted_answer.to_string(),
            actual_answer: None,
            is_correct: None,
            verified_at: None,
            created_at: now,
        };
        t.predictions.insert(id, row.clone());
        Ok(row)
    }

    async fn list_predictions(&self, question_id: i64) -> Result<Vec<PredictionAnswer>> {
        let t = self.lock()?;
        Ok(t.predictions
            .values()
            .filter(|p| p.question_id == question_id)
            .cloned()
            .collect())
    }

    async fn apply_verdict(
        &self,
        question_id: i64,
        actual_answer: &str,
        verdict: &Verdict,
        now: DateTime<Utc>,
    ) -> Result<u64> {
        let mut t = self.lock()?;
        let mut updated = 0;
        for p in t.predictions.values_mut() {
            let user_matches = verdict
                .user_id
                .as_deref()
                .map_or(true, |u| u == p.user_id);
            if p.question_id == question_id
                && p.predicted_answer == verdict.predicted_answer
                && !p.is_verified()
                && user_matches
            {
                p.actual_answer = Some(actual_answer.to_string());
                p.is_correct = Some(verdict.is_correct);
                p.verified_at = Some(now);
                updated += 1;
            }
        }
        Ok(updated)
    }
}
