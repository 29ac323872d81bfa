use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::database::repository::{EventRepository, QuestionRepository};
use crate::error::{Error, Result};
use crate::models::answer::NewAnswer;
use crate::models::question::{OptionLabel, Question};
use crate::services::participation_service::ParticipationService;

#[derive(Debug, Clone)]
pub struct SubmittedAnswer {
    pub question_id: i64,
    pub chosen_option: OptionLabel,
    pub time_spent_seconds: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionResult {
    pub question_id: i64,
    pub chosen_option: OptionLabel,
    pub correct_option: OptionLabel,
    pub is_correct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionResult {
    pub score: i32,
    pub total: i32,
    pub results: Vec<QuestionResult>,
}

#[derive(Clone)]
pub struct ScoringService {
    events: Arc<dyn EventRepository>,
    questions: Arc<dyn QuestionRepository>,
    participation: ParticipationService,
}

impl ScoringService {
    pub fn new(
        events: Arc<dyn EventRepository>,
        questions: Arc<dyn QuestionRepository>,
        participation: ParticipationService,
    ) -> Self {
        Self {
            events,
            questions,
            participation,
        }
    }

    /// Grades one attempt and records it exactly once.
    ///
    /// Answers for questions that no longer exist (or belong to another
    /// event) are skipped and count toward neither score nor total. Answer
    /// rows and the completion row are committed together; if another
    /// submission for the same pair won, nothing from this one is kept.
    pub async fn submit(
        &self,
        user_id: &str,
        event_id: i64,
        answers: Vec<SubmittedAnswer>,
    ) -> Result<SubmissionResult> {
        ensure_unique_questions(&answers)?;

        if self.events.get_event(event_id).await?.is_none() {
            return Err(Error::NotFound(format!("Event {} not found", event_id)));
        }
        self.participation
            .ensure_not_completed(user_id, event_id)
            .await?;

        let mut questions = HashMap::with_capacity(answers.len());
        for answer in &answers {
            if let Some(q) = self.questions.get_question(answer.question_id).await? {
                if q.event_id == event_id {
                    questions.insert(q.id, q);
                }
            }
        }

        let (rows, result) = grade(&questions, &answers);
        let skipped = answers.len() - rows.len();
        self.participation
            .commit(user_id, event_id, result.score, rows)
            .await?;

        tracing::info!(
            user_id,
            event_id,
            score = result.score,
            total = result.total,
            skipped,
            "submission graded"
        );
        Ok(result)
    }
}

/// Pure grading step: answer rows to persist plus the client-facing result.
pub fn grade(
    questions: &HashMap<i64, Question>,
    answers: &[SubmittedAnswer],
) -> (Vec<NewAnswer>, SubmissionResult) {
    let mut rows = Vec::with_capacity(answers.len());
    let mut results = Vec::with_capacity(answers.len());
    let mut score = 0;

    for answer in answers {
        let Some(question) = questions.get(&answer.question_id) else {
            continue;
        };
        let is_correct = answer.chosen_option == question.correct_option;
        if is_correct {
            score += 1;
        }
        rows.push(NewAnswer {
            question_id: question.id,
            chosen_option: answer.chosen_option.to_string(),
            is_correct,
            time_spent_seconds: answer.time_spent_seconds,
        });
        results.push(QuestionResult {
            question_id: question.id,
            chosen_option: answer.chosen_option,
            correct_option: question.correct_option,
            is_correct,
        });
    }

    let total = results.len() as i32;
    (rows, SubmissionResult { score, total, results })
}

fn ensure_unique_questions(answers: &[SubmittedAnswer]) -> Result<()> {
    let mut seen = HashSet::with_capacity(answers.len());
    for answer in answers {
        if !seen.insert(answer.question_id) {
            return Err(Error::Validation(format!(
                "Question {} answered more than once",
                answer.question_id
            )));
        }
    }
    Ok(())
}
