use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::database::repository::{PredictionRepository, QuestionRepository};
use crate::error::{Error, Result};
use crate::models::prediction::{PredictionAnswer, Verdict};
use crate::services::judge_service::VerdictSource;
use crate::utils::time::now;

pub const MAX_PREDICTION_LEN: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JudgeOutcome {
    pub judged: usize,
    pub reconciled: u64,
}

/// Free-text predictions and the reconciliation of external verdicts onto them.
#[derive(Clone)]
pub struct PredictionService {
    predictions: Arc<dyn PredictionRepository>,
    questions: Arc<dyn QuestionRepository>,
}

impl PredictionService {
    pub fn new(
        predictions: Arc<dyn PredictionRepository>,
        questions: Arc<dyn QuestionRepository>,
    ) -> Self {
        Self {
            predictions,
            questions,
        }
    }

    pub async fn submit_prediction(
        &self,
        user_id: &str,
        question_id: i64,
        predicted_answer: &str,
    ) -> Result<PredictionAnswer> {
        let text = predicted_answer.trim();
        if text.is_empty() || text.chars().count() > MAX_PREDICTION_LEN {
            return Err(Error::Validation(format!(
                "Prediction must be between 1 and {} characters",
                MAX_PREDICTION_LEN
            )));
        }
        self.ensure_question(question_id).await?;
        self.predictions
            .insert_prediction(user_id, question_id, text, now())
            .await
    }

    /// Applies verdicts to the question's unverified predictions.
    ///
    /// Matching is by exact text within the question. A verdict without a
    /// `user_id` applies to every participant who wrote that text; one with a
    /// `user_id` applies to that participant only. Predictions already
    /// verified are left alone.
    pub async fn reconcile(
        &self,
        question_id: i64,
        actual_answer: &str,
        verdicts: &[Verdict],
    ) -> Result<u64> {
        self.ensure_question(question_id).await?;
        let verified_at = now();
        let mut reconciled = 0;
        for verdict in verdicts {
            reconciled += self
                .predictions
                .apply_verdict(question_id, actual_answer, verdict, verified_at)
                .await?;
        }
        tracing::info!(
            question_id,
            verdicts = verdicts.len(),
            reconciled,
            "predictions reconciled"
        );
        Ok(reconciled)
    }

    /// Distinct texts still awaiting a verdict, in lexical order.
    pub async fn pending_texts(&self, question_id: i64) -> Result<Vec<String>> {
        let rows = self.predictions.list_predictions(question_id).await?;
        let texts: BTreeSet<String> = rows
            .into_iter()
            .filter(|p| !p.is_verified())
            .map(|p| p.predicted_answer)
            .collect();
        Ok(texts.into_iter().collect())
    }

    pub async fn list(&self, question_id: i64) -> Result<Vec<PredictionAnswer>> {
        self.predictions.list_predictions(question_id).await
    }

    /// Asks `source` for verdicts on every pending text, then reconciles them.
    pub async fn judge_and_reconcile(
        &self,
        question_id: i64,
        actual_answer: &str,
        source: &dyn VerdictSource,
    ) -> Result<JudgeOutcome> {
        let question = self.ensure_question(question_id).await?;
        let pending = self.pending_texts(question_id).await?;
        if pending.is_empty() {
            return Ok(JudgeOutcome {
                judged: 0,
                reconciled: 0,
            });
        }
        let verdicts = source.judge(&question, actual_answer, &pending).await?;
        let reconciled = self.reconcile(question_id, actual_answer, &verdicts).await?;
        Ok(JudgeOutcome {
            judged: verdicts.len(),
            reconciled,
        })
    }

    async fn ensure_question(&self, question_id: i64) -> Result<crate::models::question::Question> {
        self.questions
            .get_question(question_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Question {} not found", question_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::repository::{EventRepository, QuestionRepository};
    use crate::database::MemoryStore;
    use crate::models::event::NewEvent;
    use crate::models::question::{NewQuestion, OptionLabel, QuestionContent, QuestionOptions};
    use crate::services::judge_service::MockVerdictSource;
    use chrono::Duration;

    async fn seeded() -> (Arc<MemoryStore>, PredictionService, i64) {
        let store = Arc::new(MemoryStore::new());
        let t = now();
        let event = store
            .create_event(
                NewEvent {
                    name: "Forecasts".into(),
                    description: None,
                    starts_at: t - Duration::hours(1),
                    ends_at: t + Duration::hours(1),
                    questions_per_user: 1,
                    is_active: true,
                },
                t,
            )
            .await
            .unwrap();
        let question = store
            .insert_root(
                NewQuestion {
                    event_id: event.id,
                    pool_group: 0,
                    content: QuestionContent {
                        body: "Lunch price next month?".into(),
                        options: QuestionOptions {
                            a: "-".into(),
                            b: "-".into(),
                            c: "-".into(),
                            d: "-".into(),
                        },
                        correct_option: OptionLabel::A,
                        category: "prediction".into(),
                    },
                },
                t,
            )
            .await
            .unwrap();
        let svc = PredictionService::new(store.clone(), store.clone());
        (store, svc, question.id)
    }

    #[tokio::test]
    async fn judge_results_flow_into_reconciliation() {
        let (_store, svc, qid) = seeded().await;
        svc.submit_prediction("u1", qid, "800").await.unwrap();
        svc.submit_prediction("u2", qid, "900").await.unwrap();

        let mut judge = MockVerdictSource::new();
        judge
            .expect_judge()
            .times(1)
            .returning(|_, _, texts| {
                Ok(texts
                    .iter()
                    .map(|t| Verdict {
                        predicted_answer: t.clone(),
                        is_correct: t == "800",
                        user_id: None,
                    })
                    .collect())
            });

        let outcome = svc.judge_and_reconcile(qid, "800円", &judge).await.unwrap();
        assert_eq!(outcome, JudgeOutcome { judged: 2, reconciled: 2 });
        assert!(svc.pending_texts(qid).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn judge_failure_leaves_predictions_untouched() {
        let (_store, svc, qid) = seeded().await;
        svc.submit_prediction("u1", qid, "800").await.unwrap();

        let mut judge = MockVerdictSource::new();
        judge
            .expect_judge()
            .returning(|_, _, _| Err(Error::ExternalService("timeout".into())));

        let err = svc.judge_and_reconcile(qid, "800円", &judge).await.unwrap_err();
        assert!(matches!(err, Error::ExternalService(_)));
        assert_eq!(svc.pending_texts(qid).await.unwrap(), vec!["800".to_string()]);
    }

    #[tokio::test]
    async fn nothing_pending_skips_the_judge() {
        let (_store, svc, qid) = seeded().await;
        let mut judge = MockVerdictSource::new();
        judge.expect_judge().times(0);

        let outcome = svc.judge_and_reconcile(qid, "800円", &judge).await.unwrap();
        assert_eq!(outcome.reconciled, 0);
    }
}
