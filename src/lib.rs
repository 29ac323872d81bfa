pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use crate::config::Settings;
use crate::database::repository::Store;
use crate::services::{
    event_service::EventService, judge_service::VerdictSource,
    participation_service::ParticipationService, prediction_service::PredictionService,
    question_service::QuestionService, ranking_service::RankingService,
    scoring_service::ScoringService, selection_service::SelectionService,
};

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub event_service: EventService,
    pub participation_service: ParticipationService,
    pub selection_service: SelectionService,
    pub scoring_service: ScoringService,
    pub ranking_service: RankingService,
    pub question_service: QuestionService,
    pub prediction_service: PredictionService,
    pub verdict_source: Option<Arc<dyn VerdictSource>>,
}

impl AppState {
    pub fn new<S>(store: Arc<S>, settings: Settings) -> Self
    where
        S: Store + 'static,
    {
        let participation_service = ParticipationService::new(store.clone());
        let event_service = EventService::new(store.clone(), store.clone());
        let selection_service =
            SelectionService::new(store.clone(), store.clone(), participation_service.clone());
        let scoring_service =
            ScoringService::new(store.clone(), store.clone(), participation_service.clone());
        let ranking_service = RankingService::new(store.clone(), settings.leaderboard_default_limit);
        let question_service = QuestionService::new(
            store.clone(),
            store.clone(),
            settings.outdated_exempt_categories.clone(),
        );
        let prediction_service = PredictionService::new(store.clone(), store);

        Self {
            settings: Arc::new(settings),
            event_service,
            participation_service,
            selection_service,
            scoring_service,
            ranking_service,
            question_service,
            prediction_service,
            verdict_source: None,
        }
    }

    pub fn with_verdict_source(mut self, source: Arc<dyn VerdictSource>) -> Self {
        self.verdict_source = Some(source);
        self
    }
}
