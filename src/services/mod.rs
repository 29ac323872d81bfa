pub mod event_service;
pub mod judge_service;
pub mod participation_service;
pub mod pool_service;
pub mod prediction_service;
pub mod question_service;
pub mod ranking_service;
pub mod scoring_service;
pub mod selection_service;
