pub mod answer;
pub mod attempt;
pub mod event;
pub mod prediction;
pub mod question;
pub mod user;
