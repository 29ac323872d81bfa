use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

pub const DEFAULT_JUDGE_API_URL: &str = "https://api.openai.com/v1/chat/completions";

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    pub leaderboard_default_limit: i64,
    pub outdated_exempt_categories: Vec<String>,
    pub judge_api_url: String,
    pub judge_api_key: Option<String>,
    pub judge_model: String,
    pub log_json: bool,
}

/// Settings the request handlers need; split out so tests can build an
/// `AppState` without touching the process-wide `CONFIG`.
#[derive(Debug, Clone)]
pub struct Settings {
    pub jwt_secret: String,
    pub leaderboard_default_limit: i64,
    pub outdated_exempt_categories: Vec<String>,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            database_url: get_env("DATABASE_URL")?,
            db_max_connections: get_env_parse_or("DB_MAX_CONNECTIONS", 20)?,
            jwt_secret: get_env("JWT_SECRET")?,
            leaderboard_default_limit: get_env_parse_or("LEADERBOARD_DEFAULT_LIMIT", 100)?,
            outdated_exempt_categories: env::var("OUTDATED_EXEMPT_CATEGORIES")
                .map(|raw| parse_list(&raw))
                .unwrap_or_else(|_| vec!["evergreen".to_string()]),
            judge_api_url: env::var("JUDGE_API_URL")
                .unwrap_or_else(|_| DEFAULT_JUDGE_API_URL.to_string()),
            judge_api_key: env::var("JUDGE_API_KEY").ok().filter(|k| !k.is_empty()),
            judge_model: env::var("JUDGE_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            log_json: env::var("LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        })
    }

    pub fn settings(&self) -> Settings {
        Settings {
            jwt_secret: self.jwt_secret.clone(),
            leaderboard_default_limit: self.leaderboard_default_limit,
            outdated_exempt_categories: self.outdated_exempt_categories.clone(),
        }
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}

/// Comma-separated list, trimmed, empties dropped.
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}
