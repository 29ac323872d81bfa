use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use quiz_backend::{
    config::{get_config, init_config},
    database::{
        pool::{create_pool, run_migrations},
        PgStore,
    },
    routes,
    services::judge_service::HttpJudge,
    AppState,
};
use reqwest::Client;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_config()?;
    let config = get_config();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if config.log_json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let pool = create_pool(config).await?;
    run_migrations(&pool).await?;
    info!("Database migrations applied");

    let store = Arc::new(PgStore::new(pool));
    let mut app_state = AppState::new(store, config.settings());

    match &config.judge_api_key {
        Some(api_key) => {
            let http_client = Client::builder().timeout(Duration::from_secs(60)).build()?;
            let judge = HttpJudge::new(
                http_client,
                config.judge_api_url.clone(),
                api_key.clone(),
                config.judge_model.clone(),
            );
            app_state = app_state.with_verdict_source(Arc::new(judge));
            info!(model = %config.judge_model, "Verdict source configured");
        }
        None => tracing::warn!("JUDGE_API_KEY not set; automatic prediction judging disabled"),
    }

    let app = routes::app(app_state);

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
