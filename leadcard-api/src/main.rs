mod registry;
mod render;
mod routes;

use leadcard_app::{AppConfig, AppContext};
use routes::ApiState;
use std::time::Duration;

const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    };

    let app_context = match AppContext::from_config(&config) {
        Ok(ctx) => ctx,
        Err(e) => {
            tracing::error!("Failed to build app context: {}", e);
            std::process::exit(1);
        }
    };

    let state = ApiState::new(app_context);
    let _sweeper = state
        .cards()
        .spawn_sweeper(SWEEP_INTERVAL, config.card_idle_timeout);

    let app = routes::router(state);

    tracing::info!("Listening on http://{}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app.into_make_service())
        .await
        .expect("Server error");
}
