use tourdesk::{config, routes, state};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = config::AppConfig::from_env().expect("invalid configuration");
    let port = config.port;
    if config.maps_api_key.is_none() {
        tracing::warn!("GOOGLE_MAPS_API_KEY not set; static map requests will fail");
    }
    tracing::info!(backend = %config.backend_api_url, "booking backend configured");

    let state = state::AppState::from_config(config).expect("state init failed");
    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "tourdesk listening");
    axum::serve(listener, app).await.expect("server failed");
}
