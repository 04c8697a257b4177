use anyhow::Context;
use ford_price::{
    api::{self, AppState},
    config::AppConfig,
    PricePredictor,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cfg = AppConfig::from_env().context("failed to read configuration")?;

    // Refuse to serve anything if an artifact is missing or corrupt
    let predictor = PricePredictor::load(&cfg).context("failed to load model artifacts")?;

    let state = AppState {
        predictor: Arc::new(predictor),
        reference_year: cfg.reference_year,
    };
    let app = api::router(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], cfg.port));
    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
