use anyhow::Result;
use axum::{Router, middleware};
use clap::Parser;
use config::EnvConfig;
use state::{AppState, SharedState};
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info};
use tracing_subscriber::filter::EnvFilter;

mod api;
mod config;
mod error;
mod state;
#[cfg(test)]
mod tests;
mod timing;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[arg(short, long, default_value = "config.yaml")]
    pub config: PathBuf,
    #[arg(short, long, default_value = "dev")]
    pub env: String,
}

/// Builds the application router with all of its middleware
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(api::router())
        .with_state(state)
        .layer(middleware::from_fn(timing::response_mapper))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_env("NEARBYWEB_LOG"))
        .init();
    let args = Cli::parse();
    let env = EnvConfig::load(&args.config, &args.env).await?;
    debug!(?env, "Loaded configuration for environment '{}'", args.env);

    let addr: SocketAddr = format!("{}:{}", env.listen.host, env.listen.port).parse()?;
    let shared_state = Arc::new(SharedState::new(env).await?);
    let app = app(shared_state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(%error, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    debug!("Received shutdown signal");
}

#[cfg(test)]
pub(crate) fn test_app(
    pool: sqlx::Pool<sqlx::Sqlite>,
    trip_provider: Option<Arc<dyn libnearby::tripcost::TripCostProvider>>,
) -> (Router, AppState) {
    let state = Arc::new(SharedState::test(pool, trip_provider));
    (app(state.clone()), state)
}
