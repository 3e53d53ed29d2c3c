use std::future::Future;

use axum::{
    http::{header, HeaderValue, Method},
    Router,
};
use configs::AppConfig;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{error, info, warn};

use crate::errors::StartupError;
use crate::routes::{self, ServerState};

/// Explicit origins get credentialed CORS for exactly those origins; an
/// empty list mirrors whatever origin asks.
pub fn build_cors(origins: &[String]) -> CorsLayer {
    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "ignoring unparsable CORS origin");
                None
            }
        })
        .collect();
    if parsed.is_empty() {
        return CorsLayer::very_permissive();
    }
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(parsed))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
}

/// Connect to MongoDB, prepare indexes and assemble the router.
pub async fn build_app(cfg: &AppConfig) -> Result<Router, StartupError> {
    let store = models::db::connect(&cfg.database)
        .await
        .map_err(|e| StartupError::Database(e.to_string()))?;
    store.ping().await.map_err(|e| StartupError::Database(e.to_string()))?;
    store.ensure_indexes().await?;

    let state = ServerState::from_store(&store, cfg);
    Ok(routes::build_router(state, build_cors(&cfg.server.cors_origins)))
}

/// Resolves when `signal` fires. If the signal handler cannot be installed
/// the failure is logged and this never resolves, so the server keeps running
/// instead of shutting down right after start.
pub async fn shutdown_on<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = signal.await {
        error!(event = "signal_handler_failed", error = %e, "cannot listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

/// Serve until `shutdown` resolves, then drain in-flight requests.
pub async fn serve<F>(cfg: AppConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_app(&cfg).await?;
    let addr = cfg.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| StartupError::InvalidConfig(format!("cannot bind {addr}: {e}")))?;
    info!(%addr, production = cfg.auth.production, "listening");
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;
    info!("server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cors_falls_back_to_permissive_without_origins() {
        // both branches must build without panicking
        let _ = build_cors(&[]);
        let _ = build_cors(&["http://localhost:5173".to_string(), "\u{7f}bad".to_string()]);
    }

    #[tokio::test]
    async fn failed_signal_handler_never_triggers_shutdown() {
        let failed = async { Err(std::io::Error::other("no signal support")) };
        let waited = tokio::time::timeout(std::time::Duration::from_millis(50), shutdown_on(failed)).await;
        assert!(waited.is_err());
    }

    #[tokio::test]
    async fn delivered_signal_triggers_shutdown() {
        let waited = tokio::time::timeout(std::time::Duration::from_millis(50), shutdown_on(async { Ok(()) })).await;
        assert!(waited.is_ok());
    }
}
