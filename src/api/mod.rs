//! REST API over the crafting graph.
//!
//! - `GET /` - environment and graph statistics
//! - `/ingredients`, `/ingredients/:id`, `/ingredients/:id/outcomes`, `/ingredients/:id/sources`
//! - `/utensils`, `/utensils/:id`, `/utensils/:id/uses`
//! - `/steps`, `/steps/:input-:utensil-:output`
//! - `GET /recipes`
//!
//! List and single-step reads accept `?detailed=true` to expand ids into
//! full entities.

pub mod error;
mod index;
mod ingredients;
mod recipes;
mod steps;
mod utensils;

pub use error::{ApiError, ApiResult};

use axum::http::HeaderValue;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::{Config, Environment};
use crate::db::Db;
use crate::error::{KitchenError, Result};

/// Application state shared across handlers
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Db,
    pub environment: Environment,
}

impl AppState {
    pub fn new(db: Db, environment: Environment) -> Self {
        Self { db, environment }
    }
}

/// `?detailed=` query accepted by the list and step reads.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DetailedQuery {
    detailed: Option<String>,
}

impl DetailedQuery {
    pub fn is_detailed(&self) -> ApiResult<bool> {
        match self.detailed.as_deref().map(str::to_ascii_lowercase).as_deref() {
            None | Some("false") => Ok(false),
            Some("true") => Ok(true),
            Some(_) => Err(ApiError::bad_request("\"detailed\" must be a boolean")),
        }
    }
}

/// Build CORS layer.
/// - If allowed_origins is configured: only those origins.
/// - If empty (local dev): allow Any.
fn build_cors_layer(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("CORS: Invalid origin '{}': {}", origin, e);
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Create the axum router
pub fn create_router(state: AppState, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/", get(index::handle_index))
        .route(
            "/ingredients",
            get(ingredients::handle_list).post(ingredients::handle_create),
        )
        .route(
            "/ingredients/:id",
            get(ingredients::handle_get)
                .put(ingredients::handle_update)
                .delete(ingredients::handle_delete),
        )
        .route("/ingredients/:id/outcomes", get(ingredients::handle_outcomes))
        .route("/ingredients/:id/sources", get(ingredients::handle_sources))
        .route(
            "/utensils",
            get(utensils::handle_list).post(utensils::handle_create),
        )
        .route(
            "/utensils/:id",
            get(utensils::handle_get)
                .put(utensils::handle_update)
                .delete(utensils::handle_delete),
        )
        .route("/utensils/:id/uses", get(utensils::handle_uses))
        .route(
            "/steps",
            get(steps::handle_list)
                .post(steps::handle_create)
                .delete(steps::handle_delete),
        )
        .route("/steps/:triple", get(steps::handle_get))
        .route("/recipes", get(recipes::handle_list))
        .fallback(error::handle_not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors_layer(allowed_origins)),
        )
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl-C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => log::info!("Received Ctrl-C, shutting down"),
        _ = terminate => log::info!("Received SIGTERM, shutting down"),
    }
}

/// HTTP server over one graph store
pub struct ApiServer {
    db: Db,
    config: Config,
}

impl ApiServer {
    pub fn new(db: Db, config: Config) -> Self {
        Self { db, config }
    }

    /// Serve until Ctrl-C or SIGTERM, then close the store.
    pub async fn run(&self) -> Result<()> {
        let state = AppState::new(self.db.clone(), self.config.environment());
        let app = create_router(state, &self.config.http_server.allowed_origins);

        let addr = format!("{}:{}", self.config.http_server.host, self.config.http_server.port);
        let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
            KitchenError::Io(std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to bind to {}: {}. Set http_server.port in config.toml or PORT to use another port",
                    addr, e
                ),
            ))
        })?;
        log::info!("Listening on http://{} ({})", addr, self.config.environment());

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| {
                KitchenError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    format!("HTTP server error: {}", e),
                ))
            })?;

        self.db.close();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(detailed: Option<&str>) -> DetailedQuery {
        DetailedQuery { detailed: detailed.map(String::from) }
    }

    #[test]
    fn test_detailed_query_parsing() {
        assert!(!query(None).is_detailed().unwrap());
        assert!(!query(Some("false")).is_detailed().unwrap());
        assert!(query(Some("true")).is_detailed().unwrap());
        assert!(query(Some("TRUE")).is_detailed().unwrap());

        let err = query(Some("yes")).is_detailed().unwrap_err();
        assert_eq!(err.0.to_string(), "Invalid input: \"detailed\" must be a boolean");
    }
}
