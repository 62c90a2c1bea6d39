//! Tabserve HTTP API — read-only windows over the loaded dataset
//!
//! Thin axum facade: validates query parameters, calls the windowing engine
//! and wraps the result in a `{ success, data, error }` envelope.
//!
//! | Route       | Purpose                                              |
//! |-------------|------------------------------------------------------|
//! | `/complete` | Whole dataset                                        |
//! | `/partial`  | First `size` share of rows (default `small`)         |
//! | `/random`   | `size` share of rows sampled at random               |
//! | `/paged`    | Rows `start..=end`, 1-indexed, optional `size` cap   |
//! | `/faulty`   | `/paged`, but fails with 500 at a fixed probability  |
//! | `/health`   | Readiness probe                                      |
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐  query   ┌──────────────┐  validated  ┌─────────────┐  &[Record] ┌─────────┐
//! │  Client  │─────────▶│ Axum Router  │────────────▶│  window::*  │──────────▶│ Dataset │
//! │          │◀─────────│ (+ faults)   │◀────────────│             │◀──────────│ (Arc)   │
//! └──────────┘ envelope └──────────────┘             └─────────────┘           └─────────┘
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::data::{Dataset, Record};
use crate::error::QueryError;
use crate::fault::{FaultSimulator, RandomSource};
use crate::params::WindowParams;
use crate::size::SizeSpecifier;
use crate::window;

// ─── Response envelope ─────────────────────────────────────────────────────

/// Body of every windowing response.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl Envelope<()> {
    fn failure(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

impl IntoResponse for QueryError {
    fn into_response(self) -> Response {
        (self.status(), Json(Envelope::failure(self.to_string()))).into_response()
    }
}

fn respond<T: Serialize>(result: Result<T, QueryError>) -> Response {
    match result {
        Ok(rows) => (StatusCode::OK, Json(Envelope::success(rows))).into_response(),
        Err(err) => {
            if !matches!(err, QueryError::SimulatedFailure) {
                warn!(error = %err, "rejected request");
            }
            err.into_response()
        }
    }
}

// ─── Shared state ───────────────────────────────────────────────────────────

/// State shared by every handler. The dataset is never written after load,
/// so plain `Arc` sharing is enough.
#[derive(Debug, Clone)]
pub struct AppState {
    pub dataset: Arc<Dataset>,
    pub rng: Arc<RandomSource>,
    pub faults: FaultSimulator,
}

impl AppState {
    /// State with an entropy-seeded random source.
    pub fn new(dataset: Dataset, failure_probability: f64) -> Self {
        Self::with_rng(
            Arc::new(dataset),
            Arc::new(RandomSource::from_entropy()),
            failure_probability,
        )
    }

    pub fn with_rng(
        dataset: Arc<Dataset>,
        rng: Arc<RandomSource>,
        failure_probability: f64,
    ) -> Self {
        let faults = FaultSimulator::new(failure_probability, Arc::clone(&rng));
        Self {
            dataset,
            rng,
            faults,
        }
    }

    fn partial(&self, params: &WindowParams) -> Result<&[Record], QueryError> {
        let size = params.size_or(SizeSpecifier::Small)?;
        Ok(window::prefix(&self.dataset, size.rows_for(self.dataset.len())))
    }

    fn random(&self, params: &WindowParams) -> Result<Vec<&Record>, QueryError> {
        let size = params.size_or(SizeSpecifier::Small)?;
        let count = size.rows_for(self.dataset.len());
        Ok(window::random_sample(&self.dataset, count, &self.rng))
    }

    fn paged(&self, params: &WindowParams) -> Result<&[Record], QueryError> {
        let range = params.range()?;
        let ceiling = params
            .size_or(SizeSpecifier::Complete)?
            .rows_for(self.dataset.len());
        Ok(window::ranged(&self.dataset, range, Some(ceiling)))
    }
}

// ─── Router ────────────────────────────────────────────────────────────────

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/complete", get(complete))
        .route("/partial", get(partial))
        .route("/random", get(random))
        .route("/paged", get(paged))
        .route("/faulty", get(faulty))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Load the dataset, bind and serve until Ctrl-C.
///
/// A dataset that fails to load aborts before the listener is bound.
pub async fn serve(config: ServerConfig) -> Result<()> {
    config.validate()?;

    let path = config.data_path.clone();
    let dataset = tokio::task::spawn_blocking(move || Dataset::open(&path))
        .await
        .context("dataset loader task failed")?
        .with_context(|| format!("Failed to load dataset: {}", config.data_path.display()))?;

    let state = AppState::new(dataset, config.failure_probability);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    info!(
        failure_probability = config.failure_probability,
        "listening on http://{}", config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown requested"),
        Err(e) => {
            warn!("cannot listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

// ─── Handlers ───────────────────────────────────────────────────────────────

/// Decoded query string in order. Extraction into pairs cannot fail, so every
/// request reaches its handler and gets the envelope.
type QueryPairs = Vec<(String, String)>;

async fn index() -> Html<&'static str> {
    Html("<h1>This is empty...</h1>\n<p>(...yeah, I know)</p>")
}

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({"status": "ok", "rows": state.dataset.len()})),
    )
}

async fn complete(State(state): State<AppState>) -> Response {
    respond(Ok(window::complete(&state.dataset)))
}

async fn partial(State(state): State<AppState>, Query(pairs): Query<QueryPairs>) -> Response {
    respond(state.partial(&WindowParams::from_pairs(pairs)))
}

async fn random(State(state): State<AppState>, Query(pairs): Query<QueryPairs>) -> Response {
    respond(state.random(&WindowParams::from_pairs(pairs)))
}

async fn paged(State(state): State<AppState>, Query(pairs): Query<QueryPairs>) -> Response {
    respond(state.paged(&WindowParams::from_pairs(pairs)))
}

/// Rolls the fault before looking at the parameters.
async fn faulty(State(state): State<AppState>, Query(pairs): Query<QueryPairs>) -> Response {
    if state.faults.should_fail() {
        return respond::<()>(Err(QueryError::SimulatedFailure));
    }
    respond(state.paged(&WindowParams::from_pairs(pairs)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope_omits_error() {
        let json = serde_json::to_value(Envelope::success(vec![1, 2])).unwrap();
        assert_eq!(json, serde_json::json!({"success": true, "data": [1, 2]}));
    }

    #[test]
    fn test_failure_envelope_omits_data() {
        let json = serde_json::to_value(Envelope::failure("nope".into())).unwrap();
        assert_eq!(json, serde_json::json!({"success": false, "error": "nope"}));
    }

    #[test]
    fn test_paged_validates_before_size() {
        let state = AppState::new(crate::data::numbered(10), 0.0);
        let params = WindowParams {
            size: Some("bogus".into()),
            start: Some("0".into()),
            end: Some("3".into()),
        };
        assert!(matches!(state.paged(&params), Err(QueryError::InvalidRange(_))));
    }
}
