//! # HTTP API
//!
//! JSON endpoints over the [`BudgetEngine`].
//!
//! ## Endpoints
//!
//! - `GET /health` - Liveness and campaign counts
//! - `GET /metrics` - Prometheus exposition
//! - `GET /v1/campaigns/:id/status` - Current state, spend and ceilings
//! - `POST /v1/campaigns/:id/spend` - Record spend, `{"amount": "12.50"}`
//! - `POST /v1/campaigns` - Create a campaign
//! - `POST /v1/campaigns/:id/schedules` - Add a dayparting window
//! - `POST /v1/campaigns/:id/{pause,resume,activate,deactivate}` - Operator actions
//! - `POST /v1/brands` - Create a brand
//! - `GET /v1/summary` - Fleet summary
//! - `POST /v1/cycles/{tick,daily,monthly,full-reset}` - Run a cycle now
//! - `GET /v1/events?limit=N` - Recent events, newest first
//!
//! ## Example
//!
//! ```no_run
//! use spendguard::api::{create_router, AppState};
//! use spendguard::clock::SystemClock;
//! use spendguard::config::SpendGuardConfig;
//! use spendguard::engine::BudgetEngine;
//! use spendguard::events::EventLog;
//! use spendguard::store::InMemoryStore;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let events = Arc::new(EventLog::default());
//! let engine = Arc::new(BudgetEngine::new(
//!     Arc::new(InMemoryStore::default()),
//!     Arc::new(SystemClock),
//!     events.clone(),
//! ));
//! let config = Arc::new(SpendGuardConfig::default());
//!
//! let app = create_router(Arc::new(AppState::new(engine, events, config)));
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8300").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Failures use one envelope:
//! ```json
//! {
//!   "error": {
//!     "message": "campaign not found: 42",
//!     "type": "invalid_request_error",
//!     "param": "campaign_id",
//!     "code": "not_found"
//!   }
//! }
//! ```

mod campaigns;
mod cycles;
mod fleet;
mod health;
pub mod types;

pub use health::HealthResponse;
pub use types::*;

use crate::config::SpendGuardConfig;
use crate::engine::{BudgetEngine, EngineError};
use crate::events::EventLog;
use axum::{
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Maximum request body size (64 KB).
const MAX_BODY_SIZE: usize = 64 * 1024;

/// Shared application state accessible to all handlers.
pub struct AppState {
    pub engine: Arc<BudgetEngine>,
    pub events: Arc<EventLog>,
    pub config: Arc<SpendGuardConfig>,
    /// Server startup time for uptime tracking
    pub start_time: Instant,
    pub prometheus: PrometheusHandle,
}

impl AppState {
    pub fn new(
        engine: Arc<BudgetEngine>,
        events: Arc<EventLog>,
        config: Arc<SpendGuardConfig>,
    ) -> Self {
        // A second installation fails (tests build many states); fall back to
        // a detached recorder handle.
        let prometheus = crate::metrics::setup_metrics().unwrap_or_else(|e| {
            tracing::debug!("Metrics already initialized, creating new handle: {}", e);
            PrometheusBuilder::new().build_recorder().handle()
        });

        Self {
            engine,
            events,
            config,
            start_time: Instant::now(),
            prometheus,
        }
    }
}

/// Run engine work on its own task and wait for it.
///
/// A request that times out or whose client goes away drops only the wait;
/// the spawned work still runs to completion.
pub(crate) async fn detached<T, F>(
    engine: &Arc<BudgetEngine>,
    work: impl FnOnce(Arc<BudgetEngine>) -> F,
) -> Result<T, ApiError>
where
    F: Future<Output = Result<T, EngineError>> + Send + 'static,
    T: Send + 'static,
{
    match tokio::spawn(work(Arc::clone(engine))).await {
        Ok(result) => Ok(result?),
        Err(err) => {
            tracing::error!(error = %err, "Engine task did not complete");
            Err(ApiError::internal("engine task did not complete"))
        }
    }
}

/// Create the main API router with all endpoints configured.
pub fn create_router(state: Arc<AppState>) -> Router {
    let timeout = Duration::from_secs(state.config.server.request_timeout_seconds);

    Router::new()
        .route("/health", get(health::handle))
        .route("/metrics", get(crate::metrics::handler::metrics_handler))
        .route("/v1/brands", post(fleet::create_brand))
        .route("/v1/campaigns", post(campaigns::create))
        .route("/v1/campaigns/:id/status", get(campaigns::status))
        .route("/v1/campaigns/:id/spend", post(campaigns::spend))
        .route("/v1/campaigns/:id/schedules", post(campaigns::add_schedule))
        .route("/v1/campaigns/:id/pause", post(campaigns::pause))
        .route("/v1/campaigns/:id/resume", post(campaigns::resume))
        .route("/v1/campaigns/:id/activate", post(campaigns::activate))
        .route("/v1/campaigns/:id/deactivate", post(campaigns::deactivate))
        .route("/v1/summary", get(fleet::summary))
        .route("/v1/events", get(fleet::events))
        .route("/v1/cycles/tick", post(cycles::tick))
        .route("/v1/cycles/daily", post(cycles::daily))
        .route("/v1/cycles/monthly", post(cycles::monthly))
        .route("/v1/cycles/full-reset", post(cycles::full_reset))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
