//! spectral-server library
//!
//! HTTP layer of Spectral: login, session and file management, workspace
//! state sync, mode analysis through the kernel and the kernel proxy.

use axum::extract::DefaultBodyLimit;
use axum::Router;
use chrono::{DateTime, Utc};
use spectral_common::config::Config;
use spectral_common::kernel::KernelClient;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod cli;
pub mod error;

pub use error::{ApiError, ApiResult};

/// Largest accepted request body (audio uploads)
const MAX_BODY_BYTES: usize = 100 * 1024 * 1024;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub kernel: KernelClient,
    pub config: Arc<Config>,
    /// Service start, reported by the health check
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: SqlitePool, kernel: KernelClient, config: Config) -> Self {
        Self {
            db,
            kernel,
            config: Arc::new(config),
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
///
/// Everything except the health check, signup and login requires a login
/// session. Admin routes exist only when enabled in the configuration.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;

    let protected = Router::new()
        .merge(api::auth::session_routes())
        .merge(api::profile::profile_routes())
        .merge(api::sessions::session_routes())
        .merge(api::recorder::recorder_routes())
        .merge(api::storage::storage_routes())
        .merge(api::analysis::analysis_routes())
        .merge(api::proxy::proxy_routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth::auth_middleware,
        ));

    let mut public = Router::new()
        .merge(api::health::health_routes())
        .merge(api::auth::login_routes());

    if state.config.admin_enabled {
        public = public.merge(api::admin::admin_routes());
    }

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
