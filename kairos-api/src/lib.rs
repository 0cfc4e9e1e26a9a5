//! kairos-api library interface
//!
//! Room photo + vibe in, decorating suggestions out. Exposes the router and
//! state so integration tests can drive the service in-process.

pub mod api;
pub mod config;
pub mod error;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use anyhow::{Context, Result};
use axum::{extract::DefaultBodyLimit, Router};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::ServiceConfig;
use crate::services::{GeminiClient, ShoppingClient};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Resolved service configuration
    pub config: Arc<ServiceConfig>,
    /// Multimodal model client (assisted pipeline)
    pub gemini: Arc<GeminiClient>,
    /// Shopping search client (assisted pipeline)
    pub shopping: Arc<ShoppingClient>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: ServiceConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.request_timeout_secs);
        let gemini = GeminiClient::new(&config.gemini, timeout)
            .context("Failed to create Gemini client")?;
        let shopping = ShoppingClient::new(&config.shopping, timeout)
            .context("Failed to create shopping client")?;

        Ok(Self {
            config: Arc::new(config),
            gemini: Arc::new(gemini),
            shopping: Arc::new(shopping),
            startup_time: Utc::now(),
        })
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .merge(api::analyze_routes())
        .merge(api::health_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
