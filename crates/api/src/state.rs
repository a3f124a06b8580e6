//! Shared application state for the Axum API server.

use herald_common::config::AppConfig;
use sqlx::PgPool;

/// Application state shared across all route handlers via Axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: AppConfig,
    /// Shared outbound HTTP client for the delivery channels.
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(pool: PgPool, config: AppConfig, http: reqwest::Client) -> Self {
        Self { pool, config, http }
    }
}
