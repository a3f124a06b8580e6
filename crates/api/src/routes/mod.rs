pub mod auth;
pub mod contacts;
pub mod health;
pub mod notifications;

use axum::Router;

use crate::state::AppState;

/// Build the complete API router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(notifications::router())
        .merge(contacts::router())
        .with_state(state)
}
