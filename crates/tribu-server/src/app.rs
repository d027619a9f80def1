use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{routes, state::AppState};

/// Construct the Axum [`Router`] with all routes and middleware attached.
///
/// `TraceLayer` gives structured request/response logging via `tracing`.
/// Protected routes (`/api/profile*`) check the decoded session themselves
/// and answer 401 before any flow runs.
pub fn build_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(routes::health::health))
        .route("/api/auth/register", post(routes::auth::register))
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/auth/logout", post(routes::auth::logout))
        .route("/api/auth/session", get(routes::auth::current_session))
        .route("/api/profile", put(routes::profile::update_profile))
        .route("/api/profile/password", put(routes::profile::change_password))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
