use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable with or without a session: marketing pages, the auth API, the
/// connection test and preferences. The auth API must stay here, otherwise a signed-out
/// visitor could never obtain a session.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness of the gate itself, for load balancers.
        .route("/health", get(|| async { "ok" }))
        // --- Marketing ---
        .route("/", get(handlers::serve_page))
        .route("/pricing", get(handlers::serve_page))
        .route("/about", get(handlers::serve_page))
        .route("/features", get(handlers::serve_page))
        // GET /auth/verify-email
        // Target of the verification link; works whether or not the user is signed in.
        .route("/auth/verify-email", get(handlers::serve_page))
        // --- Auth API ---
        .route("/api/auth/login", post(handlers::login))
        .route("/api/auth/register", post(handlers::register))
        .route("/api/auth/logout", post(handlers::logout))
        .route("/api/auth/session", get(handlers::get_session))
        // GET /api/health/connection
        // Connection test against the backend's /health, /health/database and /health/cache.
        .route("/api/health/connection", get(handlers::connection_status))
        .route(
            "/api/preferences",
            get(handlers::get_preferences).put(handlers::update_preferences),
        )
}
