use crate::{AppState, guard::{self, Guard}, handlers};
use axum::{Router, middleware, routing::get};

/// Auth-Only Router Module
///
/// Login and registration flows. The edge filter already sends signed-in users to the
/// landing page; the guest guard repeats the check for requests that reach these pages
/// some other way.
pub fn auth_only_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", get(handlers::serve_page))
        .route("/auth/register", get(handlers::serve_page))
        .route("/auth/forgot-password", get(handlers::serve_page))
        .route("/auth/reset-password", get(handlers::serve_page))
        .route_layer(middleware::from_fn_with_state(Guard::guest(), guard::enforce))
}
