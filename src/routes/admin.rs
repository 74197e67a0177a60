use crate::{AppState, guard::{self, Guard}, handlers};
use axum::{Router, middleware, routing::get};

/// Admin Router Module
///
/// The admin panel. Everything under `/admin` is admin-only; moderator tooling lives in
/// the protected router. The edge filter only guarantees a session here, the role check
/// is done by the guard layer on each group. Non-admins are silently sent to the dashboard
/// so the panel's layout is not revealed.
pub fn admin_routes() -> Router<AppState> {
    let admins = Router::new()
        .route("/admin", get(handlers::serve_page))
        .route("/admin/users", get(handlers::serve_page))
        .route_layer(middleware::from_fn_with_state(Guard::admin(), guard::enforce));

    // GET /admin/system
    // Deployment-wide settings.
    let super_admins = Router::new()
        .route("/admin/system", get(handlers::serve_page))
        .route_layer(middleware::from_fn_with_state(
            Guard::super_admin(),
            guard::enforce,
        ));

    admins.merge(super_admins)
}
