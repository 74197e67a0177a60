use crate::{AppState, guard::{self, Guard}, handlers};
use axum::{Router, middleware, routing::get};

/// Protected Router Module
///
/// The dashboard shell and billing. Every page needs a session; some need more, and
/// carry their own guard layer for it.
pub fn protected_routes() -> Router<AppState> {
    let any_session = Router::new()
        .route("/dashboard", get(handlers::serve_page))
        .route("/dashboard/settings", get(handlers::serve_page))
        // GET /billing
        // Plan display; the plan itself travels in the session.
        .route("/billing", get(handlers::serve_page))
        .route_layer(middleware::from_fn_with_state(Guard::auth(), guard::enforce));

    // GET /dashboard/generate
    // Content generation is only offered to verified email addresses.
    let verified = Router::new()
        .route("/dashboard/generate", get(handlers::serve_page))
        .route_layer(middleware::from_fn_with_state(
            Guard::email_verified(),
            guard::enforce,
        ));

    // GET /dashboard/studio
    // Premium-tier workspace. Lower tiers are sent to billing to upgrade.
    let premium = Router::new()
        .route("/dashboard/studio", get(handlers::serve_page))
        .route_layer(middleware::from_fn_with_state(
            Guard::premium().redirect_to("/billing"),
            guard::enforce,
        ));

    // GET /moderation
    // Content review queue for moderators and admins.
    let moderators = Router::new()
        .route("/moderation", get(handlers::serve_page))
        .route_layer(middleware::from_fn_with_state(
            Guard::moderator(),
            guard::enforce,
        ));

    any_session.merge(verified).merge(premium).merge(moderators)
}
