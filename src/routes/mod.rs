/// Router Module Index
///
/// Pages and endpoints are grouped by the access class the gate assigns them, so each
/// group can carry the guard layer it needs. The groups mirror the classifier's table:
/// whatever a router here serves must classify the same way in `classifier::ROUTE_TABLE`.

/// Static path → RouteClass table and lookup.
pub mod classifier;

/// Marketing pages, health, the auth API and preferences. Reachable by anyone.
pub mod public;

/// Login and registration pages. Signed-in users are turned away by the edge filter.
pub mod auth_only;

/// Dashboard, billing and content generation. Requires a session.
pub mod protected;

/// Admin panel. Requires the admin role (or a narrower role guard per page).
pub mod admin;

/// Where unauthenticated visitors are sent.
pub const LOGIN_PATH: &str = "/auth/login";

/// Protected landing page for signed-in users.
pub const LANDING_PATH: &str = "/dashboard";

/// Where users without a verified email are sent.
pub const VERIFY_EMAIL_PATH: &str = "/auth/verify-email";
