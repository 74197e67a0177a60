use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

/// RouteClass
///
/// Static access category of a URL path. Every access decision in the gate starts here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum RouteClass {
    /// Reachable by anyone, with or without a session.
    Public,
    /// Login/registration flows. A signed-in user is sent to the landing page instead.
    AuthOnly,
    /// Requires a session.
    Protected,
    /// Requires a session with the admin role.
    AdminOnly,
}

/// How a table entry's pattern is compared with the request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathPattern {
    /// The path must equal the pattern.
    Exact(&'static str),
    /// The path must equal the pattern or continue it with a `/`.
    /// `Prefix("/admin")` covers `/admin` and `/admin/users` but not `/administrator`.
    Prefix(&'static str),
}

impl PathPattern {
    pub fn matches(&self, path: &str) -> bool {
        match *self {
            PathPattern::Exact(pattern) => path == pattern,
            PathPattern::Prefix(pattern) => path
                .strip_prefix(pattern)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/')),
        }
    }
}

/// ROUTE_TABLE
///
/// Ordered (pattern, class) pairs. Evaluation is first-match-wins, so the narrower
/// `/auth/*` exceptions must stay above the `/auth` entry.
pub const ROUTE_TABLE: &[(PathPattern, RouteClass)] = &[
    // Marketing
    (PathPattern::Exact("/"), RouteClass::Public),
    (PathPattern::Prefix("/public"), RouteClass::Public),
    (PathPattern::Prefix("/pricing"), RouteClass::Public),
    (PathPattern::Prefix("/about"), RouteClass::Public),
    (PathPattern::Prefix("/features"), RouteClass::Public),
    // Infrastructure and API surfaces that answer for themselves
    (PathPattern::Prefix("/health"), RouteClass::Public),
    (PathPattern::Prefix("/api/auth"), RouteClass::Public),
    (PathPattern::Prefix("/api/health"), RouteClass::Public),
    (PathPattern::Prefix("/api/preferences"), RouteClass::Public),
    (PathPattern::Prefix("/swagger-ui"), RouteClass::Public),
    (PathPattern::Prefix("/api-docs"), RouteClass::Public),
    // Auth callbacks: the verification link must work whether or not the user is signed in.
    (PathPattern::Prefix("/auth/callback"), RouteClass::Public),
    (PathPattern::Prefix("/auth/verify-email"), RouteClass::Public),
    (PathPattern::Prefix("/auth"), RouteClass::AuthOnly),
    (PathPattern::Prefix("/admin"), RouteClass::AdminOnly),
];

/// classify
///
/// Maps a request path to its RouteClass. Unmatched paths are Protected.
pub fn classify(path: &str) -> RouteClass {
    classify_with(ROUTE_TABLE, path)
}

/// Same as [`classify`] against an arbitrary table.
pub fn classify_with(table: &[(PathPattern, RouteClass)], path: &str) -> RouteClass {
    // Treat `/dashboard/` and `/dashboard` alike; the root itself stays `/`.
    let path = match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    };

    table
        .iter()
        .find(|(pattern, _)| pattern.matches(path))
        .map(|(_, class)| *class)
        .unwrap_or(RouteClass::Protected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_and_marketing_pages_are_public() {
        assert_eq!(classify("/"), RouteClass::Public);
        assert_eq!(classify("/public"), RouteClass::Public);
        assert_eq!(classify("/public/terms"), RouteClass::Public);
        assert_eq!(classify("/pricing"), RouteClass::Public);
        assert_eq!(classify("/health"), RouteClass::Public);
    }

    #[test]
    fn auth_pages_are_auth_only_except_callbacks() {
        assert_eq!(classify("/auth/login"), RouteClass::AuthOnly);
        assert_eq!(classify("/auth/register"), RouteClass::AuthOnly);
        assert_eq!(classify("/auth/forgot-password"), RouteClass::AuthOnly);
        assert_eq!(classify("/auth/callback/credentials"), RouteClass::Public);
        assert_eq!(classify("/auth/verify-email"), RouteClass::Public);
        assert_eq!(classify("/api/auth/session"), RouteClass::Public);
    }

    #[test]
    fn admin_prefix_respects_segment_boundaries() {
        assert_eq!(classify("/admin"), RouteClass::AdminOnly);
        assert_eq!(classify("/admin/users"), RouteClass::AdminOnly);
        assert_eq!(classify("/administrator"), RouteClass::Protected);
    }

    #[test]
    fn unmatched_paths_fail_closed() {
        assert_eq!(classify("/dashboard"), RouteClass::Protected);
        assert_eq!(classify("/billing"), RouteClass::Protected);
        assert_eq!(classify("/something/unknown"), RouteClass::Protected);
    }

    #[test]
    fn trailing_slash_is_ignored() {
        assert_eq!(classify("/admin/"), RouteClass::AdminOnly);
        assert_eq!(classify("/auth/login/"), RouteClass::AuthOnly);
    }

    #[test]
    fn first_match_wins() {
        let table = [
            (PathPattern::Prefix("/docs"), RouteClass::Public),
            (PathPattern::Exact("/docs/internal"), RouteClass::AdminOnly),
        ];
        assert_eq!(classify_with(&table, "/docs/internal"), RouteClass::Public);
        assert_eq!(classify_with(&table, "/elsewhere"), RouteClass::Protected);
    }
}
