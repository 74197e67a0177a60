use axum::{
    extract::{Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::{
    auth::ResolvedSession,
    config::AppConfig,
    routes::{
        LANDING_PATH, LOGIN_PATH,
        classifier::{RouteClass, classify},
    },
};

/// RedirectDecision
///
/// Verdict of the edge filter for one request: pass through, or go to `target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectDecision {
    pub allow: bool,
    pub target: Option<String>,
}

impl RedirectDecision {
    pub fn pass() -> Self {
        Self {
            allow: true,
            target: None,
        }
    }

    pub fn redirect(target: impl Into<String>) -> Self {
        Self {
            allow: false,
            target: Some(target.into()),
        }
    }
}

/// decide
///
/// The edge filter's policy. It only knows whether a session exists, never its role:
/// - session + AuthOnly → landing page
/// - no session + Protected/AdminOnly → login page, remembering `requested`
/// - everything else passes
pub fn decide(session_present: bool, class: RouteClass, requested: &str) -> RedirectDecision {
    match (session_present, class) {
        (true, RouteClass::AuthOnly) => RedirectDecision::redirect(LANDING_PATH),
        (false, RouteClass::Protected | RouteClass::AdminOnly) => {
            RedirectDecision::redirect(login_target(requested))
        }
        _ => RedirectDecision::pass(),
    }
}

/// Login page URL carrying `requested` as the `callbackUrl` to return to.
pub fn login_target(requested: &str) -> String {
    format!(
        "{LOGIN_PATH}?callbackUrl={}",
        urlencoding::encode(requested)
    )
}

/// safe_callback
///
/// Accepts a post-login destination only when it is a path on this origin. Anything
/// else (absolute URLs, protocol-relative `//host`, backslash tricks, control characters
/// that browsers strip before parsing) falls back to the landing page, as do auth pages
/// that would bounce straight back.
pub fn safe_callback(callback: Option<&str>) -> String {
    match callback {
        Some(target)
            if target.starts_with('/')
                && !target.chars().any(|c| c.is_ascii_control())
                && !target.starts_with("//")
                && !target.contains('\\')
                && classify(target.split('?').next().unwrap_or(target))
                    != RouteClass::AuthOnly =>
        {
            target.to_string()
        }
        _ => LANDING_PATH.to_string(),
    }
}

fn requested_target(parts: &Parts) -> String {
    parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| parts.uri.path().to_string())
}

/// edge_filter
///
/// Middleware applied to the whole router. Runs before any handler, resolves the session
/// cookie exactly once, and either redirects (307) or stores the [`ResolvedSession`] in the
/// request extensions and passes through.
pub async fn edge_filter(
    State(config): State<AppConfig>,
    request: Request,
    next: Next,
) -> Response {
    let (mut parts, body) = request.into_parts();

    let resolved = ResolvedSession::from_parts(&parts, &config);
    let class = classify(parts.uri.path());
    let decision = decide(resolved.0.is_some(), class, &requested_target(&parts));

    if let (false, Some(target)) = (decision.allow, decision.target) {
        tracing::debug!(
            path = %parts.uri.path(),
            ?class,
            session = resolved.0.is_some(),
            %target,
            "edge filter redirect"
        );
        return Redirect::temporary(&target).into_response();
    }

    parts.extensions.insert(resolved);
    next.run(Request::from_parts(parts, body)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [RouteClass; 4] = [
        RouteClass::Public,
        RouteClass::AuthOnly,
        RouteClass::Protected,
        RouteClass::AdminOnly,
    ];

    #[test]
    fn anonymous_requests_never_pass_protected_classes() {
        for class in [RouteClass::Protected, RouteClass::AdminOnly] {
            let decision = decide(false, class, "/dashboard");
            assert!(!decision.allow);
            assert!(decision.target.unwrap().starts_with(LOGIN_PATH));
        }
    }

    #[test]
    fn signed_in_users_are_sent_away_from_auth_pages() {
        let decision = decide(true, RouteClass::AuthOnly, "/auth/login");
        assert_eq!(decision, RedirectDecision::redirect(LANDING_PATH));
    }

    #[test]
    fn everything_else_passes() {
        for class in ALL {
            if class != RouteClass::AuthOnly {
                assert_eq!(decide(true, class, "/x"), RedirectDecision::pass());
            }
        }
        assert_eq!(
            decide(false, RouteClass::Public, "/"),
            RedirectDecision::pass()
        );
        assert_eq!(
            decide(false, RouteClass::AuthOnly, "/auth/login"),
            RedirectDecision::pass()
        );
    }

    #[test]
    fn login_target_encodes_requested_path() {
        assert_eq!(
            login_target("/billing?tab=invoices"),
            "/auth/login?callbackUrl=%2Fbilling%3Ftab%3Dinvoices"
        );
    }

    #[test]
    fn callbacks_outside_this_origin_are_replaced() {
        assert_eq!(safe_callback(Some("/billing")), "/billing");
        assert_eq!(safe_callback(Some("https://evil.test")), LANDING_PATH);
        assert_eq!(safe_callback(Some("//evil.test/x")), LANDING_PATH);
        assert_eq!(safe_callback(Some("/\\evil.test")), LANDING_PATH);
        for smuggled in ["/\t/evil.test", "/\n/evil.test", "/\r/evil.test", "/\u{0}x"] {
            assert_eq!(safe_callback(Some(smuggled)), LANDING_PATH, "{smuggled:?}");
        }
        assert_eq!(safe_callback(Some("/auth/login")), LANDING_PATH);
        assert_eq!(safe_callback(None), LANDING_PATH);
    }
}
