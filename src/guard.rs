use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
};
use tokio::sync::watch;

use crate::{
    auth::ResolvedSession,
    models::{Plan, Role, Session},
    routes::{LANDING_PATH, LOGIN_PATH, VERIFY_EMAIL_PATH},
    session::SessionState,
};

/// RolePredicate
///
/// The value a role guard is parameterized with. Every named role guard (moderator,
/// admin, super admin, premium) is one of these, not a separate type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RolePredicate {
    /// The session's role is one of the listed roles.
    AnyOf(Vec<Role>),
    /// Admin role plus the `super_admin` flag.
    SuperAdmin,
    /// The session's plan is at least this tier.
    PlanAtLeast(Plan),
}

impl RolePredicate {
    pub fn admits(&self, session: &Session) -> bool {
        match self {
            RolePredicate::AnyOf(roles) => roles.contains(&session.role),
            RolePredicate::SuperAdmin => session.is_admin() && session.super_admin,
            RolePredicate::PlanAtLeast(plan) => session.plan >= *plan,
        }
    }
}

/// Capability
///
/// One precondition a guard enforces before its content may render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capability {
    RequireAuth,
    RequireGuest,
    RequireRole(RolePredicate),
    RequireEmailVerified,
}

impl Capability {
    fn is_met(&self, session: Option<&Session>) -> bool {
        match (self, session) {
            (Capability::RequireAuth, session) => session.is_some(),
            (Capability::RequireGuest, session) => session.is_none(),
            (Capability::RequireRole(predicate), Some(session)) => predicate.admits(session),
            (Capability::RequireEmailVerified, Some(session)) => session.email_verified,
            (Capability::RequireRole(_) | Capability::RequireEmailVerified, None) => false,
        }
    }

    fn default_target(&self) -> &'static str {
        match self {
            Capability::RequireAuth => LOGIN_PATH,
            Capability::RequireGuest | Capability::RequireRole(_) => LANDING_PATH,
            Capability::RequireEmailVerified => VERIFY_EMAIL_PATH,
        }
    }
}

/// Verdict
///
/// Result of checking a resolved session against a guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    /// Navigate away to the given path.
    Redirect(String),
    /// Render the supplied fallback node in place of the content.
    Fallback(String),
}

/// Guard
///
/// A single parameterized access guard. Capabilities are checked in order and the first
/// unmet one decides where the user goes:
/// - a supplied fallback node always wins over navigation;
/// - otherwise an unmet `RequireAuth` goes to the login page;
/// - any other unmet capability goes to the configured redirect, or its own default
///   (landing page for guest/role, verification page for email).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guard {
    name: &'static str,
    capabilities: Vec<Capability>,
    redirect_to: Option<String>,
    fallback: Option<String>,
}

impl Guard {
    pub fn new(name: &'static str, capabilities: Vec<Capability>) -> Self {
        Self {
            name,
            capabilities,
            redirect_to: None,
            fallback: None,
        }
    }

    pub fn auth() -> Self {
        Self::new("auth", vec![Capability::RequireAuth])
    }

    pub fn guest() -> Self {
        Self::new("guest", vec![Capability::RequireGuest])
    }

    pub fn role(roles: impl Into<Vec<Role>>) -> Self {
        Self::role_predicate("role", RolePredicate::AnyOf(roles.into()))
    }

    pub fn moderator() -> Self {
        Self::role_predicate(
            "moderator",
            RolePredicate::AnyOf(vec![Role::Moderator, Role::Admin]),
        )
    }

    pub fn admin() -> Self {
        Self::role_predicate("admin", RolePredicate::AnyOf(vec![Role::Admin]))
    }

    pub fn super_admin() -> Self {
        Self::role_predicate("super_admin", RolePredicate::SuperAdmin)
    }

    pub fn premium() -> Self {
        Self::role_predicate("premium", RolePredicate::PlanAtLeast(Plan::Premium))
    }

    pub fn email_verified() -> Self {
        Self::new(
            "email_verified",
            vec![Capability::RequireAuth, Capability::RequireEmailVerified],
        )
    }

    fn role_predicate(name: &'static str, predicate: RolePredicate) -> Self {
        Self::new(
            name,
            vec![Capability::RequireAuth, Capability::RequireRole(predicate)],
        )
    }

    /// Adds another precondition, checked after the existing ones.
    pub fn and(mut self, capability: Capability) -> Self {
        self.capabilities.push(capability);
        self
    }

    pub fn redirect_to(mut self, path: impl Into<String>) -> Self {
        self.redirect_to = Some(path.into());
        self
    }

    pub fn with_fallback(mut self, node: impl Into<String>) -> Self {
        self.fallback = Some(node.into());
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// check
    ///
    /// Evaluates a resolved session. `None` means no session, whatever the reason.
    pub fn check(&self, session: Option<&Session>) -> Verdict {
        let Some(unmet) = self.capabilities.iter().find(|c| !c.is_met(session)) else {
            return Verdict::Allow;
        };

        if let Some(node) = &self.fallback {
            return Verdict::Fallback(node.clone());
        }

        let target = match (unmet, &self.redirect_to) {
            (Capability::RequireAuth, _) | (_, None) => unmet.default_target().to_string(),
            (_, Some(configured)) => configured.clone(),
        };
        Verdict::Redirect(target)
    }

    /// Evaluates any session state; `Resolving` keeps the guard pending.
    pub fn evaluate(&self, state: &SessionState) -> GuardPhase {
        match state {
            SessionState::Resolving => GuardPhase::Resolving,
            SessionState::Resolved(session) => self.check(session.as_ref()).into(),
        }
    }
}

// --- Client-side state machine ---

/// GuardPhase
///
/// Lifecycle of a mounted guard: `Resolving → Allowed | Redirecting | ShowingFallback`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardPhase {
    Resolving,
    Allowed,
    Redirecting(String),
    ShowingFallback(String),
}

impl From<Verdict> for GuardPhase {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Allow => GuardPhase::Allowed,
            Verdict::Redirect(target) => GuardPhase::Redirecting(target),
            Verdict::Fallback(node) => GuardPhase::ShowingFallback(node),
        }
    }
}

/// What a guard instance puts on screen in its current phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Render<'a> {
    Loading,
    Content,
    Fallback(&'a str),
    Nothing,
}

impl GuardPhase {
    pub fn render(&self) -> Render<'_> {
        match self {
            GuardPhase::Resolving => Render::Loading,
            GuardPhase::Allowed => Render::Content,
            GuardPhase::ShowingFallback(node) => Render::Fallback(node),
            GuardPhase::Redirecting(_) => Render::Nothing,
        }
    }

    /// The navigation requested by this phase, if any.
    pub fn navigation(&self) -> Option<&str> {
        match self {
            GuardPhase::Redirecting(target) => Some(target),
            _ => None,
        }
    }
}

/// GuardInstance
///
/// One mounted guard following the session store. Content never renders while the
/// session is resolving. Once a redirect has been issued the instance is done; an
/// allowed instance keeps re-checking so that, for example, a logout elsewhere in the
/// tree sends it to the login page.
#[derive(Debug, Clone)]
pub struct GuardInstance {
    guard: Guard,
    phase: GuardPhase,
}

impl GuardInstance {
    /// Mounts `guard` against the store's current state.
    pub fn mount(guard: Guard, store: &watch::Receiver<SessionState>) -> Self {
        let phase = guard.evaluate(&store.borrow());
        Self { guard, phase }
    }

    pub fn phase(&self) -> &GuardPhase {
        &self.phase
    }

    /// Feeds a new session state into the instance.
    pub fn observe(&mut self, state: &SessionState) -> &GuardPhase {
        match self.phase {
            GuardPhase::Redirecting(_) => {}
            _ => {
                let next = self.guard.evaluate(state);
                if next != self.phase {
                    tracing::debug!(guard = self.guard.name(), phase = ?next, "guard transition");
                }
                self.phase = next;
            }
        }
        &self.phase
    }

    /// settle
    ///
    /// Waits for the first session resolution. If the store goes away before resolving,
    /// the guard treats it as no session.
    pub async fn settle(&mut self, store: &mut watch::Receiver<SessionState>) -> &GuardPhase {
        let state = match store.wait_for(SessionState::is_resolved).await {
            Ok(state) => state.clone(),
            Err(_) => SessionState::Resolved(None),
        };
        self.observe(&state)
    }

    /// Waits for the next store change and re-evaluates. Returns `None` once the store is closed.
    pub async fn next_change(
        &mut self,
        store: &mut watch::Receiver<SessionState>,
    ) -> Option<&GuardPhase> {
        store.changed().await.ok()?;
        let state = store.borrow_and_update().clone();
        Some(self.observe(&state))
    }
}

// --- Server-side enforcement ---

/// enforce
///
/// Route-layer middleware applying `guard` to the session the edge filter resolved.
/// Role and verification failures redirect silently; a guard with a fallback node answers
/// 403 with that node as the body.
pub async fn enforce(State(guard): State<Guard>, request: Request, next: Next) -> Response {
    let resolved = request
        .extensions()
        .get::<ResolvedSession>()
        .cloned()
        .unwrap_or_default();

    match guard.check(resolved.session()) {
        Verdict::Allow => next.run(request).await,
        Verdict::Redirect(target) => {
            tracing::debug!(guard = guard.name(), path = %request.uri().path(), %target, "guard redirect");
            Redirect::temporary(&target).into_response()
        }
        Verdict::Fallback(node) => (StatusCode::FORBIDDEN, Html(node)).into_response(),
    }
}
