use thiserror::Error;
use tokio::sync::watch;

use crate::{
    backend::{BackendError, BackendState},
    models::{LoginRequest, RegisterRequest, Session},
    routes::LOGIN_PATH,
    session::{SessionState, SessionStore},
};

/// AuthFailure
///
/// Expected ways a login or registration can fail. The `Display` text is the inline
/// message shown next to the form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthFailure {
    #[error("Invalid email or password.")]
    InvalidCredentials,

    #[error("An account with this email already exists.")]
    DuplicateAccount,

    #[error("Could not reach the server. Please try again.")]
    Network(String),

    #[error("The server could not complete the request. Please try again.")]
    Backend(u16),
}

impl AuthFailure {
    /// Stable machine-readable code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            AuthFailure::InvalidCredentials => "invalid_credentials",
            AuthFailure::DuplicateAccount => "duplicate_account",
            AuthFailure::Network(_) => "network_error",
            AuthFailure::Backend(_) => "backend_error",
        }
    }
}

impl From<BackendError> for AuthFailure {
    fn from(e: BackendError) -> Self {
        match e {
            BackendError::Network(reason) => AuthFailure::Network(reason),
            BackendError::Conflict => AuthFailure::DuplicateAccount,
            BackendError::Status(status) => AuthFailure::Backend(status),
            BackendError::Decode(_) => AuthFailure::Backend(502),
        }
    }
}

/// Navigation
///
/// A client-side navigation requested by an auth operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub to: String,
}

/// AuthContext
///
/// Owns the session store and is its only writer. Everything else reads through
/// [`AuthContext::subscribe`] or the accessors. Created once per application root and
/// passed down explicitly.
pub struct AuthContext {
    backend: BackendState,
    store: SessionStore,
}

impl AuthContext {
    pub fn new(backend: BackendState) -> Self {
        Self {
            backend,
            store: SessionStore::new(),
        }
    }

    /// Builds a context whose first resolution has already happened.
    pub fn resolved(backend: BackendState, session: Option<Session>) -> Self {
        let context = Self::new(backend);
        context.initialize(session);
        context
    }

    /// Completes the initial session resolution. Later calls replace the session.
    pub fn initialize(&self, session: Option<Session>) {
        self.store.set(SessionState::Resolved(session));
    }

    pub fn session(&self) -> Option<Session> {
        self.store.current().session().cloned()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session().is_some()
    }

    pub fn is_initialized(&self) -> bool {
        self.store.current().is_resolved()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.store.subscribe()
    }

    /// login
    ///
    /// Exchanges credentials with the backend. On success the store holds the new session;
    /// on failure the store is left as it was.
    pub async fn login(&self, credentials: &LoginRequest) -> Result<Session, AuthFailure> {
        match self.backend.login(credentials).await {
            Ok(Some(user)) => {
                let session = Session::from(user);
                tracing::info!(sub = %session.sub, role = ?session.role, "login succeeded");
                self.store.set(SessionState::Resolved(Some(session.clone())));
                Ok(session)
            }
            Ok(None) => {
                tracing::info!("login rejected: invalid credentials");
                Err(AuthFailure::InvalidCredentials)
            }
            Err(e) => {
                tracing::warn!(error = %e, "login failed");
                Err(e.into())
            }
        }
    }

    /// register
    ///
    /// Creates the account and signs the new user in.
    pub async fn register(&self, request: &RegisterRequest) -> Result<Session, AuthFailure> {
        match self.backend.register(request).await {
            Ok(user) => {
                let session = Session::from(user);
                tracing::info!(sub = %session.sub, "registration succeeded");
                self.store.set(SessionState::Resolved(Some(session.clone())));
                Ok(session)
            }
            Err(e) => {
                tracing::warn!(error = %e, "registration failed");
                Err(e.into())
            }
        }
    }

    /// logout
    ///
    /// Clears the session and asks for navigation to the login page. Safe to repeat.
    pub fn logout(&self) -> Navigation {
        self.store.set(SessionState::Resolved(None));
        Navigation {
            to: LOGIN_PATH.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        backend::{BackendUser, MockBackend},
        guard::{Guard, GuardInstance, GuardPhase},
        models::{Plan, Role},
        routes::LANDING_PATH,
    };
    use std::sync::Arc;
    use uuid::Uuid;

    fn backend() -> Arc<MockBackend> {
        Arc::new(MockBackend::new().with_account(
            BackendUser {
                id: Uuid::from_u128(42),
                email: "user@example.com".to_string(),
                name: Some("User".to_string()),
                role: Role::User,
                email_verified: true,
                plan: Plan::Free,
                is_super_admin: false,
            },
            "correct-horse",
        ))
    }

    fn credentials(password: &str) -> LoginRequest {
        LoginRequest {
            email: "user@example.com".to_string(),
            password: password.to_string(),
            callback_url: None,
        }
    }

    #[test]
    fn starts_uninitialized() {
        let context = AuthContext::new(backend());
        assert!(!context.is_initialized());
        assert!(!context.is_authenticated());

        context.initialize(None);
        assert!(context.is_initialized());
        assert!(!context.is_authenticated());
    }

    #[tokio::test]
    async fn valid_login_populates_store_and_admin_guard_redirects() {
        let context = AuthContext::resolved(backend(), None);

        let session = context.login(&credentials("correct-horse")).await.unwrap();
        assert_eq!(session.role, Role::User);
        assert_eq!(context.session(), Some(session));

        let mut instance = GuardInstance::mount(Guard::admin(), &context.subscribe());
        let phase = instance.observe(&context.store.current()).clone();
        assert_eq!(phase, GuardPhase::Redirecting(LANDING_PATH.to_string()));
    }

    #[tokio::test]
    async fn invalid_login_leaves_store_empty() {
        let context = AuthContext::resolved(backend(), None);

        let failure = context.login(&credentials("wrong")).await.unwrap_err();
        assert_eq!(failure, AuthFailure::InvalidCredentials);
        assert_eq!(failure.to_string(), "Invalid email or password.");
        assert!(!context.is_authenticated());
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_network_failure() {
        let backend = backend();
        backend.set_unreachable(true);
        let context = AuthContext::resolved(backend, None);

        let failure = context.login(&credentials("correct-horse")).await.unwrap_err();
        assert!(matches!(failure, AuthFailure::Network(_)));
        assert_eq!(failure.code(), "network_error");
    }

    #[tokio::test]
    async fn duplicate_registration_is_reported() {
        let context = AuthContext::resolved(backend(), None);
        let request = RegisterRequest {
            email: "user@example.com".to_string(),
            password: "pw".to_string(),
            name: "Dup".to_string(),
        };

        assert_eq!(
            context.register(&request).await.unwrap_err(),
            AuthFailure::DuplicateAccount
        );
    }

    #[tokio::test]
    async fn registration_signs_the_user_in() {
        let context = AuthContext::resolved(backend(), None);
        let request = RegisterRequest {
            email: "fresh@example.com".to_string(),
            password: "pw".to_string(),
            name: "Fresh".to_string(),
        };

        let session = context.register(&request).await.unwrap();
        assert_eq!(session.name, "Fresh");
        assert!(context.is_authenticated());
    }

    #[tokio::test]
    async fn logout_twice_is_harmless() {
        let context = AuthContext::resolved(backend(), None);
        context.login(&credentials("correct-horse")).await.unwrap();

        for _ in 0..2 {
            let navigation = context.logout();
            assert_eq!(navigation.to, LOGIN_PATH);
            assert!(context.session().is_none());
            assert!(context.is_initialized());
        }
    }
}
