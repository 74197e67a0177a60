use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{LoginRequest, Plan, RegisterRequest, Role, Session};

/// BackendError
///
/// Failures talking to the content-generation backend. Expected outcomes such as wrong
/// credentials are not errors here; they are `Ok(None)` from `login`.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend unreachable: {0}")]
    Network(String),

    #[error("backend answered with status {0}")]
    Status(u16),

    #[error("account already exists")]
    Conflict,

    #[error("unexpected backend payload: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for BackendError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            BackendError::Decode(e.to_string())
        } else {
            BackendError::Network(e.to_string())
        }
    }
}

/// BackendUser
///
/// User record as returned by `POST /auth/login` and `POST /auth/register`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendUser {
    pub id: Uuid,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default, alias = "emailVerified")]
    pub email_verified: bool,
    #[serde(default)]
    pub plan: Plan,
    #[serde(default, alias = "isSuperAdmin")]
    pub is_super_admin: bool,
}

impl From<BackendUser> for Session {
    fn from(user: BackendUser) -> Self {
        // The display name falls back to the local part of the email address.
        let name = user.name.unwrap_or_else(|| {
            user.email
                .split('@')
                .next()
                .unwrap_or_default()
                .to_string()
        });
        Session {
            sub: user.id,
            email: user.email,
            name,
            role: user.role,
            email_verified: user.email_verified,
            plan: user.plan,
            super_admin: user.is_super_admin,
        }
    }
}

/// HealthTarget
///
/// The three health endpoints exposed by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthTarget {
    Api,
    Database,
    Cache,
}

impl HealthTarget {
    pub const ALL: [HealthTarget; 3] = [HealthTarget::Api, HealthTarget::Database, HealthTarget::Cache];

    pub fn path(&self) -> &'static str {
        match self {
            HealthTarget::Api => "/health",
            HealthTarget::Database => "/health/database",
            HealthTarget::Cache => "/health/cache",
        }
    }
}

/// AuthBackend Trait
///
/// Abstract contract for the remote REST API. Handlers and the auth context only see this
/// trait, so tests swap in [`MockBackend`] without a network.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Exchanges credentials for a user. `Ok(None)` means the credentials were rejected.
    async fn login(&self, credentials: &LoginRequest) -> Result<Option<BackendUser>, BackendError>;

    /// Creates an account. `Err(BackendError::Conflict)` when the email is taken.
    async fn register(&self, request: &RegisterRequest) -> Result<BackendUser, BackendError>;

    /// Calls one health endpoint and returns its body on success.
    async fn health(&self, target: HealthTarget) -> Result<String, BackendError>;
}

/// BackendState
///
/// The shared handle stored in `AppState`.
pub type BackendState = Arc<dyn AuthBackend>;

// --- HTTP implementation ---

/// HttpBackend
///
/// reqwest-based client for the backend at `NEXT_PUBLIC_API_URL`.
#[derive(Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Network(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl AuthBackend for HttpBackend {
    async fn login(&self, credentials: &LoginRequest) -> Result<Option<BackendUser>, BackendError> {
        let response = self
            .client
            .post(self.url("/auth/login"))
            .json(&serde_json::json!({
                "email": credentials.email,
                "password": credentials.password,
            }))
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED => Ok(None),
            // The backend answers `null` for unknown credentials on some deployments.
            status if status.is_success() => Ok(response.json::<Option<BackendUser>>().await?),
            status => Err(BackendError::Status(status.as_u16())),
        }
    }

    async fn register(&self, request: &RegisterRequest) -> Result<BackendUser, BackendError> {
        let response = self
            .client
            .post(self.url("/auth/register"))
            .json(request)
            .send()
            .await?;

        match response.status() {
            StatusCode::CONFLICT => Err(BackendError::Conflict),
            status if status.is_success() => Ok(response.json::<BackendUser>().await?),
            status => Err(BackendError::Status(status.as_u16())),
        }
    }

    async fn health(&self, target: HealthTarget) -> Result<String, BackendError> {
        let response = self.client.get(self.url(target.path())).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status(status.as_u16()));
        }
        Ok(response.text().await?)
    }
}

// --- In-memory implementation ---

/// MockBackend
///
/// In-memory stand-in used by tests and local demos. Accounts are keyed by email; the
/// backend can be switched to "unreachable" to exercise network failure paths.
#[derive(Default)]
pub struct MockBackend {
    accounts: Mutex<HashMap<String, (String, BackendUser)>>,
    unreachable: AtomicBool,
    health_calls: AtomicUsize,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an account that `login` will accept with `password`.
    pub fn with_account(self, user: BackendUser, password: &str) -> Self {
        if let Ok(mut accounts) = self.accounts.lock() {
            accounts.insert(user.email.clone(), (password.to_string(), user));
        }
        self
    }

    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    /// Number of health calls received so far.
    pub fn health_calls(&self) -> usize {
        self.health_calls.load(Ordering::SeqCst)
    }

    fn check_reachable(&self) -> Result<(), BackendError> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(BackendError::Network("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl AuthBackend for MockBackend {
    async fn login(&self, credentials: &LoginRequest) -> Result<Option<BackendUser>, BackendError> {
        self.check_reachable()?;
        let accounts = self
            .accounts
            .lock()
            .map_err(|_| BackendError::Status(500))?;
        Ok(accounts
            .get(&credentials.email)
            .filter(|(password, _)| *password == credentials.password)
            .map(|(_, user)| user.clone()))
    }

    async fn register(&self, request: &RegisterRequest) -> Result<BackendUser, BackendError> {
        self.check_reachable()?;
        let mut accounts = self
            .accounts
            .lock()
            .map_err(|_| BackendError::Status(500))?;
        if accounts.contains_key(&request.email) {
            return Err(BackendError::Conflict);
        }
        let user = BackendUser {
            id: Uuid::new_v4(),
            email: request.email.clone(),
            name: Some(request.name.clone()),
            role: Role::User,
            email_verified: false,
            plan: Plan::Free,
            is_super_admin: false,
        };
        accounts.insert(
            request.email.clone(),
            (request.password.clone(), user.clone()),
        );
        Ok(user)
    }

    async fn health(&self, target: HealthTarget) -> Result<String, BackendError> {
        self.health_calls.fetch_add(1, Ordering::SeqCst);
        self.check_reachable()?;
        Ok(format!("{{\"status\":\"ok\",\"target\":\"{}\"}}", target.path()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_user_without_name_uses_email_local_part() {
        let user: BackendUser = serde_json::from_value(serde_json::json!({
            "id": Uuid::from_u128(3),
            "email": "ada@example.com",
            "role": "moderator",
            "emailVerified": true
        }))
        .unwrap();

        let session = Session::from(user);
        assert_eq!(session.name, "ada");
        assert_eq!(session.role, Role::Moderator);
        assert!(session.email_verified);
        assert_eq!(session.plan, Plan::Free);
    }

    #[test]
    fn unknown_role_is_rejected() {
        let parsed = serde_json::from_value::<BackendUser>(serde_json::json!({
            "id": Uuid::from_u128(3),
            "email": "x@example.com",
            "role": "root"
        }));
        assert!(parsed.is_err());
    }

    #[tokio::test]
    async fn mock_register_refuses_duplicates() {
        let backend = MockBackend::new();
        let request = RegisterRequest {
            email: "new@example.com".to_string(),
            password: "pw".to_string(),
            name: "New".to_string(),
        };
        assert!(backend.register(&request).await.is_ok());
        assert!(matches!(
            backend.register(&request).await,
            Err(BackendError::Conflict)
        ));
    }
}
