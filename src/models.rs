use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::routes::classifier::RouteClass;

// --- Identity ---

/// Role
///
/// The RBAC field carried by every session. Unknown values fail deserialization,
/// which makes a token with a forged role unreadable rather than privileged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    #[default]
    User,
    Moderator,
    Admin,
}

/// Plan
///
/// Subscription tier shown on the billing page and checked by the premium guard.
/// Variants are declared in ascending order; tier checks compare with `>=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Plan {
    #[default]
    Free,
    Pro,
    Premium,
}

/// Session
///
/// The authenticated user context held for the duration of a login. Created on a
/// successful credential exchange and carried inside the signed session cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Session {
    // Subject identifier issued by the backend.
    pub sub: Uuid,
    pub email: String,
    // Display name.
    pub name: String,
    pub role: Role,
    pub email_verified: bool,
    #[serde(default)]
    pub plan: Plan,
    // Elevated admin flag; only meaningful together with `Role::Admin`.
    #[serde(default)]
    pub super_admin: bool,
}

impl Session {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

// --- Request Payloads ---

/// LoginRequest
///
/// Credentials forwarded to the backend's `POST /auth/login`.
/// The password is passed through and never logged.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    /// Page to return to after a successful login. Only same-origin paths are honored.
    #[serde(default, rename = "callbackUrl", skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
}

/// RegisterRequest
///
/// Input payload for account creation, forwarded to the backend's `POST /auth/register`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

// --- Responses ---

/// AuthResponse
///
/// Returned by the login and register endpoints once the session cookie has been set.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct AuthResponse {
    pub session: Session,
    #[ts(type = "string")]
    pub expires: DateTime<Utc>,
    /// Where the client should navigate next.
    pub redirect_to: String,
}

/// SessionResponse
///
/// Body of `GET /api/auth/session` when a session exists. The endpoint answers `null` otherwise.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SessionResponse {
    pub user: Session,
    #[ts(type = "string")]
    pub expires: DateTime<Utc>,
}

/// ErrorBody
///
/// Structured failure returned by the auth API. `error` is a stable machine-readable
/// code and `message` is the inline text shown next to the form.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

/// PageView
///
/// Descriptor returned by page routes. Rendering is the frontend's business; the gate
/// only states which page was served, under which access class, and for whom.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct PageView {
    pub page: String,
    pub access: RouteClass,
    pub session: Option<Session>,
}
