use axum::http::HeaderMap;
use axum_extra::extract::cookie::CookieJar;
use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;

use crate::{
    config::{AppConfig, Env},
    cookies::CookieSpec,
    models::Session,
};

/// Fixed session lifetime: 30 days.
pub const SESSION_MAX_AGE_SECS: i64 = 30 * 24 * 60 * 60;

pub const SESSION_COOKIE: &str = "next-auth.session-token";
pub const SECURE_SESSION_COOKIE: &str = "__Secure-next-auth.session-token";

// --- Token Codec ---

/// Claims
///
/// Payload of the signed session cookie: the session itself plus the standard
/// issued-at and expiry timestamps (seconds since epoch).
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    #[serde(flatten)]
    pub session: Session,
    pub iat: u64,
    pub exp: u64,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("session token rejected: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),

    #[error("session expiry out of range")]
    ExpiryOutOfRange,
}

/// IssuedSession
///
/// A freshly signed token together with the instant it stops being accepted.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub expires: DateTime<Utc>,
}

/// issue_token
///
/// Signs `session` with HS256 using `secret`, valid for [`SESSION_MAX_AGE_SECS`] from `now`.
pub fn issue_token(
    session: &Session,
    secret: &str,
    now: DateTime<Utc>,
) -> Result<IssuedSession, TokenError> {
    let iat = now.timestamp();
    let exp = iat + SESSION_MAX_AGE_SECS;
    let expires = Utc
        .timestamp_opt(exp, 0)
        .single()
        .ok_or(TokenError::ExpiryOutOfRange)?;

    let claims = Claims {
        session: session.clone(),
        iat: u64::try_from(iat).map_err(|_| TokenError::ExpiryOutOfRange)?,
        exp: u64::try_from(exp).map_err(|_| TokenError::ExpiryOutOfRange)?,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(IssuedSession { token, expires })
}

/// verify_token
///
/// Checks the signature and expiry of `token` and returns its claims.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, TokenError> {
    let mut validation = Validation::default();
    validation.validate_exp = true;

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;
    Ok(data.claims)
}

/// Name of the session cookie for the configured environment.
pub fn cookie_name(config: &AppConfig) -> &'static str {
    match config.env {
        Env::Production => SECURE_SESSION_COOKIE,
        Env::Local => SESSION_COOKIE,
    }
}

/// Attributes of the session cookie for the configured environment.
pub fn cookie_spec(config: &AppConfig) -> CookieSpec {
    CookieSpec {
        max_age_secs: SESSION_MAX_AGE_SECS,
        http_only: true,
        secure: config.secure_cookies(),
    }
}

/// resolve_session
///
/// Reads the session cookie from `headers` and verifies it. Any failure (missing cookie,
/// bad signature, malformed payload, expiry) resolves to `None`.
pub fn resolve_session(headers: &HeaderMap, config: &AppConfig) -> Option<Claims> {
    let jar = CookieJar::from_headers(headers);
    let token = jar.get(cookie_name(config))?;

    match verify_token(token.value(), &config.auth_secret) {
        Ok(claims) => Some(claims),
        Err(e) => {
            tracing::debug!(error = %e, "ignoring unusable session cookie");
            None
        }
    }
}

// --- Session Store ---

/// SessionState
///
/// What the application currently knows about the session. `Resolving` lasts until the
/// first resolution completes and never comes back afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Resolving,
    Resolved(Option<Session>),
}

impl SessionState {
    pub fn is_resolved(&self) -> bool {
        matches!(self, SessionState::Resolved(_))
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionState::Resolved(session) => session.as_ref(),
            SessionState::Resolving => None,
        }
    }
}

/// SessionStore
///
/// Holds the single current [`SessionState`]. The store is not `Clone`: whoever owns it is
/// the only writer, everyone else observes it through [`SessionStore::subscribe`].
#[derive(Debug)]
pub struct SessionStore {
    tx: watch::Sender<SessionState>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(SessionState::Resolving);
        Self { tx }
    }

    pub fn current(&self) -> SessionState {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.tx.subscribe()
    }

    /// Replaces the state and wakes every subscriber, even when nobody is listening yet.
    pub(crate) fn set(&self, state: SessionState) {
        self.tx.send_replace(state);
    }
}
