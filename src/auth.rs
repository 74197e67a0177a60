use std::convert::Infallible;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use chrono::{DateTime, TimeZone, Utc};

use crate::{config::AppConfig, models::Session, session};

/// ActiveSession
///
/// A verified session together with the instant its token expires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveSession {
    pub session: Session,
    pub expires: DateTime<Utc>,
}

/// ResolvedSession Extractor Result
///
/// The outcome of session resolution for one request: `Some` for a valid cookie, `None`
/// for anything else. Inserted into request extensions by the edge filter so that guards
/// and handlers downstream reuse the same answer.
#[derive(Debug, Clone, Default)]
pub struct ResolvedSession(pub Option<ActiveSession>);

impl ResolvedSession {
    /// Verifies the session cookie carried by `parts`.
    pub fn from_parts(parts: &Parts, config: &AppConfig) -> Self {
        let active = session::resolve_session(&parts.headers, config).and_then(|claims| {
            let expires = i64::try_from(claims.exp)
                .ok()
                .and_then(|exp| Utc.timestamp_opt(exp, 0).single())?;
            Some(ActiveSession {
                session: claims.session,
                expires,
            })
        });
        Self(active)
    }

    pub fn session(&self) -> Option<&Session> {
        self.0.as_ref().map(|active| &active.session)
    }

    pub fn into_session(self) -> Option<Session> {
        self.0.map(|active| active.session)
    }
}

/// ResolvedSession Extractor Implementation
///
/// Never rejects. Uses the answer the edge filter already stored when present and
/// resolves the cookie itself otherwise, so handlers mounted outside the filter behave
/// the same way.
impl<S> FromRequestParts<S> for ResolvedSession
where
    S: Send + Sync,
    AppConfig: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(resolved) = parts.extensions.get::<ResolvedSession>() {
            return Ok(resolved.clone());
        }

        let config = AppConfig::from_ref(state);
        Ok(Self::from_parts(parts, &config))
    }
}
