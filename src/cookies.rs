use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration;

/// CookieSpec
///
/// Attributes of a cookie issued by the gate. Every cookie is scoped to `/` and
/// `SameSite=Lax` so that it survives top-level navigations from email links.
#[derive(Debug, Clone, Copy)]
pub struct CookieSpec {
    pub max_age_secs: i64,
    pub http_only: bool,
    pub secure: bool,
}

impl CookieSpec {
    /// Builds the cookie that stores `name=value`.
    pub fn build(&self, name: &'static str, value: impl Into<String>) -> Cookie<'static> {
        Cookie::build((name, value.into()))
            .path("/")
            .http_only(self.http_only)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .max_age(Duration::seconds(self.max_age_secs))
            .build()
    }

    /// Builds the cookie that removes `name` from the browser.
    pub fn removal(&self, name: &'static str) -> Cookie<'static> {
        Self {
            max_age_secs: 0,
            ..*self
        }
        .build(name, "")
    }
}
