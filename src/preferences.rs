use axum::http::HeaderMap;
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;
use utoipa::ToSchema;

use crate::cookies::CookieSpec;

pub const LOCALE_KEY: &str = "locale";
pub const THEME_KEY: &str = "theme";

pub const DEFAULT_LOCALE: &str = "en";

/// One year.
pub const PREFERENCE_MAX_AGE_SECS: i64 = 365 * 24 * 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::System => "system",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            "system" => Some(Theme::System),
            _ => None,
        }
    }
}

/// Preferences
///
/// The two client-side preference keys the product persists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Preferences {
    pub locale: String,
    pub theme: Theme,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            locale: DEFAULT_LOCALE.to_string(),
            theme: Theme::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreferenceError {
    #[error("unsupported locale tag: {0}")]
    InvalidLocale(String),
}

/// Accepts `xx` or `xx-YY` (language, optional region).
pub fn validate_locale(tag: &str) -> Result<(), PreferenceError> {
    let valid = match tag.split_once('-') {
        None => is_language(tag),
        Some((language, region)) => {
            is_language(language)
                && region.len() == 2
                && region.chars().all(|c| c.is_ascii_uppercase())
        }
    };

    if valid {
        Ok(())
    } else {
        Err(PreferenceError::InvalidLocale(tag.to_string()))
    }
}

fn is_language(part: &str) -> bool {
    part.len() == 2 && part.chars().all(|c| c.is_ascii_lowercase())
}

impl Preferences {
    /// Reads both keys from cookies. Missing or invalid values fall back to defaults.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let defaults = Self::default();
        let jar = CookieJar::from_headers(headers);
        Self {
            locale: jar
                .get(LOCALE_KEY)
                .map(Cookie::value)
                .filter(|tag| validate_locale(tag).is_ok())
                .map(str::to_string)
                .unwrap_or(defaults.locale),
            theme: jar
                .get(THEME_KEY)
                .map(Cookie::value)
                .and_then(Theme::parse)
                .unwrap_or(defaults.theme),
        }
    }

    pub fn validate(&self) -> Result<(), PreferenceError> {
        validate_locale(&self.locale)
    }

    pub fn cookie_spec(secure: bool) -> CookieSpec {
        CookieSpec {
            max_age_secs: PREFERENCE_MAX_AGE_SECS,
            // The frontend reads these to pick the catalog and color scheme before hydration.
            http_only: false,
            secure,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, header};

    #[test]
    fn locale_tags() {
        assert!(validate_locale("en").is_ok());
        assert!(validate_locale("pt-BR").is_ok());
        assert!(validate_locale("EN").is_err());
        assert!(validate_locale("en-us").is_err());
        assert!(validate_locale("en;Path=/").is_err());
        assert!(validate_locale("").is_err());
    }

    #[test]
    fn cookies_override_defaults_when_valid() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("locale=de; theme=neon"),
        );

        let prefs = Preferences::from_headers(&headers);
        assert_eq!(prefs.locale, "de");
        assert_eq!(prefs.theme, Theme::System);
    }
}
