use std::{env, time::Duration};

/// AppConfig
///
/// Holds the gate's entire configuration state. Loaded once at startup and shared
/// immutably through `AppState`, from which handlers and extractors pull it via FromRef.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Base URL of the content-generation backend (NEXT_PUBLIC_API_URL).
    pub api_url: String,
    // Key used to sign and verify session tokens (NEXTAUTH_SECRET).
    pub auth_secret: String,
    // Public origin of this gate (NEXTAUTH_URL). Decides whether cookies are marked Secure.
    pub auth_url: String,
    // Runtime environment marker. Controls log format and cookie naming.
    pub env: Env,
    // Socket address the HTTP server binds to.
    pub bind_addr: String,
    // Pause between automatic health-check retries.
    pub health_retry_delay: Duration,
    // Timeout applied to every outbound backend call.
    pub backend_timeout: Duration,
}

/// Env
///
/// Defines the runtime context. Local relaxes secrets to development fallbacks,
/// Production demands every secret and hardens the session cookie.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

const LOCAL_AUTH_SECRET: &str = "local-development-session-secret-value";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_HEALTH_RETRY_DELAY_MS: u64 = 1000;

impl Default for AppConfig {
    /// Safe, non-panicking configuration used for test state scaffolding.
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000".to_string(),
            auth_secret: LOCAL_AUTH_SECRET.to_string(),
            auth_url: "http://localhost:3000".to_string(),
            env: Env::Local,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            health_retry_delay: Duration::from_millis(DEFAULT_HEALTH_RETRY_DELAY_MS),
            backend_timeout: Duration::from_secs(10),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables and fails fast.
    ///
    /// # Panics
    /// Panics in production if `NEXTAUTH_SECRET`, `NEXT_PUBLIC_API_URL` or `NEXTAUTH_URL`
    /// is missing.
    pub fn load() -> Self {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let defaults = Self::default();

        let (auth_secret, api_url, auth_url) = match env {
            Env::Production => (
                env::var("NEXTAUTH_SECRET")
                    .expect("FATAL: NEXTAUTH_SECRET must be set in production."),
                env::var("NEXT_PUBLIC_API_URL")
                    .expect("FATAL: NEXT_PUBLIC_API_URL must be set in production."),
                env::var("NEXTAUTH_URL").expect("FATAL: NEXTAUTH_URL must be set in production."),
            ),
            Env::Local => (
                env::var("NEXTAUTH_SECRET").unwrap_or(defaults.auth_secret),
                env::var("NEXT_PUBLIC_API_URL").unwrap_or(defaults.api_url),
                env::var("NEXTAUTH_URL").unwrap_or(defaults.auth_url),
            ),
        };

        let health_retry_delay = env::var("HEALTH_RETRY_DELAY_MS")
            .ok()
            .and_then(|raw| raw.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.health_retry_delay);

        Self {
            // Endpoint paths are joined with a leading slash.
            api_url: api_url.trim_end_matches('/').to_string(),
            auth_secret,
            auth_url,
            env,
            bind_addr: env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            health_retry_delay,
            backend_timeout: defaults.backend_timeout,
        }
    }

    /// Whether session and preference cookies must carry the `Secure` attribute.
    pub fn secure_cookies(&self) -> bool {
        self.env == Env::Production || self.auth_url.starts_with("https://")
    }
}
