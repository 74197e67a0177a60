use axum::{
    Json,
    extract::State,
    http::{StatusCode, Uri},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;

use crate::{
    AppState,
    auth::ResolvedSession,
    auth_context::{AuthContext, AuthFailure},
    filter::safe_callback,
    health::ConnectionStatus,
    models::{
        AuthResponse, ErrorBody, LoginRequest, PageView, RegisterRequest, Session,
        SessionResponse,
    },
    preferences::{LOCALE_KEY, Preferences, THEME_KEY},
    routes::{LANDING_PATH, VERIFY_EMAIL_PATH, classifier::classify},
    session,
};

// --- Error Mapping ---

impl IntoResponse for AuthFailure {
    fn into_response(self) -> Response {
        let status = match self {
            AuthFailure::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthFailure::DuplicateAccount => StatusCode::CONFLICT,
            AuthFailure::Network(_) => StatusCode::SERVICE_UNAVAILABLE,
            AuthFailure::Backend(_) => StatusCode::BAD_GATEWAY,
        };
        let body = ErrorBody {
            error: self.code().to_string(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

// --- Pages ---

/// serve_page
///
/// [Any Route] Describes the page at the requested path. By the time this runs the edge
/// filter and any guard layer have already accepted the request.
pub async fn serve_page(uri: Uri, resolved: ResolvedSession) -> Json<PageView> {
    let path = uri.path();
    Json(PageView {
        page: path.to_string(),
        access: classify(path),
        session: resolved.into_session(),
    })
}

/// Unknown paths. Only reached once the edge filter has let the request through.
pub async fn not_found(uri: Uri) -> Response {
    let body = ErrorBody {
        error: "not_found".to_string(),
        message: format!("No page at {}", uri.path()),
    };
    (StatusCode::NOT_FOUND, Json(body)).into_response()
}

// --- Auth API ---

/// Signs `session`, sets the cookie and answers with the session summary.
fn session_established(state: &AppState, session: Session, redirect_to: String) -> Response {
    let issued = match session::issue_token(&session, &state.config.auth_secret, Utc::now()) {
        Ok(issued) => issued,
        Err(e) => {
            tracing::error!(error = %e, "failed to sign session token");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let cookie =
        session::cookie_spec(&state.config).build(session::cookie_name(&state.config), issued.token);

    let body = AuthResponse {
        session,
        expires: issued.expires,
        redirect_to,
    };
    (CookieJar::new().add(cookie), Json(body)).into_response()
}

/// login
///
/// [Public Route] Exchanges credentials with the backend and starts a 30-day session.
/// Wrong credentials answer 401 with an inline message and set no cookie.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = AuthResponse),
        (status = 401, description = "Invalid credentials", body = ErrorBody),
        (status = 502, description = "Backend error", body = ErrorBody),
        (status = 503, description = "Backend unreachable", body = ErrorBody)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    resolved: ResolvedSession,
    Json(payload): Json<LoginRequest>,
) -> Response {
    let context = AuthContext::resolved(state.backend.clone(), resolved.into_session());

    match context.login(&payload).await {
        Ok(session) => {
            let redirect_to = safe_callback(payload.callback_url.as_deref());
            session_established(&state, session, redirect_to)
        }
        Err(failure) => failure.into_response(),
    }
}

/// register
///
/// [Public Route] Creates an account and signs the new user in. Unverified accounts are
/// pointed at the email verification page.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Registered", body = AuthResponse),
        (status = 409, description = "Duplicate account", body = ErrorBody),
        (status = 502, description = "Backend error", body = ErrorBody),
        (status = 503, description = "Backend unreachable", body = ErrorBody)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Response {
    let context = AuthContext::resolved(state.backend.clone(), None);

    match context.register(&payload).await {
        Ok(session) => {
            let redirect_to = if session.email_verified {
                LANDING_PATH
            } else {
                VERIFY_EMAIL_PATH
            };
            session_established(&state, session, redirect_to.to_string())
        }
        Err(failure) => failure.into_response(),
    }
}

/// logout
///
/// [Public Route] Clears the session cookie and sends the browser to the login page.
/// Calling it without a session does the same thing.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses((status = 303, description = "Redirect to login"))
)]
pub async fn logout(State(state): State<AppState>, resolved: ResolvedSession) -> Response {
    let context = AuthContext::resolved(state.backend.clone(), resolved.into_session());
    let navigation = context.logout();

    let cleared = session::cookie_spec(&state.config).removal(session::cookie_name(&state.config));
    (CookieJar::new().add(cleared), Redirect::to(&navigation.to)).into_response()
}

/// get_session
///
/// [Public Route] Returns the current session with its expiry, or `null`.
#[utoipa::path(
    get,
    path = "/api/auth/session",
    responses((status = 200, description = "Current session or null", body = SessionResponse))
)]
pub async fn get_session(resolved: ResolvedSession) -> Json<Option<SessionResponse>> {
    Json(resolved.0.map(|active| SessionResponse {
        user: active.session,
        expires: active.expires,
    }))
}

// --- Connection Test ---

/// connection_status
///
/// [Public Route] Runs the connection test against every backend health endpoint,
/// retrying each one before reporting it disconnected.
#[utoipa::path(
    get,
    path = "/api/health/connection",
    responses((status = 200, description = "Per-endpoint status", body = [ConnectionStatus]))
)]
pub async fn connection_status(State(state): State<AppState>) -> Json<Vec<ConnectionStatus>> {
    Json(state.monitor.check_all().await)
}

// --- Preferences ---

/// get_preferences
///
/// [Public Route] Reads the locale and theme preference cookies.
#[utoipa::path(
    get,
    path = "/api/preferences",
    responses((status = 200, description = "Preferences", body = Preferences))
)]
pub async fn get_preferences(headers: axum::http::HeaderMap) -> Json<Preferences> {
    Json(Preferences::from_headers(&headers))
}

/// update_preferences
///
/// [Public Route] Validates and stores both preference cookies.
#[utoipa::path(
    put,
    path = "/api/preferences",
    request_body = Preferences,
    responses(
        (status = 200, description = "Stored", body = Preferences),
        (status = 400, description = "Invalid locale", body = ErrorBody)
    )
)]
pub async fn update_preferences(
    State(state): State<AppState>,
    Json(payload): Json<Preferences>,
) -> Response {
    if let Err(e) = payload.validate() {
        let body = ErrorBody {
            error: "invalid_preferences".to_string(),
            message: e.to_string(),
        };
        return (StatusCode::BAD_REQUEST, Json(body)).into_response();
    }

    let spec = Preferences::cookie_spec(state.config.secure_cookies());
    let jar = CookieJar::new()
        .add(spec.build(LOCALE_KEY, payload.locale.clone()))
        .add(spec.build(THEME_KEY, payload.theme.as_str()));

    (jar, Json(payload)).into_response()
}
