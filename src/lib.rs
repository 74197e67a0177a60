use axum::{
    Router,
    extract::FromRef,
    http::HeaderName,
    middleware,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Access decisions.
pub mod auth;
pub mod filter;
pub mod guard;
pub mod session;

// Session ownership and the backend it talks to.
pub mod auth_context;
pub mod backend;
pub mod health;

// HTTP surface and supporting types.
pub mod config;
pub mod cookies;
pub mod handlers;
pub mod models;
pub mod preferences;

// Route groups by access class, plus the classifier table.
pub mod routes;
use routes::{admin, auth_only, protected, public};

// --- Public Re-exports ---

pub use auth_context::{AuthContext, AuthFailure};
pub use backend::{BackendState, HttpBackend, MockBackend};
pub use config::AppConfig;
pub use guard::Guard;
pub use health::ConnectionMonitor;

/// ApiDoc
///
/// OpenAPI description of the gate's JSON endpoints, served at `/api-docs/openapi.json`.
/// Page routes are left out; they only describe themselves.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::login, handlers::register, handlers::logout, handlers::get_session,
        handlers::connection_status, handlers::get_preferences, handlers::update_preferences
    ),
    components(
        schemas(
            models::Session, models::Role, models::Plan, models::LoginRequest,
            models::RegisterRequest, models::AuthResponse, models::SessionResponse,
            models::ErrorBody, models::PageView, routes::classifier::RouteClass,
            health::ConnectionStatus, backend::HealthTarget,
            preferences::Preferences, preferences::Theme,
        )
    ),
    tags(
        (name = "content-gate", description = "Route-access gate for the content studio")
    )
)]
struct ApiDoc;

/// AppState
///
/// Shared, immutable container for everything handlers need. Per-user session state is
/// never stored here; it travels with each request.
#[derive(Clone)]
pub struct AppState {
    /// Loaded environment configuration.
    pub config: AppConfig,
    /// Client for the remote REST API.
    pub backend: BackendState,
    /// Connection test over the backend health endpoints.
    pub monitor: ConnectionMonitor,
}

impl AppState {
    /// Assembles the state, deriving the connection monitor from `backend`.
    pub fn new(config: AppConfig, backend: BackendState) -> Self {
        let monitor = ConnectionMonitor::new(backend.clone(), config.health_retry_delay);
        Self {
            config,
            backend,
            monitor,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

impl FromRef<AppState> for BackendState {
    fn from_ref(app_state: &AppState) -> BackendState {
        app_state.backend.clone()
    }
}

/// create_router
///
/// Assembles every route group, puts the edge filter in front of all of them, and wraps
/// the result in the request-id, tracing and CORS layers.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(auth_only::auth_only_routes())
        .merge(protected::protected_routes())
        .merge(admin::admin_routes())
        .fallback(handlers::not_found)
        // Edge filter: runs before every handler and guard layer above.
        .layer(middleware::from_fn_with_state(
            state.config.clone(),
            filter::edge_filter,
        ))
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(
                    x_request_id.clone(),
                    MakeRequestUuid,
                ))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Opens the per-request span, tagged with the `x-request-id` set by the layer above it.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        path = %request.uri().path(),
        req_id = %request_id,
    )
}
