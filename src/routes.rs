//! Router configuration.
//!
//! Every request passes `resolve_session` and then `route_gate` before it
//! reaches a handler or the static page fallback.

use std::any::Any;

use axum::{
    http::{StatusCode, Uri},
    middleware::from_fn_with_state,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any as AnyOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    services::ServeDir,
    trace::TraceLayer,
};

use crate::error::{ApiError, GENERIC_FAILURE};
use crate::handlers::{self, protected, public};
use crate::middleware::{resolve_session, route_gate};
use crate::state::AppState;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /` - Service identity
/// - `GET /health` - Store connectivity
/// - `POST /api/auth/register` - Create account, welcome credits and workspace
/// - `POST /api/auth/login` - Start a session
/// - `POST /api/auth/logout` - End a session
/// - `GET /api/auth/session` - Inspect the current session
///
/// ## Protected (session required)
/// - `GET /api/dashboard/overview`
/// - `GET /api/credits/transactions`
/// - `GET /api/workspaces`
///
/// Anything else falls through to the static page directory when one is
/// configured, otherwise a JSON 404.
pub fn create_router(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.security.cors_origins);
    let max_body_bytes = state.config.api.max_request_size_bytes;

    let router = Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        // Public auth
        .route("/api/auth/register", post(public::auth::register))
        .route("/api/auth/login", post(public::auth::login))
        .route("/api/auth/logout", post(public::auth::logout))
        .route("/api/auth/session", get(public::auth::current_session))
        // Protected API
        .route("/api/dashboard/overview", get(protected::overview))
        .route("/api/credits/transactions", get(protected::credit_transactions))
        .route("/api/workspaces", get(protected::list_workspaces));

    let router = match state.config.api.static_dir.as_deref() {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router.fallback(not_found),
    };

    // Each layer wraps everything added before it: requests pass trace, CORS,
    // body limit, panic guard, resolve_session, then route_gate
    router
        .layer(from_fn_with_state(state.clone(), route_gate))
        .layer(from_fn_with_state(state.clone(), resolve_session))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(AnyOrigin)
            .allow_methods(AnyOrigin)
            .allow_headers(AnyOrigin)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        // Credentialed requests carry the session cookie, which rules out wildcards
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers([axum::http::header::CONTENT_TYPE, axum::http::header::AUTHORIZATION])
            .allow_credentials(true)
    }
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found(format!("No route for {}", uri.path()))
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!("Request handler panicked: {}", detail);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiError::internal_server_error(GENERIC_FAILURE).to_json()),
    )
        .into_response()
}
