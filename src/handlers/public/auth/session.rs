// handlers/public/auth/session.rs - POST /api/auth/login, POST /api/auth/logout, GET /api/auth/session

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{AppendHeaders, IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::database::models::UserSummary;
use crate::error::ApiError;
use crate::middleware::session::{clear_session_cookie, session_cookie};
use crate::middleware::{ApiResponse, SessionContext};
use crate::state::AppState;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: UserSummary,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// POST /api/auth/login - Verify credentials and start a session
///
/// Sets the session cookie and also returns the token for API clients.
/// Unknown email and wrong password share one 401 response.
///
/// Expected Input:
/// ```json
/// { "email": "ada@example.com", "password": "string" }
/// ```
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload.map_err(|_| ApiError::invalid_json("Request body must be a JSON object"))?;

    let email = request.email.trim().to_lowercase();
    if email.is_empty() || request.password.is_empty() {
        return Err(ApiError::validation_error("Email and password are required", None));
    }

    let user = state.store.find_user_by_email(&email).await?;

    // Unknown emails still run bcrypt against the decoy hash
    let verifier = state.passwords.clone();
    let stored_hash = user.as_ref().map(|u| u.password_hash.clone());
    let matches = tokio::task::spawn_blocking(move || verifier.verify(&request.password, stored_hash.as_deref()))
        .await
        .map_err(|e| {
            tracing::error!("Password verification task failed: {}", e);
            ApiError::internal_server_error(crate::error::GENERIC_FAILURE)
        })?
        .map_err(|e| {
            tracing::error!(email = %email, "Password hash unusable: {}", e);
            ApiError::internal_server_error(crate::error::GENERIC_FAILURE)
        })?;

    let user = match user {
        Some(user) if matches => user,
        _ => {
            tracing::info!(email = %email, "Login failed: invalid credentials");
            return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
        }
    };

    let (token, session) = state.sessions.issue(&user).map_err(|e| {
        tracing::error!("Failed to issue session token: {}", e);
        ApiError::internal_server_error(crate::error::GENERIC_FAILURE)
    })?;

    let security = &state.config.security;
    let cookie = session_cookie(
        &security.session_cookie,
        &token,
        state.sessions.lifetime().num_seconds(),
        security.secure_cookies,
    )
    .ok_or_else(|| ApiError::internal_server_error(crate::error::GENERIC_FAILURE))?;

    tracing::info!(user_id = %user.id, "User signed in");

    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        ApiResponse::success(LoginResponse {
            user: session.user,
            token,
            expires_at: session.expires_at,
        }),
    )
        .into_response())
}

/// POST /api/auth/logout - Clear the session cookie
pub async fn logout(State(state): State<AppState>) -> Response {
    let security = &state.config.security;
    match clear_session_cookie(&security.session_cookie, security.secure_cookies) {
        Some(cookie) => (StatusCode::NO_CONTENT, AppendHeaders([(header::SET_COOKIE, cookie)])).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

/// GET /api/auth/session - Describe the caller's session, if any
pub async fn current_session(context: SessionContext) -> ApiResponse<SessionResponse> {
    ApiResponse::success(match context.session {
        Some(session) => SessionResponse {
            authenticated: true,
            user: Some(session.user),
            expires_at: Some(session.expires_at),
        },
        None => SessionResponse {
            authenticated: false,
            user: None,
            expires_at: None,
        },
    })
}
