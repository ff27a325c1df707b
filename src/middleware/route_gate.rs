use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use super::session::SessionContext;
use crate::gate::GateDecision;
use crate::state::AppState;

/// Applies the route gate to every request. Must run after `resolve_session`.
pub async fn route_gate(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let has_session = request
        .extensions()
        .get::<SessionContext>()
        .map(SessionContext::is_authenticated)
        .unwrap_or(false);

    let decision = state
        .gate
        .decide(request.uri().path(), request.uri().query(), has_session);

    match decision {
        GateDecision::PassThrough => next.run(request).await,
        GateDecision::RedirectToDashboard { location } | GateDecision::RedirectToLogin { location } => {
            tracing::debug!(path = %request.uri().path(), location = %location, "Route gate redirect");
            Redirect::temporary(&location).into_response()
        }
    }
}
