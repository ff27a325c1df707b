use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use cookie::{time::Duration, Cookie, SameSite};
use std::convert::Infallible;

use crate::auth::Session;
use crate::error::ApiError;
use crate::state::AppState;

/// Request-scoped view of the caller's session, resolved once per request
#[derive(Clone, Debug, Default)]
pub struct SessionContext {
    pub session: Option<Session>,
}

impl SessionContext {
    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for SessionContext {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<SessionContext>().cloned().unwrap_or_default())
    }
}

/// Extractor for handlers that require a signed-in caller
#[derive(Clone, Debug)]
pub struct CurrentSession(pub Session);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CurrentSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionContext>()
            .and_then(|ctx| ctx.session.clone())
            .map(CurrentSession)
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}

/// Resolves the session token (cookie or bearer) into a [`SessionContext`].
/// Missing, malformed and expired tokens all resolve to "no session".
pub async fn resolve_session(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let session = extract_token(request.headers(), &state.config.security.session_cookie).and_then(|token| {
        match state.sessions.verify(&token) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::debug!("Ignoring session token: {}", e);
                None
            }
        }
    });

    request.extensions_mut().insert(SessionContext { session });
    next.run(request).await
}

/// Bearer token wins over the session cookie when both are present
fn extract_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    if let Some(auth) = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        if let Some(token) = auth.strip_prefix("Bearer ") {
            let token = token.trim();
            if !token.is_empty() {
                return Some(token.to_string());
            }
        }
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| Cookie::split_parse(v))
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == cookie_name && !cookie.value().is_empty())
        .map(|cookie| cookie.value().to_string())
}

fn base_cookie(name: &str, value: &str, secure: bool) -> Cookie<'static> {
    Cookie::build((name.to_string(), value.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

/// `Set-Cookie` value carrying a session token
pub fn session_cookie(name: &str, token: &str, max_age_secs: i64, secure: bool) -> Option<HeaderValue> {
    let mut cookie = base_cookie(name, token, secure);
    cookie.set_max_age(Duration::seconds(max_age_secs));
    HeaderValue::from_str(&cookie.to_string()).ok()
}

/// `Set-Cookie` value that removes the session cookie
pub fn clear_session_cookie(name: &str, secure: bool) -> Option<HeaderValue> {
    let mut cookie = base_cookie(name, "", secure);
    cookie.make_removal();
    HeaderValue::from_str(&cookie.to_string()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(header::HeaderName, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(name.clone(), HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn reads_bearer_token() {
        let h = headers(&[(header::AUTHORIZATION, "Bearer abc.def.ghi")]);
        assert_eq!(extract_token(&h, "session").as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn reads_named_cookie_among_others() {
        let h = headers(&[(header::COOKIE, "theme=dark; session=tok123; other=1")]);
        assert_eq!(extract_token(&h, "session").as_deref(), Some("tok123"));
    }

    #[test]
    fn tolerates_malformed_cookie_pairs() {
        let h = headers(&[(header::COOKIE, "junk; =nameless; session=tok456")]);
        assert_eq!(extract_token(&h, "session").as_deref(), Some("tok456"));

        let h = headers(&[(header::COOKIE, "a=1"), (header::COOKIE, "session=split")]);
        assert_eq!(extract_token(&h, "session").as_deref(), Some("split"));
    }

    #[test]
    fn ignores_empty_and_foreign_values() {
        assert_eq!(extract_token(&headers(&[(header::COOKIE, "session=")]), "session"), None);
        assert_eq!(extract_token(&headers(&[(header::COOKIE, "sessionx=1")]), "session"), None);
        assert_eq!(extract_token(&headers(&[(header::AUTHORIZATION, "Basic Zm9v")]), "session"), None);
        assert_eq!(extract_token(&HeaderMap::new(), "session"), None);
    }

    #[test]
    fn cookie_attributes() {
        let cookie = session_cookie("session", "tok", 3600, true).unwrap();
        let cookie = cookie.to_str().unwrap();
        assert!(cookie.starts_with("session=tok;"));
        assert!(cookie.contains("; HttpOnly"));
        assert!(cookie.contains("; SameSite=Lax"));
        assert!(cookie.contains("; Path=/"));
        assert!(cookie.contains("; Max-Age=3600"));
        assert!(cookie.contains("; Secure"));

        let cleared = clear_session_cookie("session", false).unwrap();
        let cleared = cleared.to_str().unwrap();
        assert!(cleared.starts_with("session=;"));
        assert!(cleared.contains("; Max-Age=0"));
        assert!(cleared.contains("; Path=/"));
        assert!(!cleared.contains("Secure"));
    }
}
