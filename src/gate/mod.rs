//! Route authorization gate.
//!
//! Classifies every page request as an auth page, a protected page or a
//! public page, then decides from session presence alone whether to redirect.
//! The decision is a pure function so it can be exercised without a server;
//! the axum layer that applies it lives in `middleware::route_gate`.

pub mod pattern;

pub use pattern::{PathPattern, PatternError};

use percent_encoding::percent_decode_str;

use crate::config::RoutesConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathClass {
    AuthPage,
    ProtectedPage,
    Public,
}

/// Pattern table compiled once at startup
#[derive(Debug, Clone)]
pub struct RouteMatcher {
    auth_pages: Vec<PathPattern>,
    protected_pages: Vec<PathPattern>,
}

impl RouteMatcher {
    pub fn new<A, P>(auth_pages: A, protected_pages: P) -> Result<Self, PatternError>
    where
        A: IntoIterator,
        A::Item: AsRef<str>,
        P: IntoIterator,
        P::Item: AsRef<str>,
    {
        Ok(Self {
            auth_pages: compile_all(auth_pages)?,
            protected_pages: compile_all(protected_pages)?,
        })
    }

    /// Auth pages are checked first; a path matching neither list is public
    pub fn classify(&self, path: &str) -> PathClass {
        if self.auth_pages.iter().any(|p| p.matches(path)) {
            PathClass::AuthPage
        } else if self.protected_pages.iter().any(|p| p.matches(path)) {
            PathClass::ProtectedPage
        } else {
            PathClass::Public
        }
    }
}

fn compile_all<I>(patterns: I) -> Result<Vec<PathPattern>, PatternError>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    patterns
        .into_iter()
        .map(|p| PathPattern::compile(p.as_ref()))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Signed-in users have no business on login/register
    RedirectToDashboard { location: String },
    /// Anonymous request for a protected page; `location` carries the return path
    RedirectToLogin { location: String },
    PassThrough,
}

impl GateDecision {
    pub fn location(&self) -> Option<&str> {
        match self {
            GateDecision::RedirectToDashboard { location } | GateDecision::RedirectToLogin { location } => {
                Some(location)
            }
            GateDecision::PassThrough => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RouteGate {
    matcher: RouteMatcher,
    login_path: String,
    dashboard_path: String,
}

impl RouteGate {
    pub fn new(matcher: RouteMatcher, login_path: impl Into<String>, dashboard_path: impl Into<String>) -> Self {
        Self {
            matcher,
            login_path: login_path.into(),
            dashboard_path: dashboard_path.into(),
        }
    }

    pub fn from_config(routes: &RoutesConfig) -> Result<Self, PatternError> {
        let matcher = RouteMatcher::new(&routes.auth_pages, &routes.protected_pages)?;
        Ok(Self::new(matcher, &routes.login_path, &routes.dashboard_path))
    }

    /// Classify the path as the file server will resolve it, see [`canonical_path`]
    pub fn classify(&self, path: &str) -> PathClass {
        self.matcher.classify(&canonical_path(path))
    }

    /// Decide what to do with a request for `path` (plus optional raw query)
    pub fn decide(&self, path: &str, query: Option<&str>, has_session: bool) -> GateDecision {
        match (self.classify(path), has_session) {
            (PathClass::AuthPage, true) => GateDecision::RedirectToDashboard {
                location: self.dashboard_path.clone(),
            },
            (PathClass::ProtectedPage, false) => {
                let from = match query {
                    Some(q) if !q.is_empty() => format!("{}?{}", path, q),
                    _ => path.to_string(),
                };
                GateDecision::RedirectToLogin {
                    location: format!("{}?from={}", self.login_path, encode_component(&from)),
                }
            }
            _ => GateDecision::PassThrough,
        }
    }
}

/// Percent-decode a request path once and resolve its dot segments, so
/// `/%64ashboard`, `/./dashboard` and `/pricing/../dashboard` all classify as
/// `/dashboard`. The result is always absolute.
pub fn canonical_path(raw: &str) -> String {
    let decoded = percent_decode_str(raw).decode_utf8_lossy();
    let mut segments: Vec<&str> = Vec::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    format!("/{}", segments.join("/"))
}

/// Percent-encode a value for use inside a query parameter. Spaces become
/// `%20` rather than `+` so the result decodes the same everywhere.
fn encode_component(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
