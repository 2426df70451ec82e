// crates/backend-lib/src/middleware/gate.rs

//! Access gate: session-cookie check in front of protected routes.
//!
//! [`AccessGate::check`] turns a request's headers into one [`GateDecision`].
//! [`require_session`] wraps that as an axum middleware: allowed requests
//! continue with an [`Identity`] in their extensions, denied ones get the
//! denial rendered for their kind of client.
use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{
        header::{ACCEPT, SET_COOKIE},
        request::Parts,
        HeaderMap, HeaderValue, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use metrics::counter;
use spice_common::ErrorBody;
use tracing::{debug, warn};

use crate::auth::{Session, SessionCookie, SessionRegistry};
use crate::error::{AppError, AuthError};
use crate::metrics as keys;

const AUTH_REQUIRED: &str = "Authentication required. Please login.";
const LOGIN_REDIRECT: &str = "/login?error=Please+login+to+access+this+page.";
const UNAVAILABLE: &str = "Service temporarily unavailable. Please try again.";
const UNAVAILABLE_REDIRECT: &str = "/login?error=Service+temporarily+unavailable.+Please+try+again.";

/// Who the request belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i64,
    pub username: String,
}

impl From<Session> for Identity {
    fn from(session: Session) -> Self {
        Self {
            user_id: session.user_id,
            username: session.username,
        }
    }
}

/// How a denied request should be answered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientKind {
    /// Page navigation: redirect to the login page
    Browser,
    /// `fetch`/XHR: structured 401
    Programmatic,
}

impl ClientKind {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let wants_json = headers
            .get(ACCEPT)
            .and_then(|h| h.to_str().ok())
            .is_some_and(|accept| accept.contains("application/json"));
        let is_xhr = headers
            .get("x-requested-with")
            .and_then(|h| h.to_str().ok())
            .is_some_and(|v| v.eq_ignore_ascii_case("XMLHttpRequest"));

        if wants_json || is_xhr {
            ClientKind::Programmatic
        } else {
            ClientKind::Browser
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// No session cookie on the request
    MissingToken,
    /// Cookie present but unknown to the registry
    Invalid,
    /// Cookie named a session that had expired
    Expired,
    /// The registry could not be consulted
    Unavailable,
}

/// A rejected request, ready to be rendered
#[derive(Debug)]
pub struct Denial {
    pub reason: DenyReason,
    pub client: ClientKind,
    clear_cookie: Option<HeaderValue>,
}

impl Denial {
    /// Whether the response will tell the browser to drop its cookie
    pub fn clears_cookie(&self) -> bool {
        self.clear_cookie.is_some()
    }
}

impl IntoResponse for Denial {
    fn into_response(self) -> Response {
        let unavailable = self.reason == DenyReason::Unavailable;
        let mut response = match self.client {
            ClientKind::Programmatic => {
                let (status, message) = if unavailable {
                    (StatusCode::SERVICE_UNAVAILABLE, UNAVAILABLE)
                } else {
                    (StatusCode::UNAUTHORIZED, AUTH_REQUIRED)
                };
                (status, Json(ErrorBody::new(message))).into_response()
            }
            ClientKind::Browser => {
                Redirect::to(if unavailable { UNAVAILABLE_REDIRECT } else { LOGIN_REDIRECT })
                    .into_response()
            }
        };
        if let Some(cookie) = self.clear_cookie {
            response.headers_mut().append(SET_COOKIE, cookie);
        }
        response
    }
}

/// Result of running a request through the gate
#[derive(Debug)]
pub enum GateDecision {
    Allow(Identity),
    Deny(Denial),
}

/// Resolves session cookies against the session registry
#[derive(Clone)]
pub struct AccessGate {
    sessions: Arc<dyn SessionRegistry>,
    cookie: SessionCookie,
}

impl AccessGate {
    pub fn new(sessions: Arc<dyn SessionRegistry>, cookie: SessionCookie) -> Self {
        Self { sessions, cookie }
    }

    pub fn cookie(&self) -> &SessionCookie {
        &self.cookie
    }

    /// Decide whether the request may proceed.
    ///
    /// Invalid and expired tokens are revoked and the denial carries a
    /// cookie-clearing header.
    pub async fn check(&self, headers: &HeaderMap) -> GateDecision {
        let client = ClientKind::from_headers(headers);
        let Some(token) = self.cookie.extract(headers) else {
            debug!("gate: no session cookie");
            return self.deny(DenyReason::MissingToken, client);
        };

        let reason = match self.sessions.resolve(&token).await {
            Ok(session) => {
                debug!(user_id = session.user_id, "gate: session accepted");
                return GateDecision::Allow(session.into());
            }
            Err(AuthError::SessionExpired) => DenyReason::Expired,
            Err(AuthError::SessionInvalid) => DenyReason::Invalid,
            Err(e) => {
                warn!(error = %e, "gate: session lookup failed");
                return self.deny(DenyReason::Unavailable, client);
            }
        };

        debug!(?reason, "gate: session rejected");
        if let Err(e) = self.sessions.revoke(&token).await {
            warn!(error = %e, "gate: failed to revoke rejected token");
        }
        self.deny(reason, client)
    }

    /// Page-context lookup: who is logged in, if anyone.
    ///
    /// Any failure reads as anonymous.
    pub async fn identify(&self, headers: &HeaderMap) -> Option<Identity> {
        let token = self.cookie.extract(headers)?;
        self.sessions.resolve(&token).await.ok().map(Identity::from)
    }

    fn deny(&self, reason: DenyReason, client: ClientKind) -> GateDecision {
        counter!(keys::GATE_REJECTED).increment(1);
        let clear_cookie = (reason != DenyReason::Unavailable).then(|| self.cookie.clear());
        GateDecision::Deny(Denial {
            reason,
            client,
            clear_cookie,
        })
    }
}

/// Middleware guarding a route group with the [`AccessGate`]
pub async fn require_session(
    State(gate): State<AccessGate>,
    mut request: Request,
    next: Next,
) -> Response {
    match gate.check(request.headers()).await {
        GateDecision::Allow(identity) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        GateDecision::Deny(denial) => denial.into_response(),
    }
}

/// Identity placed by [`require_session`]; only usable on gated routes
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .ok_or(AppError::Auth(AuthError::SessionInvalid))
    }
}

/// Logged-in user for page rendering, `None` when anonymous
#[derive(Debug, Clone)]
pub struct MaybeIdentity(pub Option<Identity>);

impl<S> FromRequestParts<S> for MaybeIdentity
where
    AccessGate: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(identity) = parts.extensions.get::<Identity>() {
            return Ok(MaybeIdentity(Some(identity.clone())));
        }
        let gate = AccessGate::from_ref(state);
        Ok(MaybeIdentity(gate.identify(&parts.headers).await))
    }
}
