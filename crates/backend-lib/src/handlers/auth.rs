// ============================
// crates/backend-lib/src/handlers/auth.rs
// ============================
//! Register, login and logout pages.
//!
//! These turn [`AuthError`]s into one-line messages on the re-rendered form.
//! Nothing here tells a visitor whether a username exists.
use axum::{
    extract::{Query, State},
    http::{header::SET_COOKIE, HeaderMap},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use tracing::warn;

use crate::error::{AppError, AuthError};
use crate::middleware::MaybeIdentity;
use crate::views::{self, Flash, PageContext};
use crate::AppState;

const REGISTERED_REDIRECT: &str = "/login?message=Registration+successful.+Please+login.";
const LOGGED_OUT_REDIRECT: &str = "/?message=Successfully+logged+out.";

/// Username/password form body
#[derive(Debug, Deserialize)]
pub struct CredentialsForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

fn register_error_message(e: &AuthError) -> String {
    match e {
        AuthError::Validation(v) => v.to_string(),
        AuthError::DuplicateUsername => "Username already taken.".to_string(),
        _ => "Error processing registration.".to_string(),
    }
}

fn login_error_message(e: &AuthError) -> String {
    match e {
        AuthError::Validation(v) => v.to_string(),
        AuthError::InvalidCredentials => "Invalid username or password.".to_string(),
        AuthError::StoreUnavailable(_) => "Database error. Please try again.".to_string(),
        _ => "Error processing login.".to_string(),
    }
}

pub async fn register_page(
    MaybeIdentity(identity): MaybeIdentity,
    Query(flash): Query<Flash>,
) -> Response {
    if identity.is_some() {
        return Redirect::to("/").into_response();
    }
    views::register(&PageContext::new(None, flash)).into_response()
}

pub async fn register(
    State(state): State<AppState>,
    MaybeIdentity(identity): MaybeIdentity,
    Form(form): Form<CredentialsForm>,
) -> Response {
    if identity.is_some() {
        return Redirect::to("/").into_response();
    }
    match state.auth.register(&form.username, &form.password).await {
        Ok(_) => Redirect::to(REGISTERED_REDIRECT).into_response(),
        Err(e) => {
            let ctx = PageContext::default().with_error(register_error_message(&e));
            views::register(&ctx).into_response()
        }
    }
}

pub async fn login_page(
    MaybeIdentity(identity): MaybeIdentity,
    Query(flash): Query<Flash>,
) -> Response {
    if identity.is_some() {
        return Redirect::to("/").into_response();
    }
    views::login(&PageContext::new(None, flash)).into_response()
}

pub async fn login(
    State(state): State<AppState>,
    MaybeIdentity(identity): MaybeIdentity,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, AppError> {
    if identity.is_some() {
        return Ok(Redirect::to("/").into_response());
    }
    match state.auth.login(&form.username, &form.password).await {
        Ok(session) => {
            let cookie = state
                .gate
                .cookie()
                .issue(&session)
                .map_err(|e| AppError::Internal(format!("session cookie: {e}")))?;
            Ok(([(SET_COOKIE, cookie)], Redirect::to("/")).into_response())
        }
        Err(e) => {
            let ctx = PageContext::default().with_error(login_error_message(&e));
            Ok(views::login(&ctx).into_response())
        }
    }
}

/// Revoke the session (if any) and always clear the cookie
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let cookie = state.gate.cookie();
    if let Some(token) = cookie.extract(&headers) {
        if let Err(e) = state.auth.logout(&token).await {
            warn!(error = %e, "failed to revoke session on logout");
        }
    }
    (
        [(SET_COOKIE, cookie.clear())],
        Redirect::to(LOGGED_OUT_REDIRECT),
    )
        .into_response()
}
