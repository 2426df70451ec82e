// crates/backend-lib/src/error.rs

//! Central error types + Axum integration.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::auth::credentials::StoreError;
use crate::auth::password::HashError;
use crate::validation::ValidationError;

/// Outcomes of the authentication core.
///
/// Unknown username and wrong password are one variant on purpose.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Username already taken")]
    DuplicateUsername,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Session invalid")]
    SessionInvalid,

    #[error("Session expired")]
    SessionExpired,

    #[error("Password hashing failed: {0}")]
    HashingFailure(String),

    #[error("Credential store unavailable: {0}")]
    StoreUnavailable(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateUsername => AuthError::DuplicateUsername,
            StoreError::NotFound => AuthError::InvalidCredentials,
            StoreError::Unavailable(msg) => AuthError::StoreUnavailable(msg),
        }
    }
}

impl From<HashError> for AuthError {
    fn from(e: HashError) -> Self {
        AuthError::HashingFailure(e.to_string())
    }
}

/// Application error types with error codes and context
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Auth(auth) => match auth {
                AuthError::InvalidCredentials
                | AuthError::SessionInvalid
                | AuthError::SessionExpired => StatusCode::UNAUTHORIZED,
                AuthError::DuplicateUsername => StatusCode::CONFLICT,
                AuthError::Validation(_) => StatusCode::BAD_REQUEST,
                AuthError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                AuthError::HashingFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Auth(auth) => match auth {
                AuthError::InvalidCredentials => "AUTH_001",
                AuthError::SessionInvalid | AuthError::SessionExpired => "AUTH_002",
                AuthError::DuplicateUsername => "AUTH_003",
                AuthError::Validation(_) => "VAL_001",
                AuthError::HashingFailure(_) => "AUTH_004",
                AuthError::StoreUnavailable(_) => "STORE_001",
            },
            AppError::Internal(_) => "INT_001",
            AppError::InvalidInput(_) => "VAL_002",
        }
    }

    /// Client-facing message; causes stay in the logs
    pub fn sanitized_message(&self) -> String {
        match self {
            AppError::Auth(auth) => match auth {
                AuthError::InvalidCredentials => "Invalid username or password.".to_string(),
                AuthError::SessionInvalid | AuthError::SessionExpired => {
                    "Authentication required. Please login.".to_string()
                },
                AuthError::DuplicateUsername => "Username already taken.".to_string(),
                AuthError::Validation(v) => v.to_string(),
                AuthError::HashingFailure(_) | AuthError::StoreUnavailable(_) => {
                    "An internal server error occurred".to_string()
                },
            },
            AppError::Internal(_) => "An internal server error occurred".to_string(),
            AppError::InvalidInput(_) => "Invalid input provided".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();

        if status.is_server_error() {
            tracing::error!(error = %self, code = error_code, "request failed");
        }

        let body = serde_json::json!({
            "error": {
                "code": error_code,
                "message": self.sanitized_message(),
            }
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    #[test]
    fn test_app_error_display() {
        let auth_error = AppError::Auth(AuthError::InvalidCredentials);
        assert_eq!(
            auth_error.to_string(),
            "Authentication error: Invalid username or password"
        );
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            AppError::from(AuthError::InvalidCredentials).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::from(AuthError::SessionExpired).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::from(AuthError::DuplicateUsername).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::from(AuthError::StoreUnavailable("down".into())).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AppError::Internal("test".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::InvalidInput("expected value".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_store_errors_map_to_auth_errors() {
        assert!(matches!(
            AuthError::from(StoreError::NotFound),
            AuthError::InvalidCredentials
        ));
        assert!(matches!(
            AuthError::from(StoreError::DuplicateUsername),
            AuthError::DuplicateUsername
        ));
        assert!(matches!(
            AuthError::from(StoreError::Unavailable("locked".into())),
            AuthError::StoreUnavailable(_)
        ));
    }

    #[test]
    fn test_sanitized_messages_hide_causes() {
        let err = AppError::from(AuthError::HashingFailure("scrypt: bad params".into()));
        assert!(!err.sanitized_message().contains("scrypt"));

        let err = AppError::from(AuthError::StoreUnavailable("disk I/O error".into()));
        assert!(!err.sanitized_message().contains("disk"));

        // same text whichever half of the credentials was wrong
        assert_eq!(
            AppError::from(AuthError::InvalidCredentials).sanitized_message(),
            "Invalid username or password."
        );
    }

    #[test]
    fn test_error_codes() {
        let app_err: AppError = AuthError::SessionInvalid.into();
        assert_eq!(app_err.error_code(), "AUTH_002");

        let app_err = AppError::from(AuthError::from(ValidationError::MissingCredentials));
        assert_eq!(app_err.error_code(), "VAL_001");
        assert_eq!(app_err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_response_body_never_carries_causes() {
        let err = AppError::from(AuthError::StoreUnavailable("database is locked".into()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "STORE_001");
        assert_eq!(json["error"]["message"], "An internal server error occurred");
        assert!(!String::from_utf8_lossy(&body).contains("locked"));

        let response = AppError::Internal("session cookie: invalid header".into()).into_response();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(!String::from_utf8_lossy(&body).contains("header"));
    }

    #[tokio::test]
    async fn test_error_serialization() {
        let response = AppError::from(AuthError::SessionInvalid).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response_headers = response.headers();
        assert!(response_headers
            .get("content-type")
            .unwrap()
            .to_str()
            .unwrap()
            .contains("application/json"));

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "AUTH_002");
    }
}
