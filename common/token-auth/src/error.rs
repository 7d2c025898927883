use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use jsonwebtoken::errors::ErrorKind;
use serde::Serialize;
use thiserror::Error;

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("signing secret is not configured")]
    MissingSecret,
    #[error("unsupported signing algorithm '{0}'")]
    UnsupportedAlgorithm(String),
    #[error("invalid configuration value for {0}: {1}")]
    InvalidConfig(&'static str, String),
    #[error("failed to sign token: {0}")]
    Signing(String),
    #[error("token rejected: {0}")]
    Decode(#[from] DecodeFailure),
    #[error("origin '{0}' is not an allowed issuer")]
    OriginNotAllowed(String),
    #[error("authorization header missing")]
    MissingAuthorization,
    #[error("authorization header malformed")]
    InvalidAuthorization,
}

impl AuthError {
    /// True for every failure that means "this token is not acceptable",
    /// as opposed to a local configuration problem.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            AuthError::Decode(_)
                | AuthError::OriginNotAllowed(_)
                | AuthError::MissingAuthorization
                | AuthError::InvalidAuthorization
        )
    }
}

/// Reasons a token string could not be turned back into claims.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeFailure {
    #[error("token is empty")]
    Empty,
    #[error("token is malformed: {0}")]
    Malformed(String),
    #[error("signature does not match")]
    InvalidSignature,
    #[error("token algorithm does not match the configured algorithm")]
    AlgorithmMismatch,
    #[error("token has expired")]
    Expired,
    #[error("invalid claim payload: {0}")]
    InvalidClaims(String),
}

impl From<jsonwebtoken::errors::Error> for DecodeFailure {
    fn from(value: jsonwebtoken::errors::Error) -> Self {
        match value.kind() {
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                Self::AlgorithmMismatch
            }
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::MissingRequiredClaim(claim) => {
                Self::InvalidClaims(format!("missing required claim '{claim}'"))
            }
            _ => Self::Malformed(value.to_string()),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(value: jsonwebtoken::errors::Error) -> Self {
        Self::Decode(value.into())
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AuthError::MissingAuthorization | AuthError::InvalidAuthorization => {
                (StatusCode::UNAUTHORIZED, "AUTH_HEADER")
            }
            AuthError::Decode(_) => (StatusCode::UNAUTHORIZED, "AUTH_TOKEN"),
            AuthError::OriginNotAllowed(_) => (StatusCode::UNAUTHORIZED, "AUTH_ORIGIN"),
            AuthError::MissingSecret
            | AuthError::UnsupportedAlgorithm(_)
            | AuthError::InvalidConfig(_, _) => (StatusCode::INTERNAL_SERVER_ERROR, "AUTH_CONFIG"),
            AuthError::Signing(_) => (StatusCode::INTERNAL_SERVER_ERROR, "AUTH_SIGNING"),
        };

        let body = ErrorBody {
            code,
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_failures_count_as_rejections() {
        assert!(AuthError::Decode(DecodeFailure::Expired).is_rejection());
        assert!(AuthError::OriginNotAllowed("other".into()).is_rejection());
        assert!(!AuthError::MissingSecret.is_rejection());
    }

    #[test]
    fn rejections_render_unauthorized_and_config_errors_internal() {
        let response = AuthError::Decode(DecodeFailure::InvalidSignature).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = AuthError::MissingSecret.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
