use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::{header::AUTHORIZATION, request::Parts, HeaderMap};
use tracing::debug;

use crate::claims::Claims;
use crate::error::{AuthError, AuthResult};
use crate::header::parse_bearer;
use crate::validator::TokenValidator;

/// Verified caller of an inbound server-to-server request.
#[derive(Debug, Clone)]
pub struct IntegrationCaller {
    pub claims: Claims,
    pub token: String,
}

impl IntegrationCaller {
    /// Check the single bearer token in `headers` against `validator`.
    ///
    /// Senders overwrite `Authorization` before every call, so a request
    /// carrying several of them is refused rather than guessed at.
    pub fn authenticate(headers: &HeaderMap, validator: &TokenValidator) -> AuthResult<Self> {
        let mut values = headers.get_all(AUTHORIZATION).iter();
        let value = values.next().ok_or(AuthError::MissingAuthorization)?;
        if values.next().is_some() {
            return Err(AuthError::InvalidAuthorization);
        }

        let token = parse_bearer(value)?;
        match validator.validate(token, None) {
            Ok(claims) => Ok(Self {
                claims,
                token: token.to_owned(),
            }),
            Err(err) => {
                debug!(error = %err, "inbound integration call refused");
                Err(err)
            }
        }
    }

    pub fn origin(&self) -> &str {
        &self.claims.origin
    }

    pub fn issuer(&self) -> &str {
        &self.claims.issuer
    }

    pub fn into_claims(self) -> Claims {
        self.claims
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for IntegrationCaller
where
    Arc<TokenValidator>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Self::authenticate(&parts.headers, &Arc::<TokenValidator>::from_ref(state))
    }
}
