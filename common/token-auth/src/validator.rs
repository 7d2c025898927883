use chrono::Utc;
use tracing::debug;

use crate::claims::Claims;
use crate::codec::TokenCodec;
use crate::config::IntegrationConfig;
use crate::error::{AuthError, AuthResult, DecodeFailure};

/// Accepts a token only when it decodes, is unexpired, and comes from an
/// allowed origin.
#[derive(Debug, Clone)]
pub struct TokenValidator {
    codec: TokenCodec,
}

impl TokenValidator {
    pub fn new(codec: TokenCodec) -> Self {
        Self { codec }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    pub fn config(&self) -> &IntegrationConfig {
        self.codec.config()
    }

    /// Boolean gate: every failure collapses to `false`.
    pub fn is_valid<'a>(
        &self,
        token: impl Into<Option<&'a str>>,
        secret_override: Option<&str>,
    ) -> bool {
        let Some(token) = token.into() else {
            return false;
        };

        match self.validate(token, secret_override) {
            Ok(_) => true,
            Err(err) => {
                debug!(error = %err, "integration token rejected");
                false
            }
        }
    }

    /// Same checks as [`is_valid`](Self::is_valid) but reports why a token was refused.
    pub fn validate(&self, token: &str, secret_override: Option<&str>) -> AuthResult<Claims> {
        let claims = self.codec.verify(token, secret_override)?;

        // exp is re-checked here so the gate holds even if the decoder stops enforcing it.
        if claims.is_expired_at(self.config().expiry_cutoff(Utc::now())) {
            return Err(DecodeFailure::Expired.into());
        }

        if !self.config().is_allowed_origin(&claims.origin) {
            return Err(AuthError::OriginNotAllowed(claims.origin));
        }

        Ok(claims)
    }
}
