use std::sync::Arc;

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde_json::Value;
use tracing::debug;

use crate::claims::{Claims, ClaimsRepr, DEFAULT_ISSUER};
use crate::config::IntegrationConfig;
use crate::error::{AuthError, AuthResult, DecodeFailure};

/// Per-call inputs for [`TokenCodec::sign`].
#[derive(Debug, Clone)]
pub struct SignOptions {
    issuer: String,
    data: Option<Value>,
    expires_at: Option<DateTime<Utc>>,
    secret_override: Option<String>,
}

impl Default for SignOptions {
    fn default() -> Self {
        Self {
            issuer: DEFAULT_ISSUER.to_string(),
            data: None,
            expires_at: None,
            secret_override: None,
        }
    }
}

impl SignOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    pub fn data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn maybe_data(mut self, data: Option<Value>) -> Self {
        self.data = data;
        self
    }

    /// Absolute expiry. Defaults to now plus the configured TTL.
    pub fn expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    pub fn secret_override(mut self, secret: impl Into<String>) -> Self {
        self.secret_override = Some(secret.into());
        self
    }

    pub fn maybe_secret_override(mut self, secret: Option<String>) -> Self {
        self.secret_override = secret;
        self
    }

    pub(crate) fn with_default_expiry(mut self) -> Self {
        self.expires_at = None;
        self
    }
}

/// Signs claim sets into compact JWTs and verifies them back.
#[derive(Debug, Clone)]
pub struct TokenCodec {
    config: Arc<IntegrationConfig>,
}

impl TokenCodec {
    pub fn new(config: Arc<IntegrationConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &IntegrationConfig {
        &self.config
    }

    pub fn sign(&self, options: SignOptions) -> AuthResult<String> {
        let secret = self
            .config
            .resolve_secret(options.secret_override.as_deref())?;

        let now = Utc::now();
        let expires_at = match options.expires_at {
            Some(expires_at) => expires_at,
            None => now.checked_add_signed(self.config.token_ttl()).ok_or_else(|| {
                AuthError::InvalidConfig(
                    "token_ttl_seconds",
                    self.config.token_ttl().num_seconds().to_string(),
                )
            })?,
        };

        let repr = ClaimsRepr {
            origin: Some(self.config.origin().to_string()),
            iss: options.issuer,
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
            data: options.data,
        };

        let header = Header::new(self.config.algorithm());
        let token = encode(&header, &repr, &EncodingKey::from_secret(secret.as_bytes()))
            .map_err(|err| AuthError::Signing(err.to_string()))?;
        debug!(
            origin = self.config.origin(),
            issuer = %repr.iss,
            exp = repr.exp,
            custom_secret = options.secret_override.is_some(),
            "signed integration token"
        );
        Ok(token)
    }

    /// Verify signature, pinned algorithm and expiry, then map the payload.
    pub fn verify(&self, token: &str, secret_override: Option<&str>) -> AuthResult<Claims> {
        let token = token.trim();
        if token.is_empty() {
            return Err(DecodeFailure::Empty.into());
        }

        let secret = self.config.resolve_secret(secret_override)?;

        let mut validation = Validation::new(self.config.algorithm());
        validation.leeway = self.config.leeway().num_seconds().unsigned_abs();

        let token_data = decode::<Value>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation,
        )?;
        let claims = Claims::try_from(token_data.claims)?;
        // jsonwebtoken still accepts `exp == now`.
        if claims.is_expired_at(self.config.expiry_cutoff(Utc::now())) {
            return Err(DecodeFailure::Expired.into());
        }
        debug!(origin = %claims.origin, issuer = %claims.issuer, "verified integration token");
        Ok(claims)
    }
}
