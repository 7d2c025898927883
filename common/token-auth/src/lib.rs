//! Short-lived HMAC-signed tokens for server-to-server calls.
//!
//! A service signs a token carrying its own origin, attaches it as a bearer
//! header, and the receiving service accepts it only if the signature,
//! expiry and origin allow-list all check out.

pub mod claims;
pub mod codec;
pub mod config;
pub mod error;
pub mod extractors;
pub mod header;
pub mod validator;

pub use claims::{Claims, DEFAULT_ISSUER};
pub use codec::{SignOptions, TokenCodec};
pub use config::{IntegrationConfig, IntegrationSettings};
pub use error::{AuthError, AuthResult, DecodeFailure};
pub use extractors::IntegrationCaller;
pub use header::{parse_bearer, AuthHeaderInjector, BEARER_SCHEME};
pub use validator::TokenValidator;

use std::sync::Arc;

/// The three core handles built from one shared configuration.
#[derive(Debug, Clone)]
pub struct IntegrationAuth {
    pub codec: TokenCodec,
    pub validator: Arc<TokenValidator>,
    pub injector: AuthHeaderInjector,
}

impl IntegrationAuth {
    pub fn new(config: IntegrationConfig) -> Self {
        let codec = TokenCodec::new(Arc::new(config));
        Self {
            validator: Arc::new(TokenValidator::new(codec.clone())),
            injector: AuthHeaderInjector::new(codec.clone()),
            codec,
        }
    }

    pub fn from_env() -> AuthResult<Self> {
        Ok(Self::new(IntegrationConfig::from_env()?))
    }

    pub fn config(&self) -> &IntegrationConfig {
        self.codec.config()
    }
}
