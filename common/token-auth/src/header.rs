use http::header::AUTHORIZATION;
use http::{HeaderMap, HeaderValue};

use crate::codec::{SignOptions, TokenCodec};
use crate::error::{AuthError, AuthResult};

pub const BEARER_SCHEME: &str = "Bearer";

/// Stamps outbound header maps with a freshly signed bearer token.
#[derive(Debug, Clone)]
pub struct AuthHeaderInjector {
    codec: TokenCodec,
}

impl AuthHeaderInjector {
    pub fn new(codec: TokenCodec) -> Self {
        Self { codec }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// `Bearer <token>` for a new token. Any expiry in `options` is dropped so
    /// outbound calls always use the configured TTL.
    pub fn authorization_value(&self, options: SignOptions) -> AuthResult<HeaderValue> {
        let token = self.codec.sign(options.with_default_expiry())?;
        HeaderValue::from_str(&format!("{BEARER_SCHEME} {token}"))
            .map_err(|err| AuthError::Signing(err.to_string()))
    }

    /// Overwrites any existing `Authorization` entry and hands the map back.
    pub fn attach_auth(
        &self,
        mut headers: HeaderMap,
        options: SignOptions,
    ) -> AuthResult<HeaderMap> {
        let value = self.authorization_value(options)?;
        headers.insert(AUTHORIZATION, value);
        Ok(headers)
    }
}

/// Token half of an `Authorization: Bearer <token>` value.
///
/// The scheme must be exactly `Bearer` followed by one space. A compact JWS
/// never contains whitespace, so anything after the token is refused too.
pub fn parse_bearer(value: &HeaderValue) -> AuthResult<&str> {
    let raw = value.to_str().map_err(|_| AuthError::InvalidAuthorization)?;

    match raw.trim().split_once(' ') {
        Some((BEARER_SCHEME, token))
            if !token.is_empty() && !token.contains(char::is_whitespace) =>
        {
            Ok(token)
        }
        _ => Err(AuthError::InvalidAuthorization),
    }
}
