use std::collections::BTreeSet;
use std::env;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::Algorithm;
use tracing::warn;

use crate::error::{AuthError, AuthResult};

pub const DEFAULT_ALGORITHM: &str = "HS256";
/// Four hours, the expiry applied when a caller does not pick one.
pub const DEFAULT_TOKEN_TTL_SECONDS: i64 = 4 * 3600;
/// Clock skew tolerated on `exp` is capped at one day.
pub const MAX_LEEWAY_SECONDS: u64 = 24 * 3600;

/// Mutable settings handed to [`IntegrationConfig::configure`].
#[derive(Clone)]
pub struct IntegrationSettings {
    /// Shared HMAC secret used to sign and verify tokens.
    pub secret: String,
    /// Algorithm identifier, `HS256` unless overridden.
    pub algorithm: String,
    /// Identity of this service, embedded into every token it signs.
    pub origin: String,
    /// Origins accepted as token issuers.
    pub allowed_origins: Vec<String>,
    pub token_ttl_seconds: i64,
    /// Allowable clock skew in seconds when checking `exp`.
    pub leeway_seconds: u64,
}

impl IntegrationSettings {
    pub fn new() -> Self {
        Self {
            secret: String::new(),
            algorithm: DEFAULT_ALGORITHM.to_string(),
            origin: String::new(),
            allowed_origins: Vec::new(),
            token_ttl_seconds: DEFAULT_TOKEN_TTL_SECONDS,
            leeway_seconds: 0,
        }
    }

    pub fn from_env() -> AuthResult<Self> {
        let mut settings = Self::new();

        if let Ok(secret) = env::var("INTEGRATION_API_SECRET") {
            settings.secret = secret;
        }
        if let Some(alg) = env::var("INTEGRATION_API_ALG")
            .ok()
            .and_then(|value| normalize_optional(&value))
        {
            settings.algorithm = alg;
        }
        if let Ok(origin) = env::var("INTEGRATION_API_ORIGIN") {
            settings.origin = origin.trim().to_string();
        }
        if let Ok(value) = env::var("INTEGRATION_API_ALLOWED_ORIGINS") {
            settings.allowed_origins = parse_origins(&value);
        }
        if let Some(ttl) = parse_env_number::<i64>("INTEGRATION_API_TOKEN_TTL_SECONDS")? {
            settings.token_ttl_seconds = ttl;
        }
        if let Some(leeway) = parse_env_number::<u64>("INTEGRATION_API_LEEWAY_SECONDS")? {
            settings.leeway_seconds = leeway;
        }

        Ok(settings)
    }

    /// Freeze these settings into an immutable configuration.
    pub fn into_config(self) -> AuthResult<IntegrationConfig> {
        let algorithm = parse_algorithm(&self.algorithm)?;

        let token_ttl = Some(self.token_ttl_seconds)
            .filter(|seconds| *seconds > 0)
            .and_then(Duration::try_seconds)
            .ok_or_else(|| {
                AuthError::InvalidConfig("token_ttl_seconds", self.token_ttl_seconds.to_string())
            })?;

        let leeway = Some(self.leeway_seconds)
            .filter(|seconds| *seconds <= MAX_LEEWAY_SECONDS)
            .and_then(|seconds| i64::try_from(seconds).ok())
            .and_then(Duration::try_seconds)
            .ok_or_else(|| {
                AuthError::InvalidConfig("leeway_seconds", self.leeway_seconds.to_string())
            })?;

        if self.secret.is_empty() {
            warn!("integration secret is empty; tokens cannot be signed without a per-call override");
        }

        let allowed_origins = self
            .allowed_origins
            .iter()
            .map(|origin| origin.trim())
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();

        Ok(IntegrationConfig {
            secret: self.secret,
            algorithm,
            origin: self.origin,
            allowed_origins,
            token_ttl,
            leeway,
        })
    }
}

impl Default for IntegrationSettings {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for IntegrationSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntegrationSettings")
            .field("secret", &redact(&self.secret))
            .field("algorithm", &self.algorithm)
            .field("origin", &self.origin)
            .field("allowed_origins", &self.allowed_origins)
            .field("token_ttl_seconds", &self.token_ttl_seconds)
            .field("leeway_seconds", &self.leeway_seconds)
            .finish()
    }
}

/// Read-only configuration shared by the codec, validator and header injector.
#[derive(Clone)]
pub struct IntegrationConfig {
    secret: String,
    algorithm: Algorithm,
    origin: String,
    allowed_origins: BTreeSet<String>,
    token_ttl: Duration,
    leeway: Duration,
}

impl IntegrationConfig {
    /// Start from defaults, let `configure` adjust them once, then freeze.
    ///
    /// ```
    /// use common_token_auth::IntegrationConfig;
    ///
    /// let config = IntegrationConfig::configure(|settings| {
    ///     settings.secret = "secret".into();
    ///     settings.origin = "billing".into();
    ///     settings.allowed_origins = vec!["orders".into()];
    /// })
    /// .unwrap();
    /// assert!(config.is_allowed_origin("orders"));
    /// ```
    pub fn configure<F>(configure: F) -> AuthResult<Self>
    where
        F: FnOnce(&mut IntegrationSettings),
    {
        let mut settings = IntegrationSettings::new();
        configure(&mut settings);
        settings.into_config()
    }

    pub fn from_env() -> AuthResult<Self> {
        IntegrationSettings::from_env()?.into_config()
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn allowed_origins(&self) -> impl Iterator<Item = &str> {
        self.allowed_origins.iter().map(String::as_str)
    }

    pub fn is_allowed_origin(&self, origin: &str) -> bool {
        self.allowed_origins.contains(origin)
    }

    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }

    /// Allowable clock skew when checking `exp`.
    pub fn leeway(&self) -> Duration {
        self.leeway
    }

    /// Tokens expiring at or before this instant are refused.
    pub fn expiry_cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_sub_signed(self.leeway).unwrap_or(now)
    }

    /// Picks the override when given, otherwise the configured secret.
    pub(crate) fn resolve_secret<'a>(
        &'a self,
        secret_override: Option<&'a str>,
    ) -> AuthResult<&'a str> {
        let secret = secret_override.unwrap_or(self.secret.as_str());
        if secret.is_empty() {
            return Err(AuthError::MissingSecret);
        }
        Ok(secret)
    }
}

impl fmt::Debug for IntegrationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntegrationConfig")
            .field("secret", &redact(&self.secret))
            .field("algorithm", &self.algorithm)
            .field("origin", &self.origin)
            .field("allowed_origins", &self.allowed_origins)
            .field("token_ttl", &self.token_ttl)
            .field("leeway", &self.leeway)
            .finish()
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<empty>"
    } else {
        "<redacted>"
    }
}

fn parse_algorithm(value: &str) -> AuthResult<Algorithm> {
    let normalized = value.trim().to_ascii_uppercase();
    let algorithm = Algorithm::from_str(&normalized)
        .map_err(|_| AuthError::UnsupportedAlgorithm(value.to_string()))?;
    match algorithm {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(algorithm),
        _ => Err(AuthError::UnsupportedAlgorithm(value.to_string())),
    }
}

fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(|c| c == ',' || c == ';' || c == ' ')
        .filter_map(normalize_optional)
        .collect()
}

fn parse_env_number<T: FromStr>(key: &'static str) -> AuthResult<Option<T>> {
    match env::var(key).ok().and_then(|value| normalize_optional(&value)) {
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|_| AuthError::InvalidConfig(key, raw)),
        None => Ok(None),
    }
}

fn normalize_optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
