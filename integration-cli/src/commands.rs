use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Duration, Utc};
use common_http_client::{HttpClientConfig, IntegrationClient, RequestOptions};
use common_token_auth::{IntegrationAuth, SignOptions};
use serde_json::Value;
use tracing::warn;

use crate::init::PLACEHOLDER_SECRET;

pub fn parse_json(raw: Option<&str>) -> Result<Option<Value>> {
    raw.map(|value| serde_json::from_str(value).context("Failed to parse JSON argument"))
        .transpose()
}

pub fn sign(
    auth: &IntegrationAuth,
    issuer: &str,
    data: Option<Value>,
    ttl_seconds: Option<i64>,
    secret: Option<String>,
) -> Result<String> {
    warn_on_placeholder(auth, secret.as_deref());
    let mut options = SignOptions::new()
        .issuer(issuer)
        .maybe_data(data)
        .maybe_secret_override(secret);
    if let Some(ttl) = ttl_seconds {
        options = options.expires_at(expires_in(ttl)?);
    }
    Ok(auth.codec.sign(options)?)
}

/// Decoded claims as pretty JSON, or the reason the token was refused.
pub fn verify(auth: &IntegrationAuth, token: &str, secret: Option<&str>) -> Result<String> {
    warn_on_placeholder(auth, secret);
    let claims = auth.validator.validate(token, secret)?;
    Ok(serde_json::to_string_pretty(&claims.raw)?)
}

pub async fn request(
    auth: &IntegrationAuth,
    http: &HttpClientConfig,
    method: &str,
    url: &str,
    body: Option<Value>,
    options: RequestOptions,
) -> Result<(u16, String)> {
    let client = IntegrationClient::new(auth.injector.clone(), http)?;
    let body = body.unwrap_or(Value::Null);
    let response = match method.to_ascii_uppercase().as_str() {
        "GET" => client.get(url, options).await?,
        "DELETE" => client.delete(url, options).await?,
        "POST" => client.post(url, &body, options).await?,
        "PUT" => client.put(url, &body, options).await?,
        other => bail!("Unsupported method '{other}'. Use GET, POST, PUT or DELETE."),
    };

    let status = response.status().as_u16();
    let text = response.text().await?;
    Ok((status, text))
}

fn warn_on_placeholder(auth: &IntegrationAuth, secret: Option<&str>) {
    if secret.unwrap_or(auth.config().secret()) == PLACEHOLDER_SECRET {
        warn!(
            "INTEGRATION_API_SECRET still holds the template placeholder; replace it before deploying"
        );
    }
}

fn expires_in(ttl_seconds: i64) -> Result<DateTime<Utc>> {
    Duration::try_seconds(ttl_seconds)
        .and_then(|ttl| Utc::now().checked_add_signed(ttl))
        .ok_or_else(|| anyhow!("TTL of {ttl_seconds} seconds is out of range"))
}
