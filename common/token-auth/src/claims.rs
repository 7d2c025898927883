use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DecodeFailure;

pub const DEFAULT_ISSUER: &str = "System";

/// Verified claim set carried by an integration token.
#[derive(Debug, Clone, Serialize)]
pub struct Claims {
    /// Service that signed the token.
    pub origin: String,
    /// Caller-chosen label for who is acting, `System` by default.
    pub issuer: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Opaque caller payload.
    pub data: Option<Value>,
    #[serde(skip)]
    pub raw: Value,
}

impl Claims {
    /// Look up any payload field by its wire name (`origin`, `iss`, `data`, ...).
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.raw.get(key)
    }

    /// Look up a field inside the caller payload.
    pub fn data_field(&self, key: &str) -> Option<&Value> {
        self.data.as_ref().and_then(|data| data.get(key))
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Wire layout of the token payload. Field order is the order written.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ClaimsRepr {
    #[serde(default)]
    pub origin: Option<String>,
    pub iss: String,
    pub exp: i64,
    pub iat: i64,
    #[serde(default)]
    pub data: Option<Value>,
}

impl TryFrom<ClaimsRepr> for Claims {
    type Error = DecodeFailure;

    fn try_from(value: ClaimsRepr) -> Result<Self, DecodeFailure> {
        let expires_at = timestamp("exp", value.exp)?;
        let issued_at = timestamp("iat", value.iat)?;

        Ok(Self {
            origin: value.origin.unwrap_or_default(),
            issuer: value.iss,
            issued_at,
            expires_at,
            data: value.data.filter(|data| !data.is_null()),
            raw: Value::Null,
        })
    }
}

impl TryFrom<Value> for Claims {
    type Error = DecodeFailure;

    fn try_from(value: Value) -> Result<Self, DecodeFailure> {
        let repr: ClaimsRepr = serde_json::from_value(value.clone())
            .map_err(|err| DecodeFailure::InvalidClaims(err.to_string()))?;
        let mut claims = Claims::try_from(repr)?;
        claims.raw = value;
        Ok(claims)
    }
}

fn timestamp(name: &'static str, seconds: i64) -> Result<DateTime<Utc>, DecodeFailure> {
    Utc.timestamp_opt(seconds, 0).single().ok_or_else(|| {
        DecodeFailure::InvalidClaims(format!("claim '{name}' out of range: {seconds}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn claims_keep_raw_payload_for_lookup() {
        let payload = json!({
            "origin": "orders",
            "iss": "System",
            "exp": 1_900_000_000,
            "iat": 1_899_985_600,
            "data": { "foo": "bar" },
            "extra": 7
        });

        let claims = Claims::try_from(payload).expect("valid claims");
        assert_eq!(claims.origin, "orders");
        assert_eq!(claims.issuer, "System");
        assert_eq!(claims.expires_at.timestamp(), 1_900_000_000);
        assert_eq!(claims.data_field("foo"), Some(&json!("bar")));
        assert_eq!(claims.get("extra"), Some(&json!(7)));
        assert_eq!(claims.get("iss"), Some(&json!("System")));
    }

    #[test]
    fn null_origin_and_data_are_tolerated() {
        let payload = json!({
            "origin": null,
            "iss": "System",
            "exp": 1_900_000_000,
            "iat": 1_899_985_600,
            "data": null
        });

        let claims = Claims::try_from(payload).expect("valid claims");
        assert_eq!(claims.origin, "");
        assert!(claims.data.is_none());
    }

    #[test]
    fn missing_issuer_is_rejected() {
        let payload = json!({ "origin": "orders", "exp": 1, "iat": 1 });
        let err = Claims::try_from(payload).expect_err("iss is required");
        assert!(matches!(err, DecodeFailure::InvalidClaims(_)));
    }

    #[test]
    fn repr_serializes_in_wire_order() {
        let repr = ClaimsRepr {
            origin: Some("orders".into()),
            iss: "System".into(),
            exp: 2,
            iat: 1,
            data: None,
        };
        let encoded = serde_json::to_string(&repr).expect("serialize");
        assert_eq!(
            encoded,
            r#"{"origin":"orders","iss":"System","exp":2,"iat":1,"data":null}"#
        );
    }
}
