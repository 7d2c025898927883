use common_token_auth::AuthError;
use thiserror::Error;

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to attach integration token: {0}")]
    Auth(#[from] AuthError),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("failed to serialize request body: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("invalid configuration value for {0}: {1}")]
    InvalidConfig(&'static str, String),
    #[error("metrics registry error: {0}")]
    Metrics(#[from] prometheus::Error),
}
