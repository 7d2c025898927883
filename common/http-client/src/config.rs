use std::env;
use std::time::Duration;

use crate::error::{ClientError, ClientResult};

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub timeout: Duration,
    pub user_agent: Option<String>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: None,
        }
    }
}

impl HttpClientConfig {
    pub fn from_env() -> ClientResult<Self> {
        let timeout_secs = match env::var("INTEGRATION_HTTP_TIMEOUT_SECONDS") {
            Ok(value) if !value.trim().is_empty() => value.trim().parse::<u64>().map_err(|_| {
                ClientError::InvalidConfig("INTEGRATION_HTTP_TIMEOUT_SECONDS", value.clone())
            })?,
            _ => DEFAULT_TIMEOUT_SECS,
        };
        let user_agent = env::var("INTEGRATION_HTTP_USER_AGENT")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        Ok(Self {
            timeout: Duration::from_secs(timeout_secs.max(1)),
            user_agent,
        })
    }

    pub fn build_client(&self) -> ClientResult<reqwest::Client> {
        let mut builder = reqwest::Client::builder().timeout(self.timeout);
        if let Some(agent) = &self.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        Ok(builder.build()?)
    }
}
