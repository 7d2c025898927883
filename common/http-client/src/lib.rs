pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod metrics;

pub use client::{IntegrationClient, RequestOptions};
pub use config::HttpClientConfig;
pub use envelope::{encode_body, Envelope};
pub use error::{ClientError, ClientResult};
pub use metrics::ClientMetrics;
