use common_token_auth::{AuthHeaderInjector, SignOptions, DEFAULT_ISSUER};
use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderValue, Method};
use reqwest::{Client, Response};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::config::HttpClientConfig;
use crate::envelope::encode_body;
use crate::error::ClientResult;
use crate::metrics::ClientMetrics;

/// Per-request knobs for [`IntegrationClient`].
#[derive(Debug, Clone)]
pub struct RequestOptions {
    sender: String,
    token_data: Option<Value>,
    secret_override: Option<String>,
    headers: HeaderMap,
    wrap_in_data: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Self {
            sender: DEFAULT_ISSUER.to_string(),
            token_data: None,
            secret_override: None,
            headers,
            wrap_in_data: true,
        }
    }
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issuer recorded in the token.
    pub fn sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = sender.into();
        self
    }

    /// Payload signed into the token, separate from the request body.
    pub fn token_data(mut self, data: Value) -> Self {
        self.token_data = Some(data);
        self
    }

    pub fn secret_override(mut self, secret: impl Into<String>) -> Self {
        self.secret_override = Some(secret.into());
        self
    }

    /// Replaces the default header map (`Content-Type: application/json`).
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn wrap_in_data(mut self, wrap: bool) -> Self {
        self.wrap_in_data = wrap;
        self
    }

    fn sign_options(&self) -> SignOptions {
        SignOptions::new()
            .issuer(self.sender.clone())
            .maybe_data(self.token_data.clone())
            .maybe_secret_override(self.secret_override.clone())
    }
}

/// HTTP client that stamps every request with a fresh integration token.
#[derive(Clone)]
pub struct IntegrationClient {
    http: Client,
    injector: AuthHeaderInjector,
    metrics: Option<ClientMetrics>,
}

impl IntegrationClient {
    pub fn new(injector: AuthHeaderInjector, config: &HttpClientConfig) -> ClientResult<Self> {
        Ok(Self::with_client(config.build_client()?, injector))
    }

    pub fn with_client(http: Client, injector: AuthHeaderInjector) -> Self {
        Self {
            http,
            injector,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: ClientMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn metrics(&self) -> Option<&ClientMetrics> {
        self.metrics.as_ref()
    }

    pub async fn get(&self, url: &str, options: RequestOptions) -> ClientResult<Response> {
        self.send(Method::GET, url, None, options).await
    }

    pub async fn delete(&self, url: &str, options: RequestOptions) -> ClientResult<Response> {
        self.send(Method::DELETE, url, None, options).await
    }

    pub async fn post<T>(
        &self,
        url: &str,
        body: &T,
        options: RequestOptions,
    ) -> ClientResult<Response>
    where
        T: Serialize + ?Sized,
    {
        let body = encode_body(body, options.wrap_in_data)?;
        self.send(Method::POST, url, Some(body), options).await
    }

    pub async fn put<T>(
        &self,
        url: &str,
        body: &T,
        options: RequestOptions,
    ) -> ClientResult<Response>
    where
        T: Serialize + ?Sized,
    {
        let body = encode_body(body, options.wrap_in_data)?;
        self.send(Method::PUT, url, Some(body), options).await
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<Vec<u8>>,
        options: RequestOptions,
    ) -> ClientResult<Response> {
        let sign_options = options.sign_options();
        let headers = self.injector.attach_auth(options.headers, sign_options)?;

        let mut request = self.http.request(method.clone(), url).headers(headers);
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                warn!(%method, url, error = %err, "integration request failed");
                self.record(&method, "transport_error");
                return Err(err.into());
            }
        };

        let status = response.status();
        if status.is_success() {
            info!(%method, url, status = status.as_u16(), "integration request completed");
            self.record(&method, "success");
        } else {
            warn!(
                %method,
                url,
                status = status.as_u16(),
                "integration request returned failure status"
            );
            self.record(&method, "error_status");
        }
        Ok(response)
    }

    fn record(&self, method: &Method, outcome: &str) {
        if let Some(metrics) = &self.metrics {
            metrics.record(method.as_str(), outcome);
        }
    }
}
