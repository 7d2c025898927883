use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

use crate::error::ClientResult;

#[derive(Clone)]
pub struct ClientMetrics {
    registry: Registry,
    requests: IntCounterVec,
}

impl ClientMetrics {
    pub fn new() -> ClientResult<Self> {
        Self::with_registry(Registry::new())
    }

    pub fn with_registry(registry: Registry) -> ClientResult<Self> {
        let requests = IntCounterVec::new(
            Opts::new(
                "integration_client_requests_total",
                "Outbound integration requests grouped by method and outcome",
            ),
            &["method", "outcome"],
        )?;
        registry.register(Box::new(requests.clone()))?;
        Ok(Self { registry, requests })
    }

    pub fn record(&self, method: &str, outcome: &str) {
        self.requests.with_label_values(&[method, outcome]).inc();
    }

    pub fn count(&self, method: &str, outcome: &str) -> u64 {
        self.requests.with_label_values(&[method, outcome]).get()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn render(&self) -> ClientResult<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
