//! Client for the remote routing backend.
//!
//! The backend owns the routing algorithms. The visualizer only sends the
//! current topology and renders whatever comes back.

use async_trait::async_trait;
use linkstate_topology::TopologySnapshot;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::wire::{
    CalculateRequest, CalculateResponse, DiscoveryResponse, FloodingResponse, RoutingTablesResponse,
};

/// The four backend operations.
#[async_trait]
pub trait ComputeBackend: Send + Sync {
    /// Shortest paths from `request.source`, with the search history.
    async fn calculate(&self, request: &CalculateRequest) -> Result<CalculateResponse>;

    /// Neighbor discovery trace.
    async fn start_discovery(&self, topology: &TopologySnapshot) -> Result<DiscoveryResponse>;

    /// LSP flooding trace.
    async fn start_flooding(&self, topology: &TopologySnapshot) -> Result<FloodingResponse>;

    /// Routing table of every router.
    async fn build_routing_tables(&self, topology: &TopologySnapshot) -> Result<RoutingTablesResponse>;
}

/// [`ComputeBackend`] over HTTP POST with JSON bodies.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    /// Create a client for the backend at `base_url` (e.g. `http://127.0.0.1:5000`).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<B, R>(&self, endpoint: &str, body: &B) -> Result<R>
    where
        B: Serialize + Sync + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!(%url, "backend request");

        let response = self.client.post(&url).json(body).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(%url, %status, "backend request failed");
            return Err(Error::Status(status.as_u16()));
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl ComputeBackend for HttpBackend {
    async fn calculate(&self, request: &CalculateRequest) -> Result<CalculateResponse> {
        self.post("calculate", request).await
    }

    async fn start_discovery(&self, topology: &TopologySnapshot) -> Result<DiscoveryResponse> {
        self.post("start_discovery", topology).await
    }

    async fn start_flooding(&self, topology: &TopologySnapshot) -> Result<FloodingResponse> {
        self.post("start_flooding", topology).await
    }

    async fn build_routing_tables(&self, topology: &TopologySnapshot) -> Result<RoutingTablesResponse> {
        self.post("build_routing_tables", topology).await
    }
}
