//! Test doubles shared by the session and server tests.

use std::sync::Mutex;

use async_trait::async_trait;
use linkstate_topology::TopologySnapshot;
use serde_json::json;
use tokio::time::Instant;

use crate::backend::ComputeBackend;
use crate::error::{Error, Result};
use crate::wire::{
    CalculateRequest, CalculateResponse, DiscoveryResponse, FloodingResponse, RoutingTablesResponse,
};

/// Canned answers for a two-router `A - B` network. Records every call.
pub struct MockBackend {
    calls: Mutex<Vec<(&'static str, Instant)>>,
    fail: bool,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    /// Every call answers with status 500.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn calls(&self) -> Vec<(&'static str, Instant)> {
        self.calls.lock().unwrap().clone()
    }

    fn called(&self, name: &'static str) -> Result<()> {
        self.calls.lock().unwrap().push((name, Instant::now()));
        if self.fail {
            return Err(Error::Status(500));
        }
        Ok(())
    }
}

#[async_trait]
impl ComputeBackend for MockBackend {
    async fn calculate(&self, request: &CalculateRequest) -> Result<CalculateResponse> {
        self.called("calculate")?;
        assert_eq!(request.source, "A");
        Ok(serde_json::from_value(json!({
            "paths": {"B": {"path": ["A", "B"], "cost": 1, "hops": 1}},
            "history": [{"current": "A", "distances": {"A": 0, "B": 1}, "visited": ["A"]}]
        }))?)
    }

    async fn start_discovery(&self, _: &TopologySnapshot) -> Result<DiscoveryResponse> {
        self.called("discovery")?;
        Ok(serde_json::from_value(json!({"steps": [
            {"router": "A", "discovered_neighbors": ["B"], "costs": {"B": 1}},
            {"router": "B", "discovered_neighbors": ["A"], "costs": {"A": 1}}
        ]}))?)
    }

    async fn start_flooding(&self, _: &TopologySnapshot) -> Result<FloodingResponse> {
        self.called("flooding")?;
        Ok(serde_json::from_value(json!({"steps": [
            {"source_router": "A", "lsp": {"B": 1}, "reached_routers": ["B"]},
            {"source_router": "B", "lsp": {"A": 1}, "reached_routers": ["A"]}
        ]}))?)
    }

    async fn build_routing_tables(&self, _: &TopologySnapshot) -> Result<RoutingTablesResponse> {
        self.called("tables")?;
        Ok(serde_json::from_value(json!({"routing_tables": {
            "A": {"B": {"next_hop": "B", "cost": 1}},
            "B": {"A": {"next_hop": "A", "cost": 1}}
        }}))?)
    }
}
