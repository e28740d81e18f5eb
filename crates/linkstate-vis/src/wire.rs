//! JSON bodies exchanged with the routing backend.
//!
//! Object key order is meaningful in every response (paths are colored in
//! response order, tables are listed in response order), so keyed maps are
//! decoded into [`Ordered`] rather than a hash map.

use std::fmt;
use std::marker::PhantomData;

use linkstate_topology::{RouterId, TopologySnapshot};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A JSON object decoded with its key order intact.
#[derive(Debug, Clone, PartialEq)]
pub struct Ordered<V>(Vec<(String, V)>);

impl<V> Default for Ordered<V> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<V> Ordered<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry at the end.
    pub fn push(&mut self, key: impl Into<String>, value: V) {
        self.0.push((key.into(), value));
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Entries in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for Ordered<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl<V: Serialize> Serialize for Ordered<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for Ordered<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedVisitor<V> {
            type Value = Ordered<V>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, value)) = access.next_entry::<String, V>()? {
                    entries.push((key, value));
                }
                Ok(Ordered(entries))
            }
        }

        deserializer.deserialize_map(OrderedVisitor(PhantomData))
    }
}

/// A distance or cost as reported by the backend: a number, or a marker
/// string such as `"Infinity"` for unreachable routers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Metric {
    Finite(serde_json::Number),
    Text(String),
}

impl Metric {
    pub fn is_infinite(&self) -> bool {
        matches!(self, Metric::Text(s) if s == "Infinity")
    }
}

impl From<u64> for Metric {
    fn from(n: u64) -> Self {
        Metric::Finite(n.into())
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Finite(n) => write!(f, "{n}"),
            Metric::Text(s) => f.write_str(s),
        }
    }
}

/// Body of `/calculate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculateRequest {
    #[serde(flatten)]
    pub topology: TopologySnapshot,
    pub source: RouterId,
}

/// Shortest path to one destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathInfo {
    pub path: Vec<RouterId>,
    pub cost: Metric,
    pub hops: Metric,
}

/// A neighbor evaluated during one iteration of the path search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeighborEval {
    pub cost: Metric,
    pub total_distance: Metric,
    pub current_best: Metric,
}

/// One iteration of the path search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryStep {
    pub current: RouterId,
    pub distances: Ordered<Metric>,
    pub visited: Vec<RouterId>,
    #[serde(default)]
    pub neighbors: Ordered<NeighborEval>,
}

/// Response of `/calculate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculateResponse {
    pub paths: Ordered<PathInfo>,
    #[serde(default)]
    pub history: Vec<HistoryStep>,
    #[serde(default)]
    pub distances: Ordered<Metric>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// One router's neighbor discovery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryStep {
    pub router: RouterId,
    pub discovered_neighbors: Vec<RouterId>,
    #[serde(default)]
    pub costs: Ordered<Metric>,
}

/// Response of `/start_discovery`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryResponse {
    pub steps: Vec<DiscoveryStep>,
}

/// One router's LSP flood as traced by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloodingStep {
    pub source_router: RouterId,
    #[serde(default)]
    pub lsp: serde_json::Value,
    #[serde(default)]
    pub reached_routers: Vec<RouterId>,
}

/// Response of `/start_flooding`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloodingResponse {
    pub steps: Vec<FloodingStep>,
}

/// One row of a routing table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteEntry {
    pub next_hop: Option<RouterId>,
    pub cost: Metric,
}

/// Response of `/build_routing_tables`: router, then destination, to route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingTablesResponse {
    pub routing_tables: Ordered<Ordered<RouteEntry>>,
}
