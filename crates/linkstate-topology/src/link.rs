//! Links: undirected, costed edges between two routers.

use std::borrow::Borrow;
use std::fmt;

use crate::RouterId;

/// Identifier of a link: `"<source>-<target>"` in creation order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct LinkId(String);

impl LinkId {
    /// Compose the identifier for a link created from `source` to `target`.
    pub fn between(source: &str, target: &str) -> Self {
        Self(format!("{source}-{target}"))
    }

    /// Wrap an already composed identifier (e.g. received from a client).
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for LinkId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for LinkId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl PartialEq<&str> for LinkId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// An undirected link between two routers.
///
/// Endpoints are weak references: the link stores router identifiers and
/// never owns the routers themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Link {
    id: LinkId,
    source: RouterId,
    target: RouterId,
    cost: u32,
    label: String,
    title: String,
}

impl Link {
    pub(crate) fn new(source: RouterId, target: RouterId, cost: u32) -> Self {
        Self {
            id: LinkId::between(source.as_str(), target.as_str()),
            source,
            target,
            cost,
            label: cost.to_string(),
            title: format!("Cost: {cost}"),
        }
    }

    /// The link identifier.
    pub fn id(&self) -> &LinkId {
        &self.id
    }

    /// Endpoint the link was created from.
    pub fn source(&self) -> &RouterId {
        &self.source
    }

    /// Endpoint the link was created to.
    pub fn target(&self) -> &RouterId {
        &self.target
    }

    /// Positive link cost.
    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Label drawn on the edge (the cost).
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Hover title, `"Cost: <cost>"`.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Whether `router` is one of the two endpoints.
    pub fn touches(&self, router: &str) -> bool {
        self.source == router || self.target == router
    }

    /// The endpoint opposite `router`, if `router` is an endpoint.
    pub fn other_end(&self, router: &str) -> Option<&RouterId> {
        if self.source == router {
            Some(&self.target)
        } else if self.target == router {
            Some(&self.source)
        } else {
            None
        }
    }

    /// Entry shown in link selection lists: `"A ↔ B (5)"`.
    pub fn describe(&self) -> String {
        format!("{} ↔ {} ({})", self.source, self.target, self.label)
    }
}

/// Parse user cost input with integer-prefix semantics.
///
/// Leading whitespace and an optional sign are accepted, then the longest run
/// of decimal digits is taken (`"12abc"` is 12). Returns `None` when there are
/// no digits or the value is not a positive integer that fits in `u32`.
pub fn parse_cost(input: &str) -> Option<u32> {
    let trimmed = input.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let digits: &str = {
        let end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        &rest[..end]
    };
    if digits.is_empty() || negative {
        return None;
    }
    match digits.parse::<u32>() {
        Ok(0) | Err(_) => None,
        Ok(cost) => Some(cost),
    }
}
