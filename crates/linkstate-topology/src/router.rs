//! Routers: the named nodes of the topology.
//!
//! A router is identified by its display name. There is no separate internal
//! id, so the name is also the lookup key and can never change once the router
//! exists (a rename is a remove followed by an add).

use std::borrow::Borrow;
use std::fmt;

/// Identifier of a router, equal to its user-chosen display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct RouterId(String);

impl RouterId {
    /// Create an identifier from a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the name is empty (never valid for a stored router).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for RouterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for RouterId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RouterId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for RouterId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl PartialEq<str> for RouterId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for RouterId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// A router in the topology.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Router {
    id: RouterId,
    label: String,
    title: String,
}

impl Router {
    pub(crate) fn new(id: RouterId) -> Self {
        let label = id.as_str().to_string();
        let title = format!("Router {id}");
        Self { id, label, title }
    }

    /// The router's identifier.
    pub fn id(&self) -> &RouterId {
        &self.id
    }

    /// Label drawn on the node (same as the identifier).
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Hover title, `"Router <name>"`.
    pub fn title(&self) -> &str {
        &self.title
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_and_title_follow_name() {
        let router = Router::new(RouterId::new("R1"));
        assert_eq!(router.label(), "R1");
        assert_eq!(router.title(), "Router R1");
        assert_eq!(router.id(), &"R1");
    }

    #[test]
    fn borrow_as_str_for_lookups() {
        use std::collections::HashSet;

        let mut set = HashSet::new();
        set.insert(RouterId::new("A"));
        assert!(set.contains("A"));
        assert!(!set.contains("B"));
    }
}
