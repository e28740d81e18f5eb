//! Link-State Topology
//!
//! Router/link graph used by the link-state routing visualizer.
//!
//! # Model
//!
//! - **Routers** are identified by their display name.
//! - **Links** are undirected and costed. A link created from `A` to `B` is
//!   identified as `"A-B"`, and no second link may join the same pair in
//!   either orientation.
//!
//! The [`Topology`] store is an ordinary owned value. Whoever needs the graph
//! borrows it; there is no global instance.
//!
//! # Example
//!
//! ```
//! use linkstate_topology::Topology;
//!
//! let mut topo = Topology::new();
//! topo.add_router("A").unwrap();
//! topo.add_router("B").unwrap();
//! topo.add_link("A", "B", 5).unwrap();
//!
//! // The reverse orientation is the same physical link.
//! assert!(topo.add_link("B", "A", 7).is_err());
//! assert_eq!(topo.link_between("B", "A").unwrap().cost(), 5);
//! ```

mod error;
mod link;
mod router;
mod snapshot;
mod store;

pub use error::{Result, TopologyError};
pub use link::{parse_cost, Link, LinkId};
pub use router::{Router, RouterId};
pub use snapshot::{LinkOption, LinkSpec, Selections, TopologySnapshot};
pub use store::Topology;

/// Smallest accepted link cost.
pub const MIN_LINK_COST: u32 = 1;

// Links must never be free; zero is the rejection value of cost parsing.
const _: () = assert!(MIN_LINK_COST > 0);
