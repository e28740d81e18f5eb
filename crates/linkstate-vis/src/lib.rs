//! Link-State Routing Visualization
//!
//! Animated playback of how link-state routers learn a network.
//!
//! # Architecture
//!
//! - **Engine**: Virtual-time visualizer owning the topology, packet markers
//!   and the flood walks of the current phase
//! - **Session**: Plays the engine in real time at the chosen speed and
//!   fetches phase data from the routing backend
//! - **WebSocket**: Streams drawn scenes, logs and alerts to the browser
//! - **REST API**: Edit the topology, start phases, change playback speed
//!
//! # Usage
//!
//! ```ignore
//! let vis = Visualizer::new(Scene::new());
//! let backend = Arc::new(HttpBackend::new("http://127.0.0.1:5000"));
//! let session = Session::new(vis, backend, PlaybackSpeed::Normal);
//!
//! let server = VisServer::new(Arc::new(session));
//! server.serve("127.0.0.1:3000".parse()?).await?;
//! ```

mod backend;
mod config;
mod engine;
mod error;
mod events;
mod flood;
mod highlight;
mod marker;
mod phase;
mod playback;
pub mod report;
mod scene;
mod server;
mod session;
pub mod style;
mod surface;
mod timeline;
pub mod wire;

#[cfg(test)]
mod testing;

pub use backend::{ComputeBackend, HttpBackend};
pub use config::VisConfig;
pub use engine::{Continuation, Visualizer};
pub use error::{Error, Result};
pub use events::VisEvent;
pub use flood::{FloodHop, FloodWalk};
pub use highlight::{highlight_paths, reset_styles};
pub use marker::{MarkerAnimation, MarkerId, MARKER_FRAMES};
pub use phase::{Phase, PhaseKind, Timings};
pub use playback::{PlaybackSpeed, PlaybackStatus};
pub use scene::{Scene, SceneLink, SceneMarker, SceneRouter};
pub use server::VisServer;
pub use session::{Frame, RunGuard, Session};
pub use surface::{Point, RenderSurface};
pub use timeline::{TaskId, Timeline};
