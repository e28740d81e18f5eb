//! Link-State Visualization Server
//!
//! Serve the routing visualizer against a routing backend.

use std::sync::Arc;

use linkstate_vis::{HttpBackend, Scene, Session, VisConfig, VisServer, Visualizer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "linkstate_vis=info,linkstate_topology=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = VisConfig::from_env()?;
    let backend = Arc::new(HttpBackend::new(config.backend_url.clone()));
    tracing::info!(
        backend = backend.base_url(),
        speed = %config.speed,
        "Starting link-state visualizer"
    );

    let vis = Visualizer::with_timings(Scene::new(), config.timings.clone());
    let session = Session::new(vis, backend, config.speed);

    VisServer::new(Arc::new(session)).serve(config.listen_addr).await?;

    Ok(())
}
