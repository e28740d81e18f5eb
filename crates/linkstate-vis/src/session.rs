//! Async playback session.
//!
//! A [`Session`] is the only place where the wall clock meets the
//! visualizer's virtual time. It fetches phase data from the backend, hands it
//! to the engine, then sleeps until each virtual deadline (scaled by the
//! playback speed) and broadcasts a scene frame after processing it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, Mutex, RwLock};
use tracing::{error, info, warn};

use crate::backend::ComputeBackend;
use crate::engine::Visualizer;
use crate::error::{Error, Result};
use crate::phase::{Phase, PhaseKind};
use crate::playback::{PlaybackSpeed, PlaybackStatus};
use crate::scene::Scene;

/// Frames buffered per subscriber before the slowest one starts lagging.
const FRAME_CHANNEL_CAPACITY: usize = 1024;

/// What is pushed to connected clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Frame {
    /// The drawn scene after a processed deadline
    Scene {
        phase: Phase,
        now_ms: u64,
        scene: Scene,
    },
    /// A failure or unmet precondition for the user
    Alert { message: String },
    /// Step log and path results changed
    Log {
        step_log: String,
        path_results: String,
    },
}

/// Exclusive right to play phases on a session. Clears the run flag when
/// dropped, however the run ends.
#[derive(Debug)]
pub struct RunGuard(Arc<AtomicBool>);

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Shared driver of one visualizer.
pub struct Session {
    vis: Mutex<Visualizer<Scene>>,
    backend: Arc<dyn ComputeBackend>,
    frames: broadcast::Sender<Frame>,
    speed: RwLock<PlaybackSpeed>,
    running: Arc<AtomicBool>,
}

impl Session {
    pub fn new(vis: Visualizer<Scene>, backend: Arc<dyn ComputeBackend>, speed: PlaybackSpeed) -> Self {
        let (frames, _) = broadcast::channel(FRAME_CHANNEL_CAPACITY);
        Self {
            vis: Mutex::new(vis),
            backend,
            frames,
            speed: RwLock::new(speed),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The visualizer, for topology edits and queries.
    pub fn visualizer(&self) -> &Mutex<Visualizer<Scene>> {
        &self.vis
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Frame> {
        self.frames.subscribe()
    }

    pub async fn speed(&self) -> PlaybackSpeed {
        *self.speed.read().await
    }

    pub async fn set_speed(&self, speed: PlaybackSpeed) {
        *self.speed.write().await = speed;
        info!(%speed, "playback speed changed");
    }

    pub async fn status(&self) -> PlaybackStatus {
        let speed = self.speed().await;
        self.vis.lock().await.status(speed)
    }

    fn publish(&self, frame: Frame) {
        // No subscribers is fine.
        let _ = self.frames.send(frame);
    }

    /// Snapshot of the current scene.
    pub async fn scene_frame(&self) -> Frame {
        let vis = self.vis.lock().await;
        Frame::Scene {
            phase: vis.phase(),
            now_ms: u64::try_from(vis.now().as_millis()).unwrap_or(u64::MAX),
            scene: vis.surface().clone(),
        }
    }

    pub async fn publish_scene(&self) {
        let frame = self.scene_frame().await;
        self.publish(frame);
    }

    async fn publish_log(&self) {
        let frame = {
            let vis = self.vis.lock().await;
            Frame::Log {
                step_log: vis.step_log().to_string(),
                path_results: vis.path_results().to_string(),
            }
        };
        self.publish(frame);
    }

    /// Log a failure and tell clients about it.
    fn alert(&self, err: &Error) {
        if err.is_precondition() {
            warn!(error = %err, "request rejected");
        } else {
            error!(error = %err, "request failed");
        }
        self.publish(Frame::Alert {
            message: err.to_string(),
        });
    }

    /// Claim the session for one run, or fail with [`Error::Busy`] if a phase
    /// or pipeline is already running.
    pub fn try_claim(&self) -> Result<RunGuard> {
        if self.running.swap(true, Ordering::AcqRel) {
            return Err(Error::Busy);
        }
        Ok(RunGuard(self.running.clone()))
    }

    /// Fetch one phase's data, play it until it settles.
    pub async fn run_phase(&self, kind: PhaseKind) -> Result<()> {
        match self.try_claim() {
            Ok(guard) => self.run_phase_claimed(guard, kind).await,
            Err(e) => {
                self.alert(&e);
                Err(e)
            }
        }
    }

    /// [`Session::run_phase`] with the run already claimed.
    pub async fn run_phase_claimed(&self, _guard: RunGuard, kind: PhaseKind) -> Result<()> {
        let result = async {
            self.start_phase(kind).await?;
            self.play_until_settled().await;
            Ok::<(), Error>(())
        }
        .await;
        result.inspect_err(|e| self.alert(e))
    }

    /// Discovery, flooding and routing tables in order. Each phase starts
    /// only after the previous one has settled plus a short buffer, and
    /// fetches its data from the backend at that moment.
    pub async fn run_pipeline(&self) -> Result<()> {
        match self.try_claim() {
            Ok(guard) => self.run_pipeline_claimed(guard).await,
            Err(e) => {
                self.alert(&e);
                Err(e)
            }
        }
    }

    /// [`Session::run_pipeline`] with the run already claimed.
    pub async fn run_pipeline_claimed(&self, _guard: RunGuard) -> Result<()> {
        let result = async {
            for (i, kind) in PhaseKind::ALL.into_iter().enumerate() {
                if i > 0 {
                    self.pause_between_phases().await;
                }
                self.start_phase(kind).await?;
                self.play_until_settled().await;
            }
            Ok::<(), Error>(())
        }
        .await;
        result.inspect_err(|e| self.alert(e))
    }

    /// Ask the backend for shortest paths from `source` and highlight them.
    pub async fn compute_paths(&self, source: Option<&str>) -> Result<()> {
        let result = async {
            let request = self.vis.lock().await.path_request(source)?;
            let response = self.backend.calculate(&request).await?;
            self.vis.lock().await.show_paths(&response);
            Ok::<(), Error>(())
        }
        .await;
        match result {
            Ok(()) => {
                self.publish_log().await;
                self.publish_scene().await;
                Ok(())
            }
            Err(e) => {
                self.alert(&e);
                Err(e)
            }
        }
    }

    async fn start_phase(&self, kind: PhaseKind) -> Result<()> {
        let request = {
            let vis = self.vis.lock().await;
            vis.ensure_idle()?;
            vis.phase_request()
        };
        info!(phase = %kind, "fetching phase data");

        // The lock is not held across the backend call.
        match kind {
            PhaseKind::Discovery => {
                let response = self.backend.start_discovery(&request).await?;
                self.vis.lock().await.begin_discovery(&response.steps)?;
            }
            PhaseKind::Flooding => {
                let response = self.backend.start_flooding(&request).await?;
                self.vis.lock().await.begin_flooding(&response.steps)?;
            }
            PhaseKind::RoutingTables => {
                let response = self.backend.build_routing_tables(&request).await?;
                self.vis.lock().await.show_routing_tables(&response)?;
            }
        }

        self.publish_log().await;
        self.publish_scene().await;
        Ok(())
    }

    /// Play the timeline in real time until nothing is pending and no marker
    /// is in flight.
    async fn play_until_settled(&self) {
        loop {
            let (due, now) = {
                let vis = self.vis.lock().await;
                if vis.is_settled() {
                    break;
                }
                match vis.next_deadline() {
                    Some(due) => (due, vis.now()),
                    None => break,
                }
            };

            self.wait(due.saturating_sub(now)).await;
            self.vis.lock().await.advance_to(due);
            self.publish_scene().await;
        }
    }

    async fn pause_between_phases(&self) {
        let buffer = self.vis.lock().await.timings().phase_buffer;
        self.wait(buffer).await;
        self.vis.lock().await.advance_by(buffer);
    }

    async fn wait(&self, virtual_time: Duration) {
        let wall = self.speed().await.scale(virtual_time);
        if wall.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(wall).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::VisEvent;
    use crate::testing::MockBackend;
    use tokio::time::Instant;
    use tokio_test::{assert_err, assert_ok};

    fn session(backend: Arc<MockBackend>, speed: PlaybackSpeed) -> Session {
        let mut vis = Visualizer::new(Scene::new());
        vis.add_router("A").unwrap();
        vis.add_router("B").unwrap();
        vis.add_link("A", "B", 1).unwrap();
        Session::new(vis, backend, speed)
    }

    #[tokio::test(start_paused = true)]
    async fn phase_plays_in_scaled_real_time() {
        let backend = Arc::new(MockBackend::new());
        let session = session(backend, PlaybackSpeed::Quarter);
        let mut frames = session.subscribe();

        let started = Instant::now();
        session.run_phase(PhaseKind::Discovery).await.unwrap();

        // Last reply launches at 3000 + 2000 ms and clears 1525 ms later.
        assert_eq!(session.visualizer().lock().await.now(), Duration::from_millis(6525));
        assert_eq!(started.elapsed(), Duration::from_millis(6525) * 4);

        let mut scenes = 0;
        let mut logs = 0;
        while let Ok(frame) = frames.try_recv() {
            match frame {
                Frame::Scene { .. } => scenes += 1,
                Frame::Log { step_log, .. } => {
                    assert!(step_log.contains("Neighbor Discovery Steps"));
                    logs += 1;
                }
                Frame::Alert { message } => panic!("unexpected alert: {message}"),
            }
        }
        assert_eq!(logs, 1);
        assert!(scenes > 60);
        assert_eq!(session.status().await.phase, Phase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn maximum_speed_does_not_wait() {
        let backend = Arc::new(MockBackend::new());
        let session = session(backend, PlaybackSpeed::Maximum);

        let started = Instant::now();
        assert_ok!(session.run_phase(PhaseKind::Flooding).await);
        assert_eq!(started.elapsed(), Duration::ZERO);
        assert!(session.status().await.settled);
    }

    #[tokio::test(start_paused = true)]
    async fn pipeline_waits_for_settled_phases() {
        let backend = Arc::new(MockBackend::new());
        let session = session(backend.clone(), PlaybackSpeed::Normal);

        session.run_pipeline().await.unwrap();

        let calls = backend.calls();
        let names: Vec<_> = calls.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, ["discovery", "flooding", "tables"]);
        // Discovery settles at 6525 ms, then the 500 ms buffer.
        assert_eq!(calls[1].1 - calls[0].1, Duration::from_millis(7025));

        let vis = session.visualizer().lock().await;
        let mut launched = 0;
        let mut arrived = 0;
        let mut settled_at = None;
        for event in vis.events() {
            match event {
                VisEvent::MarkerLaunched { .. } => launched += 1,
                VisEvent::MarkerArrived { .. } => arrived += 1,
                VisEvent::PhaseSettled { at_ms, .. } => settled_at = Some(*at_ms),
                VisEvent::PhaseStarted { phase, at_ms, .. } if *phase != Phase::Discovering => {
                    assert_eq!(launched, arrived, "{phase} started with markers in flight");
                    assert_eq!(Some(*at_ms), settled_at.map(|t| t + 500));
                }
                _ => {}
            }
        }
        assert_eq!(vis.phase(), Phase::Idle);
        assert!(vis.step_log().contains("Routing Table for B"));
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_runs_are_rejected() {
        let backend = Arc::new(MockBackend::new());
        let session = Arc::new(session(backend, PlaybackSpeed::Normal));

        let running = {
            let session = session.clone();
            tokio::spawn(async move { session.run_pipeline().await })
        };
        while session.visualizer().lock().await.phase().is_idle() {
            tokio::task::yield_now().await;
        }

        assert!(matches!(session.try_claim(), Err(Error::Busy)));
        assert!(matches!(
            session.run_phase(PhaseKind::Flooding).await,
            Err(Error::Busy)
        ));

        running.await.unwrap().unwrap();
        assert_ok!(session.try_claim());
    }

    #[tokio::test(start_paused = true)]
    async fn paths_are_highlighted_and_logged() {
        let backend = Arc::new(MockBackend::new());
        let session = session(backend, PlaybackSpeed::Normal);
        let mut frames = session.subscribe();

        session.compute_paths(Some("A")).await.unwrap();

        let vis = session.visualizer().lock().await;
        assert!(vis.path_results().contains("Path to B"));
        assert!(vis.step_log().contains("Step 1: Processing Router A"));
        assert_eq!(vis.surface().link("A-B").unwrap().style.width, crate::style::PATH_LINK_WIDTH);
        assert!(matches!(frames.try_recv(), Ok(Frame::Log { .. })));
        assert!(matches!(frames.try_recv(), Ok(Frame::Scene { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn precondition_failure_is_alerted_without_calling_backend() {
        let backend = Arc::new(MockBackend::new());
        let session = session(backend.clone(), PlaybackSpeed::Normal);
        let mut frames = session.subscribe();

        let err = session.compute_paths(None).await.unwrap_err();
        assert!(matches!(err, Error::NoSource));
        assert_eq!(
            frames.try_recv().unwrap(),
            Frame::Alert {
                message: "Please select a source router".into()
            }
        );
        assert!(backend.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn backend_failure_is_alerted_and_releases_the_session() {
        let backend = Arc::new(MockBackend::failing());
        let session = session(backend, PlaybackSpeed::Normal);
        let mut frames = session.subscribe();

        let err = assert_err!(session.run_pipeline().await);
        assert!(matches!(err, Error::Status(500)));
        assert!(matches!(frames.try_recv(), Ok(Frame::Alert { .. })));
        assert_ok!(session.try_claim());
    }
}
