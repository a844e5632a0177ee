//! The render loop thread.
//!
//! The control thread keeps a [`RenderLoopThread`]; the loop itself runs on a
//! dedicated OS thread that owns the [`RenderBackend`]. The only things the
//! two share are the command channel, the lifecycle state and the status
//! channel.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use glam::Quat;
use shared::{CommandKind, RenderCommand};

use super::backend::{FrameContext, RenderBackend};
use super::channel::{DrainedCommands, RenderCommandChannel};
use super::renderable::Renderable;
use super::state::{RenderLoopState, RenderStatus, StateCell};
use crate::config::RenderSettings;
use crate::error::RenderError;

pub struct RenderLoopThread {
    channel: Arc<RenderCommandChannel>,
    state: Arc<StateCell>,
    settings: RenderSettings,
    /// Renderables registered before start; moved into the thread by `start`
    offline: Vec<Renderable>,
    handle: Option<JoinHandle<()>>,
    started: bool,
    status_tx: Sender<RenderStatus>,
    status_rx: Receiver<RenderStatus>,
}

impl RenderLoopThread {
    pub fn new(settings: RenderSettings) -> Self {
        let (status_tx, status_rx) = mpsc::channel();
        Self {
            channel: Arc::new(RenderCommandChannel::new()),
            state: Arc::new(StateCell::new()),
            settings,
            offline: Vec::new(),
            handle: None,
            started: false,
            status_tx,
            status_rx,
        }
    }

    /// Register a renderable to show once the loop starts.
    ///
    /// Only possible before [`start`](Self::start): the list is handed to the
    /// render thread at start and nothing guards it afterwards.
    pub fn add_actor_offline(&mut self, renderable: Renderable) -> Result<(), RenderError> {
        if self.started {
            tracing::warn!("Renderable {} registered after render loop start", renderable.id());
            return Err(RenderError::AlreadyStarted);
        }
        self.offline.push(renderable);
        Ok(())
    }

    pub fn offline_count(&self) -> usize {
        self.offline.len()
    }

    /// Spawn the render thread. Can only be called once.
    pub fn start(&mut self, backend: Box<dyn RenderBackend>) -> Result<(), RenderError> {
        if self.started {
            return Err(RenderError::AlreadyStarted);
        }
        self.started = true;

        let worker = RenderWorker {
            channel: self.channel.clone(),
            state: self.state.clone(),
            status: self.status_tx.clone(),
            renderables: std::mem::take(&mut self.offline),
            backend,
            frame_interval: self.settings.frame_interval(),
        };
        let handle = std::thread::Builder::new()
            .name("render-loop".to_string())
            .spawn(move || worker.run())
            .map_err(|e| {
                self.state.advance(RenderLoopState::Stopped);
                RenderError::Spawn(e)
            })?;
        self.handle = Some(handle);
        Ok(())
    }

    /// Queue a command for the next frame. Safe from any thread via
    /// [`channel`](Self::channel).
    pub fn issue_command(&self, command: RenderCommand) {
        if self.state.get() == RenderLoopState::Stopped {
            tracing::debug!("Command {command:?} issued to a stopped render loop");
        }
        self.channel.issue_command(command);
    }

    pub fn issue(&self, kind: CommandKind, value: f64) {
        self.issue_command(RenderCommand::from_kind(kind, value));
    }

    /// Producer side of the command channel, for other threads
    pub fn channel(&self) -> Arc<RenderCommandChannel> {
        self.channel.clone()
    }

    pub fn state(&self) -> RenderLoopState {
        self.state.get()
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state(), RenderLoopState::Active | RenderLoopState::Terminating)
    }

    pub fn wait_for_state(&self, target: RenderLoopState, timeout: Duration) -> bool {
        self.state.wait_for(target, timeout)
    }

    /// Ask the loop to end. Idempotent.
    pub fn stop(&self) {
        self.channel.issue_command(RenderCommand::EndRender);
    }

    /// Wait for the render thread to exit
    pub fn join(&mut self) -> Result<(), RenderError> {
        let handle = self.handle.take().ok_or(RenderError::NotStarted)?;
        if handle.join().is_err() {
            tracing::error!("Render thread panicked");
            self.state.advance(RenderLoopState::Stopped);
        }
        Ok(())
    }

    /// Status messages reported since the last poll
    pub fn poll_status(&self) -> Vec<RenderStatus> {
        self.status_rx.try_iter().collect()
    }
}

impl Drop for RenderLoopThread {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.stop();
            let _ = self.join();
        }
    }
}

/// Everything the render thread owns
struct RenderWorker {
    channel: Arc<RenderCommandChannel>,
    state: Arc<StateCell>,
    status: Sender<RenderStatus>,
    renderables: Vec<Renderable>,
    backend: Box<dyn RenderBackend>,
    frame_interval: Duration,
}

/// Current view orientation plus the total rotation applied so far
struct ViewOrientation {
    rotation: Quat,
    euler_degrees: [f64; 3],
}

impl ViewOrientation {
    fn apply(&mut self, drained: &DrainedCommands) {
        let [x, y, z] = drained.rotation;
        let delta = Quat::from_rotation_z((z as f32).to_radians())
            * Quat::from_rotation_y((y as f32).to_radians())
            * Quat::from_rotation_x((x as f32).to_radians());
        self.rotation = (delta * self.rotation).normalize();
        for (total, d) in self.euler_degrees.iter_mut().zip(drained.rotation) {
            *total += d;
        }
    }
}

impl RenderWorker {
    fn run(mut self) {
        if let Err(e) = self.backend.initialize(&self.renderables) {
            tracing::error!("Render loop failed to start: {e}");
            // InitFailed is queued before Stopped becomes visible
            let _ = self.status.send(RenderStatus::InitFailed(e.to_string()));
            self.state.advance(RenderLoopState::Stopped);
            return;
        }

        self.state.advance(RenderLoopState::Active);
        let _ = self.status.send(RenderStatus::Started);
        tracing::info!(
            "Render loop started ({} renderables, {:?} per frame)",
            self.renderables.len(),
            self.frame_interval
        );

        let mut view = ViewOrientation {
            rotation: Quat::IDENTITY,
            euler_degrees: [0.0; 3],
        };
        let mut frame: u64 = 0;
        let mut draw_errors: u64 = 0;
        let mut last = Instant::now();

        loop {
            let timeout = self.frame_interval.saturating_sub(last.elapsed());
            let drained = self.channel.wait_and_drain(timeout);
            if drained.end_requested {
                break;
            }

            let now = Instant::now();
            let elapsed = now - last;
            last = now;

            view.apply(&drained);
            frame += 1;
            let ctx = FrameContext {
                frame,
                delta: drained.rotation,
                euler_degrees: view.euler_degrees,
                orientation: view.rotation,
                elapsed,
            };
            if let Err(e) = self.backend.draw(&ctx, &self.renderables) {
                draw_errors += 1;
                if draw_errors == 1 {
                    tracing::warn!("Frame {frame} failed: {e}");
                } else {
                    tracing::debug!("Frame {frame} failed: {e}");
                }
            }
        }

        self.state.advance(RenderLoopState::Terminating);
        self.backend.release();
        self.state.advance(RenderLoopState::Stopped);
        let _ = self.status.send(RenderStatus::Stopped { frames: frame });
        tracing::info!("Render loop stopped after {frame} frames ({draw_errors} failed)");
    }
}
