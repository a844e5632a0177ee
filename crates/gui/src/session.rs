//! Viewer session: the part tree, the headset render loop and the status log.
//!
//! Everything the window and the JSON command protocol do goes through
//! here, so the same operations can be driven headless in tests.

use std::collections::VecDeque;
use std::path::Path;
use std::time::Duration;

use shared::{Axis, ColumnValue, CommandKind, RenderCommand};

use crate::config::ViewerSettings;
use crate::error::{MeshLoadError, RenderError};
use crate::mesh::MeshReader;
use crate::render::{MirrorBackend, MirrorHandle, RenderBackend, RenderLoopState, RenderLoopThread, RenderStatus};
use crate::tree::{PartId, PartTree};

/// How long `stop_vr` waits for the loop to wind down
const STOP_TIMEOUT: Duration = Duration::from_secs(5);

/// Status messages kept; older ones are dropped
pub const STATUS_LOG_LEN: usize = 256;

pub struct ViewerSession {
    pub tree: PartTree,
    settings: ViewerSettings,
    vr: Option<RenderLoopThread>,
    mirror: Option<MirrorHandle>,
    status: VecDeque<String>,
}

impl ViewerSession {
    pub fn new(settings: ViewerSettings) -> Self {
        Self {
            tree: PartTree::with_settings(&settings),
            settings,
            vr: None,
            mirror: None,
            status: VecDeque::new(),
        }
    }

    pub fn settings(&self) -> &ViewerSettings {
        &self.settings
    }

    // ── Parts ─────────────────────────────────────────────────

    /// Add a visible part under `parent` (top level when `None`)
    pub fn add_part(&mut self, parent: Option<PartId>, name: &str) -> Option<PartId> {
        let parent = parent.unwrap_or(self.tree.root());
        let id = self
            .tree
            .append_new(parent, vec![ColumnValue::from(name), ColumnValue::Bool(true)])?;
        self.push_status(format!("Added part {name}"));
        Some(id)
    }

    /// Remove a part with everything below it
    pub fn remove_part(&mut self, id: PartId) -> bool {
        let (Some(parent), Some(row)) = (self.tree.parent_of(id), self.tree.row_of(id)) else {
            return false;
        };
        let name = self.tree.name(id);
        let removed = self.tree.remove_children(parent, row, 1);
        if removed {
            self.push_status(format!("Removed part {name}"));
        }
        removed
    }

    pub fn load_mesh(&mut self, id: PartId, path: &Path) -> Result<(), MeshLoadError> {
        let result = self.tree.load_mesh(id, path);
        self.report_load(id, path, &result);
        result
    }

    pub fn load_mesh_with(&mut self, id: PartId, path: &Path, reader: &dyn MeshReader) -> Result<(), MeshLoadError> {
        let result = self.tree.load_mesh_with(id, path, reader);
        self.report_load(id, path, &result);
        result
    }

    fn report_load(&mut self, id: PartId, path: &Path, result: &Result<(), MeshLoadError>) {
        let file = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        match result {
            Ok(()) => {
                let name = self.tree.name(id);
                self.push_status(format!("Loaded {file} into {name}"));
            }
            Err(e) => self.push_status(format!("Failed to load {file}: {e}")),
        }
    }

    // ── Headset ───────────────────────────────────────────────

    /// Start the headset loop with the bundled mirror backend
    pub fn start_vr(&mut self) -> Result<(), RenderError> {
        let (backend, handle) = MirrorBackend::new(self.settings.render.history_len);
        self.start_vr_with(Box::new(backend))?;
        self.mirror = Some(handle);
        Ok(())
    }

    /// Register a linked renderable for every part with a mesh, then start
    /// the loop on `backend`
    pub fn start_vr_with(&mut self, backend: Box<dyn RenderBackend>) -> Result<(), RenderError> {
        if self.vr.as_ref().is_some_and(|vr| vr.state() != RenderLoopState::Stopped) {
            self.push_status("VR is already running".to_string());
            return Err(RenderError::AlreadyStarted);
        }
        // A previous loop has stopped; dropping it joins the thread
        self.vr = None;
        self.mirror = None;

        let mut vr = RenderLoopThread::new(self.settings.render.clone());
        for id in self.tree.descendants(self.tree.root()) {
            if let Some(renderable) = self.tree.create_independent_renderable(id) {
                vr.add_actor_offline(renderable)?;
            }
        }
        let count = vr.offline_count();
        if let Err(e) = vr.start(backend) {
            self.push_status(format!("VR failed to start: {e}"));
            return Err(e);
        }
        tracing::info!("VR started with {count} parts");
        self.vr = Some(vr);
        Ok(())
    }

    /// Rotate the headset view. False once the loop has stopped or if it
    /// was never started.
    pub fn rotate(&mut self, axis: Axis, degrees: f64) -> bool {
        self.send(RenderCommand::Rotate { axis, degrees })
    }

    pub fn issue(&mut self, kind: CommandKind, value: f64) -> bool {
        self.send(RenderCommand::from_kind(kind, value))
    }

    fn send(&mut self, command: RenderCommand) -> bool {
        match &self.vr {
            Some(vr) if vr.state() != RenderLoopState::Stopped => {
                vr.issue_command(command);
                true
            }
            _ => {
                tracing::debug!("No running render loop for {command:?}");
                false
            }
        }
    }

    /// Stop the headset loop and wait for its thread. False if nothing ran.
    pub fn stop_vr(&mut self) -> bool {
        let Some(vr) = self.vr.as_mut() else {
            return false;
        };
        vr.stop();
        if !vr.wait_for_state(RenderLoopState::Stopped, STOP_TIMEOUT) {
            tracing::warn!("Render loop did not stop within {STOP_TIMEOUT:?}");
        }
        if let Err(e) = vr.join() {
            tracing::debug!("Render loop join: {e}");
        }
        self.poll();
        true
    }

    pub fn vr_state(&self) -> RenderLoopState {
        self.vr.as_ref().map_or(RenderLoopState::Idle, RenderLoopThread::state)
    }

    pub fn vr(&self) -> Option<&RenderLoopThread> {
        self.vr.as_ref()
    }

    /// Frames published by the mirror backend, if it is the one running
    pub fn mirror(&self) -> Option<&MirrorHandle> {
        self.mirror.as_ref()
    }

    /// Turn render loop status reports into status messages
    pub fn poll(&mut self) {
        let reports = self.vr.as_ref().map(RenderLoopThread::poll_status).unwrap_or_default();
        for report in reports {
            let msg = match report {
                RenderStatus::Started => "VR render loop started".to_string(),
                RenderStatus::InitFailed(e) => format!("VR failed to start: {e}"),
                RenderStatus::Stopped { frames } => format!("VR stopped after {frames} frames"),
            };
            self.push_status(msg);
        }
    }

    // ── Status log ────────────────────────────────────────────

    pub fn push_status(&mut self, msg: String) {
        tracing::info!("{msg}");
        if self.status.len() == STATUS_LOG_LEN {
            self.status.pop_front();
        }
        self.status.push_back(msg);
    }

    /// Oldest first
    pub fn status_messages(&self) -> &VecDeque<String> {
        &self.status
    }

    pub fn last_status(&self) -> Option<&str> {
        self.status.back().map(String::as_str)
    }
}

impl Default for ViewerSession {
    fn default() -> Self {
        Self::new(ViewerSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{cube, MeshData};

    struct CubeReader;

    impl MeshReader for CubeReader {
        fn read(&self, _: &Path) -> Result<MeshData, MeshLoadError> {
            Ok(cube(1.0, 1.0, 1.0))
        }
    }

    fn fast_session() -> ViewerSession {
        let mut settings = ViewerSettings::default();
        settings.render.frame_interval_ms = 5;
        ViewerSession::new(settings)
    }

    #[test]
    fn test_status_log_is_capped() {
        let mut s = ViewerSession::default();
        for i in 0..STATUS_LOG_LEN + 10 {
            s.push_status(format!("message {i}"));
        }
        assert_eq!(s.status_messages().len(), STATUS_LOG_LEN);
        assert_eq!(s.status_messages().front().map(String::as_str), Some("message 10"));
        let last = format!("message {}", STATUS_LOG_LEN + 9);
        assert_eq!(s.last_status(), Some(last.as_str()));
    }

    #[test]
    fn test_new_session_empty() {
        let s = ViewerSession::default();
        assert_eq!(s.tree.child_count(s.tree.root()), 0);
        assert_eq!(s.vr_state(), RenderLoopState::Idle);
        assert!(s.status_messages().is_empty());
    }

    #[test]
    fn test_add_and_remove_part() {
        let mut s = ViewerSession::default();
        let top = s.add_part(None, "Frame").unwrap();
        let child = s.add_part(Some(top), "Bolt").unwrap();
        assert_eq!(s.tree.parent_of(child), Some(top));
        assert!(s.remove_part(top));
        assert!(!s.tree.contains(child));
        assert_eq!(s.last_status(), Some("Removed part Frame"));
        assert!(!s.remove_part(top));
    }

    #[test]
    fn test_failed_load_is_reported() {
        let mut s = ViewerSession::default();
        let id = s.add_part(None, "Missing").unwrap();
        let dir = tempfile::tempdir().unwrap();
        assert!(s.load_mesh(id, &dir.path().join("missing.stl")).is_err());
        assert!(s.last_status().unwrap().starts_with("Failed to load"));
    }

    #[test]
    fn test_rotate_without_loop_is_refused() {
        let mut s = ViewerSession::default();
        assert!(!s.rotate(Axis::X, 10.0));
        assert!(!s.stop_vr());
    }

    #[test]
    fn test_start_vr_links_meshed_parts() {
        let mut s = fast_session();
        let a = s.add_part(None, "A").unwrap();
        s.add_part(None, "No mesh").unwrap();
        s.load_mesh_with(a, Path::new("a.stl"), &CubeReader).unwrap();

        s.start_vr().unwrap();
        assert!(matches!(s.start_vr(), Err(RenderError::AlreadyStarted)));
        let vr = s.vr().unwrap();
        assert!(vr.wait_for_state(RenderLoopState::Active, STOP_TIMEOUT));
        assert!(s.rotate(Axis::Y, 30.0));

        let mirror = s.mirror().unwrap().clone();
        let deadline = std::time::Instant::now() + STOP_TIMEOUT;
        while mirror.stats().total_rotation[1] < 30.0 && std::time::Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(2));
        }
        assert_eq!(mirror.latest_frame().unwrap().parts.len(), 1);

        assert!(s.stop_vr());
        assert_eq!(s.vr_state(), RenderLoopState::Stopped);
        let stats = mirror.stats();
        assert!(stats.released);
        assert_eq!(stats.total_rotation, [0.0, 30.0, 0.0]);
        assert!(s.last_status().unwrap().starts_with("VR stopped after"));

        // A stopped loop can be replaced by a fresh one
        s.start_vr().unwrap();
        assert!(s.stop_vr());
    }
}
