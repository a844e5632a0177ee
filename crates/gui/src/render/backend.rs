//! Render backends driven by the render loop.
//!
//! [`RenderBackend`] is the seam to the GPU / headset runtime. The bundled
//! [`MirrorBackend`] does no rasterization: it publishes each frame so the
//! desktop window can show a mirror of what the headset would display.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use glam::Quat;

use super::renderable::{Renderable, VisualProps};
use crate::error::RenderError;

/// Per-frame input to a backend
#[derive(Debug, Clone)]
pub struct FrameContext {
    /// 1-based frame counter
    pub frame: u64,
    /// Rotation applied this frame (degrees per axis)
    pub delta: [f64; 3],
    /// Total rotation applied since start (degrees per axis)
    pub euler_degrees: [f64; 3],
    pub orientation: Quat,
    /// Wall-clock time since the previous frame
    pub elapsed: Duration,
}

/// Hardware side of the render loop. Owned exclusively by the render thread.
pub trait RenderBackend: Send {
    /// Acquire hardware resources. An error stops the render thread.
    fn initialize(&mut self, renderables: &[Renderable]) -> Result<(), RenderError>;

    fn draw(&mut self, frame: &FrameContext, renderables: &[Renderable]) -> Result<(), RenderError>;

    /// Release hardware resources. Called once, after the last frame.
    fn release(&mut self);
}

/// Counters kept by [`MirrorBackend`]
#[derive(Debug, Clone, Default)]
pub struct BackendStats {
    pub initialized: bool,
    pub released: bool,
    pub frames_drawn: u64,
    /// Non-zero per-frame rotation deltas, oldest first
    pub applied: VecDeque<[f64; 3]>,
    pub total_rotation: [f64; 3],
}

/// Last frame published by [`MirrorBackend`]
#[derive(Debug, Clone, Default)]
pub struct MirrorFrame {
    pub frame: u64,
    pub orientation: Quat,
    pub euler_degrees: [f64; 3],
    pub elapsed: Duration,
    /// Visible renderables at draw time
    pub parts: Vec<VisualProps>,
}

#[derive(Debug, Default)]
struct MirrorShared {
    stats: BackendStats,
    frame: Option<MirrorFrame>,
}

/// Read side of a [`MirrorBackend`], usable from any thread
#[derive(Debug, Clone, Default)]
pub struct MirrorHandle {
    shared: Arc<Mutex<MirrorShared>>,
}

impl MirrorHandle {
    fn lock(&self) -> MutexGuard<'_, MirrorShared> {
        self.shared.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn stats(&self) -> BackendStats {
        self.lock().stats.clone()
    }

    pub fn latest_frame(&self) -> Option<MirrorFrame> {
        self.lock().frame.clone()
    }
}

pub struct MirrorBackend {
    handle: MirrorHandle,
    history_len: usize,
}

impl MirrorBackend {
    pub fn new(history_len: usize) -> (Self, MirrorHandle) {
        let handle = MirrorHandle::default();
        let backend = Self {
            handle: handle.clone(),
            history_len: history_len.max(1),
        };
        (backend, handle)
    }
}

impl RenderBackend for MirrorBackend {
    fn initialize(&mut self, renderables: &[Renderable]) -> Result<(), RenderError> {
        tracing::info!("Mirror backend ready with {} renderables", renderables.len());
        self.handle.lock().stats.initialized = true;
        Ok(())
    }

    fn draw(&mut self, frame: &FrameContext, renderables: &[Renderable]) -> Result<(), RenderError> {
        let parts: Vec<VisualProps> = renderables
            .iter()
            .map(Renderable::snapshot)
            .filter(|p| p.visible)
            .collect();

        let mut shared = self.handle.lock();
        let stats = &mut shared.stats;
        stats.frames_drawn += 1;
        if frame.delta.iter().any(|d| *d != 0.0) {
            if stats.applied.len() == self.history_len {
                stats.applied.pop_front();
            }
            stats.applied.push_back(frame.delta);
            for (total, d) in stats.total_rotation.iter_mut().zip(frame.delta) {
                *total += d;
            }
        }
        shared.frame = Some(MirrorFrame {
            frame: frame.frame,
            orientation: frame.orientation,
            euler_degrees: frame.euler_degrees,
            elapsed: frame.elapsed,
            parts,
        });
        Ok(())
    }

    fn release(&mut self) {
        self.handle.lock().stats.released = true;
        tracing::info!("Mirror backend released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::cube;
    use shared::Rgb;

    fn frame(n: u64, delta: [f64; 3]) -> FrameContext {
        FrameContext {
            frame: n,
            delta,
            euler_degrees: delta,
            orientation: Quat::IDENTITY,
            elapsed: Duration::from_millis(16),
        }
    }

    #[test]
    fn test_mirror_publishes_only_visible_parts() {
        let (mut backend, handle) = MirrorBackend::new(8);
        let shown = Renderable::new(Arc::new(cube(1.0, 1.0, 1.0)), Rgb::default(), true);
        let hidden = Renderable::new(Arc::new(cube(1.0, 1.0, 1.0)), Rgb::default(), false);
        let list = vec![shown, hidden];

        backend.initialize(&list).unwrap();
        backend.draw(&frame(1, [0.0; 3]), &list).unwrap();

        let f = handle.latest_frame().unwrap();
        assert_eq!(f.frame, 1);
        assert_eq!(f.parts.len(), 1);
        assert!(handle.stats().initialized);
        assert!(handle.stats().applied.is_empty());
    }

    #[test]
    fn test_mirror_history_is_bounded() {
        let (mut backend, handle) = MirrorBackend::new(2);
        for n in 1..=3 {
            backend.draw(&frame(n, [n as f64, 0.0, 0.0]), &[]).unwrap();
        }
        let stats = handle.stats();
        assert_eq!(stats.frames_drawn, 3);
        assert_eq!(stats.applied, VecDeque::from(vec![[2.0, 0.0, 0.0], [3.0, 0.0, 0.0]]));
        assert_eq!(stats.total_rotation, [6.0, 0.0, 0.0]);
    }
}
