//! Command mailbox between the control thread and the render loop.
//!
//! Producers add rotation deltas to per-axis accumulators; the render loop
//! drains and zeroes them once per frame. Everything sits behind one mutex.

use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::Duration;

use shared::{Axis, CommandKind, RenderCommand};

#[derive(Debug, Default)]
struct Pending {
    rotation: [f64; 3],
    end_requested: bool,
}

/// What one drain collected
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DrainedCommands {
    /// Summed rotation per axis (degrees), indexed by [`Axis::index`]
    pub rotation: [f64; 3],
    pub end_requested: bool,
}

impl DrainedCommands {
    pub fn rotation_about(&self, axis: Axis) -> f64 {
        self.rotation[axis.index()]
    }

    pub fn has_rotation(&self) -> bool {
        self.rotation.iter().any(|d| *d != 0.0)
    }
}

#[derive(Debug, Default)]
pub struct RenderCommandChannel {
    pending: Mutex<Pending>,
    wake: Condvar,
}

impl RenderCommandChannel {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Pending> {
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Queue a command. Never blocks on the render thread's work.
    pub fn issue_command(&self, command: RenderCommand) {
        match command {
            RenderCommand::Rotate { axis, degrees } => {
                if !degrees.is_finite() {
                    tracing::warn!("Ignoring non-finite rotation {degrees} about {axis:?}");
                    return;
                }
                self.lock().rotation[axis.index()] += degrees;
            }
            RenderCommand::EndRender => {
                self.lock().end_requested = true;
                self.wake.notify_all();
            }
        }
    }

    pub fn issue(&self, kind: CommandKind, value: f64) {
        self.issue_command(RenderCommand::from_kind(kind, value));
    }

    /// Take everything accumulated since the previous drain
    pub fn drain(&self) -> DrainedCommands {
        take(&mut self.lock())
    }

    /// Wait up to `timeout` (returning early only on termination), then drain.
    pub fn wait_and_drain(&self, timeout: Duration) -> DrainedCommands {
        let guard = self.lock();
        let (mut guard, _) = self
            .wake
            .wait_timeout_while(guard, timeout, |p| !p.end_requested)
            .unwrap_or_else(|e| e.into_inner());
        take(&mut guard)
    }

    pub fn is_end_requested(&self) -> bool {
        self.lock().end_requested
    }
}

fn take(pending: &mut Pending) -> DrainedCommands {
    let drained = DrainedCommands {
        rotation: pending.rotation,
        end_requested: pending.end_requested,
    };
    *pending = Pending::default();
    drained
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Instant;

    #[test]
    fn test_rotations_accumulate_until_drained() {
        let ch = RenderCommandChannel::new();
        ch.issue(CommandKind::RotateX, 15.0);
        ch.issue(CommandKind::RotateX, 10.0);
        ch.issue(CommandKind::RotateZ, -3.0);

        let d = ch.drain();
        assert_eq!(d.rotation_about(Axis::X), 25.0);
        assert_eq!(d.rotation_about(Axis::Y), 0.0);
        assert_eq!(d.rotation_about(Axis::Z), -3.0);
        assert!(!d.end_requested);

        // Nothing is applied twice
        assert_eq!(ch.drain(), DrainedCommands::default());
    }

    #[test]
    fn test_end_request_is_idempotent() {
        let ch = RenderCommandChannel::new();
        ch.issue_command(RenderCommand::EndRender);
        ch.issue_command(RenderCommand::EndRender);
        assert!(ch.is_end_requested());
        assert!(ch.drain().end_requested);
        assert!(!ch.drain().end_requested);
    }

    #[test]
    fn test_non_finite_rotation_is_dropped() {
        let ch = RenderCommandChannel::new();
        ch.issue(CommandKind::RotateY, f64::NAN);
        ch.issue(CommandKind::RotateY, 2.0);
        assert_eq!(ch.drain().rotation_about(Axis::Y), 2.0);
    }

    #[test]
    fn test_wait_times_out_without_termination() {
        let ch = RenderCommandChannel::new();
        ch.issue(CommandKind::RotateX, 1.0);
        let start = Instant::now();
        let d = ch.wait_and_drain(Duration::from_millis(30));
        assert!(start.elapsed() >= Duration::from_millis(30));
        assert_eq!(d.rotation_about(Axis::X), 1.0);
    }

    #[test]
    fn test_wait_wakes_on_termination() {
        let ch = Arc::new(RenderCommandChannel::new());
        let producer = {
            let ch = ch.clone();
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(20));
                ch.issue_command(RenderCommand::EndRender);
            })
        };
        let start = Instant::now();
        let d = ch.wait_and_drain(Duration::from_secs(10));
        assert!(d.end_requested);
        assert!(start.elapsed() < Duration::from_secs(5));
        producer.join().unwrap();
    }

    #[test]
    fn test_concurrent_producers_sum_exactly() {
        let ch = Arc::new(RenderCommandChannel::new());
        let producers: Vec<_> = (0..8)
            .map(|_| {
                let ch = ch.clone();
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        ch.issue(CommandKind::RotateY, 0.5);
                    }
                })
            })
            .collect();

        let mut total = 0.0;
        while producers.iter().any(|p| !p.is_finished()) {
            total += ch.drain().rotation_about(Axis::Y);
        }
        for p in producers {
            p.join().unwrap();
        }
        total += ch.drain().rotation_about(Axis::Y);
        assert_eq!(total, 8.0 * 1000.0 * 0.5);
    }
}
