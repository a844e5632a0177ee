//! Renderable handles and the headset render loop

pub mod backend;
pub mod channel;
pub mod renderable;
pub mod state;
pub mod thread;

pub use backend::{BackendStats, FrameContext, MirrorBackend, MirrorFrame, MirrorHandle, RenderBackend};
pub use channel::{DrainedCommands, RenderCommandChannel};
pub use renderable::{Renderable, VisualProps};
pub use state::{RenderLoopState, RenderStatus};
pub use thread::RenderLoopThread;
