//! # Glint
//!
//! **A small shader-driven render core that gets out of your way.**
//!
//! Build a chain of fullscreen passes, mutate the scene in a per-frame
//! closure, and let the frame coordinator handle timing, resizes, and
//! scheduling. Asset loading runs off-thread with a single "everything
//! arrived" signal.
//!
//! ## Quick Start
//!
//! ```ignore
//! use glint::*;
//!
//! fn main() {
//!     run(AppConfig::new().title("Swirl"), |ctx| {
//!         let scene = ctx.scene_pass(include_str!("shaders/swirl.wgsl"));
//!         let bloom = ctx.bloom();
//!
//!         move |tick| {
//!             scene.borrow_mut().time_scale = 0.5;
//!             bloom.borrow_mut().strength = 1.5 + (tick.time * 0.5).sin();
//!         }
//!     });
//! }
//! ```
//!
//! ## Philosophy
//!
//! - **One closure, one call** — setup and per-tick logic live in closures.
//! - **Passes pipe** — each pass reads the previous output; the chain manages
//!   the buffers and the final write to the screen.
//! - **Escape hatches everywhere** — the full wgpu API stays reachable through
//!   [`GpuContext`] when the narrow surface is not enough.

mod app;
mod assets;
mod backend;
mod chain;
mod coordinator;
mod gpu;
mod inspect;
mod loader;
mod passes;
mod scene;
#[cfg(test)]
mod test_support;
mod viewpoint;

pub use app::{AppConfig, SetupContext, run};
pub use assets::{Asset, Completions, FileTransport};
pub use backend::RenderBackend;
pub use chain::{ChainContext, ChainError, Pass, PassChain, PassTarget};
pub use coordinator::{FrameCoordinator, Phase, TickContext};
pub use gpu::{GpuContext, RenderTarget};
pub use inspect::{Inspect, dump};
pub use loader::{
    AssetTransport, LoadError, LoadGate, LoadState, LoaderSession, RequestId, SessionReport,
};
pub use passes::{
    BloomPass, BloomSettings, DEFAULT_BLOOM_RADIUS, ScenePass, SceneSettings, TintPass,
    TintSettings,
};
pub use scene::{NodeKind, SceneNode, Transform};
pub use viewpoint::Viewpoint;

// Re-export glam math types for convenience
pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
