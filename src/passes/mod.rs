//! Concrete wgpu passes for the chain.
//!
//! - [`ScenePass`]: procedural fullscreen scene source (viewpoint uniforms)
//! - [`TintPass`]: multiplies the previous output by a color
//! - [`BloomPass`]: threshold / strength / radius glow
//!
//! Each pass owns its tunable settings behind an `Rc<RefCell<…>>` handle, so
//! the per-frame update hook (or a parameter panel) mutates them directly and
//! the pass reads whatever values are current at render time.

mod bloom;
mod filter;
mod scene_pass;
mod tint;

pub use bloom::{BloomPass, BloomSettings, DEFAULT_BLOOM_RADIUS};
pub use scene_pass::{ScenePass, SceneSettings};
pub use tint::{TintPass, TintSettings};

pub(crate) use filter::FilterStage;
