//! Color-multiply filter pass.

use std::cell::RefCell;
use std::rc::Rc;

use crate::chain::{ChainContext, Pass, PassTarget};
use crate::gpu::{GpuContext, RenderTarget};
use crate::passes::FilterStage;

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct TintUniforms {
    color: [f32; 3],
    _pad: f32,
}

/// Live parameters for a [`TintPass`].
#[derive(Clone, Copy)]
pub struct TintSettings {
    pub color: [f32; 3],
}

impl Default for TintSettings {
    fn default() -> Self {
        Self {
            color: [1.0, 1.0, 1.0],
        }
    }
}

/// Multiplies the previous pass's output by a color.
///
/// # Panics
///
/// Panics if placed first in a chain: a filter needs an image to sample.
pub struct TintPass {
    stage: FilterStage,
    settings: Rc<RefCell<TintSettings>>,
    screen: bool,
}

impl TintPass {
    pub fn new(gpu: &GpuContext) -> Self {
        Self {
            stage: FilterStage::new(
                gpu,
                include_str!("../shaders/tint.wgsl"),
                "tint pass",
                1,
                std::mem::size_of::<TintUniforms>() as u64,
            ),
            settings: Rc::new(RefCell::new(TintSettings::default())),
            screen: false,
        }
    }

    /// Flag this pass to write the display surface even when it is not last.
    pub fn to_screen(mut self) -> Self {
        self.screen = true;
        self
    }

    /// Handle to the live settings; keep a clone and mutate it per frame.
    pub fn settings(&self) -> Rc<RefCell<TintSettings>> {
        Rc::clone(&self.settings)
    }
}

impl Pass<GpuContext> for TintPass {
    fn label(&self) -> &str {
        "tint"
    }

    fn run(
        &mut self,
        ctx: &mut ChainContext<'_, GpuContext>,
        input: Option<&RenderTarget>,
        output: PassTarget<'_, RenderTarget>,
    ) {
        let input = input.expect("tint pass needs an input image");
        let gpu = &mut *ctx.backend;

        let uniforms = TintUniforms {
            color: self.settings.borrow().color,
            _pad: 0.0,
        };
        self.stage.write_uniforms(gpu, bytemuck::bytes_of(&uniforms));
        let bind_group = self.stage.bind(gpu, &[&input.view]);

        match output {
            PassTarget::Buffer(t) => {
                let (_, encoder) = gpu.frame_parts();
                self.stage.draw(encoder, &t.view, &bind_group, "tint pass");
            }
            PassTarget::Screen => {
                let (view, encoder) = gpu.frame_parts();
                self.stage.draw(encoder, view, &bind_group, "tint pass");
            }
        }
    }

    fn writes_to_screen(&self) -> bool {
        self.screen
    }
}
