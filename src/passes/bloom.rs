//! Threshold / blur / composite glow pass.

use std::cell::RefCell;
use std::rc::Rc;

use crate::backend::RenderBackend;
use crate::chain::{ChainContext, Pass, PassTarget};
use crate::gpu::{GpuContext, RenderTarget};
use crate::passes::FilterStage;

pub const DEFAULT_BLOOM_RADIUS: f32 = 1.0;

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct BrightUniforms {
    threshold: f32,
    _pad: [f32; 3],
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct BlurUniforms {
    direction: [f32; 2],
    resolution: [f32; 2],
    radius: f32,
    _pad: [f32; 3],
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct CompositeUniforms {
    strength: f32,
    _pad: [f32; 3],
}

/// Live parameters for a [`BloomPass`].
#[derive(Clone, Copy)]
pub struct BloomSettings {
    /// Luminance below this contributes nothing to the glow.
    pub threshold: f32,
    /// Glow intensity added back onto the base image.
    pub strength: f32,
    /// Blur spread in texels at the half-resolution blur targets.
    pub radius: f32,
}

impl Default for BloomSettings {
    fn default() -> Self {
        Self {
            threshold: 0.9,
            strength: 1.5,
            radius: DEFAULT_BLOOM_RADIUS,
        }
    }
}

/// Glow filter: bright-extract, separable gaussian blur at half resolution,
/// then composite back over the input.
///
/// Each stage has its own pipeline and uniform buffer so all four can be
/// recorded into one frame's encoder without uniform writes clobbering each
/// other.
///
/// # Panics
///
/// Panics if placed first in a chain: a filter needs an image to sample.
pub struct BloomPass {
    bright: FilterStage,
    blur_h: FilterStage,
    blur_v: FilterStage,
    composite: FilterStage,
    blur_a: RenderTarget,
    blur_b: RenderTarget,
    settings: Rc<RefCell<BloomSettings>>,
}

impl BloomPass {
    pub fn new(gpu: &mut GpuContext, width: u32, height: u32) -> Self {
        let bright = FilterStage::new(
            gpu,
            include_str!("../shaders/bloom_bright.wgsl"),
            "bloom bright",
            1,
            std::mem::size_of::<BrightUniforms>() as u64,
        );
        let blur_h = FilterStage::new(
            gpu,
            include_str!("../shaders/bloom_blur.wgsl"),
            "bloom blur h",
            1,
            std::mem::size_of::<BlurUniforms>() as u64,
        );
        let blur_v = FilterStage::new(
            gpu,
            include_str!("../shaders/bloom_blur.wgsl"),
            "bloom blur v",
            1,
            std::mem::size_of::<BlurUniforms>() as u64,
        );
        let composite = FilterStage::new(
            gpu,
            include_str!("../shaders/bloom_composite.wgsl"),
            "bloom composite",
            2,
            std::mem::size_of::<CompositeUniforms>() as u64,
        );
        // Blurring at half resolution halves the tap cost and widens the
        // effective kernel.
        let blur_a = gpu.create_target(width / 2, height / 2, "bloom blur A");
        let blur_b = gpu.create_target(width / 2, height / 2, "bloom blur B");

        Self {
            bright,
            blur_h,
            blur_v,
            composite,
            blur_a,
            blur_b,
            settings: Rc::new(RefCell::new(BloomSettings::default())),
        }
    }

    /// Handle to the live settings; keep a clone and mutate it per frame.
    pub fn settings(&self) -> Rc<RefCell<BloomSettings>> {
        Rc::clone(&self.settings)
    }
}

impl Pass<GpuContext> for BloomPass {
    fn label(&self) -> &str {
        "bloom"
    }

    fn run(
        &mut self,
        ctx: &mut ChainContext<'_, GpuContext>,
        input: Option<&RenderTarget>,
        output: PassTarget<'_, RenderTarget>,
    ) {
        let input = input.expect("bloom pass needs an input image");
        let gpu = &mut *ctx.backend;
        let settings = *self.settings.borrow();

        let half = [self.blur_a.width.max(1) as f32, self.blur_a.height.max(1) as f32];
        self.bright.write_uniforms(
            gpu,
            bytemuck::bytes_of(&BrightUniforms {
                threshold: settings.threshold,
                _pad: [0.0; 3],
            }),
        );
        self.blur_h.write_uniforms(
            gpu,
            bytemuck::bytes_of(&BlurUniforms {
                direction: [1.0, 0.0],
                resolution: half,
                radius: settings.radius,
                _pad: [0.0; 3],
            }),
        );
        self.blur_v.write_uniforms(
            gpu,
            bytemuck::bytes_of(&BlurUniforms {
                direction: [0.0, 1.0],
                resolution: half,
                radius: settings.radius,
                _pad: [0.0; 3],
            }),
        );
        self.composite.write_uniforms(
            gpu,
            bytemuck::bytes_of(&CompositeUniforms {
                strength: settings.strength,
                _pad: [0.0; 3],
            }),
        );

        let bright_bg = self.bright.bind(gpu, &[&input.view]);
        let blur_h_bg = self.blur_h.bind(gpu, &[&self.blur_a.view]);
        let blur_v_bg = self.blur_v.bind(gpu, &[&self.blur_b.view]);
        let composite_bg = self.composite.bind(gpu, &[&input.view, &self.blur_a.view]);

        // bright: input → A, blur: A → B → A, composite: (input, A) → out.
        let (screen_view, encoder) = gpu.frame_parts();
        self.bright
            .draw(encoder, &self.blur_a.view, &bright_bg, "bloom bright");
        self.blur_h
            .draw(encoder, &self.blur_b.view, &blur_h_bg, "bloom blur h");
        self.blur_v
            .draw(encoder, &self.blur_a.view, &blur_v_bg, "bloom blur v");
        let out_view = match output {
            PassTarget::Buffer(t) => &t.view,
            PassTarget::Screen => screen_view,
        };
        self.composite
            .draw(encoder, out_view, &composite_bg, "bloom composite");
    }

    fn resize(&mut self, backend: &mut GpuContext, width: u32, height: u32) {
        self.blur_a = backend.create_target(width / 2, height / 2, "bloom blur A");
        self.blur_b = backend.create_target(width / 2, height / 2, "bloom blur B");
    }
}
