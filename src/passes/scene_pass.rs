//! Procedural fullscreen scene source.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Mat4;

use crate::chain::{ChainContext, Pass, PassTarget};
use crate::gpu::{GpuContext, RenderTarget};
use crate::passes::FilterStage;

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct SceneUniforms {
    resolution: [f32; 2],
    time: f32,
    aspect: f32,
    camera_pos: [f32; 3],
    fov: f32,
    camera_forward: [f32; 3],
    _pad1: f32,
    camera_right: [f32; 3],
    _pad2: f32,
    camera_up: [f32; 3],
    _pad3: f32,
    model: [[f32; 4]; 4],
}

/// Live parameters for a [`ScenePass`], mutated from the update hook.
pub struct SceneSettings {
    /// Multiplier applied to elapsed time before it reaches the shader.
    pub time_scale: f32,
    /// World transform handed to the shader as `model`, typically mirrored
    /// from a scene node each frame.
    pub focus: Mat4,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            time_scale: 1.0,
            focus: Mat4::IDENTITY,
        }
    }
}

/// First stage of a chain: draws the scene as a fullscreen shader.
///
/// The shader gets the viewpoint basis, elapsed time, and the settings'
/// `focus` matrix as one uniform block, and no input texture. Any WGSL
/// source with `vs`/`fs` entry points and a matching `SceneUniforms`
/// declaration works here.
pub struct ScenePass {
    stage: FilterStage,
    settings: Rc<RefCell<SceneSettings>>,
}

impl ScenePass {
    pub fn new(gpu: &GpuContext, shader_source: &str) -> Self {
        Self {
            stage: FilterStage::new(
                gpu,
                shader_source,
                "scene pass",
                0,
                std::mem::size_of::<SceneUniforms>() as u64,
            ),
            settings: Rc::new(RefCell::new(SceneSettings::default())),
        }
    }

    /// Handle to the live settings; keep a clone and mutate it per frame.
    pub fn settings(&self) -> Rc<RefCell<SceneSettings>> {
        Rc::clone(&self.settings)
    }
}

impl Pass<GpuContext> for ScenePass {
    fn label(&self) -> &str {
        "scene"
    }

    fn run(
        &mut self,
        ctx: &mut ChainContext<'_, GpuContext>,
        _input: Option<&RenderTarget>,
        output: PassTarget<'_, RenderTarget>,
    ) {
        let gpu = &mut *ctx.backend;
        let (width, height) = match &output {
            PassTarget::Buffer(t) => (t.width, t.height),
            PassTarget::Screen => (gpu.width(), gpu.height()),
        };

        let settings = self.settings.borrow();
        let uniforms = SceneUniforms {
            resolution: [width as f32, height as f32],
            time: ctx.time * settings.time_scale,
            aspect: width as f32 / height as f32,
            camera_pos: ctx.viewpoint.position.to_array(),
            fov: ctx.viewpoint.fov_y,
            camera_forward: ctx.viewpoint.forward().to_array(),
            _pad1: 0.0,
            camera_right: ctx.viewpoint.right().to_array(),
            _pad2: 0.0,
            camera_up: ctx.viewpoint.orthogonal_up().to_array(),
            _pad3: 0.0,
            model: settings.focus.to_cols_array_2d(),
        };
        drop(settings);

        self.stage.write_uniforms(gpu, bytemuck::bytes_of(&uniforms));
        let bind_group = self.stage.bind(gpu, &[]);

        match output {
            PassTarget::Buffer(t) => {
                let (_, encoder) = gpu.frame_parts();
                self.stage.draw(encoder, &t.view, &bind_group, "scene pass");
            }
            PassTarget::Screen => {
                let (view, encoder) = gpu.frame_parts();
                self.stage.draw(encoder, view, &bind_group, "scene pass");
            }
        }
    }
}
