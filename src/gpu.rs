//! wgpu device management and the shipped [`RenderBackend`] implementation.
//!
//! [`GpuContext`] owns the surface, device, queue, and surface configuration,
//! and brackets each frame: [`begin_frame`](RenderBackend::begin_frame)
//! acquires the surface texture and opens a command encoder,
//! [`end_frame`](RenderBackend::end_frame) submits and presents. Passes record
//! into the open encoder via [`frame_parts`](GpuContext::frame_parts).

use std::sync::Arc;
use winit::window::Window;

use crate::backend::RenderBackend;

/// An off-screen render target used for intermediate pass results.
///
/// The texture can be written as a color attachment and sampled in a later
/// pass, which is what lets the chain pipe one pass's output into the next.
pub struct RenderTarget {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub width: u32,
    pub height: u32,
}

/// Surface texture and encoder for the frame currently being recorded.
struct FrameInFlight {
    surface_texture: wgpu::SurfaceTexture,
    view: wgpu::TextureView,
    encoder: wgpu::CommandEncoder,
}

/// Core GPU context holding wgpu resources.
///
/// Fields are public so passes and applications can reach the full wgpu API
/// when the narrow [`RenderBackend`] surface is not enough.
pub struct GpuContext {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    frame: Option<FrameInFlight>,
}

impl GpuContext {
    /// Create a GPU context for a winit window.
    ///
    /// Picks an sRGB surface format where available and configures Fifo
    /// presentation.
    ///
    /// # Panics
    ///
    /// Panics if no suitable adapter is found or device creation fails.
    pub fn new(window: Arc<Window>) -> Self {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window).unwrap();

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .expect("Failed to find a suitable GPU adapter");

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("Glint Device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            memory_hints: Default::default(),
            trace: Default::default(),
            experimental_features: Default::default(),
        }))
        .expect("Failed to create device");

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        log::info!(
            "gpu ready: {}x{} {:?}",
            size.width,
            size.height,
            surface_format
        );

        Self {
            surface,
            device,
            queue,
            config,
            frame: None,
        }
    }

    /// Reconfigure the surface after a window resize.
    ///
    /// Zero-sized dimensions are ignored (minimized windows).
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    pub fn width(&self) -> u32 {
        self.config.width
    }

    pub fn height(&self) -> u32 {
        self.config.height
    }

    pub fn aspect(&self) -> f32 {
        self.config.width as f32 / self.config.height as f32
    }

    /// Screen view and command encoder of the frame being recorded.
    ///
    /// # Panics
    ///
    /// Panics when called outside a `begin_frame`/`end_frame` bracket; passes
    /// only run inside one.
    pub fn frame_parts(&mut self) -> (&wgpu::TextureView, &mut wgpu::CommandEncoder) {
        let frame = self
            .frame
            .as_mut()
            .expect("frame_parts called outside begin_frame/end_frame");
        (&frame.view, &mut frame.encoder)
    }
}

impl RenderBackend for GpuContext {
    type Target = RenderTarget;

    fn create_target(&mut self, width: u32, height: u32, label: &str) -> RenderTarget {
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: self.config.format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        RenderTarget {
            texture,
            view,
            width,
            height,
        }
    }

    fn begin_frame(&mut self) {
        let surface_texture = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                // Stale swapchain after a resize race; reconfigure and retry.
                self.surface.configure(&self.device, &self.config);
                self.surface
                    .get_current_texture()
                    .expect("surface unrecoverable after reconfigure")
            }
            Err(e) => panic!("failed to acquire surface texture: {e}"),
        };
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Chain Encoder"),
            });
        self.frame = Some(FrameInFlight {
            surface_texture,
            view,
            encoder,
        });
    }

    fn end_frame(&mut self) {
        let Some(frame) = self.frame.take() else {
            log::warn!("end_frame without begin_frame");
            return;
        };
        self.queue.submit(std::iter::once(frame.encoder.finish()));
        frame.surface_texture.present();
    }

    fn surface_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }
}
