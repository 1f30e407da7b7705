//! Windowed application layer: winit plumbing around the frame coordinator.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::assets::{Asset, Completions, FileTransport};
use crate::chain::PassChain;
use crate::coordinator::{FrameCoordinator, TickContext};
use crate::gpu::GpuContext;
use crate::loader::{LoadGate, LoaderSession, RequestId, SessionReport};
use crate::passes::{BloomPass, BloomSettings, ScenePass, SceneSettings, TintPass, TintSettings};
use crate::scene::SceneNode;
use crate::viewpoint::Viewpoint;

type LoadedHook = Rc<RefCell<Option<Box<dyn FnOnce(&SessionReport)>>>>;

/// Context provided during app setup.
///
/// Build the pass chain, issue asset loads, and shape the initial scene here;
/// return the per-frame update closure.
pub struct SetupContext<'a> {
    pub gpu: &'a mut GpuContext,
    chain: &'a mut PassChain<GpuContext>,
    scene: &'a mut SceneNode,
    viewpoint: &'a mut Viewpoint,
    session: &'a mut LoaderSession<Asset>,
    gate: &'a LoadGate,
    on_loaded: &'a LoadedHook,
}

impl SetupContext<'_> {
    /// Append a procedural scene source pass driven by the given WGSL.
    ///
    /// Returns the pass's live settings handle.
    pub fn scene_pass(&mut self, shader: &str) -> Rc<RefCell<SceneSettings>> {
        let pass = ScenePass::new(self.gpu, shader);
        let settings = pass.settings();
        if let Err(e) = self.chain.add_pass(pass) {
            log::warn!("scene pass rejected: {}", e);
        }
        settings
    }

    /// Append a color-multiply filter pass.
    pub fn tint(&mut self) -> Rc<RefCell<TintSettings>> {
        let pass = TintPass::new(self.gpu);
        let settings = pass.settings();
        if let Err(e) = self.chain.add_pass(pass) {
            log::warn!("tint pass rejected: {}", e);
        }
        settings
    }

    /// Append a bloom glow pass.
    pub fn bloom(&mut self) -> Rc<RefCell<BloomSettings>> {
        let (width, height) = self.chain.size();
        let pass = BloomPass::new(self.gpu, width, height);
        let settings = pass.settings();
        if let Err(e) = self.chain.add_pass(pass) {
            log::warn!("bloom pass rejected: {}", e);
        }
        settings
    }

    /// Issue an asset load; resolves via the app's file transport.
    pub fn load(&mut self, descriptor: impl Into<String>) -> RequestId {
        self.session.issue(descriptor)
    }

    /// Gate that opens once every issued load has resolved.
    ///
    /// Keep a clone in the update closure and guard loaded-content access on
    /// it. Remember that a session with no issued loads never completes.
    pub fn gate(&self) -> LoadGate {
        self.gate.clone()
    }

    /// Run once when all loads resolve, right after the gate opens.
    pub fn on_loaded<F>(&mut self, f: F)
    where
        F: FnOnce(&SessionReport) + 'static,
    {
        *self.on_loaded.borrow_mut() = Some(Box::new(f));
    }

    /// Root of the scene tree.
    pub fn root(&mut self) -> &mut SceneNode {
        self.scene
    }

    pub fn viewpoint_mut(&mut self) -> &mut Viewpoint {
        self.viewpoint
    }
}

/// Configuration for the app window.
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Glint".to_string(),
            width: 800,
            height: 600,
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}

/// Run a Glint application.
///
/// # Example
/// ```ignore
/// glint::run(AppConfig::new().title("Swirl"), |ctx| {
///     let scene = ctx.scene_pass(include_str!("shaders/swirl.wgsl"));
///     ctx.bloom();
///
///     move |tick| {
///         scene.borrow_mut().time_scale = 0.5;
///         if tick.time > 30.0 {
///             tick.stop();
///         }
///     }
/// });
/// ```
pub fn run<S, F>(config: AppConfig, setup: S)
where
    S: FnOnce(&mut SetupContext) -> F + 'static,
    F: FnMut(&mut TickContext<'_, GpuContext>) + 'static,
{
    let event_loop = EventLoop::new().unwrap();
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GlintApp::Pending {
        config,
        setup: Some(Box::new(move |ctx| Box::new(setup(ctx)))),
    };

    event_loop.run_app(&mut app).unwrap();
}

type SetupFn =
    Box<dyn FnOnce(&mut SetupContext) -> Box<dyn FnMut(&mut TickContext<'_, GpuContext>)>>;

enum GlintApp {
    Pending {
        config: AppConfig,
        setup: Option<SetupFn>,
    },
    Running {
        window: Arc<Window>,
        gpu: GpuContext,
        chain: PassChain<GpuContext>,
        scene: SceneNode,
        viewpoint: Viewpoint,
        coordinator: FrameCoordinator,
        session: LoaderSession<Asset>,
        completions: Completions,
        update_fn: Box<dyn FnMut(&mut TickContext<'_, GpuContext>)>,
        start: Instant,
    },
}

impl ApplicationHandler for GlintApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let GlintApp::Pending { config, setup } = self {
            let window_attrs = WindowAttributes::default()
                .with_title(&config.title)
                .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height));

            let window = Arc::new(event_loop.create_window(window_attrs).unwrap());
            let mut gpu = GpuContext::new(window.clone());

            let (width, height) = (gpu.width(), gpu.height());
            let mut chain = PassChain::new(&mut gpu, width, height);
            let mut scene = SceneNode::group("root");
            let mut viewpoint = Viewpoint::default().at(0.0, 0.0, 5.0);
            viewpoint.set_aspect(gpu.aspect());

            let (transport, completions) = FileTransport::new();
            let gate = LoadGate::new();
            let on_loaded: LoadedHook = Rc::new(RefCell::new(None));
            let mut session = {
                let gate = gate.clone();
                let hook = Rc::clone(&on_loaded);
                LoaderSession::new(Box::new(transport), move |report: SessionReport| {
                    log::info!("assets ready: {}", report);
                    gate.open();
                    if let Some(f) = hook.borrow_mut().take() {
                        f(&report);
                    }
                })
            };

            let setup_fn = setup.take().unwrap();
            let update_fn = {
                let mut ctx = SetupContext {
                    gpu: &mut gpu,
                    chain: &mut chain,
                    scene: &mut scene,
                    viewpoint: &mut viewpoint,
                    session: &mut session,
                    gate: &gate,
                    on_loaded: &on_loaded,
                };
                setup_fn(&mut ctx)
            };

            let mut coordinator = FrameCoordinator::new();
            coordinator.start();
            window.request_redraw();

            *self = GlintApp::Running {
                window,
                gpu,
                chain,
                scene,
                viewpoint,
                coordinator,
                session,
                completions,
                update_fn,
                start: Instant::now(),
            };
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let GlintApp::Running {
            window,
            gpu,
            chain,
            scene,
            viewpoint,
            coordinator,
            session,
            completions,
            update_fn,
            start,
        } = self
        else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                coordinator.stop();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                // Only the surface reconfigures here; the coordinator notices
                // the new size at the top of the next tick.
                gpu.resize(size.width, size.height);
            }
            WindowEvent::RedrawRequested => {
                completions.drain(session);

                let timestamp = start.elapsed().as_secs_f64();
                coordinator.tick(timestamp, gpu, scene, viewpoint, chain, |ctx| {
                    update_fn(ctx)
                });

                if coordinator.is_scheduled() {
                    window.request_redraw();
                } else {
                    event_loop.exit();
                }
            }
            _ => {}
        }
    }
}
