//! The per-refresh frame loop.
//!
//! [`FrameCoordinator`] owns the scheduling state machine and runs one tick
//! per display refresh: compute elapsed time, detect surface resizes, run the
//! caller's update hook, then render the pass chain. The host (winit in
//! [`run`](crate::run)) arranges for [`tick`](FrameCoordinator::tick) to be
//! called once per refresh while [`is_scheduled`](FrameCoordinator::is_scheduled)
//! holds.
//!
//! Within a tick the order is fixed: resize-check → update-hook → render.
//! Errors raised inside the hook or a pass are not caught here; they unwind to
//! whatever drives the loop.

use crate::backend::RenderBackend;
use crate::chain::PassChain;
use crate::scene::SceneNode;
use crate::viewpoint::Viewpoint;

/// Scheduling state: `Idle → Scheduled → Ticking → Scheduled → … → Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Scheduled,
    Ticking,
    Stopped,
}

/// Per-tick view handed to the update hook.
///
/// This is the one place scene transforms and pass parameters get mutated
/// each frame; everything downstream of the hook reads them as-is.
pub struct TickContext<'a, B: RenderBackend> {
    pub scene: &'a mut SceneNode,
    pub viewpoint: &'a mut Viewpoint,
    pub chain: &'a mut PassChain<B>,
    /// Total elapsed time in seconds.
    pub time: f32,
    /// Seconds since the previous tick. The first tick measures from zero, so
    /// this can be large — clamp or ignore it before integrating.
    pub dt: f32,
    stop_requested: bool,
}

impl<B: RenderBackend> TickContext<'_, B> {
    /// Request cooperative stop. The current tick still completes its render
    /// step; no further tick is scheduled.
    pub fn stop(&mut self) {
        self.stop_requested = true;
    }
}

/// Drives scene update and rendering once per display refresh.
///
/// The coordinator never checks asset readiness itself — update hooks that
/// depend on loaded content guard on a [`LoadGate`](crate::LoadGate).
pub struct FrameCoordinator {
    phase: Phase,
    /// Previous tick's timestamp in seconds. Starts at zero, so the first
    /// delta spans from session start.
    previous: f64,
    size: (u32, u32),
}

impl FrameCoordinator {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            previous: 0.0,
            size: (0, 0),
        }
    }

    /// Arrange for ticking to begin at the host's next refresh.
    pub fn start(&mut self) {
        if matches!(self.phase, Phase::Idle | Phase::Stopped) {
            self.phase = Phase::Scheduled;
        }
    }

    /// Cancel future scheduling. Takes effect at the next tick boundary; an
    /// in-flight tick always completes.
    pub fn stop(&mut self) {
        self.phase = Phase::Stopped;
    }

    /// True while the host should keep re-arming refresh callbacks.
    pub fn is_scheduled(&self) -> bool {
        self.phase == Phase::Scheduled
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Run one tick at `timestamp` (seconds since session start).
    ///
    /// 1. `dt = timestamp - previous`.
    /// 2. If the surface size changed, update the viewpoint's aspect ratio
    ///    and resize the chain's buffers — always before the update hook.
    /// 3. Run `update` with a [`TickContext`].
    /// 4. Render the pass chain.
    ///
    /// A tick requested after [`stop`](Self::stop) is a no-op.
    pub fn tick<B, F>(
        &mut self,
        timestamp: f64,
        backend: &mut B,
        scene: &mut SceneNode,
        viewpoint: &mut Viewpoint,
        chain: &mut PassChain<B>,
        update: F,
    ) where
        B: RenderBackend,
        F: FnOnce(&mut TickContext<'_, B>),
    {
        if self.phase != Phase::Scheduled {
            return;
        }
        self.phase = Phase::Ticking;

        let dt = timestamp - self.previous;
        self.previous = timestamp;

        let (width, height) = backend.surface_size();
        if (width, height) != self.size && width > 0 && height > 0 {
            self.size = (width, height);
            viewpoint.set_aspect(width as f32 / height as f32);
            chain.set_size(backend, width, height);
            log::debug!("surface resized to {}x{}", width, height);
        }

        let mut ctx = TickContext {
            scene,
            viewpoint,
            chain,
            time: timestamp as f32,
            dt: dt as f32,
            stop_requested: false,
        };
        update(&mut ctx);
        let stop_requested = ctx.stop_requested;

        chain.render(backend, scene, viewpoint, timestamp as f32, dt as f32);

        self.phase = if stop_requested || self.phase == Phase::Stopped {
            Phase::Stopped
        } else {
            Phase::Scheduled
        };
    }
}

impl Default for FrameCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockBackend, RecordPass, TraceEvent};
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Rig {
        backend: MockBackend,
        scene: SceneNode,
        viewpoint: Viewpoint,
        chain: PassChain<MockBackend>,
        coordinator: FrameCoordinator,
    }

    fn rig() -> Rig {
        let mut backend = MockBackend::new();
        let chain = PassChain::new(&mut backend, 640, 480);
        Rig {
            backend,
            scene: SceneNode::group("root"),
            viewpoint: Viewpoint::new(65.0, 1.0, 0.1, 100.0),
            chain,
            coordinator: FrameCoordinator::new(),
        }
    }

    impl Rig {
        fn tick(&mut self, timestamp: f64, update: impl FnOnce(&mut TickContext<'_, MockBackend>)) {
            self.coordinator.tick(
                timestamp,
                &mut self.backend,
                &mut self.scene,
                &mut self.viewpoint,
                &mut self.chain,
                update,
            );
        }
    }

    #[test]
    fn delta_time_is_the_difference_of_timestamps() {
        let mut rig = rig();
        rig.coordinator.start();

        let deltas = Rc::new(RefCell::new(Vec::new()));
        for t in [1000.0, 1016.0, 1032.0] {
            let deltas = Rc::clone(&deltas);
            rig.tick(t, move |ctx| deltas.borrow_mut().push(ctx.dt));
        }

        let deltas = deltas.borrow();
        assert_eq!(deltas[1], 16.0);
        assert_eq!(deltas[2], 16.0);
        // First delta measures from zero and may be large.
        assert_eq!(deltas[0], 1000.0);
    }

    #[test]
    fn resize_lands_before_the_update_hook() {
        let mut rig = rig();
        rig.coordinator.start();
        rig.tick(0.0, |_| {});

        // Surface grows between ticks; the hook on the next tick must already
        // see the new aspect ratio and chain buffer size.
        rig.backend.surface = (800, 600);
        let observed = Rc::new(RefCell::new(None));
        {
            let observed = Rc::clone(&observed);
            rig.tick(0.016, move |ctx| {
                *observed.borrow_mut() = Some((ctx.viewpoint.aspect(), ctx.chain.size()));
            });
        }

        let (aspect, size) = observed.borrow().unwrap();
        assert_eq!(aspect, 800.0 / 600.0);
        assert_eq!(size, (800, 600));
    }

    #[test]
    fn resize_precedes_render_within_the_tick() {
        let mut rig = rig();
        let trace = Rc::new(RefCell::new(Vec::new()));
        rig.chain.add_pass(RecordPass::new("p", &trace)).unwrap();
        rig.coordinator.start();
        rig.tick(0.0, |_| {});

        rig.backend.surface = (1024, 768);
        rig.tick(0.016, |_| {});

        let trace = trace.borrow();
        let resize_at = trace
            .iter()
            .position(|e| matches!(e, TraceEvent::Resize { width: 1024, .. }))
            .expect("resize forwarded to the pass");
        let run_after = trace[resize_at..]
            .iter()
            .any(|e| matches!(e, TraceEvent::Run { .. }));
        assert!(run_after, "render follows resize in the same tick");
    }

    #[test]
    fn stop_during_update_still_renders_that_tick() {
        let mut rig = rig();
        let trace = Rc::new(RefCell::new(Vec::new()));
        rig.chain.add_pass(RecordPass::new("p", &trace)).unwrap();
        rig.coordinator.start();

        rig.tick(0.0, |ctx| ctx.stop());

        let runs = trace
            .borrow()
            .iter()
            .filter(|e| matches!(e, TraceEvent::Run { .. }))
            .count();
        assert_eq!(runs, 1, "the in-flight tick completes its render");
        assert!(!rig.coordinator.is_scheduled());

        // A stray tick after stop is a no-op.
        rig.tick(0.016, |_| panic!("hook must not run after stop"));
        assert_eq!(rig.backend.frames_begun, 1);
    }

    #[test]
    fn tick_before_start_is_a_no_op() {
        let mut rig = rig();
        rig.tick(0.0, |_| panic!("hook must not run while idle"));
        assert_eq!(rig.backend.frames_begun, 0);
        assert_eq!(rig.coordinator.phase(), Phase::Idle);
    }

    #[test]
    fn external_stop_cancels_future_ticks() {
        let mut rig = rig();
        rig.coordinator.start();
        rig.tick(0.0, |_| {});
        rig.coordinator.stop();
        rig.tick(0.016, |_| panic!("hook must not run after stop"));
        assert_eq!(rig.coordinator.phase(), Phase::Stopped);
    }
}
