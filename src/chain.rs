//! The post-processing pass chain.
//!
//! Passes execute once per frame in the order they were added, each reading
//! the previous pass's output image and writing a new one, with the final
//! pass directed at the display surface:
//!
//! ```text
//! Pass 0: None     → Buffer A      (raw scene render)
//! Pass 1: Buffer A → Buffer B
//! Pass 2: Buffer B → Screen
//! ```
//!
//! Two intermediate buffers are enough for any chain length — the chain
//! ping-pongs between them. Order is fixed once built; at runtime only
//! enable/disable toggling and pass-parameter mutation are supported.

use std::fmt;
use std::mem;

use crate::backend::RenderBackend;
use crate::scene::SceneNode;
use crate::viewpoint::Viewpoint;

/// Where a pass writes its output.
pub enum PassTarget<'a, T> {
    /// An intermediate buffer owned by the chain.
    Buffer(&'a T),
    /// The display surface.
    Screen,
}

/// Everything a pass can see while running.
///
/// The scene and viewpoint are read-only here: mutation happens in the update
/// hook, before the chain renders, never mid-chain.
pub struct ChainContext<'a, B: RenderBackend> {
    pub backend: &'a mut B,
    pub scene: &'a SceneNode,
    pub viewpoint: &'a Viewpoint,
    /// Total elapsed time in seconds.
    pub time: f32,
    /// Delta time since the previous frame in seconds.
    pub dt: f32,
}

/// One stage of the post-processing pipeline.
pub trait Pass<B: RenderBackend> {
    /// Short name for logs and debug output.
    fn label(&self) -> &str;

    /// Execute the stage.
    ///
    /// `input` is the previous stage's output, or `None` for the first stage
    /// in the chain (which produces the raw scene render). Filter passes
    /// typically panic if `input` is `None`, as they need an image to sample.
    fn run(
        &mut self,
        ctx: &mut ChainContext<'_, B>,
        input: Option<&B::Target>,
        output: PassTarget<'_, B::Target>,
    );

    /// True if this pass writes the display surface even when it is not last.
    /// At most one pass per chain may return true.
    fn writes_to_screen(&self) -> bool {
        false
    }

    /// Called when the surface size changes, for passes that keep internal
    /// buffers of their own.
    fn resize(&mut self, _backend: &mut B, _width: u32, _height: u32) {}
}

/// Chain configuration errors, rejected when the chain is built.
#[derive(Debug)]
pub enum ChainError {
    /// A second pass flagged as screen-writing was added; a well-formed chain
    /// has at most one.
    DuplicateScreenPass { first: String, second: String },
}

impl fmt::Display for ChainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainError::DuplicateScreenPass { first, second } => write!(
                f,
                "pass '{}' is flagged to write the screen, but '{}' already is",
                second, first
            ),
        }
    }
}

impl std::error::Error for ChainError {}

struct Slot<B: RenderBackend> {
    pass: Box<dyn Pass<B>>,
    enabled: bool,
}

/// Ordered sequence of passes plus the ping-pong buffers between them.
pub struct PassChain<B: RenderBackend> {
    slots: Vec<Slot<B>>,
    read: B::Target,
    write: B::Target,
    width: u32,
    height: u32,
}

impl<B: RenderBackend> PassChain<B> {
    /// Create an empty chain with intermediate buffers of the given size.
    pub fn new(backend: &mut B, width: u32, height: u32) -> Self {
        Self {
            slots: Vec::new(),
            read: backend.create_target(width, height, "chain buffer A"),
            write: backend.create_target(width, height, "chain buffer B"),
            width,
            height,
        }
    }

    /// Append a pass to the end of the chain.
    ///
    /// Rejects a second screen-flagged pass; everything else is accepted in
    /// the order given, which stays fixed for the session.
    pub fn add_pass<P: Pass<B> + 'static>(&mut self, pass: P) -> Result<(), ChainError> {
        if pass.writes_to_screen() {
            if let Some(slot) = self.slots.iter().find(|s| s.pass.writes_to_screen()) {
                return Err(ChainError::DuplicateScreenPass {
                    first: slot.pass.label().to_string(),
                    second: pass.label().to_string(),
                });
            }
        }
        self.slots.push(Slot {
            pass: Box::new(pass),
            enabled: true,
        });
        Ok(())
    }

    /// Number of passes in the chain, enabled or not.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Toggle a pass without reordering the chain.
    pub fn set_enabled(&mut self, index: usize, enabled: bool) {
        if let Some(slot) = self.slots.get_mut(index) {
            log::debug!("pass '{}' enabled={}", slot.pass.label(), enabled);
            slot.enabled = enabled;
        } else {
            log::warn!("set_enabled: no pass at index {}", index);
        }
    }

    /// Current intermediate buffer size.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Resize every intermediate buffer to `width` x `height`.
    ///
    /// Called by the frame coordinator when it detects a surface resize;
    /// the chain never resizes itself.
    pub fn set_size(&mut self, backend: &mut B, width: u32, height: u32) {
        self.read = backend.create_target(width, height, "chain buffer A");
        self.write = backend.create_target(width, height, "chain buffer B");
        self.width = width;
        self.height = height;
        for slot in &mut self.slots {
            slot.pass.resize(backend, width, height);
        }
        log::debug!("chain buffers resized to {}x{}", width, height);
    }

    /// Execute every enabled pass in sequence and present the result.
    ///
    /// The first enabled pass runs with no input (it produces the raw scene
    /// render); each later pass reads the previous output. The last enabled
    /// pass — or the one flagged with `writes_to_screen` — writes the display
    /// surface. Pass parameters are read live; nothing is snapshotted.
    pub fn render(
        &mut self,
        backend: &mut B,
        scene: &SceneNode,
        viewpoint: &Viewpoint,
        time: f32,
        dt: f32,
    ) {
        if self.slots.iter().all(|s| !s.enabled) {
            return;
        }

        backend.begin_frame();

        let Self {
            slots, read, write, ..
        } = self;
        let flagged = slots
            .iter()
            .position(|s| s.enabled && s.pass.writes_to_screen());
        let last_enabled = slots.iter().rposition(|s| s.enabled);

        let mut has_input = false;
        for (i, slot) in slots.iter_mut().enumerate() {
            if !slot.enabled {
                continue;
            }
            // An explicit screen flag wins; otherwise the final enabled pass
            // is the one that reaches the display.
            let to_screen = match flagged {
                Some(f) => f == i,
                None => Some(i) == last_enabled,
            };

            let input = if has_input { Some(&*read) } else { None };
            let output = if to_screen {
                PassTarget::Screen
            } else {
                PassTarget::Buffer(&*write)
            };

            let mut ctx = ChainContext {
                backend: &mut *backend,
                scene,
                viewpoint,
                time,
                dt,
            };
            slot.pass.run(&mut ctx, input, output);

            if !to_screen {
                mem::swap(read, write);
                has_input = true;
            }
        }

        backend.end_frame();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockBackend, RecordPass, TraceEvent};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn chain_with(backend: &mut MockBackend) -> PassChain<MockBackend> {
        PassChain::new(backend, 640, 480)
    }

    #[test]
    fn three_passes_pipe_output_to_input() {
        let mut backend = MockBackend::new();
        let trace = Rc::new(RefCell::new(Vec::new()));
        let mut chain = chain_with(&mut backend);
        chain.add_pass(RecordPass::new("p1", &trace)).unwrap();
        chain.add_pass(RecordPass::new("p2", &trace)).unwrap();
        chain.add_pass(RecordPass::new("p3", &trace)).unwrap();

        let scene = crate::SceneNode::group("root");
        let vp = crate::Viewpoint::default();
        chain.render(&mut backend, &scene, &vp, 1.0, 0.016);

        let trace = trace.borrow();
        let runs: Vec<_> = trace
            .iter()
            .filter_map(|e| match e {
                TraceEvent::Run {
                    label,
                    input,
                    output,
                } => Some((label.as_str(), *input, *output)),
                _ => None,
            })
            .collect();

        // p1: raw render (no input) into a buffer; p2 reads exactly the
        // buffer p1 wrote; p3 reads p2's output and writes the screen.
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[0].0, "p1");
        assert_eq!(runs[0].1, None);
        let p1_out = runs[0].2.expect("p1 writes a buffer");
        assert_eq!(runs[1], ("p2", Some(p1_out), runs[1].2));
        let p2_out = runs[1].2.expect("p2 writes a buffer");
        assert_ne!(p1_out, p2_out, "ping-pong alternates buffers");
        assert_eq!(runs[2].0, "p3");
        assert_eq!(runs[2].1, Some(p2_out));
        assert_eq!(runs[2].2, None, "only the last pass writes the screen");
    }

    #[test]
    fn screen_flag_overrides_the_implicit_final_write() {
        let mut backend = MockBackend::new();
        let trace = Rc::new(RefCell::new(Vec::new()));
        let mut chain = chain_with(&mut backend);
        chain.add_pass(RecordPass::new("src", &trace)).unwrap();
        chain
            .add_pass(RecordPass::new("final", &trace).to_screen())
            .unwrap();
        chain.add_pass(RecordPass::new("tail", &trace)).unwrap();

        let scene = crate::SceneNode::group("root");
        let vp = crate::Viewpoint::default();
        chain.render(&mut backend, &scene, &vp, 0.0, 0.0);

        let trace = trace.borrow();
        let screen_writers: Vec<_> = trace
            .iter()
            .filter_map(|e| match e {
                TraceEvent::Run { label, output, .. } if output.is_none() => {
                    Some(label.as_str())
                }
                _ => None,
            })
            .collect();
        assert_eq!(screen_writers, vec!["final"]);
    }

    #[test]
    fn second_screen_pass_is_rejected() {
        let mut backend = MockBackend::new();
        let trace = Rc::new(RefCell::new(Vec::new()));
        let mut chain = chain_with(&mut backend);
        chain
            .add_pass(RecordPass::new("a", &trace).to_screen())
            .unwrap();
        let err = chain
            .add_pass(RecordPass::new("b", &trace).to_screen())
            .unwrap_err();
        assert!(matches!(err, ChainError::DuplicateScreenPass { .. }));
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn disabled_passes_are_skipped_without_consuming_the_pipe() {
        let mut backend = MockBackend::new();
        let trace = Rc::new(RefCell::new(Vec::new()));
        let mut chain = chain_with(&mut backend);
        chain.add_pass(RecordPass::new("src", &trace)).unwrap();
        chain.add_pass(RecordPass::new("skipped", &trace)).unwrap();
        chain.add_pass(RecordPass::new("sink", &trace)).unwrap();
        chain.set_enabled(1, false);

        let scene = crate::SceneNode::group("root");
        let vp = crate::Viewpoint::default();
        chain.render(&mut backend, &scene, &vp, 0.0, 0.0);

        let trace = trace.borrow();
        let runs: Vec<_> = trace
            .iter()
            .filter_map(|e| match e {
                TraceEvent::Run {
                    label,
                    input,
                    output,
                } => Some((label.as_str(), *input, *output)),
                _ => None,
            })
            .collect();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].0, "src");
        assert_eq!(runs[1].0, "sink");
        // The sink reads exactly what the source wrote.
        assert_eq!(runs[1].1, runs[0].2);
        assert_eq!(runs[1].2, None);
    }

    #[test]
    fn set_size_recreates_buffers_and_forwards_to_passes() {
        let mut backend = MockBackend::new();
        let trace = Rc::new(RefCell::new(Vec::new()));
        let mut chain = chain_with(&mut backend);
        chain.add_pass(RecordPass::new("p", &trace)).unwrap();

        chain.set_size(&mut backend, 1280, 720);
        assert_eq!(chain.size(), (1280, 720));

        let resized: Vec<_> = trace
            .borrow()
            .iter()
            .filter_map(|e| match e {
                TraceEvent::Resize { label, width, height } => {
                    Some((label.clone(), *width, *height))
                }
                _ => None,
            })
            .collect();
        assert_eq!(resized, vec![("p".to_string(), 1280, 720)]);
        // Two fresh intermediate targets at the new size.
        let created = backend
            .targets_created
            .iter()
            .filter(|(w, h)| (*w, *h) == (1280, 720))
            .count();
        assert_eq!(created, 2);
    }
}
