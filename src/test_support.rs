//! Recording backend and passes shared by the unit tests.

use std::cell::RefCell;
use std::rc::Rc;

use crate::backend::RenderBackend;
use crate::chain::{ChainContext, Pass, PassTarget};

/// An intermediate buffer stand-in; the id identifies it in traces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockTarget {
    pub id: usize,
    pub width: u32,
    pub height: u32,
}

/// Backend that allocates numbered targets and records frame brackets.
pub struct MockBackend {
    next_id: usize,
    pub surface: (u32, u32),
    pub targets_created: Vec<(u32, u32)>,
    pub frames_begun: usize,
    pub frames_ended: usize,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            surface: (640, 480),
            targets_created: Vec::new(),
            frames_begun: 0,
            frames_ended: 0,
        }
    }
}

impl RenderBackend for MockBackend {
    type Target = MockTarget;

    fn create_target(&mut self, width: u32, height: u32, _label: &str) -> MockTarget {
        let id = self.next_id;
        self.next_id += 1;
        self.targets_created.push((width, height));
        MockTarget { id, width, height }
    }

    fn begin_frame(&mut self) {
        self.frames_begun += 1;
    }

    fn end_frame(&mut self) {
        self.frames_ended += 1;
    }

    fn surface_size(&self) -> (u32, u32) {
        self.surface
    }
}

/// Events recorded by [`RecordPass`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent {
    Run {
        label: String,
        /// Input target id, `None` for the raw scene render slot.
        input: Option<usize>,
        /// Output target id, `None` when writing the screen.
        output: Option<usize>,
    },
    Resize {
        label: String,
        width: u32,
        height: u32,
    },
}

pub type Trace = Rc<RefCell<Vec<TraceEvent>>>;

/// Pass that records how the chain drives it.
pub struct RecordPass {
    label: String,
    trace: Trace,
    screen: bool,
}

impl RecordPass {
    pub fn new(label: &str, trace: &Trace) -> Self {
        Self {
            label: label.to_string(),
            trace: Rc::clone(trace),
            screen: false,
        }
    }

    /// Flag this pass as writing the display surface.
    pub fn to_screen(mut self) -> Self {
        self.screen = true;
        self
    }
}

impl Pass<MockBackend> for RecordPass {
    fn label(&self) -> &str {
        &self.label
    }

    fn run(
        &mut self,
        _ctx: &mut ChainContext<'_, MockBackend>,
        input: Option<&MockTarget>,
        output: PassTarget<'_, MockTarget>,
    ) {
        self.trace.borrow_mut().push(TraceEvent::Run {
            label: self.label.clone(),
            input: input.map(|t| t.id),
            output: match output {
                PassTarget::Buffer(t) => Some(t.id),
                PassTarget::Screen => None,
            },
        });
    }

    fn writes_to_screen(&self) -> bool {
        self.screen
    }

    fn resize(&mut self, _backend: &mut MockBackend, width: u32, height: u32) {
        self.trace.borrow_mut().push(TraceEvent::Resize {
            label: self.label.clone(),
            width,
            height,
        });
    }
}
