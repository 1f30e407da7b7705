//! Asynchronous resource loading with a single "everything arrived" signal.
//!
//! A [`LoaderSession`] tracks any number of outstanding load requests and fires
//! its completion callback exactly once, when the last of them resolves. The
//! actual fetching and decoding happens out-of-band in an [`AssetTransport`];
//! the session only does the bookkeeping, so the render thread never blocks on
//! I/O.
//!
//! # Quick Start
//!
//! ```no_run
//! use glint::{Asset, FileTransport, LoaderSession};
//!
//! let (transport, mut completions) = FileTransport::new();
//! let mut session = LoaderSession::<Asset>::new(Box::new(transport), |report| {
//!     log::info!("all assets in: {report}");
//! });
//!
//! let tex = session.issue("textures/bayer.png");
//!
//! // Each frame, before ticking:
//! completions.drain(&mut session);
//! ```
//!
//! Requests may resolve in any order. A failed fetch still counts toward
//! completion; the callback's [`SessionReport`] says how many failed so the
//! caller can decide whether a partial load is good enough.

use std::collections::HashMap;
use std::fmt;

/// Errors produced while fetching or decoding a resource.
#[derive(Debug)]
pub enum LoadError {
    /// The resource could not be read.
    Io(std::io::Error),
    /// The bytes arrived but could not be decoded.
    Decode(String),
    /// Anything else the transport wants to report.
    Transport(String),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io(e) => write!(f, "IO error: {}", e),
            LoadError::Decode(msg) => write!(f, "decode error: {}", msg),
            LoadError::Transport(msg) => write!(f, "transport error: {}", msg),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for LoadError {
    fn from(e: std::io::Error) -> Self {
        LoadError::Io(e)
    }
}

/// Handle for one issued load request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(u64);

/// Lifecycle of a single request inside a session.
#[derive(Debug)]
pub enum LoadState<A> {
    /// Issued, not yet resolved by the transport.
    Pending,
    /// Resolved successfully; payload waiting to be taken.
    Done(A),
    /// Resolved with a failure.
    Failed(LoadError),
}

/// Starts out-of-band fetch/decode work for issued requests.
///
/// This is the session's sole contract with the outside world. `begin` must
/// not block; completions are delivered back by whoever drives the transport
/// calling [`LoaderSession::resolve`] exactly once per request.
pub trait AssetTransport {
    /// Kick off the fetch for `descriptor` (a path- or URL-like string).
    fn begin(&mut self, request: RequestId, descriptor: &str);
}

/// Summary handed to the completion callback.
#[derive(Debug, Clone)]
pub struct SessionReport {
    /// Requests that resolved successfully.
    pub completed: usize,
    /// Requests that resolved with a failure.
    pub failed: usize,
    /// Descriptors of the failed requests, for logging.
    pub failed_descriptors: Vec<String>,
}

impl SessionReport {
    /// True when every request in the session succeeded.
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

impl fmt::Display for SessionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} loaded, {} failed",
            self.completed, self.failed
        )
    }
}

struct Entry<A> {
    descriptor: String,
    state: LoadState<A>,
}

type CompletionFn = Box<dyn FnOnce(SessionReport)>;

/// Bookkeeping for a batch of outstanding asynchronous loads.
///
/// The completion callback registered at construction fires exactly once,
/// precisely when the pending counter drops from 1 to 0. A session that never
/// issues a request therefore never fires — a loader with no work will not
/// auto-complete, so always issue at least one request before gating on it.
///
/// There is no timeout: a descriptor whose fetch never resolves leaves the
/// session pending forever. Callers that need a fallback must arrange their
/// own deadline.
pub struct LoaderSession<A> {
    entries: HashMap<RequestId, Entry<A>>,
    pending: usize,
    next_id: u64,
    on_all_complete: Option<CompletionFn>,
    transport: Box<dyn AssetTransport>,
}

impl<A> LoaderSession<A> {
    /// Create a session around a transport, registering the completion
    /// callback. Pending count starts at zero.
    pub fn new<F>(transport: Box<dyn AssetTransport>, on_all_complete: F) -> Self
    where
        F: FnOnce(SessionReport) + 'static,
    {
        Self {
            entries: HashMap::new(),
            pending: 0,
            next_id: 0,
            on_all_complete: Some(Box::new(on_all_complete)),
            transport,
        }
    }

    /// Issue a load for `descriptor` and start its out-of-band fetch.
    pub fn issue(&mut self, descriptor: impl Into<String>) -> RequestId {
        let descriptor = descriptor.into();
        let id = RequestId(self.next_id);
        self.next_id += 1;

        self.entries.insert(
            id,
            Entry {
                descriptor: descriptor.clone(),
                state: LoadState::Pending,
            },
        );
        self.pending += 1;

        log::debug!("issue #{} '{}'", id.0, descriptor);
        self.transport.begin(id, &descriptor);
        id
    }

    /// Record the outcome of one request.
    ///
    /// Called by the transport side exactly once per request. If this is the
    /// last outstanding request, the completion callback fires before `resolve`
    /// returns. Unknown or already-resolved ids are logged and ignored so a
    /// misbehaving transport cannot fire the callback twice.
    pub fn resolve(&mut self, request: RequestId, result: Result<A, LoadError>) {
        let Some(entry) = self.entries.get_mut(&request) else {
            log::warn!("resolve for unknown request #{}", request.0);
            return;
        };
        if !matches!(entry.state, LoadState::Pending) {
            log::warn!("duplicate resolve for '{}'", entry.descriptor);
            return;
        }

        entry.state = match result {
            Ok(asset) => LoadState::Done(asset),
            Err(e) => {
                log::warn!("load failed for '{}': {}", entry.descriptor, e);
                LoadState::Failed(e)
            }
        };

        self.pending -= 1;
        if self.pending == 0 {
            if let Some(callback) = self.on_all_complete.take() {
                callback(self.report());
            }
        }
    }

    /// Consume a resolved request's payload.
    ///
    /// Returns `None` while the request is still pending (or unknown). After a
    /// successful `take` the request is removed from the session.
    pub fn take(&mut self, request: RequestId) -> Option<Result<A, LoadError>> {
        match self.entries.get(&request) {
            Some(entry) if !matches!(entry.state, LoadState::Pending) => {}
            _ => return None,
        }
        let entry = self.entries.remove(&request)?;
        match entry.state {
            LoadState::Done(asset) => Some(Ok(asset)),
            LoadState::Failed(e) => Some(Err(e)),
            LoadState::Pending => unreachable!(),
        }
    }

    /// Number of requests still outstanding.
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// True once at least one request was issued and all of them resolved.
    pub fn is_complete(&self) -> bool {
        self.next_id > 0 && self.pending == 0
    }

    fn report(&self) -> SessionReport {
        let mut completed = 0;
        let mut failed = 0;
        let mut failed_descriptors = Vec::new();
        for entry in self.entries.values() {
            match entry.state {
                LoadState::Done(_) => completed += 1,
                LoadState::Failed(_) => {
                    failed += 1;
                    failed_descriptors.push(entry.descriptor.clone());
                }
                LoadState::Pending => {}
            }
        }
        SessionReport {
            completed,
            failed,
            failed_descriptors,
        }
    }
}

/// Shared flag the app layer flips once a session completes.
///
/// Update hooks hold a clone and guard their scene access on
/// [`is_ready`](LoadGate::is_ready) — the load-gated startup transition.
#[derive(Clone, Default)]
pub struct LoadGate(std::rc::Rc<std::cell::Cell<bool>>);

impl LoadGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the gate open. Called from the session's completion callback.
    pub fn open(&self) {
        self.0.set(true);
    }

    /// True once the gating session has completed.
    pub fn is_ready(&self) -> bool {
        self.0.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Transport that records descriptors and never resolves on its own.
    struct RecordingTransport {
        begun: Rc<RefCell<Vec<(RequestId, String)>>>,
    }

    impl AssetTransport for RecordingTransport {
        fn begin(&mut self, request: RequestId, descriptor: &str) {
            self.begun.borrow_mut().push((request, descriptor.to_string()));
        }
    }

    fn session_with_counter() -> (LoaderSession<u32>, Rc<RefCell<Vec<SessionReport>>>) {
        let reports = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&reports);
        let transport = RecordingTransport {
            begun: Rc::new(RefCell::new(Vec::new())),
        };
        let session = LoaderSession::new(Box::new(transport), move |report| {
            sink.borrow_mut().push(report);
        });
        (session, reports)
    }

    #[test]
    fn completion_fires_once_after_last_resolution() {
        let (mut session, reports) = session_with_counter();
        let a = session.issue("a.png");
        let b = session.issue("b.png");
        let c = session.issue("c.png");

        // Out of issue order on purpose.
        session.resolve(b, Ok(2));
        assert!(reports.borrow().is_empty());
        session.resolve(c, Ok(3));
        assert!(reports.borrow().is_empty());
        session.resolve(a, Ok(1));

        assert_eq!(reports.borrow().len(), 1);
        assert!(reports.borrow()[0].is_success());
        assert!(session.is_complete());
    }

    #[test]
    fn zero_issue_session_never_fires() {
        let (session, reports) = session_with_counter();
        assert_eq!(session.pending(), 0);
        assert!(!session.is_complete());
        assert!(reports.borrow().is_empty());
    }

    #[test]
    fn failure_counts_toward_completion() {
        let (mut session, reports) = session_with_counter();
        let a = session.issue("a.png");
        let b = session.issue("missing.png");

        session.resolve(a, Ok(1));
        session.resolve(b, Err(LoadError::Transport("no such file".into())));

        let reports = reports.borrow();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].completed, 1);
        assert_eq!(reports[0].failed, 1);
        assert!(!reports[0].is_success());
        assert_eq!(reports[0].failed_descriptors, vec!["missing.png"]);
    }

    #[test]
    fn duplicate_resolve_is_ignored() {
        let (mut session, reports) = session_with_counter();
        let a = session.issue("a.png");
        let b = session.issue("b.png");

        session.resolve(a, Ok(1));
        session.resolve(a, Ok(99)); // must not double-decrement
        assert!(reports.borrow().is_empty());

        session.resolve(b, Ok(2));
        assert_eq!(reports.borrow().len(), 1);
        assert!(matches!(session.take(a), Some(Ok(1))), "first payload wins");
    }

    #[test]
    fn take_consumes_the_payload() {
        let (mut session, _reports) = session_with_counter();
        let a = session.issue("a.png");

        assert!(session.take(a).is_none(), "pending payload is not consumable");
        session.resolve(a, Ok(7));

        assert!(matches!(session.take(a), Some(Ok(7))));
        assert!(session.take(a).is_none(), "payload is gone after take");
    }

    #[test]
    fn transport_sees_every_descriptor() {
        let begun = Rc::new(RefCell::new(Vec::new()));
        let transport = RecordingTransport {
            begun: Rc::clone(&begun),
        };
        let mut session: LoaderSession<u32> =
            LoaderSession::new(Box::new(transport), |_| {});

        session.issue("one");
        session.issue("two");

        let begun = begun.borrow();
        assert_eq!(begun.len(), 2);
        assert_eq!(begun[0].1, "one");
        assert_eq!(begun[1].1, "two");
    }
}
