//! File-backed asset transport: threads fetch and decode, a channel carries
//! completions back to the render thread.

use std::path::Path;
use std::sync::mpsc;
use std::thread;

use crate::loader::{AssetTransport, LoadError, LoaderSession, RequestId};

/// A decoded asset payload.
pub enum Asset {
    /// A decoded image, ready for texture upload.
    Image(image::DynamicImage),
    /// Raw bytes for anything without a known decoder.
    Bytes(Vec<u8>),
}

impl Asset {
    pub fn as_image(&self) -> Option<&image::DynamicImage> {
        match self {
            Asset::Image(img) => Some(img),
            Asset::Bytes(_) => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Asset::Bytes(b) => Some(b),
            Asset::Image(_) => None,
        }
    }
}

fn is_image_path(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("png" | "jpg" | "jpeg" | "gif" | "bmp" | "tga")
    )
}

fn fetch(path: &Path) -> Result<Asset, LoadError> {
    let bytes = std::fs::read(path)?;
    if is_image_path(path) {
        let img = image::load_from_memory(&bytes)
            .map_err(|e| LoadError::Decode(e.to_string()))?;
        Ok(Asset::Image(img))
    } else {
        Ok(Asset::Bytes(bytes))
    }
}

/// Transport that reads and decodes files on worker threads.
///
/// Created in a pair with [`Completions`]: the transport goes into the
/// [`LoaderSession`], the completions receiver stays with the frame loop and
/// gets [drained](Completions::drain) once per frame.
pub struct FileTransport {
    tx: mpsc::Sender<(RequestId, Result<Asset, LoadError>)>,
}

impl FileTransport {
    pub fn new() -> (Self, Completions) {
        let (tx, rx) = mpsc::channel();
        (Self { tx }, Completions { rx })
    }
}

impl AssetTransport for FileTransport {
    fn begin(&mut self, request: RequestId, descriptor: &str) {
        let tx = self.tx.clone();
        let path = descriptor.to_string();
        thread::spawn(move || {
            let result = fetch(Path::new(&path));
            // The receiver may be gone during shutdown; nothing to deliver to.
            let _ = tx.send((request, result));
        });
    }
}

/// Receiving half of a [`FileTransport`] pair.
pub struct Completions {
    rx: mpsc::Receiver<(RequestId, Result<Asset, LoadError>)>,
}

impl Completions {
    /// Feed every completion that arrived since the last drain into the
    /// session. Non-blocking; call once per frame before ticking.
    pub fn drain(&mut self, session: &mut LoaderSession<Asset>) {
        while let Ok((request, result)) = self.rx.try_recv() {
            session.resolve(request, result);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_resolves_as_io_failure() {
        let (transport, mut completions) = FileTransport::new();
        let mut session = LoaderSession::<Asset>::new(Box::new(transport), |_| {});
        let id = session.issue("definitely/not/a/real/path.bin");

        // The worker thread delivers through the channel; poll until it does.
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        while session.pending() > 0 && std::time::Instant::now() < deadline {
            completions.drain(&mut session);
            std::thread::yield_now();
        }

        assert!(matches!(session.take(id), Some(Err(LoadError::Io(_)))));
    }

    #[test]
    fn unknown_extension_loads_as_raw_bytes() {
        let dir = std::env::temp_dir();
        let path = dir.join("glint_transport_test.bin");
        std::fs::write(&path, b"payload").unwrap();

        let (transport, mut completions) = FileTransport::new();
        let mut session = LoaderSession::<Asset>::new(Box::new(transport), |_| {});
        let id = session.issue(path.to_string_lossy().to_string());

        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        while session.pending() > 0 && std::time::Instant::now() < deadline {
            completions.drain(&mut session);
            std::thread::yield_now();
        }

        let asset = session.take(id).unwrap().unwrap();
        assert_eq!(asset.as_bytes(), Some(&b"payload"[..]));
        let _ = std::fs::remove_file(&path);
    }
}
