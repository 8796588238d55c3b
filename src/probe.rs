//! Existence-by-load probing.
//!
//! The content tree has no listing, so "does this image exist?" is answered by
//! loading it. A probe tries the candidate path as given, then swaps in each
//! fallback extension the path did not already imply:
//!
//! ```text
//! probe("images/notable-work/4/1.jpg", [jpg, jpeg, png])
//!   → images/notable-work/4/1.jpg     (as given)
//!   → images/notable-work/4/1.jpeg
//!   → images/notable-work/4/1.png     (first success wins)
//! ```
//!
//! Loading goes through a [`ContentSource`]. [`FsSource`] reads from a content
//! root on disk and counts an image as loaded once its header decodes to
//! natural dimensions. [`Deadline`] wraps any source with a bounded wait so a
//! stalled read degrades to "not found" instead of stalling the batch.

use crate::naming::split_image_extension;
use crate::types::{Dimensions, Resolved};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, mpsc};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("cannot decode {path}: {reason}")]
    Undecodable { path: String, reason: String },
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("no answer for {0} within {1:?}")]
    TimedOut(String, Duration),
    #[error("probe worker for {0} exited without an answer")]
    Abandoned(String),
}

impl ProbeError {
    /// True when the resource is simply absent, as opposed to present but broken.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ProbeError::NotFound(_))
    }
}

/// Where images and text resources are loaded from.
///
/// Paths are content-relative and `/`-separated.
pub trait ContentSource: Send + Sync {
    /// Load an image far enough to know its natural dimensions.
    fn load_image(&self, path: &str) -> Result<Dimensions, ProbeError>;

    /// Read a text resource.
    fn read_text(&self, path: &str) -> Result<String, ProbeError>;
}

/// Content source backed by a directory on disk.
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a content-relative path onto the filesystem.
    ///
    /// Empty, `.` and `..` segments are dropped so a path can never leave the root.
    pub fn resolve(&self, path: &str) -> PathBuf {
        path.split('/')
            .filter(|seg| !seg.is_empty() && *seg != "." && *seg != "..")
            .fold(self.root.clone(), |acc, seg| acc.join(seg))
    }
}

impl ContentSource for FsSource {
    fn load_image(&self, path: &str) -> Result<Dimensions, ProbeError> {
        let full = self.resolve(path);
        if !full.is_file() {
            return Err(ProbeError::NotFound(path.to_string()));
        }
        match image::image_dimensions(&full) {
            Ok((width, height)) => Ok(Dimensions { width, height }),
            Err(image::ImageError::IoError(source)) => Err(ProbeError::Io {
                path: path.to_string(),
                source,
            }),
            Err(e) => Err(ProbeError::Undecodable {
                path: path.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    fn read_text(&self, path: &str) -> Result<String, ProbeError> {
        let full = self.resolve(path);
        std::fs::read_to_string(&full).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                ProbeError::NotFound(path.to_string())
            } else {
                ProbeError::Io {
                    path: path.to_string(),
                    source,
                }
            }
        })
    }
}

/// Bounded-wait wrapper around another source.
///
/// Each call runs on its own thread; if no answer arrives within the timeout
/// the call reports [`ProbeError::TimedOut`] and the late answer is dropped.
pub struct Deadline<S> {
    inner: Arc<S>,
    timeout: Duration,
}

impl<S: ContentSource + 'static> Deadline<S> {
    pub fn new(inner: S, timeout: Duration) -> Self {
        Self {
            inner: Arc::new(inner),
            timeout,
        }
    }

    fn bounded<T, F>(&self, path: &str, op: F) -> Result<T, ProbeError>
    where
        T: Send + 'static,
        F: FnOnce(&S) -> Result<T, ProbeError> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let inner = Arc::clone(&self.inner);
        std::thread::spawn(move || {
            // The receiver is gone once the deadline passed; nobody wants the answer.
            let _ = tx.send(op(&*inner));
        });
        match rx.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(mpsc::RecvTimeoutError::Timeout) => {
                log::warn!("probe of {path} exceeded {:?}", self.timeout);
                Err(ProbeError::TimedOut(path.to_string(), self.timeout))
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                Err(ProbeError::Abandoned(path.to_string()))
            }
        }
    }
}

impl<S: ContentSource + 'static> ContentSource for Deadline<S> {
    fn load_image(&self, path: &str) -> Result<Dimensions, ProbeError> {
        let owned = path.to_string();
        self.bounded(path, move |s| s.load_image(&owned))
    }

    fn read_text(&self, path: &str) -> Result<String, ProbeError> {
        let owned = path.to_string();
        self.bounded(path, move |s| s.read_text(&owned))
    }
}

/// Open the on-disk source for a content root, bounded when `timeout_ms > 0`.
pub fn open_source(root: &Path, timeout_ms: u64) -> Box<dyn ContentSource> {
    let fs = FsSource::new(root);
    if timeout_ms == 0 {
        Box::new(fs)
    } else {
        Box::new(Deadline::new(fs, Duration::from_millis(timeout_ms)))
    }
}

/// Try `path`, then each extension in `extensions` not already implied by it.
///
/// Returns the first variant that loads, or `None` once every variant failed.
/// Extensions are compared case-insensitively.
pub fn probe<S, E>(source: &S, path: &str, extensions: &[E]) -> Option<Resolved>
where
    S: ContentSource + ?Sized,
    E: AsRef<str>,
{
    if let Some(found) = attempt(source, path) {
        return Some(found);
    }

    let (stem, implied) = split_image_extension(path);
    let mut tried: Vec<String> = implied.into_iter().collect();

    for ext in extensions {
        let ext = ext.as_ref().to_ascii_lowercase();
        if tried.contains(&ext) {
            continue;
        }
        let candidate = format!("{stem}.{ext}");
        tried.push(ext);
        if let Some(found) = attempt(source, &candidate) {
            return Some(found);
        }
    }

    log::debug!("no loadable variant of {path}");
    None
}

/// Probe `primary`, and if nothing loads, probe `legacy` with the same fallbacks.
pub fn probe_with_legacy<S, E>(
    source: &S,
    primary: &str,
    legacy: &str,
    extensions: &[E],
) -> Option<Resolved>
where
    S: ContentSource + ?Sized,
    E: AsRef<str>,
{
    probe(source, primary, extensions).or_else(|| {
        log::debug!("{primary} missing, trying legacy {legacy}");
        probe(source, legacy, extensions)
    })
}

fn attempt<S: ContentSource + ?Sized>(source: &S, path: &str) -> Option<Resolved> {
    match source.load_image(path) {
        Ok(dimensions) => Some(Resolved {
            path: path.to_string(),
            dimensions,
        }),
        Err(e) if e.is_not_found() => {
            log::trace!("{e}");
            None
        }
        Err(e) => {
            log::debug!("{e}");
            None
        }
    }
}
