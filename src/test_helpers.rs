//! Shared test utilities for the notable-gal test suite.
//!
//! Provides a recording [`MockSource`] for probe-level tests and helpers that
//! lay out a real content tree (with decodable images) in a temp directory.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! write_image(tmp.path(), "images/notable-work/1/1.jpg", 30, 20);
//! write_text(tmp.path(), "images/notable-work/1/piece-data.txt", "title: Dusk");
//!
//! let source = MockSource::new().with_image("a/1.png", 10, 10);
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use crate::probe::{ContentSource, ProbeError};
use crate::types::{Dimensions, FolderId};

// =========================================================================
// Content tree setup
// =========================================================================

/// Encode a blank `width`×`height` image at `rel` under `root`.
///
/// The format follows the extension, so the file decodes like a real upload.
pub fn write_image(root: &Path, rel: &str, width: u32, height: u32) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    image::RgbImage::new(width, height)
        .save(&path)
        .unwrap_or_else(|e| panic!("failed to write test image {rel}: {e}"));
}

/// Write a text file at `rel` under `root`, creating parent directories.
pub fn write_text(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

/// Shorthand for a known-valid folder ID.
pub fn fid(n: u32) -> FolderId {
    FolderId::new(n).expect("test folder IDs start at 1")
}

// =========================================================================
// Mock content source
// =========================================================================

/// In-memory content source that records every load attempt.
///
/// Uses `Mutex` so it is `Sync` and works inside rayon batches.
#[derive(Default)]
pub struct MockSource {
    images: HashMap<String, Dimensions>,
    texts: HashMap<String, String>,
    delay: Option<Duration>,
    delays: HashMap<String, Duration>,
    calls: Mutex<Vec<String>>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(mut self, path: &str, width: u32, height: u32) -> Self {
        self.images
            .insert(path.to_string(), Dimensions { width, height });
        self
    }

    pub fn with_text(mut self, path: &str, content: &str) -> Self {
        self.texts.insert(path.to_string(), content.to_string());
        self
    }

    /// Delay every answer.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Delay answers for one path only.
    pub fn with_delay_for(mut self, path: &str, delay: Duration) -> Self {
        self.delays.insert(path.to_string(), delay);
        self
    }

    /// Every path attempted so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, path: &str) {
        self.calls.lock().unwrap().push(path.to_string());
        if let Some(delay) = self.delays.get(path).copied().or(self.delay) {
            std::thread::sleep(delay);
        }
    }
}

impl ContentSource for MockSource {
    fn load_image(&self, path: &str) -> Result<Dimensions, ProbeError> {
        self.record(path);
        self.images
            .get(path)
            .copied()
            .ok_or_else(|| ProbeError::NotFound(path.to_string()))
    }

    fn read_text(&self, path: &str) -> Result<String, ProbeError> {
        self.record(path);
        self.texts
            .get(path)
            .cloned()
            .ok_or_else(|| ProbeError::NotFound(path.to_string()))
    }
}
