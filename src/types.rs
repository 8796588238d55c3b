//! Shared types used across the prober, gallery, modal, and renderer.
//!
//! Paths are always content-relative and `/`-separated, exactly as they would
//! appear in a page's `src` attribute (`images/notable-work/4/1.jpg`).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of one portfolio piece: the numeric name of its image directory.
///
/// Always `>= 1`. Folder IDs are discovered, never assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct FolderId(u32);

impl FolderId {
    /// Returns `None` for zero.
    pub fn new(id: u32) -> Option<Self> {
        (id >= 1).then_some(Self(id))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for FolderId {
    type Error = String;

    fn try_from(id: u32) -> Result<Self, Self::Error> {
        Self::new(id).ok_or_else(|| "folder IDs start at 1".to_string())
    }
}

impl From<FolderId> for u32 {
    fn from(id: FolderId) -> u32 {
        id.0
    }
}

impl fmt::Display for FolderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Natural pixel dimensions of a loaded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    /// Width over height. Zero-height images report `None`.
    pub fn aspect_ratio(&self) -> Option<f64> {
        if self.width == 0 || self.height == 0 {
            None
        } else {
            Some(self.width as f64 / self.height as f64)
        }
    }
}

/// A candidate path that loaded successfully.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolved {
    pub path: String,
    pub dimensions: Dimensions,
}

/// One entry of an open piece's ordered image list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDescriptor {
    pub path: String,
    #[serde(rename = "isMain")]
    pub is_main: bool,
}
