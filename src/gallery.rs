//! Gallery construction and row-height regulation.
//!
//! A [`Gallery`] is built once from the discovered folder IDs and is
//! immutable afterwards: tiles keep the discovery order (newest first) and are
//! identified only by their [`FolderId`], never by position.
//!
//! Each tile's primary image is loaded from the per-folder layout first
//! (`images/notable-work/<id>/1.jpg`) and from the legacy flat layout
//! (`images/notable-work/<id>.jpg`) second. Tiles whose image never loads keep
//! a placeholder.
//!
//! ## Row regulation
//!
//! Once every load has settled, tiles are grouped into rows and each row is
//! brought to a common height without cropping:
//!
//! ```text
//! implied height = tile width / aspect ratio
//! row height     = mean(implied heights of loaded tiles)
//! tile width     = row height × aspect ratio
//! ```

use crate::config::{GalleryConfig, ProbeConfig};
use crate::naming;
use crate::probe::{self, ContentSource};
use crate::types::{Dimensions, FolderId, Resolved};
use rayon::prelude::*;
use serde::Serialize;

/// Regulated display size of one tile, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TileSize {
    pub width: f64,
    pub height: f64,
}

/// One gallery tile.
#[derive(Debug, Clone, Serialize)]
pub struct GalleryItem {
    pub folder_id: FolderId,
    /// `None` when no variant loaded; the tile shows a placeholder.
    pub image: Option<Resolved>,
    /// Set by row regulation; `None` for placeholders and unsized rows.
    pub size: Option<TileSize>,
}

impl GalleryItem {
    pub fn is_placeholder(&self) -> bool {
        self.image.is_none()
    }
}

/// Tiles in display order.
#[derive(Debug, Clone, Serialize)]
pub struct Gallery {
    items: Vec<GalleryItem>,
    /// Dimensions recorded for placeholder tiles.
    placeholder: Dimensions,
}

impl Gallery {
    pub fn items(&self) -> &[GalleryItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Folder IDs in display order.
    pub fn folder_ids(&self) -> Vec<FolderId> {
        self.items.iter().map(|item| item.folder_id).collect()
    }

    pub fn contains(&self, id: FolderId) -> bool {
        self.items.iter().any(|item| item.folder_id == id)
    }

    pub fn get(&self, id: FolderId) -> Option<&GalleryItem> {
        self.items.iter().find(|item| item.folder_id == id)
    }

    /// Natural dimensions of a tile, or the placeholder size when it has none.
    pub fn dimensions_of(&self, item: &GalleryItem) -> Dimensions {
        item.image
            .as_ref()
            .map(|img| img.dimensions)
            .unwrap_or(self.placeholder)
    }

    /// Tiles grouped into rows of `per_row`.
    pub fn rows(&self, per_row: usize) -> impl Iterator<Item = &[GalleryItem]> {
        self.items.chunks(per_row.max(1))
    }
}

/// Build the gallery for `folders`, loading every tile in parallel, then
/// regulate row heights.
pub fn build_gallery<S: ContentSource + ?Sized>(
    source: &S,
    folders: &[FolderId],
    probe_config: &ProbeConfig,
    gallery_config: &GalleryConfig,
) -> Gallery {
    let items: Vec<GalleryItem> = folders
        .par_iter()
        .map(|&folder_id| {
            let image = probe::probe_with_legacy(
                source,
                &naming::primary_candidate(folder_id),
                &naming::legacy_candidate(folder_id),
                &probe_config.fallback_extensions,
            );
            if image.is_none() {
                log::warn!("no image for folder {folder_id}, using placeholder");
            }
            GalleryItem {
                folder_id,
                image,
                size: None,
            }
        })
        .collect();

    let [width, height] = gallery_config.placeholder_size;
    let mut gallery = Gallery {
        items,
        placeholder: Dimensions { width, height },
    };
    regulate(&mut gallery, gallery_config);

    log::info!(
        "gallery built: {} tiles, {} placeholders",
        gallery.len(),
        gallery.items.iter().filter(|i| i.is_placeholder()).count()
    );
    gallery
}

fn regulate(gallery: &mut Gallery, config: &GalleryConfig) {
    let tiles: Vec<RowTile> = gallery
        .items
        .iter()
        .map(|item| RowTile {
            aspect_ratio: item.image.as_ref().and_then(|i| i.dimensions.aspect_ratio()),
            measured_width: None,
        })
        .collect();

    let sizes = regulate_row_heights(&tiles, config.items_per_row, config.fallback_tile_width);
    for (item, size) in gallery.items.iter_mut().zip(sizes) {
        item.size = size;
    }
}

/// Input to row regulation for a single tile.
#[derive(Debug, Clone, Copy, Default)]
pub struct RowTile {
    /// Natural width over height; `None` for tiles without a loaded image.
    pub aspect_ratio: Option<f64>,
    /// Current rendered width, when one has been measured.
    pub measured_width: Option<f64>,
}

/// Compute a common height per row and each loaded tile's size at that height.
///
/// Rows with no loaded tile, and placeholder tiles, get `None`.
pub fn regulate_row_heights(
    tiles: &[RowTile],
    per_row: usize,
    fallback_width: f64,
) -> Vec<Option<TileSize>> {
    tiles
        .chunks(per_row.max(1))
        .flat_map(|row| {
            let implied: Vec<f64> = row
                .iter()
                .filter_map(|tile| {
                    let aspect = tile.aspect_ratio?;
                    let width = tile.measured_width.unwrap_or(fallback_width);
                    Some(width / aspect)
                })
                .collect();

            let target = if implied.is_empty() {
                None
            } else {
                Some(implied.iter().sum::<f64>() / implied.len() as f64)
            };

            row.iter().map(move |tile| {
                let height = target?;
                let aspect = tile.aspect_ratio?;
                Some(TileSize {
                    width: height * aspect,
                    height,
                })
            })
        })
        .collect()
}

// ============================================================================
// Project pages
// ============================================================================

/// One numbered image slot on a project page.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectImage {
    pub number: u32,
    pub image: Option<Resolved>,
}

/// Resolve images `1..=count` of a named project folder.
///
/// Each slot tries `images/<project>/<n>/1.jpg` then `images/<project>/<n>.jpg`;
/// misses stay as placeholders.
pub fn load_project_images<S: ContentSource + ?Sized>(
    source: &S,
    project: &str,
    count: u32,
    probe_config: &ProbeConfig,
) -> Vec<ProjectImage> {
    (1..=count)
        .into_par_iter()
        .map(|number| ProjectImage {
            number,
            image: probe::probe_with_legacy(
                source,
                &naming::project_candidate(project, number),
                &naming::project_legacy_candidate(project, number),
                &probe_config.fallback_extensions,
            ),
        })
        .collect()
}
