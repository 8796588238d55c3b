//! Piece modal: image-set assembly and navigation state.
//!
//! ```text
//! Closed ──open(id)──▶ Opening ──finish_open(ticket, piece)──▶ Open(0)
//!                                                     next/prev │ ▲
//!                                                               ▼ │
//!   ▲                                                       Open(i')
//!   └──────────────────────────── close() ◀─────────────────────┘
//! ```
//!
//! Opening is split in two so the slow part can run elsewhere: [`ModalController::open`]
//! validates the folder and hands out an [`OpenTicket`]; [`assemble_piece`]
//! loads the metadata and probes the folder's images; [`ModalController::finish_open`]
//! installs the result. A newer open, or a close, invalidates older tickets,
//! so an assembly that arrives late is discarded instead of replacing what
//! the user is looking at.

use crate::config::ProbeConfig;
use crate::gallery::Gallery;
use crate::naming;
use crate::piece::{self, PieceRecord};
use crate::probe::{self, ContentSource};
use crate::types::{FolderId, ImageDescriptor, Resolved};
use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModalError {
    #[error("invalid folder ID: {0:?}")]
    InvalidFolderId(String),
    #[error("folder {0} is not in the gallery")]
    UnknownFolder(FolderId),
}

/// Sizing parameters for the open modal, selected by total image count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModalLayout {
    pub image_max_width: &'static str,
    pub supplement_columns: &'static str,
    pub supplement_height: &'static str,
    pub modal_max_height: &'static str,
}

impl ModalLayout {
    pub fn for_count(count: usize) -> Self {
        match count {
            n if n > 7 => Self {
                image_max_width: "65%",
                supplement_columns: "repeat(3, minmax(120px, 1fr))",
                supplement_height: "140px",
                modal_max_height: "95vh",
            },
            n if n > 5 => Self {
                image_max_width: "70%",
                supplement_columns: "repeat(3, minmax(130px, 1fr))",
                supplement_height: "180px",
                modal_max_height: "92vh",
            },
            n if n > 3 => Self {
                image_max_width: "75%",
                supplement_columns: "repeat(2, minmax(150px, 1fr))",
                supplement_height: "200px",
                modal_max_height: "90vh",
            },
            _ => Self {
                image_max_width: "85.7%",
                supplement_columns: "repeat(2, minmax(140px, 1fr))",
                supplement_height: "220px",
                modal_max_height: "90vh",
            },
        }
    }
}

/// Everything loaded for one piece: metadata plus its ordered images.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssembledPiece {
    pub folder_id: FolderId,
    pub record: PieceRecord,
    /// Main image first, then extras in ascending numeric order.
    pub images: Vec<ImageDescriptor>,
}

impl AssembledPiece {
    pub fn main(&self) -> Option<&ImageDescriptor> {
        self.images.first().filter(|img| img.is_main)
    }

    pub fn extras(&self) -> impl Iterator<Item = &ImageDescriptor> {
        self.images.iter().filter(|img| !img.is_main)
    }
}

/// Load a piece's metadata and probe its numbered images concurrently.
///
/// Image 1 is the main image; `2..=max_extras` are extras. Extras are sorted
/// by the number in their resolved file name once every probe has settled.
pub fn assemble_piece<S: ContentSource + ?Sized>(
    source: &S,
    id: FolderId,
    config: &ProbeConfig,
) -> AssembledPiece {
    let (record, (main, extras)) = rayon::join(
        || piece::load_piece_data(source, id),
        || {
            rayon::join(
                || probe::probe(source, &naming::image_in_folder(id, 1), &config.folder_extensions),
                || {
                    (2..=config.max_extras)
                        .into_par_iter()
                        .filter_map(|n| {
                            probe::probe(
                                source,
                                &naming::image_in_folder(id, n),
                                &config.folder_extensions,
                            )
                        })
                        .collect::<Vec<Resolved>>()
                },
            )
        },
    );

    let main = main.map(|r| ImageDescriptor {
        path: r.path,
        is_main: true,
    });
    let images: Vec<ImageDescriptor> = main.into_iter().chain(order_extras(extras)).collect();

    log::debug!("folder {id}: {} images", images.len());
    AssembledPiece {
        folder_id: id,
        record,
        images,
    }
}

/// Sort resolved extras by the number in their file name, whatever order they
/// settled in. Anything resolving to image 1 is dropped.
fn order_extras(mut extras: Vec<Resolved>) -> Vec<ImageDescriptor> {
    extras.sort_by_key(|r| naming::numeric_suffix(&r.path));
    extras
        .into_iter()
        .filter(|r| naming::numeric_suffix(&r.path) != Some(1))
        .map(|r| ImageDescriptor {
            path: r.path,
            is_main: false,
        })
        .collect()
}

/// Proof that an open was requested; redeemed by [`ModalController::finish_open`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenTicket {
    pub folder_id: FolderId,
    generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalState {
    Closed,
    Opening(FolderId),
    Open(usize),
}

/// What the modal currently displays.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModalView<'a> {
    pub folder_id: FolderId,
    pub index: usize,
    /// `None` when the piece has no images; a placeholder is shown instead.
    pub image: Option<&'a ImageDescriptor>,
    pub count: usize,
    pub left_arrow: bool,
    pub right_arrow: bool,
    pub layout: ModalLayout,
    pub record: &'a PieceRecord,
}

impl ModalView<'_> {
    /// Arrows are only rendered when there is somewhere to go.
    pub fn has_arrows(&self) -> bool {
        self.count > 1
    }
}

/// Typed state for the single piece modal.
pub struct ModalController<'g> {
    gallery: &'g Gallery,
    state: ModalState,
    generation: u64,
    piece: Option<AssembledPiece>,
    scroll_locked: bool,
}

impl<'g> ModalController<'g> {
    pub fn new(gallery: &'g Gallery) -> Self {
        Self {
            gallery,
            state: ModalState::Closed,
            generation: 0,
            piece: None,
            scroll_locked: false,
        }
    }

    pub fn state(&self) -> ModalState {
        self.state
    }

    pub fn is_scroll_locked(&self) -> bool {
        self.scroll_locked
    }

    /// Last assembled piece, kept after close until the next open replaces it.
    pub fn cached_piece(&self) -> Option<&AssembledPiece> {
        self.piece.as_ref()
    }

    /// Validate raw caller input and move to `Opening`.
    ///
    /// Invalid or unknown IDs are logged and leave the state untouched.
    pub fn open(&mut self, raw_id: &str) -> Result<OpenTicket, ModalError> {
        let Some(id) = naming::parse_folder_id(raw_id) else {
            let err = ModalError::InvalidFolderId(raw_id.to_string());
            log::error!("{err}");
            return Err(err);
        };
        if !self.gallery.contains(id) {
            let err = ModalError::UnknownFolder(id);
            log::error!("{err}");
            return Err(err);
        }

        self.generation += 1;
        self.state = ModalState::Opening(id);
        self.scroll_locked = true;
        Ok(OpenTicket {
            folder_id: id,
            generation: self.generation,
        })
    }

    /// Install an assembled piece. Returns `false` if the ticket is stale.
    pub fn finish_open(&mut self, ticket: OpenTicket, piece: AssembledPiece) -> bool {
        let current = ticket.generation == self.generation
            && self.state == ModalState::Opening(ticket.folder_id)
            && piece.folder_id == ticket.folder_id;
        if !current {
            log::debug!("discarding stale assembly for folder {}", ticket.folder_id);
            return false;
        }
        self.piece = Some(piece);
        self.state = ModalState::Open(0);
        true
    }

    /// Validate, assemble, and open in one step.
    pub fn open_with<S: ContentSource + ?Sized>(
        &mut self,
        raw_id: &str,
        source: &S,
        config: &ProbeConfig,
    ) -> Result<(), ModalError> {
        let ticket = self.open(raw_id)?;
        let piece = assemble_piece(source, ticket.folder_id, config);
        self.finish_open(ticket, piece);
        Ok(())
    }

    pub fn next(&mut self) {
        self.navigate(1);
    }

    pub fn prev(&mut self) {
        self.navigate(-1);
    }

    /// Move by `delta`; targets outside `[0, count-1]` are ignored.
    pub fn navigate(&mut self, delta: isize) {
        let ModalState::Open(index) = self.state else {
            return;
        };
        let count = self.piece.as_ref().map_or(0, |p| p.images.len());
        match index.checked_add_signed(delta) {
            Some(target) if target < count => self.state = ModalState::Open(target),
            _ => {}
        }
    }

    pub fn close(&mut self) {
        self.generation += 1;
        self.state = ModalState::Closed;
        self.scroll_locked = false;
    }

    pub fn view(&self) -> Option<ModalView<'_>> {
        let ModalState::Open(index) = self.state else {
            return None;
        };
        let piece = self.piece.as_ref()?;
        Some(view_of(piece, index))
    }
}

/// The view of `piece` at `index`, as the controller would show it.
pub fn view_of(piece: &AssembledPiece, index: usize) -> ModalView<'_> {
    let count = piece.images.len();
    let multiple = count > 1;
    ModalView {
        folder_id: piece.folder_id,
        index,
        image: piece.images.get(index),
        count,
        left_arrow: multiple && index > 0,
        right_arrow: multiple && index + 1 < count,
        layout: ModalLayout::for_count(count),
        record: &piece.record,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GalleryConfig;
    use crate::gallery::build_gallery;
    use crate::test_helpers::{MockSource, fid};
    use crate::types::Dimensions;
    use std::time::Duration;

    fn source_with_images(id: u32, count: u32) -> MockSource {
        (1..=count).fold(MockSource::new(), |s, n| {
            s.with_image(&format!("images/notable-work/{id}/{n}.jpg"), 10, 10)
        })
    }

    fn gallery_of(source: &MockSource, ids: &[u32]) -> Gallery {
        let ids: Vec<FolderId> = ids.iter().map(|&n| fid(n)).collect();
        build_gallery(
            source,
            &ids,
            &ProbeConfig::default(),
            &GalleryConfig::default(),
        )
    }

    #[test]
    fn next_three_then_prev_lands_on_two() {
        let source = source_with_images(4, 4);
        let gallery = gallery_of(&source, &[4]);
        let mut modal = ModalController::new(&gallery);

        modal.open_with("4", &source, &ProbeConfig::default()).unwrap();
        modal.next();
        modal.next();
        modal.next();
        modal.prev();

        let view = modal.view().unwrap();
        assert_eq!(view.index, 2);
        assert!(view.left_arrow);
        assert!(view.right_arrow);
    }

    #[test]
    fn prev_at_start_is_noop() {
        let source = source_with_images(1, 3);
        let gallery = gallery_of(&source, &[1]);
        let mut modal = ModalController::new(&gallery);
        modal.open_with("1", &source, &ProbeConfig::default()).unwrap();

        modal.prev();

        let view = modal.view().unwrap();
        assert_eq!(view.index, 0);
        assert!(!view.left_arrow);
        assert!(view.right_arrow);
    }

    #[test]
    fn next_at_end_is_noop() {
        let source = source_with_images(1, 2);
        let gallery = gallery_of(&source, &[1]);
        let mut modal = ModalController::new(&gallery);
        modal.open_with("1", &source, &ProbeConfig::default()).unwrap();

        modal.next();
        modal.next();

        let view = modal.view().unwrap();
        assert_eq!(view.index, 1);
        assert!(!view.right_arrow);
    }

    #[test]
    fn unknown_folder_rejected_without_state_change() {
        let source = source_with_images(2, 1);
        let gallery = gallery_of(&source, &[2]);
        let mut modal = ModalController::new(&gallery);

        assert_eq!(
            modal.open("9").unwrap_err(),
            ModalError::UnknownFolder(fid(9))
        );
        assert_eq!(modal.state(), ModalState::Closed);
        assert!(!modal.is_scroll_locked());
    }

    #[test]
    fn non_numeric_folder_rejected() {
        let gallery = gallery_of(&MockSource::new(), &[]);
        let mut modal = ModalController::new(&gallery);
        for raw in ["abc", "0", "-1", ""] {
            assert!(matches!(
                modal.open(raw),
                Err(ModalError::InvalidFolderId(_))
            ));
        }
        assert_eq!(modal.state(), ModalState::Closed);
    }

    #[test]
    fn stale_ticket_is_discarded() {
        let source = source_with_images(1, 1).with_image("images/notable-work/2/1.jpg", 5, 5);
        let gallery = gallery_of(&source, &[2, 1]);
        let config = ProbeConfig::default();
        let mut modal = ModalController::new(&gallery);

        let first = modal.open("1").unwrap();
        let second = modal.open("2").unwrap();

        assert!(!modal.finish_open(first, assemble_piece(&source, fid(1), &config)));
        assert_eq!(modal.state(), ModalState::Opening(fid(2)));
        assert!(modal.finish_open(second, assemble_piece(&source, fid(2), &config)));
        assert_eq!(modal.view().unwrap().folder_id, fid(2));
    }

    #[test]
    fn close_invalidates_pending_open() {
        let source = source_with_images(1, 1);
        let gallery = gallery_of(&source, &[1]);
        let mut modal = ModalController::new(&gallery);

        let ticket = modal.open("1").unwrap();
        modal.close();

        assert!(!modal.finish_open(ticket, assemble_piece(&source, fid(1), &ProbeConfig::default())));
        assert_eq!(modal.state(), ModalState::Closed);
    }

    #[test]
    fn close_keeps_cached_images_and_reopen_resets_index() {
        let source = source_with_images(1, 3);
        let gallery = gallery_of(&source, &[1]);
        let config = ProbeConfig::default();
        let mut modal = ModalController::new(&gallery);

        modal.open_with("1", &source, &config).unwrap();
        modal.next();
        modal.close();

        assert!(!modal.is_scroll_locked());
        assert!(modal.view().is_none());
        assert_eq!(modal.cached_piece().unwrap().images.len(), 3);

        modal.open_with("1", &source, &config).unwrap();
        assert_eq!(modal.view().unwrap().index, 0);
    }

    #[test]
    fn navigation_while_closed_is_noop() {
        let gallery = gallery_of(&MockSource::new(), &[]);
        let mut modal = ModalController::new(&gallery);
        modal.next();
        assert_eq!(modal.state(), ModalState::Closed);
    }

    #[test]
    fn extras_sorted_numerically_regardless_of_settle_order() {
        let source = MockSource::new()
            .with_image("images/notable-work/3/1.jpg", 10, 10)
            .with_image("images/notable-work/3/2.png", 10, 10)
            .with_image("images/notable-work/3/3.jpg", 10, 10)
            .with_image("images/notable-work/3/10.jpeg", 10, 10)
            .with_delay_for("images/notable-work/3/2.jpg", Duration::from_millis(60))
            .with_delay_for("images/notable-work/3/3.jpg", Duration::from_millis(30));

        let piece = assemble_piece(&source, fid(3), &ProbeConfig::default());

        let paths: Vec<&str> = piece.images.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "images/notable-work/3/1.jpg",
                "images/notable-work/3/2.png",
                "images/notable-work/3/3.jpg",
                "images/notable-work/3/10.jpeg",
            ]
        );
        assert!(piece.images[0].is_main);
        assert_eq!(piece.extras().count(), 3);
    }

    #[test]
    fn extras_ordered_by_file_number_not_arrival() {
        let resolved = |path: &str| Resolved {
            path: path.to_string(),
            dimensions: Dimensions {
                width: 1,
                height: 1,
            },
        };
        let arrived = vec![
            resolved("images/notable-work/3/10.jpeg"),
            resolved("images/notable-work/3/3.jpg"),
            resolved("images/notable-work/3/1.png"),
            resolved("images/notable-work/3/2.png"),
        ];

        let ordered = order_extras(arrived);

        let paths: Vec<&str> = ordered.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "images/notable-work/3/2.png",
                "images/notable-work/3/3.jpg",
                "images/notable-work/3/10.jpeg",
            ]
        );
        assert!(ordered.iter().all(|i| !i.is_main));
    }

    #[test]
    fn piece_without_images_shows_placeholder() {
        let source = MockSource::new()
            .with_image("images/notable-work/6.jpg", 10, 10)
            .with_text("images/notable-work/6/piece-data.txt", "title: Lost");
        let gallery = gallery_of(&source, &[6]);
        let mut modal = ModalController::new(&gallery);

        modal.open_with("6", &source, &ProbeConfig::default()).unwrap();

        let view = modal.view().unwrap();
        assert!(view.image.is_none());
        assert!(!view.has_arrows());
        assert_eq!(view.record.title, "Lost");
    }

    #[test]
    fn single_image_has_no_arrows() {
        let source = source_with_images(1, 1);
        let piece = assemble_piece(&source, fid(1), &ProbeConfig::default());
        let view = view_of(&piece, 0);
        assert!(!view.left_arrow && !view.right_arrow);
    }

    #[test]
    fn layout_tiers_switch_at_boundaries() {
        assert_eq!(ModalLayout::for_count(0).image_max_width, "85.7%");
        assert_eq!(ModalLayout::for_count(3).image_max_width, "85.7%");
        assert_eq!(ModalLayout::for_count(4).image_max_width, "75%");
        assert_eq!(ModalLayout::for_count(5).supplement_height, "200px");
        assert_eq!(ModalLayout::for_count(6).image_max_width, "70%");
        assert_eq!(ModalLayout::for_count(7).modal_max_height, "92vh");
        assert_eq!(ModalLayout::for_count(8).image_max_width, "65%");
        assert_eq!(
            ModalLayout::for_count(10).supplement_columns,
            "repeat(3, minmax(120px, 1fr))"
        );
    }
}
