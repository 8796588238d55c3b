//! # Notable Gal
//!
//! A gallery engine for convention-based image portfolios. The content tree
//! has no index: pieces live in numbered folders under `images/notable-work/`,
//! and whatever loads is what exists.
//!
//! # Architecture
//!
//! Components build on each other, leaf to root:
//!
//! ```text
//! probe      path + fallback extensions  →  first variant that loads
//! discover   1..=N folder IDs            →  IDs with a primary image, newest first
//! piece      piece-data.txt              →  PieceRecord
//! gallery    folder IDs                  →  tiles with row-regulated sizes
//! modal      gallery + folder ID         →  typed Open(index) state, layout tier
//! overlay    session store + clock       →  intro overlay state
//! render     all of the above            →  dist/ static site
//! ```
//!
//! Probes are issued in parallel batches on the rayon pool and awaited as a
//! whole; results are sorted explicitly afterwards, never taken in completion
//! order.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`probe`] | `ContentSource` trait, filesystem source, bounded-wait wrapper, extension-fallback probing |
//! | [`discover`] | Folder discovery (manifest first, probing as fallback), home background candidates |
//! | [`piece`] | `piece-data.txt` parser |
//! | [`gallery`] | Gallery tiles, legacy fallback, row-height regulation, project images |
//! | [`modal`] | Piece assembly and the modal state machine |
//! | [`overlay`] | Intro overlay and its session flag |
//! | [`render`] | Static HTML output using Maud |
//! | [`config`] | `config.toml` loading, validation, and merging |
//! | [`naming`] | Path conventions of the `images/` tree |
//! | [`types`] | Shared types (`FolderId`, `Dimensions`, `ImageDescriptor`) |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Manifest First, Probing as a Shim
//!
//! Probing costs up to one load per extension per candidate. When
//! `images/notable-work/manifest.json` exists it is trusted outright; the
//! `manifest` command writes it from the filesystem.
//!
//! ## Bounded Probes
//!
//! A load that never answers would stall a whole batch. [`probe::Deadline`]
//! gives each load a fixed budget and reports a miss when it runs out.
//!
//! ## Typed Modal State
//!
//! The current index and the ordered image list belong to
//! [`modal::ModalController`]. They are only serialized when written into
//! rendered HTML.

pub mod config;
pub mod discover;
pub mod gallery;
pub mod modal;
pub mod naming;
pub mod output;
pub mod overlay;
pub mod piece;
pub mod probe;
pub mod render;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;

