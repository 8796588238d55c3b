//! CLI output formatting for every command.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. The primary display
//! for every entity (folder, image, piece) is its identity, the folder ID or
//! positional index, with resolved paths shown as secondary context. Paths are
//! always content-relative.
//!
//! # Output Format
//!
//! ## Discover
//!
//! ```text
//! Folders (probed 1..=200)
//! 007 images/notable-work/7/1.jpg (1600x1200)
//! 004 images/notable-work/4.png (800x800)
//! 002 (placeholder)
//!
//! Found 3 folders
//! ```
//!
//! ## Piece
//!
//! ```text
//! Piece 7: Untitled Study
//!     Size: 24x36in
//!     Year: 2023
//!     Description: First line. Second paragraph.
//!
//! Images
//!     001 images/notable-work/7/1.jpg (main)
//!   > 002 images/notable-work/7/2.png
//!
//! Image 2 of 2  [<]
//! Layout: 85.7% image, repeat(2, minmax(140px, 1fr)) x 220px, 90vh
//! ```
//!
//! ## Build
//!
//! ```text
//! Gallery: 12 tiles (1 placeholder), folders from manifest
//! Pieces: 12 (31 pages)
//! Projects: 2 pages
//! Home: 8 background images
//! Copied 58 files
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::discover::{ContentManifest, Discovery, DiscoverySource};
use crate::gallery::Gallery;
use crate::modal::ModalView;
use crate::render::BuildReport;
use crate::types::ImageDescriptor;

/// Format a positional index or folder ID as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{cut}...")
    }
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

fn source_label(discovery_source: DiscoverySource, max_folder_id: u32) -> String {
    match discovery_source {
        DiscoverySource::Manifest => "from manifest".to_string(),
        DiscoverySource::Probe => format!("probed 1..={max_folder_id}"),
    }
}

// ============================================================================
// Discover
// ============================================================================

pub fn format_discover_output(discovery: &Discovery, gallery: &Gallery) -> Vec<String> {
    let mut lines = vec![format!(
        "Folders ({})",
        source_label(discovery.source, discovery.max_folder_id)
    )];

    for item in gallery.items() {
        let id = format_index(item.folder_id.get() as usize);
        match &item.image {
            Some(image) => lines.push(format!(
                "{id} {} ({}x{})",
                image.path, image.dimensions.width, image.dimensions.height
            )),
            None => lines.push(format!("{id} (placeholder)")),
        }
    }

    lines.push(String::new());
    lines.push(format!("Found {}", plural(gallery.len(), "folder", "folders")));
    lines
}

pub fn print_discover_output(discovery: &Discovery, gallery: &Gallery) {
    for line in format_discover_output(discovery, gallery) {
        println!("{line}");
    }
}

// ============================================================================
// Piece
// ============================================================================

pub fn format_piece_output(view: &ModalView<'_>, images: &[ImageDescriptor]) -> Vec<String> {
    let record = view.record;
    let mut lines = Vec::new();

    if record.title.is_empty() {
        lines.push(format!("Piece {}", view.folder_id));
    } else {
        lines.push(format!("Piece {}: {}", view.folder_id, record.title));
    }
    for (label, value) in [
        ("Size", &record.size),
        ("Medium", &record.medium),
        ("Year", &record.year),
    ] {
        if !value.is_empty() {
            lines.push(format!("{}{label}: {value}", indent(1)));
        }
    }
    if !record.description.is_empty() {
        let flat = record
            .description
            .lines()
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        lines.push(format!(
            "{}Description: {}",
            indent(1),
            truncate_desc(&flat, 60)
        ));
    }

    lines.push(String::new());
    lines.push("Images".to_string());
    if images.is_empty() {
        lines.push(format!("{}(none)", indent(1)));
    }
    for (i, image) in images.iter().enumerate() {
        let marker = if i == view.index { "  > " } else { "    " };
        let main = if image.is_main { " (main)" } else { "" };
        lines.push(format!("{marker}{} {}{main}", format_index(i + 1), image.path));
    }

    lines.push(String::new());
    if view.count > 0 {
        let arrows = match (view.left_arrow, view.right_arrow) {
            (true, true) => "  [< >]",
            (true, false) => "  [<]",
            (false, true) => "  [>]",
            (false, false) => "",
        };
        lines.push(format!("Image {} of {}{arrows}", view.index + 1, view.count));
    }
    let layout = view.layout;
    lines.push(format!(
        "Layout: {} image, {} x {}, {}",
        layout.image_max_width,
        layout.supplement_columns,
        layout.supplement_height,
        layout.modal_max_height
    ));
    lines
}

pub fn print_piece_output(view: &ModalView<'_>, images: &[ImageDescriptor]) {
    for line in format_piece_output(view, images) {
        println!("{line}");
    }
}

// ============================================================================
// Manifest
// ============================================================================

pub fn format_manifest_output(manifest: &ContentManifest, path: &str) -> Vec<String> {
    let ids: Vec<String> = manifest.folders.iter().map(|id| id.to_string()).collect();
    vec![
        format!(
            "Wrote {path} ({})",
            plural(manifest.folders.len(), "folder", "folders")
        ),
        format!("{}{}", indent(1), ids.join(", ")),
    ]
}

pub fn print_manifest_output(manifest: &ContentManifest, path: &str) {
    for line in format_manifest_output(manifest, path) {
        println!("{line}");
    }
}

// ============================================================================
// Build
// ============================================================================

pub fn format_build_output(report: &BuildReport) -> Vec<String> {
    let source = match report.discovery_source {
        DiscoverySource::Manifest => "from manifest",
        DiscoverySource::Probe => "probed",
    };
    vec![
        format!(
            "Gallery: {} ({}), folders {source}",
            plural(report.tiles, "tile", "tiles"),
            plural(report.placeholders, "placeholder", "placeholders")
        ),
        format!(
            "Pieces: {} ({})",
            report.pieces,
            plural(report.piece_pages, "page", "pages")
        ),
        format!("Projects: {}", plural(report.project_pages, "page", "pages")),
        format!(
            "Home: {}",
            plural(report.home_images, "background image", "background images")
        ),
        format!("Copied {}", plural(report.copied_files, "file", "files")),
    ]
}

pub fn print_build_output(report: &BuildReport) {
    for line in format_build_output(report) {
        println!("{line}");
    }
}
