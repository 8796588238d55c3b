//! Static site rendering.
//!
//! Runs the whole pipeline against a content root and writes a browsable
//! site: discovery, gallery build, piece assembly, and HTML output.
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html                 # Intro overlay + gallery grid
//! ├── piece/
//! │   └── 7/
//! │       ├── 1.html             # Modal open at image 1
//! │       └── 2.html             # ...one page per image
//! ├── archive-project/
//! │   └── index.html             # Project page
//! ├── i-think-narcissus-fell-in/
//! │   └── index.html
//! └── images/                    # Copied from the content root
//! ```
//!
//! Every piece page is one `Open(index)` state of the [`ModalController`],
//! rendered by stepping the controller with `next()` until the right arrow
//! disappears. The modal root carries the state a script would need:
//! `data-folder-id`, `data-current-index`, `data-all-images` (JSON), and
//! `data-piece-version`.
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! All piece metadata is user-authored text and goes through maud's escaping.

use crate::config::SiteConfig;
use crate::discover::{self, DiscoverySource};
use crate::gallery::{self, Gallery, GalleryItem, ProjectImage};
use crate::modal::{AssembledPiece, ModalController, ModalError, ModalView};
use crate::naming::{self, ARCHIVE_PROJECT, NARCISSUS_PROJECT};
use crate::overlay::OVERLAY_HIDDEN_KEY;
use crate::probe::ContentSource;
use crate::types::ImageDescriptor;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Path outside content root: {0}")]
    Prefix(#[from] std::path::StripPrefixError),
    #[error("Modal error: {0}")]
    Modal(#[from] ModalError),
    #[error("Output directory {0} would overwrite the content it is built from")]
    OutputOverlapsContent(PathBuf),
}

const CSS: &str = include_str!("../static/style.css");
const JS: &str = include_str!("../static/gallery.js");

const PROJECTS: &[(&str, &str)] = &[
    (ARCHIVE_PROJECT, "Archive Project"),
    (NARCISSUS_PROJECT, "I Think Narcissus Fell In"),
];

/// Summary of a finished build.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub discovery_source: DiscoverySource,
    pub tiles: usize,
    pub placeholders: usize,
    pub pieces: usize,
    pub piece_pages: usize,
    pub home_images: usize,
    pub project_pages: usize,
    pub copied_files: usize,
}

/// Render the full site for the content at `content_root` into `output_dir`.
///
/// `seed` picks the home background images.
pub fn build_site<S: ContentSource + ?Sized>(
    source: &S,
    content_root: &Path,
    output_dir: &Path,
    config: &SiteConfig,
    seed: u64,
) -> Result<BuildReport, RenderError> {
    check_output_dir(content_root, output_dir)?;
    fs::create_dir_all(output_dir)?;

    let discovery = discover::discover(source, &config.probe);
    let gallery = gallery::build_gallery(source, &discovery.folders, &config.probe, &config.gallery);

    let candidates = discover::home_background_candidates(source, &config.home, &config.probe);
    let home_images = discover::select_home_images(&candidates, config.home.slots, seed);
    log::info!(
        "{} home background candidates, showing {}",
        candidates.len(),
        home_images.len()
    );

    let projects: Vec<(&str, &str, Vec<ProjectImage>)> = PROJECTS
        .iter()
        .filter_map(|&(project, title)| {
            let count = match project {
                ARCHIVE_PROJECT => config.home.archive_project,
                _ => config.home.narcissus,
            };
            let images = gallery::load_project_images(source, project, count, &config.probe);
            if images.iter().all(|slot| slot.image.is_none()) {
                log::debug!("no images for project {project}, skipping page");
                return None;
            }
            Some((project, title, images))
        })
        .collect();
    let project_links: Vec<(&str, &str)> = projects
        .iter()
        .map(|(project, title, _)| (*project, *title))
        .collect();

    let copied_files = copy_images(content_root, output_dir)?;

    let index = render_index(
        &config.site.title,
        &gallery,
        &home_images,
        &project_links,
        config,
    );
    fs::write(output_dir.join("index.html"), index.into_string())?;

    let mut piece_pages = 0;
    let mut modal = ModalController::new(&gallery);
    for id in gallery.folder_ids() {
        modal.open_with(&id.to_string(), source, &config.probe)?;
        let dir = output_dir.join("piece").join(id.to_string());
        fs::create_dir_all(&dir)?;

        loop {
            let Some(piece) = modal.cached_piece() else {
                break;
            };
            let Some(view) = modal.view() else {
                break;
            };
            let page = render_piece_page(&config.site.title, piece, &view)?;
            fs::write(dir.join(format!("{}.html", view.index + 1)), page.into_string())?;
            piece_pages += 1;
            if !view.right_arrow {
                break;
            }
            modal.next();
        }
        modal.close();
    }

    for (project, title, images) in &projects {
        let dir = output_dir.join(project);
        fs::create_dir_all(&dir)?;
        let page = render_project_page(&config.site.title, title, images);
        fs::write(dir.join("index.html"), page.into_string())?;
    }

    let report = BuildReport {
        discovery_source: discovery.source,
        tiles: gallery.len(),
        placeholders: gallery.items().iter().filter(|i| i.is_placeholder()).count(),
        pieces: gallery.len(),
        piece_pages,
        home_images: home_images.len(),
        project_pages: projects.len(),
        copied_files,
    };
    log::info!("site written to {}", output_dir.display());
    Ok(report)
}

/// Refuse an output directory that is the content root or lies inside `images/`.
///
/// Copying into either would write each image over itself.
fn check_output_dir(content_root: &Path, output_dir: &Path) -> Result<(), RenderError> {
    let root = content_root.canonicalize()?;
    let out = canonical_target(output_dir)?;
    if out == root || out.starts_with(root.join(naming::IMAGES_DIR)) {
        return Err(RenderError::OutputOverlapsContent(output_dir.to_path_buf()));
    }
    Ok(())
}

/// Canonicalize the deepest existing ancestor of `path` and re-append the rest.
fn canonical_target(path: &Path) -> std::io::Result<PathBuf> {
    let mut base = path;
    let mut missing = Vec::new();
    while !base.exists() {
        let (Some(parent), Some(name)) = (base.parent(), base.file_name()) else {
            break;
        };
        missing.push(name);
        base = if parent.as_os_str().is_empty() {
            Path::new(".")
        } else {
            parent
        };
    }
    let mut resolved = base.canonicalize()?;
    resolved.extend(missing.iter().rev());
    Ok(resolved)
}

/// Copy `images/` into the output, skipping the manifest.
fn copy_images(content_root: &Path, output_dir: &Path) -> Result<usize, RenderError> {
    let src = content_root.join(naming::IMAGES_DIR);
    if !src.is_dir() {
        return Ok(0);
    }

    let mut copied = 0;
    for entry in WalkDir::new(&src) {
        let entry = entry?;
        let rel = entry.path().strip_prefix(content_root)?;
        let dst = output_dir.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&dst)?;
        } else if entry.file_name() != naming::MANIFEST_FILE {
            fs::copy(entry.path(), &dst)?;
            copied += 1;
        }
    }
    log::debug!("copied {copied} files from {}", src.display());
    Ok(copied)
}

// ============================================================================
// HTML Components
// ============================================================================

fn base_document(title: &str, body_class: Option<&str>, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(CSS)) }
            }
            body class=[body_class] {
                (content)
                script { (PreEscaped(JS)) }
            }
        }
    }
}

fn tile_style(item: &GalleryItem) -> Option<String> {
    item.size
        .map(|s| format!("width: {:.2}px; height: {:.2}px;", s.width, s.height))
}

fn render_tile(item: &GalleryItem) -> Markup {
    let id = item.folder_id.get();
    html! {
        a.gallery-item.clickable-notable-image href={ "piece/" (id) "/1.html" } data-folder-id=(id) {
            @if let Some(image) = &item.image {
                img src=(image.path) alt={ "Piece " (id) } loading="lazy" style=[tile_style(item)];
            } @else {
                div.gallery-image-placeholder { "Image " (id) }
            }
        }
    }
}

// ============================================================================
// Page Renderers
// ============================================================================

/// Renders the home page: intro overlay over the gallery grid.
///
/// `projects` lists only the project pages that were written.
fn render_index(
    title: &str,
    gallery: &Gallery,
    home_images: &[String],
    projects: &[(&str, &str)],
    config: &SiteConfig,
) -> Markup {
    let content = html! {
        div.home-overlay id="home-overlay"
            data-fade-ms=(config.overlay.fade_ms)
            data-session-key=(OVERLAY_HIDDEN_KEY) {
            div id="circular-gallery" {
                @for path in home_images {
                    div.gallery-image-item {
                        img src=(path) alt="";
                    }
                }
            }
            h1.site-title { (title) }
            button.reveal-gallery id="reveal-gallery" type="button" { "Enter" }
        }
        main {
            nav.project-links {
                a id="show-home" href="#" { "Home" }
                @for &(project, project_title) in projects {
                    a href={ (project) "/index.html" } { (project_title) }
                }
            }
            section.notable-work-gallery id="notable-work-gallery" {
                @for row in gallery.rows(config.gallery.items_per_row) {
                    div.gallery-row {
                        @for item in row {
                            (render_tile(item))
                        }
                    }
                }
            }
        }
    };

    base_document(title, Some("overlay-active"), content)
}

/// Renders one state of the piece modal as a standalone page.
fn render_piece_page(
    site_title: &str,
    piece: &AssembledPiece,
    view: &ModalView<'_>,
) -> Result<Markup, RenderError> {
    const ROOT: &str = "../../";

    let all_images = serde_json::to_string(&piece.images)?;
    let record = view.record;
    let layout = view.layout;
    // Positions in `piece.images`; extras start at 0 when there is no main image.
    let extras: Vec<(usize, &ImageDescriptor)> = piece
        .images
        .iter()
        .enumerate()
        .filter(|(_, img)| !img.is_main)
        .collect();

    let prev_url = view.left_arrow.then(|| format!("{}.html", view.index));
    let next_url = view.right_arrow.then(|| format!("{}.html", view.index + 2));
    let close_url = format!("{ROOT}index.html");

    let page_title = if record.title.is_empty() {
        format!("{site_title} - {}", view.folder_id)
    } else {
        format!("{site_title} - {}", record.title)
    };

    let modal_style = if extras.is_empty() {
        None
    } else {
        Some(format!("max-height: {}; overflow-y: auto;", layout.modal_max_height))
    };
    let image_style = format!("max-width: {};", layout.image_max_width);
    let grid_style = format!("grid-template-columns: {};", layout.supplement_columns);
    let extra_style = format!("height: {};", layout.supplement_height);
    let main_alt = match view.image {
        Some(image) if image.is_main => "Main image".to_string(),
        _ => format!("Extra image {}", view.index),
    };

    let content = html! {
        div.piece-modal id="piece-modal"
            style=[modal_style]
            data-folder-id=(view.folder_id.get())
            data-current-index=(view.index)
            data-all-images=(all_images)
            data-piece-version=(record.version())
            data-prev=[prev_url.as_deref()]
            data-next=[next_url.as_deref()]
            data-close=(close_url) {
            a.modal-close href=(close_url) aria-label="Close" { "×" }
            div.modal-image-column {
                div id="modal-main-image" style=(image_style) {
                    @if let Some(image) = view.image {
                        img src={ (ROOT) (image.path) } alt=(main_alt);
                    } @else {
                        div.modal-image-placeholder { span { "Main Image" } }
                    }
                }
                @if view.has_arrows() {
                    @if let Some(url) = &prev_url {
                        a.modal-nav-arrow.modal-nav-arrow-left href=(url) aria-label="Previous" { ">" }
                    }
                    @if let Some(url) = &next_url {
                        a.modal-nav-arrow.modal-nav-arrow-right href=(url) aria-label="Next" { ">" }
                    }
                }
            }
            div.modal-text-column {
                h2 id="modal-title-text" { (record.title) }
                div.modal-details {
                    @for detail in record.details() {
                        p { (detail) }
                    }
                }
                @if !record.description.is_empty() {
                    div id="modal-description" {
                        @for (i, line) in record.description.lines().enumerate() {
                            @if i > 0 { br; }
                            (line)
                        }
                    }
                }
            }
            @if !extras.is_empty() {
                div.modal-supplement-images id="modal-supplement-images" style=(grid_style) {
                    @for (n, (pos, extra)) in extras.iter().enumerate() {
                        a href={ (pos + 1) ".html" } {
                            img src={ (ROOT) (extra.path) } alt={ "Extra image " (n + 1) } style=(extra_style) loading="lazy";
                        }
                    }
                }
            }
        }
    };

    Ok(base_document(&page_title, Some("modal-open"), content))
}

/// Renders a project page with one slot per numbered image.
fn render_project_page(site_title: &str, title: &str, images: &[ProjectImage]) -> Markup {
    let content = html! {
        header.project-links {
            a href="../index.html" { (site_title) }
            " › "
            (title)
        }
        main.project-page {
            @for slot in images {
                div.project-image data-project-image=(slot.number) {
                    @if let Some(image) = &slot.image {
                        img src={ "../" (image.path) } alt={ (title) " " (slot.number) } loading="lazy";
                    } @else {
                        div.project-image-placeholder { "Image " (slot.number) }
                    }
                }
            }
        }
    };

    base_document(title, None, content)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GalleryConfig, ProbeConfig};
    use crate::gallery::build_gallery;
    use crate::modal::{assemble_piece, view_of};
    use crate::probe::FsSource;
    use crate::test_helpers::{MockSource, fid, write_image, write_text};
    use tempfile::TempDir;

    fn piece_source() -> MockSource {
        MockSource::new()
            .with_image("images/notable-work/4/1.jpg", 300, 200)
            .with_image("images/notable-work/4/2.jpg", 100, 100)
            .with_image("images/notable-work/4/3.png", 100, 100)
            .with_text(
                "images/notable-work/4/piece-data.txt",
                "title: Harbour\nsize: 24x36in\ndescription: First.\n\nSecond.",
            )
    }

    fn render(piece: &AssembledPiece, index: usize) -> String {
        let view = view_of(piece, index);
        render_piece_page("Notable Work", piece, &view)
            .unwrap()
            .into_string()
    }

    #[test]
    fn piece_page_carries_modal_state() {
        let piece = assemble_piece(&piece_source(), fid(4), &ProbeConfig::default());
        let html = render(&piece, 1);

        assert!(html.contains(r#"data-folder-id="4""#));
        assert!(html.contains(r#"data-current-index="1""#));
        assert!(html.contains("data-all-images="));
        assert!(html.contains("&quot;isMain&quot;:true"));
        assert!(html.contains(&format!(r#"data-piece-version="{}""#, piece.record.version())));
    }

    #[test]
    fn piece_page_arrows_follow_position() {
        let piece = assemble_piece(&piece_source(), fid(4), &ProbeConfig::default());

        let first = render(&piece, 0);
        assert!(!first.contains(r#"class="modal-nav-arrow modal-nav-arrow-left""#));
        assert!(first.contains(r#"href="2.html" aria-label="Next""#));

        let last = render(&piece, 2);
        assert!(last.contains(r#"href="2.html" aria-label="Previous""#));
        assert!(!last.contains(r#"class="modal-nav-arrow modal-nav-arrow-right""#));
    }

    #[test]
    fn piece_page_text_and_layout() {
        let piece = assemble_piece(&piece_source(), fid(4), &ProbeConfig::default());
        let html = render(&piece, 0);

        assert!(html.contains("Harbour"));
        assert!(html.contains("<p>24x36in</p>"));
        assert!(html.contains("First.<br><br>Second."));
        assert!(html.contains("max-width: 85.7%;"));
        assert!(html.contains("grid-template-columns: repeat(2, minmax(140px, 1fr));"));
        assert!(html.contains("max-height: 90vh;"));
        assert!(html.contains("../../images/notable-work/4/3.png"));
    }

    #[test]
    fn piece_page_without_images_shows_placeholder() {
        let piece = assemble_piece(&MockSource::new(), fid(8), &ProbeConfig::default());
        let html = render(&piece, 0);

        assert!(html.contains(r#"<div class="modal-image-placeholder">"#));
        assert!(!html.contains(r#"<a class="modal-nav-arrow"#));
        assert!(!html.contains(r#"id="modal-description""#));
        assert!(!html.contains(r#"id="modal-supplement-images""#));
    }

    #[test]
    fn extras_link_to_their_own_page_without_main_image() {
        let source = MockSource::new()
            .with_image("images/notable-work/6/2.jpg", 10, 10)
            .with_image("images/notable-work/6/3.jpg", 10, 10);
        let piece = assemble_piece(&source, fid(6), &ProbeConfig::default());
        assert!(piece.main().is_none());
        assert_eq!(piece.images.len(), 2);

        let html = render(&piece, 0);

        assert!(html.contains(r#"<a href="1.html"><img src="../../images/notable-work/6/2.jpg""#));
        assert!(html.contains(r#"<a href="2.html"><img src="../../images/notable-work/6/3.jpg""#));
        assert!(!html.contains(r#"href="3.html""#));
    }

    #[test]
    fn extras_link_past_main_image() {
        let piece = assemble_piece(&piece_source(), fid(4), &ProbeConfig::default());
        let html = render(&piece, 0);

        assert!(html.contains(r#"<a href="2.html"><img src="../../images/notable-work/4/2.jpg""#));
        assert!(html.contains(r#"<a href="3.html"><img src="../../images/notable-work/4/3.png""#));
    }

    #[test]
    fn piece_metadata_is_escaped() {
        let source = MockSource::new()
            .with_image("images/notable-work/1/1.jpg", 10, 10)
            .with_text(
                "images/notable-work/1/piece-data.txt",
                "title: <script>alert('xss')</script>",
            );
        let piece = assemble_piece(&source, fid(1), &ProbeConfig::default());
        let html = render(&piece, 0);

        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn index_tiles_carry_folder_id_and_regulated_size() {
        let source = MockSource::new()
            .with_image("images/notable-work/2/1.jpg", 200, 100)
            .with_image("images/notable-work/1/1.jpg", 100, 100);
        let gallery = build_gallery(
            &source,
            &[fid(2), fid(1), fid(5)],
            &ProbeConfig::default(),
            &GalleryConfig::default(),
        );

        let html = render_index("Notable Work", &gallery, &[], &[], &SiteConfig::default())
            .into_string();

        let first = html.find(r#"data-folder-id="2""#).unwrap();
        let second = html.find(r#"data-folder-id="1""#).unwrap();
        assert!(first < second);
        assert!(html.contains("width: 450.00px; height: 225.00px;"));
        assert!(html.contains("Image 5"));
        assert!(html.contains(r#"data-session-key="overlay-hidden""#));
        assert!(html.contains(r#"data-fade-ms="600""#));
    }

    #[test]
    fn build_site_writes_pages_and_copies_images() {
        let content = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write_image(content.path(), "images/notable-work/1/1.jpg", 40, 30);
        write_image(content.path(), "images/notable-work/3/1.png", 30, 40);
        write_image(content.path(), "images/notable-work/3/2.jpg", 30, 30);
        write_text(
            content.path(),
            "images/notable-work/3/piece-data.txt",
            "title: Tide\nyear: 2024",
        );
        write_image(content.path(), "images/archive-project/1/1.jpg", 20, 20);

        let mut config = SiteConfig::default();
        config.probe.max_folder_id = 5;
        let source = FsSource::new(content.path());

        let report = build_site(&source, content.path(), out.path(), &config, 1).unwrap();

        assert_eq!(report.tiles, 2);
        assert_eq!(report.placeholders, 0);
        assert_eq!(report.piece_pages, 3);
        assert_eq!(report.project_pages, 1);
        assert!(report.home_images >= 2);
        assert!(out.path().join("index.html").exists());
        assert!(out.path().join("piece/3/1.html").exists());
        assert!(out.path().join("piece/3/2.html").exists());
        assert!(!out.path().join("piece/3/3.html").exists());
        assert!(out.path().join("piece/1/1.html").exists());
        assert!(out.path().join("archive-project/index.html").exists());
        assert!(!out.path().join("i-think-narcissus-fell-in").exists());
        assert!(out.path().join("images/notable-work/3/piece-data.txt").exists());

        let index = fs::read_to_string(out.path().join("index.html")).unwrap();
        assert!(index.contains(r#"href="archive-project/index.html""#));
        assert!(!index.contains("i-think-narcissus-fell-in/"));

        let piece = fs::read_to_string(out.path().join("piece/3/2.html")).unwrap();
        assert!(piece.contains("Tide"));
        assert!(piece.contains(r#"data-current-index="1""#));
    }

    #[test]
    fn index_has_no_project_links_without_project_images() {
        let content = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write_image(content.path(), "images/notable-work/1/1.jpg", 4, 4);
        let mut config = SiteConfig::default();
        config.probe.max_folder_id = 3;

        let report =
            build_site(&FsSource::new(content.path()), content.path(), out.path(), &config, 0)
                .unwrap();

        assert_eq!(report.project_pages, 0);
        let index = fs::read_to_string(out.path().join("index.html")).unwrap();
        assert!(!index.contains("archive-project/"));
        assert!(!index.contains("i-think-narcissus-fell-in/"));
    }

    #[test]
    fn output_over_content_is_rejected() {
        let content = TempDir::new().unwrap();
        write_image(content.path(), "images/notable-work/1/1.jpg", 4, 4);
        let before = fs::read(content.path().join("images/notable-work/1/1.jpg")).unwrap();
        let mut config = SiteConfig::default();
        config.probe.max_folder_id = 3;
        let source = FsSource::new(content.path());

        for out in [content.path().to_path_buf(), content.path().join("images/site")] {
            let result = build_site(&source, content.path(), &out, &config, 0);
            assert!(
                matches!(result, Err(RenderError::OutputOverlapsContent(_))),
                "accepted {}",
                out.display()
            );
        }

        let after = fs::read(content.path().join("images/notable-work/1/1.jpg")).unwrap();
        assert_eq!(before, after);
        assert!(!content.path().join("index.html").exists());
        assert!(!content.path().join("images/site").exists());
    }

    #[test]
    fn output_beside_images_is_allowed() {
        let content = TempDir::new().unwrap();
        write_image(content.path(), "images/notable-work/1/1.jpg", 4, 4);
        let mut config = SiteConfig::default();
        config.probe.max_folder_id = 3;
        let out = content.path().join("dist");

        let report =
            build_site(&FsSource::new(content.path()), content.path(), &out, &config, 0).unwrap();

        assert_eq!(report.copied_files, 1);
        assert!(out.join("images/notable-work/1/1.jpg").is_file());
    }

    #[test]
    fn manifest_is_not_copied() {
        let content = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write_image(content.path(), "images/notable-work/1/1.jpg", 4, 4);
        write_text(
            content.path(),
            "images/notable-work/manifest.json",
            r#"{"version": 1, "folders": [1]}"#,
        );

        let report = build_site(
            &FsSource::new(content.path()),
            content.path(),
            out.path(),
            &SiteConfig::default(),
            0,
        )
        .unwrap();

        assert_eq!(report.discovery_source, DiscoverySource::Manifest);
        assert_eq!(report.copied_files, 1);
        assert!(!out.path().join("images/notable-work/manifest.json").exists());
    }
}
