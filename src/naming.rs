//! Centralized path conventions for the `images/` tree.
//!
//! There is no directory listing to consult, so every resource is reached by
//! building a candidate path from a numeric ID and probing it:
//!
//! ```text
//! images/
//! ├── notable-work/
//! │   ├── manifest.json            # Optional explicit folder list
//! │   ├── 7/
//! │   │   ├── 1.jpg                # Primary image (any of jpg/jpeg/png)
//! │   │   ├── 2.png                # Extras, 2..=10
//! │   │   └── piece-data.txt       # Title, size, medium, year, description
//! │   └── 3.jpg                    # Legacy flat layout (primary only)
//! ├── archive-project/<n>/1.jpg    # Project pages, same new/legacy split
//! ├── i-think-narcissus-fell-in/<n>/1.jpg
//! └── home/<n>.jpg                 # Home background rotation
//! ```
//!
//! Templates always name `.jpg`; the prober swaps extensions as needed.

use crate::types::FolderId;

pub const IMAGES_DIR: &str = "images";
pub const NOTABLE_WORK_DIR: &str = "images/notable-work";
pub const HOME_DIR: &str = "images/home";
pub const ARCHIVE_PROJECT: &str = "archive-project";
pub const NARCISSUS_PROJECT: &str = "i-think-narcissus-fell-in";
pub const PIECE_DATA_FILE: &str = "piece-data.txt";
pub const MANIFEST_FILE: &str = "manifest.json";

/// Every extension the prober knows how to swap in or strip.
pub const KNOWN_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif"];

/// `images/notable-work/<id>/1.jpg`
pub fn primary_candidate(id: FolderId) -> String {
    image_in_folder(id, 1)
}

/// `images/notable-work/<id>/<n>.jpg`
pub fn image_in_folder(id: FolderId, n: u32) -> String {
    format!("{NOTABLE_WORK_DIR}/{id}/{n}.jpg")
}

/// `images/notable-work/<id>.jpg`
pub fn legacy_candidate(id: FolderId) -> String {
    format!("{NOTABLE_WORK_DIR}/{id}.jpg")
}

/// `images/notable-work/<id>/piece-data.txt`
pub fn piece_data_path(id: FolderId) -> String {
    format!("{NOTABLE_WORK_DIR}/{id}/{PIECE_DATA_FILE}")
}

/// `images/notable-work/manifest.json`
pub fn manifest_path() -> String {
    format!("{NOTABLE_WORK_DIR}/{MANIFEST_FILE}")
}

/// `images/<project>/<n>/1.jpg`
pub fn project_candidate(project: &str, n: u32) -> String {
    format!("{IMAGES_DIR}/{project}/{n}/1.jpg")
}

/// `images/<project>/<n>.jpg`
pub fn project_legacy_candidate(project: &str, n: u32) -> String {
    format!("{IMAGES_DIR}/{project}/{n}.jpg")
}

/// `images/home/<n>.jpg`
pub fn home_candidate(n: u32) -> String {
    format!("{HOME_DIR}/{n}.jpg")
}

/// Split a path into its stem and a recognized image extension.
///
/// - `"a/1.jpg"` → `("a/1", Some("jpg"))`
/// - `"a/1.JPEG"` → `("a/1", Some("jpeg"))` (extension lowercased)
/// - `"a/1.txt"` → `("a/1.txt", None)`
pub fn split_image_extension(path: &str) -> (&str, Option<String>) {
    if let Some(dot) = path.rfind('.') {
        let ext = path[dot + 1..].to_ascii_lowercase();
        let in_file_name = !path[dot..].contains('/');
        if in_file_name && KNOWN_IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            return (&path[..dot], Some(ext));
        }
    }
    (path, None)
}

/// Numeric file stem of an image path: `images/notable-work/4/10.png` → `10`.
pub fn numeric_suffix(path: &str) -> Option<u32> {
    let (stem, _) = split_image_extension(path);
    stem.rsplit('/').next()?.parse().ok()
}

/// Parse a folder ID from raw caller input (`"12"`, `" 12 "`).
///
/// Rejects non-numeric input and zero.
pub fn parse_folder_id(raw: &str) -> Option<FolderId> {
    raw.trim().parse::<u32>().ok().and_then(FolderId::new)
}
