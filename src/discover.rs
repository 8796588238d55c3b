//! Folder discovery.
//!
//! Finds which numbered piece folders exist under `images/notable-work/`.
//!
//! ## Sources, in priority order
//!
//! 1. **Manifest**: `images/notable-work/manifest.json` lists folder IDs
//!    explicitly. Written by [`write_manifest`] (the `manifest` CLI command).
//! 2. **Probing**: every ID in `1..=max_folder_id` is probed in parallel for a
//!    primary image (`<id>/1.{jpg,jpeg,png}`). Discovery completes once every
//!    probe has settled.
//!
//! Either way the result is sorted descending, so the highest (newest) folder
//! is shown first.
//!
//! The same probing approach finds candidate images for the home page
//! background rotation ([`home_background_candidates`]).

use crate::config::{HomeConfig, ProbeConfig};
use crate::naming::{self, ARCHIVE_PROJECT, NARCISSUS_PROJECT};
use crate::probe::{self, ContentSource};
use crate::types::FolderId;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::Path;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum DiscoverError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
}

const MANIFEST_VERSION: u32 = 1;

/// Explicit folder listing stored at `images/notable-work/manifest.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentManifest {
    pub version: u32,
    pub folders: Vec<FolderId>,
}

/// How a discovery result was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoverySource {
    Manifest,
    Probe,
}

/// Discovered folder IDs, newest first.
#[derive(Debug, Clone)]
pub struct Discovery {
    pub folders: Vec<FolderId>,
    pub source: DiscoverySource,
    /// Upper bound of the probed range.
    pub max_folder_id: u32,
}

/// Discover folders, preferring the manifest when one is readable.
pub fn discover<S: ContentSource + ?Sized>(source: &S, config: &ProbeConfig) -> Discovery {
    if let Some(manifest) = read_manifest(source) {
        let folders = normalize(manifest.folders, config.max_folder_id);
        log::info!("manifest lists {} folders", folders.len());
        return Discovery {
            folders,
            source: DiscoverySource::Manifest,
            max_folder_id: config.max_folder_id,
        };
    }

    let folders = probe_folders(source, config);
    log::info!(
        "probed 1..={}, found {} folders",
        config.max_folder_id,
        folders.len()
    );
    Discovery {
        folders,
        source: DiscoverySource::Probe,
        max_folder_id: config.max_folder_id,
    }
}

/// Probe IDs `1..=max_folder_id` for a primary image, newest first.
pub fn probe_folders<S: ContentSource + ?Sized>(source: &S, config: &ProbeConfig) -> Vec<FolderId> {
    let mut found: Vec<FolderId> = (1..=config.max_folder_id)
        .into_par_iter()
        .filter_map(FolderId::new)
        .filter(|&id| {
            probe::probe(source, &naming::primary_candidate(id), &config.folder_extensions)
                .is_some()
        })
        .collect();

    found.sort_unstable_by(|a, b| b.cmp(a));
    found
}

fn normalize(folders: Vec<FolderId>, max_folder_id: u32) -> Vec<FolderId> {
    let unique: BTreeSet<FolderId> = folders
        .into_iter()
        .filter(|id| id.get() <= max_folder_id)
        .collect();
    unique.into_iter().rev().collect()
}

fn read_manifest<S: ContentSource + ?Sized>(source: &S) -> Option<ContentManifest> {
    let path = naming::manifest_path();
    let text = match source.read_text(&path) {
        Ok(text) => text,
        Err(e) if e.is_not_found() => return None,
        Err(e) => {
            log::warn!("cannot read {path}: {e}; probing instead");
            return None;
        }
    };
    match serde_json::from_str::<ContentManifest>(&text) {
        Ok(m) if m.version == MANIFEST_VERSION => Some(m),
        Ok(m) => {
            log::warn!(
                "{path} has version {}, expected {MANIFEST_VERSION}; probing instead",
                m.version
            );
            None
        }
        Err(e) => {
            log::warn!("invalid {path}: {e}; probing instead");
            None
        }
    }
}

/// Build the manifest from the filesystem.
///
/// Lists every numeric folder under `images/notable-work/` that holds a
/// `1.jpg`, `1.jpeg`, or `1.png`, newest first.
pub fn build_manifest(root: &Path, config: &ProbeConfig) -> Result<ContentManifest, DiscoverError> {
    let base = root.join(naming::NOTABLE_WORK_DIR);
    let mut folders = BTreeSet::new();

    if base.is_dir() {
        for entry in WalkDir::new(&base).min_depth(2).max_depth(2) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            let Some((stem, ext)) = name.rsplit_once('.') else {
                continue;
            };
            let ext = ext.to_ascii_lowercase();
            if stem != "1" || !config.folder_extensions.contains(&ext) {
                continue;
            }
            let folder_id = entry
                .path()
                .parent()
                .and_then(|p| p.file_name())
                .and_then(|n| naming::parse_folder_id(&n.to_string_lossy()));
            if let Some(id) = folder_id {
                folders.insert(id);
            }
        }
    }

    Ok(ContentManifest {
        version: MANIFEST_VERSION,
        folders: folders.into_iter().rev().collect(),
    })
}

/// Build the manifest and write it into the content tree.
pub fn write_manifest(root: &Path, config: &ProbeConfig) -> Result<ContentManifest, DiscoverError> {
    let manifest = build_manifest(root, config)?;
    let path = root.join(naming::NOTABLE_WORK_DIR);
    fs::create_dir_all(&path)?;
    let json = serde_json::to_string_pretty(&manifest)?;
    fs::write(path.join(naming::MANIFEST_FILE), json)?;
    Ok(manifest)
}

// ============================================================================
// Home background candidates
// ============================================================================

/// Candidate paths for the home background, deduplicated, in source order.
pub fn home_background_patterns(home: &HomeConfig) -> Vec<String> {
    let notable = (1..=home.notable_work)
        .filter_map(FolderId::new)
        .map(naming::primary_candidate);
    let archive = (1..=home.archive_project).map(|i| naming::project_candidate(ARCHIVE_PROJECT, i));
    let narcissus = (1..=home.narcissus).map(|i| naming::project_candidate(NARCISSUS_PROJECT, i));
    let dedicated = (1..=home.home).map(naming::home_candidate);

    let mut seen = HashSet::new();
    notable
        .chain(archive)
        .chain(narcissus)
        .chain(dedicated)
        .filter(|p| seen.insert(p.clone()))
        .collect()
}

/// Probe every background pattern and keep the resolved paths, in pattern order.
pub fn home_background_candidates<S: ContentSource + ?Sized>(
    source: &S,
    home: &HomeConfig,
    probe_config: &ProbeConfig,
) -> Vec<String> {
    home_background_patterns(home)
        .par_iter()
        .filter_map(|pattern| {
            probe::probe(source, pattern, &probe_config.fallback_extensions).map(|r| r.path)
        })
        .collect()
}

/// Pick up to `slots` candidates in a seed-dependent order.
///
/// The order is a sort by `SHA-256(seed, path)`, so a given seed always
/// yields the same selection and changing it rotates the set.
pub fn select_home_images(candidates: &[String], slots: usize, seed: u64) -> Vec<String> {
    let mut keyed: Vec<(Vec<u8>, &String)> = candidates
        .iter()
        .map(|path| {
            let mut hasher = Sha256::new();
            hasher.update(seed.to_le_bytes());
            hasher.update(path.as_bytes());
            (hasher.finalize().to_vec(), path)
        })
        .collect();
    keyed.sort();
    keyed
        .into_iter()
        .take(slots)
        .map(|(_, path)| path.clone())
        .collect()
}
