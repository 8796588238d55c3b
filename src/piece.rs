//! Piece metadata from `piece-data.txt`.
//!
//! Each piece folder may carry a small flat file describing the work:
//!
//! ```text
//! title: Untitled Study
//! size: 24x36in
//! medium: Oil on linen
//! year: 2023
//! description: First line.
//!
//! Second paragraph.
//! ```
//!
//! ## Rules
//!
//! - Lines are trimmed, then matched against five case-sensitive prefixes:
//!   `title:`, `size:`, `medium:`, `year:`, `description:`.
//! - Scalar fields may appear in any order; the last occurrence wins.
//! - `description:` starts a multi-line block. Every following line that is
//!   not itself a key is appended, and blank lines are kept as paragraph
//!   breaks. A scalar key ends the block; another `description:` restarts it.
//! - Leading and trailing blank lines of the description are dropped.
//! - Anything else is ignored.
//!
//! The format cannot escape a description line that happens to begin with a
//! key prefix; such a line is read as that key.
//!
//! Reading never fails from the caller's point of view: a missing or unreadable
//! file yields an all-blank [`PieceRecord`].

use crate::naming;
use crate::probe::ContentSource;
use crate::types::FolderId;
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Text metadata for one piece. Empty strings mean "not provided".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PieceRecord {
    pub title: String,
    pub size: String,
    pub medium: String,
    pub year: String,
    pub description: String,
}

impl PieceRecord {
    /// Non-empty detail lines in display order: size, medium, year.
    pub fn details(&self) -> Vec<&str> {
        [&self.size, &self.medium, &self.year]
            .into_iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect()
    }

    pub fn is_blank(&self) -> bool {
        self.title.is_empty()
            && self.size.is_empty()
            && self.medium.is_empty()
            && self.year.is_empty()
            && self.description.is_empty()
    }

    /// Short content hash, used as a cache-busting token in rendered pages.
    pub fn version(&self) -> String {
        let mut hasher = Sha256::new();
        for field in [
            &self.title,
            &self.size,
            &self.medium,
            &self.year,
            &self.description,
        ] {
            hasher.update(field.as_bytes());
            hasher.update([0u8]);
        }
        let digest = hasher.finalize();
        digest[..4].iter().map(|b| format!("{b:02x}")).collect()
    }
}

#[derive(Clone, Copy)]
enum Field {
    Title,
    Size,
    Medium,
    Year,
    Description,
}

const KEYS: &[(&str, Field)] = &[
    ("title:", Field::Title),
    ("size:", Field::Size),
    ("medium:", Field::Medium),
    ("year:", Field::Year),
    ("description:", Field::Description),
];

fn recognize(line: &str) -> Option<(Field, &str)> {
    KEYS.iter().find_map(|(prefix, field)| {
        line.strip_prefix(prefix)
            .map(|value| (*field, value.trim()))
    })
}

fn scalar_slot(record: &mut PieceRecord, field: Field) -> Option<&mut String> {
    match field {
        Field::Title => Some(&mut record.title),
        Field::Size => Some(&mut record.size),
        Field::Medium => Some(&mut record.medium),
        Field::Year => Some(&mut record.year),
        Field::Description => None,
    }
}

/// Parse the contents of a `piece-data.txt` file.
pub fn parse_piece_data(text: &str) -> PieceRecord {
    let mut record = PieceRecord::default();
    let mut description: Option<Vec<&str>> = None;
    let mut in_description = false;

    for line in text.lines() {
        let trimmed = line.trim();
        match recognize(trimmed) {
            Some((Field::Description, value)) => {
                description = Some(vec![value]);
                in_description = true;
            }
            Some((field, value)) => {
                if let Some(slot) = scalar_slot(&mut record, field) {
                    *slot = value.to_string();
                }
                in_description = false;
            }
            None if in_description => {
                if let Some(lines) = description.as_mut() {
                    lines.push(trimmed);
                }
            }
            None => {}
        }
    }

    if let Some(lines) = description {
        // An empty `description:` line does not leave a leading break before the body.
        let start = lines.iter().position(|l| !l.is_empty());
        let end = lines.iter().rposition(|l| !l.is_empty());
        if let (Some(start), Some(end)) = (start, end) {
            record.description = lines[start..=end].join("\n");
        }
    }

    record
}

/// Read and parse a piece's metadata, degrading to a blank record.
pub fn load_piece_data<S: ContentSource + ?Sized>(source: &S, id: FolderId) -> PieceRecord {
    let path = naming::piece_data_path(id);
    match source.read_text(&path) {
        Ok(text) => parse_piece_data(&text),
        Err(e) if e.is_not_found() => {
            log::debug!("no piece data for folder {id}");
            PieceRecord::default()
        }
        Err(e) => {
            log::warn!("error loading piece data for folder {id}: {e}");
            PieceRecord::default()
        }
    }
}
