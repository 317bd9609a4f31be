//! Helpers for the externally hosted media: video links and gallery photos.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

/// Shown instead of a thumbnail when no video id can be extracted.
pub const PLACEHOLDER_THUMBNAIL: &str = "logo.webp";

/// YouTube video id embedded in `url`, if it has one of the usual shapes
/// (`watch?v=`, `youtu.be/`, `embed/`, `v/`). Only 11-character ids count.
pub fn youtube_id(url: &str) -> Option<&str> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let re = PATTERN.get_or_init(|| {
        Regex::new(r"^.*(youtu\.be/|v/|u/\w/|embed/|watch\?v=|&v=)([^#&?]*).*").unwrap()
    });

    let id = re.captures(url)?.get(2)?.as_str();
    (id.len() == 11).then_some(id)
}

/// Medium-quality thumbnail for a video link, or the placeholder image.
pub fn thumbnail_url(url: &str) -> String {
    match youtube_id(url) {
        Some(id) => format!("https://img.youtube.com/vi/{id}/mqdefault.jpg"),
        None => PLACEHOLDER_THUMBNAIL.to_string(),
    }
}

/// Embeddable player address for a video link.
pub fn embed_url(url: &str) -> Option<String> {
    youtube_id(url).map(|id| format!("https://www.youtube.com/embed/{id}"))
}

/// File name of gallery photo `index` (1-based).
pub fn photo_file_name(index: usize) -> String {
    format!("choir ({index}).webp")
}

pub fn photo_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(photo_file_name(index))
}

/// Resolved photo path, or `None` when the file is missing so the caller can
/// show a placeholder.
pub fn existing_photo(dir: &Path, index: usize) -> Option<PathBuf> {
    let path = photo_path(dir, index);
    path.is_file().then_some(path)
}
