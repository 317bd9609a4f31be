//! Static content the reader displays: hymns, roster, videos and the photo
//! count. Loaded once at startup and never mutated afterwards.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::models::{ChoirMember, ChoirVideo, Hymn, RecordId};

/// Catalog shipped inside the binary, used when no `--data` path is given.
const EMBEDDED_CATALOG: &str = include_str!("../data/catalog.json");

/// Message shown in the status bar when the catalog could not be loaded.
pub const LOAD_ERROR_MESSAGE: &str = "تعذر تحميل الترانيم. يرجى المحاولة لاحقاً.";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("catalog is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate {kind} id {id}")]
    DuplicateId { kind: &'static str, id: RecordId },
    #[error("catalog contains no hymns")]
    Empty,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatalogDocument {
    hymns: Vec<Hymn>,
    #[serde(default)]
    members: Vec<ChoirMember>,
    #[serde(default)]
    videos: Vec<ChoirVideo>,
    #[serde(default)]
    photo_count: usize,
}

/// Read-only store of everything the navigator can point at.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    hymns: Vec<Hymn>,
    members: Vec<ChoirMember>,
    videos: Vec<ChoirVideo>,
    photo_count: usize,
}

impl Catalog {
    pub fn new(
        hymns: Vec<Hymn>,
        members: Vec<ChoirMember>,
        videos: Vec<ChoirVideo>,
        photo_count: usize,
    ) -> Result<Self, CatalogError> {
        if hymns.is_empty() {
            return Err(CatalogError::Empty);
        }
        ensure_unique("hymn", hymns.iter().map(|h| &h.id))?;
        ensure_unique("member", members.iter().map(|m| &m.id))?;
        ensure_unique("video", videos.iter().map(|v| &v.id))?;

        Ok(Self {
            hymns,
            members,
            videos,
            photo_count,
        })
    }

    /// Parse a catalog document. A bare JSON array is read as a hymn list.
    pub fn from_json(text: &str) -> Result<Self, CatalogError> {
        let value: Value = serde_json::from_str(text)?;
        let document = if value.is_array() {
            CatalogDocument {
                hymns: serde_json::from_value(value)?,
                members: Vec::new(),
                videos: Vec::new(),
                photo_count: 0,
            }
        } else {
            serde_json::from_value(value)?
        };

        Self::new(
            document.hymns,
            document.members,
            document.videos,
            document.photo_count,
        )
    }

    /// The catalog compiled into the binary.
    pub fn embedded() -> Result<Self, CatalogError> {
        Self::from_json(EMBEDDED_CATALOG)
    }

    /// Minimal record set shown when nothing else could be loaded.
    pub fn fallback() -> Self {
        let welcome = Hymn::new(
            0,
            "مرحباً بكم - Welcome",
            "أهلاً بكم في تطبيق الملاك الصغير\n\
             Welcome to Little Angel App\n\
             \n\
             إذا كنت ترى هذه الرسالة،\n\
             If you see this message,\n\
             فقد تعذر تحميل ملف الترانيم\n\
             the hymns file could not be loaded.",
        );
        Self {
            hymns: vec![welcome],
            members: Vec::new(),
            videos: Vec::new(),
            photo_count: 0,
        }
    }

    /// Replace the gallery size, e.g. from a command-line override.
    pub fn with_photo_count(mut self, photo_count: usize) -> Self {
        self.photo_count = photo_count;
        self
    }

    pub fn hymns(&self) -> &[Hymn] {
        &self.hymns
    }

    pub fn members(&self) -> &[ChoirMember] {
        &self.members
    }

    pub fn videos(&self) -> &[ChoirVideo] {
        &self.videos
    }

    pub fn photo_count(&self) -> usize {
        self.photo_count
    }

    pub fn hymn(&self, id: &RecordId) -> Option<&Hymn> {
        self.hymns.iter().find(|hymn| hymn.id == *id)
    }

    pub fn video(&self, id: &RecordId) -> Option<&ChoirVideo> {
        self.videos.iter().find(|video| video.id == *id)
    }

    /// Photos are addressed by their 1-based gallery index.
    pub fn has_photo(&self, index: usize) -> bool {
        (1..=self.photo_count).contains(&index)
    }

    /// Hymn ids in ascending [`RecordId`] order. Sequential paging walks this
    /// list so the order never depends on the active search filter.
    pub fn sorted_hymn_ids(&self) -> Vec<RecordId> {
        sorted_ids(self.hymns.iter().map(|h| &h.id))
    }

    pub fn sorted_video_ids(&self) -> Vec<RecordId> {
        sorted_ids(self.videos.iter().map(|v| &v.id))
    }
}

fn ensure_unique<'a>(
    kind: &'static str,
    ids: impl Iterator<Item = &'a RecordId>,
) -> Result<(), CatalogError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(CatalogError::DuplicateId {
                kind,
                id: id.clone(),
            });
        }
    }
    Ok(())
}

fn sorted_ids<'a>(ids: impl Iterator<Item = &'a RecordId>) -> Vec<RecordId> {
    let mut ids: Vec<RecordId> = ids.cloned().collect();
    ids.sort_unstable();
    ids
}

/// Load the catalog from `path`, or the embedded copy when no path is given.
pub fn load_catalog(path: Option<&Path>) -> Result<Catalog, CatalogError> {
    match path {
        Some(path) => {
            let text = fs::read_to_string(path).map_err(|source| CatalogError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            Catalog::from_json(&text)
        }
        None => Catalog::embedded(),
    }
}

/// Load the catalog, degrading to [`Catalog::fallback`] on failure. The second
/// value carries the user-facing error message when the fallback was used.
pub fn load_or_fallback(path: Option<&Path>) -> (Catalog, Option<String>) {
    match load_catalog(path) {
        Ok(catalog) => {
            info!(
                hymns = catalog.hymns().len(),
                members = catalog.members().len(),
                videos = catalog.videos().len(),
                photos = catalog.photo_count(),
                "catalog loaded"
            );
            (catalog, None)
        }
        Err(err) => {
            warn!(error = %err, "catalog load failed, using fallback");
            (Catalog::fallback(), Some(LOAD_ERROR_MESSAGE.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn ids(raw: &[i64]) -> Vec<RecordId> {
        raw.iter().copied().map(RecordId::from).collect()
    }

    #[test]
    fn embedded_catalog_parses() {
        let catalog = Catalog::embedded().unwrap();
        assert_eq!(catalog.hymns().len(), 5);
        assert_eq!(catalog.photo_count(), 61);
        assert!(catalog.hymn(&4.into()).unwrap().lyrics.contains("<b>"));
        assert_eq!(catalog.sorted_hymn_ids(), ids(&[1, 2, 3, 4, 5]));
    }

    #[test]
    fn bare_array_is_a_hymn_list() {
        let catalog =
            Catalog::from_json(r#"[{"id": 3, "title": "C", "lyrics": "x"}, {"id": 1, "title": "A", "lyrics": "y"}]"#)
                .unwrap();
        assert_eq!(catalog.hymns()[0].id, 3.into());
        assert_eq!(catalog.sorted_hymn_ids(), ids(&[1, 3]));
        assert!(catalog.members().is_empty());
        assert!(!catalog.has_photo(1));
    }

    #[test]
    fn string_ids_load_and_sort_after_numbers() {
        let catalog = Catalog::from_json(
            r#"[{"id": "h2", "title": "B", "lyrics": "y"},
                {"id": "h1", "title": "A", "lyrics": "x"},
                {"id": 9, "title": "C", "lyrics": "z"}]"#,
        )
        .unwrap();
        assert_eq!(
            catalog.sorted_hymn_ids(),
            vec![RecordId::from(9), RecordId::from("h1"), RecordId::from("h2")]
        );
        assert_eq!(catalog.hymn(&"h1".into()).unwrap().title, "A");
        assert!(catalog.hymn(&"9".into()).is_none());
    }

    #[test]
    fn duplicate_string_ids_are_rejected() {
        let err = Catalog::from_json(
            r#"[{"id": "x", "title": "A", "lyrics": ""}, {"id": "x", "title": "B", "lyrics": ""}]"#,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "duplicate hymn id x");
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = Catalog::from_json(
            r#"{"hymns": [{"id": 1, "title": "A", "lyrics": ""}, {"id": 1, "title": "B", "lyrics": ""}]}"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CatalogError::DuplicateId { kind: "hymn", id: RecordId::Int(1) }
        ));
    }

    #[test]
    fn empty_hymn_list_is_rejected() {
        assert!(matches!(
            Catalog::from_json(r#"{"hymns": []}"#),
            Err(CatalogError::Empty)
        ));
    }

    #[test]
    fn missing_file_falls_back_with_message() {
        let dir = tempfile::tempdir().unwrap();
        let (catalog, message) = load_or_fallback(Some(&dir.path().join("missing.json")));
        assert_eq!(catalog.hymns().len(), 1);
        assert_eq!(message.as_deref(), Some(LOAD_ERROR_MESSAGE));
    }

    #[test]
    fn malformed_file_falls_back() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let (catalog, message) = load_or_fallback(Some(file.path()));
        assert_eq!(catalog.hymns()[0].id, 0.into());
        assert!(message.is_some());
    }

    #[test]
    fn photo_indices_are_one_based() {
        let catalog = Catalog::embedded().unwrap();
        assert!(!catalog.has_photo(0));
        assert!(catalog.has_photo(1));
        assert!(catalog.has_photo(61));
        assert!(!catalog.has_photo(62));
    }
}
