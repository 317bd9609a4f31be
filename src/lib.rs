//! Core library surface for the choir hymn reader.
//!
//! The binary only wires these pieces together; everything with behavior
//! worth testing (catalog loading, search, navigation, preferences) lives
//! here.
pub mod catalog;
pub mod config;
pub mod media;
pub mod models;
pub mod nav;
pub mod search;
pub mod store;
pub mod ui;

/// Static content and how it is loaded at startup.
pub use catalog::{load_catalog, load_or_fallback, Catalog, CatalogError};

/// Command-line options and the settings derived from them.
pub use config::{AppConfig, Args};

/// The record types every other layer reads.
pub use models::{ChoirMember, ChoirVideo, Hymn, RecordId};

/// View history and the navigator that owns the active view.
pub use nav::{History, HistoryEntry, MemoryHistory, NavPolicy, Navigator, View};

/// Letter-form folding, filtering, and match highlighting.
pub use search::{filter_hymns, render_highlighted, FoldingTable, MatchCursor};

/// Persisted reading preferences.
pub use store::{load_preferences, open_store, Preferences};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
