//! Screen navigation backed by an explicit history stack.

mod history;
mod navigator;

pub use history::{EntityRef, History, HistoryEntry, MemoryHistory, View};
pub use navigator::{NavPolicy, NavigationState, Navigator};
