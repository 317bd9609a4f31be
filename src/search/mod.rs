//! Query matching shared by the hymn list filter and the lyric highlighter.

mod filter;
mod folding;
mod highlight;

pub use filter::filter_hymns;
pub use folding::{FoldingTable, Matcher};
pub use highlight::{
    render_highlighted, split_matches, Deadline, MatchCursor, MatchLocation, Segment, EMPHASIS_WINDOW,
};
