//! Domain models for the hymn reader. These stay light-weight data holders:
//! the catalog loader fills them once at startup and every other layer only
//! borrows them.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Deserializer};

/// Identifier of a catalog record. Documents use plain numbers or strings
/// (`"error-1"`); both load.
///
/// The derived order puts every numeric id before any string id, numbers
/// ascending and strings lexically, which is the order detail views page in.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(id) => write!(f, "{id}"),
            RecordId::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        RecordId::Int(id)
    }
}

/// Lets bare integer literals name a record.
impl From<i32> for RecordId {
    fn from(id: i32) -> Self {
        RecordId::Int(id.into())
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        RecordId::Text(id.to_string())
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        RecordId::Text(id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
/// A single hymn. The `id` doubles as the stable ordering key for sequential
/// paging in the detail view.
pub struct Hymn {
    pub id: RecordId,
    pub title: String,
    /// Raw lyrics as shipped in the data document. May contain inline style
    /// tags; use [`Hymn::plain_lyrics`] for display and search.
    #[serde(deserialize_with = "lyrics_block")]
    pub lyrics: String,
}

impl Hymn {
    pub fn new(id: impl Into<RecordId>, title: impl Into<String>, lyrics: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            lyrics: lyrics.into(),
        }
    }

    /// Lyrics with inline style tags removed. `<br>` becomes a line break so
    /// documents that encode stanzas with tags still split into lines.
    pub fn plain_lyrics(&self) -> String {
        strip_style_tags(&self.lyrics)
    }

    /// Tag-stripped lyrics split into display lines. Blank lines are kept so
    /// stanza breaks survive.
    pub fn lines(&self) -> Vec<String> {
        self.plain_lyrics().split('\n').map(str::to_string).collect()
    }

    /// First non-blank lyric line, used as a preview in the list view.
    pub fn first_line(&self) -> String {
        self.lines()
            .into_iter()
            .find(|line| !line.trim().is_empty())
            .unwrap_or_default()
    }
}

impl fmt::Display for Hymn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
/// One entry of the choir roster.
pub struct ChoirMember {
    pub id: RecordId,
    pub name: String,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
/// A recorded performance hosted on a third-party video site. The link is kept
/// as raw text; [`crate::media`] extracts what it can from it.
pub struct ChoirVideo {
    pub id: RecordId,
    pub title: String,
    pub link: String,
}

impl fmt::Display for ChoirVideo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// Accept lyrics either as one block of text or as an array of lines.
fn lyrics_block<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Lyrics {
        Block(String),
        Lines(Vec<String>),
    }

    Ok(match Lyrics::deserialize(deserializer)? {
        Lyrics::Block(text) => text,
        Lyrics::Lines(lines) => lines.join("\n"),
    })
}

/// Remove inline markup while keeping the text between tags.
pub fn strip_style_tags(text: &str) -> String {
    static BREAK: OnceLock<Regex> = OnceLock::new();
    static TAG: OnceLock<Regex> = OnceLock::new();

    let break_re = BREAK.get_or_init(|| Regex::new(r"(?i)<br\s*/?>").expect("static pattern"));
    let tag_re = TAG.get_or_init(|| Regex::new(r"</?[a-zA-Z][^<>]*>").expect("static pattern"));

    let with_breaks = break_re.replace_all(text, "\n");
    tag_re.replace_all(&with_breaks, "").into_owned()
}
