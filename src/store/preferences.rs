use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::warn;

const THEME_KEY: &str = "theme";
const FONT_SIZE_KEY: &str = "font-size";
const READING_FONT_KEY: &str = "reading-font";

pub const MIN_FONT_SIZE: u16 = 16;
pub const MAX_FONT_SIZE: u16 = 64;
pub const DEFAULT_FONT_SIZE: u16 = 24;
/// Increment used by the `+`/`-` keys.
pub const FONT_SIZE_STEP: u16 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(anyhow!("unknown theme {other:?}")),
        }
    }
}

/// How lyric text is drawn in the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadingFont {
    #[default]
    Standard,
    Bold,
    Italic,
}

impl ReadingFont {
    pub fn cycled(self) -> Self {
        match self {
            ReadingFont::Standard => ReadingFont::Bold,
            ReadingFont::Bold => ReadingFont::Italic,
            ReadingFont::Italic => ReadingFont::Standard,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            ReadingFont::Standard => "standard",
            ReadingFont::Bold => "bold",
            ReadingFont::Italic => "italic",
        }
    }
}

impl fmt::Display for ReadingFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReadingFont {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "standard" => Ok(ReadingFont::Standard),
            "bold" => Ok(ReadingFont::Bold),
            "italic" => Ok(ReadingFont::Italic),
            other => Err(anyhow!("unknown reading font {other:?}")),
        }
    }
}

/// Reader settings persisted between sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preferences {
    pub theme: Theme,
    pub font_size: u16,
    pub reading_font: ReadingFont,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            font_size: DEFAULT_FONT_SIZE,
            reading_font: ReadingFont::default(),
        }
    }
}

/// Clamp a requested font size into the supported range.
pub fn clamp_font_size(size: i32) -> u16 {
    size.clamp(MIN_FONT_SIZE as i32, MAX_FONT_SIZE as i32) as u16
}

/// Read every stored preference. Missing keys use defaults; stored values that
/// no longer parse are logged and replaced by defaults too.
pub fn load_preferences(conn: &Connection) -> Result<Preferences> {
    let defaults = Preferences::default();

    let theme = read_parsed(conn, THEME_KEY)?.unwrap_or(defaults.theme);
    let reading_font = read_parsed(conn, READING_FONT_KEY)?.unwrap_or(defaults.reading_font);
    let font_size = read_parsed::<i32>(conn, FONT_SIZE_KEY)?
        .map(clamp_font_size)
        .unwrap_or(defaults.font_size);

    Ok(Preferences {
        theme,
        font_size,
        reading_font,
    })
}

pub fn save_theme(conn: &Connection, theme: Theme) -> Result<()> {
    write_value(conn, THEME_KEY, theme.as_str())
}

/// Store the clamped size and return it.
pub fn save_font_size(conn: &Connection, size: i32) -> Result<u16> {
    let clamped = clamp_font_size(size);
    write_value(conn, FONT_SIZE_KEY, &clamped.to_string())?;
    Ok(clamped)
}

pub fn save_reading_font(conn: &Connection, font: ReadingFont) -> Result<()> {
    write_value(conn, READING_FONT_KEY, font.as_str())
}

fn read_value(conn: &Connection, key: &str) -> Result<Option<String>> {
    conn.query_row(
        "SELECT value FROM preferences WHERE key = ?1",
        params![key],
        |row| row.get(0),
    )
    .optional()
    .with_context(|| format!("failed to read preference {key}"))
}

fn read_parsed<T>(conn: &Connection, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    let Some(raw) = read_value(conn, key)? else {
        return Ok(None);
    };
    match raw.parse::<T>() {
        Ok(value) => Ok(Some(value)),
        Err(err) => {
            warn!(key, value = %raw, error = %err, "ignoring stored preference");
            Ok(None)
        }
    }
}

fn write_value(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO preferences (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![key, value],
    )
    .with_context(|| format!("failed to save preference {key}"))?;
    Ok(())
}
