//! Key-value preference persistence on top of the embedded SQLite store.

mod connection;
mod preferences;

pub use connection::{data_dir, ensure_schema, open_store, DATA_DIR_NAME};
pub use preferences::{
    clamp_font_size, load_preferences, save_font_size, save_reading_font, save_theme,
    Preferences, ReadingFont, Theme, DEFAULT_FONT_SIZE, FONT_SIZE_STEP, MAX_FONT_SIZE,
    MIN_FONT_SIZE,
};
