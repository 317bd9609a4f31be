//! Command-line options and the resolved settings the app runs with.

use std::path::PathBuf;

use clap::Parser;

use crate::nav::NavPolicy;
use crate::search::FoldingTable;

#[derive(Debug, Parser)]
#[command(name = "choir-hymn-reader", version, about = "Read choir hymns in the terminal")]
pub struct Args {
    /// Catalog JSON file. Defaults to the catalog built into the binary.
    #[arg(long, value_name = "PATH")]
    pub data: Option<PathBuf>,

    /// Preference database. Defaults to ~/.choir-hymn-reader/preferences.sqlite.
    #[arg(long, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Directory holding the gallery photos (`choir (N).webp`).
    #[arg(long, value_name = "DIR", default_value = "photos")]
    pub photos: PathBuf,

    /// Override the number of gallery photos from the catalog.
    #[arg(long, value_name = "N")]
    pub photo_count: Option<usize>,

    /// Start on the menu instead of the intro screen.
    #[arg(long)]
    pub skip_intro: bool,

    /// Keep the hymn search term when returning to the menu.
    #[arg(long)]
    pub keep_search_on_menu: bool,

    /// Directory for log files. Defaults to the data directory.
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Extra set of interchangeable letters, e.g. `--fold ةه`. Repeatable.
    #[arg(long = "fold", value_name = "CHARS")]
    pub fold: Vec<String>,
}

/// Settings derived from [`Args`] that the UI layer consumes.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub photo_dir: PathBuf,
    pub photo_count: Option<usize>,
    pub skip_intro: bool,
    pub policy: NavPolicy,
    pub folding: FoldingTable,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            photo_dir: PathBuf::from("photos"),
            photo_count: None,
            skip_intro: false,
            policy: NavPolicy::default(),
            folding: FoldingTable::default(),
        }
    }
}

impl From<&Args> for AppConfig {
    fn from(args: &Args) -> Self {
        let folding = args
            .fold
            .iter()
            .fold(FoldingTable::default(), |table, chars| {
                table.with_class(chars.chars())
            });

        Self {
            photo_dir: args.photos.clone(),
            photo_count: args.photo_count,
            skip_intro: args.skip_intro,
            policy: NavPolicy {
                clear_search_on_menu: !args.keep_search_on_menu,
            },
            folding,
        }
    }
}
