pub mod loader;
pub mod lookup;

use serde::Serialize;
use std::path::Path;

pub use loader::{
    CatalogLoader, FixedDelay, LoadError, LoadReport, LookupFailure, NoDelay, Pacer,
};
pub use lookup::{LookupError, LookupService, OmdbClient};

/// Image shown when the lookup service reports no poster.
pub const PLACEHOLDER_IMAGE: &str = "placeholder-image.jpg";

/// Titles resolved on startup, grouped by the genre they are meant to fill.
pub const DEFAULT_TITLES: [&str; 32] = [
    // Action
    "The Dark Knight",
    "Mad Max: Fury Road",
    "John Wick",
    "Die Hard",
    "Mission Impossible",
    "The Avengers",
    "Gladiator",
    "Top Gun: Maverick",
    // Drama
    "The Shawshank Redemption",
    "Forrest Gump",
    "The Godfather",
    "Parasite",
    "Schindler's List",
    "12 Angry Men",
    "The Green Mile",
    "Goodfellas",
    // Adventure
    "Lord of the Rings",
    "Indiana Jones",
    "Avatar",
    "Pirates of the Caribbean",
    "Jurassic Park",
    "The Princess Bride",
    "The Mummy",
    "National Treasure",
    // Animation
    "Spirited Away",
    "The Lion King",
    "Spider-Man: Into the Spider-Verse",
    "Toy Story",
    "Up",
    "Coco",
    "How to Train Your Dragon",
    "Zootopia",
];

/// A resolved movie, as shown on a card and in the detail popup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovieRecord {
    pub title: String,
    pub year: String,
    /// Primary genre only.
    pub genre: String,
    pub description: String,
    pub image_url: String,
    /// Raw external rating, e.g. "9.0" or "N/A".
    pub rating: String,
    pub director: String,
}

impl MovieRecord {
    pub fn has_poster(&self) -> bool {
        self.image_url != PLACEHOLDER_IMAGE
    }
}

/// First entry of a comma-separated genre list ("Action, Crime, Drama" -> "Action").
pub fn primary_genre(raw: &str) -> String {
    raw.split(", ").next().unwrap_or("").trim().to_string()
}

pub fn default_titles() -> Vec<String> {
    DEFAULT_TITLES.iter().map(|t| t.to_string()).collect()
}

/// Read a title list, one title per line. Blank lines and `#` comments are skipped.
pub fn load_titles(path: &Path) -> std::io::Result<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    Ok(parse_titles(&content))
}

pub fn parse_titles(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}
