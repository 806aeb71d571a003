//! Core domain types for bookbrowse.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike as _, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

pub const DEFAULT_BOOKS_PER_PAGE: usize = 36;
pub const MAX_BOOKS_PER_PAGE: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthorId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenreId(pub String);

macro_rules! id_impls {
    ($($ty:ident),*) => {
        $(
            impl $ty {
                pub fn new(value: impl Into<String>) -> Self {
                    Self(value.into())
                }

                pub fn as_str(&self) -> &str {
                    &self.0
                }
            }

            impl std::fmt::Display for $ty {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    f.write_str(&self.0)
                }
            }

            impl From<&str> for $ty {
                fn from(value: &str) -> Self {
                    Self(value.to_string())
                }
            }
        )*
    };
}

id_impls!(BookId, AuthorId, GenreId);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: AuthorId,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub published: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub genres: Vec<GenreId>,
}

impl Book {
    /// Calendar year of `published`, accepting RFC 3339 date-times, naive
    /// date-times and plain `YYYY-MM-DD` dates.
    pub fn published_year(&self) -> Option<i32> {
        let raw = self.published.trim();
        if raw.is_empty() {
            return None;
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.year());
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
            return Some(dt.year());
        }
        if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return Some(date.year());
        }
        None
    }

    pub fn has_genre(&self, genre: &GenreId) -> bool {
        self.genres.iter().any(|g| g == genre)
    }
}

/// The static data a browser session reads from. Never mutated after load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    pub books: Vec<Book>,
    pub authors: BTreeMap<AuthorId, String>,
    pub genres: BTreeMap<GenreId, String>,
    pub books_per_page: usize,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            books: Vec::new(),
            authors: BTreeMap::new(),
            genres: BTreeMap::new(),
            books_per_page: DEFAULT_BOOKS_PER_PAGE,
        }
    }
}

impl Catalog {
    pub fn find(&self, id: &BookId) -> Option<&Book> {
        self.books.iter().find(|book| &book.id == id)
    }

    /// Display name for an author, empty when the id is unknown.
    pub fn author_name(&self, id: &AuthorId) -> &str {
        self.authors.get(id).map(String::as_str).unwrap_or("")
    }

    pub fn genre_name(&self, id: &GenreId) -> &str {
        self.genres.get(id).map(String::as_str).unwrap_or("")
    }

    pub fn page_size(&self) -> usize {
        self.books_per_page.max(1)
    }
}

/// Read-only runtime configuration. Nothing here is written back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub catalog_path: Option<String>,
    pub books_per_page: Option<usize>,
    pub log_filter: Option<String>,
}

impl Settings {
    pub fn normalize(&mut self) {
        self.books_per_page = self
            .books_per_page
            .map(|n| n.clamp(1, MAX_BOOKS_PER_PAGE));
        self.catalog_path = normalize_opt_string(self.catalog_path.take());
        self.log_filter = normalize_opt_string(self.log_filter.take());
    }
}

fn normalize_opt_string(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// The two ink colors every surface is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub dark: Rgb,
    pub light: Rgb,
}

const INK_DEEP: Rgb = Rgb(10, 10, 20);
const INK_PALE: Rgb = Rgb(255, 255, 255);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Day,
    Night,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Day => "day",
            Theme::Night => "night",
        }
    }

    pub fn palette(&self) -> Palette {
        match self {
            Theme::Day => Palette {
                dark: INK_DEEP,
                light: INK_PALE,
            },
            Theme::Night => Palette {
                dark: INK_PALE,
                light: INK_DEEP,
            },
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Theme::Day => Theme::Night,
            Theme::Night => Theme::Day,
        }
    }

    pub fn for_scheme(scheme: ColorScheme) -> Self {
        match scheme {
            ColorScheme::Dark => Theme::Night,
            ColorScheme::Light => Theme::Day,
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Theme {
    type Err = &'static str;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "day" | "light" => Ok(Theme::Day),
            "night" | "dark" => Ok(Theme::Night),
            _ => Err("unknown theme"),
        }
    }
}

/// What the surrounding system prefers, independent of any explicit choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorScheme {
    #[default]
    Light,
    Dark,
}

impl ColorScheme {
    /// Parses the `COLORFGBG` convention (`fg;bg` or `fg;default;bg`).
    pub fn from_colorfgbg(value: &str) -> Option<Self> {
        let bg = value.rsplit(';').next()?.trim();
        let bg: u8 = bg.parse().ok()?;
        if bg <= 6 || bg == 8 {
            Some(ColorScheme::Dark)
        } else {
            Some(ColorScheme::Light)
        }
    }
}
