//! Read-only loading of the book catalog and the runtime settings file.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use bookbrowse_core::{AuthorId, Book, Catalog, DEFAULT_BOOKS_PER_PAGE, GenreId, Settings};
use serde::Deserialize;

mod error;

pub use error::CatalogError;

pub type Result<T> = std::result::Result<T, CatalogError>;

const EMBEDDED_CATALOG: &str = include_str!("../data/catalog.json");

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    books: Vec<Book>,
    #[serde(default)]
    authors: BTreeMap<AuthorId, String>,
    #[serde(default)]
    genres: BTreeMap<GenreId, String>,
    books_per_page: Option<usize>,
}

/// The catalog compiled into the binary, used when no catalog file is configured.
pub fn embedded_catalog() -> Result<Catalog> {
    parse_catalog(EMBEDDED_CATALOG, "embedded catalog")
}

pub fn parse_catalog(json: &str, origin: &str) -> Result<Catalog> {
    let file: CatalogFile = serde_json::from_str(json).map_err(|source| CatalogError::Parse {
        origin: origin.to_string(),
        source,
    })?;

    let books_per_page = match file.books_per_page {
        Some(0) => return Err(CatalogError::InvalidPageSize),
        Some(n) => n,
        None => DEFAULT_BOOKS_PER_PAGE,
    };

    let mut seen = HashSet::new();
    for book in &file.books {
        if !seen.insert(book.id.as_str()) {
            return Err(CatalogError::DuplicateBookId(book.id.to_string()));
        }
    }

    Ok(Catalog {
        books: file.books,
        authors: file.authors,
        genres: file.genres,
        books_per_page,
    })
}

/// Loads a catalog file. Relative image paths are resolved against the
/// file's directory so covers can be opened regardless of the cwd.
pub fn load_catalog(path: impl AsRef<Path>) -> Result<Catalog> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut catalog = parse_catalog(&json, &path.display().to_string())?;

    if let Some(base) = path.parent() {
        for book in &mut catalog.books {
            book.image = resolve_image(base, &book.image);
        }
    }

    tracing::info!(
        path = %path.display(),
        books = catalog.books.len(),
        authors = catalog.authors.len(),
        genres = catalog.genres.len(),
        "catalog loaded"
    );
    Ok(catalog)
}

fn resolve_image(base: &Path, image: &str) -> String {
    let trimmed = image.trim();
    if trimmed.is_empty() || trimmed.contains("://") || Path::new(trimmed).is_absolute() {
        return trimmed.to_string();
    }
    base.join(trimmed).to_string_lossy().to_string()
}

/// Reads `config.json`; a missing file yields defaults.
pub fn load_settings(path: impl AsRef<Path>) -> Result<Settings> {
    let path = path.as_ref();
    let json = match std::fs::read_to_string(path) {
        Ok(json) => json,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Settings::default());
        }
        Err(source) => {
            return Err(CatalogError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let mut settings: Settings =
        serde_json::from_str(&json).map_err(|source| CatalogError::Parse {
            origin: path.display().to_string(),
            source,
        })?;
    settings.normalize();
    Ok(settings)
}
