//! Predicate-based subset selection over the catalog.

use bookbrowse_core::{AuthorId, Book, GenreId};

/// A select value: either the `any` wildcard or one specific id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Filter<T> {
    Any,
    Selected(T),
}

impl<T> Default for Filter<T> {
    fn default() -> Self {
        Self::Any
    }
}

impl<T> Filter<T> {
    pub fn is_any(&self) -> bool {
        matches!(self, Filter::Any)
    }

    pub fn selected(&self) -> Option<&T> {
        match self {
            Filter::Any => None,
            Filter::Selected(value) => Some(value),
        }
    }
}

impl<T: for<'a> From<&'a str>> Filter<T> {
    /// Parses a form value. `any` (any case) and blank values are the wildcard.
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("any") {
            Filter::Any
        } else {
            Filter::Selected(T::from(trimmed))
        }
    }
}

impl<T: std::fmt::Display> Filter<T> {
    pub fn form_value(&self) -> String {
        match self {
            Filter::Any => "any".to_string(),
            Filter::Selected(value) => value.to_string(),
        }
    }
}

pub type GenreFilter = Filter<GenreId>;
pub type AuthorFilter = Filter<AuthorId>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchCriteria {
    pub genre: GenreFilter,
    pub title: String,
    pub author: AuthorFilter,
}

impl SearchCriteria {
    pub fn from_form(genre: &str, title: &str, author: &str) -> Self {
        Self {
            genre: Filter::parse(genre),
            title: title.to_string(),
            author: Filter::parse(author),
        }
    }

    pub fn is_unfiltered(&self) -> bool {
        self.genre.is_any() && self.author.is_any() && self.title.trim().is_empty()
    }

    pub fn matches(&self, book: &Book) -> bool {
        self.matches_genre(book) && self.matches_title(book) && self.matches_author(book)
    }

    pub fn matches_genre(&self, book: &Book) -> bool {
        self.genre.selected().is_none_or(|genre| book.has_genre(genre))
    }

    /// Substring match on the lowercased title. Only a blank query is a
    /// wildcard; surrounding spaces in a non-blank query are significant.
    pub fn matches_title(&self, book: &Book) -> bool {
        if self.title.trim().is_empty() {
            return true;
        }
        book.title
            .to_lowercase()
            .contains(&self.title.to_lowercase())
    }

    pub fn matches_author(&self, book: &Book) -> bool {
        self.author.selected().is_none_or(|author| &book.author == author)
    }
}

pub fn filter_books<'a>(books: &'a [Book], criteria: &SearchCriteria) -> Vec<&'a Book> {
    books.iter().filter(|book| criteria.matches(book)).collect()
}

/// Catalog positions of the matching books, ascending.
pub fn matching_positions(books: &[Book], criteria: &SearchCriteria) -> Vec<usize> {
    books
        .iter()
        .enumerate()
        .filter(|(_, book)| criteria.matches(book))
        .map(|(idx, _)| idx)
        .collect()
}
