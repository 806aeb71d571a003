//! Test helpers and fixtures.

use bookbrowse_core::{AuthorId, Book, BookId, Catalog, GenreId};

pub const FIXTURE_AUTHOR: &str = "Test Author";

/// Book `n` is titled `Book n`, written by `a1`, tagged `g1`, and
/// published in `1900 + n`.
pub fn make_book(n: usize) -> Book {
    Book {
        id: BookId::new(n.to_string()),
        title: format!("Book {n}"),
        author: AuthorId::new("a1"),
        image: String::new(),
        published: format!("{}-01-01", 1900 + n),
        description: format!("Description of book {n}."),
        genres: vec![GenreId::new("g1")],
    }
}

pub fn make_catalog(count: usize, books_per_page: usize) -> Catalog {
    let mut catalog = Catalog {
        books: (1..=count).map(make_book).collect(),
        books_per_page,
        ..Catalog::default()
    };
    catalog
        .authors
        .insert(AuthorId::new("a1"), FIXTURE_AUTHOR.to_string());
    catalog
        .genres
        .insert(GenreId::new("g1"), "General".to_string());
    catalog
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_catalog() {
        let catalog = make_catalog(3, 2);
        assert_eq!(catalog.books.len(), 3);
        assert_eq!(catalog.page_size(), 2);
        assert_eq!(catalog.books[2].published_year(), Some(1903));
        assert_eq!(catalog.author_name(&AuthorId::new("a1")), FIXTURE_AUTHOR);
    }
}
