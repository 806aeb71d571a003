//! Modal panel with one book's full metadata.

use bookbrowse_core::Book;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailOverlay {
    pub open: bool,
    /// Image drawn blurred behind the panel.
    pub backdrop: String,
    pub cover: String,
    pub title: String,
    pub subtitle: String,
    pub description: String,
    /// Display names of the book's genres, in catalog order.
    pub genres: Vec<String>,
}

impl DetailOverlay {
    pub fn show(&mut self, book: &Book, author_name: &str, genres: Vec<String>) {
        self.backdrop = book.image.clone();
        self.cover = book.image.clone();
        self.title = book.title.clone();
        self.subtitle = subtitle(author_name, book.published_year());
        self.description = book.description.clone();
        self.genres = genres;
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }
}

/// `"<author> (<year>)"`, or just the author when the year is unknown.
pub fn subtitle(author_name: &str, year: Option<i32>) -> String {
    match year {
        Some(year) => format!("{author_name} ({year})"),
        None => author_name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookbrowse_core::{AuthorId, BookId};

    fn book() -> Book {
        Book {
            id: BookId::new("7"),
            title: "Great Expectations".to_string(),
            author: AuthorId::new("a-dickens"),
            image: "covers/ge.png".to_string(),
            published: "1861-08-01T00:00:00.000Z".to_string(),
            description: "Pip.".to_string(),
            genres: Vec::new(),
        }
    }

    #[test]
    fn show_populates_every_field() {
        let mut overlay = DetailOverlay::default();
        overlay.show(&book(), "Charles Dickens", vec!["Classics".to_string()]);
        assert!(overlay.open);
        assert_eq!(overlay.genres, vec!["Classics"]);
        assert_eq!(overlay.backdrop, "covers/ge.png");
        assert_eq!(overlay.cover, "covers/ge.png");
        assert_eq!(overlay.title, "Great Expectations");
        assert_eq!(overlay.subtitle, "Charles Dickens (1861)");
        assert_eq!(overlay.description, "Pip.");
    }

    #[test]
    fn close_keeps_content() {
        let mut overlay = DetailOverlay::default();
        overlay.show(&book(), "Charles Dickens", Vec::new());
        overlay.close();
        assert!(!overlay.open);
        assert_eq!(overlay.title, "Great Expectations");
    }

    #[test]
    fn subtitle_without_year() {
        assert_eq!(subtitle("Anon", None), "Anon");
    }
}
