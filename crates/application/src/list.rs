//! The content area holding rendered previews.

use bookbrowse_core::Catalog;

use crate::preview::{
    ATTR_AUTHOR, ATTR_BOOK_ID, ATTR_IMAGE, ATTR_TITLE, BookSelected, PreviewElement,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    /// Drop every existing preview before inserting the batch.
    Replace,
    /// Keep what is already shown.
    Append,
}

#[derive(Debug, Clone, Default)]
pub struct PreviewList {
    items: Vec<PreviewElement>,
    insertions: usize,
}

impl PreviewList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PreviewElement> {
        self.items.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PreviewElement> {
        self.items.iter()
    }

    pub fn book_ids(&self) -> Vec<&str> {
        self.items
            .iter()
            .map(|item| item.markup().book_id.as_str())
            .collect()
    }

    /// Number of batch insertions so far.
    pub fn insertions(&self) -> usize {
        self.insertions
    }

    /// Connects every element of `batch` and inserts them in one step.
    pub fn insert_batch(&mut self, mut batch: Vec<PreviewElement>, insertion: Insertion) {
        for element in &mut batch {
            element.connect();
        }
        if insertion == Insertion::Replace {
            self.items.clear();
        }
        self.items.append(&mut batch);
        self.insertions += 1;
    }

    /// Clicks the preview at `index`, returning the signal it emits.
    pub fn click(&self, index: usize) -> Option<BookSelected> {
        self.items.get(index).and_then(PreviewElement::click)
    }
}

/// One unconnected preview per catalog position, attributes copied from the book.
pub fn build_previews(catalog: &Catalog, positions: &[usize]) -> Vec<PreviewElement> {
    positions
        .iter()
        .filter_map(|&pos| catalog.books.get(pos))
        .map(|book| {
            let mut preview = PreviewElement::new();
            preview.set_attribute(ATTR_BOOK_ID, book.id.as_str());
            preview.set_attribute(ATTR_TITLE, book.title.as_str());
            preview.set_attribute(ATTR_AUTHOR, catalog.author_name(&book.author));
            preview.set_attribute(ATTR_IMAGE, book.image.as_str());
            preview
        })
        .collect()
}

pub fn render_book_list(
    list: &mut PreviewList,
    catalog: &Catalog,
    positions: &[usize],
    insertion: Insertion,
) {
    let batch = build_previews(catalog, positions);
    tracing::debug!(count = batch.len(), ?insertion, "render previews");
    list.insert_batch(batch, insertion);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preview::UNKNOWN_AUTHOR;
    use bookbrowse_core::{AuthorId, Book, BookId};

    fn catalog() -> Catalog {
        let mut catalog = Catalog::default();
        for (id, author) in [("1", "a1"), ("2", "a2"), ("3", "ghost")] {
            catalog.books.push(Book {
                id: BookId::new(id),
                title: format!("Book {id}"),
                author: AuthorId::new(author),
                image: format!("img/{id}.png"),
                published: String::new(),
                description: String::new(),
                genres: Vec::new(),
            });
        }
        catalog.authors.insert(AuthorId::new("a1"), "Ann".to_string());
        catalog.authors.insert(AuthorId::new("a2"), "Bo".to_string());
        catalog
    }

    #[test]
    fn previews_copy_book_fields() {
        let catalog = catalog();
        let previews = build_previews(&catalog, &[1, 2]);
        assert_eq!(previews.len(), 2);
        assert_eq!(previews[0].attribute(ATTR_BOOK_ID), Some("2"));
        assert_eq!(previews[0].markup().author, "Bo");
        assert_eq!(previews[0].markup().image, "img/2.png");
        assert_eq!(previews[1].markup().author, UNKNOWN_AUTHOR);
    }

    #[test]
    fn append_keeps_and_replace_clears() {
        let catalog = catalog();
        let mut list = PreviewList::new();
        render_book_list(&mut list, &catalog, &[0], Insertion::Append);
        render_book_list(&mut list, &catalog, &[1, 2], Insertion::Append);
        assert_eq!(list.book_ids(), vec!["1", "2", "3"]);

        render_book_list(&mut list, &catalog, &[2], Insertion::Replace);
        assert_eq!(list.book_ids(), vec!["3"]);
        assert_eq!(list.insertions(), 3);
    }

    #[test]
    fn inserted_previews_are_connected_and_clickable() {
        let catalog = catalog();
        let mut list = PreviewList::new();
        render_book_list(&mut list, &catalog, &[0, 1], Insertion::Append);
        assert!(list.iter().all(|p| p.is_connected() && p.listener_count() == 1));
        assert_eq!(
            list.click(1),
            Some(BookSelected {
                book_id: "2".to_string()
            })
        );
        assert_eq!(list.click(9), None);
    }

    #[test]
    fn out_of_range_positions_are_skipped() {
        let catalog = catalog();
        assert!(build_previews(&catalog, &[42]).is_empty());
    }
}
