//! The attribute-driven preview card.
//!
//! A `PreviewElement` keeps its rendered content private: callers set
//! attributes and read back the last rendered [`PreviewMarkup`], never the
//! other way round. Rendering happens when the element is connected to a
//! list and whenever an observed attribute changes value.

use std::collections::BTreeMap;

pub const ATTR_TITLE: &str = "title";
pub const ATTR_AUTHOR: &str = "author";
pub const ATTR_IMAGE: &str = "image";
pub const ATTR_BOOK_ID: &str = "book-id";

pub const OBSERVED_ATTRIBUTES: [&str; 4] = [ATTR_TITLE, ATTR_AUTHOR, ATTR_IMAGE, ATTR_BOOK_ID];

pub const UNKNOWN_TITLE: &str = "Unknown Title";
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";

/// Emitted by a clicked preview. It propagates out of the element to
/// whoever owns the list the element lives in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookSelected {
    pub book_id: String,
}

/// What a preview displays after its last render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreviewMarkup {
    pub book_id: String,
    pub title: String,
    pub author: String,
    pub image: String,
}

#[derive(Debug, Clone, Default)]
pub struct PreviewElement {
    attributes: BTreeMap<String, String>,
    markup: PreviewMarkup,
    connected: bool,
    listeners: usize,
    renders: usize,
}

impl PreviewElement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Stores an attribute; re-renders when it is observed and its value changed.
    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        let old = self.attributes.insert(name.to_string(), value.clone());
        if is_observed(name) && old.as_deref() != Some(value.as_str()) {
            self.render();
        }
    }

    /// Renders and binds the click listener. Connecting twice binds nothing new.
    pub fn connect(&mut self) {
        self.render();
        if self.listeners == 0 {
            self.listeners = 1;
        }
        self.connected = true;
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn markup(&self) -> &PreviewMarkup {
        &self.markup
    }

    pub fn listener_count(&self) -> usize {
        self.listeners
    }

    pub fn render_count(&self) -> usize {
        self.renders
    }

    /// Reads `book-id` at click time. Nothing is emitted before the listener is bound.
    pub fn click(&self) -> Option<BookSelected> {
        if self.listeners == 0 {
            return None;
        }
        Some(BookSelected {
            book_id: self.attribute(ATTR_BOOK_ID).unwrap_or_default().to_string(),
        })
    }

    fn render(&mut self) {
        self.markup = PreviewMarkup {
            book_id: self.attr_or(ATTR_BOOK_ID, ""),
            title: self.attr_or(ATTR_TITLE, UNKNOWN_TITLE),
            author: self.attr_or(ATTR_AUTHOR, UNKNOWN_AUTHOR),
            image: self.attr_or(ATTR_IMAGE, ""),
        };
        self.renders += 1;
    }

    fn attr_or(&self, name: &str, fallback: &str) -> String {
        match self.attribute(name) {
            Some(value) if !value.is_empty() => value.to_string(),
            _ => fallback.to_string(),
        }
    }
}

fn is_observed(name: &str) -> bool {
    OBSERVED_ATTRIBUTES.contains(&name)
}
