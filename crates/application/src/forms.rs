//! Search and settings overlays and their select options.

use std::collections::BTreeMap;

use bookbrowse_core::{AuthorId, GenreId, Theme};

use crate::filter::{AuthorFilter, Filter, GenreFilter, SearchCriteria};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption<T> {
    pub value: Filter<T>,
    pub label: String,
}

/// `any` first, then every mapping entry sorted by display name.
pub fn select_options<T: Clone + Ord>(
    mapping: &BTreeMap<T, String>,
    any_label: &str,
) -> Vec<SelectOption<T>> {
    let mut entries: Vec<(&T, &String)> = mapping.iter().collect();
    entries.sort_by(|(a_id, a_name), (b_id, b_name)| {
        a_name
            .to_lowercase()
            .cmp(&b_name.to_lowercase())
            .then_with(|| a_id.cmp(b_id))
    });

    let mut options = Vec::with_capacity(entries.len() + 1);
    options.push(SelectOption {
        value: Filter::Any,
        label: any_label.to_string(),
    });
    options.extend(entries.into_iter().map(|(id, name)| SelectOption {
        value: Filter::Selected(id.clone()),
        label: name.clone(),
    }));
    options
}

pub fn genre_options(genres: &BTreeMap<GenreId, String>) -> Vec<SelectOption<GenreId>> {
    select_options(genres, "All Genres")
}

pub fn author_options(authors: &BTreeMap<AuthorId, String>) -> Vec<SelectOption<AuthorId>> {
    select_options(authors, "All authors")
}

/// Moves a select `step` options away from `current`, wrapping around.
/// An unknown current value restarts from the first option.
pub fn cycle_option<T: Clone + PartialEq>(
    options: &[SelectOption<T>],
    current: &Filter<T>,
    step: isize,
) -> Filter<T> {
    if options.is_empty() {
        return Filter::Any;
    }
    let len = options.len() as isize;
    let idx = options
        .iter()
        .position(|opt| &opt.value == current)
        .map(|idx| idx as isize)
        .unwrap_or(0);
    let next = (idx + step).rem_euclid(len) as usize;
    options[next].value.clone()
}

pub fn option_label<'a, T: PartialEq>(options: &'a [SelectOption<T>], value: &Filter<T>) -> &'a str {
    options
        .iter()
        .find(|opt| &opt.value == value)
        .map(|opt| opt.label.as_str())
        .unwrap_or("")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchField {
    #[default]
    Title,
    Genre,
    Author,
}

impl SearchField {
    pub fn next(self) -> Self {
        match self {
            SearchField::Title => SearchField::Genre,
            SearchField::Genre => SearchField::Author,
            SearchField::Author => SearchField::Title,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            SearchField::Title => SearchField::Author,
            SearchField::Genre => SearchField::Title,
            SearchField::Author => SearchField::Genre,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchForm {
    pub open: bool,
    pub focus: SearchField,
    pub title: String,
    pub genre: GenreFilter,
    pub author: AuthorFilter,
}

impl SearchForm {
    pub fn criteria(&self) -> SearchCriteria {
        SearchCriteria {
            genre: self.genre.clone(),
            title: self.title.clone(),
            author: self.author.clone(),
        }
    }

    /// Blanks every field, leaving `open` and focus alone.
    pub fn reset(&mut self) {
        self.title.clear();
        self.genre = Filter::Any;
        self.author = Filter::Any;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SettingsForm {
    pub open: bool,
    pub theme: Theme,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn genres() -> BTreeMap<GenreId, String> {
        BTreeMap::from([
            (GenreId::new("g3"), "romance".to_string()),
            (GenreId::new("g1"), "Science Fiction".to_string()),
            (GenreId::new("g2"), "Adventure".to_string()),
        ])
    }

    #[test]
    fn options_start_with_any_and_sort_by_name() {
        let options = genre_options(&genres());
        let labels: Vec<&str> = options.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["All Genres", "Adventure", "romance", "Science Fiction"]
        );
        assert_eq!(options[0].value, Filter::Any);
        assert_eq!(author_options(&BTreeMap::new())[0].label, "All authors");
    }

    #[test]
    fn cycle_wraps_both_ways() {
        let options = genre_options(&genres());
        let next = cycle_option(&options, &Filter::Any, 1);
        assert_eq!(next, Filter::Selected(GenreId::new("g2")));
        let back = cycle_option(&options, &Filter::Any, -1);
        assert_eq!(back, Filter::Selected(GenreId::new("g1")));
        let stale = cycle_option(&options, &Filter::Selected(GenreId::new("zz")), 1);
        assert_eq!(stale, Filter::Selected(GenreId::new("g2")));
        assert_eq!(option_label(&options, &back), "Science Fiction");
    }

    #[test]
    fn reset_clears_fields() {
        let mut form = SearchForm {
            open: true,
            focus: SearchField::Author,
            title: "dune".to_string(),
            genre: Filter::Selected(GenreId::new("g1")),
            author: Filter::Selected(AuthorId::new("a1")),
        };
        assert_eq!(form.criteria().title, "dune");
        form.reset();
        assert_eq!(form.criteria(), SearchCriteria::default());
        assert!(form.open);
    }

    #[test]
    fn focus_cycles() {
        assert_eq!(SearchField::Title.next(), SearchField::Genre);
        assert_eq!(SearchField::Title.prev(), SearchField::Author);
        assert_eq!(SearchField::Author.next().prev(), SearchField::Author);
    }
}
