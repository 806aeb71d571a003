//! Browsing state and the operations user input drives.

use bookbrowse_core::{AuthorId, BookId, Catalog, ColorScheme, GenreId, Palette, Theme};

pub mod detail;
pub mod filter;
pub mod forms;
pub mod list;
pub mod preview;
pub mod theme;
pub mod view;

pub use detail::DetailOverlay;
pub use filter::{AuthorFilter, Filter, GenreFilter, SearchCriteria, filter_books};
pub use forms::{SearchField, SearchForm, SelectOption, SettingsForm};
pub use list::{Insertion, PreviewList};
pub use preview::{BookSelected, PreviewElement, PreviewMarkup};
pub use theme::ThemeController;
pub use view::{ControlAction, ListControl, ViewMode, ViewState};

/// The single owner of everything a browsing session mutates.
#[derive(Debug, Clone)]
pub struct Browser {
    catalog: Catalog,
    state: ViewState,
    list: PreviewList,
    control: ListControl,
    empty_message: bool,
    detail: DetailOverlay,
    search: SearchForm,
    settings: SettingsForm,
    theme: ThemeController,
}

impl Browser {
    pub fn new(catalog: Catalog, scheme: ColorScheme) -> Self {
        let state = ViewState::library(catalog.books.len());
        let control = ListControl::for_state(&state, catalog.page_size());
        let theme = ThemeController::from_system(scheme);
        let mut browser = Self {
            catalog,
            state,
            list: PreviewList::new(),
            control,
            empty_message: false,
            detail: DetailOverlay::default(),
            search: SearchForm::default(),
            settings: SettingsForm {
                open: false,
                theme: theme.theme(),
            },
            theme,
        };
        browser.render_positions(1, Insertion::Append);
        browser.refresh_control();
        browser
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn list(&self) -> &PreviewList {
        &self.list
    }

    pub fn control(&self) -> &ListControl {
        &self.control
    }

    pub fn empty_message_visible(&self) -> bool {
        self.empty_message
    }

    pub fn detail(&self) -> &DetailOverlay {
        &self.detail
    }

    pub fn search_form(&self) -> &SearchForm {
        &self.search
    }

    pub fn search_form_mut(&mut self) -> &mut SearchForm {
        &mut self.search
    }

    pub fn settings_form(&self) -> &SettingsForm {
        &self.settings
    }

    pub fn settings_form_mut(&mut self) -> &mut SettingsForm {
        &mut self.settings
    }

    pub fn theme(&self) -> Theme {
        self.theme.theme()
    }

    pub fn palette(&self) -> Palette {
        self.theme.palette()
    }

    pub fn submit_search(&mut self, criteria: SearchCriteria) {
        self.state.previous_page = self.state.page;
        self.state.mode = ViewMode::Search;
        self.state.page = 1;
        self.state.matches = filter::matching_positions(&self.catalog.books, &criteria);
        tracing::info!(
            matches = self.state.matches.len(),
            unfiltered = criteria.is_unfiltered(),
            previous_page = self.state.previous_page,
            "search submitted"
        );

        self.render_positions(1, Insertion::Replace);
        self.refresh_control();
        self.empty_message = self.state.matches.is_empty();

        self.search.open = false;
        self.search.reset();
    }

    /// Submits whatever the search overlay currently holds.
    pub fn submit_search_form(&mut self) {
        let criteria = self.search.criteria();
        self.submit_search(criteria);
    }

    pub fn advance_page(&mut self) {
        let page_size = self.catalog.page_size();
        if self.state.remaining(page_size) == 0 {
            return;
        }
        self.state.page += 1;
        let page = self.state.page;
        self.render_positions(page, Insertion::Append);
        self.refresh_control();
    }

    pub fn return_to_library(&mut self) {
        if !self.state.is_search() {
            return;
        }
        self.state.mode = ViewMode::Library;
        self.state.page = self.state.previous_page.max(1);
        self.state.matches = (0..self.catalog.books.len()).collect();
        tracing::info!(page = self.state.page, "back to library");

        let page_size = self.catalog.page_size();
        let positions = self.state.through_page(self.state.page, page_size).to_vec();
        list::render_book_list(&mut self.list, &self.catalog, &positions, Insertion::Replace);
        self.refresh_control();
        self.empty_message = self.state.matches.is_empty();
    }

    /// The control's primary action, chosen by its action flag.
    pub fn activate_control(&mut self) {
        match self.control.action {
            ControlAction::Back => self.return_to_library(),
            ControlAction::ShowMore if !self.control.disabled => self.advance_page(),
            ControlAction::ShowMore => {}
        }
    }

    /// Clicks the preview at `index` and routes its signal. Returns whether
    /// the detail overlay was populated.
    pub fn click_preview(&mut self, index: usize) -> bool {
        match self.list.click(index) {
            Some(signal) => self.handle_selection(&signal),
            None => false,
        }
    }

    pub fn handle_selection(&mut self, signal: &BookSelected) -> bool {
        let Some(book) = self.catalog.find(&BookId::new(signal.book_id.as_str())) else {
            tracing::debug!(book_id = %signal.book_id, "selection for unknown book ignored");
            return false;
        };
        let author = self.catalog.author_name(&book.author);
        let genres = book
            .genres
            .iter()
            .map(|id| self.catalog.genre_name(id))
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();
        self.detail.show(book, author, genres);
        tracing::debug!(book_id = %signal.book_id, "detail opened");
        true
    }

    pub fn close_detail(&mut self) {
        self.detail.close();
    }

    pub fn open_search(&mut self) {
        self.search.open = true;
        self.search.focus = SearchField::Title;
    }

    pub fn cancel_search(&mut self) {
        self.search.open = false;
    }

    pub fn open_settings(&mut self) {
        self.settings.open = true;
    }

    pub fn cancel_settings(&mut self) {
        self.settings.open = false;
    }

    /// Applies the theme chosen in the settings form and closes it.
    pub fn submit_settings(&mut self) {
        self.theme.apply(self.settings.theme);
        self.settings.open = false;
        tracing::info!(theme = %self.settings.theme, "theme applied");
    }

    pub fn genre_options(&self) -> Vec<SelectOption<GenreId>> {
        forms::genre_options(&self.catalog.genres)
    }

    pub fn author_options(&self) -> Vec<SelectOption<AuthorId>> {
        forms::author_options(&self.catalog.authors)
    }

    fn render_positions(&mut self, page: usize, insertion: Insertion) {
        let page_size = self.catalog.page_size();
        let positions = self.state.page_slice(page, page_size).to_vec();
        list::render_book_list(&mut self.list, &self.catalog, &positions, insertion);
    }

    fn refresh_control(&mut self) {
        self.control = ListControl::for_state(&self.state, self.catalog.page_size());
    }
}
