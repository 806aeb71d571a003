//! Paging state and the "show more / back" control derived from it.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Library,
    Search,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    /// 1-based count of pages currently shown.
    pub page: usize,
    /// Catalog positions in view, ascending.
    pub matches: Vec<usize>,
    pub mode: ViewMode,
    /// Page to restore when leaving search mode.
    pub previous_page: usize,
}

impl ViewState {
    pub fn library(total: usize) -> Self {
        Self {
            page: 1,
            matches: (0..total).collect(),
            mode: ViewMode::Library,
            previous_page: 1,
        }
    }

    pub fn is_search(&self) -> bool {
        self.mode == ViewMode::Search
    }

    /// Matches not yet shown at the current page, never negative.
    pub fn remaining(&self, page_size: usize) -> usize {
        self.matches
            .len()
            .saturating_sub(self.page.saturating_mul(page_size))
    }

    /// Positions of one page, `[(page-1)*n, page*n)` clamped to the matches.
    pub fn page_slice(&self, page: usize, page_size: usize) -> &[usize] {
        let start = page.saturating_sub(1).saturating_mul(page_size);
        let end = page.saturating_mul(page_size);
        self.clamped(start, end)
    }

    /// Positions of pages `1..=page`.
    pub fn through_page(&self, page: usize, page_size: usize) -> &[usize] {
        self.clamped(0, page.saturating_mul(page_size))
    }

    fn clamped(&self, start: usize, end: usize) -> &[usize] {
        let len = self.matches.len();
        let start = start.min(len);
        let end = end.min(len);
        &self.matches[start..end]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    ShowMore,
    Back,
}

impl ControlAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlAction::ShowMore => "showMore",
            ControlAction::Back => "back",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListControl {
    pub action: ControlAction,
    pub remaining: usize,
    pub disabled: bool,
}

impl ListControl {
    pub fn for_state(state: &ViewState, page_size: usize) -> Self {
        let remaining = state.remaining(page_size);
        match state.mode {
            ViewMode::Search => Self {
                action: ControlAction::Back,
                remaining,
                disabled: false,
            },
            ViewMode::Library => Self {
                action: ControlAction::ShowMore,
                remaining,
                disabled: remaining == 0,
            },
        }
    }

    pub fn label(&self) -> String {
        match self.action {
            ControlAction::Back => "Back to Library".to_string(),
            ControlAction::ShowMore => format!("Show more ({})", self.remaining),
        }
    }
}
