use bookbrowse_core::{ColorScheme, Palette, Theme};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeController {
    theme: Theme,
    palette: Palette,
}

impl ThemeController {
    /// Seeds the palette from the system preference.
    pub fn from_system(scheme: ColorScheme) -> Self {
        let theme = Theme::for_scheme(scheme);
        Self {
            theme,
            palette: theme.palette(),
        }
    }

    pub fn apply(&mut self, theme: Theme) {
        self.theme = theme;
        self.palette = theme.palette();
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn palette(&self) -> Palette {
        self.palette
    }
}
