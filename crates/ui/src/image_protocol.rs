//! Chooses how cover images reach the terminal.

use std::time::Duration;

use ratatui_image::picker::{Capability, Picker, ProtocolType, cap_parser::QueryStdioOptions};

/// Terminal identification read once from the environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct TermHints {
    pub kitty_window: bool,
    pub term_kitty: bool,
    pub iterm: bool,
    pub tmux: bool,
}

fn env_non_empty(key: &str) -> bool {
    std::env::var(key).ok().is_some_and(|v| !v.trim().is_empty())
}

fn env_contains(key: &str, needle: &str) -> bool {
    std::env::var(key).ok().is_some_and(|v| v.contains(needle))
}

impl TermHints {
    pub(crate) fn from_env() -> Self {
        Self {
            kitty_window: env_non_empty("KITTY_WINDOW_ID"),
            term_kitty: std::env::var("TERM")
                .ok()
                .is_some_and(|term| term.trim().starts_with("xterm-kitty")),
            iterm: env_non_empty("ITERM_SESSION_ID")
                || env_contains("TERM_PROGRAM", "iTerm")
                || env_contains("LC_TERMINAL", "iTerm"),
            tmux: std::env::var_os("TMUX").is_some(),
        }
    }

    /// Probing stdio costs a round trip, so only do it on a strong hint.
    pub(crate) fn should_query(&self) -> bool {
        self.kitty_window || self.term_kitty || self.iterm || self.tmux
    }

    pub(crate) fn query_timeout(&self) -> Duration {
        if self.kitty_window || self.term_kitty || self.iterm {
            return Duration::from_millis(1500);
        }
        if self.tmux {
            return Duration::from_millis(300);
        }
        Duration::from_millis(0)
    }

    pub(crate) fn kitty_supported(&self, picker: &Picker) -> bool {
        if self.iterm {
            return false;
        }
        if self.kitty_window {
            return true;
        }
        picker
            .capabilities()
            .iter()
            .any(|cap| matches!(cap, Capability::Kitty))
    }
}

/// Tmux drops graphics escapes unless passthrough is on. Failures are ignored.
fn allow_tmux_passthrough() {
    let _ = std::process::Command::new("tmux")
        .args(["set-option", "-g", "allow-passthrough", "on"])
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status();
}

/// Must run after raw mode is enabled: the query reads the reply from stdin.
pub(crate) fn picker_for_terminal(hints: &TermHints) -> Picker {
    if hints.tmux {
        allow_tmux_passthrough();
    }
    let mut picker = if hints.should_query() {
        let mut options = QueryStdioOptions::default();
        options.timeout = hints.query_timeout();
        options.text_sizing_protocol = false;
        Picker::from_query_stdio_with_options(options).unwrap_or_else(|err| {
            tracing::debug!(%err, "terminal graphics query failed");
            Picker::halfblocks()
        })
    } else {
        Picker::halfblocks()
    };
    if hints.kitty_supported(&picker) {
        picker.set_protocol_type(ProtocolType::Kitty);
    }
    tracing::info!(protocol = protocol_label(&picker), "image protocol selected");
    picker
}

pub(crate) fn protocol_label(picker: &Picker) -> &'static str {
    match picker.protocol_type() {
        ProtocolType::Halfblocks => "halfblocks",
        ProtocolType::Sixel => "sixel",
        ProtocolType::Kitty => "kitty",
        ProtocolType::Iterm2 => "iterm2",
    }
}
