use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use anyhow::Context as _;
use bookbrowse_application::Browser;
use bookbrowse_core::{Catalog, ColorScheme, Settings, Theme};
use bookbrowse_ui::{Ui, UiExit};
use directories::ProjectDirs;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

const ENV_CATALOG: &str = "BOOKBROWSE_CATALOG";
const ENV_LOG: &str = "BOOKBROWSE_LOG";
const ENV_THEME: &str = "BOOKBROWSE_THEME";

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:?}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let project_dirs =
        ProjectDirs::from("dev", "bookbrowse", "bookbrowse").context("resolve project dirs")?;

    let config_path = project_dirs.config_dir().join("config.json");
    let mut settings = bookbrowse_catalog::load_settings(&config_path)?;
    apply_env_overrides(&mut settings);

    init_logging(project_dirs.data_local_dir(), &settings)?;
    tracing::info!(config = %config_path.display(), "starting bookbrowse");

    let mut scheme = detect_scheme(
        std::env::var(ENV_THEME).ok().as_deref(),
        std::env::var("COLORFGBG").ok().as_deref(),
    );

    loop {
        let catalog = load_catalog(&settings)?;
        let mut ui = Ui::new(Browser::new(catalog, scheme));
        let outcome = ui.run()?;

        match outcome.exit {
            UiExit::Quit => break,
            UiExit::Reload => {
                tracing::info!("reloading catalog");
                scheme = scheme_for(outcome.browser.theme());
            }
        }
    }

    tracing::info!("bye");
    Ok(())
}

fn apply_env_overrides(settings: &mut Settings) {
    if let Ok(path) = std::env::var(ENV_CATALOG) {
        settings.catalog_path = Some(path);
    }
    if let Ok(filter) = std::env::var(ENV_LOG) {
        settings.log_filter = Some(filter);
    }
    settings.normalize();
}

/// The terminal owns stdout, so logs go to a file.
fn init_logging(log_dir: &Path, settings: &Settings) -> anyhow::Result<()> {
    fs::create_dir_all(log_dir)
        .with_context(|| format!("create log dir {}", log_dir.display()))?;
    let log_path = log_dir.join("bookbrowse.log");
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("open log file {}", log_path.display()))?;

    let filter = settings.log_filter.as_deref().unwrap_or("info");
    let env_filter = EnvFilter::try_new(filter)
        .with_context(|| format!("invalid log filter {filter:?}"))?;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(Mutex::new(file)),
        )
        .try_init()
        .context("init logging")?;
    Ok(())
}

fn load_catalog(settings: &Settings) -> anyhow::Result<Catalog> {
    let mut catalog = match settings.catalog_path.as_deref() {
        Some(path) => bookbrowse_catalog::load_catalog(path)
            .with_context(|| format!("load catalog {path}"))?,
        None => bookbrowse_catalog::embedded_catalog().context("load embedded catalog")?,
    };
    if let Some(per_page) = settings.books_per_page {
        catalog.books_per_page = per_page;
    }
    Ok(catalog)
}

/// An explicit theme wins over whatever the terminal reports.
fn detect_scheme(theme: Option<&str>, colorfgbg: Option<&str>) -> ColorScheme {
    if let Some(theme) = theme.and_then(|value| value.parse::<Theme>().ok()) {
        return scheme_for(theme);
    }
    colorfgbg
        .and_then(ColorScheme::from_colorfgbg)
        .unwrap_or_default()
}

fn scheme_for(theme: Theme) -> ColorScheme {
    match theme {
        Theme::Day => ColorScheme::Light,
        Theme::Night => ColorScheme::Dark,
    }
}
