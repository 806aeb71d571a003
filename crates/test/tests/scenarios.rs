use bookbrowse_application::preview::{ATTR_BOOK_ID, ATTR_TITLE};
use bookbrowse_application::{
    Browser, ControlAction, Filter, PreviewElement, SearchCriteria, ViewMode, filter_books,
};
use bookbrowse_core::{ColorScheme, DEFAULT_BOOKS_PER_PAGE};
use bookbrowse_test::{FIXTURE_AUTHOR, make_catalog};

fn title_search(title: &str) -> SearchCriteria {
    SearchCriteria {
        genre: Filter::Any,
        title: title.to_string(),
        author: Filter::Any,
    }
}

#[test]
fn forty_books_show_more_reveals_the_last_four() {
    let mut browser = Browser::new(make_catalog(40, DEFAULT_BOOKS_PER_PAGE), ColorScheme::Light);
    assert_eq!(browser.list().len(), 36);
    assert_eq!(browser.control().remaining, 4);
    assert!(!browser.control().disabled);

    browser.activate_control();
    assert_eq!(browser.list().len(), 40);
    assert_eq!(browser.control().remaining, 0);
    assert!(browser.control().disabled);
    assert_eq!(browser.control().label(), "Show more (0)");

    browser.activate_control();
    assert_eq!(browser.list().len(), 40);
}

#[test]
fn title_search_hits_and_misses() {
    let mut catalog = make_catalog(10, 4);
    catalog.books[5].title = "Dune".to_string();
    let mut browser = Browser::new(catalog, ColorScheme::Light);

    browser.submit_search(title_search("dune"));
    assert_eq!(browser.state().matches.len(), 1);
    assert_eq!(browser.list().book_ids(), vec!["6"]);
    assert!(!browser.empty_message_visible());
    assert_eq!(browser.control().action, ControlAction::Back);

    browser.submit_search(title_search("zzz-no-match"));
    assert!(browser.state().matches.is_empty());
    assert!(browser.list().is_empty());
    assert!(browser.empty_message_visible());
}

#[test]
fn selecting_book_seven_opens_its_detail() -> anyhow::Result<()> {
    let catalog = bookbrowse_catalog::embedded_catalog()?;
    let mut browser = Browser::new(catalog, ColorScheme::Light);

    let index = browser
        .list()
        .book_ids()
        .iter()
        .position(|id| *id == "7")
        .ok_or_else(|| anyhow::anyhow!("book 7 not rendered"))?;
    assert!(browser.click_preview(index));

    let detail = browser.detail();
    assert!(detail.open);
    assert_eq!(detail.title, "Great Expectations");
    assert_eq!(detail.subtitle, "Charles Dickens (1861)");
    assert_eq!(detail.cover, detail.backdrop);
    Ok(())
}

#[test]
fn back_restores_pages_one_and_two_in_order() {
    let mut browser = Browser::new(make_catalog(30, 10), ColorScheme::Light);
    browser.advance_page();
    assert_eq!(browser.state().page, 2);

    browser.submit_search(title_search("book 2"));
    assert_eq!(browser.state().previous_page, 2);
    assert_eq!(browser.state().mode, ViewMode::Search);

    browser.activate_control();
    assert_eq!(browser.state().mode, ViewMode::Library);
    assert_eq!(browser.state().page, 2);
    let expected: Vec<String> = (1..=20).map(|n| n.to_string()).collect();
    assert_eq!(browser.list().book_ids(), expected);
    assert_eq!(browser.control().remaining, 10);
}

#[test]
fn repeated_renders_keep_one_listener() {
    let mut element = PreviewElement::new();
    element.set_attribute(ATTR_TITLE, "Dune");
    element.set_attribute(ATTR_BOOK_ID, "1");
    element.connect();
    let first = element.markup().clone();

    element.set_attribute(ATTR_TITLE, "Dune");
    element.connect();
    element.connect();

    assert_eq!(element.markup(), &first);
    assert_eq!(element.listener_count(), 1);
    assert_eq!(element.markup().author, "Unknown Author");
}

#[test]
fn unfiltered_search_keeps_catalog_order() {
    let catalog = make_catalog(12, 5);
    let found: Vec<&str> = filter_books(&catalog.books, &title_search(""))
        .into_iter()
        .map(|book| book.id.as_str())
        .collect();
    let expected: Vec<String> = (1..=12).map(|n| n.to_string()).collect();
    assert_eq!(found, expected);
}

#[test]
fn detail_uses_fixture_author() {
    let mut browser = Browser::new(make_catalog(3, 5), ColorScheme::Dark);
    assert!(browser.click_preview(2));
    assert_eq!(
        browser.detail().subtitle,
        format!("{FIXTURE_AUTHOR} (1903)")
    );
    browser.close_detail();
    assert!(!browser.detail().open);
}
