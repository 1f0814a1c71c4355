use std::collections::HashSet;
use std::time::Duration;

use desk::{
    action::Action,
    fetch::{Dataset, EmbeddedFixtures, Loaded, fetch_dataset},
    pages::{ListPage, Page, PageContext, RowQuery, catalog},
    summary,
};
use grid::FilterValues;
use pretty_assertions::assert_eq;
use ratatui::{Terminal, backend::TestBackend};
use tokio::sync::mpsc;

async fn fixture(name: &str) -> Dataset {
    fetch_dataset(&EmbeddedFixtures, name, Duration::from_secs(1))
        .await
        .unwrap()
}

async fn ready(spec: desk::pages::ListSpec) -> ListPage {
    let dir = std::env::temp_dir().join("desk-list-pages");
    let ctx = PageContext::new(catalog::default_routes(), dir).page_size(20);
    let key = spec.key.clone();
    let name = spec.fixture.clone();
    let mut page = ListPage::new(spec, ctx);
    let (tx, _rx) = mpsc::unbounded_channel();
    page.register_action_handler(tx).unwrap();
    page.on_enter().unwrap();
    page.update(Action::DataLoaded(Loaded {
        page: key,
        generation: 1,
        result: Ok(fixture(&name).await),
    }))
    .unwrap();
    page
}

fn filters(pairs: &[(&str, &str)]) -> FilterValues {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn ids(page: &ListPage) -> Vec<String> {
    page.view()
        .unwrap()
        .list()
        .rows()
        .iter()
        .map(|r| r.id.clone())
        .collect()
}

fn screen(page: &mut ListPage, width: u16) -> String {
    let mut terminal = Terminal::new(TestBackend::new(width, 20)).unwrap();
    terminal
        .draw(|f| {
            let area = f.area();
            page.draw(f, area).unwrap();
        })
        .unwrap();
    let buffer = terminal.backend().buffer().clone();
    buffer
        .content()
        .chunks(width as usize)
        .map(|line| line.iter().map(|c| c.symbol()).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

#[tokio::test]
async fn bookings_narrow_by_status_customer_and_day() {
    let mut page = ready(catalog::bookings()).await;
    assert_eq!(ids(&page).len(), 12);

    page.update(Action::Search(filters(&[("status", "Open")])))
        .unwrap();
    assert_eq!(ids(&page), vec!["bk-1", "bk-4", "bk-7", "bk-9", "bk-11"]);

    page.update(Action::Search(filters(&[
        ("status", "Open"),
        ("customer", "Acme Logistics"),
    ])))
    .unwrap();
    assert_eq!(ids(&page), vec!["bk-1", "bk-4"]);

    page.update(Action::Search(filters(&[("bookingDate", "2024-03-05")])))
        .unwrap();
    assert_eq!(ids(&page), vec!["bk-4"]);

    // an empty bar brings everything back
    page.update(Action::Search(filters(&[("status", ""), ("bookingNo", " ")])))
        .unwrap();
    assert_eq!(ids(&page).len(), 12);
}

#[tokio::test]
async fn claims_without_rows_show_the_empty_state() {
    let mut page = ready(catalog::claims()).await;
    let view = page.view().unwrap();
    assert!(view.list().is_empty());
    assert!(!view.list().columns().is_empty());
    assert!(screen(&mut page, 90).contains("No data available"));
}

#[tokio::test]
async fn drivers_without_ids_get_distinct_ones() {
    let page = ready(catalog::drivers()).await;
    let ids = ids(&page);
    assert_eq!(ids.len(), 5);
    assert_eq!(ids.iter().collect::<HashSet<_>>().len(), 5);
    assert!(ids.iter().all(|id| !id.is_empty()));
}

#[tokio::test]
async fn billing_opens_on_the_first_tab() {
    let page = ready(catalog::billing()).await;
    let list = page.view().unwrap().list();
    assert_eq!(list.tabs().map(|t| t.active().to_string()).as_deref(), Some("invoices"));
    assert_eq!(list.rows().len(), 4);

    let value = summary("billing", &fixture("billing").await);
    assert_eq!(value["rows"], 7);
    assert_eq!(value["tabs"][1]["tab"], "payments");
    assert_eq!(value["tabs"][1]["rows"], 2);
}

#[tokio::test]
async fn row_query_ignores_blank_values() {
    let spec = catalog::bookings();
    let query = RowQuery::new(&spec.filters, &filters(&[("status", "  "), ("customer", "")]));
    assert!(query.is_empty());

    let Dataset::Table(table) = fixture("bookings").await else {
        panic!("bookings is a single table");
    };
    assert_eq!(query.apply(&table.rows).len(), table.rows.len());

    let query = RowQuery::new(&spec.filters, &filters(&[("bookingNo", "bk-100")]));
    assert_eq!(query.apply(&table.rows).len(), 9);
}
