//! Integration tests for the querymuse conversation flow
//!
//! These drive the session controller, stores, and table pipeline together
//! the way the TUI does: submit, tick `poll(now)` with synthetic instants,
//! then inspect the log and the processed table.

use querymuse_core::config::Config;
use querymuse_core::session::{CANNED_RESPONSE, TOOL_LABEL};
use querymuse_core::table::TableOutput;
use querymuse_core::{
    BookmarkStore, ChatSession, HistoryStore, MessageKind, StageStatus, SubmitOutcome, TableView,
    TimeFilter, STAGE_COUNT,
};
use std::time::{Duration, Instant};

const DWELL: Duration = Duration::from_millis(10);

fn test_config() -> Config {
    let config: Config = toml::from_str(
        r#"
[chat]
stage_dwell_ms = 10

[history]
search_delay_ms = 30
"#,
    )
    .unwrap();
    config.validate().unwrap();
    config
}

/// Tick the session in small steps until the system reply lands.
fn tick_until_reply(session: &mut ChatSession, start: Instant) {
    let mut now = start;
    let deadline = start + DWELL * (STAGE_COUNT as u32 + 4);
    while session.is_loading() {
        now += Duration::from_millis(5);
        session.poll(now);
        assert!(now <= deadline, "simulation never finished");
    }
}

// ============================================
// End-to-end conversation scenarios
// ============================================

#[test]
fn test_sales_conversation_end_to_end() {
    querymuse_core::logging::init_test();

    let config = test_config();
    let mut session = ChatSession::new(&config.chat);
    let start = Instant::now();

    assert_eq!(
        session.submit("Show me sales by region", start),
        SubmitOutcome::Accepted
    );

    // The user message is visible immediately, before any polling
    assert_eq!(session.messages().len(), 1);
    assert_eq!(session.messages()[0].content, "Show me sales by region");

    // While thinking, the stage list tracks the active index
    session.poll(start + DWELL * 2);
    let stages = session.simulator().stages();
    assert_eq!(stages[0].status, StageStatus::Completed);
    assert_eq!(stages[2].status, StageStatus::Active);
    assert_eq!(stages[7].status, StageStatus::Pending);

    tick_until_reply(&mut session, start + DWELL * 2);

    let reply = session.messages().last().unwrap();
    assert_eq!(reply.kind, MessageKind::System);
    assert_eq!(reply.content, CANNED_RESPONSE);
    assert_eq!(reply.tool.as_deref(), Some(TOOL_LABEL));

    let rows = reply.table_rows.clone().expect("sales reply carries rows");
    assert_eq!(rows.len(), 3);

    // The attached rows feed straight into the table pipeline
    let mut view = TableView::new(rows, config.table.page_size, true);
    view.toggle_sort("region");
    let TableOutput::Page(page) = view.process() else {
        panic!("expected table data");
    };
    assert_eq!(page.filtered_count, 3);
    assert_eq!(page.page_count, 1);
    assert_eq!(page.rows[0].get("region").unwrap(), "Asia Pacific");
    assert_eq!(page.rows[2].get("region").unwrap(), "North America");

    let csv = view.export_csv();
    assert!(csv.starts_with("Region,Sales,Growth\n"));
    // Dollar amounts contain commas and come out quoted
    assert!(csv.contains("Asia Pacific,\"$1,200,000\",+22%"));
}

#[test]
fn test_plain_conversation_has_no_table() {
    let config = test_config();
    let mut session = ChatSession::new(&config.chat);
    let start = Instant::now();

    session.submit("hello", start);
    tick_until_reply(&mut session, start);

    let reply = session.messages().last().unwrap();
    assert_eq!(reply.kind, MessageKind::System);
    assert!(reply.table_rows.is_none());
}

#[test]
fn test_clear_after_several_turns() {
    let config = test_config();
    let mut session = ChatSession::new(&config.chat);

    for prompt in ["one", "two", "three"] {
        let start = Instant::now();
        assert_eq!(session.submit(prompt, start), SubmitOutcome::Accepted);
        tick_until_reply(&mut session, start);
    }
    assert_eq!(session.messages().len(), 6);

    session.clear();
    assert!(session.messages().is_empty());
}

// ============================================
// Sidebar stores driven alongside a session
// ============================================

#[test]
fn test_snapshot_flows_into_history() {
    let config = test_config();
    let mut session = ChatSession::new(&config.chat);
    let mut history =
        HistoryStore::with_samples(Duration::from_millis(config.history.search_delay_ms));

    let start = Instant::now();
    session.submit("Quarterly revenue breakdown", start);
    tick_until_reply(&mut session, start);

    let entry = session.snapshot_history("Quarterly Revenue").unwrap();
    history.add(entry);
    assert_eq!(history.len(), 6);

    // The snapshot is searchable like any seeded entry
    let now = Instant::now();
    history.search("quarterly", now);
    assert_eq!(history.entries().len(), 1);
    assert_eq!(history.entries()[0].title, "Quarterly Revenue");
    assert!(history.is_searching());
    assert!(history.poll(now + Duration::from_millis(30)));
    assert!(!history.is_searching());

    // Unmatched query: empty results, spinner still clears
    let now = Instant::now();
    history.search("zzz nothing", now);
    assert!(history.entries().is_empty());
    assert!(history.poll(now + Duration::from_millis(30)));
    assert!(!history.is_searching());

    // Fresh snapshot falls in every time window
    history.clear_search();
    history.set_time_filter(TimeFilter::Today);
    assert!(history
        .entries()
        .iter()
        .any(|e| e.title == "Quarterly Revenue"));
}

#[test]
fn test_bookmarking_a_reply() {
    let config = test_config();
    let mut session = ChatSession::new(&config.chat);
    let mut bookmarks = BookmarkStore::new();

    let start = Instant::now();
    session.submit("Show me sales", start);
    tick_until_reply(&mut session, start);

    let reply = session.messages().last().unwrap().clone();
    assert!(bookmarks.toggle(
        &reply.id,
        "Sales Reply",
        &reply.content,
        vec!["sales".to_string()],
    ));
    assert!(bookmarks.is_bookmarked(&reply.id));
    assert_eq!(bookmarks.filtered("", Some("sales")).len(), 1);

    // Toggle round-trips back to not-bookmarked
    assert!(!bookmarks.toggle(&reply.id, "Sales Reply", &reply.content, vec![]));
    assert!(!bookmarks.is_bookmarked(&reply.id));
}
