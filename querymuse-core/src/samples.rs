//! Sample data seeding the demo
//!
//! In a real deployment these would come from a database; the demo seeds the
//! sidebar stores and the mock response tables from fixed values.

use crate::types::{Bookmark, HistoryEntry, Row};
use chrono::{Duration, Utc};
use serde_json::json;
use uuid::Uuid;

/// The fixed 3-region sales table attached to keyword-matched responses.
pub fn sales_rows() -> Vec<Row> {
    [
        ("North America", "$2,300,000", "+15%"),
        ("Europe", "$1,800,000", "+8%"),
        ("Asia Pacific", "$1,200,000", "+22%"),
    ]
    .into_iter()
    .map(|(region, sales, growth)| {
        let mut row = Row::new();
        row.insert("region".to_string(), json!(region));
        row.insert("sales".to_string(), json!(sales));
        row.insert("growth".to_string(), json!(growth));
        row
    })
    .collect()
}

/// Five sample conversations for the history sidebar.
pub fn sample_history() -> Vec<HistoryEntry> {
    let now = Utc::now();
    [
        (
            "MTD Collection Mumbai Analysis",
            "What is MTD collection in Mumbai?",
            Duration::minutes(30),
        ),
        (
            "Channel Performance Review",
            "Show budget achievement by channel",
            Duration::hours(2),
        ),
        (
            "Regional Persistency Analysis",
            "Which regions have highest persistency?",
            Duration::hours(4),
        ),
        (
            "Shortfall Analysis",
            "Best and worst channel in terms of shortfall",
            Duration::hours(6),
        ),
        (
            "LOB Refund Report",
            "What are the refund amounts by LOB?",
            Duration::hours(8),
        ),
    ]
    .into_iter()
    .map(|(title, preview, age)| HistoryEntry {
        id: Uuid::new_v4().to_string(),
        title: title.to_string(),
        timestamp: now - age,
        preview: preview.to_string(),
        messages: Vec::new(),
    })
    .collect()
}

/// Two sample bookmarks for the bookmark sidebar.
pub fn sample_bookmarks() -> Vec<Bookmark> {
    let now = Utc::now();
    vec![
        Bookmark {
            id: Uuid::new_v4().to_string(),
            message_id: "sample-message-1".to_string(),
            title: "MTD Collection Analysis".to_string(),
            content: "Based on your query, I found 15 sales records across 3 regions in Q2..."
                .to_string(),
            timestamp: now - Duration::hours(2),
            tags: vec![
                "collection".to_string(),
                "mumbai".to_string(),
                "mtd".to_string(),
            ],
        },
        Bookmark {
            id: Uuid::new_v4().to_string(),
            message_id: "sample-message-2".to_string(),
            title: "Channel Performance SQL".to_string(),
            content: "SELECT channel, SUM(actual), SUM(budget) FROM budget_achievement..."
                .to_string(),
            timestamp: now - Duration::hours(4),
            tags: vec![
                "channel".to_string(),
                "sql".to_string(),
                "performance".to_string(),
            ],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sales_rows_shape() {
        let rows = sales_rows();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].get("region").unwrap(), "North America");
        assert_eq!(rows[0].get("sales").unwrap(), "$2,300,000");
        assert_eq!(rows[2].get("growth").unwrap(), "+22%");
        assert!(rows.iter().all(|r| r.len() == 3));
    }

    #[test]
    fn test_sample_history_ordering() {
        let history = sample_history();
        assert_eq!(history.len(), 5);
        // Newest first
        for pair in history.windows(2) {
            assert!(pair[0].timestamp > pair[1].timestamp);
        }
    }

    #[test]
    fn test_sample_bookmarks_distinct_messages() {
        let bookmarks = sample_bookmarks();
        assert_eq!(bookmarks.len(), 2);
        assert_ne!(bookmarks[0].message_id, bookmarks[1].message_id);
    }
}
