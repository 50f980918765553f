//! Chat history store
//!
//! In-memory collection of past conversation summaries for the sidebar.
//! Search is synchronous substring matching over title and preview; the
//! "searching" spinner is a purely cosmetic delay driven by `poll(now)` from
//! the UI tick loop, matching the demo's simulated latency. Nothing persists
//! across process restarts.

use crate::error::{Error, Result};
use crate::samples;
use crate::types::HistoryEntry;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::time::{Duration, Instant};

/// Time-window filter for the history panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeFilter {
    /// Same calendar day
    Today,
    /// Last 7 days
    Week,
    /// Last 30 days
    Month,
    #[default]
    All,
}

impl TimeFilter {
    pub const ALL: [TimeFilter; 4] = [
        TimeFilter::Today,
        TimeFilter::Week,
        TimeFilter::Month,
        TimeFilter::All,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TimeFilter::Today => "Today",
            TimeFilter::Week => "Week",
            TimeFilter::Month => "Month",
            TimeFilter::All => "All",
        }
    }

    /// Whether `ts` falls inside this window relative to `now`
    pub fn contains(&self, ts: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match self {
            TimeFilter::Today => ts.date_naive() == now.date_naive(),
            TimeFilter::Week => ts >= now - ChronoDuration::days(7),
            TimeFilter::Month => ts >= now - ChronoDuration::days(30),
            TimeFilter::All => true,
        }
    }
}

/// In-memory store of saved conversations
#[derive(Debug)]
pub struct HistoryStore {
    entries: Vec<HistoryEntry>,
    search_query: String,
    time_filter: TimeFilter,
    search_delay: Duration,
    searching_until: Option<Instant>,
}

impl HistoryStore {
    /// Create an empty store with the given simulated search delay
    pub fn new(search_delay: Duration) -> Self {
        Self {
            entries: Vec::new(),
            search_query: String::new(),
            time_filter: TimeFilter::default(),
            search_delay,
            searching_until: None,
        }
    }

    /// Create a store seeded with the sample conversations
    pub fn with_samples(search_delay: Duration) -> Self {
        let mut store = Self::new(search_delay);
        store.entries = samples::sample_history();
        store
    }

    /// Record a search query and arm the simulated delay. The filtering
    /// itself is synchronous; only the spinner is delayed.
    pub fn search(&mut self, query: impl Into<String>, now: Instant) {
        self.search_query = query.into();
        self.searching_until = Some(now + self.search_delay);
        tracing::debug!(query = %self.search_query, "History search");
    }

    /// Clear the search query immediately (no simulated delay)
    pub fn clear_search(&mut self) {
        self.search_query.clear();
        self.searching_until = None;
    }

    /// Advance the simulated delay. Returns true when the spinner cleared
    /// on this poll.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.searching_until {
            Some(deadline) if now >= deadline => {
                self.searching_until = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_searching(&self) -> bool {
        self.searching_until.is_some()
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn time_filter(&self) -> TimeFilter {
        self.time_filter
    }

    pub fn set_time_filter(&mut self, filter: TimeFilter) {
        self.time_filter = filter;
    }

    /// Entries matching the current query and time window, newest first.
    pub fn entries(&self) -> Vec<&HistoryEntry> {
        self.entries_at(Utc::now())
    }

    /// Same as [`entries`](Self::entries) with an explicit reference time.
    pub fn entries_at(&self, now: DateTime<Utc>) -> Vec<&HistoryEntry> {
        let needle = self.search_query.to_lowercase();
        self.entries
            .iter()
            .filter(|entry| {
                needle.is_empty()
                    || entry.title.to_lowercase().contains(&needle)
                    || entry.preview.to_lowercase().contains(&needle)
            })
            .filter(|entry| self.time_filter.contains(entry.timestamp, now))
            .collect()
    }

    /// Prepend a conversation to the history
    pub fn add(&mut self, entry: HistoryEntry) {
        self.entries.insert(0, entry);
    }

    /// Delete a conversation by id
    pub fn delete(&mut self, id: &str) -> Result<()> {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        if self.entries.len() == before {
            return Err(Error::HistoryNotFound(id.to_string()));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
