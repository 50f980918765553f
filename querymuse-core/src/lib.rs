//! # querymuse-core
//!
//! Core library for querymuse - a conversational NL2SQL assistant demo.
//!
//! This library provides:
//! - Domain types for messages, history entries, bookmarks, and table rows
//! - The chat session controller and thinking-stage simulator
//! - The results-table pipeline (search, filter, sort, paginate, CSV export)
//! - In-memory history and bookmark stores
//! - Configuration management and logging infrastructure
//!
//! ## Architecture
//!
//! Everything here is presentation-free and client-side: responses are
//! mocked, no database or network backend exists, and timed behavior
//! (thinking stages, the history search spinner) is driven cooperatively by
//! `poll(now)` calls from the UI tick loop rather than by threads or timers.
//!
//! ## Example
//!
//! ```rust
//! use querymuse_core::{ChatSession, Config};
//! use std::time::Instant;
//!
//! let config = Config::default();
//! let mut session = ChatSession::new(&config.chat);
//! session.submit("Show me sales by region", Instant::now());
//! // The UI tick loop then calls session.poll(now) until the reply lands.
//! ```

// Re-export commonly used items at the crate root
pub use bookmarks::BookmarkStore;
pub use config::Config;
pub use error::{Error, Result};
pub use history::{HistoryStore, TimeFilter};
pub use session::{ChatSession, MockResponder, ResponseSource, SubmitOutcome};
pub use stages::{SimulatorUpdate, ThinkingSimulator, STAGE_COUNT};
pub use table::{ProcessedTable, SortDirection, TableOutput, TableView};
pub use types::*;

// Public modules
pub mod bookmarks;
pub mod config;
pub mod error;
pub mod format;
pub mod history;
pub mod logging;
pub mod samples;
pub mod session;
pub mod stages;
pub mod table;
pub mod types;
