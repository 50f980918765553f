//! Core domain types for querymuse
//!
//! These types model the conversational surface of the assistant demo:
//! the message log, saved history entries, bookmarks, tabular results,
//! and the staged thinking indicator.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Message** | One entry in the chat log, authored by the user or the system |
//! | **HistoryEntry** | A saved conversation summary shown in the sidebar |
//! | **Bookmark** | A saved excerpt of a system message, keyed by message id |
//! | **Row** | One line of tabular output: column key to display value |
//! | **Stage** | One step of the simulated multi-phase thinking indicator |
//!
//! Messages are immutable once appended. The log is append-only except for
//! the full-clear operation on the session controller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One line of tabular output: a mapping from column key to display value.
///
/// Values stay as JSON so numeric cells keep their numeric type for sorting.
pub type Row = serde_json::Map<String, serde_json::Value>;

// ============================================
// Messages
// ============================================

/// Who authored a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Typed by the human
    User,
    /// Produced by the assistant pipeline
    System,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::User => "user",
            MessageKind::System => "system",
        }
    }
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for MessageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(MessageKind::User),
            "system" => Ok(MessageKind::System),
            _ => Err(format!("unknown message kind: {}", s)),
        }
    }
}

/// A message within the chat log (the core unit of the conversation).
///
/// Immutable once created; the log never mutates or removes individual
/// messages, only appends or clears wholesale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique identifier within the log
    pub id: String,
    /// Who authored this message
    pub kind: MessageKind,
    /// Text content
    pub content: String,
    /// When the message was appended
    pub timestamp: DateTime<Utc>,
    /// Tool label for system messages (e.g. "NL2SQL → Oracle DB")
    pub tool: Option<String>,
    /// Tabular rows attached to a system message
    pub table_rows: Option<Vec<Row>>,
    /// True when this message reports a response failure
    pub error: bool,
}

impl Message {
    /// Create a user message with a fresh id
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind: MessageKind::User,
            content: content.into(),
            timestamp: Utc::now(),
            tool: None,
            table_rows: None,
            error: false,
        }
    }

    /// Create a system message with a fresh id
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind: MessageKind::System,
            content: content.into(),
            timestamp: Utc::now(),
            tool: None,
            table_rows: None,
            error: false,
        }
    }

    /// Attach a tool label
    pub fn with_tool(mut self, tool: impl Into<String>) -> Self {
        self.tool = Some(tool.into());
        self
    }

    /// Attach tabular rows
    pub fn with_rows(mut self, rows: Vec<Row>) -> Self {
        self.table_rows = Some(rows);
        self
    }

    /// Mark this message as a failure report
    pub fn as_error(mut self) -> Self {
        self.error = true;
        self
    }

    /// Check whether this message carries tabular results
    pub fn has_table(&self) -> bool {
        self.table_rows.as_ref().is_some_and(|rows| !rows.is_empty())
    }
}

// ============================================
// History
// ============================================

/// A saved conversation summary shown in the sidebar.
///
/// Searchable by substring over `title` and `preview`; deletable
/// individually from the history store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Unique identifier
    pub id: String,
    /// Display title
    pub title: String,
    /// When the conversation happened
    pub timestamp: DateTime<Utc>,
    /// First prompt of the conversation, used as the preview line
    pub preview: String,
    /// Embedded message log snapshot
    pub messages: Vec<Message>,
}

impl HistoryEntry {
    /// Create an entry with a fresh id and the current time
    pub fn new(title: impl Into<String>, preview: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            timestamp: Utc::now(),
            preview: preview.into(),
            messages: Vec::new(),
        }
    }
}

// ============================================
// Bookmarks
// ============================================

/// A saved excerpt of a message, keyed by the source message id.
///
/// The store enforces at most one bookmark per source message, which keeps
/// the `is_bookmarked` predicate and `toggle` unambiguous.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bookmark {
    /// Unique identifier
    pub id: String,
    /// Id of the message this bookmark was created from
    pub message_id: String,
    /// Display title
    pub title: String,
    /// Saved excerpt content
    pub content: String,
    /// When the bookmark was created
    pub timestamp: DateTime<Utc>,
    /// Free-form tags for filtering
    pub tags: Vec<String>,
}

impl Bookmark {
    /// Create a bookmark with a fresh id and the current time
    pub fn new(
        message_id: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
        tags: Vec<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            message_id: message_id.into(),
            title: title.into(),
            content: content.into(),
            timestamp: Utc::now(),
            tags,
        }
    }
}

// ============================================
// Table Columns
// ============================================

/// One column of a results table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableColumn {
    /// Key into the row record
    pub key: String,
    /// Display header
    pub header: String,
    /// Whether clicking the header sorts by this column
    pub sortable: bool,
    /// Whether this column can be selected as the filter field
    pub filterable: bool,
}

impl TableColumn {
    /// Derive a column from a row key.
    ///
    /// The header capitalizes the first letter and inserts a space before
    /// each internal capital, so `growthRate` becomes `Growth Rate`.
    pub fn from_key(key: &str) -> Self {
        Self {
            key: key.to_string(),
            header: header_from_key(key),
            sortable: true,
            filterable: true,
        }
    }
}

/// Build a display header from a camelCase row key
fn header_from_key(key: &str) -> String {
    let mut header = String::with_capacity(key.len() + 4);
    for (i, ch) in key.chars().enumerate() {
        if i == 0 {
            header.extend(ch.to_uppercase());
        } else {
            if ch.is_uppercase() {
                header.push(' ');
            }
            header.push(ch);
        }
    }
    header
}

// ============================================
// Thinking Stages
// ============================================

/// Status of one thinking stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    /// Not yet reached
    Pending,
    /// Currently running
    Active,
    /// Finished
    Completed,
    /// Failed
    Error,
}

impl StageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageStatus::Pending => "pending",
            StageStatus::Active => "active",
            StageStatus::Completed => "completed",
            StageStatus::Error => "error",
        }
    }
}

impl std::str::FromStr for StageStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(StageStatus::Pending),
            "active" => Ok(StageStatus::Active),
            "completed" => Ok(StageStatus::Completed),
            "error" => Ok(StageStatus::Error),
            _ => Err(format!("unknown stage status: {}", s)),
        }
    }
}

/// One step of the simulated multi-phase thinking indicator.
///
/// Ephemeral: regenerated for every query, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThinkingStage {
    /// Stage identifier ("1".."8")
    pub id: String,
    /// Short title ("SQL Generation")
    pub title: String,
    /// Longer description shown under the title
    pub description: String,
    /// Current status
    pub status: StageStatus,
}
