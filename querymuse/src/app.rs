//! Application state for the TUI.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use querymuse_core::history::TimeFilter;
use querymuse_core::table::SortDirection;
use querymuse_core::{BookmarkStore, ChatSession, Config, HistoryStore, SubmitOutcome, TableView};

/// Which panel has keyboard focus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Panel {
    /// Chat log and input line
    #[default]
    Chat,
    /// History search sidebar
    History,
    /// Bookmark manager sidebar
    Bookmarks,
}

impl Panel {
    fn next(self) -> Self {
        match self {
            Panel::Chat => Panel::History,
            Panel::History => Panel::Bookmarks,
            Panel::Bookmarks => Panel::Chat,
        }
    }
}

/// Main application state.
pub struct App {
    /// Chat session controller
    pub session: ChatSession,
    /// History sidebar store
    pub history: HistoryStore,
    /// Bookmark sidebar store
    pub bookmarks: BookmarkStore,
    /// Focused panel
    pub panel: Panel,
    /// Chat input line
    pub input: String,
    /// Sidebar search query (shared by history and bookmark panels)
    pub sidebar_query: String,
    /// Selected row in the history list
    pub history_selected: usize,
    /// Selected row in the bookmark list
    pub bookmark_selected: usize,
    /// Active bookmark tag filter
    pub bookmark_tag: Option<String>,
    /// Table view for the most recent reply that carried rows
    pub table: Option<TableView>,
    /// Transient status line (export confirmations, rejections)
    pub status: Option<String>,
    /// Whether the app should exit
    pub should_quit: bool,
    page_size: usize,
    export_dir: PathBuf,
}

impl App {
    /// Create the app with stores seeded from sample data.
    pub fn new(config: &Config) -> Self {
        Self {
            session: ChatSession::new(&config.chat),
            history: HistoryStore::with_samples(Duration::from_millis(
                config.history.search_delay_ms,
            )),
            bookmarks: BookmarkStore::with_samples(),
            panel: Panel::default(),
            input: String::new(),
            sidebar_query: String::new(),
            history_selected: 0,
            bookmark_selected: 0,
            bookmark_tag: None,
            table: None,
            status: None,
            should_quit: false,
            page_size: config.table.page_size,
            export_dir: Config::data_dir(),
        }
    }

    /// Advance timed state (thinking simulation, search spinner). Call every
    /// tick of the event loop.
    pub fn tick(&mut self, now: Instant) {
        let new_rows = self.session.poll(now).and_then(|m| m.table_rows.clone());
        if let Some(rows) = new_rows {
            self.table = Some(TableView::new(rows, self.page_size, true));
        }
        self.history.poll(now);
    }

    /// Handle a key event.
    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        self.status = None;

        // Global bindings first
        match key.code {
            KeyCode::Esc => {
                self.should_quit = true;
                return;
            }
            KeyCode::Tab => {
                self.panel = self.panel.next();
                self.sidebar_query.clear();
                self.history.clear_search();
                return;
            }
            _ => {}
        }

        match self.panel {
            Panel::Chat => self.handle_chat_key(key, now),
            Panel::History => self.handle_history_key(key, now),
            Panel::Bookmarks => self.handle_bookmark_key(key),
        }
    }

    fn handle_chat_key(&mut self, key: KeyEvent, now: Instant) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Enter => match self.session.submit(&self.input, now) {
                SubmitOutcome::Accepted => self.input.clear(),
                SubmitOutcome::RejectedBusy => {
                    self.status = Some("Still thinking, hold on...".to_string());
                }
                SubmitOutcome::RejectedEmpty => {}
            },
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char('l') if ctrl => {
                self.session.clear();
                self.table = None;
            }
            KeyCode::Char('b') if ctrl => self.bookmark_last_reply(),
            KeyCode::Char('e') if ctrl => self.export_table(),
            KeyCode::Char('n') if ctrl => {
                if let Some(table) = &mut self.table {
                    table.next_page();
                }
            }
            KeyCode::Char('p') if ctrl => {
                if let Some(table) = &mut self.table {
                    table.prev_page();
                }
            }
            KeyCode::Char('o') if ctrl => self.cycle_sort(),
            KeyCode::Char(c) if !ctrl => self.input.push(c),
            _ => {}
        }
    }

    fn handle_history_key(&mut self, key: KeyEvent, now: Instant) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Up => self.history_selected = self.history_selected.saturating_sub(1),
            KeyCode::Down => {
                let count = self.history.entries().len();
                if self.history_selected + 1 < count {
                    self.history_selected += 1;
                }
            }
            KeyCode::Delete => {
                let id = self
                    .history
                    .entries()
                    .get(self.history_selected)
                    .map(|e| e.id.clone());
                if let Some(id) = id {
                    if let Err(e) = self.history.delete(&id) {
                        tracing::warn!(error = %e, "History delete failed");
                    }
                    self.history_selected = self.history_selected.saturating_sub(1);
                }
            }
            KeyCode::Char('t') if ctrl => self.cycle_time_filter(),
            KeyCode::Backspace => {
                self.sidebar_query.pop();
                self.history.search(self.sidebar_query.clone(), now);
                self.history_selected = 0;
            }
            KeyCode::Char(c) if !ctrl => {
                self.sidebar_query.push(c);
                self.history.search(self.sidebar_query.clone(), now);
                self.history_selected = 0;
            }
            _ => {}
        }
    }

    fn handle_bookmark_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Up => self.bookmark_selected = self.bookmark_selected.saturating_sub(1),
            KeyCode::Down => {
                let count = self.visible_bookmarks().len();
                if self.bookmark_selected + 1 < count {
                    self.bookmark_selected += 1;
                }
            }
            KeyCode::Delete => {
                let id = self
                    .visible_bookmarks()
                    .get(self.bookmark_selected)
                    .map(|b| b.id.clone());
                if let Some(id) = id {
                    if let Err(e) = self.bookmarks.remove(&id) {
                        tracing::warn!(error = %e, "Bookmark delete failed");
                    }
                    self.bookmark_selected = self.bookmark_selected.saturating_sub(1);
                }
            }
            KeyCode::Char('t') if ctrl => self.cycle_tag_filter(),
            KeyCode::Backspace => {
                self.sidebar_query.pop();
                self.bookmark_selected = 0;
            }
            KeyCode::Char(c) if !ctrl => {
                self.sidebar_query.push(c);
                self.bookmark_selected = 0;
            }
            _ => {}
        }
    }

    /// Bookmarks matching the sidebar query and tag filter.
    pub fn visible_bookmarks(&self) -> Vec<querymuse_core::Bookmark> {
        self.bookmarks
            .filtered(&self.sidebar_query, self.bookmark_tag.as_deref())
            .into_iter()
            .cloned()
            .collect()
    }

    /// Toggle a bookmark on the most recent system reply.
    fn bookmark_last_reply(&mut self) {
        let reply = self
            .session
            .messages()
            .iter()
            .rev()
            .find(|m| m.kind == querymuse_core::MessageKind::System && !m.error)
            .cloned();
        let Some(reply) = reply else {
            self.status = Some("Nothing to bookmark yet".to_string());
            return;
        };

        let title = reply.content.chars().take(40).collect::<String>();
        let added = self
            .bookmarks
            .toggle(&reply.id, title, &reply.content, Vec::new());
        self.status = Some(if added {
            "Bookmarked reply".to_string()
        } else {
            "Removed bookmark".to_string()
        });
    }

    /// Export the current table as CSV into the data directory.
    fn export_table(&mut self) {
        let Some(table) = &self.table else {
            self.status = Some("No table to export".to_string());
            return;
        };
        match table.export_to_file(&self.export_dir) {
            Ok(path) => self.status = Some(format!("Exported {}", path.display())),
            Err(e) => {
                tracing::warn!(error = %e, "CSV export failed");
                self.status = Some(format!("Export failed: {}", e));
            }
        }
    }

    /// Advance the sort selection: ascending, then descending, then the next
    /// sortable column.
    fn cycle_sort(&mut self) {
        let Some(table) = &mut self.table else {
            return;
        };
        let keys: Vec<String> = table
            .columns()
            .iter()
            .filter(|c| c.sortable)
            .map(|c| c.key.clone())
            .collect();
        if keys.is_empty() {
            return;
        }

        let current = table.sort_field().map(|s| s.to_string());
        let direction = table.sort_direction();
        match current {
            None => table.toggle_sort(&keys[0]),
            Some(current) if direction == SortDirection::Ascending => {
                table.toggle_sort(&current);
            }
            Some(current) => {
                let pos = keys.iter().position(|k| *k == current).unwrap_or(0);
                let next = keys[(pos + 1) % keys.len()].clone();
                table.toggle_sort(&next);
            }
        }
    }

    fn cycle_time_filter(&mut self) {
        let current = self.history.time_filter();
        let pos = TimeFilter::ALL
            .iter()
            .position(|f| *f == current)
            .unwrap_or(0);
        let next = TimeFilter::ALL[(pos + 1) % TimeFilter::ALL.len()];
        self.history.set_time_filter(next);
        self.history_selected = 0;
    }

    fn cycle_tag_filter(&mut self) {
        let tags = self.bookmarks.all_tags();
        self.bookmark_tag = match &self.bookmark_tag {
            None => tags.first().cloned(),
            Some(current) => {
                let pos = tags.iter().position(|t| t == current);
                match pos {
                    Some(pos) if pos + 1 < tags.len() => Some(tags[pos + 1].clone()),
                    _ => None,
                }
            }
        };
        self.bookmark_selected = 0;
    }

    /// Snapshot the current conversation into history before exit.
    pub fn shutdown(&mut self) -> Result<()> {
        if let Some(entry) = self.session.snapshot_history("Session snapshot") {
            self.history.add(entry);
        }
        self.session.dispose();
        Ok(())
    }
}
