//! Bookmark store
//!
//! In-memory collection of saved message excerpts. The store enforces one
//! bookmark per source message at the `add` boundary, which keeps
//! `is_bookmarked` and `toggle` unambiguous. Nothing persists across process
//! restarts.

use crate::error::{Error, Result};
use crate::samples;
use crate::types::Bookmark;

/// In-memory store of bookmarked message excerpts
#[derive(Debug, Default)]
pub struct BookmarkStore {
    bookmarks: Vec<Bookmark>,
}

impl BookmarkStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with the sample bookmarks
    pub fn with_samples() -> Self {
        Self {
            bookmarks: samples::sample_bookmarks(),
        }
    }

    /// Bookmark a message. Returns false without modifying the store when
    /// the message is already bookmarked.
    pub fn add(
        &mut self,
        message_id: &str,
        title: impl Into<String>,
        content: impl Into<String>,
        tags: Vec<String>,
    ) -> bool {
        if self.is_bookmarked(message_id) {
            tracing::debug!(message_id, "Message already bookmarked, add ignored");
            return false;
        }
        self.bookmarks
            .insert(0, Bookmark::new(message_id, title, content, tags));
        true
    }

    /// Remove a bookmark by its own id
    pub fn remove(&mut self, bookmark_id: &str) -> Result<()> {
        let before = self.bookmarks.len();
        self.bookmarks.retain(|b| b.id != bookmark_id);
        if self.bookmarks.len() == before {
            return Err(Error::BookmarkNotFound(bookmark_id.to_string()));
        }
        Ok(())
    }

    /// Whether a bookmark exists for this source message
    pub fn is_bookmarked(&self, message_id: &str) -> bool {
        self.bookmarks.iter().any(|b| b.message_id == message_id)
    }

    /// Add if absent, remove if present. Returns true when the message ends
    /// up bookmarked.
    pub fn toggle(
        &mut self,
        message_id: &str,
        title: impl Into<String>,
        content: impl Into<String>,
        tags: Vec<String>,
    ) -> bool {
        if self.is_bookmarked(message_id) {
            self.bookmarks.retain(|b| b.message_id != message_id);
            false
        } else {
            self.add(message_id, title, content, tags)
        }
    }

    /// All bookmarks, newest first
    pub fn bookmarks(&self) -> &[Bookmark] {
        &self.bookmarks
    }

    /// Unique tags across every bookmark, in first-seen order
    pub fn all_tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = Vec::new();
        for bookmark in &self.bookmarks {
            for tag in &bookmark.tags {
                if !tags.contains(tag) {
                    tags.push(tag.clone());
                }
            }
        }
        tags
    }

    /// Bookmarks matching a substring query over title/content plus an
    /// optional tag. Empty query and `None` tag match everything.
    pub fn filtered(&self, query: &str, tag: Option<&str>) -> Vec<&Bookmark> {
        let needle = query.to_lowercase();
        self.bookmarks
            .iter()
            .filter(|b| {
                needle.is_empty()
                    || b.title.to_lowercase().contains(&needle)
                    || b.content.to_lowercase().contains(&needle)
            })
            .filter(|b| tag.map_or(true, |tag| b.tags.iter().any(|t| t == tag)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.bookmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookmarks.is_empty()
    }
}
