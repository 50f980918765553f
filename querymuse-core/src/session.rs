//! Chat session controller
//!
//! `ChatSession` orchestrates a conversation: it appends user messages,
//! drives the thinking simulator, and appends exactly one system message per
//! submission once the simulation completes. The message log is append-only
//! except for the full-clear operation.
//!
//! The reply comes from a [`ResponseSource`], the seam where a real NL2SQL
//! backend would plug in. The demo ships [`MockResponder`], which always
//! returns the canned text; a failing source exercises the single recovery
//! branch (one error-flagged system message with fixed fallback text).

use crate::config::ChatConfig;
use crate::error::Result;
use crate::samples;
use crate::stages::{SimulatorUpdate, ThinkingSimulator};
use crate::types::{HistoryEntry, Message, MessageKind};
use std::time::{Duration, Instant};

/// Tool label attached to successful system messages
pub const TOOL_LABEL: &str = "NL2SQL → Oracle DB";

/// The canned reply standing in for a real backend answer
pub const CANNED_RESPONSE: &str = "Based on your query, I found 15 sales records across \
    3 regions in Q2. The highest performing region was North America with $2.3M in total sales.";

/// Fallback text for the error-flagged system message
pub const ERROR_RESPONSE: &str = "Sorry, I encountered an error processing your request.";

/// Source of assistant replies; the seam for a real backend.
pub trait ResponseSource {
    /// Produce a reply for the submitted prompt
    fn respond(&self, prompt: &str) -> Result<String>;
}

/// Default source: always returns the canned response.
#[derive(Debug, Default)]
pub struct MockResponder;

impl ResponseSource for MockResponder {
    fn respond(&self, _prompt: &str) -> Result<String> {
        Ok(CANNED_RESPONSE.to_string())
    }
}

/// Result of a submission attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// User message appended, thinking simulation started
    Accepted,
    /// Empty or whitespace-only input; nothing happened
    RejectedEmpty,
    /// A simulation is already in flight; nothing happened
    RejectedBusy,
}

/// Stateful controller for one chat conversation
pub struct ChatSession {
    messages: Vec<Message>,
    simulator: ThinkingSimulator,
    responder: Box<dyn ResponseSource>,
    table_keywords: Vec<String>,
    pending_prompt: Option<String>,
}

impl ChatSession {
    /// Create a session with the default mock responder
    pub fn new(config: &ChatConfig) -> Self {
        Self::with_responder(config, Box::new(MockResponder))
    }

    /// Create a session with an explicit response source
    pub fn with_responder(config: &ChatConfig, responder: Box<dyn ResponseSource>) -> Self {
        Self {
            messages: Vec::new(),
            simulator: ThinkingSimulator::new(Duration::from_millis(config.stage_dwell_ms)),
            responder,
            table_keywords: config.table_keywords.clone(),
            pending_prompt: None,
        }
    }

    /// Submit user input. Appends the user message synchronously and starts
    /// the thinking simulation; the system reply lands via [`poll`](Self::poll).
    ///
    /// Empty input and submissions while a simulation is in flight are
    /// rejected outright; the in-flight run is never preempted.
    pub fn submit(&mut self, text: &str, now: Instant) -> SubmitOutcome {
        let text = text.trim();
        if text.is_empty() {
            return SubmitOutcome::RejectedEmpty;
        }
        if self.simulator.is_running() {
            tracing::debug!("Submission rejected, response already in flight");
            return SubmitOutcome::RejectedBusy;
        }

        self.messages.push(Message::user(text));
        self.pending_prompt = Some(text.to_string());
        self.simulator.start(now);
        tracing::info!(chars = text.len(), "Prompt submitted");
        SubmitOutcome::Accepted
    }

    /// Advance the thinking simulation. When a run completes this appends
    /// exactly one system message (reply or error) and returns it.
    pub fn poll(&mut self, now: Instant) -> Option<&Message> {
        match self.simulator.poll(now)? {
            SimulatorUpdate::Stage(_) => None,
            SimulatorUpdate::Finished => {
                let prompt = self.pending_prompt.take().unwrap_or_default();
                let message = match self.responder.respond(&prompt) {
                    Ok(content) => {
                        let mut message = Message::system(content).with_tool(TOOL_LABEL);
                        if self.wants_table(&prompt) {
                            message = message.with_rows(samples::sales_rows());
                        }
                        message
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Response generation failed");
                        Message::system(ERROR_RESPONSE).as_error()
                    }
                };
                self.messages.push(message);
                self.messages.last()
            }
        }
    }

    /// Discard the entire message log unconditionally
    pub fn clear(&mut self) {
        tracing::info!(discarded = self.messages.len(), "Conversation cleared");
        self.messages.clear();
    }

    /// Tear down the session: cancel any in-flight simulation and drop the
    /// pending prompt. The log is left intact for a final snapshot.
    pub fn dispose(&mut self) {
        self.simulator.reset();
        self.pending_prompt = None;
    }

    /// The ordered message log
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Whether a response is in flight
    pub fn is_loading(&self) -> bool {
        self.simulator.is_running()
    }

    /// The thinking simulator, for rendering stage progress
    pub fn simulator(&self) -> &ThinkingSimulator {
        &self.simulator
    }

    /// Snapshot the conversation as a history entry titled `title`, using
    /// the first user prompt as the preview. Returns None for an empty log.
    pub fn snapshot_history(&self, title: impl Into<String>) -> Option<HistoryEntry> {
        let preview = self
            .messages
            .iter()
            .find(|m| m.kind == MessageKind::User)?
            .content
            .clone();
        let mut entry = HistoryEntry::new(title, preview);
        entry.messages = self.messages.clone();
        Some(entry)
    }

    /// Whether a prompt should carry the sample results table
    fn wants_table(&self, prompt: &str) -> bool {
        let prompt = prompt.to_lowercase();
        self.table_keywords
            .iter()
            .any(|keyword| prompt.contains(&keyword.to_lowercase()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::stages::STAGE_COUNT;

    struct FailingResponder;

    impl ResponseSource for FailingResponder {
        fn respond(&self, _prompt: &str) -> Result<String> {
            Err(Error::ResponseGeneration("backend unavailable".to_string()))
        }
    }

    fn fast_config() -> ChatConfig {
        ChatConfig {
            stage_dwell_ms: 10,
            ..ChatConfig::default()
        }
    }

    /// Drive the session until the reply lands, returning the final message.
    fn run_to_completion(session: &mut ChatSession, start: Instant) -> Message {
        let total = session.simulator().total_duration();
        let mut now = start;
        loop {
            now += Duration::from_millis(10);
            if let Some(message) = session.poll(now) {
                return message.clone();
            }
            assert!(now <= start + total + Duration::from_secs(1), "no reply");
        }
    }

    #[test]
    fn test_sales_prompt_attaches_table() {
        let mut session = ChatSession::new(&fast_config());
        let start = Instant::now();

        assert_eq!(
            session.submit("Show me sales by region", start),
            SubmitOutcome::Accepted
        );

        // User message appended immediately
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.messages()[0].kind, MessageKind::User);
        assert!(session.is_loading());

        let reply = run_to_completion(&mut session, start);
        assert_eq!(session.messages().len(), 2);
        assert_eq!(reply.kind, MessageKind::System);
        assert_eq!(reply.content, CANNED_RESPONSE);
        assert_eq!(reply.tool.as_deref(), Some(TOOL_LABEL));
        assert!(!reply.error);
        assert!(!session.is_loading());

        let rows = reply.table_rows.expect("sales prompt should attach rows");
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].get("region").unwrap(), "North America");
        assert_eq!(rows[0].get("sales").unwrap(), "$2,300,000");
        assert_eq!(rows[1].get("sales").unwrap(), "$1,800,000");
        assert_eq!(rows[2].get("growth").unwrap(), "+22%");
    }

    #[test]
    fn test_plain_prompt_has_no_table() {
        let mut session = ChatSession::new(&fast_config());
        let start = Instant::now();
        session.submit("hello", start);

        let reply = run_to_completion(&mut session, start);
        assert!(reply.table_rows.is_none());
        assert_eq!(reply.content, CANNED_RESPONSE);
    }

    #[test]
    fn test_table_keyword_case_insensitive() {
        let mut session = ChatSession::new(&fast_config());
        let start = Instant::now();
        session.submit("render a TABLE please", start);

        let reply = run_to_completion(&mut session, start);
        assert!(reply.has_table());
    }

    #[test]
    fn test_empty_submissions_rejected() {
        let mut session = ChatSession::new(&fast_config());
        let now = Instant::now();
        assert_eq!(session.submit("", now), SubmitOutcome::RejectedEmpty);
        assert_eq!(session.submit("   \n\t", now), SubmitOutcome::RejectedEmpty);
        assert!(session.messages().is_empty());
        assert!(!session.is_loading());
    }

    #[test]
    fn test_busy_submissions_rejected() {
        let mut session = ChatSession::new(&fast_config());
        let now = Instant::now();
        assert_eq!(session.submit("first", now), SubmitOutcome::Accepted);
        assert_eq!(session.submit("second", now), SubmitOutcome::RejectedBusy);
        // Only the accepted prompt is in the log
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.messages()[0].content, "first");
    }

    #[test]
    fn test_reply_arrives_after_full_dwell_only() {
        let config = fast_config();
        let mut session = ChatSession::new(&config);
        let start = Instant::now();
        session.submit("hello", start);

        let dwell = Duration::from_millis(config.stage_dwell_ms);
        // Just before the final stage expires: still thinking
        assert!(session.poll(start + dwell * (STAGE_COUNT as u32) - dwell / 2).is_none());
        assert!(session.is_loading());

        // Full dwell elapsed: reply lands
        assert!(session.poll(start + dwell * STAGE_COUNT as u32).is_some());
        assert_eq!(session.messages().len(), 2);
    }

    #[test]
    fn test_error_path_appends_flagged_message() {
        let mut session =
            ChatSession::with_responder(&fast_config(), Box::new(FailingResponder));
        let start = Instant::now();
        session.submit("Show me sales", start);

        let reply = run_to_completion(&mut session, start);
        assert!(reply.error);
        assert_eq!(reply.content, ERROR_RESPONSE);
        assert!(reply.table_rows.is_none());
        assert!(reply.tool.is_none());
        // Exactly one system message even on failure
        assert_eq!(session.messages().len(), 2);
    }

    #[test]
    fn test_clear_discards_everything() {
        let mut session = ChatSession::new(&fast_config());
        let start = Instant::now();
        session.submit("one", start);
        run_to_completion(&mut session, start);

        let start2 = Instant::now();
        session.submit("two", start2);
        run_to_completion(&mut session, start2);
        assert_eq!(session.messages().len(), 4);

        session.clear();
        assert!(session.messages().is_empty());

        // Clearing an empty log is fine too
        session.clear();
        assert!(session.messages().is_empty());
    }

    #[test]
    fn test_messages_append_in_submission_order() {
        let mut session = ChatSession::new(&fast_config());
        for prompt in ["alpha", "beta", "gamma"] {
            let start = Instant::now();
            session.submit(prompt, start);
            run_to_completion(&mut session, start);
        }

        let log = session.messages();
        assert_eq!(log.len(), 6);
        let kinds: Vec<_> = log.iter().map(|m| m.kind).collect();
        assert_eq!(
            kinds,
            vec![
                MessageKind::User,
                MessageKind::System,
                MessageKind::User,
                MessageKind::System,
                MessageKind::User,
                MessageKind::System,
            ]
        );
        assert_eq!(log[0].content, "alpha");
        assert_eq!(log[2].content, "beta");
        assert_eq!(log[4].content, "gamma");

        // Ids unique across the log
        let mut ids: Vec<_> = log.iter().map(|m| m.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 6);
    }

    #[test]
    fn test_dispose_cancels_in_flight_run() {
        let mut session = ChatSession::new(&fast_config());
        let start = Instant::now();
        session.submit("hello", start);
        assert!(session.is_loading());

        session.dispose();
        assert!(!session.is_loading());
        // No stray reply appears afterwards
        assert!(session.poll(start + Duration::from_secs(10)).is_none());
        assert_eq!(session.messages().len(), 1);
    }

    #[test]
    fn test_snapshot_history() {
        let mut session = ChatSession::new(&fast_config());
        assert!(session.snapshot_history("Untitled").is_none());

        let start = Instant::now();
        session.submit("Show me sales by region", start);
        run_to_completion(&mut session, start);

        let entry = session.snapshot_history("Sales by Region").unwrap();
        assert_eq!(entry.title, "Sales by Region");
        assert_eq!(entry.preview, "Show me sales by region");
        assert_eq!(entry.messages.len(), 2);
    }
}
