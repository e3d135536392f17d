//! UI-agnostic conversation state
//!
//! The log is what every front-end renders: an ordered list of messages plus
//! at most one pending placeholder while a reply is outstanding.

use serde::{Deserialize, Serialize};

/// A single rendered chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub origin: Origin,
    pub content: String,
}

/// Who wrote a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Origin {
    User,
    Assistant,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            origin: Origin::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            origin: Origin::Assistant,
            content: content.into(),
        }
    }
}

/// One row of the conversation log
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Message(Message),
    /// Typing placeholder for an outstanding reply
    Pending(PendingId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PendingId(u64);

/// Proof that a pending indicator is live. Consumed by
/// [`ConversationLog::remove_pending`], so one indicator is removed once.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a pending indicator must be removed when its cycle ends"]
pub struct PendingHandle {
    id: PendingId,
}

impl PendingHandle {
    pub fn id(&self) -> PendingId {
        self.id
    }
}

/// Append-only conversation log, oldest entry first
#[derive(Debug, Default)]
pub struct ConversationLog {
    entries: Vec<Entry>,
    next_pending: u64,
    scroll_requested: bool,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Messages only, in display order
    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.entries.iter().filter_map(|entry| match entry {
            Entry::Message(message) => Some(message),
            Entry::Pending(_) => None,
        })
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages().last()
    }

    pub fn message_count(&self) -> usize {
        self.messages().count()
    }

    pub fn pending_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| matches!(entry, Entry::Pending(_)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn append_message(&mut self, content: impl Into<String>, origin: Origin) {
        self.entries.push(Entry::Message(Message {
            origin,
            content: content.into(),
        }));
        self.scroll_requested = true;
    }

    pub fn show_pending(&mut self) -> PendingHandle {
        let id = PendingId(self.next_pending);
        self.next_pending += 1;
        self.entries.push(Entry::Pending(id));
        self.scroll_requested = true;
        PendingHandle { id }
    }

    pub fn remove_pending(&mut self, handle: PendingHandle) {
        self.entries
            .retain(|entry| !matches!(entry, Entry::Pending(id) if *id == handle.id));
    }

    /// Drop every message. A live pending indicator stays, since only its
    /// own cycle may remove it.
    pub fn clear(&mut self) {
        self.entries.retain(|entry| matches!(entry, Entry::Pending(_)));
        self.scroll_requested = true;
    }

    /// Returns true once after any change that should bring the newest entry
    /// into view.
    pub fn take_scroll_request(&mut self) -> bool {
        std::mem::take(&mut self.scroll_requested)
    }
}
