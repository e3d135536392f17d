//! The send cycle
//!
//! A cycle runs `Idle -> AwaitingReply -> Idle`. [`ChatController::send_message`]
//! does the synchronous half (user message, cleared input, pending indicator)
//! and spawns the request. The outcome comes back over an mpsc channel to
//! whoever owns the controller, which hands it to [`ChatController::resolve`].
//! Only one cycle may be outstanding; further triggers are refused until it
//! ends.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::AbortHandle;

use crate::backend::{ChatBackend, ChatReply, ChatRequest};
use crate::error::{ChatError, Result};
use crate::input::InputField;
use crate::state::{ConversationLog, Origin, PendingHandle};

pub const DEFAULT_FALLBACK_MESSAGE: &str = "Üzgünüm, bir hata oluştu. Lütfen tekrar deneyin.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CycleId(u64);

/// Result of one backend request, tagged with the cycle that issued it
#[derive(Debug)]
pub struct CycleOutcome {
    pub cycle: CycleId,
    pub result: Result<ChatReply>,
}

/// What a trigger did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendStatus {
    Started(CycleId),
    /// Blank text, nothing happened
    Empty,
    /// A reply is still outstanding, nothing happened
    Busy,
}

/// How a cycle ended, as seen by [`ChatController::resolve`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Replied,
    Failed,
    /// Outcome for a cycle that is no longer in flight
    Stale,
}

struct InFlight {
    cycle: CycleId,
    indicator: PendingHandle,
    task: AbortHandle,
}

pub struct ChatController {
    backend: Arc<dyn ChatBackend>,
    outcomes: mpsc::UnboundedSender<CycleOutcome>,
    log: ConversationLog,
    input: InputField,
    shortcuts: Vec<String>,
    fallback_message: String,
    in_flight: Option<InFlight>,
    next_cycle: u64,
}

impl ChatController {
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        outcomes: mpsc::UnboundedSender<CycleOutcome>,
        shortcuts: Vec<String>,
    ) -> Self {
        Self {
            backend,
            outcomes,
            log: ConversationLog::new(),
            input: InputField::new(),
            shortcuts,
            fallback_message: DEFAULT_FALLBACK_MESSAGE.to_string(),
            in_flight: None,
            next_cycle: 0,
        }
    }

    pub fn with_fallback_message(mut self, message: impl Into<String>) -> Self {
        self.fallback_message = message.into();
        self
    }

    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    pub fn log_mut(&mut self) -> &mut ConversationLog {
        &mut self.log
    }

    pub fn input(&self) -> &InputField {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputField {
        &mut self.input
    }

    pub fn shortcuts(&self) -> &[String] {
        &self.shortcuts
    }

    pub fn fallback_message(&self) -> &str {
        &self.fallback_message
    }

    pub fn is_awaiting_reply(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn append_message(&mut self, content: impl Into<String>, origin: Origin) {
        self.log.append_message(content, origin);
    }

    pub fn show_pending_indicator(&mut self) -> PendingHandle {
        self.log.show_pending()
    }

    /// Send button and Enter key
    pub fn submit_input(&mut self) -> SendStatus {
        let text = self.input.value().to_string();
        self.send_message(text)
    }

    /// Shortcut bubble: the input mirrors what gets sent
    pub fn select_shortcut(&mut self, index: usize) -> Option<SendStatus> {
        let text = self.shortcuts.get(index)?.clone();
        self.input.set_value(&text);
        Some(self.send_message(text))
    }

    /// Start a send cycle. Must be called inside a tokio runtime.
    pub fn send_message(&mut self, text: impl Into<String>) -> SendStatus {
        let text = text.into();
        if is_blank(&text) {
            return SendStatus::Empty;
        }
        if self.in_flight.is_some() {
            log::debug!("ignoring send while a reply is outstanding");
            return SendStatus::Busy;
        }

        self.log.append_message(text.as_str(), Origin::User);
        self.input.clear();
        let indicator = self.log.show_pending();

        let cycle = CycleId(self.next_cycle);
        self.next_cycle += 1;

        let backend = Arc::clone(&self.backend);
        let outcomes = self.outcomes.clone();
        let request = ChatRequest { message: text };
        log::debug!("cycle {} started", cycle.0);

        let task = tokio::spawn(async move {
            let result = backend.send(&request).await;
            // Receiver gone means the front-end shut down
            let _ = outcomes.send(CycleOutcome { cycle, result });
        });

        self.in_flight = Some(InFlight {
            cycle,
            indicator,
            task: task.abort_handle(),
        });

        SendStatus::Started(cycle)
    }

    /// Finish the cycle an outcome belongs to
    pub fn resolve(&mut self, outcome: CycleOutcome) -> Resolution {
        let in_flight = match self.in_flight.take() {
            Some(in_flight) if in_flight.cycle == outcome.cycle => in_flight,
            other => {
                self.in_flight = other;
                log::debug!("dropping outcome for finished cycle {}", outcome.cycle.0);
                return Resolution::Stale;
            }
        };

        self.log.remove_pending(in_flight.indicator);

        match outcome.result {
            Ok(reply) => {
                log::debug!("cycle {} replied", outcome.cycle.0);
                self.log.append_message(reply.response, Origin::Assistant);
                Resolution::Replied
            }
            Err(e) => {
                log::error!("{}", e);
                self.log.append_message(self.fallback_message.as_str(), Origin::Assistant);
                Resolution::Failed
            }
        }
    }

    /// Abort the outstanding request, if any. The cycle ends through the
    /// failure path.
    pub fn cancel(&mut self) -> Option<Resolution> {
        let in_flight = self.in_flight.as_ref()?;
        in_flight.task.abort();
        let cycle = in_flight.cycle;
        Some(self.resolve(CycleOutcome {
            cycle,
            result: Err(ChatError::Cancelled),
        }))
    }
}

/// Whitespace-only text, counting a stray byte order mark as whitespace
fn is_blank(text: &str) -> bool {
    text.chars().all(|c| c.is_whitespace() || c == '\u{feff}')
}

impl Drop for ChatController {
    fn drop(&mut self) {
        if let Some(in_flight) = &self.in_flight {
            in_flight.task.abort();
        }
    }
}
