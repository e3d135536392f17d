pub mod backend;
pub mod config;
pub mod controller;
pub mod error;
pub mod input;
pub mod state;

// Re-export main types for convenience
pub use backend::{ChatBackend, ChatReply, ChatRequest, HttpChatBackend};
pub use config::Config;
pub use controller::{
    ChatController, CycleId, CycleOutcome, Resolution, SendStatus, DEFAULT_FALLBACK_MESSAGE,
};
pub use error::ChatError;
pub use input::InputField;
pub use state::{ConversationLog, Entry, Message, Origin, PendingHandle};
