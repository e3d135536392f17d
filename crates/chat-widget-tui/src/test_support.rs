use std::sync::Arc;

use async_trait::async_trait;
use chat_widget_core::error::{Result, StatusCode};
use chat_widget_core::{
    ChatBackend, ChatController, ChatError, ChatReply, ChatRequest, Config, CycleOutcome,
};
use tokio::sync::mpsc;

use crate::app::App;

/// Backend that answers every request the same way
pub struct CannedBackend {
    reply: std::result::Result<String, u16>,
}

#[async_trait]
impl ChatBackend for CannedBackend {
    async fn send(&self, _request: &ChatRequest) -> Result<ChatReply> {
        match &self.reply {
            Ok(text) => Ok(ChatReply {
                response: text.clone(),
            }),
            Err(code) => Err(ChatError::Status(
                StatusCode::from_u16(*code).expect("valid status code"),
            )),
        }
    }
}

fn app_with(
    reply: std::result::Result<String, u16>,
) -> (App, mpsc::UnboundedReceiver<CycleOutcome>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let controller = ChatController::new(
        Arc::new(CannedBackend { reply }),
        tx,
        Config::new().shortcuts(),
    );
    (App::new(controller, "http://test".to_string()), rx)
}

pub fn app_with_reply(text: &str) -> (App, mpsc::UnboundedReceiver<CycleOutcome>) {
    app_with(Ok(text.to_string()))
}

pub fn app_with_status(code: u16) -> (App, mpsc::UnboundedReceiver<CycleOutcome>) {
    app_with(Err(code))
}
