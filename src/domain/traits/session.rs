use async_trait::async_trait;
use std::path::PathBuf;
use tokio::sync::mpsc;

use crate::application::errors::SessionError;
use crate::domain::entities::SessionEvent;

/// Channel a session client pushes lifecycle and inbound events into
pub type EventSender = mpsc::UnboundedSender<SessionEvent>;

/// Receiving half drained by the dispatcher
pub type EventReceiver = mpsc::UnboundedReceiver<SessionEvent>;

/// Session client - abstraction over the messaging backend
///
/// Implementations own the connection and any persisted credentials. Every
/// real-world occurrence is emitted exactly once on the sender passed to
/// [`SessionClient::connect`], in the order it happened.
#[async_trait]
pub trait SessionClient: Send + Sync {
    /// Open the session and start emitting events
    async fn connect(&self, events: EventSender) -> Result<(), SessionError>;

    /// Tear the session down
    async fn disconnect(&self) -> Result<(), SessionError>;

    /// Send a text message, returning the backend's message id
    async fn send_message(&self, chat_id: &str, text: &str) -> Result<String, SessionError>;

    /// Delete a message for everyone in the chat
    async fn delete_message(&self, chat_id: &str, message_id: &str) -> Result<(), SessionError>;

    /// Session information
    fn info(&self) -> SessionInfo;
}

/// Session information
#[derive(Debug, Clone)]
pub struct SessionInfo {
    pub id: String,
    pub name: String,
    pub backend: String,
}

/// Fixed browser profile handed to automation backends at construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserProfile {
    pub headless: bool,
    pub args: Vec<String>,
    /// Where the backend persists its session credentials
    pub data_dir: PathBuf,
}

impl Default for BrowserProfile {
    fn default() -> Self {
        Self {
            headless: true,
            args: vec![
                "--no-sandbox".to_string(),
                "--disable-setuid-sandbox".to_string(),
            ],
            data_dir: PathBuf::from(".session"),
        }
    }
}
