//! Session client test double

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Mutex};

use crate::application::errors::SessionError;
use crate::domain::entities::LifecycleEvent;
use crate::domain::traits::{EventSender, SessionClient, SessionInfo};

/// Records every call; `connect` emits `ready` unless told to fail
#[derive(Default)]
pub struct RecordingSession {
    pub fail_connect: bool,
    pub fail_disconnect: bool,
    pub connects: AtomicUsize,
    pub disconnects: AtomicUsize,
    sent: Mutex<Vec<(String, String)>>,
    deleted: Mutex<Vec<(String, String)>>,
    /// Parked on a blocking thread after connect, like a stdin read
    blocking_read: Mutex<Option<mpsc::Receiver<()>>>,
}

impl RecordingSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_connect() -> Self {
        Self { fail_connect: true, ..Self::default() }
    }

    pub fn failing_disconnect() -> Self {
        Self { fail_disconnect: true, ..Self::default() }
    }

    /// `connect` starts a blocking read that only ends when `input` yields or closes
    pub fn with_blocking_reader(input: mpsc::Receiver<()>) -> Self {
        Self { blocking_read: Mutex::new(Some(input)), ..Self::default() }
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn deleted(&self) -> Vec<(String, String)> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl SessionClient for RecordingSession {
    async fn connect(&self, events: EventSender) -> Result<(), SessionError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if self.fail_connect {
            return Err(SessionError::Auth("pairing rejected".to_string()));
        }
        let input = self.blocking_read.lock().unwrap().take();
        if let Some(input) = input {
            tokio::task::spawn_blocking(move || {
                let _ = input.recv();
            });
        }
        let _ = events.send(LifecycleEvent::Ready.into());
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), SessionError> {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        if self.fail_disconnect {
            return Err(SessionError::Connection("browser already gone".to_string()));
        }
        Ok(())
    }

    async fn send_message(&self, chat_id: &str, text: &str) -> Result<String, SessionError> {
        self.sent.lock().unwrap().push((chat_id.to_string(), text.to_string()));
        Ok(format!("sent-{}", self.sent.lock().unwrap().len()))
    }

    async fn delete_message(&self, chat_id: &str, message_id: &str) -> Result<(), SessionError> {
        self.deleted.lock().unwrap().push((chat_id.to_string(), message_id.to_string()));
        Ok(())
    }

    fn info(&self) -> SessionInfo {
        SessionInfo {
            id: "recording".to_string(),
            name: "recording".to_string(),
            backend: "test".to_string(),
        }
    }
}
