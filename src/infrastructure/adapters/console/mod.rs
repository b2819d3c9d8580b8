//! Console session for development/testing
//!
//! Each stdin line becomes an inbound event:
//! - `>join <user>` / `>leave <user>`: membership change in the console group
//! - `>group <text>`: message posted in the console group
//! - anything else: direct message from the console user

use async_trait::async_trait;
use std::sync::Mutex;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;

use crate::application::errors::SessionError;
use crate::domain::entities::{GroupNotification, InboundEvent, LifecycleEvent, Message};
use crate::domain::traits::{BrowserProfile, EventSender, SessionClient, SessionInfo};

pub const CONSOLE_USER: &str = "console@c.us";
pub const CONSOLE_GROUP: &str = "console@g.us";

/// Session client reading events from stdin
pub struct ConsoleSession {
    info: SessionInfo,
    profile: BrowserProfile,
    events: Mutex<Option<EventSender>>,
    reader: Mutex<Option<JoinHandle<()>>>,
}

impl ConsoleSession {
    pub fn new(name: impl Into<String>, profile: BrowserProfile) -> Self {
        Self {
            info: SessionInfo {
                id: "console".to_string(),
                name: name.into(),
                backend: "console".to_string(),
            },
            profile,
            events: Mutex::new(None),
            reader: Mutex::new(None),
        }
    }

    fn sender(&self) -> Result<EventSender, SessionError> {
        self.events
            .lock()
            .map_err(|_| SessionError::Connection("session state poisoned".to_string()))?
            .clone()
            .ok_or(SessionError::NotConnected)
    }
}

/// Turn a console line into an inbound event
pub fn parse_line(line: &str) -> Option<InboundEvent> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };

    match head {
        ">join" if !rest.is_empty() => Some(InboundEvent::GroupJoin(
            GroupNotification::new(CONSOLE_GROUP, vec![rest.to_string()]),
        )),
        ">leave" if !rest.is_empty() => Some(InboundEvent::GroupLeave(
            GroupNotification::new(CONSOLE_GROUP, vec![rest.to_string()]),
        )),
        ">group" if !rest.is_empty() => Some(InboundEvent::Message(
            Message::new(CONSOLE_GROUP, CONSOLE_USER, rest).in_group(),
        )),
        _ => Some(InboundEvent::Message(Message::new(CONSOLE_USER, CONSOLE_USER, line))),
    }
}

#[async_trait]
impl SessionClient for ConsoleSession {
    async fn connect(&self, events: EventSender) -> Result<(), SessionError> {
        tracing::info!(
            "Starting console session (dev mode, headless={}, args={:?}, data_dir={})",
            self.profile.headless,
            self.profile.args,
            self.profile.data_dir.display()
        );
        tokio::fs::create_dir_all(&self.profile.data_dir).await?;

        let send = |event: LifecycleEvent| {
            events
                .send(event.into())
                .map_err(|_| SessionError::Connection("event channel closed".to_string()))
        };
        send(LifecycleEvent::Authenticated)?;
        send(LifecycleEvent::Ready)?;

        let tx = events.clone();
        let reader = tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        if let Some(event) = parse_line(&line) {
                            if tx.send(event.into()).is_err() {
                                break;
                            }
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        tracing::warn!("Console read failed: {}", e);
                        break;
                    }
                }
            }
        });

        *self.events
            .lock()
            .map_err(|_| SessionError::Connection("session state poisoned".to_string()))? = Some(events);
        *self.reader
            .lock()
            .map_err(|_| SessionError::Connection("session state poisoned".to_string()))? = Some(reader);
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), SessionError> {
        let reader = self.reader
            .lock()
            .map_err(|_| SessionError::Connection("session state poisoned".to_string()))?
            .take();
        if let Some(reader) = reader {
            reader.abort();
        }

        let events = self.events
            .lock()
            .map_err(|_| SessionError::Connection("session state poisoned".to_string()))?
            .take()
            .ok_or(SessionError::NotConnected)?;
        let _ = events.send(LifecycleEvent::Disconnected("logout".to_string()).into());
        Ok(())
    }

    async fn send_message(&self, chat_id: &str, text: &str) -> Result<String, SessionError> {
        self.sender()?;
        println!("[BOT -> {}] {}", chat_id, text);
        Ok(uuid::Uuid::new_v4().to_string())
    }

    async fn delete_message(&self, chat_id: &str, message_id: &str) -> Result<(), SessionError> {
        self.sender()?;
        println!("[BOT] deleted {} in {}", message_id, chat_id);
        Ok(())
    }

    fn info(&self) -> SessionInfo {
        self.info.clone()
    }
}
