//! Event dispatcher - Routes session events to handlers

use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::watch;

use crate::application::errors::HandlerError;
use crate::domain::entities::{InboundEvent, LifecycleEvent, SessionEvent, SessionStatus};
use crate::domain::traits::{EventReceiver, MembershipHandler, MessageHandler, SessionClient};

/// What happened to a single dispatched event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Lifecycle event, logged and published
    Logged,
    /// Inbound event handled successfully
    Handled,
    /// Handler failed or panicked; the error was logged and dropped
    Failed(String),
}

/// Event dispatcher - one isolated failure boundary per inbound event
pub struct EventDispatcher {
    client: Arc<dyn SessionClient>,
    messages: Arc<dyn MessageHandler>,
    members: Arc<dyn MembershipHandler>,
    status: watch::Sender<SessionStatus>,
}

impl EventDispatcher {
    pub fn new(
        client: Arc<dyn SessionClient>,
        messages: Arc<dyn MessageHandler>,
        members: Arc<dyn MembershipHandler>,
    ) -> Self {
        let (status, _) = watch::channel(SessionStatus::Starting);
        Self { client, messages, members, status }
    }

    /// Subscribe to session status changes
    pub fn status(&self) -> watch::Receiver<SessionStatus> {
        self.status.subscribe()
    }

    /// Drain `events` in order until every sender is gone
    pub async fn run(self, mut events: EventReceiver) {
        while let Some(event) = events.recv().await {
            self.dispatch(event).await;
        }
        tracing::debug!("Event channel closed, dispatcher stopping");
    }

    pub async fn dispatch(&self, event: SessionEvent) -> DispatchOutcome {
        let kind = event.kind();
        match event {
            SessionEvent::Lifecycle(event) => {
                self.on_lifecycle(&event);
                DispatchOutcome::Logged
            }
            SessionEvent::Inbound(event) => {
                match AssertUnwindSafe(self.on_inbound(&event)).catch_unwind().await {
                    Ok(Ok(())) => DispatchOutcome::Handled,
                    Ok(Err(e)) => {
                        tracing::error!("Error handling {} event: {}", kind.as_str(), e);
                        DispatchOutcome::Failed(e.to_string())
                    }
                    Err(panic) => {
                        let reason = panic_message(panic.as_ref());
                        tracing::error!("Handler panicked on {} event: {}", kind.as_str(), reason);
                        DispatchOutcome::Failed(reason)
                    }
                }
            }
        }
    }

    fn on_lifecycle(&self, event: &LifecycleEvent) {
        match event {
            LifecycleEvent::Qr(qr) => {
                tracing::info!("QR code received, scan it to link the session:\n{}", qr);
            }
            LifecycleEvent::Authenticated => tracing::info!("Session authenticated"),
            LifecycleEvent::Ready => tracing::info!("{} is ready", self.client.info().name),
            LifecycleEvent::Disconnected(reason) => tracing::warn!("Session disconnected: {}", reason),
            LifecycleEvent::AuthFailure(reason) => tracing::error!("Authentication failed: {}", reason),
        }
        self.status.send_replace(SessionStatus::from(event));
    }

    async fn on_inbound(&self, event: &InboundEvent) -> Result<(), HandlerError> {
        let client = self.client.as_ref();
        match event {
            InboundEvent::Message(message) => self.messages.handle_message(client, message).await,
            InboundEvent::GroupJoin(notification) => self.members.handle_new_member(client, notification).await,
            InboundEvent::GroupLeave(notification) => self.members.handle_member_leave(client, notification).await,
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
