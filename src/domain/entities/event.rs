use serde::Serialize;

use super::{GroupNotification, Message};

/// Connection-state notifications emitted by a session client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// Pairing challenge that must be confirmed out of band
    Qr(String),
    Authenticated,
    Ready,
    Disconnected(String),
    AuthFailure(String),
}

/// Notifications that need application-level handling
#[derive(Debug, Clone)]
pub enum InboundEvent {
    Message(Message),
    GroupJoin(GroupNotification),
    GroupLeave(GroupNotification),
}

/// Everything a session client can emit
#[derive(Debug, Clone)]
pub enum SessionEvent {
    Lifecycle(LifecycleEvent),
    Inbound(InboundEvent),
}

impl From<LifecycleEvent> for SessionEvent {
    fn from(event: LifecycleEvent) -> Self {
        SessionEvent::Lifecycle(event)
    }
}

impl From<InboundEvent> for SessionEvent {
    fn from(event: InboundEvent) -> Self {
        SessionEvent::Inbound(event)
    }
}

/// Event category names, as used in logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Qr,
    Ready,
    Authenticated,
    AuthFailure,
    Disconnected,
    Message,
    GroupJoin,
    GroupLeave,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Qr => "qr",
            EventKind::Ready => "ready",
            EventKind::Authenticated => "authenticated",
            EventKind::AuthFailure => "auth_failure",
            EventKind::Disconnected => "disconnected",
            EventKind::Message => "message",
            EventKind::GroupJoin => "group_join",
            EventKind::GroupLeave => "group_leave",
        }
    }
}

impl SessionEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            SessionEvent::Lifecycle(LifecycleEvent::Qr(_)) => EventKind::Qr,
            SessionEvent::Lifecycle(LifecycleEvent::Authenticated) => EventKind::Authenticated,
            SessionEvent::Lifecycle(LifecycleEvent::Ready) => EventKind::Ready,
            SessionEvent::Lifecycle(LifecycleEvent::Disconnected(_)) => EventKind::Disconnected,
            SessionEvent::Lifecycle(LifecycleEvent::AuthFailure(_)) => EventKind::AuthFailure,
            SessionEvent::Inbound(InboundEvent::Message(_)) => EventKind::Message,
            SessionEvent::Inbound(InboundEvent::GroupJoin(_)) => EventKind::GroupJoin,
            SessionEvent::Inbound(InboundEvent::GroupLeave(_)) => EventKind::GroupLeave,
        }
    }
}

/// Session state as last observed from lifecycle events
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionStatus {
    Starting,
    AwaitingQr { qr: String },
    Authenticated,
    Ready,
    AuthFailed { reason: String },
    Disconnected { reason: String },
}

impl SessionStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, SessionStatus::Ready)
    }
}

impl From<&LifecycleEvent> for SessionStatus {
    fn from(event: &LifecycleEvent) -> Self {
        match event {
            LifecycleEvent::Qr(qr) => SessionStatus::AwaitingQr { qr: qr.clone() },
            LifecycleEvent::Authenticated => SessionStatus::Authenticated,
            LifecycleEvent::Ready => SessionStatus::Ready,
            LifecycleEvent::Disconnected(reason) => SessionStatus::Disconnected { reason: reason.clone() },
            LifecycleEvent::AuthFailure(reason) => SessionStatus::AuthFailed { reason: reason.clone() },
        }
    }
}
