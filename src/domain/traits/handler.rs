use async_trait::async_trait;
use std::sync::Arc;

use super::SessionClient;
use crate::application::errors::HandlerError;
use crate::domain::entities::{GroupNotification, Message};

/// Handles inbound chat messages
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle_message(&self, client: &dyn SessionClient, message: &Message) -> Result<(), HandlerError>;
}

/// Handles group membership changes
#[async_trait]
pub trait MembershipHandler: Send + Sync {
    async fn handle_new_member(&self, client: &dyn SessionClient, notification: &GroupNotification) -> Result<(), HandlerError>;

    async fn handle_member_leave(&self, client: &dyn SessionClient, notification: &GroupNotification) -> Result<(), HandlerError>;
}

/// Periodic automation started once the session is up
pub trait ScheduledTasks: Send + Sync {
    /// Spawn the scheduled work; the returned handle is aborted on shutdown
    fn start(&self, client: Arc<dyn SessionClient>) -> tokio::task::JoinHandle<()>;
}
