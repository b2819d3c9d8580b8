use async_trait::async_trait;
use std::sync::Arc;

use super::{CommandService, ModerationService};
use crate::application::errors::{CommandError, HandlerError};
use crate::domain::entities::Message;
use crate::domain::traits::{MessageHandler, SessionClient};
use crate::infrastructure::database::Database;

/// Service for processing inbound messages: logging, moderation, commands
pub struct MessageService {
    db: Arc<Database>,
    commands: CommandService,
    moderation: ModerationService,
}

impl MessageService {
    pub fn new(db: Arc<Database>, commands: CommandService, moderation: ModerationService) -> Self {
        Self { db, commands, moderation }
    }

    /// Delete and warn if the message breaks a group rule; true when it did
    async fn moderate(&self, client: &dyn SessionClient, message: &Message) -> Result<bool, HandlerError> {
        if !message.is_group || self.commands.is_admin(&message.sender_id) {
            return Ok(false);
        }

        let Some(violation) = self.moderation.check(&message.body) else {
            return Ok(false);
        };

        tracing::info!(
            "[{}] Removing message {} from {}: {}",
            message.chat_id,
            message.id,
            message.sender_id,
            violation.reason()
        );
        self.db.log_moderation(message, &violation.reason())?;
        client.delete_message(&message.chat_id, &message.id).await?;
        client.send_message(&message.chat_id, violation.warning()).await?;
        Ok(true)
    }
}

#[async_trait]
impl MessageHandler for MessageService {
    async fn handle_message(&self, client: &dyn SessionClient, message: &Message) -> Result<(), HandlerError> {
        if message.from_me {
            return Ok(());
        }

        tracing::debug!("[{}] {}: {}", message.chat_id, message.sender_id, message.preview());
        self.db.log_message(message)?;

        if self.moderate(client, message).await? {
            return Ok(());
        }

        let prefix = self.commands.prefix();
        let reply = match self.commands.handle(message) {
            Ok(reply) => reply,
            Err(CommandError::NotFound(name)) => {
                Some(format!("Unknown command: {}{}. Try {}help", prefix, name, prefix))
            }
            Err(CommandError::PermissionDenied) => Some("This command is for admins only.".to_string()),
            Err(CommandError::InvalidArgs(reason)) => Some(format!("Invalid arguments: {}", reason)),
            Err(e) => return Err(e.into()),
        };

        if let Some(reply) = reply {
            client.send_message(&message.chat_id, &reply).await?;
        }
        Ok(())
    }
}
