use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::application::errors::HandlerError;
use crate::domain::entities::GroupNotification;
use crate::domain::traits::{MembershipHandler, ScheduledTasks, SessionClient};
use crate::infrastructure::config::AutomationConfig;
use crate::infrastructure::database::{Database, MemberEvent};

/// Membership automation and periodic housekeeping
pub struct AutomationService {
    db: Arc<Database>,
    config: AutomationConfig,
}

impl AutomationService {
    pub fn new(db: Arc<Database>, config: AutomationConfig) -> Self {
        Self { db, config }
    }

    fn render(template: &str, user_id: &str, notification: &GroupNotification) -> String {
        let user = format!("@{}", user_id.split('@').next().unwrap_or(user_id));
        let group = notification.group_name.as_deref().unwrap_or("the group");
        template.replace("{user}", &user).replace("{group}", group)
    }

    fn record(&self, notification: &GroupNotification, user_id: &str, kind: MemberEvent) -> Result<(), HandlerError> {
        self.db.record_member_event(
            &notification.chat_id,
            user_id,
            kind,
            notification.author.as_deref(),
            notification.timestamp,
        )?;
        Ok(())
    }
}

#[async_trait]
impl MembershipHandler for AutomationService {
    async fn handle_new_member(&self, client: &dyn SessionClient, notification: &GroupNotification) -> Result<(), HandlerError> {
        let template = match self.db.welcome_message(&notification.chat_id)? {
            Some(custom) => custom,
            None => self.config.welcome_message.clone(),
        };

        for user_id in &notification.participants {
            self.record(notification, user_id, MemberEvent::Join)?;
            tracing::info!("[{}] {} joined", notification.chat_id, user_id);

            if !template.is_empty() {
                let text = Self::render(&template, user_id, notification);
                client.send_message(&notification.chat_id, &text).await?;
            }
        }
        Ok(())
    }

    async fn handle_member_leave(&self, client: &dyn SessionClient, notification: &GroupNotification) -> Result<(), HandlerError> {
        for user_id in &notification.participants {
            self.record(notification, user_id, MemberEvent::Leave)?;
            tracing::info!("[{}] {} left", notification.chat_id, user_id);

            if !self.config.farewell_message.is_empty() {
                let text = Self::render(&self.config.farewell_message, user_id, notification);
                client.send_message(&notification.chat_id, &text).await?;
            }
        }
        Ok(())
    }
}

impl ScheduledTasks for AutomationService {
    fn start(&self, client: Arc<dyn SessionClient>) -> tokio::task::JoinHandle<()> {
        let db = Arc::clone(&self.db);
        let retention_days = self.config.retention_days;
        let period = Duration::from_secs(self.config.schedule_interval_seconds.max(1));

        tracing::info!("Scheduled tasks started (every {}s)", period.as_secs());
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // First tick completes immediately
            interval.tick().await;
            loop {
                interval.tick().await;
                match db.prune_messages(retention_days) {
                    Ok(0) => {}
                    Ok(removed) => tracing::info!("Pruned {} message log rows", removed),
                    Err(e) => tracing::warn!("Message log pruning failed: {}", e),
                }
                tracing::debug!("Heartbeat: session {} alive", client.info().name);
            }
        })
    }
}
