use chrono::{DateTime, Utc};

/// Group membership change notification
#[derive(Debug, Clone)]
pub struct GroupNotification {
    pub chat_id: String,
    pub group_name: Option<String>,
    pub participants: Vec<String>,
    /// Admin who added/removed the participants, if not self-initiated
    pub author: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub raw: Option<serde_json::Value>,
}

impl GroupNotification {
    pub fn new(chat_id: impl Into<String>, participants: Vec<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            group_name: None,
            participants,
            author: None,
            timestamp: Utc::now(),
            raw: None,
        }
    }

    pub fn with_group_name(mut self, name: impl Into<String>) -> Self {
        self.group_name = Some(name.into());
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_raw(mut self, raw: serde_json::Value) -> Self {
        self.raw = Some(raw);
        self
    }
}
