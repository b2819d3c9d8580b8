use chrono::{DateTime, Utc};

/// An inbound chat message as delivered by the session client
#[derive(Debug, Clone)]
pub struct Message {
    pub id: String,
    pub chat_id: String,
    pub sender_id: String,
    pub body: String,
    pub from_me: bool,
    pub is_group: bool,
    pub timestamp: DateTime<Utc>,
    pub raw: Option<serde_json::Value>,
}

impl Message {
    pub fn new(chat_id: impl Into<String>, sender_id: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            chat_id: chat_id.into(),
            sender_id: sender_id.into(),
            body: body.into(),
            from_me: false,
            is_group: false,
            timestamp: Utc::now(),
            raw: None,
        }
    }

    pub fn in_group(mut self) -> Self {
        self.is_group = true;
        self
    }

    pub fn from_me(mut self) -> Self {
        self.from_me = true;
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_raw(mut self, raw: serde_json::Value) -> Self {
        self.raw = Some(raw);
        self
    }

    /// Short preview of the body for log lines
    pub fn preview(&self) -> String {
        let mut preview: String = self.body.chars().take(50).collect();
        if self.body.chars().count() > 50 {
            preview.push('…');
        }
        preview
    }
}
