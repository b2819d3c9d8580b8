use chrono::{DateTime, Duration, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use crate::application::errors::StorageError;
use crate::domain::entities::Message;

/// Aggregate counters shown on the dashboard
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub messages: i64,
    pub groups: i64,
    pub members: i64,
    pub joins: i64,
    pub leaves: i64,
    pub moderation_actions: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub chat_id: String,
    pub messages: i64,
    pub members: i64,
    pub first_seen: String,
}

/// Direction of a membership change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberEvent {
    Join,
    Leave,
}

impl MemberEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberEvent::Join => "join",
            MemberEvent::Leave => "leave",
        }
    }
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// SQLite-backed store shared by handlers and the dashboard
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (creating if needed) the database file and its schema
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StorageError> {
        let db = Self { conn: Mutex::new(conn) };
        db.init_tables()?;
        Ok(db)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn.lock().map_err(|_| StorageError::Poisoned)
    }

    fn init_tables(&self) -> Result<(), StorageError> {
        let conn = self.conn()?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS groups (
                chat_id TEXT PRIMARY KEY,
                first_seen TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS members (
                chat_id TEXT NOT NULL,
                user_id TEXT NOT NULL,
                joined_at TEXT NOT NULL,
                PRIMARY KEY (chat_id, user_id)
            );

            CREATE TABLE IF NOT EXISTS message_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                message_id TEXT NOT NULL,
                chat_id TEXT NOT NULL,
                sender_id TEXT NOT NULL,
                body TEXT NOT NULL,
                received_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS member_events (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                chat_id TEXT NOT NULL,
                user_id TEXT NOT NULL,
                kind TEXT NOT NULL,
                author TEXT,
                at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS moderation_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                chat_id TEXT NOT NULL,
                sender_id TEXT NOT NULL,
                message_id TEXT NOT NULL,
                reason TEXT NOT NULL,
                at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS group_settings (
                chat_id TEXT PRIMARY KEY,
                welcome_message TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_message_log_chat ON message_log(chat_id);
            CREATE INDEX IF NOT EXISTS idx_message_log_received ON message_log(received_at);",
        )?;
        Ok(())
    }

    fn touch_group(conn: &Connection, chat_id: &str, at: DateTime<Utc>) -> Result<(), StorageError> {
        conn.execute(
            "INSERT OR IGNORE INTO groups (chat_id, first_seen) VALUES (?1, ?2)",
            rusqlite::params![chat_id, timestamp(at)],
        )?;
        Ok(())
    }

    pub fn log_message(&self, message: &Message) -> Result<(), StorageError> {
        let conn = self.conn()?;
        if message.is_group {
            Self::touch_group(&conn, &message.chat_id, message.timestamp)?;
        }
        conn.execute(
            "INSERT INTO message_log (message_id, chat_id, sender_id, body, received_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
                message.id,
                message.chat_id,
                message.sender_id,
                message.body,
                timestamp(message.timestamp),
            ],
        )?;
        Ok(())
    }

    pub fn record_member_event(
        &self,
        chat_id: &str,
        user_id: &str,
        kind: MemberEvent,
        author: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let conn = self.conn()?;
        Self::touch_group(&conn, chat_id, at)?;

        match kind {
            MemberEvent::Join => {
                conn.execute(
                    "INSERT OR REPLACE INTO members (chat_id, user_id, joined_at) VALUES (?1, ?2, ?3)",
                    rusqlite::params![chat_id, user_id, timestamp(at)],
                )?;
            }
            MemberEvent::Leave => {
                conn.execute(
                    "DELETE FROM members WHERE chat_id = ?1 AND user_id = ?2",
                    [chat_id, user_id],
                )?;
            }
        }

        conn.execute(
            "INSERT INTO member_events (chat_id, user_id, kind, author, at) VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![chat_id, user_id, kind.as_str(), author, timestamp(at)],
        )?;
        Ok(())
    }

    pub fn log_moderation(&self, message: &Message, reason: &str) -> Result<(), StorageError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO moderation_log (chat_id, sender_id, message_id, reason, at) VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![message.chat_id, message.sender_id, message.id, reason, timestamp(Utc::now())],
        )?;
        Ok(())
    }

    pub fn set_welcome_message(&self, chat_id: &str, text: &str) -> Result<(), StorageError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO group_settings (chat_id, welcome_message) VALUES (?1, ?2)
             ON CONFLICT(chat_id) DO UPDATE SET welcome_message = excluded.welcome_message",
            [chat_id, text],
        )?;
        Ok(())
    }

    pub fn welcome_message(&self, chat_id: &str) -> Result<Option<String>, StorageError> {
        let conn = self.conn()?;
        let text = conn
            .query_row(
                "SELECT welcome_message FROM group_settings WHERE chat_id = ?1",
                [chat_id],
                |row| row.get::<_, Option<String>>(0),
            )
            .optional()?;
        Ok(text.flatten())
    }

    /// Delete message log rows older than `days`, returning how many went
    pub fn prune_messages(&self, days: u32) -> Result<usize, StorageError> {
        // A window reaching past the earliest representable time keeps everything
        let Some(cutoff) = Utc::now().checked_sub_signed(Duration::days(i64::from(days))) else {
            return Ok(0);
        };
        let conn = self.conn()?;
        let removed = conn.execute(
            "DELETE FROM message_log WHERE received_at < ?1",
            [timestamp(cutoff)],
        )?;
        Ok(removed)
    }

    pub fn stats(&self) -> Result<Stats, StorageError> {
        let conn = self.conn()?;
        let count = |sql: &str| -> Result<i64, StorageError> {
            Ok(conn.query_row(sql, [], |row| row.get(0))?)
        };

        Ok(Stats {
            messages: count("SELECT COUNT(*) FROM message_log")?,
            groups: count("SELECT COUNT(*) FROM groups")?,
            members: count("SELECT COUNT(*) FROM members")?,
            joins: count("SELECT COUNT(*) FROM member_events WHERE kind = 'join'")?,
            leaves: count("SELECT COUNT(*) FROM member_events WHERE kind = 'leave'")?,
            moderation_actions: count("SELECT COUNT(*) FROM moderation_log")?,
        })
    }

    pub fn group_summaries(&self) -> Result<Vec<GroupSummary>, StorageError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT g.chat_id,
                    (SELECT COUNT(*) FROM message_log m WHERE m.chat_id = g.chat_id),
                    (SELECT COUNT(*) FROM members mb WHERE mb.chat_id = g.chat_id),
                    g.first_seen
             FROM groups g
             ORDER BY g.first_seen, g.chat_id",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(GroupSummary {
                chat_id: row.get(0)?,
                messages: row.get(1)?,
                members: row.get(2)?,
                first_seen: row.get(3)?,
            })
        })?;

        let mut groups = Vec::new();
        for group in rows {
            groups.push(group?);
        }
        Ok(groups)
    }
}
