//! Application layer errors

use thiserror::Error;

/// Session client errors
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Session is not connected")]
    NotConnected,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by message, membership and scheduled handlers
#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Command execution errors
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Command not found: {0}")]
    NotFound(String),

    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Permission denied")]
    PermissionDenied,
}

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Database lock poisoned")]
    Poisoned,
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Fatal errors raised while bringing the bot up
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Database initialization failed: {0}")]
    Database(#[from] StorageError),

    #[error("HTTP server failed to bind {addr}: {source}")]
    HttpBind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Session client initialization failed: {0}")]
    Session(#[from] SessionError),
}
