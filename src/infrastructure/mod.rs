//! Infrastructure layer - External concerns
//!
//! This layer contains:
//! - Config: Configuration loading
//! - Database: SQLite persistence
//! - HTTP: Status endpoint and dashboard
//! - Adapters: Session client backends

pub mod adapters;
pub mod config;
pub mod database;
pub mod http;
