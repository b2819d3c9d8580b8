//! Domain layer - Core types with no infrastructure dependencies
//!
//! This layer contains:
//! - Entities: Messages, group notifications, session events, commands
//! - Traits: Abstractions for the session backend and event handlers

pub mod entities;
pub mod traits;
