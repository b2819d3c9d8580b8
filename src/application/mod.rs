//! Application layer - Use cases and orchestration
//!
//! This layer contains:
//! - Services: Message, moderation, command and membership handlers
//! - Messaging: Session event dispatch
//! - Lifecycle: Startup/shutdown sequencing
//! - Errors: Layered error types

pub mod errors;
pub mod lifecycle;
pub mod messaging;
pub mod services;

#[cfg(test)]
pub(crate) mod testing;
