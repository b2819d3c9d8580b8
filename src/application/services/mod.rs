//! Application services - Handler implementations wired to session events

pub mod automation_service;
pub mod command_service;
pub mod message_service;
pub mod moderation_service;

pub use automation_service::AutomationService;
pub use command_service::CommandService;
pub use message_service::MessageService;
pub use moderation_service::{ModerationService, Violation};
