//! Domain entities - Core business objects with no external dependencies

pub mod command;
pub mod event;
pub mod group;
pub mod message;

pub use command::{Command, CommandRegistry, Invocation};
pub use event::{EventKind, InboundEvent, LifecycleEvent, SessionEvent, SessionStatus};
pub use group::GroupNotification;
pub use message::Message;
