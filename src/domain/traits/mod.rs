//! Domain traits - Abstractions for infrastructure implementations

pub mod handler;
pub mod session;

pub use handler::{MembershipHandler, MessageHandler, ScheduledTasks};
pub use session::{BrowserProfile, EventReceiver, EventSender, SessionClient, SessionInfo};
