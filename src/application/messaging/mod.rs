//! Event handling - Typed dispatch of session events

pub mod dispatcher;
mod tests;

pub use dispatcher::{DispatchOutcome, EventDispatcher};
