//! Session client backends

pub mod console;

pub use console::ConsoleSession;
