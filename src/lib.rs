//! Group chat bot shell: session client, event dispatch, HTTP dashboard

pub mod application;
pub mod domain;
pub mod infrastructure;
