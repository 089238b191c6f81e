//! HTTP route handlers.

pub mod commands;
pub mod items;
pub mod system;
