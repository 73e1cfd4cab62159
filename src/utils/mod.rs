//! Shared helpers for commands

pub mod paths;
pub mod terminal;
