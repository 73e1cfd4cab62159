//! Command implementations
//!
//! Each command module provides a clap-derived struct and execute method.

pub mod check;
pub mod fmt;
pub mod list;
pub mod verify;
