//! Madeira CLI library.
//!
//! Command handlers for the `madeira` binary, kept in a library so the
//! output types can be tested directly.

pub mod commands;
pub mod output;
