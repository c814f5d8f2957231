//! Command handlers for the `lumen` binary.

pub mod classify;
pub mod config;
