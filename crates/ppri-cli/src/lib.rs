//! ppri-cli library root.
//!
//! Exposes the command layer and configuration so integration tests can
//! drive them without spawning the binary.

pub mod cli;
pub mod commands;
pub mod config;
pub mod screening;
