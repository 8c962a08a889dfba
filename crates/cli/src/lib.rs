//! Library interface for the docsearch CLI
//!
//! This module exposes the command implementations for integration testing
//! while keeping argument parsing and logging setup in main.rs.

pub mod commands;

pub use anyhow::Result;
pub use docsearch_core::config::Config;
