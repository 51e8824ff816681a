//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and handlers.
//!
//! # Command Modules
//!
//! - [`config`] - Configuration management (path, show, init)
//! - [`languages`] - Language table
//! - [`modes`] - Clipboard modes available on this host
//! - [`translate`] - One-shot translation
//! - [`watch`] - Main command (translate clipboard changes until Ctrl-C)

pub mod common;
pub mod config;
pub mod languages;
pub mod modes;
pub mod translate;
pub mod watch;
