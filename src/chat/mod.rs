//! Terminal chat front end.
//!
//! This module provides the pieces the `gkchat` binary is assembled from:
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`commands`]: Slash command parsing for thread and usage management
//! - [`render`]: Terminal output of exchanges, history, and usage

mod commands;
mod config;
mod render;

pub use commands::{ChatCommand, help_text, parse_command};
pub use config::{ChatArgs, ChatConfig};
pub use render::{PlainTextRenderer, Renderer, describe_remaining, thread_label, usage_bar};
