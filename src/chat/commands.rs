//! Slash command parsing for the chat application.
//!
//! This module handles parsing of special commands that start with `/`,
//! allowing users to manage threads and inspect usage without sending
//! messages to the backend.

/// A parsed chat command.
///
/// These commands control the session and are not sent to the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatCommand {
    /// Archive the active thread and start a new one.
    New,

    /// Clear the active thread, keeping history and usage.
    Clear,

    /// List archived threads.
    History,

    /// Show an archived thread, by list position or id.
    Select(String),

    /// Delete an archived thread, by list position or id.
    Delete(String),

    /// Drop every archived thread and the active thread.
    ClearAll,

    /// Show local credit usage.
    Credits,

    /// Query account usage from the backend.
    Usage,

    /// Reprint the active thread.
    Show,

    /// Display help information.
    Help,

    /// Exit the chat application.
    Quit,

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// Parses user input for slash commands.
///
/// Returns `Some(ChatCommand)` if the input is a valid command,
/// or `None` if it should be treated as a regular message.
///
/// # Examples
///
/// ```
/// # use gkchat::chat::parse_command;
/// assert!(parse_command("/quit").is_some());
/// assert!(parse_command("/select 2").is_some());
/// assert!(parse_command("What is the capital of France?").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();

    if !input.starts_with('/') {
        return None;
    }

    let mut parts = input[1..].splitn(2, ' ');
    let command = parts.next()?.to_lowercase();
    let argument = parts.next().map(|s| s.trim()).filter(|s| !s.is_empty());

    let result = match command.as_str() {
        "new" => ChatCommand::New,
        "clear" => ChatCommand::Clear,
        "history" | "chats" => ChatCommand::History,
        "select" | "open" => match argument {
            Some(reference) => ChatCommand::Select(reference.to_string()),
            None => ChatCommand::Invalid("/select requires a chat number or id".to_string()),
        },
        "delete" | "rm" => match argument {
            Some(reference) => ChatCommand::Delete(reference.to_string()),
            None => ChatCommand::Invalid("/delete requires a chat number or id".to_string()),
        },
        "clear-all" | "clearall" => ChatCommand::ClearAll,
        "credits" => ChatCommand::Credits,
        "usage" => ChatCommand::Usage,
        "show" => ChatCommand::Show,
        "help" | "?" => ChatCommand::Help,
        "quit" | "exit" | "q" => ChatCommand::Quit,
        _ => ChatCommand::Invalid(format!("Unknown command: /{}", command)),
    };

    Some(result)
}

/// Returns help text describing available commands.
pub fn help_text() -> &'static str {
    r#"Available commands:
  /new                   Save the current chat to history and start a new one
  /clear                 Clear the current chat (history and credits are kept)
  /history               List saved chats
  /select <n|id>         Open a saved chat
  /delete <n|id>         Delete a saved chat
  /clear-all             Delete all saved chats and the current chat
  /show                  Reprint the current chat
  /credits               Show credits used in this chat
  /usage                 Show account usage reported by the backend
  /help                  Show this help message
  /quit                  Exit the chat"#
}
