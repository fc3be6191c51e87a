//! Output rendering for the chat application.
//!
//! This module provides a trait-based rendering abstraction that allows
//! for different output styles. The default implementation uses ANSI
//! escape codes to tell user turns, bot turns, and errors apart.

use std::io::{self, Stdout, Write};

use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

use crate::session::{Exchange, Thread};
use crate::transport::AccountUsage;
use crate::usage::UsageState;

/// ANSI escape code for dim text (used for the loading indicator).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for cyan text (used for user turns).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code for green text (used for the usage bar).
const ANSI_GREEN: &str = "\x1b[32m";

/// ANSI escape code for red text (used for errors).
const ANSI_RED: &str = "\x1b[31m";

/// Width of the usage bar in characters.
const BAR_WIDTH: usize = 30;

/// Trait for rendering chat output.
///
/// This abstraction allows for different rendering strategies:
/// - Plain text with ANSI styling
/// - Plain text without styling (for piping/redirecting)
pub trait Renderer: Send {
    /// Print one exchange, both turns.
    fn print_exchange(&mut self, exchange: &Exchange);

    /// Print that a reply is being waited for.
    fn print_loading(&mut self);

    /// Print the list of archived threads.
    fn print_history(&mut self, history: &[Thread]);

    /// Print the usage panel.
    fn print_usage(&mut self, usage: &UsageState);

    /// Print account usage reported by the backend.
    fn print_account_usage(&mut self, usage: &AccountUsage);

    /// Print an error message.
    fn print_error(&mut self, error: &str);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);
}

/// Plain text renderer with optional ANSI styling.
pub struct PlainTextRenderer {
    stdout: Stdout,
    use_color: bool,
}

impl PlainTextRenderer {
    /// Creates a new PlainTextRenderer with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a new PlainTextRenderer with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self {
            stdout: io::stdout(),
            use_color,
        }
    }

    fn flush(&mut self) {
        let _ = self.stdout.flush();
    }

    fn paint(&self, color: &str, text: &str) -> String {
        if self.use_color {
            format!("{color}{text}{ANSI_RESET}")
        } else {
            text.to_string()
        }
    }
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for PlainTextRenderer {
    fn print_exchange(&mut self, exchange: &Exchange) {
        println!("{} {}", self.paint(ANSI_CYAN, "You:"), exchange.user_text);
        if let Some(bot) = &exchange.bot_text {
            println!("Bot: {bot}");
        }
        self.flush();
    }

    fn print_loading(&mut self) {
        print!("{}", self.paint(ANSI_DIM, "Loading...\r"));
        self.flush();
    }

    fn print_history(&mut self, history: &[Thread]) {
        if history.is_empty() {
            println!("    No saved chats.");
            return;
        }
        println!("    Chats:");
        for (position, thread) in history.iter().enumerate() {
            println!(
                "      {}. {} ({} messages) [{}]",
                position + 1,
                thread_label(thread),
                thread.len(),
                thread.id()
            );
        }
    }

    fn print_usage(&mut self, usage: &UsageState) {
        println!("    Usage:");
        println!("      Used: {}", usage.used);
        println!("      Remaining: {}", describe_remaining(usage.remaining));
        println!("      {}", self.paint(ANSI_GREEN, &usage_bar(usage, BAR_WIDTH)));
    }

    fn print_account_usage(&mut self, usage: &AccountUsage) {
        println!("    Account usage:");
        println!("      Used: {}", usage.used);
        println!("      Remaining: {}", usage.remaining);
    }

    fn print_error(&mut self, error: &str) {
        eprintln!("{}", self.paint(ANSI_RED, &format!("Error: {error}")));
    }

    fn print_info(&mut self, info: &str) {
        println!("{info}");
    }
}

/// Display label for an archived thread, e.g. `Chat 14:03:27`.
///
/// Uses the local offset when it can be determined, UTC otherwise.
pub fn thread_label(thread: &Thread) -> String {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    format!("Chat {}", clock_time(thread.archived_at().to_offset(offset)))
}

fn clock_time(at: OffsetDateTime) -> String {
    at.format(format_description!("[hour]:[minute]:[second]"))
        .unwrap_or_else(|_| at.unix_timestamp().to_string())
}

/// `N/A` until credit information has arrived.
pub fn describe_remaining(remaining: Option<i64>) -> String {
    remaining
        .map(|r| r.to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

/// A text bar whose filled part is the fraction of the budget remaining.
pub fn usage_bar(usage: &UsageState, width: usize) -> String {
    let filled = (usage.fraction_remaining() * width as f64).round() as usize;
    let filled = filled.min(width);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}
