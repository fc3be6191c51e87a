//! Interactive terminal client for the general-knowledge chat backend.
//!
//! # Usage
//!
//! ```bash
//! # Talk to a locally served backend
//! gkchat
//!
//! # Behave like the native wrapper and talk to the deployed backend
//! gkchat --platform native
//!
//! # Point at another deployment, with a larger credit budget
//! gkchat --serving-origin http://127.0.0.1:8080 --budget 500
//! ```
//!
//! Logging goes to stderr and is controlled by `GKCHAT_LOG` (default `warn`).
//!
//! # Commands
//!
//! - `/new` - Save the current chat and start a new one
//! - `/history` - List saved chats
//! - `/select <n|id>` - Open a saved chat
//! - `/credits` - Show credit usage
//! - `/quit` - Exit the application

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing_subscriber::EnvFilter;

use gkchat::chat::{
    ChatArgs, ChatCommand, ChatConfig, PlainTextRenderer, Renderer, help_text, parse_command,
};
use gkchat::{Conversation, TransportSelector};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("GKCHAT_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let (args, _) = ChatArgs::from_command_line_relaxed("gkchat [OPTIONS]");
    let config = ChatConfig::try_from(args)?;

    let selector = config.selector()?;
    let mut conversation = config.conversation();
    let mut renderer = PlainTextRenderer::with_color(config.use_color);
    let mut rl = DefaultEditor::new()?;

    println!(
        "GK Chatbot ({} via {})",
        selector.current_transport(),
        config.origins.serving
    );
    println!("Ask me any GK question. Type /help for commands, /quit to exit\n");

    loop {
        let readline = rl.readline("You: ");

        match readline {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line.as_str());

                if let Some(cmd) = parse_command(&line) {
                    if !run_command(cmd, &mut conversation, &selector, &mut renderer).await {
                        println!("Goodbye!");
                        break;
                    }
                    continue;
                }

                conversation.set_input(line);
                let text = conversation.input().to_string();
                renderer.print_loading();
                match conversation.ask(&selector, &text).await {
                    Ok(exchange) => {
                        if let Some(bot) = &exchange.bot_text {
                            renderer.print_info(&format!("Bot: {bot}"));
                        }
                    }
                    Err(err) => renderer.print_error(&err.to_string()),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                renderer.print_error(&format!("Input error: {}", err));
                break;
            }
        }
    }

    Ok(())
}

/// Runs one slash command. Returns false when the user asked to quit.
async fn run_command(
    cmd: ChatCommand,
    conversation: &mut Conversation,
    selector: &TransportSelector,
    renderer: &mut PlainTextRenderer,
) -> bool {
    match cmd {
        ChatCommand::Quit => return false,
        ChatCommand::Help => {
            for line in help_text().lines() {
                println!("    {}", line);
            }
        }
        ChatCommand::New => match conversation.start_new_thread() {
            Ok(Some(id)) => renderer.print_info(&format!("Chat saved ({id}). New chat started.")),
            Ok(None) => renderer.print_info("New chat started."),
            Err(err) => renderer.print_error(&err.to_string()),
        },
        ChatCommand::Clear => match conversation.clear_active() {
            Ok(()) => renderer.print_info("Chat cleared."),
            Err(err) => renderer.print_error(&err.to_string()),
        },
        ChatCommand::History => renderer.print_history(conversation.history()),
        ChatCommand::Select(reference) => {
            match conversation
                .find_thread(&reference)
                .and_then(|id| conversation.select_thread(id))
            {
                Ok(()) => {
                    for exchange in conversation.exchanges() {
                        renderer.print_exchange(exchange);
                    }
                }
                Err(err) => renderer.print_error(&err.to_string()),
            }
        }
        ChatCommand::Delete(reference) => {
            match conversation
                .find_thread(&reference)
                .and_then(|id| conversation.delete_thread(id))
            {
                Ok(thread) => renderer.print_info(&format!("Deleted chat {}.", thread.id())),
                Err(err) => renderer.print_error(&err.to_string()),
            }
        }
        ChatCommand::ClearAll => match conversation.clear_history() {
            Ok(()) => renderer.print_info("All chats cleared."),
            Err(err) => renderer.print_error(&err.to_string()),
        },
        ChatCommand::Show => {
            if conversation.exchanges().is_empty() {
                renderer.print_info("(empty chat)");
            }
            for exchange in conversation.exchanges() {
                renderer.print_exchange(exchange);
            }
        }
        ChatCommand::Credits => renderer.print_usage(&conversation.usage()),
        ChatCommand::Usage => match selector.fetch_usage().await {
            Ok(usage) => renderer.print_account_usage(&usage),
            Err(err) => renderer.print_error(&err.to_string()),
        },
        ChatCommand::Invalid(message) => renderer.print_error(&message),
    }
    true
}
