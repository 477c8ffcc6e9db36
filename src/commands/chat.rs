//! Interactive chat mode handler.
//!
//! Resolves or creates a conversation, replays its transcript, and runs a
//! readline-based loop: each user line is persisted, answered by the
//! canned bot after a typing delay, and the reply is persisted too.

use crate::bot;
use crate::commands::{open_store, print_transcript, resolve_session_id};
use crate::config::Config;
use crate::error::Result;
use crate::storage::{ChatMessage, ChatStore};
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use uuid::Uuid;

/// Start interactive chat mode
///
/// # Arguments
///
/// * `config` - Global configuration (consumed)
/// * `resume` - Optional conversation ID (or prefix) to continue
/// * `last` - Continue the most recently updated conversation
pub async fn run_chat(config: Config, resume: Option<String>, last: bool) -> Result<()> {
    let store = open_store(&config)?;

    let session_id = match resolve_target_session(&store, resume, last)? {
        ResolvedSession::Existing(id) => {
            // Resurface the reopened chat to the top of history.
            store.mark_accessed(&id);
            let transcript = store.messages(&id);
            if !transcript.is_empty() {
                println!();
                print_transcript(&transcript);
                println!();
            }
            id
        }
        ResolvedSession::Fresh(id) => {
            let _ = store.create_session(&id);
            id
        }
    };

    print_welcome_banner(&session_id);

    let mut rl = DefaultEditor::new()?;

    loop {
        match rl.readline(&format!("{} ", "you>".green().bold())) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                if trimmed == "exit" || trimmed == "quit" {
                    break;
                }

                rl.add_history_entry(trimmed)?;

                store.append_message(&ChatMessage::user(trimmed), &session_id);

                let reply = bot::reply_with_delay(&config.bot).await;
                println!("{} {}", "bot>".cyan().bold(), reply);

                store.append_message(&ChatMessage::bot(reply), &session_id);
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                tracing::error!("Readline error: {:?}", err);
                break;
            }
        }
    }

    println!("Goodbye!");
    Ok(())
}

enum ResolvedSession {
    /// Reopening an existing conversation
    Existing(String),
    /// A brand-new conversation with this id
    Fresh(String),
}

fn resolve_target_session(
    store: &ChatStore,
    resume: Option<String>,
    last: bool,
) -> Result<ResolvedSession> {
    if let Some(needle) = resume {
        return match resolve_session_id(store, &needle) {
            Some(id) => Ok(ResolvedSession::Existing(id)),
            None => anyhow::bail!("No conversation found matching '{}'", needle),
        };
    }

    if last {
        if let Some(session) = store.last_session() {
            return Ok(ResolvedSession::Existing(session.id));
        }
        println!("{}", "No previous conversation; starting a new one.".yellow());
    }

    Ok(ResolvedSession::Fresh(Uuid::new_v4().to_string()))
}

/// Display welcome banner at the start of interactive chat mode
fn print_welcome_banner(session_id: &str) {
    let id_short: String = session_id.chars().take(8).collect();
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                  Natter - Interactive Chat                   ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");
    println!("Conversation: {}", id_short.cyan());
    println!("Type 'exit' to quit\n");
}
