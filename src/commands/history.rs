//! Conversation history commands: list, show, delete, clear.

use crate::cli::HistoryCommand;
use crate::commands::{open_store, print_transcript, resolve_session_id};
use crate::config::Config;
use crate::error::Result;
use crate::storage::ChatStore;
use colored::Colorize;
use prettytable::{format, Table};
use std::io::Write;

/// Handle history commands
pub fn handle_history(config: &Config, command: HistoryCommand) -> Result<()> {
    let store = open_store(config)?;

    match command {
        HistoryCommand::List => list_sessions(&store),
        HistoryCommand::Show { id } => show_session(&store, &id),
        HistoryCommand::Delete { id } => delete_session(&store, &id),
        HistoryCommand::Clear { yes } => clear_sessions(&store, yes),
    }
}

fn list_sessions(store: &ChatStore) -> Result<()> {
    let sessions = store.sessions();

    if sessions.is_empty() {
        println!("{}", "No conversation history found.".yellow());
        return Ok(());
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

    table.add_row(prettytable::row![
        "ID".bold(),
        "Title".bold(),
        "Messages".bold(),
        "Last Updated".bold()
    ]);

    for session in sessions {
        let id_short: String = session.id.chars().take(8).collect();
        let title = if session.title.chars().count() > 40 {
            let trimmed: String = session.title.chars().take(37).collect();
            format!("{}...", trimmed)
        } else {
            session.title
        };
        let updated = session.updated_at.format("%Y-%m-%d %H:%M").to_string();

        table.add_row(prettytable::row![
            id_short.cyan(),
            title,
            session.message_count,
            updated
        ]);
    }

    println!("\nConversation History:");
    table.printstd();
    println!();
    println!(
        "Use {} to resume a conversation.",
        "natter chat --resume <ID>".cyan()
    );
    println!();

    Ok(())
}

fn show_session(store: &ChatStore, needle: &str) -> Result<()> {
    let id = match resolve_session_id(store, needle) {
        Some(id) => id,
        None => anyhow::bail!("No conversation found matching '{}'", needle),
    };

    // resolve_session_id only returns ids it saw in the store
    let session = match store.session(&id) {
        Some(session) => session,
        None => anyhow::bail!("No conversation found matching '{}'", needle),
    };

    println!();
    println!("{} {}", "Title:".bold(), session.title);
    println!("{} {}", "ID:".bold(), session.id.cyan());
    println!(
        "{} {}",
        "Created:".bold(),
        session.created_at.format("%Y-%m-%d %H:%M")
    );
    println!("{} {} messages", "Length:".bold(), session.message_count);
    println!();

    print_transcript(&store.messages(&id));
    println!();

    Ok(())
}

fn delete_session(store: &ChatStore, needle: &str) -> Result<()> {
    let id = match resolve_session_id(store, needle) {
        Some(id) => id,
        None => anyhow::bail!("No conversation found matching '{}'", needle),
    };

    store.delete_session(&id);
    println!("{}", format!("Deleted conversation {}", id).green());

    Ok(())
}

fn clear_sessions(store: &ChatStore, yes: bool) -> Result<()> {
    let count = store.sessions().len();

    if count == 0 {
        println!("{}", "No conversation history found.".yellow());
        return Ok(());
    }

    if !yes && !confirm_clear(count)? {
        println!("Aborted.");
        return Ok(());
    }

    store.delete_all_sessions();
    println!("{}", format!("Deleted {} conversation(s).", count).green());

    Ok(())
}

fn confirm_clear(count: usize) -> Result<bool> {
    print!(
        "Delete all {} conversation(s)? This cannot be undone. [y/N] ",
        count
    );
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;

    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}
