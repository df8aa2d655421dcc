//! UI utilities for the chat CLI

use colored::*;
use crossterm::{
    event::{self, Event, KeyCode},
    terminal::{disable_raw_mode, enable_raw_mode, size},
};
use std::io::{self, IsTerminal, Write};

use docq_core::{ChatMessage, Result, Role};

/// Display startup banner
pub fn display_banner() {
    let terminal_width = size().map(|(w, _)| w as usize).unwrap_or(80);
    let banner_width = std::cmp::min(60, terminal_width.saturating_sub(4));

    let top_border = format!("┌{}┐", "─".repeat(banner_width - 2));
    let bottom_border = format!("└{}┘", "─".repeat(banner_width - 2));
    let empty_line = format!("│{}│", " ".repeat(banner_width - 2));

    println!();
    println!("{}", top_border.blue());
    println!("{}", empty_line.blue());

    let title = "DocQ - Document Q&A";
    let title_line = format!(
        "│  {}{}│",
        title.blue().bold(),
        " ".repeat(banner_width.saturating_sub(title.len() + 4))
    );
    println!("{}", title_line);

    println!("{}", empty_line.blue());

    let feature_lines = vec![
        "📄 Ask questions about your documents",
        "",
        "Features:",
        "• 🔎 Retrieval-augmented answers from your corpus",
        "• 📚 In-memory vector index, built once per corpus",
        "• ⬆️  Question history navigation (↑/↓ arrows)",
        "• 🧹 'clear' resets the conversation",
        "",
        "v0.1.0 • Powered by watsonx.ai",
    ];

    for line in feature_lines {
        if line.is_empty() {
            println!("{}", empty_line.blue());
        } else {
            let padding = " ".repeat(banner_width.saturating_sub(line.len() + 4));
            let content = if line.starts_with("v0.1.0") {
                format!("│  {}{}│", line.dimmed(), padding)
            } else {
                format!("│  {}{}│", line, padding)
            };
            println!("{}", content.blue());
        }
    }

    println!("{}", empty_line.blue());
    println!("{}", bottom_border.blue());
    println!();
    println!(
        "{}",
        "💡 Tip: Ask a question about the documents, or type 'help' for commands".dimmed()
    );
    println!();
}

/// Read one line of input, with ↑/↓ history navigation when attached to a
/// terminal. Returns `None` when piped stdin reaches end of file.
pub async fn handle_input_with_history(history: &mut Vec<String>) -> Result<Option<String>> {
    // Piped input: read from stdin directly
    if !io::stdin().is_terminal() {
        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            return Ok(None);
        }
        let input = input.trim().to_string();
        if !input.is_empty() {
            history.push(input.clone());
        }
        return Ok(Some(input));
    }

    enable_raw_mode()?;
    let mut input = String::new();
    let mut history_index: Option<usize> = None;
    let mut cursor_pos = 0;

    print!("{} ", "docq>".green().bold());
    io::stdout().flush()?;

    loop {
        if let Event::Key(key_event) = event::read()? {
            match key_event.code {
                KeyCode::Enter => {
                    disable_raw_mode()?;
                    println!();
                    if !input.is_empty() {
                        history.push(input.clone());
                    }
                    return Ok(Some(input));
                }
                KeyCode::Char(c) => {
                    input.insert(cursor_pos, c);
                    cursor_pos += 1;
                    print!("\r{} {}", "docq>".green().bold(), input);
                    io::stdout().flush()?;
                }
                KeyCode::Backspace => {
                    if cursor_pos > 0 {
                        input.remove(cursor_pos - 1);
                        cursor_pos -= 1;
                        print!(
                            "\r{} {}  \r{} {}",
                            "docq>".green().bold(),
                            input,
                            "docq>".green().bold(),
                            input
                        );
                        io::stdout().flush()?;
                    }
                }
                KeyCode::Up => {
                    if !history.is_empty() {
                        let new_index = match history_index {
                            None => history.len() - 1,
                            Some(idx) if idx > 0 => idx - 1,
                            Some(idx) => idx,
                        };
                        history_index = Some(new_index);
                        input = history[new_index].clone();
                        cursor_pos = input.len();
                        print!(
                            "\r{} {}  \r{} {}",
                            "docq>".green().bold(),
                            " ".repeat(50),
                            "docq>".green().bold(),
                            input
                        );
                        io::stdout().flush()?;
                    }
                }
                KeyCode::Down => {
                    if let Some(idx) = history_index {
                        if idx < history.len() - 1 {
                            let new_index = idx + 1;
                            history_index = Some(new_index);
                            input = history[new_index].clone();
                        } else {
                            history_index = None;
                            input.clear();
                        }
                        cursor_pos = input.len();
                        print!(
                            "\r{} {}  \r{} {}",
                            "docq>".green().bold(),
                            " ".repeat(50),
                            "docq>".green().bold(),
                            input
                        );
                        io::stdout().flush()?;
                    }
                }
                KeyCode::Esc => {
                    disable_raw_mode()?;
                    println!();
                    return Ok(Some(String::new()));
                }
                _ => {}
            }
        }
    }
}

/// Display help message
pub fn print_help() {
    println!("{}", "Available commands:".bold());
    println!(
        "  {} - Ask a question about the documents",
        "<question>".green()
    );
    println!("  {} - Show the conversation so far", "history".green());
    println!("  {} - Clear the conversation history", "clear".green());
    println!("  {} - Show this help message", "help".green());
    println!("  {} - Exit the application", "exit/quit".green());
    println!();
    println!("{}", "Examples:".bold());
    println!("  What is the checked baggage allowance?");
    println!("  How do I request a refund?");
}

/// Print the session transcript with timestamps.
pub fn render_transcript(messages: &[ChatMessage]) {
    if messages.is_empty() {
        println!("{}", "No conversation yet.".dimmed());
        return;
    }

    for message in messages {
        let stamp = message.created_at.format("%H:%M:%S").to_string();
        match message.role {
            Role::User => println!(
                "{} {} {}",
                stamp.dimmed(),
                "you>".green().bold(),
                message.content
            ),
            Role::Assistant => println!(
                "{} {} {}",
                stamp.dimmed(),
                "docq>".blue().bold(),
                message.content
            ),
        }
    }
}
