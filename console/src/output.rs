//! Output formatting for CLI commands.

use colored::Colorize;
use serde::Serialize;
use tabled::{Table, Tabled};

use crate::notify::{Notice, NoticeLevel};

/// Output format.
#[derive(Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    /// Aligned text table.
    #[default]
    Table,
    /// Pretty-printed JSON.
    Json,
}

/// Print a row collection as a table or JSON.
pub fn print_output<T: Serialize + Tabled>(data: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if data.is_empty() {
                println!("{}", "No items found.".dimmed());
            } else {
                println!("{}", Table::new(data));
            }
        }
        OutputFormat::Json => println!("{}", format_json(data, "[]")),
    }
}

/// Print a single item as JSON.
pub fn print_single<T: Serialize>(data: &T) {
    println!("{}", format_json(data, "{}"));
}

fn format_json<T: Serialize + ?Sized>(data: &T, fallback: &str) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|_| fallback.to_string())
}

/// Print a success message.
pub fn print_success(message: &str) {
    println!("{} {}", "Success:".green().bold(), message);
}

/// Print an info message.
pub fn print_info(message: &str) {
    println!("{} {}", "Info:".blue().bold(), message);
}

/// Render a notice at its level's color. Errors go to stderr.
pub fn print_notice(notice: &Notice) {
    match notice.level {
        NoticeLevel::Success => println!("{} {}", "Success:".green().bold(), notice.message),
        NoticeLevel::Info => println!("{} {}", "Info:".blue().bold(), notice.message),
        NoticeLevel::Warning => println!("{} {}", "Warning:".yellow().bold(), notice.message),
        NoticeLevel::Error => eprintln!("{} {}", "Error:".red().bold(), notice.message),
    }
}
