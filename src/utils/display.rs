use crate::storage::TranscriptEntry;
use colored::*;

pub fn print_header(text: &str) {
    println!("\n{}", text.bright_cyan().bold());
    println!("{}", "=".repeat(text.chars().count()).bright_cyan());
}

pub fn print_success(text: &str) {
    println!("{}", text.green());
}

pub fn print_error(text: &str) {
    eprintln!("{}", text.red().bold());
}

pub fn print_info(text: &str) {
    println!("{}", text.blue());
}

pub fn print_entry(entry: &TranscriptEntry) {
    println!("{}", entry.timestamp.dimmed());
    println!("{} {}", "You:".yellow().bold(), entry.user);
    println!("{} {}\n", "Bot:".bright_cyan().bold(), entry.bot);
}
