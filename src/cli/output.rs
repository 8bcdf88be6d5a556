/// Console output helpers shared by the binaries
use colored::*;

pub fn banner(title: &str) {
    println!("{}", format!("=== {} ===", title).bold());
}

/// Display a section header
pub fn section_header(title: &str) {
    println!("\n{}", title.bold().cyan());
}

pub fn success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

pub fn info(message: &str) {
    println!("{} {}", "●".blue(), message);
}

pub fn warning(message: &str) {
    println!("{} {}", "⚠".yellow(), message);
}

pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red(), message.red());
}

pub fn action(message: &str) {
    println!("{} {}", "▶".cyan(), message);
}

/// Tree structure item, e.g. `├─ IP: 203.0.113.7`
pub fn tree_item(is_last: bool, label: &str, value: &str) {
    let prefix = if is_last { "└─" } else { "├─" };
    println!("{} {}: {}", prefix.dimmed(), label, value.green());
}

/// Render label/value pairs as one tree
pub fn tree_section(items: &[(&str, String)]) {
    for (i, (label, value)) in items.iter().enumerate() {
        tree_item(i == items.len() - 1, label, value);
    }
}
