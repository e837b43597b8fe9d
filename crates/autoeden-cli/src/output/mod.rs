//! Output formatting utilities

pub mod table_output;

use crate::error::Result;
use autoeden_sdk::{SessionExpiredHandler, SessionExpiredNotice};
use console::style;
use serde::Serialize;

/// Output data as JSON
pub fn json_output<T: Serialize + ?Sized>(data: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(data)?;
    println!("{json}");
    Ok(())
}

/// Print a success message with green checkmark
pub fn print_success(message: &str) {
    println!("{} {}", style("✓").green().bold(), message);
}

/// Print an error message with red X
pub fn print_error(message: &str) {
    eprintln!("{} {}", style("✗").red().bold(), style(message).red());
}

/// Print an informational message with blue info icon
pub fn print_info(message: &str) {
    println!("{} {}", style("ℹ").blue(), message);
}

pub fn print_warning(message: &str) {
    eprintln!("{} {}", style("!").yellow().bold(), style(message).yellow());
}

/// Compress a path to use tilde notation for home directory
pub fn compress_path(path: &std::path::Path) -> String {
    if let Ok(home_dir) = std::env::var("HOME") {
        let home_path = std::path::Path::new(&home_dir);
        if let Ok(relative) = path.strip_prefix(home_path) {
            return format!("~/{}", relative.display());
        }
    }
    path.display().to_string()
}

/// Either print `data` as JSON or run the human-readable renderer
pub fn render<T, F>(json: bool, data: &T, human: F) -> Result<()>
where
    T: Serialize + ?Sized,
    F: FnOnce(&T) -> Result<()>,
{
    if json {
        json_output(data)
    } else {
        human(data)
    }
}

/// Tells the terminal user their session ended
pub struct TerminalExpiryNotice;

impl SessionExpiredHandler for TerminalExpiryNotice {
    fn on_session_expired(&self, notice: &SessionExpiredNotice) {
        print_warning(notice.message);
        print_info("Run `autoeden login` to sign in again");
    }
}
