//! Interactive prompts for arguments left off the command line
//!
//! `migratectl convert` without `--in`/`--out` asks for the two folders,
//! the way the standalone conversion script always did. Prompts only run on
//! an interactive terminal; otherwise the missing argument is an error.

use anyhow::{bail, Context, Result};
use inquire::Text;
use std::io::IsTerminal;
use std::path::PathBuf;

/// Check if we can prompt (stdin and stdout are terminals)
pub fn can_prompt() -> bool {
    std::io::stdin().is_terminal() && std::io::stdout().is_terminal()
}

fn prompt_folder(message: &str, help: &str, flag: &str) -> Result<PathBuf> {
    if !can_prompt() {
        bail!("missing {} (no terminal to prompt on)", flag);
    }

    let value = Text::new(message)
        .with_help_message(help)
        .prompt()
        .with_context(|| format!("Failed to read {}", flag))?;

    Ok(PathBuf::from(value.trim()))
}

/// Use `given` or ask for the folder holding the CSV extracts.
pub fn data_folder(given: Option<PathBuf>) -> Result<PathBuf> {
    match given {
        Some(path) => Ok(path),
        None => prompt_folder(
            "Enter the folder path containing CSV files:",
            "Every *.csv directly inside this folder is converted",
            "--in",
        ),
    }
}

/// Use `given` or ask where the SQL files go.
pub fn output_folder(given: Option<PathBuf>) -> Result<PathBuf> {
    match given {
        Some(path) => Ok(path),
        None => prompt_folder(
            "Enter the folder path to store SQL files:",
            "Created if it does not exist; existing .sql files are overwritten",
            "--out",
        ),
    }
}
