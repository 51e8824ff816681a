//! Languages command - print the language table.

use cliptrans::languages::LANGUAGES;

use crate::error::CliError;

/// Run the languages command.
pub fn run() -> Result<(), CliError> {
    let width = LANGUAGES
        .iter()
        .map(|(name, _)| name.len())
        .max()
        .unwrap_or(0);

    println!("{:<width$}  Code", "Language", width = width);
    for (name, code) in LANGUAGES {
        println!("{:<width$}  {}", name, code, width = width);
    }
    Ok(())
}
