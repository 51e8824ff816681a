//! Modes command - list clipboard modes supported on this host.

use cliptrans::clipboard::{ArboardClipboard, ClipboardBackend, ClipboardMode, ModeTable};

use crate::error::CliError;

/// Run the modes command.
pub fn run() -> Result<(), CliError> {
    let backend = ArboardClipboard::new()?;
    let table = ModeTable::new(&backend.supported_modes());
    let default = ClipboardMode::platform_default();

    println!("Clipboard modes");
    println!("===============");
    for name in table.names() {
        let marker = if name == default.name() { " (default)" } else { "" };
        println!("  {}{}", name, marker);
    }
    Ok(())
}
