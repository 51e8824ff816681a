//! Configuration management CLI commands.
//!
//! Provides `config path`, `config show` and `config init` for locating,
//! viewing and creating the configuration file.

use clap::Subcommand;
use cliptrans::clipboard::mode_name;
use cliptrans::config::{config_file_path, ConfigFile};

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show the configuration file path
    Path,

    /// Show the effective configuration
    Show,

    /// Create the configuration file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Path => run_path(),
        ConfigCommands::Show => run_show(),
        ConfigCommands::Init { force } => run_init(force),
    }
}

/// Show the configuration file path.
fn run_path() -> Result<(), CliError> {
    println!("{}", config_file_path().display());
    Ok(())
}

/// Show the effective configuration.
fn run_show() -> Result<(), CliError> {
    let path = config_file_path();
    let config = ConfigFile::load()?;

    println!("Configuration Settings");
    println!("======================");
    if path.exists() {
        println!("File: {}", path.display());
    } else {
        println!("File: {} (not created, showing defaults)", path.display());
    }
    println!();

    for (section, entries) in settings_table(&config) {
        println!("[{}]", section);
        for (key, value) in entries {
            if value.is_empty() {
                println!("  {} = (not set)", key);
            } else {
                println!("  {} = {}", key, value);
            }
        }
        println!();
    }
    Ok(())
}

/// Create the configuration file with default values.
fn run_init(force: bool) -> Result<(), CliError> {
    let path = config_file_path();
    if force {
        ConfigFile::default().save_to(&path)?;
        println!("Wrote default configuration to {}", path.display());
    } else if ConfigFile::ensure_exists_at(&path)? {
        println!("Created {}", path.display());
    } else {
        println!("Configuration already exists at {}", path.display());
        println!("Use 'cliptrans config init --force' to reset it.");
    }
    Ok(())
}

type Section = (&'static str, Vec<(&'static str, String)>);

fn settings_table(config: &ConfigFile) -> Vec<Section> {
    let t = &config.translation;
    let c = &config.clipboard;
    let w = &config.worker;
    vec![
        (
            "translation",
            vec![
                ("source_lang", t.source_lang.clone()),
                ("target_lang", t.target_lang.clone()),
                ("engines", t.engines.join(", ")),
                ("timeout", t.timeout.to_string()),
                ("google_url", t.google_url.clone()),
                ("libretranslate_url", t.libretranslate_url.clone()),
                (
                    "libretranslate_api_key",
                    t.libretranslate_api_key
                        .as_ref()
                        .map(|_| "********".to_string())
                        .unwrap_or_default(),
                ),
            ],
        ),
        (
            "clipboard",
            vec![
                ("mode", mode_name(c.mode).to_string()),
                ("buffer_ms", c.buffer_ms.to_string()),
                ("poll_interval_ms", c.poll_interval_ms.to_string()),
                ("overwrite", c.overwrite.to_string()),
                ("join_lines", c.join_lines.to_string()),
            ],
        ),
        (
            "worker",
            vec![
                ("queue_capacity", w.queue_capacity.to_string()),
                ("restart_delay_ms", w.restart_delay_ms.to_string()),
            ],
        ),
        (
            "logging",
            vec![("file", config.logging.file.display().to_string())],
        ),
    ]
}
