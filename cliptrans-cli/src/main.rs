//! cliptrans CLI - Command-line interface
//!
//! This binary provides a command-line interface to the cliptrans library.

mod commands;
mod display;
mod error;
mod runner;

use clap::{Parser, Subcommand};

use commands::config::ConfigCommands;
use commands::translate::TranslateArgs;
use commands::watch::WatchArgs;

#[derive(Parser)]
#[command(name = "cliptrans")]
#[command(version = cliptrans::VERSION)]
#[command(about = "Translate clipboard text as you copy or select it", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch the clipboard and translate every change
    Watch(WatchArgs),

    /// Translate text once and print the result
    Translate(TranslateArgs),

    /// List clipboard modes supported on this host
    Modes,

    /// List known languages and their codes
    Languages,

    /// Manage the configuration file
    #[command(subcommand)]
    Config(ConfigCommands),
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Watch(args) => commands::watch::run(args),
        Commands::Translate(args) => commands::translate::run(args),
        Commands::Modes => commands::modes::run(),
        Commands::Languages => commands::languages::run(),
        Commands::Config(command) => commands::config::run(command),
    };

    if let Err(e) = result {
        e.exit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_watch_flags() {
        let cli = Cli::try_parse_from([
            "cliptrans",
            "watch",
            "--source",
            "en",
            "--target",
            "de",
            "--mode",
            "copy",
            "--buffer-ms",
            "0",
            "--overwrite",
            "--engine",
            "libretranslate",
            "--engine",
            "google",
            "--stdin",
        ])
        .unwrap();

        match cli.command {
            Commands::Watch(args) => {
                assert_eq!(args.source.as_deref(), Some("en"));
                assert_eq!(args.target.as_deref(), Some("de"));
                assert_eq!(args.mode.as_deref(), Some("copy"));
                assert_eq!(args.buffer_ms, Some(0));
                assert!(args.overwrite);
                assert_eq!(args.engine, vec!["libretranslate", "google"]);
                assert!(args.stdin);
                assert!(!args.debug);
            }
            _ => panic!("expected watch"),
        }
    }

    #[test]
    fn test_parse_translate() {
        let cli = Cli::try_parse_from(["cliptrans", "translate", "Hello", "--target", "ja"])
            .unwrap();
        match cli.command {
            Commands::Translate(args) => {
                assert_eq!(args.text, "Hello");
                assert_eq!(args.target.as_deref(), Some("ja"));
                assert!(args.source.is_none());
            }
            _ => panic!("expected translate"),
        }
    }

    #[test]
    fn test_parse_config_subcommand() {
        let cli = Cli::try_parse_from(["cliptrans", "config", "path"]).unwrap();
        assert!(matches!(cli.command, Commands::Config(ConfigCommands::Path)));
    }
}
