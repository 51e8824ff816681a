//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use cliptrans::clipboard::ClipboardError;
use cliptrans::config::ConfigFileError;
use cliptrans::engine::EngineError;
use cliptrans::pipeline::PipelineError;
use std::fmt;
use std::process;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Failed to load or save the config file
    ConfigFile(ConfigFileError),
    /// Failed to start the async runtime
    Runtime(std::io::Error),
    /// Clipboard could not be opened or used
    Clipboard(ClipboardError),
    /// No engine could be built or a one-shot translation failed
    Translation(EngineError),
    /// The pipeline did not start
    Pipeline(PipelineError),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Translation(EngineError::NoEngineAvailable { .. })
            | CliError::Pipeline(PipelineError::ProviderUnavailable(_)) => {
                eprintln!();
                eprintln!("Common issues:");
                eprintln!("  1. No network connection, or a proxy blocks the engine URL");
                eprintln!("  2. LibreTranslate public instances need libretranslate_api_key");
                eprintln!("  3. Check the engine URLs with: cliptrans config show");
            }
            CliError::Clipboard(_) => {
                eprintln!();
                eprintln!("The system clipboard is unavailable. Try:");
                eprintln!("  cliptrans watch --stdin");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::ConfigFile(e) => write!(f, "{}", e),
            CliError::Runtime(e) => write!(f, "Failed to start async runtime: {}", e),
            CliError::Clipboard(e) => write!(f, "Clipboard error: {}", e),
            CliError::Translation(e) => write!(f, "Translation failed: {}", e),
            CliError::Pipeline(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::ConfigFile(e) => Some(e),
            CliError::Runtime(e) => Some(e),
            CliError::Clipboard(e) => Some(e),
            CliError::Translation(e) => Some(e),
            CliError::Pipeline(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::ConfigFile(e)
    }
}

impl From<ClipboardError> for CliError {
    fn from(e: ClipboardError) -> Self {
        CliError::Clipboard(e)
    }
}

impl From<EngineError> for CliError {
    fn from(e: EngineError) -> Self {
        CliError::Translation(e)
    }
}

impl From<PipelineError> for CliError {
    fn from(e: PipelineError) -> Self {
        CliError::Pipeline(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_display_messages() {
        let err = CliError::Config("bad flag".into());
        assert_eq!(err.to_string(), "Configuration error: bad flag");

        let err: CliError = EngineError::NoEngineAvailable {
            attempted: vec!["google".into()],
        }
        .into();
        assert!(err.to_string().starts_with("Translation failed: "));
        assert!(err.source().is_some());
    }
}
