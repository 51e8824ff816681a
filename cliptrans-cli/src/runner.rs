//! CLI runner for common setup and operations.
//!
//! Encapsulates config loading, logging initialization and runtime creation
//! to reduce duplication across command handlers.

use crate::error::CliError;
use cliptrans::config::ConfigFile;
use cliptrans::engine::{CandidateFactory, EngineConfig};
use cliptrans::logging::{init_logging, LoggingGuard, LoggingOptions};
use std::future::Future;
use tokio::runtime::Runtime;
use tracing::info;

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    _logging_guard: LoggingGuard,
    /// Loaded configuration file
    config: ConfigFile,
    runtime: Runtime,
}

impl CliRunner {
    /// Create a new CLI runner, loading config and initializing logging.
    ///
    /// # Arguments
    ///
    /// * `debug_mode` - When true, enables debug-level logging regardless of RUST_LOG
    /// * `console` - Mirror log events to stderr
    pub fn new(debug_mode: bool, console: bool) -> Result<Self, CliError> {
        // Load config file (or use defaults if not present)
        let config = ConfigFile::load()?;

        let logging_guard = init_logging(&LoggingOptions {
            file: config.logging.file.clone(),
            console,
            debug: debug_mode,
        })
        .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("cliptrans")
            .build()
            .map_err(CliError::Runtime)?;

        Ok(Self {
            _logging_guard: logging_guard,
            config,
            runtime,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!(version = cliptrans::VERSION, command, "cliptrans starting");
    }

    /// Run a future to completion on the runner's runtime.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// Resolve engine candidates: CLI names override the configured list.
    pub fn engine_candidates(&self, names: &[String]) -> Result<Vec<EngineConfig>, CliError> {
        let mut translation = self.config.translation.clone();
        if !names.is_empty() {
            for name in names {
                name.parse::<EngineConfig>().map_err(CliError::Config)?;
            }
            translation.engines = names.to_vec();
        }
        Ok(translation.engine_configs())
    }

    /// Create an engine factory over the given candidates.
    pub fn create_factory(&self, candidates: Vec<EngineConfig>) -> Result<CandidateFactory, CliError> {
        info!(
            engines = %candidates
                .iter()
                .map(|c| c.name())
                .collect::<Vec<_>>()
                .join(", "),
            "Engine candidates"
        );
        CandidateFactory::new(candidates, self.config.translation.timeout())
            .map_err(CliError::Translation)
    }
}
