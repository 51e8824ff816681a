//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.

use crate::clipboard::ClipboardMode;
use crate::engine::EngineConfig;
use crate::pipeline::PipelineConfig;
use std::path::PathBuf;
use std::time::Duration;

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    /// Languages and engines
    pub translation: TranslationSettings,
    /// Clipboard monitoring
    pub clipboard: ClipboardSettings,
    /// Queue and restart behavior
    pub worker: WorkerSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

/// Translation configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationSettings {
    /// Source language code or `auto`
    pub source_lang: String,
    /// Target language code (`auto` picks ja/en)
    pub target_lang: String,
    /// Engine names in preference order
    pub engines: Vec<String>,
    /// HTTP timeout in seconds
    pub timeout: u64,
    /// Google endpoint base URL
    pub google_url: String,
    /// LibreTranslate server base URL
    pub libretranslate_url: String,
    /// LibreTranslate API key
    pub libretranslate_api_key: Option<String>,
}

impl TranslationSettings {
    /// Engine candidates in preference order, with configured endpoints.
    pub fn engine_configs(&self) -> Vec<EngineConfig> {
        self.engines
            .iter()
            .filter_map(|name| match name.parse::<EngineConfig>() {
                Ok(EngineConfig::Google { .. }) => Some(EngineConfig::Google {
                    base_url: self.google_url.clone(),
                }),
                Ok(EngineConfig::LibreTranslate { .. }) => Some(EngineConfig::libretranslate(
                    self.libretranslate_url.clone(),
                    self.libretranslate_api_key.clone(),
                )),
                Err(reason) => {
                    tracing::warn!(engine = %name, %reason, "Ignoring unknown engine");
                    None
                }
            })
            .collect()
    }

    /// HTTP timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

/// Clipboard configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardSettings {
    /// Monitored mode; `None` is the `none` mode
    pub mode: Option<ClipboardMode>,
    /// Debounce time in milliseconds
    pub buffer_ms: u64,
    /// System clipboard poll interval in milliseconds
    pub poll_interval_ms: u64,
    /// Write translations back to the clipboard
    pub overwrite: bool,
    /// Join multi-line text before translating
    pub join_lines: bool,
}

/// Worker configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerSettings {
    /// Request queue capacity (at least 1)
    pub queue_capacity: usize,
    /// Delay before rebuilding a failed engine, in milliseconds
    pub restart_delay_ms: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Log file path
    pub file: PathBuf,
}

impl ConfigFile {
    /// Pipeline settings derived from this configuration.
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig::new()
            .with_mode(self.clipboard.mode)
            .with_buftime(Duration::from_millis(self.clipboard.buffer_ms))
            .with_overwrite(self.clipboard.overwrite)
            .with_join_lines(self.clipboard.join_lines)
            .with_queue_capacity(self.worker.queue_capacity)
            .with_restart_delay(Duration::from_millis(self.worker.restart_delay_ms))
    }
}
