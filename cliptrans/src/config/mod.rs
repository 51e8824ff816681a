//! User configuration (`~/.cliptrans/config.ini`).
//!
//! Each INI section maps to one settings struct:
//!
//! | Section         | Struct                  |
//! |-----------------|-------------------------|
//! | `[translation]` | [`TranslationSettings`] |
//! | `[clipboard]`   | [`ClipboardSettings`]   |
//! | `[worker]`      | [`WorkerSettings`]      |
//! | `[logging]`     | [`LoggingSettings`]     |
//!
//! A missing file yields defaults; unknown keys are ignored.
//!
//! # Example
//!
//! ```no_run
//! use cliptrans::config::ConfigFile;
//!
//! let config = ConfigFile::load()?;
//! let pipeline_config = config.pipeline_config();
//! # Ok::<(), cliptrans::config::ConfigFileError>(())
//! ```

mod defaults;
mod file;
mod parser;
mod settings;
mod writer;

pub use defaults::*;
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{
    ClipboardSettings, ConfigFile, LoggingSettings, TranslationSettings, WorkerSettings,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::ClipboardMode;
    use crate::engine::EngineConfig;
    use std::time::Duration;

    #[test]
    fn test_engine_configs_use_configured_urls() {
        let mut config = ConfigFile::default();
        config.translation.engines = vec!["libretranslate".into(), "google".into()];
        config.translation.libretranslate_url = "http://localhost:5000".into();
        config.translation.libretranslate_api_key = Some("k".into());
        config.translation.google_url = "http://google.test".into();

        assert_eq!(
            config.translation.engine_configs(),
            vec![
                EngineConfig::libretranslate("http://localhost:5000", Some("k".into())),
                EngineConfig::Google {
                    base_url: "http://google.test".into()
                },
            ]
        );
    }

    #[test]
    fn test_pipeline_config_mapping() {
        let mut config = ConfigFile::default();
        config.clipboard.mode = Some(ClipboardMode::Copy);
        config.clipboard.buffer_ms = 250;
        config.clipboard.overwrite = true;
        config.clipboard.join_lines = false;
        config.worker.queue_capacity = 2;
        config.worker.restart_delay_ms = 50;

        let pipeline = config.pipeline_config();
        assert_eq!(pipeline.mode(), Some(ClipboardMode::Copy));
        assert_eq!(pipeline.buftime(), Duration::from_millis(250));
        assert!(pipeline.overwrite());
        assert!(!pipeline.join_lines());
        assert_eq!(pipeline.queue_capacity(), 2);
        assert_eq!(pipeline.restart_delay(), Duration::from_millis(50));
    }

    #[test]
    fn test_timeout_duration() {
        let config = ConfigFile::default();
        assert_eq!(config.translation.timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }
}
