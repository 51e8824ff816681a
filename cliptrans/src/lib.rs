//! cliptrans - clipboard-driven translation
//!
//! Watches a clipboard buffer, debounces bursts of changes, and feeds the
//! latest text through a translation engine running on a supervised worker.
//!
//! # High-Level API
//!
//! The [`pipeline`] module wires everything together:
//!
//! ```ignore
//! use cliptrans::clipboard::{ArboardClipboard, ClipboardWatcher, DEFAULT_POLL_INTERVAL};
//! use cliptrans::config::ConfigFile;
//! use cliptrans::engine::CandidateFactory;
//! use cliptrans::pipeline::Pipeline;
//!
//! let config = ConfigFile::load()?;
//! let backend = Arc::new(ArboardClipboard::new()?);
//! let watcher = Arc::new(ClipboardWatcher::new(backend.clone(), DEFAULT_POLL_INTERVAL, handle));
//! let factory = Arc::new(CandidateFactory::new(
//!     config.translation.engine_configs(),
//!     config.translation.timeout(),
//! )?);
//!
//! let pipeline = Pipeline::start(config.pipeline_config(), factory, watcher, backend, surface).await?;
//! pipeline.translate(Some("Hello".into()));
//! ```

pub mod callback;
pub mod clipboard;
pub mod config;
pub mod debounce;
pub mod engine;
pub mod languages;
pub mod logging;
pub mod pipeline;
pub mod queue;
pub mod time;
pub mod worker;

/// Version of the cliptrans library and CLI.
///
/// This is synchronized across all components in the workspace.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
