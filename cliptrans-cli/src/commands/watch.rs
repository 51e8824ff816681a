//! Watch command - translate clipboard changes until Ctrl-C.

use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::runtime::Handle;
use tracing::{info, warn};

use cliptrans::clipboard::{
    ArboardClipboard, ClipboardBackend, ClipboardMode, ClipboardWatcher, MemoryClipboard,
};
use cliptrans::config::ConfigFile;
use cliptrans::engine::CandidateFactory;
use cliptrans::pipeline::{Pipeline, PipelineConfig, PipelineStats};

use super::common::{parse_mode, resolve_languages};
use crate::display::ConsoleDisplay;
use crate::error::CliError;
use crate::runner::CliRunner;

/// How often drain progress is checked after stdin closes.
const DRAIN_POLL: Duration = Duration::from_millis(50);

/// Arguments for the watch command.
#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Source language code or name (default from config)
    #[arg(long)]
    pub source: Option<String>,

    /// Target language code or name (default from config)
    #[arg(long)]
    pub target: Option<String>,

    /// Clipboard mode to watch: copy, select, findbuf or none
    #[arg(long)]
    pub mode: Option<String>,

    /// Debounce time in milliseconds
    #[arg(long)]
    pub buffer_ms: Option<u64>,

    /// Write translations back to the clipboard
    #[arg(long)]
    pub overwrite: bool,

    /// Swap source and target languages
    #[arg(long)]
    pub swap: bool,

    /// Translation engine to try (repeat to set preference order)
    #[arg(long)]
    pub engine: Vec<String>,

    /// Pending translations kept while one is in flight
    #[arg(long)]
    pub queue_capacity: Option<usize>,

    /// Read lines from stdin instead of watching the system clipboard
    #[arg(long)]
    pub stdin: bool,

    /// Enable debug-level logging
    #[arg(long)]
    pub debug: bool,

    /// Mirror log output to stderr
    #[arg(long, short)]
    pub verbose: bool,
}

/// Run the watch command.
pub fn run(args: WatchArgs) -> Result<(), CliError> {
    let runner = CliRunner::new(args.debug, args.verbose)?;
    runner.log_startup("watch");
    let config = runner.config();

    let pipeline_config = resolve_pipeline_config(&args, config)?;
    let candidates = runner.engine_candidates(&args.engine)?;
    let factory = Arc::new(runner.create_factory(candidates)?);

    let (source, target) = resolve_languages(
        args.source.as_deref(),
        args.target.as_deref(),
        args.swap,
        config,
    );
    let display = ConsoleDisplay::new(source, target);
    // Input lines are already on the terminal; print translations only
    let display = Arc::new(if args.stdin { display.quiet() } else { display });
    eprintln!("cliptrans {} ({})", cliptrans::VERSION, display.describe());

    let poll_interval = Duration::from_millis(config.clipboard.poll_interval_ms);
    let stats = runner.block_on(async move {
        if args.stdin {
            watch_stdin(pipeline_config, factory, display).await
        } else {
            watch_clipboard(pipeline_config, factory, display, poll_interval).await
        }
    })?;

    eprintln!(
        "Translated {} text(s), {} failed, {} dropped, {} engine restart(s).",
        stats.completed, stats.failed, stats.evicted, stats.restarts
    );
    Ok(())
}

/// Merge CLI flags over the configured pipeline settings.
fn resolve_pipeline_config(
    args: &WatchArgs,
    config: &ConfigFile,
) -> Result<PipelineConfig, CliError> {
    let mut pipeline = config.pipeline_config();
    if let Some(mode) = &args.mode {
        pipeline = pipeline.with_mode(parse_mode(mode)?);
    }
    if let Some(ms) = args.buffer_ms {
        pipeline = pipeline.with_buftime(Duration::from_millis(ms));
    }
    if args.overwrite {
        pipeline = pipeline.with_overwrite(true);
    }
    if let Some(capacity) = args.queue_capacity {
        pipeline = pipeline.with_queue_capacity(capacity);
    }
    Ok(pipeline)
}

async fn watch_clipboard(
    config: PipelineConfig,
    factory: Arc<CandidateFactory>,
    display: Arc<ConsoleDisplay>,
    poll_interval: Duration,
) -> Result<PipelineStats, CliError> {
    let backend = Arc::new(ArboardClipboard::new()?);
    let watcher = Arc::new(ClipboardWatcher::new(
        backend.clone(),
        poll_interval,
        Handle::current(),
    ));

    let pipeline = Pipeline::start(config, factory, watcher, backend, display).await?;
    eprintln!(
        "Watching the {} clipboard (modes: {}). Press Ctrl+C to stop.",
        pipeline.mode_name(),
        pipeline.mode_names().join(", ")
    );

    wait_for_ctrl_c().await;
    info!("Shutdown requested");
    Ok(pipeline.shutdown().await)
}

async fn watch_stdin(
    config: PipelineConfig,
    factory: Arc<CandidateFactory>,
    display: Arc<ConsoleDisplay>,
) -> Result<PipelineStats, CliError> {
    let clipboard = Arc::new(MemoryClipboard::new(&[ClipboardMode::Copy]));
    let config = config.with_mode(Some(ClipboardMode::Copy));

    let pipeline = Pipeline::start(
        config,
        factory,
        clipboard.clone(),
        clipboard.clone(),
        display,
    )
    .await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    if let Err(e) = clipboard.write(ClipboardMode::Copy, &line) {
                        warn!(error = %e, "Failed to buffer input line");
                    }
                }
                Ok(None) => {
                    info!("Input closed, waiting for pending translations");
                    tokio::select! {
                        _ = drain(&pipeline) => {}
                        _ = wait_for_ctrl_c() => {}
                    }
                    break;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to read stdin");
                    break;
                }
            },
            _ = wait_for_ctrl_c() => {
                info!("Shutdown requested");
                break;
            }
        }
    }

    Ok(pipeline.shutdown().await)
}

/// Wait until the last burst has been dispatched and every queued request
/// was either processed or evicted.
async fn drain(pipeline: &Pipeline) {
    tokio::time::sleep(pipeline.buftime() + DRAIN_POLL).await;
    let mut ticker = tokio::time::interval(DRAIN_POLL);
    loop {
        ticker.tick().await;
        let stats = pipeline.stats();
        if stats.completed + stats.failed + stats.evicted >= stats.dispatched {
            return;
        }
    }
}

async fn wait_for_ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: WatchArgs,
    }

    fn parse(argv: &[&str]) -> WatchArgs {
        let mut full = vec!["watch"];
        full.extend_from_slice(argv);
        TestCli::try_parse_from(full).unwrap().args
    }

    #[test]
    fn test_flags_override_config() {
        let args = parse(&[
            "--mode",
            "none",
            "--buffer-ms",
            "0",
            "--overwrite",
            "--queue-capacity",
            "4",
        ]);
        let config = resolve_pipeline_config(&args, &ConfigFile::default()).unwrap();

        assert_eq!(config.mode(), None);
        assert_eq!(config.buftime(), Duration::ZERO);
        assert!(config.overwrite());
        assert_eq!(config.queue_capacity(), 4);
    }

    #[test]
    fn test_config_used_without_flags() {
        let args = parse(&[]);
        let file = ConfigFile::default();
        let config = resolve_pipeline_config(&args, &file).unwrap();
        assert_eq!(config, file.pipeline_config());
    }

    #[test]
    fn test_invalid_mode_flag() {
        let args = parse(&["--mode", "everything"]);
        assert!(resolve_pipeline_config(&args, &ConfigFile::default()).is_err());
    }
}
