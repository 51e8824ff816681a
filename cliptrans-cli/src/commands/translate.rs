//! Translate command - one-shot translation through the engine candidates.

use clap::Args;
use tracing::info;

use cliptrans::engine::{EngineFactory, TranslationRequest};
use cliptrans::languages::resolve_target;
use cliptrans::pipeline::join_lines;

use super::common::resolve_languages;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the translate command.
#[derive(Debug, Args)]
pub struct TranslateArgs {
    /// Text to translate
    pub text: String,

    /// Source language code or name (default from config)
    #[arg(long)]
    pub source: Option<String>,

    /// Target language code or name (default from config)
    #[arg(long)]
    pub target: Option<String>,

    /// Swap source and target languages
    #[arg(long)]
    pub swap: bool,

    /// Translation engine to try (repeat to set preference order)
    #[arg(long)]
    pub engine: Vec<String>,

    /// Enable debug-level logging
    #[arg(long)]
    pub debug: bool,
}

/// Run the translate command.
pub fn run(args: TranslateArgs) -> Result<(), CliError> {
    let runner = CliRunner::new(args.debug, false)?;
    runner.log_startup("translate");
    let config = runner.config();

    let text = if config.clipboard.join_lines {
        join_lines(&args.text)
    } else {
        args.text.clone()
    };
    if text.trim().is_empty() {
        return Err(CliError::Config("Nothing to translate".to_string()));
    }

    let (source, target) = resolve_languages(
        args.source.as_deref(),
        args.target.as_deref(),
        args.swap,
        config,
    );
    let target = resolve_target(&source, &target).to_string();
    let request = TranslationRequest::new(source, target, text);

    let factory = runner.create_factory(runner.engine_candidates(&args.engine)?)?;
    let translated = runner.block_on(async {
        let mut engine = factory.create().await?;
        info!(engine = engine.name(), "Translating");
        engine.translate(&request).await
    })?;

    println!("{}", translated);
    Ok(())
}
