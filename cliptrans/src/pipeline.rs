//! Clipboard-to-translation pipeline.
//!
//! [`Pipeline::start`] builds and owns every component:
//!
//! ```text
//! ChangeSource ──► ChangeMonitor ──► DebounceBuffer ──► Dispatcher
//!                       ▲                                   │ enqueue
//!                       │ overwrite (optional)              ▼
//!              DisplaySurface ◄── result callback ◄── Worker ◄── RequestQueue
//! ```
//!
//! The dispatcher is the only producer for the queue. It joins lines,
//! resolves the language pair from the display surface and skips empty or
//! repeated requests before anything reaches the worker.

use crate::clipboard::{
    ChangeMonitor, ChangeSource, ClipboardBackend, ClipboardError, ClipboardMode,
};
use crate::debounce::{DebounceBuffer, DEFAULT_BUFTIME};
use crate::engine::{EngineError, EngineFactory, TranslationRequest};
use crate::languages::resolve_target;
use crate::queue::{RequestQueue, DEFAULT_QUEUE_CAPACITY};
use crate::time::{Timer, TokioTimer};
use crate::worker::{Worker, WorkerHandle, WorkerState, DEFAULT_RESTART_DELAY};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Pipeline errors.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// No translation engine could be built at startup
    #[error("Translation provider unavailable: {0}")]
    ProviderUnavailable(#[source] EngineError),
}

/// Where the pipeline shows text and reads the language pair.
///
/// This is the boundary to a user interface. The surface calls back into
/// the pipeline only through [`Pipeline::translate`].
pub trait DisplaySurface: Send + Sync {
    /// Show the text about to be translated.
    fn set_source_text(&self, text: &str);

    /// Show a translation result (empty on failure).
    fn set_target_text(&self, text: &str);

    /// Currently selected `(source, target)` language codes.
    fn languages(&self) -> (String, String);
}

/// Pipeline settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    mode: Option<ClipboardMode>,
    buftime: Duration,
    queue_capacity: usize,
    restart_delay: Duration,
    overwrite: bool,
    join_lines: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            mode: Some(ClipboardMode::platform_default()),
            buftime: DEFAULT_BUFTIME,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            restart_delay: DEFAULT_RESTART_DELAY,
            overwrite: false,
            join_lines: true,
        }
    }
}

impl PipelineConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clipboard mode to monitor (`None` disables monitoring).
    pub fn with_mode(mut self, mode: Option<ClipboardMode>) -> Self {
        self.mode = mode;
        self
    }

    /// Debounce time (zero disables buffering).
    pub fn with_buftime(mut self, buftime: Duration) -> Self {
        self.buftime = buftime;
        self
    }

    /// Request queue capacity (zero is clamped to one).
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Delay before rebuilding a failed engine.
    pub fn with_restart_delay(mut self, delay: Duration) -> Self {
        self.restart_delay = delay;
        self
    }

    /// Write results back to the clipboard.
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Join multi-line source text with spaces.
    pub fn with_join_lines(mut self, join_lines: bool) -> Self {
        self.join_lines = join_lines;
        self
    }

    /// Clipboard mode to monitor.
    pub fn mode(&self) -> Option<ClipboardMode> {
        self.mode
    }

    /// Debounce time.
    pub fn buftime(&self) -> Duration {
        self.buftime
    }

    /// Request queue capacity as configured.
    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }

    /// Delay before rebuilding a failed engine.
    pub fn restart_delay(&self) -> Duration {
        self.restart_delay
    }

    /// Whether results are written back to the clipboard.
    pub fn overwrite(&self) -> bool {
        self.overwrite
    }

    /// Whether multi-line source text is joined.
    pub fn join_lines(&self) -> bool {
        self.join_lines
    }
}

/// Snapshot of pipeline counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Requests handed to the queue
    pub dispatched: u64,
    /// Requests skipped as empty or identical to the previous one
    pub skipped: u64,
    /// Queued requests dropped by backpressure
    pub evicted: u64,
    /// Requests translated successfully
    pub completed: u64,
    /// Requests that failed at content level
    pub failed: u64,
    /// Engine rebuilds
    pub restarts: u64,
}

/// Join the lines of `text` with single spaces.
///
/// Text copied from PDFs and terminals is hard-wrapped; translating it line
/// by line breaks sentences apart.
pub fn join_lines(text: &str) -> String {
    text.lines().collect::<Vec<_>>().join(" ")
}

#[derive(Debug, Default)]
struct DispatchMemory {
    last_request: Option<TranslationRequest>,
    last_source: Option<String>,
}

/// Turns source text into queued requests.
struct Dispatcher {
    queue: Arc<RequestQueue>,
    surface: Arc<dyn DisplaySurface>,
    monitor: Weak<ChangeMonitor>,
    join_lines: bool,
    memory: Mutex<DispatchMemory>,
    dispatched: AtomicU64,
    skipped: AtomicU64,
}

impl Dispatcher {
    /// Dispatch `text`, or the last source text when `None`.
    ///
    /// Returns true if a request was enqueued.
    fn translate(&self, text: Option<String>) -> bool {
        let text = match text {
            Some(text) => text,
            None => self.fallback_text(),
        };
        let text = if self.join_lines {
            join_lines(&text)
        } else {
            text
        };

        if text.trim().is_empty() {
            self.skipped.fetch_add(1, Ordering::Relaxed);
            debug!("Skipping empty source text");
            return false;
        }

        let (source, target) = self.surface.languages();
        let target = resolve_target(&source, &target).to_string();
        let request = TranslationRequest::new(source, target, text);

        {
            let mut memory = self.memory.lock();
            if memory.last_request.as_ref() == Some(&request) {
                drop(memory);
                self.skipped.fetch_add(1, Ordering::Relaxed);
                debug!("Skipping request identical to the previous one");
                return false;
            }
            memory.last_request = Some(request.clone());
            memory.last_source = Some(request.source_text.clone());
        }

        self.surface.set_source_text(&request.source_text);
        debug!(
            source = %request.source_lang,
            target = %request.target_lang,
            chars = request.source_text.chars().count(),
            "Dispatching translation request"
        );
        self.queue.enqueue(request);
        self.dispatched.fetch_add(1, Ordering::Relaxed);
        true
    }

    fn fallback_text(&self) -> String {
        let last = self.memory.lock().last_source.clone();
        match last {
            Some(text) => text,
            None => self
                .monitor
                .upgrade()
                .map(|monitor| monitor.get_text())
                .unwrap_or_default(),
        }
    }
}

/// A running pipeline.
pub struct Pipeline {
    monitor: Arc<ChangeMonitor>,
    debounce: DebounceBuffer,
    dispatcher: Arc<Dispatcher>,
    queue: Arc<RequestQueue>,
    overwrite: Arc<AtomicBool>,
    worker: Option<WorkerHandle>,
    shutdown: CancellationToken,
}

impl Pipeline {
    /// Build every component, start the worker and attach to `source`.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// [`PipelineError::ProviderUnavailable`] if no engine can be built.
    pub async fn start(
        config: PipelineConfig,
        factory: Arc<dyn EngineFactory>,
        source: Arc<dyn ChangeSource>,
        backend: Arc<dyn ClipboardBackend>,
        surface: Arc<dyn DisplaySurface>,
    ) -> Result<Self, PipelineError> {
        let timer: Arc<dyn Timer> = Arc::new(TokioTimer::new());
        let shutdown = CancellationToken::new();

        let queue = Arc::new(RequestQueue::new(config.queue_capacity));
        let monitor = Arc::new(ChangeMonitor::new(backend, config.mode));
        let overwrite = Arc::new(AtomicBool::new(config.overwrite));

        let dispatcher = Arc::new(Dispatcher {
            queue: Arc::clone(&queue),
            surface: Arc::clone(&surface),
            monitor: Arc::downgrade(&monitor),
            join_lines: config.join_lines,
            memory: Mutex::new(DispatchMemory::default()),
            dispatched: AtomicU64::new(0),
            skipped: AtomicU64::new(0),
        });

        let runtime = Handle::current();
        let debounce = DebounceBuffer::new(config.buftime, Arc::clone(&timer), runtime.clone());
        {
            let debounce = debounce.clone();
            let dispatcher = Arc::clone(&dispatcher);
            monitor.set_callback(move |text| {
                let dispatcher = Arc::clone(&dispatcher);
                debounce.invoke(
                    move |text: String| {
                        dispatcher.translate(Some(text));
                    },
                    text,
                );
            });
        }

        let worker = Worker::new(Arc::clone(&queue), factory, timer, config.restart_delay);
        {
            let monitor = Arc::clone(&monitor);
            let overwrite = Arc::clone(&overwrite);
            worker.on_result(move |result| {
                surface.set_target_text(&result.text);
                if overwrite.load(Ordering::Relaxed) && !result.text.is_empty() {
                    // Clipboard writes can block; keep them off the worker task
                    let monitor = Arc::clone(&monitor);
                    runtime.spawn_blocking(move || monitor.overwrite(&result.text));
                }
            });
        }

        let worker = worker
            .start(shutdown.child_token())
            .await
            .map_err(PipelineError::ProviderUnavailable)?;

        source.attach(monitor.clone(), shutdown.child_token());

        info!(
            mode = monitor.mode_name(),
            buftime_ms = config.buftime.as_millis() as u64,
            queue_capacity = queue.capacity(),
            overwrite = config.overwrite,
            "Translation pipeline started"
        );

        Ok(Self {
            monitor,
            debounce,
            dispatcher,
            queue,
            overwrite,
            worker: Some(worker),
            shutdown,
        })
    }

    /// Translate `text`, or re-translate the last source text when `None`.
    ///
    /// Without a previous source text, `None` reads the clipboard. Returns
    /// true if a request was enqueued.
    pub fn translate(&self, text: Option<String>) -> bool {
        self.dispatcher.translate(text)
    }

    /// Switch the monitored clipboard mode by name.
    pub fn set_mode(&self, name: &str) -> Result<(), ClipboardError> {
        self.monitor.set_mode(name)
    }

    /// Active clipboard mode name.
    pub fn mode_name(&self) -> &'static str {
        self.monitor.mode_name()
    }

    /// Selectable clipboard mode names.
    pub fn mode_names(&self) -> Vec<&'static str> {
        self.monitor.mode_names()
    }

    /// Enable or disable writing results back to the clipboard.
    pub fn set_overwrite(&self, overwrite: bool) {
        self.overwrite.store(overwrite, Ordering::Relaxed);
        info!(overwrite, "Clipboard overwrite changed");
    }

    /// Whether results are currently written back to the clipboard.
    pub fn overwrite(&self) -> bool {
        self.overwrite.load(Ordering::Relaxed)
    }

    /// Change the debounce time for subsequent bursts.
    pub fn set_buftime(&self, buftime: Duration) {
        self.debounce.set_buftime(buftime);
        info!(buftime_ms = buftime.as_millis() as u64, "Debounce time changed");
    }

    /// Current debounce time.
    pub fn buftime(&self) -> Duration {
        self.debounce.buftime()
    }

    /// Current worker state.
    pub fn worker_state(&self) -> WorkerState {
        self.worker
            .as_ref()
            .map(WorkerHandle::state)
            .unwrap_or(WorkerState::Starting)
    }

    /// Observe worker state changes.
    pub fn subscribe_worker_state(&self) -> Option<watch::Receiver<WorkerState>> {
        self.worker.as_ref().map(WorkerHandle::subscribe)
    }

    /// Snapshot of the pipeline counters.
    pub fn stats(&self) -> PipelineStats {
        let mut stats = PipelineStats {
            dispatched: self.dispatcher.dispatched.load(Ordering::Relaxed),
            skipped: self.dispatcher.skipped.load(Ordering::Relaxed),
            evicted: self.queue.evicted_count(),
            ..PipelineStats::default()
        };
        if let Some(worker) = &self.worker {
            stats.completed = worker.stats().completed();
            stats.failed = worker.stats().failed();
            stats.restarts = worker.stats().restarts();
        }
        stats
    }

    /// Stop the change source and the worker, and wait for the worker to exit.
    pub async fn shutdown(mut self) -> PipelineStats {
        self.shutdown.cancel();
        let stats = self.stats();
        if let Some(worker) = self.worker.take() {
            worker.join().await;
        }
        info!(?stats, "Translation pipeline stopped");
        stats
    }
}

impl Drop for Pipeline {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
