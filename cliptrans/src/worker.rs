//! Single-flight translation worker.
//!
//! Exactly one worker task owns the engine. It pulls one request at a time
//! from the [`RequestQueue`], translates it and publishes the result.
//!
//! # State Machine
//!
//! ```text
//!   Starting ──► Ready ──► Translating ──► Ready
//!                              │
//!                              │ TransportFault
//!                              ▼
//!                          Restarting ──► (rebuild ok) ──► Translating (same request)
//!                              ▲               │
//!                              └── rebuild failed, wait restart_delay
//! ```
//!
//! # Failure Handling
//!
//! | Error                                   | Action                              |
//! |-----------------------------------------|-------------------------------------|
//! | `ContentTimeout`, `Rejected`, `InvalidResponse` | publish `""`, keep engine   |
//! | `TransportFault`                        | drop engine, rebuild, retry request |
//!
//! Rebuilds and retries are unbounded; the loop only ends on shutdown.

use crate::callback::CallbackSlot;
use crate::engine::{EngineError, EngineFactory, TranslationEngine, TranslationRequest};
use crate::queue::RequestQueue;
use crate::time::Timer;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Default delay before rebuilding a failed engine.
pub const DEFAULT_RESTART_DELAY: Duration = Duration::from_millis(1000);

/// Observable worker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Building the first engine
    Starting,
    /// Waiting for a request
    Ready,
    /// A request is in flight
    Translating,
    /// Engine dropped after a transport fault, being rebuilt
    Restarting,
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkerState::Starting => "starting",
            WorkerState::Ready => "ready",
            WorkerState::Translating => "translating",
            WorkerState::Restarting => "restarting",
        };
        f.write_str(name)
    }
}

/// A published translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationResult {
    /// The request that produced this result.
    pub request: TranslationRequest,
    /// Translated text; empty when the request failed at content level.
    pub text: String,
}

/// Worker counters.
#[derive(Debug, Default)]
pub struct WorkerStats {
    completed: AtomicU64,
    failed: AtomicU64,
    restarts: AtomicU64,
}

impl WorkerStats {
    /// Requests that produced a translation.
    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }

    /// Requests that ended in a content-level failure.
    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    /// Engine rebuilds after transport faults.
    pub fn restarts(&self) -> u64 {
        self.restarts.load(Ordering::Relaxed)
    }
}

/// The worker before it is started.
pub struct Worker {
    queue: Arc<RequestQueue>,
    factory: Arc<dyn EngineFactory>,
    timer: Arc<dyn Timer>,
    restart_delay: Duration,
    results: Arc<CallbackSlot<TranslationResult>>,
    stats: Arc<WorkerStats>,
    state: watch::Sender<WorkerState>,
}

impl Worker {
    /// Create a worker draining `queue` with engines built by `factory`.
    ///
    /// A transport fault rebuilds the engine after `restart_delay`.
    pub fn new(
        queue: Arc<RequestQueue>,
        factory: Arc<dyn EngineFactory>,
        timer: Arc<dyn Timer>,
        restart_delay: Duration,
    ) -> Self {
        let (state, _) = watch::channel(WorkerState::Starting);
        Self {
            queue,
            factory,
            timer,
            restart_delay,
            results: Arc::new(CallbackSlot::new("translation_result")),
            stats: Arc::new(WorkerStats::default()),
            state,
        }
    }

    /// Register the consumer of translation results.
    pub fn on_result<F>(&self, callback: F)
    where
        F: Fn(TranslationResult) + Send + Sync + 'static,
    {
        self.results.set(callback);
    }

    /// Build the first engine and spawn the worker loop.
    ///
    /// Fails if the factory cannot build an engine; nothing is spawned then.
    pub async fn start(self, shutdown: CancellationToken) -> Result<WorkerHandle, EngineError> {
        let engine = self.factory.create().await?;
        info!(engine = engine.name(), "Translation worker starting");

        let handle_state = self.state.subscribe();
        let stats = Arc::clone(&self.stats);
        self.state.send_replace(WorkerState::Ready);
        let task = tokio::spawn(self.run(engine, shutdown));

        Ok(WorkerHandle {
            state: handle_state,
            stats,
            task,
        })
    }

    fn set_state(&self, state: WorkerState) {
        self.state.send_replace(state);
    }

    async fn run(self, mut engine: Box<dyn TranslationEngine>, shutdown: CancellationToken) {
        loop {
            let request = tokio::select! {
                _ = shutdown.cancelled() => break,
                request = self.queue.dequeue() => request,
            };

            let text = loop {
                self.set_state(WorkerState::Translating);
                debug!(
                    engine = engine.name(),
                    source = %request.source_lang,
                    target = %request.target_lang,
                    chars = request.source_text.chars().count(),
                    "Translating"
                );

                let outcome = tokio::select! {
                    _ = shutdown.cancelled() => return self.stop(),
                    outcome = engine.translate(&request) => outcome,
                };

                match outcome {
                    Ok(text) => {
                        self.stats.completed.fetch_add(1, Ordering::Relaxed);
                        break text;
                    }
                    Err(e) if e.requires_restart() => {
                        warn!(engine = engine.name(), error = %e, "Engine failed, restarting");
                        self.set_state(WorkerState::Restarting);
                        drop(engine);
                        engine = match self.rebuild(&shutdown).await {
                            Some(engine) => engine,
                            None => return self.stop(),
                        };
                        self.stats.restarts.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(e) => {
                        warn!(engine = engine.name(), error = %e, "Translation failed");
                        self.stats.failed.fetch_add(1, Ordering::Relaxed);
                        break String::new();
                    }
                }
            };

            self.set_state(WorkerState::Ready);
            self.results.invoke(TranslationResult { request, text });
        }

        self.stop();
    }

    /// Rebuild the engine, retrying after `restart_delay` until it works.
    ///
    /// Returns `None` if shutdown was requested meanwhile.
    async fn rebuild(&self, shutdown: &CancellationToken) -> Option<Box<dyn TranslationEngine>> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            tokio::select! {
                _ = shutdown.cancelled() => return None,
                _ = self.timer.sleep(self.restart_delay) => {}
            }

            let created = tokio::select! {
                _ = shutdown.cancelled() => return None,
                created = self.factory.create() => created,
            };

            match created {
                Ok(engine) => {
                    info!(engine = engine.name(), attempt, "Engine rebuilt");
                    return Some(engine);
                }
                Err(e) => {
                    warn!(
                        attempt,
                        error = %e,
                        retry_in_ms = self.restart_delay.as_millis() as u64,
                        "Engine rebuild failed"
                    );
                }
            }
        }
    }

    fn stop(&self) {
        debug!(
            completed = self.stats.completed(),
            failed = self.stats.failed(),
            restarts = self.stats.restarts(),
            "Translation worker stopped"
        );
    }
}

/// Handle to a running worker.
pub struct WorkerHandle {
    state: watch::Receiver<WorkerState>,
    stats: Arc<WorkerStats>,
    task: JoinHandle<()>,
}

impl WorkerHandle {
    /// Current state.
    pub fn state(&self) -> WorkerState {
        *self.state.borrow()
    }

    /// A receiver that observes state changes.
    pub fn subscribe(&self) -> watch::Receiver<WorkerState> {
        self.state.clone()
    }

    /// Worker counters.
    pub fn stats(&self) -> &WorkerStats {
        &self.stats
    }

    /// Returns true once the loop has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the loop to exit (after shutdown was requested).
    pub async fn join(self) {
        if let Err(e) = self.task.await {
            warn!(error = %e, "Translation worker task failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::BoxFuture;
    use crate::time::TokioTimer;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use tokio::sync::mpsc;

    type Script = Arc<Mutex<VecDeque<Result<String, EngineError>>>>;

    /// Engine that pops scripted outcomes, then echoes.
    struct ScriptedEngine {
        script: Script,
    }

    impl TranslationEngine for ScriptedEngine {
        fn name(&self) -> &str {
            "scripted"
        }

        fn translate<'a>(
            &'a mut self,
            request: &'a TranslationRequest,
        ) -> BoxFuture<'a, Result<String, EngineError>> {
            let next = self.script.lock().pop_front();
            Box::pin(async move {
                next.unwrap_or_else(|| Ok(format!("<{}>", request.source_text)))
            })
        }
    }

    struct ScriptedFactory {
        script: Script,
        failures_left: Mutex<u32>,
        creates: AtomicU64,
    }

    impl ScriptedFactory {
        fn new(outcomes: Vec<Result<String, EngineError>>, create_failures: u32) -> Arc<Self> {
            Arc::new(Self {
                script: Arc::new(Mutex::new(outcomes.into())),
                failures_left: Mutex::new(create_failures),
                creates: AtomicU64::new(0),
            })
        }

        fn creates(&self) -> u64 {
            self.creates.load(Ordering::SeqCst)
        }
    }

    impl EngineFactory for ScriptedFactory {
        fn create(&self) -> BoxFuture<'_, Result<Box<dyn TranslationEngine>, EngineError>> {
            Box::pin(async move {
                self.creates.fetch_add(1, Ordering::SeqCst);
                let mut left = self.failures_left.lock();
                if *left > 0 {
                    *left -= 1;
                    return Err(EngineError::NoEngineAvailable {
                        attempted: vec!["scripted".into()],
                    });
                }
                Ok(Box::new(ScriptedEngine {
                    script: Arc::clone(&self.script),
                }) as Box<dyn TranslationEngine>)
            })
        }
    }

    struct Harness {
        queue: Arc<RequestQueue>,
        results: mpsc::UnboundedReceiver<TranslationResult>,
        handle: WorkerHandle,
        shutdown: CancellationToken,
    }

    async fn start(factory: Arc<ScriptedFactory>) -> Harness {
        let queue = Arc::new(RequestQueue::new(4));
        let worker = Worker::new(
            Arc::clone(&queue),
            factory,
            Arc::new(TokioTimer),
            Duration::from_millis(1000),
        );
        let (tx, results) = mpsc::unbounded_channel();
        worker.on_result(move |r| {
            let _ = tx.send(r);
        });
        let shutdown = CancellationToken::new();
        let handle = worker.start(shutdown.clone()).await.unwrap();
        Harness {
            queue,
            results,
            handle,
            shutdown,
        }
    }

    fn req(text: &str) -> TranslationRequest {
        TranslationRequest::new("en", "ja", text)
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_is_published() {
        let factory = ScriptedFactory::new(vec![Ok("こんにちは".into())], 0);
        let mut h = start(factory).await;
        assert_eq!(h.handle.state(), WorkerState::Ready);

        h.queue.enqueue(req("Hello"));
        let result = h.results.recv().await.unwrap();
        assert_eq!(result.text, "こんにちは");
        assert_eq!(result.request, req("Hello"));
        assert_eq!(h.handle.stats().completed(), 1);

        h.shutdown.cancel();
        h.handle.join().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_content_failure_publishes_empty_without_restart() {
        let factory = ScriptedFactory::new(
            vec![Err(EngineError::ContentTimeout(Duration::from_secs(5)))],
            0,
        );
        let mut h = start(Arc::clone(&factory)).await;

        h.queue.enqueue(req("slow"));
        assert_eq!(h.results.recv().await.unwrap().text, "");

        h.queue.enqueue(req("next"));
        assert_eq!(h.results.recv().await.unwrap().text, "<next>");
        assert_eq!(factory.creates(), 1);
        assert_eq!(h.handle.stats().failed(), 1);
        h.shutdown.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_fault_rebuilds_and_retries_same_request() {
        let factory = ScriptedFactory::new(
            vec![Err(EngineError::TransportFault("connection reset".into()))],
            0,
        );
        let mut h = start(Arc::clone(&factory)).await;
        let mut states = h.handle.subscribe();

        let started = tokio::time::Instant::now();
        h.queue.enqueue(req("R"));

        states
            .wait_for(|s| *s == WorkerState::Restarting)
            .await
            .unwrap();

        let result = h.results.recv().await.unwrap();
        assert_eq!(result.text, "<R>");
        assert!(started.elapsed() >= Duration::from_millis(1000));
        assert_eq!(factory.creates(), 2);
        assert_eq!(h.handle.stats().restarts(), 1);

        // Exactly once
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(h.results.try_recv().is_err());
        h.shutdown.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_rebuild_retries_until_factory_succeeds() {
        let factory = ScriptedFactory::new(
            vec![Err(EngineError::TransportFault("gone".into()))],
            0,
        );
        let mut h = start(Arc::clone(&factory)).await;
        // Next two rebuilds fail
        *factory.failures_left.lock() = 2;

        let started = tokio::time::Instant::now();
        h.queue.enqueue(req("R"));
        assert_eq!(h.results.recv().await.unwrap().text, "<R>");

        assert_eq!(factory.creates(), 4);
        assert!(started.elapsed() >= Duration::from_millis(3000));
        h.shutdown.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_fails_when_no_engine() {
        let queue = Arc::new(RequestQueue::default());
        let factory = ScriptedFactory::new(Vec::new(), 1);
        let worker = Worker::new(queue, factory, Arc::new(TokioTimer), DEFAULT_RESTART_DELAY);

        let result = worker.start(CancellationToken::new()).await;
        assert!(matches!(result, Err(EngineError::NoEngineAvailable { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_during_restart_stops_loop() {
        let factory = ScriptedFactory::new(
            vec![Err(EngineError::TransportFault("gone".into()))],
            0,
        );
        let h = start(factory).await;
        let mut states = h.handle.subscribe();
        h.queue.enqueue(req("R"));
        states
            .wait_for(|s| *s == WorkerState::Restarting)
            .await
            .unwrap();

        h.shutdown.cancel();
        h.handle.join().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_result_callback_keeps_worker_alive() {
        let queue = Arc::new(RequestQueue::new(4));
        let factory = ScriptedFactory::new(Vec::new(), 0);
        let worker = Worker::new(
            Arc::clone(&queue),
            factory,
            Arc::new(TokioTimer),
            DEFAULT_RESTART_DELAY,
        );
        let shutdown = CancellationToken::new();
        let handle = worker.start(shutdown.clone()).await.unwrap();

        queue.enqueue(req("dropped"));
        queue.enqueue(req("also dropped"));
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert!(queue.is_empty());
        assert_eq!(handle.stats().completed(), 2);
        assert!(!handle.is_finished());
        shutdown.cancel();
        handle.join().await;
    }
}
