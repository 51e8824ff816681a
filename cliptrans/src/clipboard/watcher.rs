//! Polling change source for backends without native notifications.
//!
//! Backend reads may block (an X11 selection owner can take its time to
//! answer), so every poll and the listener calls it triggers run on tokio's
//! blocking pool, keeping debounce timers and the worker responsive.

use super::{ChangeListener, ChangeSource, ClipboardBackend, ClipboardMode};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, trace};

/// Default poll interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Polls every supported mode of a backend and reports changed buffers.
///
/// The first poll only records what each buffer holds, so text already on
/// the clipboard at startup is not reported. Afterwards a mode is reported
/// whenever its text differs from the last value seen for it.
pub struct ClipboardWatcher {
    backend: Arc<dyn ClipboardBackend>,
    interval: Duration,
    runtime: Handle,
}

impl ClipboardWatcher {
    /// Create a watcher; polling starts on [`attach`](ChangeSource::attach).
    pub fn new(backend: Arc<dyn ClipboardBackend>, interval: Duration, runtime: Handle) -> Self {
        Self {
            backend,
            interval,
            runtime,
        }
    }

    /// Poll interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl ChangeSource for ClipboardWatcher {
    fn attach(&self, listener: Arc<dyn ChangeListener>, shutdown: CancellationToken) {
        let poller = Poller {
            backend: Arc::clone(&self.backend),
            modes: self.backend.supported_modes(),
            last_seen: HashMap::new(),
        };
        let interval = self.interval;
        self.runtime.spawn(poller.run(interval, listener, shutdown));
    }
}

struct Poller {
    backend: Arc<dyn ClipboardBackend>,
    modes: Vec<ClipboardMode>,
    last_seen: HashMap<ClipboardMode, String>,
}

impl Poller {
    async fn run(
        mut self,
        interval: Duration,
        listener: Arc<dyn ChangeListener>,
        shutdown: CancellationToken,
    ) {
        debug!(
            interval_ms = interval.as_millis() as u64,
            modes = ?self.modes,
            "Clipboard watcher started"
        );

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let listener = Arc::clone(&listener);
            let polled = tokio::task::spawn_blocking(move || {
                for mode in self.poll() {
                    listener.on_change(mode);
                }
                self
            })
            .await;

            match polled {
                Ok(poller) => self = poller,
                Err(e) => {
                    error!(error = %e, "Clipboard poll task failed, watcher stopping");
                    return;
                }
            }
        }

        debug!("Clipboard watcher stopped");
    }

    /// Read every mode once and return the ones whose text changed.
    fn poll(&mut self) -> Vec<ClipboardMode> {
        let mut changed = Vec::new();
        for &mode in &self.modes {
            let text = match self.backend.read(mode) {
                Ok(text) => text,
                Err(e) => {
                    trace!(mode = %mode, error = %e, "Clipboard poll failed");
                    continue;
                }
            };

            // First observation (None) only primes the value
            let previous = self.last_seen.insert(mode, text.clone());
            if previous.is_some_and(|previous| previous != text) {
                changed.push(mode);
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::{ClipboardError, MemoryClipboard};
    use parking_lot::Mutex;

    struct Recorder(Mutex<Vec<(ClipboardMode, String)>>, Arc<MemoryClipboard>);

    impl ChangeListener for Recorder {
        fn on_change(&self, mode: ClipboardMode) {
            let text = self.1.read(mode).unwrap();
            self.0.lock().push((mode, text));
        }
    }

    fn setup() -> (Arc<MemoryClipboard>, Arc<Recorder>, CancellationToken) {
        let clip = Arc::new(MemoryClipboard::new(&[
            ClipboardMode::Copy,
            ClipboardMode::Select,
        ]));
        let recorder = Arc::new(Recorder(Mutex::new(Vec::new()), Arc::clone(&clip)));
        (clip, recorder, CancellationToken::new())
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_poll_only_primes() {
        let (clip, recorder, shutdown) = setup();
        clip.write(ClipboardMode::Copy, "already there").unwrap();

        let watcher = ClipboardWatcher::new(clip.clone(), Duration::from_millis(100), Handle::current());
        watcher.attach(recorder.clone(), shutdown.clone());

        tokio::time::sleep(Duration::from_millis(350)).await;
        assert!(recorder.0.lock().is_empty());
        shutdown.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_reports_changes_per_mode() {
        let (clip, recorder, shutdown) = setup();
        let watcher = ClipboardWatcher::new(clip.clone(), Duration::from_millis(100), Handle::current());
        watcher.attach(recorder.clone(), shutdown.clone());

        // Let the priming poll run
        tokio::time::sleep(Duration::from_millis(50)).await;

        clip.write(ClipboardMode::Select, "selected").unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        clip.write(ClipboardMode::Copy, "copied").unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(
            *recorder.0.lock(),
            vec![
                (ClipboardMode::Select, "selected".to_string()),
                (ClipboardMode::Copy, "copied".to_string()),
            ]
        );
        shutdown.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_unchanged_text_is_not_reported() {
        let (clip, recorder, shutdown) = setup();
        let watcher = ClipboardWatcher::new(clip.clone(), Duration::from_millis(100), Handle::current());
        watcher.attach(recorder.clone(), shutdown.clone());
        tokio::time::sleep(Duration::from_millis(50)).await;

        clip.write(ClipboardMode::Copy, "same").unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        clip.write(ClipboardMode::Copy, "same").unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;

        assert_eq!(recorder.0.lock().len(), 1);
        shutdown.cancel();
    }

    /// Backend whose reads take `delay` of wall-clock time.
    struct SlowClipboard {
        delay: Duration,
    }

    impl ClipboardBackend for SlowClipboard {
        fn supported_modes(&self) -> Vec<ClipboardMode> {
            vec![ClipboardMode::Copy]
        }

        fn read(&self, _mode: ClipboardMode) -> Result<String, ClipboardError> {
            std::thread::sleep(self.delay);
            Ok(String::new())
        }

        fn write(&self, _mode: ClipboardMode, _text: &str) -> Result<(), ClipboardError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_slow_backend_does_not_stall_runtime() {
        let (_, recorder, shutdown) = setup();
        let backend = Arc::new(SlowClipboard {
            delay: Duration::from_millis(300),
        });
        let watcher = ClipboardWatcher::new(backend, Duration::from_millis(50), Handle::current());
        watcher.attach(recorder, shutdown.clone());

        // Let the first poll get stuck in the backend
        tokio::time::sleep(Duration::from_millis(20)).await;

        let started = std::time::Instant::now();
        tokio::time::sleep(Duration::from_millis(100)).await;
        let elapsed = started.elapsed();
        shutdown.cancel();

        assert!(
            elapsed < Duration::from_millis(250),
            "timer delayed to {:?}",
            elapsed
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_on_cancellation() {
        let (clip, recorder, shutdown) = setup();
        let watcher = ClipboardWatcher::new(clip.clone(), Duration::from_millis(100), Handle::current());
        watcher.attach(recorder.clone(), shutdown.clone());
        tokio::time::sleep(Duration::from_millis(50)).await;

        shutdown.cancel();
        tokio::time::sleep(Duration::from_millis(10)).await;
        clip.write(ClipboardMode::Copy, "too late").unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;

        assert!(recorder.0.lock().is_empty());
    }
}
