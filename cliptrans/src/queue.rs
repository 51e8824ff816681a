//! Bounded request queue with drop-oldest backpressure.
//!
//! Producers never wait: when the queue is full, the oldest queued request
//! is evicted to make room. With the default capacity of one, this means a
//! request that has not started yet is replaced by the newest one, and the
//! worker always translates the most recent text.

use crate::engine::TranslationRequest;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Notify;
use tracing::{debug, warn};

/// Default queue capacity.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1;

/// Bounded FIFO of pending translation requests.
#[derive(Debug)]
pub struct RequestQueue {
    items: Mutex<VecDeque<TranslationRequest>>,
    capacity: usize,
    available: Notify,
    evicted: AtomicU64,
}

impl RequestQueue {
    /// Create a queue holding at most `capacity` requests.
    ///
    /// A capacity of zero is clamped to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = if capacity == 0 {
            warn!("Request queue capacity of 0 is invalid, using 1");
            1
        } else {
            capacity
        };

        Self {
            items: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            available: Notify::new(),
            evicted: AtomicU64::new(0),
        }
    }

    /// Add a request without blocking.
    ///
    /// Returns the request evicted to make room, if any.
    pub fn enqueue(&self, request: TranslationRequest) -> Option<TranslationRequest> {
        let evicted = {
            let mut items = self.items.lock();
            let evicted = if items.len() >= self.capacity {
                items.pop_front()
            } else {
                None
            };
            items.push_back(request);
            evicted
        };

        if let Some(ref old) = evicted {
            self.evicted.fetch_add(1, Ordering::Relaxed);
            debug!(
                chars = old.source_text.chars().count(),
                capacity = self.capacity,
                "Queue full, dropped oldest request"
            );
        }

        self.available.notify_one();
        evicted
    }

    /// Wait for and remove the oldest request.
    pub async fn dequeue(&self) -> TranslationRequest {
        loop {
            // Register interest before checking so a concurrent enqueue is not missed
            let notified = self.available.notified();
            if let Some(request) = self.try_dequeue() {
                return request;
            }
            notified.await;
        }
    }

    /// Remove the oldest request if one is queued.
    pub fn try_dequeue(&self) -> Option<TranslationRequest> {
        self.items.lock().pop_front()
    }

    /// Number of queued requests.
    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    /// Returns true if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    /// Maximum number of queued requests.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total number of requests dropped by backpressure.
    pub fn evicted_count(&self) -> u64 {
        self.evicted.load(Ordering::Relaxed)
    }
}

impl Default for RequestQueue {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Arc;
    use std::time::Duration;

    fn req(text: &str) -> TranslationRequest {
        TranslationRequest::new("en", "ja", text)
    }

    #[test]
    fn test_capacity_one_keeps_newest() {
        let queue = RequestQueue::default();

        assert!(queue.enqueue(req("A")).is_none());
        assert_eq!(queue.enqueue(req("B")).unwrap().source_text, "A");
        assert_eq!(queue.enqueue(req("C")).unwrap().source_text, "B");

        assert_eq!(queue.len(), 1);
        assert_eq!(queue.evicted_count(), 2);
        assert_eq!(queue.try_dequeue().unwrap().source_text, "C");
        assert!(queue.try_dequeue().is_none());
    }

    #[test]
    fn test_fifo_among_survivors() {
        let queue = RequestQueue::new(3);
        for text in ["1", "2", "3", "4"] {
            queue.enqueue(req(text));
        }

        let order: Vec<String> = std::iter::from_fn(|| queue.try_dequeue())
            .map(|r| r.source_text)
            .collect();
        assert_eq!(order, vec!["2", "3", "4"]);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let queue = RequestQueue::new(0);
        assert_eq!(queue.capacity(), 1);
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn test_dequeue_waits_for_enqueue() {
        let queue = Arc::new(RequestQueue::default());
        let consumer = {
            let queue = Arc::clone(&queue);
            tokio::spawn(async move { queue.dequeue().await })
        };

        tokio::task::yield_now().await;
        assert!(!consumer.is_finished());

        queue.enqueue(req("late"));
        let got = tokio::time::timeout(Duration::from_secs(1), consumer)
            .await
            .expect("dequeue should wake")
            .unwrap();
        assert_eq!(got.source_text, "late");
    }

    #[tokio::test]
    async fn test_dequeue_returns_immediately_when_filled() {
        let queue = RequestQueue::new(2);
        queue.enqueue(req("ready"));
        assert_eq!(queue.dequeue().await.source_text, "ready");
    }

    proptest! {
        #[test]
        fn prop_len_never_exceeds_capacity(
            capacity in 0usize..6,
            ops in proptest::collection::vec(any::<bool>(), 0..64),
        ) {
            let queue = RequestQueue::new(capacity);
            let mut pushed = 0u64;
            for (i, push) in ops.into_iter().enumerate() {
                if push {
                    queue.enqueue(req(&i.to_string()));
                    pushed += 1;
                } else {
                    queue.try_dequeue();
                }
                prop_assert!(queue.len() <= queue.capacity());
            }
            prop_assert!(queue.evicted_count() <= pushed);
        }

        #[test]
        fn prop_newest_always_survives(capacity in 1usize..6, count in 1usize..32) {
            let queue = RequestQueue::new(capacity);
            for i in 0..count {
                queue.enqueue(req(&i.to_string()));
            }
            let last = std::iter::from_fn(|| queue.try_dequeue()).last().unwrap();
            prop_assert_eq!(last.source_text, (count - 1).to_string());
        }
    }
}
