//! Single-flight registry for coalescing concurrent fetches
//!
//! At most one producer runs per key at any instant. The first caller for a
//! key becomes the leader: it registers the key, spawns the producer, and
//! every caller (leader included) awaits the broadcast of the one result.
//! The registry entry is removed before the result is broadcast, and removal
//! is guaranteed by a drop guard even if the producer panics, so a key can
//! never stay wedged.
//!
//! The producer is spawned rather than driven by the leader's task: a waiter
//! that stops waiting does not cancel the fetch, which still completes and
//! populates whatever state the producer owns.

use crate::types::Ticker;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

type PendingMap<T> = Arc<Mutex<HashMap<Ticker, broadcast::Sender<T>>>>;

/// Removes the in-flight entry when the producer settles, panic included
struct ClearOnSettle<T> {
    key: Ticker,
    pending: PendingMap<T>,
}

impl<T> Drop for ClearOnSettle<T> {
    fn drop(&mut self) {
        self.pending
            .lock()
            .expect("in-flight registry lock poisoned")
            .remove(&self.key);
    }
}

/// Per-provider in-flight request registry
pub struct SingleFlight<T> {
    pending: PendingMap<T>,
    flights_led: AtomicU64,
    waits_joined: AtomicU64,
}

impl<T> SingleFlight<T>
where
    T: Clone + Default + Send + 'static,
{
    /// Creates an empty registry
    pub fn new() -> Self {
        Self {
            pending: Arc::new(Mutex::new(HashMap::new())),
            flights_led: AtomicU64::new(0),
            waits_joined: AtomicU64::new(0),
        }
    }

    /// Runs `producer` for `key`, or joins a producer already running.
    ///
    /// All concurrent callers for the same key observe one identical result
    /// from a single producer invocation. `producer` is only called when this
    /// caller leads the flight.
    pub async fn run<P, Fut>(&self, key: &Ticker, producer: P) -> T
    where
        P: FnOnce() -> Fut,
        Fut: Future<Output = T> + Send + 'static,
    {
        let mut rx = {
            // The check-and-insert must be atomic: two tasks may never both
            // conclude there is no flight for a key.
            let mut pending = self
                .pending
                .lock()
                .expect("in-flight registry lock poisoned");

            if let Some(tx) = pending.get(key) {
                self.waits_joined.fetch_add(1, Ordering::Relaxed);
                tx.subscribe()
            } else {
                let (tx, rx) = broadcast::channel(1);
                pending.insert(key.clone(), tx.clone());
                self.flights_led.fetch_add(1, Ordering::Relaxed);

                let guard = ClearOnSettle {
                    key: key.clone(),
                    pending: Arc::clone(&self.pending),
                };
                let fut = producer();
                tokio::spawn(async move {
                    let result = fut.await;
                    // Deregister before broadcasting so a caller arriving
                    // after the send starts a fresh flight instead of
                    // subscribing to a channel that already fired.
                    drop(guard);
                    let _ = tx.send(result);
                });
                rx
            }
        };

        // RecvError means the producer task died without sending; treat the
        // flight as having produced nothing.
        rx.recv().await.unwrap_or_default()
    }

    /// Number of flights this registry has led (producer invocations)
    pub fn flights_led(&self) -> u64 {
        self.flights_led.load(Ordering::Relaxed)
    }

    /// Number of callers that joined an existing flight
    pub fn waits_joined(&self) -> u64 {
        self.waits_joined.load(Ordering::Relaxed)
    }
}

impl<T> Default for SingleFlight<T>
where
    T: Clone + Default + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    #[tokio::test]
    async fn concurrent_callers_share_one_producer_run() {
        let flight = Arc::new(SingleFlight::<Option<f64>>::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let key = Ticker::new("BTC");

        let mut handles = Vec::new();
        for _ in 0..10 {
            let flight = Arc::clone(&flight);
            let calls = Arc::clone(&calls);
            let key = key.clone();
            handles.push(tokio::spawn(async move {
                flight
                    .run(&key, move || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Some(42.0)
                    })
                    .await
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap(), Some(42.0));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(flight.flights_led(), 1);
        assert_eq!(flight.waits_joined(), 9);
    }

    #[tokio::test]
    async fn failure_is_observed_by_all_waiters() {
        let flight = Arc::new(SingleFlight::<Option<f64>>::new());
        let key = Ticker::new("AC");

        let mut handles = Vec::new();
        for _ in 0..4 {
            let flight = Arc::clone(&flight);
            let key = key.clone();
            handles.push(tokio::spawn(async move {
                flight
                    .run(&key, || async {
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        None
                    })
                    .await
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap(), None);
        }
    }

    #[tokio::test]
    async fn entry_is_cleared_after_settlement() {
        let flight = SingleFlight::<Option<f64>>::new();
        let key = Ticker::new("BTC");

        let first = flight.run(&key, || async { Some(1.0) }).await;
        let second = flight.run(&key, || async { Some(2.0) }).await;

        // A second call after settlement runs a fresh producer.
        assert_eq!(first, Some(1.0));
        assert_eq!(second, Some(2.0));
        assert_eq!(flight.flights_led(), 2);
    }

    #[tokio::test]
    async fn distinct_keys_do_not_share_a_flight() {
        let flight = Arc::new(SingleFlight::<Option<f64>>::new());

        let a = {
            let flight = Arc::clone(&flight);
            tokio::spawn(async move {
                flight
                    .run(&Ticker::new("BTC"), || async {
                        tokio::time::sleep(Duration::from_millis(30)).await;
                        Some(1.0)
                    })
                    .await
            })
        };
        let b = {
            let flight = Arc::clone(&flight);
            tokio::spawn(async move {
                flight
                    .run(&Ticker::new("ETH"), || async {
                        tokio::time::sleep(Duration::from_millis(30)).await;
                        Some(2.0)
                    })
                    .await
            })
        };

        assert_eq!(a.await.unwrap(), Some(1.0));
        assert_eq!(b.await.unwrap(), Some(2.0));
        assert_eq!(flight.flights_led(), 2);
        assert_eq!(flight.waits_joined(), 0);
    }

    #[tokio::test]
    async fn panicking_producer_does_not_wedge_the_key() {
        let flight = Arc::new(SingleFlight::<Option<f64>>::new());
        let key = Ticker::new("BTC");

        let crashed = flight
            .run(&key, || async { panic!("provider blew up") })
            .await;
        assert_eq!(crashed, None);

        // The key must be usable again.
        let ok = flight.run(&key, || async { Some(3.0) }).await;
        assert_eq!(ok, Some(3.0));
    }

    #[tokio::test]
    async fn abandoned_waiter_does_not_cancel_the_flight() {
        let flight = Arc::new(SingleFlight::<Option<f64>>::new());
        let done = Arc::new(AtomicUsize::new(0));
        let key = Ticker::new("BTC");

        let waiter = {
            let flight = Arc::clone(&flight);
            let done = Arc::clone(&done);
            let key = key.clone();
            tokio::spawn(async move {
                flight
                    .run(&key, move || async move {
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        done.fetch_add(1, Ordering::SeqCst);
                        Some(1.0)
                    })
                    .await
            })
        };

        // Abandon the only waiter mid-flight.
        tokio::time::sleep(Duration::from_millis(10)).await;
        waiter.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(done.load(Ordering::SeqCst), 1);
    }
}
