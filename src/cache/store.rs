//! Expiring in-memory store for raw API response bodies
//!
//! Provides a `Cache` keyed by request URL. Entries carry their insertion
//! time, and a background reaper task sweeps the table once per configured
//! interval, removing entries older than that same interval. Staleness is
//! only detected at sweep boundaries, so an entry can survive up to almost
//! twice the interval in the worst case.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::debug;

/// A cached payload together with the time it was inserted
#[derive(Debug, Clone)]
struct CacheEntry {
    value: Vec<u8>,
    created_at: Instant,
}

/// Shared expiring cache of response bodies
///
/// Cloning a `Cache` is cheap; all clones share one table. Construction
/// spawns the reaper task, so a `Cache` must be created inside a tokio
/// runtime. The reaper runs until process exit unless [`Cache::shutdown`]
/// is called.
#[derive(Debug, Clone)]
pub struct Cache {
    /// Key-value table, guarded by a single coarse lock
    entries: Arc<Mutex<HashMap<String, CacheEntry>>>,
    /// Signals the reaper task to stop (used by tests; never sent in
    /// normal operation)
    shutdown_tx: mpsc::Sender<()>,
}

impl Cache {
    /// Creates an empty cache and starts its reaper task.
    ///
    /// `interval` is both the staleness threshold and the sweep period.
    /// A zero interval is a caller error and produces an undefined sweep
    /// cadence; it is not validated here.
    pub fn new(interval: Duration) -> Self {
        let entries: Arc<Mutex<HashMap<String, CacheEntry>>> =
            Arc::new(Mutex::new(HashMap::new()));
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

        let table = Arc::clone(&entries);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick completes immediately; skip it so sweeps start
            // one full interval after construction.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let removed = {
                            let mut table = table.lock();
                            let before = table.len();
                            table.retain(|_, entry| entry.created_at.elapsed() <= interval);
                            before - table.len()
                        };
                        if removed > 0 {
                            debug!(removed, "reaped stale cache entries");
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        break;
                    }
                }
            }
        });

        Self {
            entries,
            shutdown_tx,
        }
    }

    /// Inserts or overwrites the entry for `key`.
    ///
    /// An overwrite resets the entry's age, postponing its eviction by a
    /// full interval from now.
    pub fn add(&self, key: &str, value: Vec<u8>) {
        let mut table = self.entries.lock();
        table.insert(
            key.to_string(),
            CacheEntry {
                value,
                created_at: Instant::now(),
            },
        );
    }

    /// Looks up `key`, returning the stored bytes on a hit.
    ///
    /// A miss does not distinguish "never inserted" from "reaped since
    /// insertion".
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        let table = self.entries.lock();
        table.get(key).map(|entry| entry.value.clone())
    }

    /// Stops the reaper task.
    ///
    /// Cached entries stay readable afterwards but are never swept again.
    /// Normal operation never calls this; it exists so tests can wind the
    /// task down deterministically.
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::task::yield_now;
    use tokio::time::advance;

    const INTERVAL: Duration = Duration::from_secs(10);

    /// Creates a cache and lets the reaper task start its ticker before
    /// any mock time passes.
    async fn new_cache(interval: Duration) -> Cache {
        let cache = Cache::new(interval);
        yield_now().await;
        cache
    }

    /// Advances mock time and lets the reaper task observe any due ticks.
    async fn advance_and_settle(duration: Duration) {
        advance(duration).await;
        yield_now().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_after_add_returns_value() {
        let cache = new_cache(INTERVAL).await;
        cache.add("pikachu", vec![1, 2, 3]);

        assert_eq!(cache.get("pikachu"), Some(vec![1, 2, 3]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_missing_key_returns_none() {
        let cache = new_cache(INTERVAL).await;

        assert_eq!(cache.get("missing"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_survives_half_an_interval() {
        let cache = new_cache(INTERVAL).await;
        cache.add("pikachu", vec![42]);

        advance_and_settle(INTERVAL / 2).await;

        assert_eq!(cache.get("pikachu"), Some(vec![42]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_is_reaped_after_two_intervals() {
        let cache = new_cache(INTERVAL).await;
        cache.add("pikachu", vec![42]);

        advance_and_settle(INTERVAL * 2 + Duration::from_millis(100)).await;

        assert_eq!(cache.get("pikachu"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_overwrite_resets_entry_age() {
        let cache = new_cache(INTERVAL).await;
        cache.add("pikachu", vec![1]);

        // Refresh the entry halfway through the first sweep period.
        advance_and_settle(INTERVAL / 2).await;
        cache.add("pikachu", vec![2]);

        // At interval + interval/4 the first sweep has run, but the
        // refreshed entry is only 3/4 of an interval old.
        advance_and_settle(INTERVAL / 2 + INTERVAL / 4).await;

        assert_eq!(cache.get("pikachu"), Some(vec![2]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_second_interval_scenario() {
        let cache = new_cache(Duration::from_secs(1)).await;
        cache.add("loc-1", vec![0x01, 0x02]);

        advance_and_settle(Duration::from_millis(500)).await;
        assert_eq!(cache.get("loc-1"), Some(vec![0x01, 0x02]));

        // Two sweeps later with no refresh the entry is gone.
        advance_and_settle(Duration::from_millis(2000)).await;
        assert_eq!(cache.get("loc-1"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reaping_only_removes_stale_entries() {
        let cache = new_cache(INTERVAL).await;
        cache.add("old", vec![1]);

        advance_and_settle(INTERVAL - Duration::from_millis(100)).await;
        cache.add("fresh", vec![2]);

        // The sweep at the first full interval sees "old" past the
        // threshold and "fresh" barely aged.
        advance_and_settle(Duration::from_millis(200)).await;

        assert_eq!(cache.get("old"), None);
        assert_eq!(cache.get("fresh"), Some(vec![2]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_the_reaper() {
        let cache = new_cache(INTERVAL).await;
        cache.add("pikachu", vec![42]);

        cache.shutdown().await;
        yield_now().await;

        // Without a reaper the entry outlives any number of intervals.
        advance_and_settle(INTERVAL * 5).await;
        assert_eq!(cache.get("pikachu"), Some(vec![42]));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_adds_and_gets_are_consistent() {
        // Long interval so the reaper never interferes with the assertions.
        let cache = Cache::new(Duration::from_secs(600));

        let mut handles = Vec::new();
        for worker in 0u8..8 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move {
                for round in 0u8..100 {
                    // Overlapping key space across workers.
                    let key = format!("key-{}", round % 4);
                    cache.add(&key, vec![round % 4, worker]);

                    if let Some(value) = cache.get(&key) {
                        // Whatever write won, the value must be a complete
                        // payload written for this key.
                        assert_eq!(value.len(), 2);
                        assert_eq!(value[0], round % 4);
                    }
                }
            }));
        }

        for handle in handles {
            handle.await.expect("worker task panicked");
        }

        for slot in 0u8..4 {
            let value = cache
                .get(&format!("key-{}", slot))
                .expect("key written by every worker should be present");
            assert_eq!(value[0], slot);
        }
    }
}
