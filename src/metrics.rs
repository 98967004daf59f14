//! Per-provider fetch metrics
//!
//! Tracks fetch latency percentiles and success rates, plus the counters the
//! caching layer makes meaningful: cache hits and coalesced waits. Purely
//! observational; nothing here affects fetch behavior.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;

/// Maximum number of latency samples kept in the rolling window
const MAX_SAMPLES: usize = 100;

/// Snapshot of a provider's fetch metrics
#[derive(Debug, Clone)]
pub struct ProviderMetrics {
    /// Name of the provider
    pub provider_name: String,
    /// 50th percentile fetch latency in milliseconds
    pub latency_p50_ms: f64,
    /// 99th percentile fetch latency in milliseconds
    pub latency_p99_ms: f64,
    /// Fetch success rate (0.0 to 1.0)
    pub success_rate: f64,
    /// Network fetches attempted (lifetime)
    pub total_fetches: u64,
    /// Network fetches that failed (lifetime)
    pub failed_fetches: u64,
    /// Requests answered from the TTL cache
    pub cache_hits: u64,
    /// Requests that joined an already-running fetch
    pub coalesced_waits: u64,
}

impl ProviderMetrics {
    fn empty(provider_name: &str) -> Self {
        Self {
            provider_name: provider_name.to_string(),
            latency_p50_ms: 0.0,
            latency_p99_ms: 0.0,
            success_rate: 1.0,
            total_fetches: 0,
            failed_fetches: 0,
            cache_hits: 0,
            coalesced_waits: 0,
        }
    }
}

#[derive(Debug, Clone)]
struct LatencySample {
    duration_ms: f64,
    success: bool,
}

/// Collects fetch metrics for one provider
pub struct MetricsCollector {
    provider_name: String,
    samples: RwLock<VecDeque<LatencySample>>,
    total_fetches: AtomicU64,
    failed_fetches: AtomicU64,
    cache_hits: AtomicU64,
}

impl MetricsCollector {
    /// Creates a collector for a named provider
    pub fn new(provider_name: &str) -> Self {
        Self {
            provider_name: provider_name.to_string(),
            samples: RwLock::new(VecDeque::with_capacity(MAX_SAMPLES)),
            total_fetches: AtomicU64::new(0),
            failed_fetches: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
        }
    }

    /// Records a completed network fetch
    pub async fn record_fetch(&self, duration: Duration, success: bool) {
        self.total_fetches.fetch_add(1, Ordering::Relaxed);
        if !success {
            self.failed_fetches.fetch_add(1, Ordering::Relaxed);
        }

        let mut samples = self.samples.write().await;
        if samples.len() >= MAX_SAMPLES {
            samples.pop_front();
        }
        samples.push_back(LatencySample {
            duration_ms: duration.as_secs_f64() * 1000.0,
            success,
        });
    }

    /// Records a request served from the cache
    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Computes a snapshot; `coalesced_waits` is supplied by the in-flight
    /// registry that owns that count
    pub async fn snapshot(&self, coalesced_waits: u64) -> ProviderMetrics {
        let samples = self.samples.read().await;
        let total = self.total_fetches.load(Ordering::Relaxed);
        let failed = self.failed_fetches.load(Ordering::Relaxed);
        let cache_hits = self.cache_hits.load(Ordering::Relaxed);

        if samples.is_empty() {
            return ProviderMetrics {
                cache_hits,
                coalesced_waits,
                ..ProviderMetrics::empty(&self.provider_name)
            };
        }

        let mut latencies: Vec<f64> = samples
            .iter()
            .filter(|s| s.success)
            .map(|s| s.duration_ms)
            .collect();
        latencies.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let success_rate = if total > 0 {
            (total - failed) as f64 / total as f64
        } else {
            1.0
        };

        ProviderMetrics {
            provider_name: self.provider_name.clone(),
            latency_p50_ms: percentile(&latencies, 50.0),
            latency_p99_ms: percentile(&latencies, 99.0),
            success_rate,
            total_fetches: total,
            failed_fetches: failed,
            cache_hits,
            coalesced_waits,
        }
    }
}

/// Calculate a percentile from sorted values
fn percentile(sorted_values: &[f64], p: f64) -> f64 {
    if sorted_values.is_empty() {
        return 0.0;
    }

    let idx = (p / 100.0 * (sorted_values.len() - 1) as f64).round() as usize;
    sorted_values[idx.min(sorted_values.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn collector_tracks_fetches_and_hits() {
        let collector = MetricsCollector::new("test");

        collector
            .record_fetch(Duration::from_millis(100), true)
            .await;
        collector
            .record_fetch(Duration::from_millis(200), true)
            .await;
        collector
            .record_fetch(Duration::from_millis(150), false)
            .await;
        collector.record_cache_hit();
        collector.record_cache_hit();

        let metrics = collector.snapshot(5).await;

        assert_eq!(metrics.provider_name, "test");
        assert_eq!(metrics.total_fetches, 3);
        assert_eq!(metrics.failed_fetches, 1);
        assert_eq!(metrics.cache_hits, 2);
        assert_eq!(metrics.coalesced_waits, 5);
        assert!(metrics.success_rate > 0.6 && metrics.success_rate < 0.7);
    }

    #[test]
    fn percentile_of_sorted_values() {
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
        assert_eq!(percentile(&values, 50.0), 5.0);
        assert_eq!(percentile(&values, 99.0), 10.0);
        assert_eq!(percentile(&[], 50.0), 0.0);
    }
}
