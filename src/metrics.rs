//! Translation metrics and observability.
//!
//! Counts per-message cache hits and misses, provider calls and failures, and
//! how many deliveries went out translated or plain. One instance is shared by
//! the whole service.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default)]
pub struct TranslationMetrics {
    /// Recipients served from the per-message cache
    cache_hits: AtomicUsize,

    /// Target languages that had to be requested from the provider
    cache_misses: AtomicUsize,

    /// Number of provider calls made
    api_calls: AtomicUsize,

    /// Number of provider calls that failed
    api_failures: AtomicUsize,

    /// Deliveries sent with translated text
    translated_deliveries: AtomicUsize,

    /// Deliveries sent with the original text
    plain_deliveries: AtomicUsize,
}

impl TranslationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_api_call(&self) {
        self.api_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_api_failure(&self) {
        self.api_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_delivery(&self, translated: bool) {
        if translated {
            self.translated_deliveries.fetch_add(1, Ordering::Relaxed);
        } else {
            self.plain_deliveries.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn cache_hits(&self) -> usize {
        self.cache_hits.load(Ordering::Relaxed)
    }

    pub fn cache_misses(&self) -> usize {
        self.cache_misses.load(Ordering::Relaxed)
    }

    pub fn api_calls(&self) -> usize {
        self.api_calls.load(Ordering::Relaxed)
    }

    pub fn api_failures(&self) -> usize {
        self.api_failures.load(Ordering::Relaxed)
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let hits = self.cache_hits();
        let misses = self.cache_misses();
        let total_cache_queries = hits + misses;
        let cache_hit_rate = if total_cache_queries > 0 {
            (hits as f64 / total_cache_queries as f64) * 100.0
        } else {
            0.0
        };

        let calls = self.api_calls();
        let failures = self.api_failures();
        let api_success_rate = if calls > 0 {
            (calls.saturating_sub(failures) as f64 / calls as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            cache_hits: hits,
            cache_misses: misses,
            cache_hit_rate,
            api_calls: calls,
            api_failures: failures,
            api_success_rate,
            translated_deliveries: self.translated_deliveries.load(Ordering::Relaxed),
            plain_deliveries: self.plain_deliveries.load(Ordering::Relaxed),
        }
    }
}

/// Metrics report containing current translation statistics.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub cache_hits: usize,
    pub cache_misses: usize,

    /// Cache hit rate as a percentage (0-100)
    pub cache_hit_rate: f64,

    pub api_calls: usize,
    pub api_failures: usize,

    /// API success rate as a percentage (0-100)
    pub api_success_rate: f64,

    pub translated_deliveries: usize,
    pub plain_deliveries: usize,
}
