//! Search latency metrics with rolling averages.
//!
//! This module provides lightweight, in-memory metrics for the search
//! pipeline. Stage timings are kept as timestamped samples so averages can
//! be computed over a rolling window; degradation events are plain counters.
//!
//! ## Architecture
//!
//! A global collector (`global_metrics()`) is shared by every engine in the
//! process. Engines can also be handed their own [`SearchMetrics`] (tests do
//! this to observe a single engine in isolation).
//!
//! ## Recorded metrics
//!
//! - **Stage latency**: keyword stage, semantic stage, fusion, total
//! - **Degradation**: stages that returned empty because their collaborator
//!   failed or timed out, and searches that fell back to keyword-only
//! - **Last search**: result count, stage list sizes and top score

use crate::search::types::SearchStage;
use instant::Instant;
use once_cell::sync::Lazy;
use std::collections::VecDeque;
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// Window size for rolling averages (5 minutes).
const SEARCH_WINDOW_SECS: u64 = 300;

/// Maximum samples to keep per metric (prevents unbounded growth).
const MAX_SAMPLES: usize = 1000;

#[derive(Clone, Debug)]
struct TimingSample {
    timestamp: Instant,
    duration_ms: f64,
}

/// Rolling statistics for a single timing.
#[derive(Debug, Default)]
struct MetricData {
    samples: VecDeque<TimingSample>,
    /// Total count since startup.
    total_count: u64,
}

impl MetricData {
    fn new() -> Self {
        Self {
            samples: VecDeque::with_capacity(MAX_SAMPLES),
            total_count: 0,
        }
    }

    fn record(&mut self, duration_ms: f64) {
        self.total_count += 1;
        self.samples.push_back(TimingSample {
            timestamp: Instant::now(),
            duration_ms,
        });

        while self.samples.len() > MAX_SAMPLES {
            self.samples.pop_front();
        }
    }

    /// Drops samples older than the window.
    fn prune(&mut self, window: Duration) {
        // checked_sub: the window may reach back before the clock's origin
        let Some(cutoff) = Instant::now().checked_sub(window) else {
            return;
        };

        while let Some(front) = self.samples.front() {
            if front.timestamp < cutoff {
                self.samples.pop_front();
            } else {
                break;
            }
        }
    }

    fn rolling_avg(&self, window: Duration) -> Option<f64> {
        let cutoff = Instant::now().checked_sub(window);

        let (sum, count) = self
            .samples
            .iter()
            .filter(|s| cutoff.is_none_or(|c| s.timestamp >= c))
            .fold((0.0, 0usize), |(sum, count), s| {
                (sum + s.duration_ms, count + 1)
            });

        (count > 0).then(|| sum / count as f64)
    }

    fn rolling_count(&self, window: Duration) -> usize {
        let cutoff = Instant::now().checked_sub(window);
        self.samples
            .iter()
            .filter(|s| cutoff.is_none_or(|c| s.timestamp >= c))
            .count()
    }
}

/// Information about the last completed search (point-in-time, not rolling).
#[derive(Clone, Debug, Default)]
struct LastSearchInfo {
    result_count: usize,
    keyword_count: usize,
    semantic_count: usize,
    top_score: Option<f64>,
    fell_back: bool,
}

/// Timings of one completed search, in milliseconds.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SearchTimings {
    pub keyword_ms: f64,
    pub semantic_ms: f64,
    pub fusion_ms: f64,
    pub total_ms: f64,
}

/// Collected metrics snapshot for display.
#[derive(Clone, Debug, Default)]
pub struct MetricsSnapshot {
    /// Average keyword stage time (ms).
    pub keyword_stage_avg_ms: Option<f64>,
    /// Average semantic stage time (ms).
    pub semantic_stage_avg_ms: Option<f64>,
    /// Average fusion time (ms).
    pub fusion_avg_ms: Option<f64>,
    /// Average end-to-end search latency (ms).
    pub total_latency_avg_ms: Option<f64>,
    /// Searches in the rolling window.
    pub query_count: usize,

    /// Lifetime totals.
    pub total_searches: u64,
    pub keyword_stage_failures: u64,
    pub semantic_stage_failures: u64,
    pub keyword_only_fallbacks: u64,

    /// Last search info (point-in-time).
    pub last_result_count: Option<usize>,
    pub last_keyword_count: Option<usize>,
    pub last_semantic_count: Option<usize>,
    pub last_top_score: Option<f64>,
    pub last_fell_back: Option<bool>,
}

struct MetricsInner {
    keyword_stage: MetricData,
    semantic_stage: MetricData,
    fusion: MetricData,
    total: MetricData,
    keyword_stage_failures: u64,
    semantic_stage_failures: u64,
    keyword_only_fallbacks: u64,
    last_search: Option<LastSearchInfo>,
}

impl Default for MetricsInner {
    fn default() -> Self {
        Self {
            keyword_stage: MetricData::new(),
            semantic_stage: MetricData::new(),
            fusion: MetricData::new(),
            total: MetricData::new(),
            keyword_stage_failures: 0,
            semantic_stage_failures: 0,
            keyword_only_fallbacks: 0,
            last_search: None,
        }
    }
}

/// Search metrics collector.
///
/// Thread-safe and cheap to clone (clones share the same data). Use the
/// `record_*` methods to log events and `snapshot()` to read statistics.
/// A poisoned lock silently drops the sample; metrics never fail a search.
#[derive(Clone)]
pub struct SearchMetrics {
    inner: Arc<RwLock<MetricsInner>>,
    window: Duration,
}

impl SearchMetrics {
    /// Creates a collector with the default 5 minute window.
    pub fn new() -> Self {
        Self::with_window(SEARCH_WINDOW_SECS)
    }

    /// Creates a collector with a custom window (for testing).
    pub fn with_window(window_secs: u64) -> Self {
        Self {
            inner: Arc::new(RwLock::new(MetricsInner::default())),
            window: Duration::from_secs(window_secs),
        }
    }

    /// Records the timings and outcome of a completed search.
    pub fn record_search(
        &self,
        timings: SearchTimings,
        keyword_count: usize,
        semantic_count: usize,
        result_count: usize,
        top_score: Option<f64>,
    ) {
        if let Ok(mut inner) = self.inner.write() {
            inner.keyword_stage.record(timings.keyword_ms);
            inner.semantic_stage.record(timings.semantic_ms);
            inner.fusion.record(timings.fusion_ms);
            inner.total.record(timings.total_ms);
            inner.last_search = Some(LastSearchInfo {
                result_count,
                keyword_count,
                semantic_count,
                top_score,
                fell_back: false,
            });
        }
    }

    /// Records a stage that returned empty because its collaborator failed
    /// or timed out.
    pub fn record_stage_failure(&self, stage: SearchStage) {
        if let Ok(mut inner) = self.inner.write() {
            match stage {
                SearchStage::Keyword => inner.keyword_stage_failures += 1,
                SearchStage::Semantic => inner.semantic_stage_failures += 1,
            }
        }
    }

    /// Records a search answered by the keyword-only fallback.
    pub fn record_fallback(&self, result_count: usize, total_ms: f64) {
        if let Ok(mut inner) = self.inner.write() {
            inner.keyword_only_fallbacks += 1;
            inner.total.record(total_ms);
            inner.last_search = Some(LastSearchInfo {
                result_count,
                fell_back: true,
                ..LastSearchInfo::default()
            });
        }
    }

    /// Prunes samples outside the window.
    pub fn prune(&self) {
        if let Ok(mut inner) = self.inner.write() {
            inner.keyword_stage.prune(self.window);
            inner.semantic_stage.prune(self.window);
            inner.fusion.prune(self.window);
            inner.total.prune(self.window);
        }
    }

    /// Returns a snapshot of the current statistics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let Ok(inner) = self.inner.read() else {
            return MetricsSnapshot::default();
        };
        let last = inner.last_search.as_ref();

        MetricsSnapshot {
            keyword_stage_avg_ms: inner.keyword_stage.rolling_avg(self.window),
            semantic_stage_avg_ms: inner.semantic_stage.rolling_avg(self.window),
            fusion_avg_ms: inner.fusion.rolling_avg(self.window),
            total_latency_avg_ms: inner.total.rolling_avg(self.window),
            query_count: inner.total.rolling_count(self.window),

            total_searches: inner.total.total_count,
            keyword_stage_failures: inner.keyword_stage_failures,
            semantic_stage_failures: inner.semantic_stage_failures,
            keyword_only_fallbacks: inner.keyword_only_fallbacks,

            last_result_count: last.map(|s| s.result_count),
            last_keyword_count: last.map(|s| s.keyword_count),
            last_semantic_count: last.map(|s| s.semantic_count),
            last_top_score: last.and_then(|s| s.top_score),
            last_fell_back: last.map(|s| s.fell_back),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Resets all counters and samples.
    pub fn clear(&self) {
        if let Ok(mut inner) = self.inner.write() {
            *inner = MetricsInner::default();
        }
    }
}

impl Default for SearchMetrics {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL_METRICS: Lazy<SearchMetrics> = Lazy::new(SearchMetrics::new);

/// Get the global metrics collector.
pub fn global_metrics() -> &'static SearchMetrics {
    &GLOBAL_METRICS
}

/// Milliseconds elapsed since `start`.
pub(crate) fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}
