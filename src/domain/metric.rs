//! Metric value objects
//!
//! A metric is a named counter or timer whose accumulated values live in
//! atomics, so concurrent updates never take a lock.

use crate::domain::errors::MetricsError;
use crate::domain::value_objects::MetricKind;
use serde::Serialize;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

/// Accumulated timer samples.
#[derive(Debug)]
struct TimerStats {
    total_nanos: AtomicU64,
    count: AtomicU64,
    min_nanos: AtomicU64,
    max_nanos: AtomicU64,
}

impl TimerStats {
    fn new() -> Self {
        Self {
            total_nanos: AtomicU64::new(0),
            count: AtomicU64::new(0),
            min_nanos: AtomicU64::new(u64::MAX),
            max_nanos: AtomicU64::new(0),
        }
    }

    fn record(&self, nanos: u64) {
        self.total_nanos.fetch_add(nanos, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
        self.min_nanos.fetch_min(nanos, Ordering::Relaxed);
        self.max_nanos.fetch_max(nanos, Ordering::Relaxed);
    }
}

#[derive(Debug)]
enum MetricValue {
    Counter(AtomicI64),
    Timer(TimerStats),
}

/// A named counter or timer.
#[derive(Debug)]
pub struct Metric {
    name: String,
    value: MetricValue,
}

impl Metric {
    /// Create a counter starting at zero.
    pub fn counter(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: MetricValue::Counter(AtomicI64::new(0)),
        }
    }

    /// Create a timer with no samples.
    pub fn timer(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: MetricValue::Timer(TimerStats::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> MetricKind {
        match self.value {
            MetricValue::Counter(_) => MetricKind::Counter,
            MetricValue::Timer(_) => MetricKind::Timer,
        }
    }

    fn mismatch(&self, expected: MetricKind) -> MetricsError {
        MetricsError::KindMismatch {
            name: self.name.clone(),
            expected,
            actual: self.kind(),
        }
    }

    /// Apply a signed delta to a counter.
    pub fn update(&self, delta: i64) -> Result<(), MetricsError> {
        match &self.value {
            MetricValue::Counter(v) => {
                v.fetch_add(delta, Ordering::Relaxed);
                Ok(())
            }
            MetricValue::Timer(_) => Err(self.mismatch(MetricKind::Counter)),
        }
    }

    /// Decrement a counter by one without letting it drop below zero.
    ///
    /// Every decrement must pair with an earlier increment; an unpaired one
    /// leaves the counter untouched and returns [`MetricsError::Underflow`].
    pub fn decrement(&self) -> Result<(), MetricsError> {
        let MetricValue::Counter(v) = &self.value else {
            return Err(self.mismatch(MetricKind::Counter));
        };

        let mut current = v.load(Ordering::Relaxed);
        loop {
            if current <= 0 {
                return Err(MetricsError::Underflow {
                    name: self.name.clone(),
                });
            }
            match v.compare_exchange_weak(current, current - 1, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => return Ok(()),
                Err(c) => current = c,
            }
        }
    }

    /// Record one duration sample into a timer.
    pub fn record(&self, nanos: u64) -> Result<(), MetricsError> {
        match &self.value {
            MetricValue::Timer(stats) => {
                stats.record(nanos);
                Ok(())
            }
            MetricValue::Counter(_) => Err(self.mismatch(MetricKind::Timer)),
        }
    }

    /// Current counter value, `None` for timers.
    pub fn count_value(&self) -> Option<i64> {
        match &self.value {
            MetricValue::Counter(v) => Some(v.load(Ordering::Relaxed)),
            MetricValue::Timer(_) => None,
        }
    }

    /// Point-in-time copy of the accumulated values.
    pub fn snapshot(&self) -> MetricSnapshot {
        match &self.value {
            MetricValue::Counter(v) => MetricSnapshot::Counter {
                name: self.name.clone(),
                value: v.load(Ordering::Relaxed),
            },
            MetricValue::Timer(stats) => {
                let count = stats.count.load(Ordering::Relaxed);
                let min = stats.min_nanos.load(Ordering::Relaxed);
                MetricSnapshot::Timer {
                    name: self.name.clone(),
                    count,
                    total_nanos: stats.total_nanos.load(Ordering::Relaxed),
                    min_nanos: if count == 0 { 0 } else { min },
                    max_nanos: stats.max_nanos.load(Ordering::Relaxed),
                }
            }
        }
    }
}

/// Serializable view of a metric for exporters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MetricSnapshot {
    Counter {
        name: String,
        value: i64,
    },
    Timer {
        name: String,
        count: u64,
        total_nanos: u64,
        min_nanos: u64,
        max_nanos: u64,
    },
}

impl MetricSnapshot {
    pub fn name(&self) -> &str {
        match self {
            Self::Counter { name, .. } | Self::Timer { name, .. } => name,
        }
    }

    /// Mean sample in nanoseconds, 0 for empty timers and counters.
    pub fn mean_nanos(&self) -> f64 {
        match self {
            Self::Timer {
                count, total_nanos, ..
            } if *count > 0 => *total_nanos as f64 / *count as f64,
            _ => 0.0,
        }
    }
}

/// Constructs metrics by kind.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricFactory;

impl MetricFactory {
    pub fn new() -> Self {
        Self
    }

    pub fn create_counter(&self, name: impl Into<String>) -> Metric {
        Metric::counter(name)
    }

    pub fn create_timer(&self, name: impl Into<String>) -> Metric {
        Metric::timer(name)
    }

    pub fn create(&self, kind: MetricKind, name: impl Into<String>) -> Metric {
        match kind {
            MetricKind::Counter => self.create_counter(name),
            MetricKind::Timer => self.create_timer(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    // ===== Counter Tests =====

    #[test]
    fn test_counter_update() {
        let m = Metric::counter("c");
        m.update(5).unwrap();
        m.update(-2).unwrap();
        assert_eq!(m.count_value(), Some(3));
        assert_eq!(m.kind(), MetricKind::Counter);
    }

    #[test]
    fn test_counter_decrement() {
        let m = Metric::counter("c");
        m.update(2).unwrap();
        m.decrement().unwrap();
        assert_eq!(m.count_value(), Some(1));
    }

    #[test]
    fn test_counter_decrement_at_zero_is_rejected() {
        let m = Metric::counter("c");
        let result = m.decrement();
        assert_eq!(
            result,
            Err(MetricsError::Underflow {
                name: "c".to_string()
            })
        );
        assert_eq!(m.count_value(), Some(0));
    }

    #[test]
    fn test_counter_rejects_timer_sample() {
        let m = Metric::counter("c");
        let result = m.record(10);
        assert!(matches!(
            result,
            Err(MetricsError::KindMismatch {
                expected: MetricKind::Timer,
                actual: MetricKind::Counter,
                ..
            })
        ));
    }

    // ===== Timer Tests =====

    #[test]
    fn test_timer_record() {
        let m = Metric::timer("t");
        m.record(100).unwrap();
        m.record(300).unwrap();
        m.record(200).unwrap();

        let snap = m.snapshot();
        assert_eq!(
            snap,
            MetricSnapshot::Timer {
                name: "t".to_string(),
                count: 3,
                total_nanos: 600,
                min_nanos: 100,
                max_nanos: 300,
            }
        );
        assert!((snap.mean_nanos() - 200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_timer_snapshot() {
        let snap = Metric::timer("t").snapshot();
        assert_eq!(
            snap,
            MetricSnapshot::Timer {
                name: "t".to_string(),
                count: 0,
                total_nanos: 0,
                min_nanos: 0,
                max_nanos: 0,
            }
        );
        assert_eq!(snap.mean_nanos(), 0.0);
    }

    #[test]
    fn test_timer_rejects_counter_updates() {
        let m = Metric::timer("t");
        assert!(m.update(1).is_err());
        assert!(m.decrement().is_err());
        assert_eq!(m.count_value(), None);
    }

    // ===== Factory Tests =====

    #[test]
    fn test_factory_creates_by_kind() {
        let factory = MetricFactory::new();
        assert_eq!(factory.create_counter("a").kind(), MetricKind::Counter);
        assert_eq!(factory.create_timer("b").kind(), MetricKind::Timer);
        assert_eq!(factory.create(MetricKind::Timer, "c").name(), "c");
    }

    // ===== Concurrency Tests =====

    #[test]
    fn test_concurrent_counter_updates() {
        let m = Arc::new(Metric::counter("c"));
        let mut handles = vec![];

        for _ in 0..10 {
            let m = m.clone();
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    m.update(1).unwrap();
                }
            }));
        }

        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(m.count_value(), Some(1000));
    }

    #[test]
    fn test_concurrent_decrements_never_go_negative() {
        let m = Arc::new(Metric::counter("c"));
        m.update(500).unwrap();
        let mut handles = vec![];

        for _ in 0..10 {
            let m = m.clone();
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    let _ = m.decrement();
                }
            }));
        }

        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(m.count_value(), Some(0));
    }

    #[test]
    fn test_snapshot_serializes_with_kind_tag() {
        let m = Metric::counter("c");
        m.update(4).unwrap();
        let value = serde_json::to_value(m.snapshot()).unwrap();
        assert_eq!(value["kind"], "counter");
        assert_eq!(value["value"], 4);
    }
}
