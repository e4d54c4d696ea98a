//! Rate Limit Extension
//!
//! Token bucket rate limiting per operation, applied as a before-hook.

use crate::domain::errors::InvocationError;
use crate::domain::ports::{BeforeInvoke, InvocationContext, InvocationOutcome, InvokeExtension};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

/// Rate limiter configuration.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum calls per window
    pub max_requests: u64,
    /// Time window for rate limiting
    pub window: Duration,
    /// Maximum burst size (token bucket capacity)
    pub burst_size: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window: Duration::from_secs(1),
            burst_size: 10,
        }
    }
}

/// Per-operation bucket.
struct Bucket {
    tokens: AtomicU64,
    last_refill_ms: AtomicU64,
}

impl Bucket {
    fn new(burst_size: u64) -> Self {
        Self {
            tokens: AtomicU64::new(burst_size),
            last_refill_ms: AtomicU64::new(now_ms()),
        }
    }
}

fn now_ms() -> u64 {
    static START: OnceLock<Instant> = OnceLock::new();
    START.get_or_init(Instant::now).elapsed().as_millis() as u64
}

/// Rejects calls with status 429 once an operation's bucket is empty.
pub struct RateLimitExtension {
    config: RateLimitConfig,
    buckets: DashMap<String, Bucket>,
    /// Tokens added per millisecond
    refill_rate_per_ms: f64,
}

impl RateLimitExtension {
    pub fn new(config: RateLimitConfig) -> Self {
        let window_ms = config.window.as_millis().max(1) as f64;
        let refill_rate_per_ms = config.max_requests as f64 / window_ms;
        Self {
            config,
            buckets: DashMap::new(),
            refill_rate_per_ms,
        }
    }

    /// Take one token for an operation.
    pub fn try_acquire(&self, operation_id: &str) -> bool {
        let bucket = match self.buckets.get(operation_id) {
            Some(bucket) => bucket,
            None => self
                .buckets
                .entry(operation_id.to_string())
                .or_insert_with(|| Bucket::new(self.config.burst_size))
                .downgrade(),
        };

        self.refill(&bucket);

        let mut current = bucket.tokens.load(Ordering::Relaxed);
        loop {
            if current == 0 {
                return false;
            }
            match bucket.tokens.compare_exchange_weak(
                current,
                current - 1,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return true,
                Err(c) => current = c,
            }
        }
    }

    /// Add the tokens earned since the last refill, capped at the burst size.
    ///
    /// Only the caller that advances `last_refill_ms` adds tokens, and the
    /// add is a single atomic update, so concurrent consumes are never lost.
    fn refill(&self, bucket: &Bucket) {
        let now = now_ms();
        let last = bucket.last_refill_ms.load(Ordering::Relaxed);
        let earned = (now.saturating_sub(last) as f64 * self.refill_rate_per_ms) as u64;
        if earned == 0 {
            return;
        }

        if bucket
            .last_refill_ms
            .compare_exchange(last, now, Ordering::AcqRel, Ordering::Relaxed)
            .is_err()
        {
            return;
        }

        let burst_size = self.config.burst_size;
        let _ = bucket
            .tokens
            .fetch_update(Ordering::AcqRel, Ordering::Relaxed, |tokens| {
                Some(tokens.saturating_add(earned).min(burst_size))
            });
    }

    /// Tokens left for an operation.
    pub fn remaining(&self, operation_id: &str) -> u64 {
        self.buckets
            .get(operation_id)
            .map(|b| b.tokens.load(Ordering::Relaxed))
            .unwrap_or(self.config.burst_size)
    }
}

impl Default for RateLimitExtension {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}

impl InvokeExtension for RateLimitExtension {
    fn name(&self) -> &str {
        "rate_limit"
    }

    fn order(&self) -> i32 {
        -100
    }

    fn before_invoke(&self, ctx: &InvocationContext) -> Result<BeforeInvoke, InvocationError> {
        if self.try_acquire(&ctx.operation_id) {
            return Ok(BeforeInvoke::Proceed);
        }
        tracing::debug!("rate limited {} [{}]", ctx.operation_id, ctx.invocation_id);
        Err(InvocationError::new(
            429,
            format!("rate limit exceeded for {}", ctx.operation_id),
        ))
    }

    fn after_invoke(&self, _ctx: &InvocationContext, _outcome: &InvocationOutcome<'_>) {}
}
