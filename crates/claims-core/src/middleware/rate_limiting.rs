use dashmap::DashMap;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};

/// Rate limiter using a windowed token bucket algorithm.
///
/// **Security**: Limits maximum tracked clients to prevent OOM from spoofed IPs.
pub struct RateLimiter {
    buckets: Arc<DashMap<String, TokenBucket>>,
    max_requests: u32,
    window: Duration,
    cleanup_interval: Duration,
    bucket_ttl: Duration,
    max_buckets: usize,
}

#[derive(Debug, Clone)]
struct TokenBucket {
    tokens: f64,
    last_refill: Instant,
    last_access: Instant,
}

impl RateLimiter {
    const DEFAULT_MAX_BUCKETS: usize = 100_000;

    /// Allows `max_requests` per `window` per client, with bursts capped at
    /// `max_requests`.
    #[must_use]
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            buckets: Arc::new(DashMap::new()),
            max_requests,
            window,
            cleanup_interval: Duration::from_secs(300),
            bucket_ttl: Duration::from_secs(300),
            max_buckets: Self::DEFAULT_MAX_BUCKETS,
        }
    }

    #[must_use]
    pub fn with_max_buckets(max_requests: u32, window: Duration, max_buckets: usize) -> Self {
        Self {
            buckets: Arc::new(DashMap::new()),
            max_requests,
            window,
            cleanup_interval: Duration::from_secs(300),
            bucket_ttl: Duration::from_secs(300),
            max_buckets,
        }
    }

    /// Spawns a background task that drops buckets idle past their TTL.
    pub fn start_cleanup_task(&self) {
        let cleanup_interval = self.cleanup_interval;
        let bucket_ttl = self.bucket_ttl;
        let buckets = self.buckets.clone();

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(cleanup_interval);

            loop {
                interval.tick().await;

                let now = Instant::now();
                buckets.retain(|_, bucket| now.duration_since(bucket.last_access) < bucket_ttl);
            }
        });
    }

    /// Checks rate limit for client. Rejects new clients at capacity to prevent OOM.
    #[must_use]
    pub fn check_rate_limit(&self, key: &str) -> bool {
        let now = Instant::now();

        if let Some(mut bucket) = self.buckets.get_mut(key) {
            return Self::process_existing_bucket(&mut bucket, now, self.max_requests, self.window);
        }

        if self.buckets.len() >= self.max_buckets {
            return false;
        }

        let mut bucket = self.buckets.entry(key.to_string()).or_insert_with(|| TokenBucket {
            tokens: f64::from(self.max_requests),
            last_refill: now,
            last_access: now,
        });

        Self::process_existing_bucket(&mut bucket, now, self.max_requests, self.window)
    }

    fn process_existing_bucket(
        bucket: &mut TokenBucket,
        now: Instant,
        max_requests: u32,
        window: Duration,
    ) -> bool {
        bucket.last_access = now;

        let elapsed = now.duration_since(bucket.last_refill);
        let tokens_to_add = (elapsed.as_secs_f64() / window.as_secs_f64()
            * f64::from(max_requests))
        .min(f64::from(max_requests));

        if tokens_to_add > 0.0 {
            bucket.tokens = (bucket.tokens + tokens_to_add).min(f64::from(max_requests));
            bucket.last_refill = now;
        }

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    #[must_use]
    pub fn cleanup_old_buckets(&self) -> usize {
        let now = Instant::now();
        let before_count = self.buckets.len();

        self.buckets
            .retain(|_, bucket| now.duration_since(bucket.last_access) < self.bucket_ttl);

        before_count - self.buckets.len()
    }

    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }
}
