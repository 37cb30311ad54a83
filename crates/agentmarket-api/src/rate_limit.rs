//! Per-IP rate limiting
//!
//! Sliding window: a request is admitted when fewer than `requests_per_window`
//! requests from the same key were admitted during the last `window`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;

/// Default window, fifteen minutes
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(15 * 60);

/// Default admitted requests per window and key
pub const DEFAULT_REQUESTS_PER_WINDOW: u32 = 100;

/// Rate limit configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub requests_per_window: u32,
    pub window: Duration,
    /// Key on `X-Forwarded-For` / `X-Real-IP`. Only safe behind a proxy that overwrites them.
    pub trust_proxy_headers: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            requests_per_window: DEFAULT_REQUESTS_PER_WINDOW,
            window: DEFAULT_WINDOW,
            trust_proxy_headers: false,
        }
    }
}

impl RateLimitConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

/// Rate limit bucket for tracking requests
#[derive(Debug, Clone, Default)]
struct RateBucket {
    /// Admitted request timestamps within the window, oldest first
    requests: Vec<Instant>,
}

#[derive(Debug)]
struct Buckets {
    by_key: HashMap<String, RateBucket>,
    last_sweep: Instant,
}

/// In-memory rate limiter
#[derive(Clone)]
pub struct RateLimiter {
    config: RateLimitConfig,
    buckets: Arc<RwLock<Buckets>>,
}

/// Snapshot of a key's budget
#[derive(Debug, Clone, PartialEq)]
pub struct RateLimitInfo {
    pub limit: u32,
    pub remaining: u32,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            buckets: Arc::new(RwLock::new(Buckets {
                by_key: HashMap::new(),
                last_sweep: Instant::now(),
            })),
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Admit or reject a request. `Err` carries how long until the next slot frees.
    pub async fn check(&self, key: &str) -> Result<(), Duration> {
        if !self.config.enabled {
            return Ok(());
        }

        let window = self.config.window;
        let now = Instant::now();
        let mut buckets = self.buckets.write().await;

        // Drop idle keys once per window so the map stays bounded by active clients
        if now.duration_since(buckets.last_sweep) >= window {
            buckets.by_key.retain(|_, bucket| {
                bucket
                    .requests
                    .last()
                    .map(|&t| now.duration_since(t) < window)
                    .unwrap_or(false)
            });
            buckets.last_sweep = now;
        }

        let bucket = buckets.by_key.entry(key.to_string()).or_default();
        bucket.requests.retain(|&t| now.duration_since(t) < window);

        if bucket.requests.len() >= self.config.requests_per_window as usize {
            let retry_after = bucket
                .requests
                .first()
                .map(|&oldest| window.saturating_sub(now.duration_since(oldest)))
                .unwrap_or(window);
            return Err(retry_after);
        }

        bucket.requests.push(now);
        Ok(())
    }

    /// Remaining budget for a key
    pub async fn info(&self, key: &str) -> RateLimitInfo {
        let buckets = self.buckets.read().await;
        let now = Instant::now();
        let used = buckets
            .by_key
            .get(key)
            .map(|b| {
                b.requests
                    .iter()
                    .filter(|&&t| now.duration_since(t) < self.config.window)
                    .count() as u32
            })
            .unwrap_or(0);

        RateLimitInfo {
            limit: self.config.requests_per_window,
            remaining: self.config.requests_per_window.saturating_sub(used),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(limit: u32, window: Duration) -> RateLimiter {
        RateLimiter::new(RateLimitConfig {
            enabled: true,
            requests_per_window: limit,
            window,
            trust_proxy_headers: false,
        })
    }

    #[tokio::test]
    async fn test_limit_per_key() {
        let limiter = limiter(2, Duration::from_secs(60));

        assert!(limiter.check("1.1.1.1").await.is_ok());
        assert!(limiter.check("1.1.1.1").await.is_ok());
        let retry = limiter.check("1.1.1.1").await.unwrap_err();
        assert!(retry <= Duration::from_secs(60));

        // Other clients have their own budget
        assert!(limiter.check("2.2.2.2").await.is_ok());
        assert_eq!(limiter.info("1.1.1.1").await.remaining, 0);
        assert_eq!(limiter.info("2.2.2.2").await.remaining, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_slides() {
        let limiter = limiter(1, Duration::from_secs(10));

        assert!(limiter.check("ip").await.is_ok());
        assert!(limiter.check("ip").await.is_err());

        tokio::time::advance(Duration::from_secs(11)).await;
        assert!(limiter.check("ip").await.is_ok());
    }

    #[tokio::test]
    async fn test_disabled() {
        let limiter = RateLimiter::new(RateLimitConfig {
            requests_per_window: 0,
            ..RateLimitConfig::disabled()
        });
        assert!(limiter.check("ip").await.is_ok());
    }
}
