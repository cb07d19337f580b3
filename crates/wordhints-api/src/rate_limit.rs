//! Per-client token-bucket rate limiting as a tower layer. Clients are
//! keyed by the first address in `X-Forwarded-For`; requests that reach
//! the service without one (direct connections, tests) are not limited.
//!
//! Buckets hold whole tokens. Refill grants `elapsed_ms * rate / 1000`
//! tokens and advances the bucket clock only by the time those tokens
//! account for, so sub-token remainders carry over between requests.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tower::{Layer, Service};
use tracing::warn;

const REPORT_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct RateLimiterLayer {
    rate_per_sec: u32,
    burst: u32,
}

impl RateLimiterLayer {
    pub fn new(rate_per_sec: u32, burst: u32) -> Self {
        Self {
            rate_per_sec: rate_per_sec.max(1),
            burst: burst.max(1),
        }
    }
}

impl<S> Layer<S> for RateLimiterLayer {
    type Service = RateLimiter<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RateLimiter {
            inner,
            buckets: Arc::new(DashMap::new()),
            drops: Arc::new(DropLog {
                dropped: AtomicU64::new(0),
                last_report: Mutex::new(Instant::now()),
            }),
            rate_per_sec: self.rate_per_sec,
            burst: self.burst,
        }
    }
}

#[derive(Clone)]
pub struct RateLimiter<S> {
    inner: S,
    buckets: Arc<DashMap<String, Bucket>>,
    drops: Arc<DropLog>,
    rate_per_sec: u32,
    burst: u32,
}

#[derive(Debug, Clone)]
struct Bucket {
    tokens: u32,
    refilled_at: Instant,
}

struct DropLog {
    dropped: AtomicU64,
    last_report: Mutex<Instant>,
}

impl<S, ReqBody> Service<axum::http::Request<ReqBody>> for RateLimiter<S>
where
    S: Service<axum::http::Request<ReqBody>, Response = axum::http::Response<axum::body::Body>>
        + Send
        + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: axum::http::Request<ReqBody>) -> Self::Future {
        if let Some(client) = client_id(&req)
            && !self.check_and_consume(&client)
        {
            self.drops.record();
            return Box::pin(async move {
                Ok(axum::http::Response::builder()
                    .status(axum::http::StatusCode::TOO_MANY_REQUESTS)
                    .body(axum::body::Body::from("rate limited"))
                    .unwrap())
            });
        }

        let fut = self.inner.call(req);
        Box::pin(async move { fut.await })
    }
}

fn client_id<B>(req: &axum::http::Request<B>) -> Option<String> {
    // Trust the reverse proxy's header when present.
    req.headers()
        .get("X-Forwarded-For")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

impl<S> RateLimiter<S> {
    fn check_and_consume(&self, client: &str) -> bool {
        let now = Instant::now();
        let mut bucket = self
            .buckets
            .entry(client.to_string())
            .or_insert(Bucket {
                tokens: self.burst,
                refilled_at: now,
            });

        let elapsed_ms = now
            .saturating_duration_since(bucket.refilled_at)
            .as_millis() as u64;
        let granted = elapsed_ms * u64::from(self.rate_per_sec) / 1000;
        if granted > 0 {
            let granted_capped = granted.min(u64::from(self.burst)) as u32;
            bucket.tokens = bucket.tokens.saturating_add(granted_capped).min(self.burst);
            // Advance only by the time the granted tokens cover; the
            // remainder keeps accruing toward the next token.
            bucket.refilled_at +=
                Duration::from_millis(granted * 1000 / u64::from(self.rate_per_sec));
        }

        if bucket.tokens > 0 {
            bucket.tokens -= 1;
            true
        } else {
            false
        }
    }
}

impl DropLog {
    fn record(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
        let now = Instant::now();
        let Ok(mut last) = self.last_report.lock() else {
            return;
        };
        if now.saturating_duration_since(*last) >= REPORT_INTERVAL {
            let dropped = self.dropped.swap(0, Ordering::Relaxed);
            if dropped > 0 {
                warn!("rate limiter dropped {dropped} requests in the last minute");
            }
            *last = now;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(rate_per_sec: u32, burst: u32) -> RateLimiter<()> {
        RateLimiterLayer::new(rate_per_sec, burst).layer(())
    }

    #[test]
    fn burst_is_consumed_one_token_per_request() {
        let limiter = limiter(1, 2);
        assert!(limiter.check_and_consume("10.0.0.1"));
        assert!(limiter.check_and_consume("10.0.0.1"));
        assert!(!limiter.check_and_consume("10.0.0.1"));
        // Another client has its own bucket.
        assert!(limiter.check_and_consume("10.0.0.2"));
    }

    #[test]
    fn refill_is_capped_at_the_burst_size() {
        let limiter = limiter(1000, 3);
        for _ in 0..3 {
            assert!(limiter.check_and_consume("10.0.0.1"));
        }
        assert!(!limiter.check_and_consume("10.0.0.1"));
        std::thread::sleep(Duration::from_millis(20));
        // 20ms at 1000/s grants well over 3 tokens; the bucket still
        // tops out at the burst size.
        for _ in 0..3 {
            assert!(limiter.check_and_consume("10.0.0.1"));
        }
    }

    #[test]
    fn forwarded_for_takes_the_first_hop() {
        let req = axum::http::Request::builder()
            .header("X-Forwarded-For", "203.0.113.9, 198.51.100.2")
            .body(())
            .unwrap();
        assert_eq!(client_id(&req).as_deref(), Some("203.0.113.9"));

        let direct = axum::http::Request::builder().body(()).unwrap();
        assert!(client_id(&direct).is_none());
    }
}
