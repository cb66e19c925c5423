//! Per-client token bucket rate limiting.
//!
//! Each remote IP gets its own bucket. Buckets of clients that have not been
//! seen for a while are evicted by a sweep that runs at most once per
//! [`SWEEP_INTERVAL`], so a single check costs one map lookup.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, FromRequestParts, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::{debug, warn};

use crate::error::AppError;
use crate::state::AppState;

/// Sustained requests per second per client.
pub const DEFAULT_RATE: f64 = 25.0;
/// Requests a client may burst above the sustained rate.
pub const DEFAULT_BURST: f64 = 100.0;
/// Idle time after which a client's bucket is dropped.
pub const DEFAULT_IDLE: Duration = Duration::from_secs(3 * 60);
/// Minimum time between two sweeps of idle buckets.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy)]
struct Bucket {
    tokens: f64,
    last_seen: Instant,
}

#[derive(Debug)]
struct Clients {
    buckets: HashMap<IpAddr, Bucket>,
    last_sweep: Instant,
}

#[derive(Debug)]
pub struct RateLimiter {
    rate: f64,
    burst: f64,
    idle: Duration,
    clients: Mutex<Clients>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_RATE, DEFAULT_BURST, DEFAULT_IDLE)
    }
}

impl RateLimiter {
    pub fn new(rate: f64, burst: f64, idle: Duration) -> Self {
        Self {
            rate,
            burst,
            idle,
            clients: Mutex::new(Clients {
                buckets: HashMap::new(),
                last_sweep: Instant::now(),
            }),
        }
    }

    /// Take one token from `ip`'s bucket. Returns false when it is empty.
    pub fn check(&self, ip: IpAddr) -> bool {
        self.check_at(ip, Instant::now())
    }

    pub fn check_at(&self, ip: IpAddr, now: Instant) -> bool {
        let mut clients = self.clients.lock().unwrap_or_else(PoisonError::into_inner);

        if now.saturating_duration_since(clients.last_sweep) >= SWEEP_INTERVAL {
            let idle = self.idle;
            let before = clients.buckets.len();
            clients
                .buckets
                .retain(|_, b| now.saturating_duration_since(b.last_seen) <= idle);
            clients.last_sweep = now;
            debug!(evicted = before - clients.buckets.len(), "swept idle rate limit buckets");
        }

        let bucket = clients.buckets.entry(ip).or_insert(Bucket {
            tokens: self.burst,
            last_seen: now,
        });

        let elapsed = now.saturating_duration_since(bucket.last_seen).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.rate).min(self.burst);
        bucket.last_seen = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Number of tracked clients.
    pub fn tracked(&self) -> usize {
        self.clients
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .buckets
            .len()
    }
}

/// Reject requests from clients that exhausted their bucket with 429.
///
/// Requests without a known peer address pass unchecked.
pub async fn rate_limit(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let (mut parts, body) = request.into_parts();
    let peer = ConnectInfo::<SocketAddr>::from_request_parts(&mut parts, &state)
        .await
        .ok()
        .map(|ConnectInfo(addr)| addr.ip());
    let request = Request::from_parts(parts, body);

    match peer {
        Some(ip) if !state.rate_limiter().check(ip) => {
            warn!(%ip, "rate limit exceeded");
            AppError::RateLimited.into_response()
        }
        Some(_) => next.run(request).await,
        None => {
            debug!("no peer address, skipping rate limit");
            next.run(request).await
        }
    }
}
