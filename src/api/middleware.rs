//! API Middleware
//!
//! Per-client rate limiting, client address resolution and security headers.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, HeaderMap, HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use dashmap::DashMap;
use governor::{
    clock::{Clock, DefaultClock},
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use parking_lot::Mutex;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::debug;

use crate::error::AppError;

/// Content security policy sent with every response
pub const CONTENT_SECURITY_POLICY: &str = "default-src 'self'; \
script-src 'self' 'unsafe-inline' https://fonts.googleapis.com; \
style-src 'self' 'unsafe-inline' https://fonts.googleapis.com; \
font-src 'self' https://fonts.gstatic.com; img-src 'self' data:;";

/// Idle clients are dropped from the limiter map every this many checks
const PRUNE_EVERY: u64 = 1024;

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Limiters for one client address, one per quota.
struct ClientLimiter {
    limiters: Vec<DirectRateLimiter>,
    last_seen: Mutex<Instant>,
}

impl ClientLimiter {
    fn new(quotas: &[Quota]) -> Self {
        Self {
            limiters: quotas.iter().map(|q| RateLimiter::direct(*q)).collect(),
            last_seen: Mutex::new(Instant::now()),
        }
    }
}

fn quota_count(n: u32) -> NonZeroU32 {
    NonZeroU32::new(n).unwrap_or(NonZeroU32::MIN)
}

// == Rate Limit ==
/// Per-client-IP request quotas for one group of routes.
///
/// A request must fit every quota. Cloning shares the underlying counters.
#[derive(Clone)]
pub struct RateLimit {
    /// Quotas every client is held to
    quotas: Vec<Quota>,
    /// After this long without requests a client's quotas are full again
    idle_after: Duration,
    /// When false every request passes
    enabled: bool,
    /// Whether proxy headers name the client
    trust_proxy: bool,
    /// Limiters per client address
    clients: Arc<DashMap<IpAddr, Arc<ClientLimiter>>>,
    /// Checks performed, drives pruning
    checks: Arc<AtomicU64>,
}

impl RateLimit {
    /// Holds every client to all of `quotas`.
    pub fn from_quotas(quotas: Vec<Quota>) -> Self {
        let idle_after = quotas
            .iter()
            .map(|q| q.replenish_interval() * q.burst_size().get())
            .max()
            .unwrap_or_default();
        Self {
            quotas,
            idle_after,
            enabled: true,
            trust_proxy: false,
            clients: Arc::new(DashMap::new()),
            checks: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Allows `per_minute` requests per client per minute.
    pub fn per_minute(per_minute: u32) -> Self {
        Self::from_quotas(vec![Quota::per_minute(quota_count(per_minute))])
    }

    /// A limit that lets everything through.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::from_quotas(Vec::new())
        }
    }

    /// Builds an enforcing or pass-through limit.
    pub fn new(per_minute: u32, enabled: bool) -> Self {
        if enabled {
            Self::per_minute(per_minute)
        } else {
            Self::disabled()
        }
    }

    /// Adds an hourly quota on top of the existing ones.
    pub fn and_per_hour(mut self, per_hour: u32) -> Self {
        if self.enabled {
            let quota = Quota::per_hour(quota_count(per_hour));
            self.idle_after = self
                .idle_after
                .max(quota.replenish_interval() * quota.burst_size().get());
            self.quotas.push(quota);
        }
        self
    }

    /// Resolves clients through `X-Forwarded-For` when `trust` is set.
    pub fn trusting_proxy(mut self, trust: bool) -> Self {
        self.trust_proxy = trust;
        self
    }

    // == Check ==
    /// Counts one request from `ip`.
    ///
    /// Returns the number of seconds to wait when a quota is used up.
    pub fn check(&self, ip: IpAddr) -> Result<(), u64> {
        if !self.enabled {
            return Ok(());
        }

        let client = self
            .clients
            .entry(ip)
            .or_insert_with(|| Arc::new(ClientLimiter::new(&self.quotas)))
            .clone();
        *client.last_seen.lock() = Instant::now();

        let result = client
            .limiters
            .iter()
            .try_for_each(|limiter| limiter.check())
            .map_err(|not_until| {
                not_until
                    .wait_time_from(DefaultClock::default().now())
                    .as_secs()
                    .max(1)
            });

        if self.checks.fetch_add(1, Ordering::Relaxed) % PRUNE_EVERY == PRUNE_EVERY - 1 {
            self.prune();
        }
        result
    }

    // == Prune ==
    /// Drops clients idle long enough that their quotas are full again.
    ///
    /// Returns the number of clients dropped.
    pub fn prune(&self) -> usize {
        let before = self.clients.len();
        let idle_after = self.idle_after;
        self.clients
            .retain(|_, client| client.last_seen.lock().elapsed() < idle_after);
        let dropped = before.saturating_sub(self.clients.len());
        if dropped > 0 {
            debug!("Pruned {} idle rate limit clients", dropped);
        }
        dropped
    }

    /// Number of client addresses currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.clients.len()
    }
}

// == Client Address ==
/// Resolves the client address.
///
/// Uses the connection peer unless `trust_proxy` is set. Behind a trusted
/// proxy the last `X-Forwarded-For` hop is used, then `X-Real-IP`; earlier
/// `X-Forwarded-For` entries come from the client and are ignored.
pub fn client_ip(
    headers: &HeaderMap,
    peer: Option<SocketAddr>,
    trust_proxy: bool,
) -> Option<IpAddr> {
    if trust_proxy {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|h| h.to_str().ok())
            .and_then(|v| v.rsplit(',').next())
            .and_then(|ip| ip.trim().parse().ok());
        if forwarded.is_some() {
            return forwarded;
        }

        let real_ip = headers
            .get("x-real-ip")
            .and_then(|h| h.to_str().ok())
            .and_then(|ip| ip.trim().parse().ok());
        if real_ip.is_some() {
            return real_ip;
        }
    }

    peer.map(|addr| addr.ip())
}

/// Rate limiting middleware.
///
/// Clients whose address cannot be determined share one bucket.
pub async fn rate_limit_middleware(
    State(limit): State<RateLimit>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let ip = client_ip(request.headers(), peer, limit.trust_proxy)
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

    match limit.check(ip) {
        Ok(()) => Ok(next.run(request).await),
        Err(retry_after) => {
            debug!("Rate limit hit for {} on {}", ip, request.uri().path());
            Err(AppError::RateLimited { retry_after })
        }
    }
}

// == Security Headers ==
/// Layers adding the standard security headers to every response.
pub fn security_header_layers() -> Vec<SetResponseHeaderLayer<HeaderValue>> {
    [
        (
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static(CONTENT_SECURITY_POLICY),
        ),
        (
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ),
        (header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY")),
        (
            header::X_XSS_PROTECTION,
            HeaderValue::from_static("1; mode=block"),
        ),
        (
            header::REFERRER_POLICY,
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ),
    ]
    .into_iter()
    .map(|(name, value): (HeaderName, HeaderValue)| {
        SetResponseHeaderLayer::if_not_present(name, value)
    })
    .collect()
}
