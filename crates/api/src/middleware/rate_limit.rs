//! Rate limiting middleware for anti-theft command endpoints.
//!
//! Commands are limited per device so that confirmation codes cannot be
//! brute forced online without tripping the limit.

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter as GovRateLimiter,
};
use serde_json::json;
use std::{
    collections::HashMap,
    num::NonZeroU32,
    sync::{Arc, RwLock},
};

use crate::app::AppState;

/// Type alias for the rate limiter used per device.
type DeviceRateLimiter = GovRateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Bound on retained per-device limiters. Device ids are caller-chosen;
/// when the map fills up it is dropped wholesale. In-window budgets
/// reset on that path, which costs less than unbounded growth.
const MAX_TRACKED_DEVICES: usize = 4096;

/// Rate limiter state shared across all requests.
/// Uses a HashMap keyed by device id with individual rate limiters.
pub struct RateLimiterState {
    limiters: RwLock<HashMap<String, Arc<DeviceRateLimiter>>>,
    limit_per_minute: u32,
}

impl RateLimiterState {
    /// Create a new rate limiter state with the specified limit per minute.
    pub fn new(limit_per_minute: u32) -> Self {
        Self {
            limiters: RwLock::new(HashMap::new()),
            limit_per_minute,
        }
    }

    /// Get or create a rate limiter for the given device.
    fn get_or_create_limiter(&self, device_id: &str) -> Arc<DeviceRateLimiter> {
        // First try to get an existing limiter with the read lock
        {
            let limiters = self.limiters.read().expect("limiter lock poisoned");
            if let Some(limiter) = limiters.get(device_id) {
                return limiter.clone();
            }
        }

        let mut limiters = self.limiters.write().expect("limiter lock poisoned");

        // Double-check in case another thread created it
        if let Some(limiter) = limiters.get(device_id) {
            return limiter.clone();
        }

        if limiters.len() >= MAX_TRACKED_DEVICES {
            limiters.clear();
        }

        let quota = Quota::per_minute(
            NonZeroU32::new(self.limit_per_minute).unwrap_or(NonZeroU32::new(30).unwrap()),
        );
        let limiter = Arc::new(GovRateLimiter::direct(quota));
        limiters.insert(device_id.to_string(), limiter.clone());
        limiter
    }

    /// Check if a request for the given device should be allowed.
    /// Returns Ok(()) if allowed, or Err with retry_after seconds if rate limited.
    pub fn check(&self, device_id: &str) -> Result<(), u64> {
        let limiter = self.get_or_create_limiter(device_id);

        match limiter.check() {
            Ok(_) => Ok(()),
            Err(not_until) => {
                let wait_time = not_until.wait_time_from(governor::clock::Clock::now(
                    &governor::clock::DefaultClock::default(),
                ));
                Err(wait_time.as_secs().max(1))
            }
        }
    }
}

impl std::fmt::Debug for RateLimiterState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiterState")
            .field("limit_per_minute", &self.limit_per_minute)
            .field(
                "active_limiters",
                &self.limiters.read().expect("limiter lock poisoned").len(),
            )
            .finish()
    }
}

/// Middleware that applies per-device rate limiting to command routes.
///
/// The device id is the path segment following `/api/v1/devices/`;
/// requests without one pass through untouched.
pub async fn command_rate_limit_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let device_id = device_id_from_path(req.uri().path());

    if let (Some(ref rate_limiter), Some(device_id)) = (&state.rate_limiter, device_id) {
        if let Err(retry_after) = rate_limiter.check(&device_id) {
            return rate_limited_response(
                state.config.security.command_rate_limit_per_minute,
                retry_after,
            );
        }
    }

    next.run(req).await
}

/// Extracts the device id segment from `/api/v1/devices/{device_id}/...`.
fn device_id_from_path(path: &str) -> Option<String> {
    let mut segments = path.split('/').filter(|s| !s.is_empty());
    match (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) {
        (Some("api"), Some("v1"), Some("devices"), Some(device_id)) => {
            Some(device_id.to_string())
        }
        _ => None,
    }
}

/// Create a rate limited response with proper headers and body.
fn rate_limited_response(limit: u32, retry_after: u64) -> Response {
    let body = json!({
        "error": "rate_limited",
        "message": "Too many requests. Please try again later.",
        "retryAfterSeconds": retry_after,
    });

    let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
    let headers = response.headers_mut();
    if let Ok(value) = header::HeaderValue::from_str(&retry_after.to_string()) {
        headers.insert(header::RETRY_AFTER, value);
    }
    if let Ok(value) = header::HeaderValue::from_str(&limit.to_string()) {
        headers.insert("x-ratelimit-limit", value);
    }
    response
}
