//! Per-client request rate limiting.
//!
//! [`SlidingWindowLimiter`] keeps, for every client, the instants of its admitted
//! requests inside the trailing window. It is process-local and resets on restart;
//! [`RateLimiter`] is the seam for substituting a shared counter.
//!
//! [`RateLimit`] is the actix middleware. It keys clients by the transport-level
//! peer IP, so users behind one NAT or proxy share a window.

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, ResponseError,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::error::AppError;

/// Key used for requests whose peer address is unknown.
pub const UNKNOWN_CLIENT: &str = "unknown";

pub trait RateLimiter: Send + Sync {
    /// Records a request from `client` and reports whether it is admitted.
    fn allow(&self, client: &str) -> bool;
}

pub struct SlidingWindowLimiter {
    limit: usize,
    window: Duration,
    state: Mutex<Windows>,
}

#[derive(Default)]
struct Windows {
    clients: HashMap<String, VecDeque<Instant>>,
    last_sweep: Option<Instant>,
}

impl Windows {
    /// Drops every client whose newest request has aged out. Runs at most once per window.
    fn sweep(&mut self, now: Instant, window: Duration) {
        if let Some(last) = self.last_sweep {
            if now.saturating_duration_since(last) < window {
                return;
            }
        }
        self.last_sweep = Some(now);
        let before = self.clients.len();
        self.clients.retain(|_, requests| {
            requests
                .back()
                .is_some_and(|newest| now.saturating_duration_since(*newest) < window)
        });
        let evicted = before - self.clients.len();
        if evicted > 0 {
            log::debug!("evicted {} idle rate-limit windows", evicted);
        }
    }
}

impl SlidingWindowLimiter {
    pub fn new(limit: usize, window: Duration) -> Self {
        Self {
            limit,
            window,
            state: Mutex::new(Windows::default()),
        }
    }

    pub fn allow_at(&self, client: &str, now: Instant) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.sweep(now, self.window);

        let requests = state.clients.entry(client.to_string()).or_default();
        while let Some(&oldest) = requests.front() {
            if now.saturating_duration_since(oldest) < self.window {
                break;
            }
            requests.pop_front();
        }

        if requests.len() < self.limit {
            requests.push_back(now);
            return true;
        }
        if requests.is_empty() {
            state.clients.remove(client);
        }
        false
    }

    /// Number of clients currently holding a window entry.
    pub fn tracked_clients(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clients
            .len()
    }
}

impl RateLimiter for SlidingWindowLimiter {
    fn allow(&self, client: &str) -> bool {
        self.allow_at(client, Instant::now())
    }
}

/// Middleware answering `429` once the caller's window is exhausted.
///
/// Reads the limiter from `web::Data<dyn RateLimiter>` app data; without one,
/// requests pass through unlimited.
pub struct RateLimit;

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RateLimitService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitService { service }))
    }
}

pub struct RateLimitService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RateLimitService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let client = client_key(&req);
        let admitted = match req.app_data::<web::Data<dyn RateLimiter>>() {
            Some(limiter) => limiter.allow(&client),
            None => {
                log::warn!("no rate limiter registered; admitting {}", client);
                true
            }
        };

        if admitted {
            let fut = self.service.call(req);
            Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
        } else {
            log::warn!("rate limit exceeded for {} on {}", client, req.path());
            let response = AppError::RateLimited.error_response();
            Box::pin(async move { Ok(req.into_response(response).map_into_right_body()) })
        }
    }
}

fn client_key(req: &ServiceRequest) -> String {
    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}
