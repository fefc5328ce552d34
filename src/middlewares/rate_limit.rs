use crate::config::RateLimitConfig;
use crate::error::AppError;
use actix_web::http::Method;
use actix_web::{
    Error,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;
use std::collections::HashMap;
use std::future::{Ready, ready};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

// Expired windows are swept once the table grows past this.
const SWEEP_THRESHOLD: usize = 10_000;

#[derive(Debug, Clone)]
pub struct RateLimitRule {
    pub name: &'static str,
    pub path: &'static str,
    /// Match `path` exactly instead of as a prefix.
    pub exact: bool,
    pub window: Duration,
    pub max_requests: u32,
    pub message: &'static str,
}

impl RateLimitRule {
    fn applies_to(&self, path: &str) -> bool {
        if self.exact {
            path == self.path || path.strip_suffix('/') == Some(self.path)
        } else {
            path.starts_with(self.path)
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Fixed-window request counter per (rule, client IP).
///
/// Clones share the same counters, so one limiter built before `HttpServer::new`
/// covers every worker.
#[derive(Clone)]
pub struct RateLimiter {
    enabled: bool,
    rules: Arc<Vec<RateLimitRule>>,
    windows: Arc<Mutex<HashMap<(&'static str, String), Window>>>,
}

impl RateLimiter {
    pub fn new(enabled: bool, rules: Vec<RateLimitRule>) -> Self {
        Self {
            enabled,
            rules: Arc::new(rules),
            windows: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(
            config.enabled,
            vec![
                RateLimitRule {
                    name: "api",
                    path: "/api",
                    exact: false,
                    window: Duration::from_secs(config.api_window_secs),
                    max_requests: config.api_max_requests,
                    message: "Too many requests from this IP, please try again later.",
                },
                RateLimitRule {
                    name: "auth",
                    path: "/api/auth/login",
                    exact: true,
                    window: Duration::from_secs(config.auth_window_secs),
                    max_requests: config.auth_max_requests,
                    message: "Too many login attempts, please try again later.",
                },
                RateLimitRule {
                    name: "donation",
                    path: "/api/donations/create",
                    exact: true,
                    window: Duration::from_secs(config.donation_window_secs),
                    max_requests: config.donation_max_requests,
                    message: "Too many donation attempts, please try again later.",
                },
            ],
        )
    }

    pub fn check(&self, path: &str, client: &str) -> Result<(), AppError> {
        self.check_at(path, client, Instant::now())
    }

    /// Counts the request against every matching rule; the first exhausted rule rejects it.
    fn check_at(&self, path: &str, client: &str, now: Instant) -> Result<(), AppError> {
        if !self.enabled {
            return Ok(());
        }
        let mut windows = self.windows.lock().unwrap_or_else(|e| e.into_inner());

        if windows.len() > SWEEP_THRESHOLD {
            let rules = &self.rules;
            windows.retain(|(name, _), w| {
                rules
                    .iter()
                    .find(|r| r.name == *name)
                    .is_some_and(|r| now.duration_since(w.started) < r.window)
            });
        }

        for rule in self.rules.iter().filter(|r| r.applies_to(path)) {
            let window = windows
                .entry((rule.name, client.to_string()))
                .or_insert(Window {
                    started: now,
                    count: 0,
                });
            if now.duration_since(window.started) >= rule.window {
                *window = Window {
                    started: now,
                    count: 0,
                };
            }
            if window.count >= rule.max_requests {
                log::warn!("rate limit '{}' exceeded by {client} on {path}", rule.name);
                return Err(AppError::TooManyRequests(rule.message.to_string()));
            }
            window.count += 1;
        }
        Ok(())
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimiter
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimiterService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimiterService {
            service,
            limiter: self.clone(),
        }))
    }
}

pub struct RateLimiterService<S> {
    service: S,
    limiter: RateLimiter,
}

impl<S, B> Service<ServiceRequest> for RateLimiterService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if req.method() == Method::OPTIONS {
            return Box::pin(self.service.call(req));
        }

        let client = req
            .peer_addr()
            .map(|addr| addr.ip().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        match self.limiter.check(req.path(), &client) {
            Ok(()) => Box::pin(self.service.call(req)),
            Err(error) => Box::pin(async move { Err(error.into()) }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, HttpResponse, http::StatusCode, test, web};

    fn small_limits() -> RateLimitConfig {
        RateLimitConfig {
            enabled: true,
            api_window_secs: 60,
            api_max_requests: 100,
            auth_window_secs: 60,
            auth_max_requests: 2,
            donation_window_secs: 60,
            donation_max_requests: 3,
        }
    }

    #[::core::prelude::v1::test]
    fn test_donation_rule_blocks_after_max() {
        let limiter = RateLimiter::from_config(&small_limits());
        let now = Instant::now();
        for _ in 0..3 {
            assert!(limiter.check_at("/api/donations/create", "10.0.0.1", now).is_ok());
        }
        let err = limiter
            .check_at("/api/donations/create", "10.0.0.1", now)
            .unwrap_err();
        assert!(matches!(err, AppError::TooManyRequests(_)));

        // Other clients and other routes are unaffected.
        assert!(limiter.check_at("/api/donations/create", "10.0.0.2", now).is_ok());
        assert!(limiter.check_at("/api/events/public", "10.0.0.1", now).is_ok());
    }

    #[::core::prelude::v1::test]
    fn test_window_resets_after_expiry() {
        let limiter = RateLimiter::from_config(&small_limits());
        let start = Instant::now();
        assert!(limiter.check_at("/api/auth/login", "ip", start).is_ok());
        assert!(limiter.check_at("/api/auth/login", "ip", start).is_ok());
        assert!(limiter.check_at("/api/auth/login", "ip", start).is_err());

        let later = start + Duration::from_secs(61);
        assert!(limiter.check_at("/api/auth/login", "ip", later).is_ok());
    }

    #[::core::prelude::v1::test]
    fn test_disabled_limiter_allows_everything() {
        let mut config = small_limits();
        config.enabled = false;
        let limiter = RateLimiter::from_config(&config);
        let now = Instant::now();
        for _ in 0..10 {
            assert!(limiter.check_at("/api/auth/login", "ip", now).is_ok());
        }
    }

    #[actix_web::test]
    async fn test_middleware_returns_429() {
        let limiter = RateLimiter::from_config(&small_limits());
        let app = test::init_service(
            App::new()
                .wrap(limiter)
                .route("/api/auth/login", web::post().to(HttpResponse::Ok)),
        )
        .await;

        for _ in 0..2 {
            let req = test::TestRequest::post()
                .uri("/api/auth/login")
                .peer_addr("127.0.0.1:9000".parse().unwrap())
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::OK);
        }

        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .peer_addr("127.0.0.1:9000".parse().unwrap())
            .to_request();
        let err = test::try_call_service(&app, req).await.unwrap_err();
        assert_eq!(
            err.as_response_error().status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
    }
}
