//! Rate-limit middleware.
//!
//! Rejects over-limit callers with 429 before the inner service runs and
//! stamps quota headers on every response that passed the check: the
//! generation limiter uses the standard `RateLimit-*` names, the general
//! limiter the legacy `X-RateLimit-*` names with an epoch reset time.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderName, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use tracing::warn;

use crate::AppState;
use crate::error::{AppError, retry_after_secs};
use crate::services::client_ip::client_key;
use crate::services::rate_limit::{RateLimitDecision, SlidingWindowLimiter};

static RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("ratelimit-limit");
static RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("ratelimit-remaining");
static RATELIMIT_RESET: HeaderName = HeaderName::from_static("ratelimit-reset");
static X_RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
static X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
static X_RATELIMIT_RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");

#[derive(Debug, Clone, Copy)]
enum Scope {
    General,
    Portrait,
}

impl Scope {
    fn name(self) -> &'static str {
        match self {
            Scope::General => "general",
            Scope::Portrait => "portrait",
        }
    }

    fn message(self) -> &'static str {
        match self {
            Scope::General => "Too many requests. Please slow down.",
            Scope::Portrait => "Too many requests. Please wait before generating more portraits.",
        }
    }

    fn hint(self) -> Option<&'static str> {
        match self {
            Scope::General => None,
            Scope::Portrait => Some("Try again in 1 hour."),
        }
    }
}

/// Lenient limit applied to every route.
pub async fn limit_general(State(state): State<AppState>, request: Request, next: Next) -> Response {
    enforce(&state, &state.general_limiter, Scope::General, request, next).await
}

/// Strict limit applied to portrait generation.
pub async fn limit_portraits(State(state): State<AppState>, request: Request, next: Next) -> Response {
    enforce(&state, &state.portrait_limiter, Scope::Portrait, request, next).await
}

async fn enforce(
    state: &AppState,
    limiter: &SlidingWindowLimiter,
    scope: Scope,
    request: Request,
    next: Next,
) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let key = client_key(request.headers(), peer, state.config.trust_proxy_hops);

    let decision = limiter.check(&key);
    let mut response = if decision.allowed {
        next.run(request).await
    } else {
        warn!(client = %key, scope = scope.name(), "rate limit exceeded");
        AppError::RateLimited {
            message: scope.message(),
            hint: scope.hint(),
            retry_after: decision.reset,
        }
        .into_response()
    };
    apply_headers(response.headers_mut(), scope, &decision);
    response
}

fn apply_headers(headers: &mut HeaderMap, scope: Scope, decision: &RateLimitDecision) {
    let reset_secs = retry_after_secs(decision.reset);
    let (limit, remaining, reset, reset_value) = match scope {
        Scope::Portrait => (
            &RATELIMIT_LIMIT,
            &RATELIMIT_REMAINING,
            &RATELIMIT_RESET,
            reset_secs,
        ),
        Scope::General => {
            let now = u64::try_from(Utc::now().timestamp()).unwrap_or_default();
            (
                &X_RATELIMIT_LIMIT,
                &X_RATELIMIT_REMAINING,
                &X_RATELIMIT_RESET,
                now + reset_secs,
            )
        }
    };
    headers.insert(limit.clone(), HeaderValue::from(decision.limit));
    headers.insert(remaining.clone(), HeaderValue::from(decision.remaining));
    headers.insert(reset.clone(), HeaderValue::from(reset_value));
}
