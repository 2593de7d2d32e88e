//! # moodverse_api
//!
//! HTTP API library for Moodverse.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod services;

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{MethodRouter, get, get_service, post};
use http::{HeaderValue, Method, StatusCode};
use moodverse_core::upstream::CompletionClient;
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::config::ApiConfig;
use crate::handlers::{health, portrait};
use crate::middleware::rate_limit::{limit_general, limit_portraits};
use crate::services::rate_limit::SlidingWindowLimiter;

/// Maximum accepted JSON request body.
pub const MAX_BODY_BYTES: usize = 10 * 1024;

/// Process-scoped context passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// API configuration.
    pub config: ApiConfig,
    /// Completion provider used for portrait generation.
    pub completions: Arc<dyn CompletionClient>,
    /// Lenient limiter guarding every route.
    pub general_limiter: Arc<SlidingWindowLimiter>,
    /// Strict limiter guarding portrait generation.
    pub portrait_limiter: Arc<SlidingWindowLimiter>,
}

impl AppState {
    pub fn new(config: ApiConfig, completions: Arc<dyn CompletionClient>) -> Self {
        Self {
            general_limiter: Arc::new(SlidingWindowLimiter::new(config.general_limit)),
            portrait_limiter: Arc::new(SlidingWindowLimiter::new(config.portrait_limit)),
            config,
            completions,
        }
    }
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(state.config.allowed_origin.as_deref());

    let entry_page = entry_page(&state.config.static_dir);

    // route_layer: methods other than POST fall through to the entry page
    // without touching the generation quota.
    let generate = post(portrait::generate_portrait_handler)
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            limit_portraits,
        ))
        .fallback_service(entry_page.clone());

    Router::new()
        .route(
            routes::GET_HEALTH,
            get(health::health_handler).fallback_service(entry_page.clone()),
        )
        .route(routes::POST_GENERATE_PORTRAIT, generate)
        .fallback_service(entry_page)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            limit_general,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Static assets for GET/HEAD with `index.html` as the catch-all; any other
/// method on an unrouted path is 404.
fn entry_page(static_dir: &Path) -> MethodRouter {
    let assets =
        ServeDir::new(static_dir).fallback(ServeFile::new(static_dir.join("index.html")));
    get_service(assets).fallback(|| async { StatusCode::NOT_FOUND })
}

fn cors_layer(allowed_origin: Option<&str>) -> CorsLayer {
    let origin = match allowed_origin.map(str::trim) {
        None | Some("") | Some("*") => AllowOrigin::any(),
        Some(o) => match HeaderValue::from_str(o) {
            Ok(v) => AllowOrigin::exact(v),
            Err(e) => {
                warn!(origin = o, "ignoring invalid ALLOWED_ORIGIN: {e}");
                AllowOrigin::list(Vec::<HeaderValue>::new())
            }
        },
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(AllowHeaders::mirror_request())
}
