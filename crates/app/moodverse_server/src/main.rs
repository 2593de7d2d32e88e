//! Moodverse relay server binary.
//!
//! Validates the provider credential, then serves the portrait API, the
//! health check and the static entry page on one listener.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use moodverse_api::config::ApiConfig;
use moodverse_core::upstream::{
    DEFAULT_MAX_TOKENS, HttpCompletionClient, Provider, UpstreamConfig, redact_api_key,
    validate_api_key,
};
use tracing::{error, info};

/// CLI arguments; every flag can also come from the environment or `.env`.
#[derive(Parser, Debug)]
#[command(name = "moodverse_server", about = "Moodverse portrait relay server")]
struct Args {
    /// Interface to bind.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on.
    #[arg(long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// Completion provider: "anthropic" or "openai".
    #[arg(long, env = "UPSTREAM_PROVIDER", default_value = "anthropic")]
    provider: String,

    #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
    anthropic_api_key: Option<String>,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: Option<String>,

    /// Model identifier; defaults to the provider's default model.
    #[arg(long, env = "UPSTREAM_MODEL")]
    model: Option<String>,

    /// Output token budget per generation.
    #[arg(long, env = "UPSTREAM_MAX_TOKENS", default_value_t = DEFAULT_MAX_TOKENS)]
    max_tokens: u32,

    /// Override the provider endpoint URL.
    #[arg(long, env = "UPSTREAM_BASE_URL")]
    upstream_url: Option<String>,

    /// Deadline for one provider call, in seconds (at least 1).
    #[arg(
        long,
        env = "UPSTREAM_TIMEOUT_SECS",
        default_value_t = 30,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    upstream_timeout_secs: u64,

    /// Origin allowed for cross-origin requests (any when unset).
    #[arg(long, env = "ALLOWED_ORIGIN")]
    allowed_origin: Option<String>,

    /// Directory of static assets served as-is.
    #[arg(long, env = "STATIC_DIR", default_value = "public")]
    static_dir: PathBuf,

    /// Reverse proxies in front of this server; 0 uses the socket address.
    #[arg(long, env = "TRUST_PROXY_HOPS", default_value_t = 1)]
    trust_proxy_hops: usize,
}

impl Args {
    fn api_key(&self, provider: Provider) -> Option<&str> {
        match provider {
            Provider::Anthropic => self.anthropic_api_key.as_deref(),
            Provider::OpenAi => self.openai_api_key.as_deref(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,moodverse_api=debug,moodverse_core=debug".into()),
        )
        .init();

    let args = Args::parse();

    let upstream = match upstream_config(&args) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };
    let api_key_hint = redact_api_key(&upstream.api_key);
    let provider = upstream.provider;
    let model = upstream.model.clone();
    let completions = Arc::new(HttpCompletionClient::new(upstream)?);

    let config = ApiConfig {
        bind_addr: format!("{}:{}", args.host, args.port),
        allowed_origin: args.allowed_origin,
        static_dir: args.static_dir,
        trust_proxy_hops: args.trust_proxy_hops,
        ..ApiConfig::default()
    };

    let state = moodverse_api::AppState::new(config.clone(), completions);
    state.general_limiter.spawn_cleanup_task();
    state.portrait_limiter.spawn_cleanup_task();

    let app = moodverse_api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    let local_addr = listener.local_addr()?;

    info!(
        addr = %local_addr,
        %provider,
        %model,
        api_key = %api_key_hint,
        static_dir = %config.static_dir.display(),
        "Moodverse server listening"
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("server stopped");
    Ok(())
}

fn upstream_config(args: &Args) -> Result<UpstreamConfig, moodverse_core::ConfigError> {
    let provider: Provider = args.provider.parse()?;
    let api_key = validate_api_key(provider, args.api_key(provider))?;
    let mut cfg = UpstreamConfig::new(provider, api_key);
    if let Some(url) = args.upstream_url.as_deref() {
        cfg = cfg.with_endpoint(url)?;
    }
    if let Some(model) = &args.model {
        cfg.model = model.clone();
    }
    cfg.max_tokens = args.max_tokens;
    cfg.timeout = Duration::from_secs(args.upstream_timeout_secs);
    Ok(cfg)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
