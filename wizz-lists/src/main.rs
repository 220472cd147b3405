//! wizz-lists - Main entry point

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter};

use wizz_lists::build_info::BuildInfo;
use wizz_lists::config::{Args, ServiceConfig};
use wizz_lists::{build_router, AppState};

const DEFAULT_LOG_FILTER: &str = "info";

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // RUST_LOG wins; otherwise the TOML logging level is applied once loaded
    let rust_log_set = std::env::var_os("RUST_LOG").is_some();
    let initial_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let (filter, filter_handle) = reload::Layer::new(initial_filter);
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let toml_config = wizz_common::config::load_or_default(args.config.as_deref());
    let config = ServiceConfig::resolve(&args, &toml_config);
    if !rust_log_set {
        filter_handle
            .modify(|filter| *filter = EnvFilter::new(&config.log_level))
            .context("Failed to apply configured log level")?;
    }

    info!("Starting wizz-lists (list generation) service");
    info!("wizz-lists {}", BuildInfo::current());
    info!("Structured source: {}", config.sparql_endpoint);
    info!(
        "Generative model: {}",
        if config.openai_api_key.is_some() {
            config.openai_model.as_str()
        } else {
            "disabled (no API key)"
        }
    );

    let bind_addr = config.bind_addr();
    let state = AppState::from_config(config).context("Failed to build upstream clients")?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;
    info!("Listening on http://{}", bind_addr);
    info!("Health check: http://{}/health", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
