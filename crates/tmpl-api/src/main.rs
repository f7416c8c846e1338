//! Template service binary: imports Creatomate templates and submits renders.

use std::net::SocketAddr;

use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tmpl_api::{create_router, metrics, ApiConfig, AppState};
use tmpl_creatomate::CreatomateClient;
use tmpl_importer::ImporterConfig;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // rustls 0.23 needs an explicit provider before reqwest builds a client
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    let config = ApiConfig::from_env();
    init_tracing(config.json_logs);

    info!(
        host = %config.host,
        port = config.port,
        environment = %config.environment,
        "Starting template service"
    );

    let creatomate = match CreatomateClient::from_env() {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to configure Creatomate client: {}", e);
            std::process::exit(1);
        }
    };
    info!(base_url = %creatomate.base_url(), "Creatomate client ready");

    let importer_config = ImporterConfig::from_env();
    info!(
        sample_render = importer_config.sample_render,
        description_fallback = importer_config.description_fallback,
        "Importer config"
    );

    match config.webhook_url() {
        Some(url) => info!(webhook_url = %url, "Render status webhook configured"),
        None => warn!("WEBHOOK_BASE_URL not set, render jobs will not receive status updates"),
    }

    let metrics_handle = config.metrics_enabled.then(|| {
        info!("Prometheus metrics enabled at /metrics");
        metrics::init_metrics()
    });

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("Invalid bind address");

    let state = AppState::new(config, creatomate, importer_config);
    let app = create_router(state, metrics_handle);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    info!("Template service stopped");
}

fn init_tracing(json: bool) {
    let env_filter = EnvFilter::from_default_env()
        .add_directive("tmpl=info".parse().expect("valid log directive"));

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(false))
            .init();
    }
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C handler");
    info!("Received shutdown signal, draining connections");
}
