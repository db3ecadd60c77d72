use anyhow::Result;
use tracing::info;

use trinetra_api::{app, config, middleware};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Load configuration
    let config = config::Config::load()?;

    // Initialize logging and metrics
    middleware::logging::init_logging(&config.logging);
    middleware::metrics::init_metrics();

    info!("Starting Trinetra API v{}", env!("CARGO_PKG_VERSION"));

    // Build application
    let addr = config.socket_addr();
    let app = app::create_app(config);

    // Start server
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
