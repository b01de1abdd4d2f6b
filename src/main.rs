/**
 * XFChat Server Entry Point
 *
 * Loads the environment, initializes tracing, builds the application, and
 * serves it.
 */

use std::net::SocketAddr;

use xfchat::server::config::Config;
use xfchat::server::init::create_app_with;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file if present
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "xfchat=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env();
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    let app = create_app_with(config).await;

    tracing::info!("xfchat server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
