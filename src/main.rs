//! HTTP server for the payroll cost engine.
//!
//! Reads `PAYROLL_CONFIG_DIR` (default `./config/cl`) and `PAYROLL_BIND_ADDR`
//! (default `127.0.0.1:3000`), optionally from a `.env` file.

use std::env;

use dotenvy::dotenv;
use tracing::info;

use payroll_cost_engine::api::{AppState, create_router};
use payroll_cost_engine::config::ConfigLoader;

const DEFAULT_CONFIG_DIR: &str = "./config/cl";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

struct ServerConfig {
    config_dir: String,
    bind_addr: String,
}

impl ServerConfig {
    fn from_env() -> Self {
        Self {
            config_dir: env::var("PAYROLL_CONFIG_DIR")
                .unwrap_or_else(|_| DEFAULT_CONFIG_DIR.to_string()),
            bind_addr: env::var("PAYROLL_BIND_ADDR")
                .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .init();

    let server = ServerConfig::from_env();
    let config = ConfigLoader::load(&server.config_dir)?;
    let engine = config.engine()?;
    let router = create_router(AppState::new(engine));

    let listener = tokio::net::TcpListener::bind(&server.bind_addr).await?;
    info!(
        addr = %server.bind_addr,
        config_dir = %server.config_dir,
        "Payroll cost engine listening"
    );
    axum::serve(listener, router).await?;

    Ok(())
}
