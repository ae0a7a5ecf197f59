//! SaRcoN Server Binary

use std::sync::Arc;

use sarcon_core::SarconConfig;
use sarcon_server::{serve, AppState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let project_root = std::env::current_dir()?;
    let config = SarconConfig::load_standard(Some(&project_root))?;
    tracing::info!(
        "Using revision {} with models from {:?}",
        config.models.revision,
        config.models.dir
    );

    let addr = config.server.addr.clone();
    let state = Arc::new(AppState::from_config(config, Some(&project_root))?);

    serve(&addr, state).await?;
    Ok(())
}
