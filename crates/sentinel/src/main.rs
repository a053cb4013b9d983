//! Flood Sentinel - Main Entry Point

use sentinel::{init_logging, run, Settings};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let path = Settings::path();
    let settings = Settings::load_from(&path)?;
    init_logging(&settings.logging)?;

    info!("=== Flood Sentinel v{} ===", env!("CARGO_PKG_VERSION"));
    info!("Settings from {}", path.display());

    run(settings, &path).await
}
