//! Preview server command.

use std::net::SocketAddr;
use std::path::Path;

use anyhow::{Context, Result};
use axum::Router;
use onepage_pack::list_artifacts;
use tower_http::services::ServeDir;

use crate::config::Config;

/// Run the serve command.
pub async fn run(config_path: &Path, port: u16, open: bool) -> Result<()> {
    let config = Config::load(config_path)?;
    let pack_config = config.pack_config();
    let dir = pack_config.output_path();

    if !dir.exists() {
        anyhow::bail!(
            "Directory not found: {}. Run 'onepage pack' first.",
            dir.display()
        );
    }

    let addr: SocketAddr = format!("127.0.0.1:{}", port)
        .parse()
        .context("Invalid address")?;

    let latest = list_artifacts(&dir, &pack_config.prefix)
        .with_context(|| format!("Failed to read {}", dir.display()))?
        .into_iter()
        .next();

    let url = match &latest {
        Some(artifact) => format!("http://{}/{}", addr, artifact.file_name()),
        None => {
            tracing::warn!("No artifacts in {}", dir.display());
            format!("http://{}", addr)
        }
    };

    tracing::info!("Serving {} at http://{}", dir.display(), addr);

    let app = Router::new().fallback_service(ServeDir::new(&dir));

    let listener = tokio::net::TcpListener::bind(addr).await?;

    if open {
        tracing::info!("Opening {}", url);
        let _ = open::that(&url);
    }

    axum::serve(listener, app).await?;

    Ok(())
}
