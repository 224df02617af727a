//! List packed artifacts.

use std::path::Path;

use anyhow::{Context, Result};
use onepage_pack::list_artifacts;

use crate::config::Config;

/// Run the list command.
pub fn run(config_path: &Path, json: bool) -> Result<()> {
    let config = Config::load(config_path)?;
    let pack_config = config.pack_config();
    let output_dir = pack_config.output_path();

    let artifacts = list_artifacts(&output_dir, &pack_config.prefix)
        .with_context(|| format!("Failed to read {}", output_dir.display()))?;

    if json {
        let entries: Vec<serde_json::Value> = artifacts
            .iter()
            .map(|a| {
                serde_json::json!({
                    "file": a.path.display().to_string(),
                    "timestamp": a.timestamp,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if artifacts.is_empty() {
        tracing::info!("No artifacts in {}", output_dir.display());
        return Ok(());
    }

    for artifact in &artifacts {
        println!("{:>15}  {}", artifact.timestamp, artifact.path.display());
    }

    Ok(())
}
