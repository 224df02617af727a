//! Build-and-pack command.

use std::path::{Path, PathBuf};

use anyhow::Result;
use onepage_pack::{PackConfig, PackMode, Packager, ShellInvoker};

use crate::config::Config;

/// Run the pack command.
pub async fn run(config_path: &Path, inline: bool, root: Option<PathBuf>) -> Result<()> {
    let config = Config::load(config_path)?;
    let pack_config = resolve(&config, inline, root);

    tracing::debug!(
        "Packing {} ({:?} mode) into {}",
        pack_config.root.display(),
        pack_config.mode,
        pack_config.output_path().display()
    );

    let invoker = ShellInvoker::new(config.file.build.command.as_str());
    let result = Packager::new(pack_config, invoker).pack().await?;

    if !result.audit.is_clean() {
        tracing::warn!(
            "Artifact may not be self-contained; make sure the bundler inlines all assets, \
             disables CSS code splitting and inlines dynamic imports"
        );
    }

    tracing::debug!("Packed in {}ms", result.duration_ms);

    Ok(())
}

/// Apply command-line overrides on top of the file configuration.
fn resolve(config: &Config, inline: bool, root: Option<PathBuf>) -> PackConfig {
    let mut pack_config = config.pack_config();
    if let Some(root) = root {
        pack_config.root = root;
    }
    if inline {
        pack_config.mode = PackMode::Inlined;
    }
    pack_config
}
