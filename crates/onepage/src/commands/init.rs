//! Write a default configuration file.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Run the init command.
pub fn run(config_path: &Path, yes: bool) -> Result<()> {
    if config_path.exists() && !yes {
        tracing::warn!(
            "{} already exists. Use --yes to overwrite.",
            config_path.display()
        );
        return Ok(());
    }

    if let Some(parent) = config_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    fs::write(config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    tracing::info!("Created {}", config_path.display());
    tracing::info!("Run 'onepage' to build and pack the site.");

    Ok(())
}

const DEFAULT_CONFIG: &str = r#"# onepage configuration

[project]
# Project root; the build command runs here
root = "."

# Build output directory, relative to the root
output = "dist"

[build]
# Must produce a single self-contained HTML file. For Vite, set
# build.assetsInlineLimit = Infinity, build.cssCodeSplit = false and
# build.rollupOptions.output.inlineDynamicImports = true.
command = "npm run build"

# Entry file inside the output directory
entry = "index.html"

[pack]
# "base" keeps the entry file, "inlined" removes it and the default assets
mode = "base"

# Artifacts are named <prefix>-<unix-epoch-ms>.html
prefix = "output"

# Template files removed in inlined mode
default_assets = ["vite.svg"]
"#;
