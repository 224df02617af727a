//! Artifact packager.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Deserialize;

use crate::artifact::artifact_file_name;
use crate::audit::{find_external_refs, find_leftovers, AuditReport, RefSource};
use crate::clock::{Clock, SystemClock};
use crate::invoker::BuildInvoker;

/// How the build output is turned into an artifact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackMode {
    /// Copy the entry file and leave the build output untouched
    #[default]
    Base,

    /// Copy the entry file, then remove it and the template's default assets
    Inlined,
}

/// Configuration for packing a project.
#[derive(Debug, Clone)]
pub struct PackConfig {
    /// Project root; the build runs here
    pub root: PathBuf,

    /// Output directory, relative to the root
    pub output_dir: PathBuf,

    /// Entry file name inside the output directory
    pub entry: String,

    /// Artifact file name prefix
    pub prefix: String,

    /// Packing variant
    pub mode: PackMode,

    /// Template files removed in inlined mode when present
    pub default_assets: Vec<String>,
}

impl Default for PackConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            output_dir: PathBuf::from("dist"),
            entry: "index.html".to_string(),
            prefix: "output".to_string(),
            mode: PackMode::Base,
            default_assets: vec!["vite.svg".to_string()],
        }
    }
}

impl PackConfig {
    /// Resolved output directory.
    pub fn output_path(&self) -> PathBuf {
        self.root.join(&self.output_dir)
    }

    /// Resolved entry file.
    pub fn entry_path(&self) -> PathBuf {
        self.output_path().join(&self.entry)
    }
}

/// Result of a pack operation.
#[derive(Debug)]
pub struct PackResult {
    /// Path of the new artifact
    pub artifact: PathBuf,

    /// Pack start time used in the artifact name
    pub timestamp: u64,

    /// Files deleted after copying (inlined mode)
    pub removed: Vec<PathBuf>,

    /// Self-containment findings
    pub audit: AuditReport,

    /// Total pack time in milliseconds, build included
    pub duration_ms: u64,
}

/// Errors that can occur while packing.
#[derive(Debug, thiserror::Error)]
pub enum PackError {
    #[error("Build command `{command}` failed with {}", describe_code(.code))]
    BuildFailure { command: String, code: Option<i32> },

    #[error("Build succeeded but did not produce an entry file at {}", .path.display())]
    ArtifactMissing { path: PathBuf },

    #[error("Failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to {action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl PackError {
    /// Process exit status to report for this error.
    ///
    /// Build failures pass the child's own status through; a child killed
    /// by a signal has none and maps to 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            PackError::BuildFailure { code, .. } => code.filter(|c| *c != 0).unwrap_or(1),
            _ => 1,
        }
    }
}

fn describe_code(code: &Option<i32>) -> String {
    match *code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

fn io_error(action: &'static str, path: &Path) -> impl FnOnce(io::Error) -> PackError {
    let path = path.to_path_buf();
    move |source| PackError::Io {
        action,
        path,
        source,
    }
}

/// Builds a project and packs its entry file into a timestamped artifact.
pub struct Packager<I, C = SystemClock> {
    config: PackConfig,
    invoker: I,
    clock: C,
}

impl<I: BuildInvoker> Packager<I> {
    /// Create a packager using the system clock.
    pub fn new(config: PackConfig, invoker: I) -> Self {
        Self::with_clock(config, invoker, SystemClock)
    }
}

impl<I: BuildInvoker, C: Clock> Packager<I, C> {
    /// Create a packager with an explicit clock.
    pub fn with_clock(config: PackConfig, invoker: I, clock: C) -> Self {
        Self {
            config,
            invoker,
            clock,
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Run the build and pack its output.
    ///
    /// Any failure ends the run; nothing is retried and nothing already
    /// written is rolled back.
    pub async fn pack(&self) -> Result<PackResult, PackError> {
        let start = Instant::now();
        let output_dir = self.config.output_path();

        fs::create_dir_all(&output_dir).map_err(io_error("create", &output_dir))?;

        let timestamp = self.clock.now_millis();
        let artifact = output_dir.join(artifact_file_name(&self.config.prefix, timestamp));
        tracing::debug!("Artifact will be written to {}", artifact.display());

        tracing::info!("Building project with `{}`...", self.invoker.describe());
        self.invoker.invoke(&self.config.root).await?;

        let entry = self.config.entry_path();
        if !entry.is_file() {
            return Err(PackError::ArtifactMissing { path: entry });
        }

        fs::copy(&entry, &artifact).map_err(io_error("copy", &entry))?;

        let removed = match self.config.mode {
            PackMode::Base => Vec::new(),
            PackMode::Inlined => self.remove_originals(&output_dir, &entry)?,
        };

        let audit = self.audit(&artifact, &output_dir, &entry);

        tracing::info!("Successfully created: {}", artifact.display());

        Ok(PackResult {
            artifact,
            timestamp,
            removed,
            audit,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Delete the entry file and any default template assets.
    fn remove_originals(&self, output_dir: &Path, entry: &Path) -> Result<Vec<PathBuf>, PackError> {
        fs::remove_file(entry).map_err(io_error("remove", entry))?;
        tracing::info!("Removed {}", entry.display());

        let mut removed = vec![entry.to_path_buf()];

        for asset in &self.config.default_assets {
            let path = output_dir.join(asset);
            if !path.exists() {
                continue;
            }
            fs::remove_file(&path).map_err(io_error("remove", &path))?;
            tracing::info!("Removed {}", path.display());
            removed.push(path);
        }

        Ok(removed)
    }

    /// Check that the artifact does not depend on other files.
    fn audit(&self, artifact: &Path, output_dir: &Path, entry: &Path) -> AuditReport {
        let external_refs = match fs::read(artifact) {
            Ok(bytes) => find_external_refs(&String::from_utf8_lossy(&bytes)),
            Err(e) => {
                tracing::warn!("Could not audit {}: {}", artifact.display(), e);
                Vec::new()
            }
        };

        for r in &external_refs {
            let source = match &r.source {
                RefSource::Attribute(name) => name.as_str(),
                RefSource::CssUrl => "url()",
            };
            tracing::warn!(
                "{}:{}: {} points at local file `{}`, which will not load once the artifact is moved",
                artifact.display(),
                r.line,
                source,
                r.target
            );
        }

        let keep: Vec<PathBuf> = match self.config.mode {
            PackMode::Base => std::iter::once(entry.to_path_buf())
                .chain(self.config.default_assets.iter().map(|a| output_dir.join(a)))
                .collect(),
            PackMode::Inlined => Vec::new(),
        };

        let leftovers = find_leftovers(output_dir, &self.config.prefix, &keep);
        if !leftovers.is_empty() {
            let listed: Vec<String> = leftovers.iter().map(|p| p.display().to_string()).collect();
            tracing::warn!(
                "{} file(s) in {} were not inlined into the artifact: {}",
                leftovers.len(),
                output_dir.display(),
                listed.join(", ")
            );
        }

        AuditReport {
            external_refs,
            leftovers,
        }
    }
}
