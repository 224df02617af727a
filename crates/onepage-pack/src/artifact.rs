//! Timestamped artifact naming and discovery.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A packed artifact found in an output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Full path to the artifact
    pub path: PathBuf,

    /// Pack start time in milliseconds since the Unix epoch
    pub timestamp: u64,
}

impl Artifact {
    /// File name of the artifact (e.g. `output-1700000000000.html`).
    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }
}

/// Build the artifact file name for a given prefix and timestamp.
pub fn artifact_file_name(prefix: &str, timestamp: u64) -> String {
    format!("{}-{}.html", prefix, timestamp)
}

/// Extract the timestamp from an artifact file name.
///
/// Returns `None` unless the name is exactly `<prefix>-<digits>.html`.
pub fn parse_artifact_timestamp(file_name: &str, prefix: &str) -> Option<u64> {
    let digits = file_name
        .strip_prefix(prefix)?
        .strip_prefix('-')?
        .strip_suffix(".html")?;

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    digits.parse().ok()
}

/// List the artifacts in `dir`, newest first.
///
/// A missing directory yields an empty list.
pub fn list_artifacts(dir: &Path, prefix: &str) -> io::Result<Vec<Artifact>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut artifacts = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }

        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };

        if let Some(timestamp) = parse_artifact_timestamp(name, prefix) {
            artifacts.push(Artifact {
                path: entry.path(),
                timestamp,
            });
        }
    }

    artifacts.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    Ok(artifacts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn formats_name_with_prefix_and_millis() {
        assert_eq!(
            artifact_file_name("output", 1_700_000_000_000),
            "output-1700000000000.html"
        );
    }

    #[test]
    fn parses_only_well_formed_names() {
        assert_eq!(
            parse_artifact_timestamp("output-1700000000000.html", "output"),
            Some(1_700_000_000_000)
        );
        assert_eq!(parse_artifact_timestamp("output-.html", "output"), None);
        assert_eq!(parse_artifact_timestamp("output-12a.html", "output"), None);
        assert_eq!(parse_artifact_timestamp("output-+12.html", "output"), None);
        assert_eq!(parse_artifact_timestamp("output-12.htm", "output"), None);
        assert_eq!(parse_artifact_timestamp("deck-12.html", "output"), None);
        assert_eq!(parse_artifact_timestamp("index.html", "output"), None);
    }

    #[test]
    fn lists_newest_first_and_ignores_other_files() {
        let temp = tempdir().unwrap();
        let dir = temp.path();

        fs::write(dir.join("output-100.html"), "a").unwrap();
        fs::write(dir.join("output-300.html"), "b").unwrap();
        fs::write(dir.join("output-200.html"), "c").unwrap();
        fs::write(dir.join("index.html"), "d").unwrap();
        fs::write(dir.join("vite.svg"), "e").unwrap();
        fs::create_dir(dir.join("output-400.html")).unwrap();

        let found = list_artifacts(dir, "output").unwrap();
        let stamps: Vec<u64> = found.iter().map(|a| a.timestamp).collect();

        assert_eq!(stamps, vec![300, 200, 100]);
        assert_eq!(found[0].file_name(), "output-300.html");
    }

    #[test]
    fn missing_directory_lists_nothing() {
        let temp = tempdir().unwrap();
        let found = list_artifacts(&temp.path().join("nope"), "output").unwrap();
        assert!(found.is_empty());
    }
}
