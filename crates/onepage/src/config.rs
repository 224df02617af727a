//! Configuration file (onepage.toml).

use std::fs;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use onepage_pack::{PackConfig, PackMode};
use serde::Deserialize;

/// Configuration file structure.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub build: BuildSettings,
    #[serde(default)]
    pub pack: PackSettings,
}

#[derive(Debug, Deserialize)]
pub struct ProjectConfig {
    #[serde(default = "default_root")]
    pub root: String,
    #[serde(default = "default_output")]
    pub output: String,
}

#[derive(Debug, Deserialize)]
pub struct BuildSettings {
    #[serde(default = "default_command")]
    pub command: String,
    #[serde(default = "default_entry")]
    pub entry: String,
}

#[derive(Debug, Deserialize)]
pub struct PackSettings {
    #[serde(default)]
    pub mode: PackMode,
    #[serde(default = "default_prefix")]
    pub prefix: String,
    #[serde(default = "default_assets")]
    pub default_assets: Vec<String>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            output: default_output(),
        }
    }
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            command: default_command(),
            entry: default_entry(),
        }
    }
}

impl Default for PackSettings {
    fn default() -> Self {
        Self {
            mode: PackMode::default(),
            prefix: default_prefix(),
            default_assets: default_assets(),
        }
    }
}

fn default_root() -> String {
    ".".to_string()
}
fn default_output() -> String {
    "dist".to_string()
}
fn default_command() -> String {
    "npm run build".to_string()
}
fn default_entry() -> String {
    "index.html".to_string()
}
fn default_prefix() -> String {
    "output".to_string()
}
fn default_assets() -> Vec<String> {
    vec!["vite.svg".to_string()]
}

/// Loaded configuration together with the directory relative paths resolve against.
#[derive(Debug)]
pub struct Config {
    pub file: ConfigFile,
    pub base_dir: PathBuf,
}

impl Config {
    /// Load configuration from `path` if it exists.
    /// Returns an error if the file exists but is malformed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No {} found, using defaults", path.display());
            return Ok(Self {
                file: ConfigFile::default(),
                base_dir: PathBuf::from("."),
            });
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let file: ConfigFile = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        tracing::debug!("Loaded config from {}", path.display());

        let base_dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        Ok(Self { file, base_dir })
    }

    /// Pack configuration with the project root resolved.
    pub fn pack_config(&self) -> PackConfig {
        PackConfig {
            root: resolve_root(&self.base_dir, &self.file.project.root),
            output_dir: PathBuf::from(&self.file.project.output),
            entry: self.file.build.entry.clone(),
            prefix: self.file.pack.prefix.clone(),
            mode: self.file.pack.mode,
            default_assets: self.file.pack.default_assets.clone(),
        }
    }
}

/// Join `root` onto `base_dir` without introducing `.` segments.
fn resolve_root(base_dir: &Path, root: &str) -> PathBuf {
    let root = Path::new(root);
    let is_current = |p: &Path| p.components().all(|c| c == Component::CurDir);

    if is_current(base_dir) {
        return root.to_path_buf();
    }
    if is_current(root) {
        return base_dir.to_path_buf();
    }
    base_dir.join(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn missing_file_uses_defaults() {
        let temp = tempdir().unwrap();
        let config = Config::load(&temp.path().join("onepage.toml")).unwrap();
        let pack = config.pack_config();

        assert_eq!(config.file.build.command, "npm run build");
        assert_eq!(pack.root, PathBuf::from("."));
        assert_eq!(
            pack.output_path().to_string_lossy(),
            Path::new(".").join("dist").to_string_lossy()
        );
        assert_eq!(pack.output_dir, PathBuf::from("dist"));
        assert_eq!(pack.entry, "index.html");
        assert_eq!(pack.prefix, "output");
        assert_eq!(pack.mode, PackMode::Base);
        assert_eq!(pack.default_assets, vec!["vite.svg".to_string()]);
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_keys() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("onepage.toml");
        fs::write(&path, "[pack]\nmode = \"inlined\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        let pack = config.pack_config();

        assert_eq!(pack.mode, PackMode::Inlined);
        assert_eq!(pack.prefix, "output");
        assert_eq!(pack.output_dir, PathBuf::from("dist"));
        assert_eq!(config.file.build.command, "npm run build");
    }

    #[test]
    fn root_resolves_against_config_directory() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("onepage.toml");
        fs::write(
            &path,
            r#"
[project]
root = "site"
output = "build"

[build]
command = "pnpm build"
entry = "main.html"

[pack]
prefix = "deck"
default_assets = []
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        let pack = config.pack_config();

        assert_eq!(pack.root, temp.path().join("site"));
        assert_eq!(pack.output_path(), temp.path().join("site").join("build"));
        assert_eq!(pack.entry_path(), temp.path().join("site/build/main.html"));
        assert_eq!(pack.prefix, "deck");
        assert!(pack.default_assets.is_empty());
        assert_eq!(config.file.build.command, "pnpm build");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("onepage.toml");
        fs::write(&path, "[pack]\nmode = \"zipped\"\n").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }

    #[test]
    fn default_root_next_to_config_has_no_dot_segments() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("onepage.toml");
        fs::write(&path, "[project]\nroot = \".\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        let pack = config.pack_config();

        assert_eq!(pack.root.as_os_str(), temp.path().as_os_str());
        assert!(pack
            .entry_path()
            .components()
            .all(|c| c != Component::CurDir));
    }

    #[test]
    fn resolves_roots_lexically() {
        assert_eq!(resolve_root(Path::new("."), "."), PathBuf::from("."));
        assert_eq!(resolve_root(Path::new(""), "site"), PathBuf::from("site"));
        assert_eq!(resolve_root(Path::new("proj"), "."), PathBuf::from("proj"));
        assert_eq!(resolve_root(Path::new("proj"), "site"), PathBuf::from("proj/site"));
    }
}
