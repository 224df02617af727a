//! Self-containment checks for packed artifacts.
//!
//! A packed artifact is only portable when the bundler inlined every asset.
//! These checks look for references to local files left in the HTML and for
//! bundle output that was not folded into the entry file.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use walkdir::WalkDir;

use crate::artifact::parse_artifact_timestamp;

/// Where in the document a reference was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefSource {
    /// An HTML attribute such as `src` or `href`
    Attribute(String),
    /// A CSS `url(...)` value
    CssUrl,
}

/// A reference from the artifact to a file outside of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalRef {
    pub source: RefSource,
    pub target: String,
    /// 1-based line in the artifact
    pub line: usize,
}

/// Findings from auditing a packed artifact.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditReport {
    /// Local file references that will break once the artifact moves
    pub external_refs: Vec<ExternalRef>,

    /// Files left in the output directory, relative to it
    pub leftovers: Vec<PathBuf>,
}

impl AuditReport {
    /// True when nothing suggests the artifact depends on other files.
    pub fn is_clean(&self) -> bool {
        self.external_refs.is_empty() && self.leftovers.is_empty()
    }
}

/// Find references to local files in an HTML document.
pub fn find_external_refs(html: &str) -> Vec<ExternalRef> {
    static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r#"(?i)\s(src|href)\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
            .expect("Invalid attribute regex")
    });
    static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r#"url\(\s*(?:"([^"]*)"|'([^']*)'|([^'")\s]+))\s*\)"#)
            .expect("Invalid css url regex")
    });

    let mut refs = Vec::new();

    for caps in ATTR_RE.captures_iter(html) {
        let Some(value) = caps.get(2).or_else(|| caps.get(3)) else {
            continue;
        };
        if is_local_target(value.as_str()) {
            refs.push(ExternalRef {
                source: RefSource::Attribute(caps[1].to_lowercase()),
                target: value.as_str().trim().to_string(),
                line: line_of(html, value.start()),
            });
        }
    }

    for caps in URL_RE.captures_iter(html) {
        let Some(value) = caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3)) else {
            continue;
        };
        if is_local_target(value.as_str()) {
            refs.push(ExternalRef {
                source: RefSource::CssUrl,
                target: value.as_str().trim().to_string(),
                line: line_of(html, value.start()),
            });
        }
    }

    refs.sort_by_key(|r| r.line);
    refs
}

/// Whether a reference target resolves to a file next to the document.
fn is_local_target(target: &str) -> bool {
    const SELF_CONTAINED: &[&str] = &[
        "data:",
        "blob:",
        "http:",
        "https:",
        "//",
        "mailto:",
        "tel:",
        "javascript:",
        "about:",
    ];

    let target = target.trim();
    if target.is_empty() || target.starts_with('#') {
        return false;
    }

    let lower = target.to_ascii_lowercase();
    !SELF_CONTAINED.iter().any(|p| lower.starts_with(p))
}

fn line_of(text: &str, offset: usize) -> usize {
    text[..offset].bytes().filter(|&b| b == b'\n').count() + 1
}

/// List files in `output_dir` that are neither artifacts nor in `keep`.
///
/// Paths are returned relative to `output_dir`, sorted.
pub fn find_leftovers(output_dir: &Path, prefix: &str, keep: &[PathBuf]) -> Vec<PathBuf> {
    let mut leftovers: Vec<PathBuf> = WalkDir::new(output_dir)
        .min_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            let is_artifact = e.depth() == 1
                && e.file_name()
                    .to_str()
                    .and_then(|n| parse_artifact_timestamp(n, prefix))
                    .is_some();
            !is_artifact && !keep.iter().any(|k| k == e.path())
        })
        .map(|e| {
            e.path()
                .strip_prefix(output_dir)
                .unwrap_or(e.path())
                .to_path_buf()
        })
        .collect();

    leftovers.sort();
    leftovers
}
