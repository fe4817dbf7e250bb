//! Asset handling: find the files a document's Markdown depends on and
//! copy them next to the document in the output tree.
//!
//! Two shapes of reference occur in flattened markup: Markdown links and
//! images (`![x](assets/x.png)`) and raw HTML media elements
//! (`<video src="assets/v.mp4">`). Both keep their `assets/…` path in the
//! output, so the files land in an `assets/` directory beside the document.

// A panic on a literal pattern is a programming error.
#![allow(clippy::expect_used)]

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

static MD_ASSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\]\(([^)]*assets[^)]*)\)").expect("md asset pattern"));

static HTML_ASSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"src="([^"]*assets[^"]*)""#).expect("html asset pattern"));

/// Relative asset paths referenced by `markdown`, in order of appearance,
/// Markdown references first.
#[must_use]
pub fn referenced_assets(markdown: &str) -> Vec<String> {
    let mut paths = Vec::new();
    for caps in MD_ASSET.captures_iter(markdown) {
        if let Some(path) = caps.get(1) {
            paths.push(path.as_str().to_string());
        }
    }
    for caps in HTML_ASSET.captures_iter(markdown) {
        if let Some(path) = caps.get(1) {
            paths.push(path.as_str().to_string());
        }
    }
    paths
}

/// Copy every asset `markdown` references from `assets_root` into
/// `doc_dir`, keeping the relative path. Returns the number of files
/// copied; a missing source file is reported and skipped, not fatal.
///
/// # Errors
///
/// Returns an error when a directory cannot be created or a copy fails.
pub fn copy_referenced(
    markdown: &str,
    assets_root: &Path,
    doc_dir: &Path,
) -> anyhow::Result<usize> {
    let mut copied = 0;
    for rel in referenced_assets(markdown) {
        let source = assets_root.join(&rel);
        if !source.is_file() {
            tracing::warn!(asset = %source.display(), "referenced asset not found, skipped");
            continue;
        }
        let target = doc_dir.join(&rel);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::copy(&source, &target)?;
        tracing::debug!(from = %source.display(), to = %target.display(), "asset copied");
        copied += 1;
    }
    Ok(copied)
}
