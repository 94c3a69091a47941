//! Project discovery - finding and loading the files to order
//!
//! Walks a root directory honoring `.gitignore`, applies the built-in and
//! configured excludes, keeps the paths matching the configured file
//! patterns, and hands each file to the producer registry. Identifiers are
//! root-relative paths with `/` separators, sorted, so runs over the same
//! tree see the same input order.

use crate::adapter::ProducerRegistry;
use crate::config::BuildorderConfig;
use crate::ignore::IgnoreFilter;
use crate::unit::SourceUnit;
use crate::Result;
use glob::{MatchOptions, Pattern};
use std::path::{Path, PathBuf};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Files under `root` selected by `config`, root-relative and sorted
pub fn discover(root: &Path, config: &BuildorderConfig) -> Result<Vec<PathBuf>> {
    let patterns = config
        .files
        .iter()
        .map(|p| Pattern::new(p))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let filter = IgnoreFilter::new(root, Some(&config.exclude));

    let mut found = Vec::new();
    for entry in ::ignore::WalkBuilder::new(root).hidden(false).require_git(false).build() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("skipping unreadable entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }

        let path = entry.path();
        if filter.is_ignored(path, false) {
            tracing::trace!(path = %path.display(), "excluded");
            continue;
        }

        let Ok(relative) = path.strip_prefix(root) else {
            continue;
        };
        if patterns.iter().any(|p| p.matches_path_with(relative, MATCH_OPTIONS)) {
            found.push(relative.to_path_buf());
        }
    }

    found.sort();
    tracing::debug!(root = %root.display(), files = found.len(), "discovered source files");
    Ok(found)
}

/// Identifier used for a root-relative path
pub fn unit_id(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// A file that could not be turned into a source unit
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SkippedFile {
    pub unit: String,
    pub reason: String,
}

/// Units loaded from disk plus what was skipped on the way
#[derive(Debug, Default)]
pub struct LoadedProject {
    pub units: Vec<SourceUnit>,
    pub skipped: Vec<SkippedFile>,
}

/// Read and parse every path; failures are logged and skipped
pub fn load_units(root: &Path, paths: &[PathBuf], registry: &ProducerRegistry) -> LoadedProject {
    let mut project = LoadedProject::default();

    for relative in paths {
        let id = unit_id(relative);
        let outcome = std::fs::read_to_string(root.join(relative))
            .map_err(crate::Error::from)
            .and_then(|content| registry.produce(&id, relative, &content));

        match outcome {
            Ok(Some(unit)) => project.units.push(unit),
            Ok(None) => {
                tracing::debug!(unit = %id, "no producer handles this file");
                project.skipped.push(SkippedFile {
                    unit: id,
                    reason: "no AST producer for this file type".to_string(),
                });
            }
            Err(e) => {
                tracing::warn!(unit = %id, "skipping file: {}", e);
                project.skipped.push(SkippedFile {
                    unit: id,
                    reason: e.to_string(),
                });
            }
        }
    }

    project
}

/// Discover and load the project at `root`
pub fn load_project(root: &Path, config: &BuildorderConfig, registry: &ProducerRegistry) -> Result<LoadedProject> {
    let paths = discover(root, config)?;
    Ok(load_units(root, &paths, registry))
}
