//! Controller directory walker.
//!
//! # Responsibilities
//! - Create the controller root when it is missing
//! - Recurse into subdirectories, accumulating base URI segments
//! - Elide directories named `index` from the base URI
//!
//! # Design Decisions
//! - Blocking I/O; it only runs while the route table is built
//! - Entries are sorted by file name so an unchanged tree always yields the
//!   same table; no other ordering is promised
//! - Dot-files and dot-directories are ignored

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::routing::loader::ControllerLoadError;

/// Directory name that contributes nothing to the base URI.
pub const HOME_ROUTES_FOLDER: &str = "index";

/// A controller file found under the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredController {
    pub path: PathBuf,
    /// File name without extension.
    pub name: String,
    /// Registry key: the path relative to the root, without extension,
    /// joined with `/` (`index/foo`, `api/projects`).
    pub key: String,
    /// Base URI segments, always starting with `/`.
    pub base_uri: Vec<String>,
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

/// Walk `root` and list every controller file beneath it.
pub fn walk(root: &Path) -> Result<Vec<DiscoveredController>, ControllerLoadError> {
    if !root.is_dir() {
        tracing::info!(path = %root.display(), "Creating missing controller directory");
        fs::create_dir_all(root).map_err(|source| ControllerLoadError::Io {
            path: root.to_path_buf(),
            source,
        })?;
    }

    let mut found = Vec::new();
    let walker = WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_hidden(entry));

    for entry in walker {
        let entry = entry.map_err(|err| ControllerLoadError::Io {
            path: err.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf()),
            source: err.into(),
        })?;
        if entry.file_type().is_dir() {
            continue;
        }

        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        let name = match relative.file_stem().and_then(|s| s.to_str()) {
            Some(name) => name.to_string(),
            None => {
                tracing::warn!(path = %entry.path().display(), "Skipping file with a non UTF-8 name");
                continue;
            }
        };

        let dirs: Vec<String> = relative
            .parent()
            .map(|parent| {
                parent
                    .components()
                    .filter_map(|c| c.as_os_str().to_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();

        let mut base_uri = vec!["/".to_string()];
        base_uri.extend(
            dirs.iter()
                .filter(|dir| dir.as_str() != HOME_ROUTES_FOLDER)
                .cloned(),
        );

        let mut key_parts = dirs;
        key_parts.push(name.clone());

        found.push(DiscoveredController {
            path: entry.path().to_path_buf(),
            name,
            key: key_parts.join("/"),
            base_uri,
        });
    }

    tracing::debug!(root = %root.display(), count = found.len(), "Controller directory walked");
    Ok(found)
}
