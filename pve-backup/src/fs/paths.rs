//! Catalog path resolution.
//!
//! Turns a catalog path into the set of existing filesystem paths it stands
//! for, and computes the root-relative name each one gets inside the archive.

use std::io;
use std::path::{Component, Path, PathBuf};

/// Expand a catalog path into existing filesystem paths.
///
/// A path ending in `*` is matched with glob semantics and yields every
/// existing match in sorted order. Any other path yields itself when it
/// exists. Missing paths and patterns without matches yield nothing.
pub fn expand(path: &str) -> Vec<PathBuf> {
    if path.ends_with('*') {
        return expand_pattern(path);
    }

    let candidate = PathBuf::from(path);
    if candidate.exists() {
        vec![candidate]
    } else {
        Vec::new()
    }
}

fn expand_pattern(pattern: &str) -> Vec<PathBuf> {
    let matches = match glob::glob(pattern) {
        Ok(paths) => paths,
        Err(e) => {
            tracing::debug!("Ignoring invalid pattern {}: {}", pattern, e);
            return Vec::new();
        }
    };

    matches
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::debug!("Skipping unreadable match for {}: {}", pattern, e);
                None
            }
        })
        .filter(|path| path.exists())
        .collect()
}

/// Name of `path` inside the archive: the absolute, normalized path with the
/// filesystem root stripped (`/etc/network/interfaces` → `etc/network/interfaces`).
///
/// Relative paths are resolved against the current working directory. The
/// root itself maps to `.`.
pub fn archive_name(path: &Path) -> io::Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    let mut name = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::Normal(part) => name.push(part),
            Component::ParentDir => {
                name.pop();
            }
            Component::RootDir | Component::Prefix(_) | Component::CurDir => {}
        }
    }

    if name.as_os_str().is_empty() {
        name.push(".");
    }
    Ok(name)
}
