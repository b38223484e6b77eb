//! Image discovery and constants-map construction.
//!
//! ## Directory Structure
//!
//! Any tree of images works; nesting only affects the generated names:
//!
//! ```text
//! src/assets/images/             # Asset directory
//! ├── logo.png                   # LOGO_PNG
//! ├── logo@2x.png                # LOGO_AT_2X_PNG
//! ├── icons/
//! │   ├── arrow-left.svg         # ICONS_ARROW_LEFT_SVG
//! │   └── sub-folder/
//! │       └── my@icon.svg        # ICONS_SUB_FOLDER_MY_AT_ICON_SVG
//! ├── notes.txt                  # ignored (not an image)
//! └── .DS_Store                  # ignored (system metadata)
//! ```
//!
//! ## Ordering
//!
//! Entries are visited in file-name order within each directory, so the
//! generated module is the same on every file system and diffs stay small.
//!
//! ## Best effort
//!
//! A missing asset directory is an empty project, not an error. Entries that
//! cannot be read are skipped with a warning.

use crate::naming::to_constant_name;
use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Identifier → absolute image path, in scan order.
pub type ConstantsMap = IndexMap<String, PathBuf>;

/// Recognized image extensions, lowercase and without the dot.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "svg", "webp"];

/// System metadata files that are never treated as content.
const IGNORED_NAMES: &[&str] = &[".DS_Store", "Thumbs.db", "desktop.ini"];

/// Whether `path` has one of the [`IMAGE_EXTENSIONS`] (case-insensitive).
pub fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

fn is_ignored(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| IGNORED_NAMES.contains(&name))
}

/// Recursively collect image files under `dir`.
///
/// Returned paths are `dir` joined with each file's relative path, so an
/// absolute `dir` yields absolute paths.
pub fn collect_image_files(dir: &Path) -> Vec<PathBuf> {
    if !dir.is_dir() {
        tracing::debug!(dir = %dir.display(), "asset directory missing, nothing to scan");
        return Vec::new();
    }

    let mut collected = Vec::new();
    let walker = WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_ignored(e));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(error = %err, "skipping unreadable entry");
                continue;
            }
        };
        if entry.file_type().is_dir() {
            continue;
        }
        if has_image_extension(entry.path()) {
            collected.push(entry.into_path());
        }
    }
    collected
}

/// Scan `dir` and name every image found.
///
/// A later file whose name collides with an earlier one replaces its path;
/// the key keeps its original position.
pub fn build_constants_map(dir: &Path) -> ConstantsMap {
    let mut constants = ConstantsMap::new();
    for file in collect_image_files(dir) {
        let name = to_constant_name(&file, dir);
        if let Some(previous) = constants.insert(name, file) {
            tracing::debug!(
                replaced = %previous.display(),
                "constant name collision, keeping the later file"
            );
        }
    }
    constants
}
