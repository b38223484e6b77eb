//! Shared test utilities: throwaway asset trees in temp directories.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = image_tree();
//! let map = build_constants_map(tmp.path());
//! assert!(map.contains_key("LOGO_PNG"));
//! ```

use std::path::Path;
use tempfile::TempDir;

/// Files created by [`image_tree`]. Images and non-images mixed.
pub const IMAGE_TREE: &[&str] = &[
    "logo.png",
    "logo@2x.png",
    "icons/arrow-left.svg",
    "icons/sub-folder/my@icon.svg",
    "icons/README.txt",
    "photos/Beach.JPG",
    "photos/hero.webp",
    "photos/.DS_Store",
];

/// A temp directory populated with [`IMAGE_TREE`].
pub fn image_tree() -> TempDir {
    let tmp = TempDir::new().unwrap();
    write_files(tmp.path(), IMAGE_TREE);
    tmp
}

/// Create each relative path under `root` with placeholder content,
/// making parent directories as needed.
pub fn write_files(root: &Path, files: &[&str]) {
    for rel in files {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, "fake image").unwrap();
    }
}
