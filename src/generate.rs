//! The generation pipeline: scan → build map → write.
//!
//! [`generate_once`] is one pass. [`run_generator`] is what a build start
//! does: one synchronous pass, then a watch session if the options ask for it.

use crate::config::ResolvedOptions;
use crate::render::{WriteError, WriteOutcome, write_constants};
use crate::scan::{ConstantsMap, build_constants_map};
use crate::watch::{WatchError, WatchHandle};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error(transparent)]
    Write(#[from] WriteError),
    #[error(transparent)]
    Watch(#[from] WatchError),
}

/// What a single pass produced.
#[derive(Debug)]
pub struct Generation {
    pub constants: ConstantsMap,
    pub outcome: WriteOutcome,
}

/// Scan the asset directory and write the module if it changed.
pub fn generate_once(options: &ResolvedOptions) -> Result<Generation, GenerateError> {
    let constants = build_constants_map(&options.dir);
    let outcome = write_constants(&constants, &options.dts, options.import_style)?;
    Ok(Generation { constants, outcome })
}

/// Start a watch session that reruns [`generate_once`] after each debounced
/// burst of changes. Regeneration failures are logged by the session.
pub fn watch_images(options: &ResolvedOptions) -> Result<WatchHandle, GenerateError> {
    let session_options = options.clone();
    let handle = WatchHandle::start(&options.dir, &options.dts, options.debounce, move || {
        generate_once(&session_options).map(|_| ())
    })?;
    Ok(handle)
}

/// Generate once, then watch when `options.watch` is set.
///
/// A missing asset directory cannot be watched; that is logged and the pass
/// still counts as successful, returning no handle.
pub fn run_generator(options: &ResolvedOptions) -> Result<Option<WatchHandle>, GenerateError> {
    tracing::info!(dir = %options.dir.display(), "generating image constants");
    generate_once(options)?;

    if !options.watch {
        return Ok(None);
    }
    match watch_images(options) {
        Ok(handle) => Ok(Some(handle)),
        Err(GenerateError::Watch(WatchError::MissingDir(dir))) => {
            tracing::warn!(dir = %dir.display(), "asset directory missing, not watching");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ImportStyle;
    use crate::test_helpers::image_tree;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    fn options(root: &std::path::Path, dir: &str, watch: bool) -> ResolvedOptions {
        ResolvedOptions {
            root: root.to_path_buf(),
            dir: root.join(dir),
            dts: root.join("src/r.ts"),
            watch,
            import_style: ImportStyle::Import,
            debounce: Duration::from_millis(50),
        }
    }

    #[test]
    fn generate_once_writes_module() {
        let tree = image_tree();
        let out = TempDir::new().unwrap();
        let opts = ResolvedOptions {
            dir: tree.path().to_path_buf(),
            ..options(out.path(), "unused", false)
        };

        let generation = generate_once(&opts).unwrap();
        assert_eq!(generation.outcome, WriteOutcome::Written);
        assert_eq!(generation.constants.len(), 6);

        let content = fs::read_to_string(&opts.dts).unwrap();
        assert!(content.contains("import LOGO_PNG from '"));
        assert!(content.contains("  ICONS_SUB_FOLDER_MY_AT_ICON_SVG,"));
    }

    #[test]
    fn second_pass_is_unchanged() {
        let tmp = TempDir::new().unwrap();
        let opts = options(tmp.path(), "images", false);
        crate::test_helpers::write_files(&opts.dir, &["a.png"]);

        generate_once(&opts).unwrap();
        let second = generate_once(&opts).unwrap();
        assert_eq!(second.outcome, WriteOutcome::Unchanged);
    }

    #[test]
    fn missing_dir_generates_empty_module() {
        let tmp = TempDir::new().unwrap();
        let opts = options(tmp.path(), "missing", false);

        let generation = generate_once(&opts).unwrap();
        assert!(generation.constants.is_empty());
        assert!(fs::read_to_string(&opts.dts).unwrap().contains("const R = {\n\n}"));
    }

    #[test]
    fn run_without_watch_returns_no_handle() {
        let tmp = TempDir::new().unwrap();
        let opts = options(tmp.path(), "images", false);
        assert!(run_generator(&opts).unwrap().is_none());
        assert!(opts.dts.exists());
    }

    #[test]
    fn run_with_missing_dir_skips_watch() {
        let tmp = TempDir::new().unwrap();
        let opts = options(tmp.path(), "missing", true);
        assert!(run_generator(&opts).unwrap().is_none());
    }
}
