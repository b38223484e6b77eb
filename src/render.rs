//! Generated module rendering and change-only writes.
//!
//! # Output Format
//!
//! With [`ImportStyle::Import`]:
//!
//! ```text
//! /**
//!  * Image asset constants
//!  * Generated by image-consts, do not edit by hand
//!  */
//! import LOGO_PNG from './images/logo.png'
//! import PRICE$TAG_SVG from './images/price$tag.svg'
//!
//! const R = {
//!   LOGO_PNG,
//!   'PRICE$TAG_SVG': PRICE$TAG_SVG,
//! }
//!
//! export default R
//! ```
//!
//! With [`ImportStyle::Url`] each import becomes
//! `const LOGO_PNG = new URL('./images/logo.png', import.meta.url).href` and
//! the object is exported as `export const R = { ... }` with no default export.
//!
//! Reference paths are relative to the generated file's directory, always use
//! `/`, and always start with `./` or `../` so bundlers resolve them as files
//! rather than packages.
//!
//! # Write Skipping
//!
//! [`write_constants`] compares the rendered text with what is already on
//! disk and does nothing when they match. A watcher that sees the generated
//! file would otherwise regenerate forever, each write triggering the next.

use crate::config::{ImportStyle, normalize_path};
use crate::naming::needs_quotes;
use crate::scan::ConstantsMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

const HEADER: &str = "/**
 * Image asset constants
 * Generated by image-consts, do not edit by hand
 */
";

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("failed to create {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Result of a [`write_constants`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The file was created or its content replaced.
    Written,
    /// The file already held exactly this content; nothing was touched.
    Unchanged,
}

/// Render the full module text for `constants` as it would be written to `dts`.
pub fn render_module(constants: &ConstantsMap, dts: &Path, style: ImportStyle) -> String {
    let from_dir = dts.parent().unwrap_or(Path::new(""));

    let references = constants
        .iter()
        .map(|(name, path)| {
            let specifier = quote_path(&relative_import_path(from_dir, path));
            match style {
                ImportStyle::Import => format!("import {name} from {specifier}"),
                ImportStyle::Url => {
                    format!("const {name} = new URL({specifier}, import.meta.url).href")
                }
            }
        })
        .collect::<Vec<_>>()
        .join("\n");

    let fields = constants
        .keys()
        .map(|name| object_field(name))
        .collect::<Vec<_>>()
        .join("\n");

    match style {
        ImportStyle::Import => format!(
            "{HEADER}{references}\n\nconst R = {{\n{fields}\n}}\n\nexport default R\n"
        ),
        ImportStyle::Url => format!("{HEADER}{references}\n\nexport const R = {{\n{fields}\n}}\n"),
    }
}

/// One line of the exported object.
fn object_field(name: &str) -> String {
    if needs_quotes(name) {
        format!("  '{name}': {name},")
    } else {
        format!("  {name},")
    }
}

/// Single-quoted string literal for an import specifier.
fn quote_path(path: &str) -> String {
    format!("'{}'", path.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// Path from `from_dir` to `target` as a `/`-separated module specifier.
///
/// Both paths are expected to be absolute; `.` and `..` in either are folded
/// first. When they share no root (different Windows drives) the target path
/// is returned as-is.
pub fn relative_import_path(from_dir: &Path, target: &Path) -> String {
    let from_dir = normalize_path(from_dir);
    let target = normalize_path(target);
    let from: Vec<Component> = from_dir.components().collect();
    let to: Vec<Component> = target.components().collect();

    let common = from
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();

    if common == 0 && from_dir.has_root() {
        return target.to_string_lossy().replace('\\', "/");
    }

    let mut parts: Vec<String> = Vec::new();
    for _ in common..from.len() {
        parts.push("..".to_string());
    }
    for component in &to[common..] {
        parts.push(component.as_os_str().to_string_lossy().into_owned());
    }

    let joined = parts.join("/");
    if joined.starts_with("../") || joined == ".." {
        joined
    } else {
        format!("./{joined}")
    }
}

/// Write the rendered module to `dts` unless it already has that content.
///
/// A failed read of the existing file counts as "no previous content". Missing
/// parent directories are created.
pub fn write_constants(
    constants: &ConstantsMap,
    dts: &Path,
    style: ImportStyle,
) -> Result<WriteOutcome, WriteError> {
    let content = render_module(constants, dts, style);

    if dts.exists() {
        match fs::read_to_string(dts) {
            Ok(previous) if previous == content => {
                tracing::info!(path = %dts.display(), "no changes in assets, skipped writing");
                return Ok(WriteOutcome::Unchanged);
            }
            Ok(_) => {}
            Err(err) => {
                tracing::debug!(path = %dts.display(), error = %err, "could not read previous output");
            }
        }
    }

    if let Some(parent) = dts.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| WriteError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(dts, content).map_err(|source| WriteError::Write {
        path: dts.to_path_buf(),
        source,
    })?;

    tracing::info!(path = %dts.display(), entries = constants.len(), "asset constants generated");
    Ok(WriteOutcome::Written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn map(entries: &[(&str, &str)]) -> ConstantsMap {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), PathBuf::from(v)))
            .collect()
    }

    fn sample() -> ConstantsMap {
        map(&[
            ("LOGO_PNG", "/app/src/assets/images/logo.png"),
            ("ICONS_ARROW_SVG", "/app/src/assets/images/icons/arrow.svg"),
        ])
    }

    #[test]
    fn import_style_module() {
        let out = render_module(&sample(), Path::new("/app/src/assets/r.ts"), ImportStyle::Import);
        assert_eq!(
            out,
            "/**
 * Image asset constants
 * Generated by image-consts, do not edit by hand
 */
import LOGO_PNG from './images/logo.png'
import ICONS_ARROW_SVG from './images/icons/arrow.svg'

const R = {
  LOGO_PNG,
  ICONS_ARROW_SVG,
}

export default R
"
        );
    }

    #[test]
    fn url_style_module() {
        let out = render_module(&sample(), Path::new("/app/src/assets/r.ts"), ImportStyle::Url);
        assert!(out.contains(
            "const LOGO_PNG = new URL('./images/logo.png', import.meta.url).href\n"
        ));
        assert!(out.contains("export const R = {\n  LOGO_PNG,\n  ICONS_ARROW_SVG,\n}\n"));
        assert!(!out.contains("export default"));
        assert!(!out.contains("import LOGO_PNG"));
    }

    #[test]
    fn dollar_identifier_is_quoted() {
        let constants = map(&[("PRICE$TAG_SVG", "/app/img/price$tag.svg")]);
        let out = render_module(&constants, Path::new("/app/r.ts"), ImportStyle::Import);
        assert!(out.contains("  'PRICE$TAG_SVG': PRICE$TAG_SVG,\n"));
        assert!(out.contains("import PRICE$TAG_SVG from './img/price$tag.svg'"));
    }

    #[test]
    fn empty_map_renders_empty_object() {
        let out = render_module(&ConstantsMap::new(), Path::new("/app/r.ts"), ImportStyle::Import);
        assert!(out.contains("const R = {\n\n}\n"));
        assert!(out.ends_with("export default R\n"));
    }

    #[test]
    fn relative_path_into_subdirectory() {
        assert_eq!(
            relative_import_path(Path::new("/app/src"), Path::new("/app/src/assets/a.png")),
            "./assets/a.png"
        );
    }

    #[test]
    fn relative_path_to_sibling_tree() {
        assert_eq!(
            relative_import_path(Path::new("/app/src/gen"), Path::new("/app/assets/a.png")),
            "../../assets/a.png"
        );
    }

    #[test]
    fn parent_dir_in_output_path() {
        let constants = map(&[("A_PNG", "/repo/web/src/assets/images/a.png")]);
        let out = render_module(
            &constants,
            Path::new("/repo/web/../shared/r.ts"),
            ImportStyle::Import,
        );
        assert!(out.contains("import A_PNG from '../web/src/assets/images/a.png'\n"));
    }

    #[test]
    fn parent_dir_in_target_path() {
        assert_eq!(
            relative_import_path(Path::new("/repo/shared"), Path::new("/repo/web/./img/../a.png")),
            "../web/a.png"
        );
    }

    #[test]
    fn quote_in_filename_is_escaped() {
        let constants = map(&[("IT'S_PNG", "/app/it's.png")]);
        let out = render_module(&constants, Path::new("/app/r.ts"), ImportStyle::Import);
        assert!(out.contains(r"from './it\'s.png'"));
    }

    // =========================================================================
    // write_constants
    // =========================================================================

    #[test]
    fn writes_new_file_and_parent_dirs() {
        let tmp = TempDir::new().unwrap();
        let dts = tmp.path().join("gen/deep/r.ts");

        let outcome = write_constants(&sample(), &dts, ImportStyle::Import).unwrap();
        assert_eq!(outcome, WriteOutcome::Written);
        assert!(fs::read_to_string(&dts).unwrap().contains("LOGO_PNG"));
    }

    #[test]
    fn second_write_is_skipped() {
        let tmp = TempDir::new().unwrap();
        let dts = tmp.path().join("r.ts");

        write_constants(&sample(), &dts, ImportStyle::Import).unwrap();
        let before = fs::metadata(&dts).unwrap().modified().unwrap();

        std::thread::sleep(std::time::Duration::from_millis(20));
        let outcome = write_constants(&sample(), &dts, ImportStyle::Import).unwrap();

        assert_eq!(outcome, WriteOutcome::Unchanged);
        assert_eq!(fs::metadata(&dts).unwrap().modified().unwrap(), before);
    }

    #[test]
    fn changed_content_is_rewritten() {
        let tmp = TempDir::new().unwrap();
        let dts = tmp.path().join("r.ts");
        fs::write(&dts, "stale").unwrap();

        let outcome = write_constants(&sample(), &dts, ImportStyle::Import).unwrap();
        assert_eq!(outcome, WriteOutcome::Written);
        assert_ne!(fs::read_to_string(&dts).unwrap(), "stale");
    }

    #[test]
    fn style_change_forces_write() {
        let tmp = TempDir::new().unwrap();
        let dts = tmp.path().join("r.ts");

        write_constants(&sample(), &dts, ImportStyle::Import).unwrap();
        let outcome = write_constants(&sample(), &dts, ImportStyle::Url).unwrap();
        assert_eq!(outcome, WriteOutcome::Written);
    }

    #[test]
    fn non_utf8_previous_content_is_overwritten() {
        let tmp = TempDir::new().unwrap();
        let dts = tmp.path().join("r.ts");
        fs::write(&dts, [0xff, 0xfe, 0x00]).unwrap();

        let outcome = write_constants(&sample(), &dts, ImportStyle::Import).unwrap();
        assert_eq!(outcome, WriteOutcome::Written);
    }

    #[test]
    fn write_into_file_path_fails() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("blocker");
        fs::write(&blocker, "not a dir").unwrap();

        let result = write_constants(&sample(), &blocker.join("r.ts"), ImportStyle::Import);
        assert!(matches!(result, Err(WriteError::CreateDir { .. })));
    }
}
