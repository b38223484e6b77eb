//! Identifier derivation for image files.
//!
//! Every image under the asset directory gets a constant name built from its
//! relative path: directory components, file stem and extension, joined with
//! underscores and uppercased.
//!
//! ## Examples
//!
//! - `logo.png` → `LOGO_PNG`
//! - `icons/sub-folder/my@icon.svg` → `ICONS_SUB_FOLDER_MY_AT_ICON_SVG`
//! - `bg/hero-2x.webp` → `BG_HERO_2X_WEBP`
//!
//! ## Lossy by nature
//!
//! The mapping is not injective. `a-b.png` and `a_b.png` both become
//! `A_B_PNG`, and `Logo.png` collides with `logo.png`. Generated modules in the
//! wild already depend on these names, so the scheme stays as it is; the map
//! builder only reports collisions at debug level.
//!
//! Only the file stem gets the `@` → `_AT_` rewrite. Directory names keep a
//! literal `@`.

use std::path::{Component, Path};

/// Derive the constant name for `file` relative to `base_dir`.
///
/// Never fails. A path that does not live under `base_dir` is named from its
/// full path instead of a relative one.
pub fn to_constant_name(file: &Path, base_dir: &Path) -> String {
    let relative = file.strip_prefix(base_dir).unwrap_or(file);

    let stem = relative
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    let ext = relative
        .extension()
        .map(|e| e.to_string_lossy().to_uppercase())
        .unwrap_or_default();

    let folder = relative
        .parent()
        .map(normalize_dir)
        .unwrap_or_default();

    if folder.is_empty() {
        format!("{}_{}", normalize_stem(&stem), ext)
    } else {
        format!("{}_{}_{}", folder, normalize_stem(&stem), ext)
    }
}

/// Uppercase a file stem, turning `-` into `_` and `@` into `_AT_`.
pub fn normalize_stem(stem: &str) -> String {
    stem.to_uppercase().replace('-', "_").replace('@', "_AT_")
}

/// Join directory components with `_`, uppercase, and turn `-` into `_`.
fn normalize_dir(dir: &Path) -> String {
    dir.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("_")
        .to_uppercase()
        .replace('-', "_")
}

/// Whether an identifier has to be quoted as an object key.
///
/// `$` is the one character the generator lets through that breaks shorthand
/// property syntax in the emitted object.
pub fn needs_quotes(ident: &str) -> bool {
    ident.contains('$')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn name(rel: &str) -> String {
        let base = PathBuf::from("/project/src/assets/images");
        to_constant_name(&base.join(rel), &base)
    }

    #[test]
    fn root_level_file() {
        assert_eq!(name("foo.png"), "FOO_PNG");
    }

    #[test]
    fn nested_file_with_hyphen_and_at() {
        assert_eq!(
            name("icons/sub-folder/my@icon.svg"),
            "ICONS_SUB_FOLDER_MY_AT_ICON_SVG"
        );
    }

    #[test]
    fn hyphens_become_underscores_in_stem() {
        assert_eq!(name("hero-banner-2x.webp"), "HERO_BANNER_2X_WEBP");
    }

    #[test]
    fn extension_is_uppercased_without_dot() {
        assert_eq!(name("photo.jpeg"), "PHOTO_JPEG");
        assert_eq!(name("Photo.JpG"), "PHOTO_JPG");
    }

    #[test]
    fn retina_suffix() {
        assert_eq!(name("logo@2x.png"), "LOGO_AT_2X_PNG");
    }

    #[test]
    fn at_sign_in_directory_is_kept() {
        assert_eq!(name("brand@v2/logo.png"), "BRAND@V2_LOGO_PNG");
    }

    #[test]
    fn deeply_nested() {
        assert_eq!(name("a/b/c/d.gif"), "A_B_C_D_GIF");
    }

    #[test]
    fn case_variants_collide() {
        assert_eq!(name("Logo.png"), name("logo.png"));
    }

    #[test]
    fn hyphen_and_underscore_collide() {
        assert_eq!(name("a-b.png"), name("a_b.png"));
    }

    #[test]
    fn dollar_is_passed_through() {
        assert_eq!(name("price$tag.svg"), "PRICE$TAG_SVG");
    }

    #[test]
    fn file_outside_base_is_still_named() {
        let base = PathBuf::from("/project/src/assets/images");
        let outside = PathBuf::from("/other/pic.png");
        assert_eq!(to_constant_name(&outside, &base), "OTHER_PIC_PNG");
    }

    #[test]
    fn quoting_only_for_dollar() {
        assert!(needs_quotes("A$B_PNG"));
        assert!(!needs_quotes("A_B_PNG"));
    }

    #[test]
    fn normalize_stem_rules() {
        assert_eq!(normalize_stem("my-icon@2x"), "MY_ICON_AT_2X");
    }
}
