//! Generator configuration.
//!
//! Options come from three layers, later layers winning:
//!
//! ```text
//! stock defaults  →  <root>/image-consts.toml  →  Options (CLI flags / plugin caller)
//! ```
//!
//! The merged result is deserialized into [`Config`], validated, and then
//! resolved against the project root and the process environment into an
//! immutable [`ResolvedOptions`]. Everything downstream takes
//! `ResolvedOptions` by reference; nothing below this module reads the working
//! directory or environment variables.
//!
//! ## Config File
//!
//! ```toml
//! # All keys are optional - defaults shown below
//!
//! dir = "src/assets/images"   # Image directory (relative to root, or absolute)
//! dts = "src/assets/r.ts"     # Generated module (relative to root, or absolute)
//! import_style = "import"     # "import" or "url"
//! debounce_ms = 200           # Watch debounce window
//! # watch = true              # Default: on unless NODE_ENV=production
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Name of the optional config file looked up in the project root.
pub const CONFIG_FILENAME: &str = "image-consts.toml";

const MAX_DEBOUNCE_MS: u64 = 10_000;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// How each image is referenced from the generated module.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ImportStyle {
    /// `import FOO_PNG from './foo.png'`, module exported as default.
    #[default]
    Import,
    /// `const FOO_PNG = new URL('./foo.png', import.meta.url).href`,
    /// module exported as the named export `R`.
    Url,
}

/// Fully-merged configuration before path resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Image directory, absolute or relative to the project root.
    pub dir: String,
    /// Generated module path, absolute or relative to the project root.
    pub dts: String,
    /// Watch for changes after the first generation. `None` means "decide
    /// from the environment".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watch: Option<bool>,
    pub import_style: ImportStyle,
    /// Quiet period before a burst of file events triggers regeneration.
    pub debounce_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dir: "src/assets/images".to_string(),
            dts: "src/assets/r.ts".to_string(),
            watch: None,
            import_style: ImportStyle::Import,
            debounce_ms: 200,
        }
    }
}

impl Config {
    /// Validate values that deserialization alone cannot check.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dir.trim().is_empty() {
            return Err(ConfigError::Validation("dir must not be empty".into()));
        }
        if self.dts.trim().is_empty() {
            return Err(ConfigError::Validation("dts must not be empty".into()));
        }
        if self.dts.ends_with('/') || self.dts.ends_with('\\') {
            return Err(ConfigError::Validation(format!(
                "dts must name a file, got directory '{}'",
                self.dts
            )));
        }
        if self.debounce_ms == 0 || self.debounce_ms > MAX_DEBOUNCE_MS {
            return Err(ConfigError::Validation(format!(
                "debounce_ms must be 1-{MAX_DEBOUNCE_MS}"
            )));
        }
        Ok(())
    }
}

/// Sparse caller-supplied options, the top configuration layer.
///
/// Every field is optional; unset fields fall through to the config file and
/// then to the stock defaults.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Options {
    /// Project root. Not a config-file key: it decides where the config file
    /// is looked up.
    #[serde(skip)]
    pub root: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dts: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watch: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub import_style: Option<ImportStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debounce_ms: Option<u64>,
}

impl Options {
    /// Merge all layers and resolve paths against the captured environment.
    pub fn resolve(&self, env: &Environment) -> Result<ResolvedOptions, ConfigError> {
        let root = resolve_root(self.root.as_deref(), &env.cwd);
        let file_layer = load_raw_config(&root)?;
        let caller_layer = toml::Value::try_from(self)?;

        let mut merged = stock_defaults_value();
        if let Some(file_layer) = file_layer {
            merged = merge_toml(merged, file_layer);
        }
        let config = resolve_config(merged, Some(caller_layer))?;

        ResolvedOptions::from_config(&config, root, env)
    }
}

/// Process-wide inputs, read once and then passed around as data.
#[derive(Debug, Clone)]
pub struct Environment {
    pub cwd: PathBuf,
    pub node_env: Option<String>,
}

impl Environment {
    /// Snapshot the working directory and `NODE_ENV`.
    pub fn capture() -> std::io::Result<Self> {
        Ok(Self {
            cwd: std::env::current_dir()?,
            node_env: std::env::var("NODE_ENV").ok(),
        })
    }

    pub fn is_production(&self) -> bool {
        self.node_env.as_deref() == Some("production")
    }
}

/// Configuration with every path absolute and every default decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOptions {
    pub root: PathBuf,
    pub dir: PathBuf,
    pub dts: PathBuf,
    pub watch: bool,
    pub import_style: ImportStyle,
    pub debounce: Duration,
}

impl ResolvedOptions {
    /// Resolve a [`Config`] that already passed [`Config::validate`] against
    /// `root`.
    pub fn from_config(
        config: &Config,
        root: PathBuf,
        env: &Environment,
    ) -> Result<Self, ConfigError> {
        let dir = resolve_against(&root, &config.dir);
        let dts = resolve_against(&root, &config.dts);
        if dir == dts {
            return Err(ConfigError::Validation(format!(
                "dir and dts both resolve to {}",
                dir.display()
            )));
        }

        Ok(Self {
            root,
            dir,
            dts,
            watch: config.watch.unwrap_or(!env.is_production()),
            import_style: config.import_style,
            debounce: Duration::from_millis(config.debounce_ms),
        })
    }
}

fn resolve_root(root: Option<&Path>, cwd: &Path) -> PathBuf {
    match root {
        Some(r) => normalize_path(&cwd.join(r)),
        None => normalize_path(cwd),
    }
}

fn resolve_against(root: &Path, value: &str) -> PathBuf {
    normalize_path(&root.join(value))
}

/// Fold `.` and `..` components without touching the file system.
///
/// `..` directly below the root is dropped; leading `..` in a relative path
/// are kept. Symlinks are not resolved, so the result may name a file that
/// does not exist yet.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                Some(Component::ParentDir | Component::CurDir) | None => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

// =============================================================================
// Config loading and merging
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(Config::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `image-consts.toml` from `root` as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = root.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<Config, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: Config = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `root`, merged over stock defaults and validated.
pub fn load_config(root: &Path) -> Result<Config, ConfigError> {
    resolve_config(stock_defaults_value(), load_raw_config(root)?)
}

/// A fully-commented stock `image-consts.toml`, printed by `gen-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# image-consts configuration
# ==========================
# Place this file in the project root. All settings are optional; the values
# below are the defaults. Command-line flags override anything set here.
# Unknown keys cause an error.

# Directory scanned for images, relative to the project root or absolute.
# Recognized extensions: png, jpg, jpeg, gif, svg, webp.
dir = "src/assets/images"

# Generated module, relative to the project root or absolute.
# Rewritten only when its content would change.
dts = "src/assets/r.ts"

# How images are referenced from the generated module:
#   "import" -> import FOO_PNG from './images/foo.png'   (export default R)
#   "url"    -> const FOO_PNG = new URL('./images/foo.png', import.meta.url).href
#               (export const R)
import_style = "import"

# Milliseconds of quiet after a file change before the module is regenerated.
debounce_ms = 200

# Regenerate whenever the image directory changes.
# Omit to enable it everywhere except when NODE_ENV=production.
# watch = true
"##
}
