//! CLI output formatting.
//!
//! Each command has a `format_*` function returning lines (pure, testable)
//! and a `print_*` wrapper that writes them to stdout. Diagnostics go through
//! `tracing`; this module is only for the command's own report.
//!
//! ```text
//! Constants
//! 001 ICONS_ARROW_LEFT_SVG
//!     Source: icons/arrow-left.svg
//! 002 LOGO_PNG
//!     Source: logo.png
//!
//! Generated 2 constants → src/assets/r.ts
//! ```

use crate::render::WriteOutcome;
use crate::scan::ConstantsMap;
use std::path::Path;

fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Show `path` relative to `base` with `/` separators when possible.
fn display_path(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

/// One entry per constant: index + name, then the source file below it.
pub fn format_constants(constants: &ConstantsMap, dir: &Path) -> Vec<String> {
    if constants.is_empty() {
        return vec![format!("No images found in {}", dir.display())];
    }

    let mut lines = vec!["Constants".to_string()];
    for (i, (name, path)) in constants.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), name));
        lines.push(format!("{}Source: {}", indent(1), display_path(path, dir)));
    }
    lines
}

/// Summary line for a finished generation pass.
pub fn format_outcome(outcome: WriteOutcome, count: usize, dts: &Path, root: &Path) -> String {
    let noun = if count == 1 { "constant" } else { "constants" };
    let target = display_path(dts, root);
    match outcome {
        WriteOutcome::Written => format!("Generated {count} {noun} → {target}"),
        WriteOutcome::Unchanged => format!("Unchanged {count} {noun} → {target}"),
    }
}

pub fn print_constants(constants: &ConstantsMap, dir: &Path) {
    for line in format_constants(constants, dir) {
        println!("{}", line);
    }
}

pub fn print_outcome(outcome: WriteOutcome, count: usize, dts: &Path, root: &Path) {
    println!("{}", format_outcome(outcome, count, dts, root));
}
