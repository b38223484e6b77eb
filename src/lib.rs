//! # image-consts
//!
//! Generates a constants module for the images in a frontend asset directory,
//! so application code writes `R.ICONS_ARROW_LEFT_SVG` instead of a string
//! path that silently breaks when a file moves.
//!
//! # Architecture: One-Way Pipeline
//!
//! ```text
//! 1. Scan     src/assets/images/  →  file list        (walkdir, sorted)
//! 2. Name     file list           →  ConstantsMap     (path → IDENTIFIER)
//! 3. Write    ConstantsMap        →  src/assets/r.ts  (only if changed)
//! ```
//!
//! The pipeline reruns from scratch on every trigger: once at build start,
//! and after each debounced burst of file changes while watching. Nothing is
//! cached between runs except the generated file itself.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`naming`] | Path → constant name derivation |
//! | [`scan`] | Image discovery and constants-map construction |
//! | [`render`] | Module rendering and change-only writes |
//! | [`watch`] | Debounced watching of the asset directory |
//! | [`generate`] | The scan → name → write pass, plus generate-then-watch |
//! | [`plugin`] | Build-start / build-end lifecycle adapter |
//! | [`config`] | Options, `image-consts.toml`, layering and resolution |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Write Only on Change
//!
//! The generated file is compared byte for byte with the fresh rendering and
//! left untouched when equal. Bundlers rebuild on mtime changes, and a watcher
//! that can see the output would otherwise feed itself forever.
//!
//! ## Names Are Lossy, On Purpose
//!
//! `a-b.png` and `a_b.png` map to the same constant. Existing projects import
//! these names, so the scheme is kept and collisions resolve to the file
//! scanned last.
//!
//! ## Deterministic Order
//!
//! Directories are walked in file-name order. Two machines with the same
//! images produce the same module, which keeps diffs of the generated file
//! meaningful.
//!
//! ## Environment Read Once
//!
//! The working directory and `NODE_ENV` are captured into
//! [`config::Environment`] at startup and passed down as data. The core never
//! reads process-global state.

pub mod config;
pub mod generate;
pub mod naming;
pub mod output;
pub mod plugin;
pub mod render;
pub mod scan;
pub mod watch;

#[cfg(test)]
pub(crate) mod test_helpers;
