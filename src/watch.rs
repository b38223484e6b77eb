//! Debounced watching of the asset directory.
//!
//! ```text
//! notify callback ──Signal::Fs──▶ mpsc ──▶ worker thread
//!                                          ├─ WatchFilter   (is this event about images?)
//!                                          ├─ Debouncer     (one pending deadline)
//!                                          └─ on_change()   (regenerate, at most one at a time)
//! ```
//!
//! The worker thread is the only place regeneration runs, so two passes never
//! overlap. A burst of events keeps pushing the single deadline forward and
//! ends in exactly one call to `on_change`.
//!
//! Only changes after the watch starts are reported; the files already in the
//! directory produce no events.

use crate::config::normalize_path;
use crate::scan::has_image_extension;
use notify::event::{CreateKind, ModifyKind, RemoveKind};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WatchError {
    #[error("asset directory does not exist: {0}")]
    MissingDir(PathBuf),
    #[error("notify error: {0}")]
    Notify(#[from] notify::Error),
    #[error("failed to spawn watch thread: {0}")]
    Spawn(std::io::Error),
}

/// Messages consumed by the worker thread.
#[derive(Debug)]
pub enum Signal {
    Fs(notify::Result<Event>),
    Stop,
}

/// Single-deadline debouncer.
///
/// Every [`touch`](Self::touch) moves the deadline to `now + window`; the
/// deadline fires once and is then cleared.
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    /// Record a qualifying event at `now`.
    pub fn touch(&mut self, now: Instant) {
        self.deadline = Some(now + self.window);
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Returns `true` exactly once per quiet period, when the deadline has passed.
    pub fn take_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// How long the worker may block before the deadline needs checking.
    /// `None` means nothing is pending.
    pub fn timeout(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_duration_since(now))
    }
}

/// Decides which file-system events can change the generated module.
#[derive(Debug, Clone)]
pub struct WatchFilter {
    roots: Vec<PathBuf>,
    outputs: Vec<PathBuf>,
}

impl WatchFilter {
    /// `root` is the watched directory, `output` the generated module.
    ///
    /// Canonical forms are kept alongside the given paths because some
    /// backends report resolved paths (`/private/var` for `/var` on macOS).
    pub fn new(root: &Path, output: &Path) -> Self {
        Self {
            roots: with_canonical(&normalize_path(root)),
            outputs: with_canonical(&normalize_path(output)),
        }
    }

    pub fn is_relevant(&self, event: &Event) -> bool {
        event
            .paths
            .iter()
            .any(|path| self.is_relevant_path(event.kind, path))
    }

    fn is_relevant_path(&self, kind: EventKind, path: &Path) -> bool {
        if self.is_hidden(path) || self.outputs.iter().any(|o| o == path) {
            return false;
        }
        match kind {
            EventKind::Create(CreateKind::Folder) | EventKind::Remove(RemoveKind::Folder) => true,
            EventKind::Create(CreateKind::File) | EventKind::Remove(RemoveKind::File) => {
                has_image_extension(path)
            }
            EventKind::Create(_) | EventKind::Remove(_) | EventKind::Modify(ModifyKind::Name(_)) => {
                looks_like_dir(path) || has_image_extension(path)
            }
            EventKind::Modify(ModifyKind::Metadata(_)) => false,
            // Content changes: directories report these for their children on
            // some backends, so only files count here.
            EventKind::Modify(_) => !path.is_dir() && has_image_extension(path),
            _ => false,
        }
    }

    /// Any dot-prefixed component below the watched root.
    fn is_hidden(&self, path: &Path) -> bool {
        let relative = self
            .roots
            .iter()
            .find_map(|root| path.strip_prefix(root).ok());
        match relative {
            Some(rel) => rel
                .components()
                .any(|c| c.as_os_str().to_string_lossy().starts_with('.')),
            None => path
                .file_name()
                .is_some_and(|n| n.to_string_lossy().starts_with('.')),
        }
    }
}

fn with_canonical(path: &Path) -> Vec<PathBuf> {
    let mut paths = vec![path.to_path_buf()];
    if let Ok(canonical) = path.canonicalize()
        && canonical != path
    {
        paths.push(canonical);
    }
    paths
}

/// An existing directory, or a vanished path without an extension.
fn looks_like_dir(path: &Path) -> bool {
    path.is_dir() || (!path.exists() && path.extension().is_none())
}

/// Drive the debounce loop until [`Signal::Stop`] arrives or every sender is gone.
///
/// A regeneration still pending at shutdown is dropped.
pub fn run_loop<F, E>(rx: Receiver<Signal>, filter: WatchFilter, window: Duration, mut on_change: F)
where
    F: FnMut() -> Result<(), E>,
    E: Display,
{
    let mut debouncer = Debouncer::new(window);

    loop {
        let received = match debouncer.timeout(Instant::now()) {
            Some(timeout) => rx.recv_timeout(timeout),
            None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };

        match received {
            Ok(Signal::Fs(Ok(event))) => {
                if filter.is_relevant(&event) {
                    tracing::debug!(kind = ?event.kind, paths = ?event.paths, "asset change");
                    debouncer.touch(Instant::now());
                }
            }
            Ok(Signal::Fs(Err(err))) => tracing::error!(error = %err, "watch error"),
            Ok(Signal::Stop) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }

        if debouncer.take_if_due(Instant::now()) {
            tracing::info!("detected asset changes, regenerating constants");
            if let Err(err) = on_change() {
                tracing::error!(error = %err, "regeneration failed");
            }
        }
    }
}

/// A running watch session. Dropping it stops the session too.
pub struct WatchHandle {
    dir: PathBuf,
    watcher: Option<RecommendedWatcher>,
    stop_tx: Sender<Signal>,
    worker: Option<JoinHandle<()>>,
}

impl WatchHandle {
    /// Start watching `dir` recursively, calling `on_change` after each
    /// debounced burst of relevant events.
    pub fn start<F, E>(
        dir: &Path,
        output: &Path,
        window: Duration,
        on_change: F,
    ) -> Result<Self, WatchError>
    where
        F: FnMut() -> Result<(), E> + Send + 'static,
        E: Display,
    {
        if !dir.is_dir() {
            return Err(WatchError::MissingDir(dir.to_path_buf()));
        }

        let (tx, rx) = mpsc::channel();
        let notify_tx = tx.clone();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(Signal::Fs(res));
        })?;
        watcher.watch(dir, RecursiveMode::Recursive)?;

        let filter = WatchFilter::new(dir, output);
        let worker = std::thread::Builder::new()
            .name("image-consts-watch".into())
            .spawn(move || run_loop(rx, filter, window, on_change))
            .map_err(WatchError::Spawn)?;

        tracing::info!(dir = %dir.display(), "watching for changes");
        Ok(Self {
            dir: dir.to_path_buf(),
            watcher: Some(watcher),
            stop_tx: tx,
            worker: Some(worker),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Block until the session ends. Only returns early if the worker dies.
    pub fn wait(mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }

    /// Stop watching and wait for the worker thread to finish.
    pub fn close(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        // Dropping the notify watcher first means no new events are queued.
        self.watcher.take();
        let _ = self.stop_tx.send(Signal::Stop);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::error!("watch worker panicked");
            }
            tracing::info!(dir = %self.dir.display(), "stopped watching");
        }
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}
