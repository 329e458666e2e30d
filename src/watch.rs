//! File system watcher for live reload.
//!
//! Monitors the project text file and `webforge.toml`. A project change is
//! re-parsed and swapped into the server snapshot (bumping the revision the
//! host page polls); a config change goes through [`reload_config`].
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      Event Loop                              │
//! │                                                              │
//! │  ┌──────────┐    ┌──────────┐    ┌────────────────────────┐  │
//! │  │ notify   │───▶│ Debouncer│───▶│    handle_changes()    │  │
//! │  │ events   │    │ (300ms)  │    │                        │  │
//! │  └──────────┘    └──────────┘    │  config  → reload      │  │
//! │                                  │  project → re-parse    │  │
//! │                                  └────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Parent directories are watched rather than the files themselves: editors
//! and [`write_atomic`](crate::session::write_atomic) replace files by rename.

use crate::{
    config::{WebConfig, cfg, reload_config},
    log,
    logger::WatchStatus,
    project::ProjectStore,
    serve::ServeState,
};
use anyhow::{Context, Result};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use rustc_hash::FxHashSet;
use std::{
    fs,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

// =============================================================================
// Constants
// =============================================================================

const DEBOUNCE_MS: u64 = 300;
const RELOAD_COOLDOWN_MS: u64 = 800;

// =============================================================================
// Path Utilities
// =============================================================================

/// Check if path is a temp/backup file (editor artifacts).
fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
}

/// Which watched file a path refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Change {
    Project,
    Config,
    Other,
}

/// Compare by file name and canonical parent; event paths may not match the
/// configured spelling of the same file.
fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    let parent = |p: &Path| p.parent().and_then(|d| d.canonicalize().ok());
    a.file_name() == b.file_name() && parent(a).is_some() && parent(a) == parent(b)
}

fn categorize(path: &Path, config: &WebConfig) -> Change {
    if same_file(path, &config.project.path) {
        Change::Project
    } else if same_file(path, &config.config_path) {
        Change::Config
    } else {
        Change::Other
    }
}

// =============================================================================
// Debounce State
// =============================================================================

/// Batches rapid file events with debouncing and reload cooldown.
///
/// Events seen during the cooldown stay pending; only the reload waits.
struct Debouncer {
    pending: FxHashSet<PathBuf>,
    last_event: Option<Instant>,
    last_reload: Option<Instant>,
}

impl Debouncer {
    fn new() -> Self {
        Self {
            pending: FxHashSet::default(),
            last_event: None,
            last_reload: None,
        }
    }

    fn in_cooldown(&self) -> bool {
        self.last_reload
            .is_some_and(|t| t.elapsed() < Duration::from_millis(RELOAD_COOLDOWN_MS))
    }

    fn add(&mut self, event: Event) {
        for path in event.paths {
            if !is_temp_file(&path) {
                self.pending.insert(path);
            }
        }
        self.last_event = Some(Instant::now());
    }

    fn ready(&self) -> bool {
        !self.pending.is_empty()
            && !self.in_cooldown()
            && self
                .last_event
                .is_some_and(|t| t.elapsed() >= Duration::from_millis(DEBOUNCE_MS))
    }

    fn take(&mut self) -> Vec<PathBuf> {
        self.last_event = None;
        self.pending.drain().collect()
    }

    fn mark_reload(&mut self) {
        self.last_reload = Some(Instant::now());
    }

    fn timeout(&self) -> Duration {
        if self.pending.is_empty() {
            Duration::from_secs(60)
        } else {
            Duration::from_millis(DEBOUNCE_MS)
        }
    }
}

// =============================================================================
// Event Handler
// =============================================================================

/// Re-read the project file into the snapshot.
fn reload_project(state: &ServeState, config: &WebConfig, status: &mut WatchStatus) -> bool {
    let path = &config.project.path;
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            status.error(&format!("failed to read {}", path.display()), &e.to_string());
            return false;
        }
    };

    let report = ProjectStore::parse_with_report(&text).1;
    if !state.replace_source(text) {
        status.unchanged(&path.display().to_string());
        return false;
    }
    let count = state.snapshot().store.len();

    if report.is_empty() {
        status.success(&format!("reloaded {count} files"));
    } else {
        let detail = report
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n");
        status.error(&format!("reloaded {count} files with marker problems"), &detail);
    }
    true
}

/// Process file changes. Returns true if anything was reloaded (for cooldown).
fn handle_changes(paths: &[PathBuf], state: &ServeState, status: &mut WatchStatus) -> bool {
    let config = cfg();
    let changes: FxHashSet<Change> = paths.iter().map(|p| categorize(p, &config)).collect();
    let mut reloaded = false;

    if changes.contains(&Change::Config) {
        match reload_config() {
            Ok(true) => {
                status.success("config reloaded");
                status.detach();
                reloaded = true;
            }
            Ok(false) => {}
            Err(e) => status.error("config reload failed, keeping previous config", &format!("{e:#}")),
        }
    }

    // Config reload may have moved the project file
    let config = cfg();
    if changes.contains(&Change::Project) || reloaded {
        reloaded |= reload_project(state, &config, status);
    }

    reloaded
}

// =============================================================================
// Watcher Setup
// =============================================================================

fn setup_watchers(watcher: &mut impl Watcher, config: &WebConfig) -> Result<()> {
    let dirs: FxHashSet<&Path> = [&config.project.path, &config.config_path]
        .into_iter()
        .filter_map(|p| p.parent())
        .filter(|d| d.is_dir())
        .collect();

    for dir in dirs {
        watcher
            .watch(dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch {}", dir.display()))?;
    }

    log!("watch"; "project: {}", config.project.path.display());
    if config.config_path.exists() {
        log!("watch"; "config: {}", config.config_path.display());
    }
    Ok(())
}

const fn is_relevant(event: &Event) -> bool {
    matches!(
        event.kind,
        EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
    )
}

// =============================================================================
// Public API
// =============================================================================

/// Start blocking file watcher with debouncing and live reload.
pub fn watch_for_changes_blocking(state: &ServeState) -> Result<()> {
    let config = cfg();
    if !config.serve.watch {
        return Ok(());
    }

    let (tx, rx) = std::sync::mpsc::channel();
    let mut watcher = notify::recommended_watcher(tx).context("Failed to create file watcher")?;
    setup_watchers(&mut watcher, &config)?;

    let mut debouncer = Debouncer::new();
    let mut status = WatchStatus::new();

    loop {
        match rx.recv_timeout(debouncer.timeout()) {
            Ok(Ok(event)) if is_relevant(&event) => {
                debouncer.add(event);
            }
            Ok(Err(e)) => log!("watch"; "error: {e}"),
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) if debouncer.ready() => {
                if handle_changes(&debouncer.take(), state, &mut status) {
                    debouncer.mark_reload();
                }
            }
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
            _ => {}
        }
    }

    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
