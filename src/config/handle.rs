//! Global config with atomic reload support.
//!
//! Uses `arc-swap` for lock-free reads and atomic config replacement.
//! This enables hot-reloading of `webforge.toml` while `serve` is watching.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    CONFIG (ArcSwap)                         │
//! │                                                             │
//! │  ┌─────────────┐     ┌─────────────┐     ┌─────────────┐    │
//! │  │  Request    │     │  Request    │     │   Writer    │    │
//! │  │  handler    │     │  handler    │     │  (watch)    │    │
//! │  └──────┬──────┘     └──────┬──────┘     └──────┬──────┘    │
//! │         │                   │                   │           │
//! │         ▼                   ▼                   ▼           │
//! │       cfg()              cfg()           reload_config()    │
//! │    (lock-free)         (lock-free)      (atomic replace)    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use crate::config::cfg;
//!
//! let c = cfg();
//! synthesize(&store, &text, &c.preview);
//! ```

use super::WebConfig;
use crate::utils::hash;
use anyhow::{Context, Result};
use arc_swap::ArcSwap;
use std::{
    fs,
    sync::{
        Arc, LazyLock,
        atomic::{AtomicU64, Ordering},
    },
};

// =============================================================================
// Global State
// =============================================================================

/// Global config storage with atomic replacement support.
///
/// Initialized with default config, then replaced with loaded config in main.
pub static CONFIG: LazyLock<ArcSwap<WebConfig>> =
    LazyLock::new(|| ArcSwap::from_pointee(WebConfig::default()));

/// Hash of the config file content at last load, `0` when there was no file.
static CONFIG_HASH: AtomicU64 = AtomicU64::new(0);

// =============================================================================
// Public API
// =============================================================================

/// Get current config as `Arc<WebConfig>`.
///
/// Lock-free read via atomic load.
#[inline]
pub fn cfg() -> Arc<WebConfig> {
    CONFIG.load_full()
}

/// Replace config atomically (called when webforge.toml changes).
///
/// Returns `true` if config was actually updated, `false` if content matches last load.
/// On a parse or validation error the previous config stays active.
pub fn reload_config() -> Result<bool> {
    let c = cfg();
    let cli = c
        .cli
        .context("config was not initialized from command-line arguments")?;

    // File might be deleted temporarily by an editor; bubble the error up
    let content = fs::read_to_string(&c.config_path)?;
    let new_hash = hash::compute(content.as_bytes());

    if new_hash == CONFIG_HASH.load(Ordering::Relaxed) {
        return Ok(false);
    }

    let new_config = WebConfig::load(cli)?;

    CONFIG.store(Arc::new(new_config));
    CONFIG_HASH.store(new_hash, Ordering::Relaxed);

    Ok(true)
}

/// Initialize global config (called once at startup).
#[inline]
pub fn init_config(config: WebConfig) {
    if config.config_path.exists()
        && let Ok(content) = fs::read_to_string(&config.config_path)
    {
        CONFIG_HASH.store(hash::compute(content.as_bytes()), Ordering::Relaxed);
    }

    CONFIG.store(Arc::new(config));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reload_without_cli_fails() {
        // Default global config carries no CLI reference
        if cfg().cli.is_none() {
            assert!(reload_config().is_err());
        }
    }
}
