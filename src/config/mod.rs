//! Project configuration management for `webforge.toml`.
//!
//! # Sections
//!
//! | Section     | Purpose                                         |
//! |-------------|-------------------------------------------------|
//! | `[project]` | Project text file, output and state paths       |
//! | `[llm]`     | Chat-completion service (url, model, sampling)  |
//! | `[preview]` | Device frame, minification, Tailwind CDN        |
//! | `[serve]`   | Development server (port, interface, watch)     |
//!
//! Every section is optional; a missing config file means all defaults.
//!
//! # Example
//!
//! ```toml
//! [project]
//! path = "project.txt"
//! output = "dist"
//!
//! [llm]
//! model = "gpt-4o-mini"
//! temperature = 0.5
//!
//! [preview]
//! device = "desktop"
//!
//! [serve]
//! port = 5277
//! ```

pub mod defaults;
mod error;
mod handle;
mod llm;
mod preview;
mod project;
mod serve;

pub use error::ConfigError;
pub use handle::{cfg, init_config, reload_config};
pub use llm::LlmConfig;
pub use preview::PreviewConfig;
pub use project::ProjectConfig;
pub use serve::ServeConfig;

use crate::cli::{Cli, Commands};
use anyhow::{Result, bail};
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    net::IpAddr,
    path::{Path, PathBuf},
};

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure representing webforge.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct WebConfig {
    /// CLI arguments reference
    #[serde(skip)]
    pub cli: Option<&'static Cli>,

    /// Absolute path to the config file (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project paths
    #[serde(default)]
    pub project: ProjectConfig,

    /// Generation service settings
    #[serde(default)]
    pub llm: LlmConfig,

    /// Preview synthesis settings
    #[serde(default)]
    pub preview: PreviewConfig,

    /// Development server settings
    #[serde(default)]
    pub serve: ServeConfig,
}

impl WebConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: WebConfig = toml::from_str(content).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Load, apply CLI overrides and validate.
    ///
    /// A missing config file is not an error: every section has defaults.
    pub fn load(cli: &'static Cli) -> Result<Self> {
        let root = cli.root.as_deref().unwrap_or(Path::new("./"));
        let config_path = root.join(&cli.config);

        let mut config = if config_path.exists() {
            Self::from_path(&config_path)?
        } else {
            Self::default()
        };
        config.update_with_cli(cli);
        config.validate()?;

        Ok(config)
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        self.project.root.as_deref().unwrap_or(Path::new("./"))
    }

    /// Set the root directory path
    pub fn set_root(&mut self, path: &Path) {
        self.project.root = Some(path.to_path_buf())
    }

    /// Directory holding `errors.json` and `prompts.json`.
    pub fn state_dir(&self) -> &Path {
        &self.project.state_dir
    }

    /// Default archive location, `<output>/<archive>`.
    pub fn archive_path(&self) -> PathBuf {
        self.project.output.join(&self.project.archive)
    }

    /// Update configuration with CLI arguments
    pub fn update_with_cli(&mut self, cli: &'static Cli) {
        self.cli = Some(cli);

        let root = cli
            .root
            .as_ref()
            .cloned()
            .unwrap_or_else(|| self.get_root().to_owned());

        Self::update_option(&mut self.project.path, cli.project.as_ref());
        Self::update_option(&mut self.project.output, cli.output.as_ref());
        self.update_path_with_root(&root, &cli.config);

        match &cli.command {
            Commands::Serve {
                interface,
                port,
                watch,
                device,
            } => {
                Self::update_option(&mut self.serve.interface, interface.as_ref());
                Self::update_option(&mut self.serve.port, port.as_ref());
                Self::update_option(&mut self.serve.watch, watch.as_ref());
                Self::update_option(&mut self.preview.device, device.as_ref());
            }
            Commands::Preview { device, minify, .. } => {
                Self::update_option(&mut self.preview.device, device.as_ref());
                Self::update_option(&mut self.preview.minify, minify.as_ref());
            }
            Commands::Generate { args } | Commands::Modify { args } => {
                Self::update_option(&mut self.llm.model, args.model.as_ref());
            }
            _ => {}
        }
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Resolve all paths against `root` and normalize to absolute paths
    fn update_path_with_root(&mut self, root: &Path, config_name: &Path) {
        let root = Self::normalize_path(root);
        self.set_root(&root);

        self.config_path = Self::normalize_path(&root.join(config_name));
        self.project.path = Self::resolve(&root, &self.project.path);
        self.project.output = Self::resolve(&root, &self.project.output);
        self.project.state_dir = Self::resolve(&root, &self.project.state_dir);
    }

    /// Expand `~`, then join relative paths onto `root`.
    fn resolve(root: &Path, path: &Path) -> PathBuf {
        let expanded = PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned());
        if expanded.is_relative() {
            Self::normalize_path(&root.join(expanded))
        } else {
            Self::normalize_path(&expanded)
        }
    }

    /// Normalize a path to absolute, using canonicalize if the path exists
    fn normalize_path(path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| {
            // For non-existent paths, manually make them absolute
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                std::env::current_dir()
                    .map(|cwd| cwd.join(path))
                    .unwrap_or_else(|_| path.to_path_buf())
            }
        })
    }

    /// Validate field ranges and formats
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            bail!(ConfigError::Validation(
                "[llm.temperature] must be between 0.0 and 2.0".into()
            ));
        }

        if self.llm.max_tokens == 0 {
            bail!(ConfigError::Validation(
                "[llm.max_tokens] must be greater than 0".into()
            ));
        }

        if !self.llm.base_url.starts_with("http") {
            bail!(ConfigError::Validation(
                "[llm.base_url] must start with http:// or https://".into()
            ));
        }

        if self.llm.model.trim().is_empty() {
            bail!(ConfigError::Validation("[llm.model] must not be empty".into()));
        }

        if self.preview.tailwind_cdn.trim().is_empty() {
            bail!(ConfigError::Validation(
                "[preview.tailwind_cdn] must not be empty".into()
            ));
        }

        if self.serve.interface.parse::<IpAddr>().is_err() {
            bail!(ConfigError::Validation(format!(
                "[serve.interface] `{}` is not an IP address",
                self.serve.interface
            )));
        }

        if self.project.archive.as_os_str().is_empty() {
            bail!(ConfigError::Validation(
                "[project.archive] must not be empty".into()
            ));
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
