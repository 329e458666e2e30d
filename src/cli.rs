//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use crate::preview::DeviceProfile;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// webforge: generate, inspect and preview small web projects
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Project root directory
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Project text file (relative to project root)
    #[arg(short = 'f', long = "project")]
    pub project: Option<PathBuf>,

    /// Output directory path (relative to project root)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Config file name (default: webforge.toml)
    #[arg(short = 'C', long, default_value = "webforge.toml")]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Shared arguments for commands that ask the generator for a project
#[derive(clap::Args, Debug, Clone)]
pub struct PromptArgs {
    /// Natural-language description of the project or the change
    #[arg(required = true, num_args = 1..)]
    pub prompt: Vec<String>,

    /// Use the built-in offline template generator instead of the LLM service
    #[arg(long)]
    pub offline: bool,

    /// Override the model name from `[llm.model]`
    #[arg(short, long)]
    pub model: Option<String>,
}

impl PromptArgs {
    pub fn text(&self) -> String {
        self.prompt.join(" ")
    }
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Generate a new project from a prompt, replacing the current one
    Generate {
        #[command(flatten)]
        args: PromptArgs,
    },

    /// Ask the generator to modify the current project
    Modify {
        #[command(flatten)]
        args: PromptArgs,
    },

    /// List project files, grouped by folder
    Files,

    /// Print one file, by name or by position in the list
    Show {
        /// File name or zero-based index
        target: String,
    },

    /// Replace a file's content from a file or stdin
    Edit {
        /// Zero-based index of the file
        index: usize,

        /// Read new content from this file instead of stdin
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Report marker problems in the project text
    Check,

    /// Write the preview document and a static host page
    Preview {
        /// Device frame
        #[arg(short, long, value_enum)]
        device: Option<DeviceProfile>,

        /// Minify the preview document
        #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
        minify: Option<bool>,

        /// Target directory (default: <output>/preview)
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Write every project file to disk
    Export {
        /// Target directory (default: <output>/site)
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Pack the project into a zip archive
    Pack {
        /// Archive path (default: <output>/<archive>)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Serve the live preview with the console bridge
    Serve {
        /// Interface to bind on
        #[arg(short, long)]
        interface: Option<String>,

        /// The port you should provide
        #[arg(short, long)]
        port: Option<u16>,

        /// enable watch
        #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
        watch: Option<bool>,

        /// Initial device frame
        #[arg(short, long, value_enum)]
        device: Option<DeviceProfile>,
    },

    /// Show or clear the generation error log
    Errors {
        /// Remove every recorded error
        #[arg(long)]
        clear: bool,
    },

    /// Show the prompt history
    History,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_generate_joins_prompt() {
        let cli = Cli::parse_from(["webforge", "generate", "a", "todo", "app", "--offline"]);
        match cli.command {
            Commands::Generate { args } => {
                assert_eq!(args.text(), "a todo app");
                assert!(args.offline);
                assert_eq!(args.model, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert_eq!(cli.config, PathBuf::from("webforge.toml"));
    }

    #[test]
    fn test_parse_serve_overrides() {
        let cli = Cli::parse_from([
            "webforge", "-r", "site", "serve", "-p", "8080", "-w", "false", "-d", "tablet",
        ]);
        assert_eq!(cli.root, Some(PathBuf::from("site")));
        match cli.command {
            Commands::Serve { port, watch, device, interface } => {
                assert_eq!(port, Some(8080));
                assert_eq!(watch, Some(false));
                assert_eq!(device, Some(DeviceProfile::Medium));
                assert_eq!(interface, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_generate_requires_prompt() {
        assert!(Cli::try_parse_from(["webforge", "generate"]).is_err());
    }

    #[test]
    fn test_preview_minify_flag() {
        let cli = Cli::parse_from(["webforge", "preview", "-m"]);
        assert!(matches!(
            cli.command,
            Commands::Preview { minify: Some(true), .. }
        ));
    }
}
