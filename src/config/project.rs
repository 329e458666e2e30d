//! `[project]` section configuration.
//!
//! Where the project text lives and where derived artifacts go.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[project]` section in webforge.toml.
///
/// # Example
/// ```toml
/// [project]
/// path = "project.txt"       # Marker-delimited project text
/// output = "dist"            # preview/, site/ and the archive go here
/// archive = "web-project.zip"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Project root directory (usually set via CLI `--root`).
    #[serde(default = "defaults::project::root")]
    #[educe(Default = defaults::project::root())]
    pub root: Option<PathBuf>,

    /// Project text file, `~` allowed.
    #[serde(default = "defaults::project::path")]
    #[educe(Default = defaults::project::path())]
    pub path: PathBuf,

    /// Output directory for previews, exports and archives.
    #[serde(default = "defaults::project::output")]
    #[educe(Default = defaults::project::output())]
    pub output: PathBuf,

    /// Archive file name, relative to `output`.
    #[serde(default = "defaults::project::archive")]
    #[educe(Default = defaults::project::archive())]
    pub archive: PathBuf,

    /// Directory for the error log and prompt history.
    #[serde(default = "defaults::project::state_dir")]
    #[educe(Default = defaults::project::state_dir())]
    pub state_dir: PathBuf,
}
