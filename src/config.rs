// src/config.rs

//! Agent configuration
//!
//! All settings travel as an explicit [`Config`] value handed to each
//! component's constructor. The file is TOML:
//!
//! ```toml
//! url = "https://scc.suse.com"
//! language = "en_US.UTF-8"
//! insecure = false
//! root = "/mnt/image"
//! ```
//!
//! Missing keys take their defaults; a missing file yields the defaults.

use crate::error::{Error, Result};
use crate::registration::SYSTEM_CREDENTIALS_PATH;
use crate::zypper::ZYPPER_PATH;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default configuration file location
pub const DEFAULT_CONFIG_PATH: &str = "/etc/prodreg.toml";

/// Default registration service
pub const DEFAULT_BASE_URL: &str = "https://scc.suse.com";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Registration service base URL
    pub url: String,
    /// Preferred language for service messages
    pub language: Option<String>,
    /// Skip TLS certificate verification
    pub insecure: bool,
    /// Alternate filesystem root; `None` means `/`
    pub root: Option<PathBuf>,
    /// System credentials file, relative to `root`
    pub credentials_path: PathBuf,
    pub zypper_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: DEFAULT_BASE_URL.to_string(),
            language: None,
            insecure: false,
            root: None,
            credentials_path: PathBuf::from(SYSTEM_CREDENTIALS_PATH),
            zypper_path: PathBuf::from(ZYPPER_PATH),
        }
    }
}

impl Config {
    /// Load configuration from `path`, falling back to defaults if it does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {e}", path.display())))
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Filesystem root the agent operates on
    pub fn fs_root(&self) -> &Path {
        self.root.as_deref().unwrap_or_else(|| Path::new("/"))
    }

    /// Resolve an absolute system path under the configured root
    pub fn resolve(&self, path: &Path) -> PathBuf {
        let relative = path.strip_prefix("/").unwrap_or(path);
        self.fs_root().join(relative)
    }

    /// Location of the system credentials file
    pub fn system_credentials_file(&self) -> PathBuf {
        self.resolve(&self.credentials_path)
    }
}
