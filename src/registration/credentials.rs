// src/registration/credentials.rs

//! System credentials file
//!
//! The file holds `username=` and `password=` lines; surrounding whitespace
//! is tolerated. Its presence is what marks the system as registered.

use super::RegistrationState;
use crate::config::Config;
use crate::error::{Error, Result};
use regex::Regex;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::debug;

/// Default location of the system credentials
pub const SYSTEM_CREDENTIALS_PATH: &str = "/etc/zypp/credentials.d/SCCcredentials";

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*username\s*=\s*(\S+)\s*$").unwrap());
static PASSWORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*password\s*=\s*(\S+)\s*$").unwrap());

/// System login for the registration service
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub filename: PathBuf,
    pub username: String,
    pub password: String,
}

impl fmt::Display for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "file: {}, username: {}, password: REDACTED",
            self.filename.display(),
            self.username
        )
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Parse the content of a credentials file
pub fn parse_credentials(content: &str) -> Result<Credentials> {
    let username = USERNAME_RE.captures(content).map(|c| c[1].to_string());
    let password = PASSWORD_RE.captures(content).map(|c| c[1].to_string());
    match (username, password) {
        (Some(username), Some(password)) => Ok(Credentials {
            filename: PathBuf::new(),
            username,
            password,
        }),
        _ => Err(Error::MalformedCredentials(
            "username or password missing".to_string(),
        )),
    }
}

/// The system credentials file on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialsFile {
    path: PathBuf,
}

impl CredentialsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// System credentials under the configured filesystem root
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.system_credentials_file())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Read and parse the credentials
    pub fn read(&self) -> Result<Credentials> {
        if !self.exists() {
            return Err(Error::MissingCredentials(self.path.display().to_string()));
        }
        debug!("Reading credentials: {}", self.path.display());
        let content = fs::read_to_string(&self.path)?;
        let mut credentials = parse_credentials(&content).map_err(|_| {
            Error::MalformedCredentials(self.path.display().to_string())
        })?;
        credentials.filename = self.path.clone();
        debug!("Credentials read: {}", credentials);
        Ok(credentials)
    }
}

impl RegistrationState for CredentialsFile {
    fn is_registered(&self) -> bool {
        self.exists()
    }

    fn credentials_exist(&self) -> bool {
        self.exists()
    }
}
