// src/zypper/mod.rs

//! zypper package manager adapter
//!
//! Builds zypper invocations (optionally against an alternate filesystem
//! root), runs them through [`crate::exec`], and re-wraps execution
//! failures as [`ZypperError`] with a typed [`ZypperExitCode`].
//!
//! Informational exit codes (100 and above) are not failures when the
//! caller lists them as valid for the invocation.

mod products;

pub use products::{apply_oem_release_types, parse_products_xml, select_base_product, OEM_PATH};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::exec::{self, ExecuteError};
use crate::product::Product;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default location of the zypper binary
pub const ZYPPER_PATH: &str = "/usr/bin/zypper";

/// Arguments listing installed products as XML without touching repositories
const INSTALLED_PRODUCTS_ARGS: &[&str] = &[
    "--disable-repositories",
    "--xmlout",
    "--non-interactive",
    "products",
    "-i",
];

/// Documented zypper exit codes
///
/// Single-digit codes denote errors, codes from 100 upward pass additional
/// information about an otherwise successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ZypperExitCode {
    Ok,
    /// Unexpected situation, probably caused by a bug
    Bug,
    /// Invalid command, option or syntax
    Syntax,
    /// Some of the provided arguments were invalid
    InvalidArgs,
    /// A problem reported by the ZYPP library
    Zypp,
    /// Insufficient privileges for the operation
    Privileges,
    /// No repositories are defined
    NoRepos,
    /// The ZYPP library is locked, e.g. packagekit is running
    ZyppLocked,
    /// Error during installation or removal of packages
    Commit,
    /// Patches are available for installation
    UpdateNeeded,
    /// Security patches are available for installation
    SecUpdateNeeded,
    /// An installed patch requires a reboot
    RebootNeeded,
    /// An installed patch requires restarting the package manager
    RestartNeeded,
    /// Arguments matched no package names or capabilities
    CapNotFound,
    /// Exited after receiving SIGINT or SIGTERM
    OnSignal,
    /// Some repository was temporarily disabled because it failed to refresh
    ReposSkipped,
    /// Any code not in the documented table
    Unknown(i32),
}

impl ZypperExitCode {
    /// Map a raw process exit code
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Self::Ok,
            1 => Self::Bug,
            2 => Self::Syntax,
            3 => Self::InvalidArgs,
            4 => Self::Zypp,
            5 => Self::Privileges,
            6 => Self::NoRepos,
            7 => Self::ZyppLocked,
            8 => Self::Commit,
            100 => Self::UpdateNeeded,
            101 => Self::SecUpdateNeeded,
            102 => Self::RebootNeeded,
            103 => Self::RestartNeeded,
            104 => Self::CapNotFound,
            105 => Self::OnSignal,
            106 => Self::ReposSkipped,
            other => Self::Unknown(other),
        }
    }

    /// Raw process exit code
    pub fn code(self) -> i32 {
        match self {
            Self::Ok => 0,
            Self::Bug => 1,
            Self::Syntax => 2,
            Self::InvalidArgs => 3,
            Self::Zypp => 4,
            Self::Privileges => 5,
            Self::NoRepos => 6,
            Self::ZyppLocked => 7,
            Self::Commit => 8,
            Self::UpdateNeeded => 100,
            Self::SecUpdateNeeded => 101,
            Self::RebootNeeded => 102,
            Self::RestartNeeded => 103,
            Self::CapNotFound => 104,
            Self::OnSignal => 105,
            Self::ReposSkipped => 106,
            Self::Unknown(code) => code,
        }
    }

    /// Documented error codes (1-8)
    pub fn is_error(self) -> bool {
        (1..=8).contains(&self.code())
    }

    /// Documented informational codes (100-106)
    pub fn is_informational(self) -> bool {
        (100..=106).contains(&self.code())
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Ok => "success",
            Self::Bug => "unexpected situation, probably a bug",
            Self::Syntax => "invalid command, option or syntax",
            Self::InvalidArgs => "invalid arguments",
            Self::Zypp => "ZYPP library error",
            Self::Privileges => "insufficient privileges",
            Self::NoRepos => "no repositories defined",
            Self::ZyppLocked => "ZYPP library is locked",
            Self::Commit => "error during package installation or removal",
            Self::UpdateNeeded => "updates available",
            Self::SecUpdateNeeded => "security updates available",
            Self::RebootNeeded => "reboot needed",
            Self::RestartNeeded => "package manager restart needed",
            Self::CapNotFound => "capability not found",
            Self::OnSignal => "interrupted by signal",
            Self::ReposSkipped => "repositories skipped",
            Self::Unknown(_) => "unknown exit code",
        }
    }
}

impl fmt::Display for ZypperExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code(), self.description())
    }
}

/// zypper exited with a code outside the caller's allow-list
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "command '{}' failed\nError: zypper returned {} with '{}'",
    .command.join(" "),
    .exit_code,
    String::from_utf8_lossy(.output)
)]
pub struct ZypperError {
    pub command: Vec<String>,
    pub exit_code: ZypperExitCode,
    pub output: Vec<u8>,
}

impl From<ExecuteError> for ZypperError {
    fn from(e: ExecuteError) -> Self {
        Self {
            command: e.command,
            exit_code: ZypperExitCode::from_code(e.exit_code),
            output: e.output,
        }
    }
}

/// Handle for running zypper against a filesystem root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zypper {
    binary: PathBuf,
    root: Option<PathBuf>,
}

impl Default for Zypper {
    fn default() -> Self {
        Self::new()
    }
}

impl Zypper {
    /// zypper at its default location, operating on `/`
    pub fn new() -> Self {
        Self {
            binary: PathBuf::from(ZYPPER_PATH),
            root: None,
        }
    }

    /// Build from the binary path and filesystem root in `config`
    pub fn from_config(config: &Config) -> Self {
        let zypper = Self::new().with_binary(&config.zypper_path);
        match &config.root {
            Some(root) => zypper.with_root(root),
            None => zypper,
        }
    }

    pub fn with_binary(mut self, binary: impl AsRef<Path>) -> Self {
        self.binary = binary.as_ref().to_path_buf();
        self
    }

    /// Operate on an alternate filesystem root (containers, offline images)
    pub fn with_root(mut self, root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        self.root = if root == Path::new("/") {
            None
        } else {
            Some(root.to_path_buf())
        };
        self
    }

    /// Filesystem root zypper operates on
    pub fn root(&self) -> &Path {
        self.root.as_deref().unwrap_or_else(|| Path::new("/"))
    }

    /// Full command line for `args`, including `--root` when needed
    pub fn command(&self, args: &[&str]) -> Vec<String> {
        let mut cmd = vec![self.binary.to_string_lossy().into_owned()];
        if let Some(root) = &self.root {
            cmd.push("--root".to_string());
            cmd.push(root.to_string_lossy().into_owned());
        }
        cmd.extend(args.iter().map(|a| a.to_string()));
        cmd
    }

    /// Run zypper with `args`
    ///
    /// [`ZypperExitCode::Ok`] is always accepted; any other code must be in
    /// `valid_exit_codes`.
    pub fn run(
        &self,
        args: &[&str],
        quiet: bool,
        valid_exit_codes: &[ZypperExitCode],
    ) -> Result<Vec<u8>> {
        let cmd = self.command(args);
        info!("Executing '{}'", cmd.join(" "));

        let codes: Vec<i32> = valid_exit_codes.iter().map(|c| c.code()).collect();
        match exec::execute(&cmd, quiet, &codes) {
            Ok(output) => Ok(output),
            Err(Error::Execute(e)) => Err(ZypperError::from(e).into()),
            Err(e) => Err(e),
        }
    }

    /// Products currently installed on the system
    pub fn installed_products(&self) -> Result<Vec<Product>> {
        let output = self.run(INSTALLED_PRODUCTS_ARGS, false, &[ZypperExitCode::Ok])?;
        let mut products = parse_products_xml(&output)?;
        apply_oem_release_types(&mut products, self.root());
        debug!("Found {} installed products", products.len());
        Ok(products)
    }

    /// The installed product flagged as base
    pub fn base_product(&self) -> Result<Product> {
        let products = self.installed_products()?;
        select_base_product(&products)
    }

    /// Distribution target as reported by `zypper targetos`
    pub fn distro_target(&self) -> Result<String> {
        let output = self.run(&["targetos"], false, &[ZypperExitCode::Ok])?;
        Ok(String::from_utf8_lossy(&output).trim().to_string())
    }
}
