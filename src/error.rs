// src/error.rs

//! Error types for prodreg
//!
//! Every failure is terminal to the operation that raised it. Lower layers
//! return their errors unchanged up to the operation boundary; the only
//! place an error is absorbed is the activation fetch on a system without
//! credentials (see [`crate::registration::system_activations`]).

use crate::exec::ExecuteError;
use crate::zypper::ZypperError;
use thiserror::Error;

/// Errors that can occur while collecting or reconciling product data
#[derive(Error, Debug)]
pub enum Error {
    /// The command could not be started at all (missing binary, no permission)
    #[error("Failed to run '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// A command exited with a code outside its allow-list
    #[error(transparent)]
    Execute(#[from] ExecuteError),

    /// zypper failed with a known or unknown exit code
    #[error(transparent)]
    Zypper(#[from] ZypperError),

    /// The product listing from zypper could not be decoded
    #[error(transparent)]
    ProductsXml(#[from] quick_xml::de::DeError),

    /// The product listing parsed but no entry is flagged as base
    #[error("Unable to detect base product")]
    BaseProductNotFound,

    /// An operation requiring registration was invoked on an unregistered system
    #[error("System not registered")]
    NotRegistered,

    /// The base product has no paid activation, so extensions cannot be listed
    #[error("Base product {0} is not registered")]
    BaseProductNotRegistered(String),

    /// The registration service answered with a non-success status
    #[error("Registration server returned '{message}' ({code})")]
    Api { code: u16, message: String },

    /// The request never produced a response
    #[error("HTTP request failed: {0}")]
    Transport(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Credentials file is missing: {0}")]
    MissingCredentials(String),

    #[error("Cannot parse credentials file: {0}")]
    MalformedCredentials(String),

    #[error("Invalid product '{0}'; <internal name>/<version>/<architecture> format expected")]
    InvalidTriplet(String),

    /// The remote catalog describes an extension that contains itself
    #[error("Extension cycle detected at {0}")]
    ExtensionCycle(String),

    #[error("Extension tree exceeds the maximum depth of {0}")]
    ExtensionTreeTooDeep(usize),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for prodreg operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Exit code of the failed command, if this error came from one
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::Execute(e) => Some(e.exit_code),
            Self::Zypper(e) => Some(e.exit_code.code()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zypper::ZypperExitCode;

    #[test]
    fn test_exit_code_from_execute_error() {
        let err = Error::from(ExecuteError {
            command: vec!["false".to_string()],
            exit_code: 1,
            output: Vec::new(),
        });
        assert_eq!(err.exit_code(), Some(1));
    }

    #[test]
    fn test_exit_code_from_zypper_error() {
        let err = Error::from(ZypperError {
            command: vec!["/usr/bin/zypper".to_string()],
            exit_code: ZypperExitCode::ZyppLocked,
            output: b"System management is locked".to_vec(),
        });
        assert_eq!(err.exit_code(), Some(7));
        assert_eq!(Error::NotRegistered.exit_code(), None);
    }

    #[test]
    fn test_api_error_message() {
        let err = Error::Api {
            code: 401,
            message: "Invalid system credentials".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Registration server returned 'Invalid system credentials' (401)"
        );
    }
}
