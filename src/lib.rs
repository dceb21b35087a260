// src/lib.rs

//! prodreg - local product registration agent
//!
//! Reconciles the products installed on a machine with the activations
//! known to a remote registration service, and reports the result as a
//! status list and an extension tree.
//!
//! # Architecture
//!
//! - Inventory: zypper is run as a subprocess and its XML product listing parsed
//! - Identity: products and activations correlate only through the
//!   `name/version/arch` triplet
//! - Collaborators: the registration service and local registration state sit
//!   behind traits, so the reconciliation core runs without network access
//! - Configuration: an explicit [`Config`] value, no process-wide state

pub mod activation;
pub mod config;
mod error;
pub mod exec;
pub mod extensions;
pub mod product;
pub mod registration;
pub mod status;
pub mod zypper;

pub use activation::{Activation, Service};
pub use config::{Config, DEFAULT_CONFIG_PATH};
pub use error::{Error, Result};
pub use exec::{execute, ExecuteError};
pub use extensions::{
    build_extension_tree, list_extensions, resolve_extensions, DisplayExtension,
    MAX_EXTENSION_DEPTH,
};
pub use product::{distro_target, Product, ProductIdentity};
pub use registration::{
    system_activations, CredentialsFile, RegistrationApi, RegistrationState, SccClient,
};
pub use status::{get_statuses, reconcile, system_products, Status, NOT_REGISTERED, REGISTERED};
pub use zypper::{Zypper, ZypperError, ZypperExitCode};
