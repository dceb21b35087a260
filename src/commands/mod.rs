// src/commands/mod.rs
//! Command handlers for the prodreg CLI

mod extensions;
mod products;
mod status;

pub use extensions::cmd_list_extensions;
pub use products::cmd_products;
pub use status::cmd_status;

use prodreg::{Config, CredentialsFile, SccClient, Zypper};

/// Production collaborators built from the configuration
pub(crate) struct Backend {
    pub zypper: Zypper,
    pub api: SccClient,
    pub state: CredentialsFile,
}

impl Backend {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            zypper: Zypper::from_config(config),
            api: SccClient::new(config)?,
            state: CredentialsFile::from_config(config),
        })
    }
}
