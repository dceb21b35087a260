// src/registration/mod.rs

//! Registration service collaborators
//!
//! The reconciliation core consumes two narrow interfaces:
//! - [`RegistrationApi`] - activations and catalog entries from the remote service
//! - [`RegistrationState`] - whether this system holds registration credentials
//!
//! [`SccClient`] and [`CredentialsFile`] are the production implementations;
//! tests substitute in-memory doubles.

mod client;
mod credentials;

pub use client::{parse_error_message, SccClient, ACCEPT_HEADER, ACTIVATIONS_PATH, PRODUCTS_PATH};
pub use credentials::{parse_credentials, Credentials, CredentialsFile, SYSTEM_CREDENTIALS_PATH};

use crate::activation::Activation;
use crate::error::Result;
use crate::product::Product;
use tracing::debug;

/// Remote activation and product catalog service
pub trait RegistrationApi {
    /// All activations of this system
    fn fetch_activations(&self) -> Result<Vec<Activation>>;

    /// Catalog entry for `query`, with its extension tree populated
    fn fetch_catalog_entry(&self, query: &Product) -> Result<Product>;
}

/// Local registration state
pub trait RegistrationState {
    /// Whether the system is registered with the service
    fn is_registered(&self) -> bool;

    /// Whether system credentials are available for authenticated calls
    fn credentials_exist(&self) -> bool;
}

impl<T: RegistrationApi + ?Sized> RegistrationApi for &T {
    fn fetch_activations(&self) -> Result<Vec<Activation>> {
        (**self).fetch_activations()
    }

    fn fetch_catalog_entry(&self, query: &Product) -> Result<Product> {
        (**self).fetch_catalog_entry(query)
    }
}

impl<T: RegistrationState + ?Sized> RegistrationState for &T {
    fn is_registered(&self) -> bool {
        (**self).is_registered()
    }

    fn credentials_exist(&self) -> bool {
        (**self).credentials_exist()
    }
}

/// Activations of this system, or none when it holds no credentials
///
/// A system without credentials is an expected state for status reporting,
/// not a failure, so the service is not contacted at all. Every other
/// failure propagates.
pub fn system_activations(
    api: &impl RegistrationApi,
    state: &impl RegistrationState,
) -> Result<Vec<Activation>> {
    if !state.credentials_exist() {
        debug!("No system credentials, skipping activation fetch");
        return Ok(Vec::new());
    }
    let activations = api.fetch_activations()?;
    debug!("Fetched {} activations", activations.len());
    Ok(activations)
}
