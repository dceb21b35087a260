// src/status.rs

//! Product status reconciliation
//!
//! Correlates the installed products with the activations reported by the
//! registration service. Each installed product yields exactly one
//! [`Status`], in inventory order; activations without an installed
//! counterpart are ignored.
//!
//! Only paid activations mark a product as registered. A free activation
//! matching an installed product leaves it "Not Registered" with no
//! subscription details.

use crate::activation::{index_by_triplet, Activation};
use crate::error::Result;
use crate::product::{Product, ProductIdentity};
use crate::registration::{system_activations, RegistrationApi, RegistrationState};
use crate::zypper::Zypper;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

pub const REGISTERED: &str = "Registered";
pub const NOT_REGISTERED: &str = "Not Registered";

/// Absolute date, time and zone abbreviation
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S %Z";

/// Registration status of one installed product
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Status {
    #[serde(skip)]
    pub summary: String,
    pub identifier: String,
    pub version: String,
    pub arch: String,
    pub status: String,
    /// Name of the activation, only for paid entitlements
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "regcode", skip_serializing_if = "Option::is_none")]
    pub reg_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starts_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
    #[serde(rename = "subscription_status", skip_serializing_if = "Option::is_none")]
    pub sub_status: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl Status {
    fn not_registered(product: &Product) -> Self {
        Self {
            summary: product.summary.clone(),
            identifier: product.name.clone(),
            version: product.version.clone(),
            arch: product.arch.clone(),
            status: NOT_REGISTERED.to_string(),
            ..Self::default()
        }
    }

    fn apply_activation(&mut self, activation: &Activation) {
        self.status = REGISTERED.to_string();
        self.name = non_empty(&activation.name);
        self.reg_code = non_empty(&activation.reg_code);
        self.starts_at = activation.starts_at.as_ref().map(format_timestamp);
        self.expires_at = activation.expires_at.as_ref().map(format_timestamp);
        self.sub_status = non_empty(&activation.status);
        self.kind = non_empty(&activation.kind);
    }

    pub fn is_registered(&self) -> bool {
        self.status == REGISTERED
    }
}

impl ProductIdentity for Status {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn arch(&self) -> &str {
        &self.arch
    }
}

/// Empty service fields are reported as unset
fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

/// One status per installed product, in the order given
pub fn reconcile(installed: &[Product], activations: &[Activation]) -> Vec<Status> {
    let by_triplet = index_by_triplet(activations);

    installed
        .iter()
        .map(|product| {
            let mut status = Status::not_registered(product);
            match by_triplet.get(&product.to_triplet()) {
                Some(activation) if !activation.is_free() => status.apply_activation(activation),
                Some(_) => debug!("{} has a free activation", product.to_triplet()),
                None => {}
            }
            status
        })
        .collect()
}

/// Statuses of all installed products
///
/// On a system without credentials every product is reported as not
/// registered; the registration service is not contacted.
pub fn get_statuses(
    zypper: &Zypper,
    api: &impl RegistrationApi,
    state: &impl RegistrationState,
) -> Result<Vec<Status>> {
    let installed = zypper.installed_products()?;
    let activations = system_activations(api, state)?;
    Ok(reconcile(&installed, &activations))
}

/// Installed products followed by activated products that are not installed
///
/// Installed entries take precedence because they carry a summary, which
/// activations lack.
pub fn merge_system_products(installed: Vec<Product>, activations: &[Activation]) -> Vec<Product> {
    let mut seen: HashSet<String> = installed.iter().map(|p| p.to_triplet()).collect();
    let mut products = installed;
    for activation in activations {
        if seen.insert(activation.to_triplet()) {
            products.push(activation.product().clone());
        }
    }
    products
}

/// All products known to this system, installed or activated
pub fn system_products(
    zypper: &Zypper,
    api: &impl RegistrationApi,
    state: &impl RegistrationState,
) -> Result<Vec<Product>> {
    let installed = zypper.installed_products()?;
    let activations = system_activations(api, state)?;
    Ok(merge_system_products(installed, &activations))
}
