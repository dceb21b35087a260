// src/activation.rs

//! Activations reported by the registration service
//!
//! An activation asserts that a product triplet is entitled on this system,
//! through a paid subscription, a free product, or a trial. Activations are
//! keyed by the same triplet as installed products.

use crate::product::{Product, ProductIdentity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Remote service through which a product is activated
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "obsoleted_service_name", default)]
    pub obsoleted_name: String,
    #[serde(default)]
    pub product: Product,
}

/// An active entitlement for one product on this system
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activation {
    #[serde(default)]
    pub name: String,
    /// Lifecycle status of the subscription, e.g. `ACTIVE` or `EXPIRED`
    #[serde(default)]
    pub status: String,
    #[serde(rename = "regcode", default)]
    pub reg_code: String,
    /// Entitlement type, e.g. `full`, `evaluation`, `provisional`
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub service: Service,
}

impl Activation {
    /// Product descriptor embedded in the activation
    pub fn product(&self) -> &Product {
        &self.service.product
    }

    /// Whether the activated product is free of charge
    pub fn is_free(&self) -> bool {
        self.service.product.free
    }
}

impl ProductIdentity for Activation {
    fn identifier(&self) -> &str {
        &self.service.product.name
    }

    fn version(&self) -> &str {
        &self.service.product.version
    }

    fn arch(&self) -> &str {
        &self.service.product.arch
    }
}

/// Key activations by triplet
///
/// Duplicate triplets are not an error; the last activation wins.
pub fn index_by_triplet(activations: &[Activation]) -> HashMap<String, &Activation> {
    activations
        .iter()
        .map(|activation| (activation.to_triplet(), activation))
        .collect()
}
