// src/extensions.rs

//! Extension tree resolution
//!
//! Builds the tree of optional extensions available for the base product
//! from the remote catalog, marking each node activated when an activation
//! exists for its triplet. Siblings are ordered by friendly name at every
//! level, independent of catalog order.
//!
//! The catalog is external data, so the walk is bounded: nesting deeper than
//! [`MAX_EXTENSION_DEPTH`] or a product appearing inside itself aborts the
//! resolution instead of recursing without end.

use crate::activation::Activation;
use crate::error::{Error, Result};
use crate::product::{Product, ProductIdentity};
use crate::registration::{system_activations, RegistrationApi, RegistrationState};
use crate::status::reconcile;
use crate::zypper::{select_base_product, Zypper};
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

/// Deepest extension nesting accepted from the catalog
pub const MAX_EXTENSION_DEPTH: usize = 16;

/// Spaces of indentation per nesting level in text output
pub const INDENT_WIDTH: usize = 4;

/// A catalog product annotated for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayExtension {
    /// Catalog entry; its own `extensions` are moved into [`Self::extensions`]
    pub product: Product,
    pub triplet: String,
    pub activated: bool,
    pub extensions: Vec<DisplayExtension>,
    /// Nesting level; the base product is 0, its direct extensions 1
    pub depth: usize,
}

impl DisplayExtension {
    /// Leading whitespace for this node in text output
    pub fn indent(&self) -> String {
        " ".repeat(INDENT_WIDTH * self.depth)
    }

    /// Name shown to users, falling back to the identifier
    pub fn display_name(&self) -> &str {
        if self.product.friendly_name.is_empty() {
            &self.product.name
        } else {
            &self.product.friendly_name
        }
    }

    /// Every node below this one, parents before children
    pub fn descendants(&self) -> Vec<&DisplayExtension> {
        let mut all = Vec::new();
        for child in &self.extensions {
            all.push(child);
            all.extend(child.descendants());
        }
        all
    }
}

impl ProductIdentity for DisplayExtension {
    fn identifier(&self) -> &str {
        &self.product.name
    }

    fn version(&self) -> &str {
        &self.product.version
    }

    fn arch(&self) -> &str {
        &self.product.arch
    }
}

impl Serialize for DisplayExtension {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("DisplayExtension", 8)?;
        s.serialize_field("identifier", &self.product.name)?;
        s.serialize_field("version", &self.product.version)?;
        s.serialize_field("arch", &self.product.arch)?;
        s.serialize_field("name", &self.product.friendly_name)?;
        s.serialize_field("activated", &self.activated)?;
        s.serialize_field("available", &self.product.available)?;
        s.serialize_field("free", &self.product.free)?;
        s.serialize_field("extensions", &self.extensions)?;
        s.end()
    }
}

/// Build the display tree rooted at `catalog`
pub fn build_extension_tree(catalog: &Product, activations: &[Activation]) -> Result<DisplayExtension> {
    let activated: HashSet<String> = activations.iter().map(|a| a.to_triplet()).collect();
    let mut path = HashSet::new();
    build_node(catalog, &activated, 0, &mut path)
}

fn build_node(
    product: &Product,
    activated: &HashSet<String>,
    depth: usize,
    path: &mut HashSet<String>,
) -> Result<DisplayExtension> {
    if depth > MAX_EXTENSION_DEPTH {
        return Err(Error::ExtensionTreeTooDeep(MAX_EXTENSION_DEPTH));
    }
    let triplet = product.to_triplet();
    if !path.insert(triplet.clone()) {
        return Err(Error::ExtensionCycle(triplet));
    }

    let mut extensions = product
        .extensions
        .iter()
        .map(|child| build_node(child, activated, depth + 1, path))
        .collect::<Result<Vec<_>>>()?;
    extensions.sort_by(|a, b| a.product.friendly_name.cmp(&b.product.friendly_name));
    path.remove(&triplet);

    let mut product = product.clone();
    product.extensions = Vec::new();
    Ok(DisplayExtension {
        activated: activated.contains(&triplet),
        product,
        triplet,
        extensions,
        depth,
    })
}

/// Extension tree of `base`, which must be installed and registered
pub fn resolve_extensions(
    base: &Product,
    zypper: &Zypper,
    api: &impl RegistrationApi,
    state: &impl RegistrationState,
) -> Result<DisplayExtension> {
    if !state.is_registered() {
        return Err(Error::NotRegistered);
    }
    let installed = zypper.installed_products()?;
    resolve_from_inventory(base, &installed, api, state)
}

/// Extension tree of the installed base product
pub fn list_extensions(
    zypper: &Zypper,
    api: &impl RegistrationApi,
    state: &impl RegistrationState,
) -> Result<DisplayExtension> {
    if !state.is_registered() {
        return Err(Error::NotRegistered);
    }
    let installed = zypper.installed_products()?;
    let base = select_base_product(&installed)?;
    resolve_from_inventory(&base, &installed, api, state)
}

fn resolve_from_inventory(
    base: &Product,
    installed: &[Product],
    api: &impl RegistrationApi,
    state: &impl RegistrationState,
) -> Result<DisplayExtension> {
    let base_triplet = base.to_triplet();
    let activations = system_activations(api, state)?;

    let statuses = reconcile(installed, &activations);
    let base_registered = statuses
        .iter()
        .any(|s| s.to_triplet() == base_triplet && s.is_registered());
    if !base_registered {
        return Err(Error::BaseProductNotRegistered(base_triplet));
    }

    info!("Fetching extensions of {}", base_triplet);
    let catalog = api.fetch_catalog_entry(base)?;
    let tree = build_extension_tree(&catalog, &activations)?;
    debug!(
        "{} has {} extensions",
        base_triplet,
        tree.descendants().len()
    );
    Ok(tree)
}

/// Index of every node in the tree by triplet
pub fn index_tree(root: &DisplayExtension) -> HashMap<String, &DisplayExtension> {
    root.descendants()
        .into_iter()
        .map(|node| (node.triplet.clone(), node))
        .collect()
}
