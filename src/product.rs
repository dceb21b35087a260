// src/product.rs

//! Products and their identity
//!
//! A product is identified by its triplet `name/version/arch`. The triplet
//! is the only correlation key between the local inventory and the records
//! reported by the registration service, so it is built byte-for-byte from
//! the source fields: no case folding, no trimming.

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};

/// Separator between triplet components
pub const TRIPLET_SEPARATOR: char = '/';

/// Product families whose members all share one distribution target
const DISTRO_FAMILY_PREFIXES: &[&str] = &["sle"];

/// Anything identified by a product triplet
pub trait ProductIdentity {
    fn identifier(&self) -> &str;
    fn version(&self) -> &str;
    fn arch(&self) -> &str;

    /// `name/version/arch`
    fn to_triplet(&self) -> String {
        triplet(self.identifier(), self.version(), self.arch())
    }
}

/// Build a triplet from its components
pub fn triplet(name: &str, version: &str, arch: &str) -> String {
    format!("{name}{TRIPLET_SEPARATOR}{version}{TRIPLET_SEPARATOR}{arch}")
}

/// Distribution target used to query the remote catalog
///
/// The identifier is lowercased and collapsed to its family prefix when it
/// has one, and only the major component of the version is kept:
/// `SLES 15.2 x86_64` becomes `sle-15-x86_64`.
pub fn distro_target(name: &str, version: &str, arch: &str) -> String {
    let mut identifier = name.to_lowercase();
    if let Some(prefix) = DISTRO_FAMILY_PREFIXES
        .iter()
        .find(|prefix| identifier.starts_with(*prefix))
    {
        identifier = prefix.to_string();
    }
    let major = version.split('.').next().unwrap_or_default();
    format!("{identifier}-{major}-{arch}")
}

/// An installed product, or product information from the registration service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ApiProduct")]
pub struct Product {
    #[serde(rename = "identifier")]
    pub name: String,
    pub version: String,
    pub arch: String,
    #[serde(skip)]
    pub release: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub summary: String,
    #[serde(rename = "isbase")]
    pub is_base: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub friendly_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub release_type: String,
    #[serde(skip)]
    pub product_line: String,
    pub available: bool,
    pub free: bool,
    pub recommended: bool,
    /// Optional extension products, possibly nested
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<Product>,

    pub id: i64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub eula_url: String,
    #[serde(rename = "former_identifier", skip_serializing_if = "String::is_empty")]
    pub former_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub product_type: String,
    #[serde(rename = "shortname", skip_serializing_if = "String::is_empty")]
    pub short_name: String,
    #[serde(rename = "name", skip_serializing_if = "String::is_empty")]
    pub long_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub release_stage: String,
}

impl ProductIdentity for Product {
    fn identifier(&self) -> &str {
        &self.name
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn arch(&self) -> &str {
        &self.arch
    }
}

impl Product {
    /// Create a product from its identity
    pub fn new(name: impl Into<String>, version: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            arch: arch.into(),
            ..Self::default()
        }
    }

    /// Parse `name/version/arch`
    pub fn from_triplet(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(TRIPLET_SEPARATOR).collect();
        let valid = parts.len() == 3
            && parts
                .iter()
                .all(|p| !p.is_empty() && !p.chars().any(char::is_whitespace));
        if !valid {
            return Err(Error::InvalidTriplet(s.to_string()));
        }
        Ok(Self::new(parts[0], parts[1], parts[2]))
    }

    /// `VERSION[-RELEASE]`
    pub fn edition(&self) -> String {
        if self.release.is_empty() {
            self.version.clone()
        } else {
            format!("{}-{}", self.version, self.release)
        }
    }

    pub fn distro_target(&self) -> String {
        distro_target(&self.name, &self.version, &self.arch)
    }

    /// Query parameters identifying this product in the remote catalog
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        vec![
            ("identifier", self.name.clone()),
            ("version", self.version.clone()),
            ("arch", self.arch.clone()),
            ("release_type", self.release_type.clone()),
        ]
    }

    /// All nested extensions, depth-first, parents before children
    pub fn flatten_extensions(&self) -> Vec<Product> {
        let mut all = Vec::new();
        for extension in &self.extensions {
            all.push(extension.clone());
            all.extend(extension.flatten_extensions());
        }
        all
    }

    /// Find a nested extension with the same triplet as `query`
    pub fn find_extension(&self, query: &impl ProductIdentity) -> Option<&Product> {
        let wanted = query.to_triplet();
        for extension in &self.extensions {
            if extension.to_triplet() == wanted {
                return Some(extension);
            }
            if let Some(found) = extension.find_extension(query) {
                return Some(found);
            }
        }
        None
    }
}

/// Wire shape of a product in registration service responses
///
/// Servers disagree on a few fields: only some send `available` (absent
/// means available), the base flag arrives as `isbase`, `base`, or
/// `product_type = "base"`, and `id` may be a number or a numeric string.
#[derive(Deserialize)]
struct ApiProduct {
    #[serde(default)]
    identifier: String,
    #[serde(default)]
    version: String,
    #[serde(default)]
    arch: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    isbase: bool,
    #[serde(default)]
    base: bool,
    #[serde(default)]
    friendly_name: String,
    #[serde(default)]
    release_type: Option<String>,
    #[serde(default = "default_available")]
    available: bool,
    #[serde(default)]
    free: bool,
    #[serde(default)]
    recommended: bool,
    #[serde(default)]
    extensions: Option<Vec<Product>>,
    #[serde(default, deserialize_with = "deserialize_id")]
    id: i64,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    eula_url: Option<String>,
    #[serde(default)]
    former_identifier: Option<String>,
    #[serde(default)]
    product_type: Option<String>,
    #[serde(default)]
    shortname: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    release_stage: Option<String>,
}

fn default_available() -> bool {
    true
}

fn deserialize_id<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<i64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Int(i64),
        Str(String),
        Null(()),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Int(id) => id,
        Id::Str(s) => s.trim().parse().unwrap_or(0),
        Id::Null(()) => 0,
    })
}

impl From<ApiProduct> for Product {
    fn from(p: ApiProduct) -> Self {
        let product_type = p.product_type.unwrap_or_default();
        Product {
            is_base: p.isbase || p.base || product_type == "base",
            name: p.identifier,
            version: p.version,
            arch: p.arch,
            release: String::new(),
            summary: p.summary,
            friendly_name: p.friendly_name,
            release_type: p.release_type.unwrap_or_default(),
            product_line: String::new(),
            available: p.available,
            free: p.free,
            recommended: p.recommended,
            extensions: p.extensions.unwrap_or_default(),
            id: p.id,
            description: p.description.unwrap_or_default(),
            eula_url: p.eula_url.unwrap_or_default(),
            former_name: p.former_identifier.unwrap_or_default(),
            product_type,
            short_name: p.shortname.unwrap_or_default(),
            long_name: p.name.unwrap_or_default(),
            release_stage: p.release_stage.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_triplet() {
        let product = Product::new("SLES", "15.2", "x86_64");
        assert_eq!(product.to_triplet(), "SLES/15.2/x86_64");
    }

    #[test]
    fn test_triplet_is_case_sensitive() {
        let upper = Product::new("SLES", "15.2", "x86_64");
        let lower = Product::new("sles", "15.2", "x86_64");
        assert_ne!(upper.to_triplet(), lower.to_triplet());
    }

    #[test]
    fn test_triplet_keeps_fields_verbatim() {
        let product = Product::new(" SLES", "15.2 ", "x86_64");
        assert_eq!(product.to_triplet(), " SLES/15.2 /x86_64");
    }

    #[test]
    fn test_triplet_distinguishes_components() {
        let a = Product::new("sle-module-web", "15.2", "x86_64");
        let b = Product::new("sle-module-web", "15.2", "aarch64");
        let c = Product::new("sle-module-web", "15.3", "x86_64");
        assert_ne!(a.to_triplet(), b.to_triplet());
        assert_ne!(a.to_triplet(), c.to_triplet());
    }

    #[test]
    fn test_distro_target() {
        assert_eq!(distro_target("SLES", "15.2", "x86_64"), "sle-15-x86_64");
        assert_eq!(
            distro_target("sle-module-basesystem", "15.2", "x86_64"),
            "sle-15-x86_64"
        );
        assert_eq!(distro_target("openSUSE", "15.3", "aarch64"), "opensuse-15-aarch64");
        assert_eq!(distro_target("SUSE-MicroOS", "5.0", "x86_64"), "suse-microos-5-x86_64");
        assert_eq!(Product::new("SLED", "12", "x86_64").distro_target(), "sle-12-x86_64");
    }

    #[test]
    fn test_from_triplet() {
        let product = Product::from_triplet("sle-module-live-patching/15.2/x86_64").unwrap();
        assert_eq!(product.name, "sle-module-live-patching");
        assert_eq!(product.version, "15.2");
        assert_eq!(product.arch, "x86_64");
    }

    #[test]
    fn test_from_triplet_invalid() {
        for input in ["", "SLES", "SLES/15.2", "SLES//x86_64", "SLES/15 2/x86_64", "a/b/c/d"] {
            assert!(
                matches!(Product::from_triplet(input), Err(Error::InvalidTriplet(_))),
                "{input:?}"
            );
        }
    }

    #[test]
    fn test_edition() {
        let mut product = Product::new("SLES", "15.2", "x86_64");
        assert_eq!(product.edition(), "15.2");
        product.release = "0".to_string();
        assert_eq!(product.edition(), "15.2-0");
    }

    #[test]
    fn test_deserialize_api_product() {
        let json = r#"{
            "id": 1939,
            "identifier": "SLES",
            "version": "15.2",
            "arch": "x86_64",
            "friendly_name": "SUSE Linux Enterprise Server 15 SP2 x86_64",
            "name": "SUSE Linux Enterprise Server",
            "product_type": "base",
            "free": false,
            "extensions": [
                {"id": "1946", "identifier": "sle-module-basesystem", "version": "15.2",
                 "arch": "x86_64", "friendly_name": "Basesystem Module", "free": true,
                 "available": false, "extensions": null}
            ]
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, 1939);
        assert_eq!(product.name, "SLES");
        assert_eq!(product.long_name, "SUSE Linux Enterprise Server");
        assert!(product.is_base);
        assert!(product.available);
        assert_eq!(product.extensions.len(), 1);

        let module = &product.extensions[0];
        assert_eq!(module.id, 1946);
        assert!(module.free);
        assert!(!module.available);
        assert!(!module.is_base);
        assert!(module.extensions.is_empty());
    }

    #[test]
    fn test_deserialize_null_id() {
        let product: Product =
            serde_json::from_str(r#"{"id": null, "identifier": "SLES", "version": "15.2", "arch": "x86_64"}"#)
                .unwrap();
        assert_eq!(product.id, 0);
        assert_eq!(product.name, "SLES");
    }

    #[test]
    fn test_deserialize_base_flag_variants() {
        let isbase: Product = serde_json::from_str(r#"{"identifier": "a", "isbase": true}"#).unwrap();
        let base: Product = serde_json::from_str(r#"{"identifier": "a", "base": true}"#).unwrap();
        let neither: Product = serde_json::from_str(r#"{"identifier": "a"}"#).unwrap();
        assert!(isbase.is_base);
        assert!(base.is_base);
        assert!(!neither.is_base);
    }

    fn catalog() -> Product {
        let mut containers = Product::new("sle-module-containers", "15.2", "x86_64");
        containers.extensions = vec![Product::new("sle-module-nested", "15.2", "x86_64")];
        let mut basesystem = Product::new("sle-module-basesystem", "15.2", "x86_64");
        basesystem.extensions = vec![containers];
        let mut base = Product::new("SLES", "15.2", "x86_64");
        base.extensions = vec![basesystem, Product::new("sle-we", "15.2", "x86_64")];
        base
    }

    #[test]
    fn test_flatten_extensions() {
        let names: Vec<String> = catalog()
            .flatten_extensions()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(
            names,
            vec![
                "sle-module-basesystem",
                "sle-module-containers",
                "sle-module-nested",
                "sle-we"
            ]
        );
    }

    #[test]
    fn test_find_extension() {
        let base = catalog();
        let query = Product::new("sle-module-nested", "15.2", "x86_64");
        assert_eq!(
            base.find_extension(&query).map(|p| p.name.as_str()),
            Some("sle-module-nested")
        );
        let missing = Product::new("sle-module-nested", "15.3", "x86_64");
        assert!(base.find_extension(&missing).is_none());
    }

    #[test]
    fn test_to_query() {
        let mut product = Product::new("SLES", "15.2", "x86_64");
        product.release_type = "HP-CNB".to_string();
        let query = product.to_query();
        assert_eq!(query[0], ("identifier", "SLES".to_string()));
        assert_eq!(query[3], ("release_type", "HP-CNB".to_string()));
    }
}
