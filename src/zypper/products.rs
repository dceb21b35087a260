// src/zypper/products.rs

//! Parsing of `zypper --xmlout products` output
//!
//! zypper reports one `<product>` element per product inside
//! `<stream><product-list>`, with all interesting fields as attributes:
//!
//! ```xml
//! <stream>
//!   <product-list>
//!     <product name="SLES" version="15.2" release="0" arch="x86_64"
//!              summary="SUSE Linux Enterprise Server 15 SP2"
//!              productline="sles" registerrelease="" isbase="true">
//!       <description>...</description>
//!     </product>
//!   </product-list>
//! </stream>
//! ```
//!
//! Versions are kept as opaque strings.

use crate::error::{Error, Result};
use crate::product::Product;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Directory holding OEM release-type overrides, relative to the root
pub const OEM_PATH: &str = "var/lib/suseRegister/OEM";

#[derive(Debug, Deserialize)]
struct ProductStream {
    #[serde(rename = "product-list", default)]
    product_list: ProductList,
}

#[derive(Debug, Default, Deserialize)]
struct ProductList {
    #[serde(rename = "product", default)]
    products: Vec<ZypperProduct>,
}

#[derive(Debug, Deserialize)]
struct ZypperProduct {
    #[serde(rename = "@name", default)]
    name: String,
    #[serde(rename = "@version", default)]
    version: String,
    #[serde(rename = "@arch", default)]
    arch: String,
    #[serde(rename = "@release", default)]
    release: String,
    #[serde(rename = "@summary", default)]
    summary: String,
    #[serde(rename = "@isbase", default)]
    is_base: bool,
    #[serde(rename = "@registerrelease", default)]
    release_type: String,
    #[serde(rename = "@productline", default)]
    product_line: String,
    #[serde(default)]
    description: String,
}

impl From<ZypperProduct> for Product {
    fn from(p: ZypperProduct) -> Self {
        Product {
            name: p.name,
            version: p.version,
            arch: p.arch,
            release: p.release,
            summary: p.summary,
            is_base: p.is_base,
            release_type: p.release_type,
            product_line: p.product_line,
            description: p.description,
            ..Product::default()
        }
    }
}

/// Parse the product listing, preserving zypper's order
pub fn parse_products_xml(xml: &[u8]) -> Result<Vec<Product>> {
    let stream: ProductStream = quick_xml::de::from_reader(xml)?;
    Ok(stream
        .product_list
        .products
        .into_iter()
        .map(Product::from)
        .collect())
}

/// First product in `products` flagged as base
///
/// A listing without any base product means the system is inconsistent or
/// unsupported, which is reported as [`Error::BaseProductNotFound`].
pub fn select_base_product(products: &[Product]) -> Result<Product> {
    products
        .iter()
        .find(|p| p.is_base)
        .cloned()
        .ok_or(Error::BaseProductNotFound)
}

/// Replace release types with OEM overrides found under `root`
///
/// The override for a product lives in `<root>/var/lib/suseRegister/OEM/<productline>`;
/// its first line is the release type. Products without a product line or
/// without an override file are left untouched.
pub fn apply_oem_release_types(products: &mut [Product], root: &Path) {
    for product in products.iter_mut() {
        if let Some(release_type) = oem_release_type(root, &product.product_line) {
            debug!(
                "Using OEM release type '{}' for {}",
                release_type, product.name
            );
            product.release_type = release_type;
        }
    }
}

fn oem_release_type(root: &Path, product_line: &str) -> Option<String> {
    if product_line.is_empty() {
        return None;
    }
    let path = root.join(OEM_PATH).join(product_line);
    let content = fs::read_to_string(&path).ok()?;
    content.lines().next().map(|line| line.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::ProductIdentity;

    const PRODUCTS_XML: &str = r#"<?xml version='1.0'?>
<stream>
<message type="info">Loading repository data...</message>
<product-list>
<product name="SUSE-MicroOS" version="5.0" release="1" epoch="0" arch="x86_64" vendor="SUSE" summary="SUSE Linux Enterprise Micro 5.0" repo="@System" productline="SUSE-MicroOS" registerrelease="" shortname="SUSE Linux Enterprise Micro" flavor="" isbase="true" installed="true"><endoflife time_t="0" text="1970-01-01T01:00:00+01"/><registerflavor/><description>SUSE Linux Enterprise Micro is an ultra-reliable, lightweight operating system.</description></product>
<product name="sle-module-basesystem" version="15.2" release="0" epoch="0" arch="x86_64" vendor="SUSE" summary="SUSE Linux Enterprise Basesystem Module 15 SP2" repo="@System" productline="" registerrelease="" shortname="Basesystem-Module" flavor="" isbase="false" installed="true"><endoflife time_t="0" text="1970-01-01T01:00:00+01"/><registerflavor>module</registerflavor><description>Basesystem Module</description></product>
</product-list>
</stream>"#;

    #[test]
    fn test_parse_products_xml() {
        let products = parse_products_xml(PRODUCTS_XML.as_bytes()).unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].to_triplet(), "SUSE-MicroOS/5.0/x86_64");
        assert_eq!(products[0].summary, "SUSE Linux Enterprise Micro 5.0");
        assert_eq!(products[0].release, "1");
        assert_eq!(products[0].product_line, "SUSE-MicroOS");
        assert!(products[0].is_base);
        assert!(products[0].description.starts_with("SUSE Linux Enterprise Micro"));
        assert_eq!(products[1].to_triplet(), "sle-module-basesystem/15.2/x86_64");
        assert!(!products[1].is_base);
    }

    #[test]
    fn test_parse_products_xml_without_list() {
        let products = parse_products_xml(b"<stream></stream>").unwrap();
        assert!(products.is_empty());
    }

    #[test]
    fn test_parse_products_xml_malformed() {
        let err = parse_products_xml(b"<stream><product-list><product name=").unwrap_err();
        assert!(matches!(err, Error::ProductsXml(_)));
    }

    #[test]
    fn test_parse_products_xml_empty_input() {
        assert!(parse_products_xml(b"").is_err());
    }

    #[test]
    fn test_select_base_product() {
        let products = parse_products_xml(PRODUCTS_XML.as_bytes()).unwrap();
        let base = select_base_product(&products).unwrap();
        assert_eq!(base.to_triplet(), "SUSE-MicroOS/5.0/x86_64");
    }

    #[test]
    fn test_select_base_product_first_wins() {
        let products = vec![
            Product::new("sle-module-basesystem", "15.2", "x86_64"),
            Product {
                is_base: true,
                ..Product::new("SLES", "15.2", "x86_64")
            },
            Product {
                is_base: true,
                ..Product::new("SLED", "15.2", "x86_64")
            },
        ];
        assert_eq!(select_base_product(&products).unwrap().name, "SLES");
    }

    #[test]
    fn test_select_base_product_none() {
        let products = vec![Product::new("sle-module-basesystem", "15.2", "x86_64")];
        assert!(matches!(
            select_base_product(&products),
            Err(Error::BaseProductNotFound)
        ));
        assert!(matches!(select_base_product(&[]), Err(Error::BaseProductNotFound)));
    }

    #[test]
    fn test_apply_oem_release_types() {
        let root = tempfile::tempdir().unwrap();
        let oem_dir = root.path().join(OEM_PATH);
        fs::create_dir_all(&oem_dir).unwrap();
        fs::write(oem_dir.join("sles"), "OEM-2024  \nsecond line\n").unwrap();

        let mut products = vec![
            Product {
                product_line: "sles".to_string(),
                release_type: "GA".to_string(),
                ..Product::new("SLES", "15.2", "x86_64")
            },
            Product {
                product_line: "sled".to_string(),
                release_type: "GA".to_string(),
                ..Product::new("SLED", "15.2", "x86_64")
            },
            Product::new("sle-module-basesystem", "15.2", "x86_64"),
        ];
        apply_oem_release_types(&mut products, root.path());

        assert_eq!(products[0].release_type, "OEM-2024");
        assert_eq!(products[1].release_type, "GA");
        assert_eq!(products[2].release_type, "");
    }
}
