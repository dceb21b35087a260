// src/commands/products.rs

//! Installed and activated product listing

use super::Backend;
use anyhow::{Context, Result};
use prodreg::{system_products, Config, Product, ProductIdentity};

/// Print every product known to this system
pub fn cmd_products(config: &Config) -> Result<()> {
    let backend = Backend::new(config)?;
    let products = system_products(&backend.zypper, &backend.api, &backend.state)
        .context("Failed to collect system products")?;
    print!("{}", render_products_text(&products));
    Ok(())
}

/// One line per product: triplet, then the summary or friendly name
pub fn render_products_text(products: &[Product]) -> String {
    let width = products
        .iter()
        .map(|p| p.to_triplet().len())
        .max()
        .unwrap_or(0);

    products.iter().fold(String::new(), |mut out, product| {
        let label = if product.summary.is_empty() {
            &product.friendly_name
        } else {
            &product.summary
        };
        let base = if product.is_base { " [base]" } else { "" };
        let line = format!("{:<width$}  {label}{base}", product.to_triplet());
        out.push_str(line.trim_end());
        out.push('\n');
        out
    })
}
