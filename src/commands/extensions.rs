// src/commands/extensions.rs

//! Extension listing

use super::Backend;
use anyhow::{Context, Result};
use prodreg::{list_extensions, Config, DisplayExtension};
use std::fmt;

/// Print the extension tree of the base product
pub fn cmd_list_extensions(config: &Config, json: bool) -> Result<()> {
    let backend = Backend::new(config)?;
    let tree = list_extensions(&backend.zypper, &backend.api, &backend.state)
        .context("Failed to list extensions")?;

    if json {
        println!("{}", serde_json::to_string(&tree)?);
    } else {
        print!("{}", render_extensions_text(&tree));
    }
    Ok(())
}

/// Indented list of all extensions below `tree`, children after their parent
pub fn render_extensions_text(tree: &DisplayExtension) -> String {
    ExtensionList(tree).to_string()
}

struct ExtensionList<'a>(&'a DisplayExtension);

impl fmt::Display for ExtensionList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "AVAILABLE EXTENSIONS AND MODULES")?;
        writeln!(f)?;
        for node in self.0.descendants() {
            let indent = node.indent();
            let marker = if node.activated {
                " (Activated)"
            } else if !node.product.available {
                " (Not available)"
            } else {
                ""
            };
            writeln!(f, "{indent}{}{marker}", node.display_name())?;
            writeln!(f, "{indent}Product code: {}", node.triplet)?;
            writeln!(f)?;
        }
        Ok(())
    }
}
