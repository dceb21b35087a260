// src/commands/status.rs

//! Registration status report

use super::Backend;
use anyhow::{Context, Result};
use prodreg::{get_statuses, Config, Status};
use std::fmt;

const RULE: &str = "------------------------------------------------------------------------";

/// Print the status of every installed product as JSON or text
pub fn cmd_status(config: &Config, text: bool) -> Result<()> {
    let backend = Backend::new(config)?;
    let statuses = get_statuses(&backend.zypper, &backend.api, &backend.state)
        .context("Failed to collect product statuses")?;

    if text {
        print!("{}", render_status_text(&statuses));
    } else {
        println!("{}", serde_json::to_string(&statuses)?);
    }
    Ok(())
}

/// Boxed text report, one block per product
pub fn render_status_text(statuses: &[Status]) -> String {
    StatusReport(statuses).to_string()
}

struct StatusReport<'a>(&'a [Status]);

impl fmt::Display for StatusReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Installed Products:")?;
        writeln!(f, "{RULE}")?;

        for status in self.0 {
            let title = if status.summary.is_empty() {
                &status.identifier
            } else {
                &status.summary
            };
            writeln!(f)?;
            writeln!(f, "  {title}")?;
            writeln!(f, "  ({}/{}/{})", status.identifier, status.version, status.arch)?;
            writeln!(f)?;
            writeln!(f, "  {}", status.status)?;

            if let Some(reg_code) = &status.reg_code {
                writeln!(f)?;
                writeln!(f, "    Subscription:")?;
                writeln!(f)?;
                writeln!(f, "    Regcode: {reg_code}")?;
                let fields = [
                    ("Starts at", &status.starts_at),
                    ("Expires at", &status.expires_at),
                    ("Status", &status.sub_status),
                    ("Type", &status.kind),
                ];
                for (label, value) in fields {
                    if let Some(value) = value {
                        writeln!(f, "    {label}: {value}")?;
                    }
                }
            }
            writeln!(f)?;
            writeln!(f, "{RULE}")?;
        }
        Ok(())
    }
}
