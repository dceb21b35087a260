// src/cli.rs
//! CLI definitions for prodreg
//!
//! This module contains the command-line interface definitions using clap.
//! The command implementations are in the `commands` module.

use clap::{Parser, Subcommand};
use prodreg::DEFAULT_CONFIG_PATH;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "prodreg")]
#[command(version)]
#[command(about = "Report registration status of installed products", long_about = None)]
pub struct Cli {
    /// Configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Operate on an alternate filesystem root
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Registration service URL
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Log debug output to stderr
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show registration status of installed products
    Status {
        /// Human readable output instead of JSON
        #[arg(long)]
        text: bool,
    },

    /// List extensions available for the base product
    ListExtensions {
        /// JSON output instead of the indented list
        #[arg(long)]
        json: bool,
    },

    /// List installed and activated products
    Products,
}
