// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use prodreg::{Activation, Error, Product, RegistrationApi, RegistrationState, Result, Zypper};
use std::cell::Cell;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// `zypper products -i` listing with a base product and one module
pub const PRODUCTS_XML: &str = r#"<?xml version='1.0'?>
<stream>
<message type="info">Loading repository data...</message>
<product-list>
<product name="SLES" version="15.2" release="0" epoch="0" arch="x86_64" vendor="SUSE" summary="SUSE Linux Enterprise Server 15 SP2" repo="@System" productline="sles" registerrelease="" shortname="SLES15-SP2" flavor="" isbase="true" installed="true"><endoflife time_t="1704153600" text="2024-01-02T01:00:00+01"/><registerflavor/><description>SUSE Linux Enterprise offers a comprehensive suite of products.</description></product>
<product name="sle-module-basesystem" version="15.2" release="0" epoch="0" arch="x86_64" vendor="SUSE" summary="SUSE Linux Enterprise Basesystem Module 15 SP2" repo="@System" productline="" registerrelease="" shortname="Basesystem-Module" flavor="" isbase="false" installed="true"><endoflife time_t="0" text="1970-01-01T01:00:00+01"/><registerflavor>module</registerflavor><description>The SUSE Linux Enterprise Basesystem Module delivers the base system.</description></product>
</product-list>
</stream>
"#;

/// A stand-in zypper executable in a temporary directory
///
/// The script records its arguments one per line, prints the configured
/// stdout and stderr, then exits with the configured code.
pub struct FakeZypper {
    pub dir: TempDir,
    pub binary: PathBuf,
    args_log: PathBuf,
}

impl FakeZypper {
    pub fn new(stdout: &str, stderr: &str, exit_code: i32) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let stdout_path = dir.path().join("stdout");
        let stderr_path = dir.path().join("stderr");
        let args_log = dir.path().join("args");
        let binary = dir.path().join("zypper");

        fs::write(&stdout_path, stdout).unwrap();
        fs::write(&stderr_path, stderr).unwrap();
        let script = format!(
            "#!/bin/sh\nprintf '%s\\n' \"$@\" > '{}'\ncat '{}'\ncat '{}' >&2\nexit {}\n",
            args_log.display(),
            stdout_path.display(),
            stderr_path.display(),
            exit_code
        );
        fs::write(&binary, script).unwrap();
        fs::set_permissions(&binary, fs::Permissions::from_mode(0o755)).unwrap();

        Self {
            dir,
            binary,
            args_log,
        }
    }

    /// zypper listing [`PRODUCTS_XML`] successfully
    pub fn with_products() -> Self {
        Self::new(PRODUCTS_XML, "", 0)
    }

    pub fn zypper(&self) -> Zypper {
        Zypper::new().with_binary(&self.binary)
    }

    /// Arguments of the last invocation, `None` if never invoked
    pub fn recorded_args(&self) -> Option<Vec<String>> {
        let content = fs::read_to_string(&self.args_log).ok()?;
        Some(content.lines().map(str::to_string).collect())
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

pub fn paid_activation(name: &str, version: &str, arch: &str, reg_code: &str) -> Activation {
    let json = format!(
        r#"{{
            "regcode": "{reg_code}",
            "type": "full",
            "status": "ACTIVE",
            "starts_at": "2020-05-14T00:00:00.000Z",
            "expires_at": "2025-05-14T00:00:00.000Z",
            "service": {{
                "product": {{"identifier": "{name}", "version": "{version}", "arch": "{arch}", "free": false}}
            }}
        }}"#
    );
    serde_json::from_str(&json).unwrap()
}

pub fn free_activation(name: &str, version: &str, arch: &str) -> Activation {
    let mut activation = Activation::default();
    activation.status = "ACTIVE".to_string();
    activation.service.product = Product::new(name, version, arch);
    activation.service.product.free = true;
    activation
}

pub fn catalog_product(name: &str, friendly_name: &str, extensions: Vec<Product>) -> Product {
    let mut product = Product::new(name, "15.2", "x86_64");
    product.friendly_name = friendly_name.to_string();
    product.available = true;
    product.extensions = extensions;
    product
}

/// In-memory registration service
#[derive(Default)]
pub struct MockApi {
    pub activations: Vec<Activation>,
    pub catalog: Product,
    pub activations_error: Option<(u16, String)>,
    pub catalog_error: Option<(u16, String)>,
    pub activation_calls: Cell<usize>,
    pub catalog_queries: std::cell::RefCell<Vec<String>>,
}

impl MockApi {
    pub fn with_activations(activations: Vec<Activation>) -> Self {
        Self {
            activations,
            ..Self::default()
        }
    }
}

impl RegistrationApi for MockApi {
    fn fetch_activations(&self) -> Result<Vec<Activation>> {
        self.activation_calls.set(self.activation_calls.get() + 1);
        if let Some((code, message)) = &self.activations_error {
            return Err(Error::Api {
                code: *code,
                message: message.clone(),
            });
        }
        Ok(self.activations.clone())
    }

    fn fetch_catalog_entry(&self, query: &Product) -> Result<Product> {
        use prodreg::ProductIdentity;
        self.catalog_queries.borrow_mut().push(query.to_triplet());
        if let Some((code, message)) = &self.catalog_error {
            return Err(Error::Api {
                code: *code,
                message: message.clone(),
            });
        }
        Ok(self.catalog.clone())
    }
}

/// Fixed local registration state
pub struct MockState {
    pub registered: bool,
    pub credentials: bool,
}

impl MockState {
    pub fn registered() -> Self {
        Self {
            registered: true,
            credentials: true,
        }
    }

    pub fn unregistered() -> Self {
        Self {
            registered: false,
            credentials: false,
        }
    }
}

impl RegistrationState for MockState {
    fn is_registered(&self) -> bool {
        self.registered
    }

    fn credentials_exist(&self) -> bool {
        self.credentials
    }
}
