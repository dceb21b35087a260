// src/registration/client.rs

//! HTTP client for the registration service
//!
//! Wraps a blocking reqwest client authenticated with the system
//! credentials. Each call is a single attempt; a non-success response is
//! reported as [`Error::Api`] with the service's own error message.

use super::credentials::CredentialsFile;
use super::RegistrationApi;
use crate::activation::Activation;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::product::Product;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{self, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use tracing::{debug, info};
use url::Url;

/// Media types understood by the v4 connect API
pub const ACCEPT_HEADER: &str = "application/json,application/vnd.scc.suse.com.v4+json";

pub const ACTIVATIONS_PATH: &str = "/connect/systems/activations";
pub const PRODUCTS_PATH: &str = "/connect/systems/products";

/// Extract the `error` field from a service error body
///
/// Bodies that are not JSON objects, or lack a string `error` field, yield
/// an empty message.
pub fn parse_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or_default()
}

/// Client for the SUSE Customer Center connect API (or a compatible proxy)
pub struct SccClient {
    client: Client,
    base_url: Url,
    credentials: CredentialsFile,
}

impl SccClient {
    /// Create a client for the service and credentials named in `config`
    pub fn new(config: &Config) -> Result<Self> {
        let base_url = Url::parse(&config.url)
            .map_err(|e| Error::Config(format!("Invalid registration URL '{}': {e}", config.url)))?;

        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static(ACCEPT_HEADER));
        if let Some(language) = &config.language {
            let value = HeaderValue::from_str(language)
                .map_err(|e| Error::Config(format!("Invalid language '{language}': {e}")))?;
            headers.insert(header::ACCEPT_LANGUAGE, value);
        }

        let client = Client::builder()
            .user_agent(concat!("prodreg/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .danger_accept_invalid_certs(config.insecure)
            .build()
            .map_err(|e| Error::Transport(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            credentials: CredentialsFile::from_config(config),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute URL of an API path
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| Error::Config(format!("Invalid API path '{path}': {e}")))
    }

    /// Authenticated GET of `path`, decoding the JSON response
    fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = self.endpoint(path)?;
        let credentials = self.credentials.read()?;
        info!("GET {}", url);

        let request = self
            .client
            .get(url.clone())
            .basic_auth(&credentials.username, Some(&credentials.password))
            .query(query);
        let body = send(request, &url)?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Send a request once, mapping non-success responses to [`Error::Api`]
fn send(request: RequestBuilder, url: &Url) -> Result<String> {
    let response = request
        .send()
        .map_err(|e| Error::Transport(format!("Request to {url} failed: {e}")))?;
    let status = response.status();
    let body = response
        .text()
        .map_err(|e| Error::Transport(format!("Failed to read response from {url}: {e}")))?;
    debug!("{} responded {}", url, status);

    if !status.is_success() {
        return Err(Error::Api {
            code: status.as_u16(),
            message: parse_error_message(&body),
        });
    }
    Ok(body)
}

impl RegistrationApi for SccClient {
    fn fetch_activations(&self) -> Result<Vec<Activation>> {
        self.get_json(ACTIVATIONS_PATH, &[])
    }

    fn fetch_catalog_entry(&self, query: &Product) -> Result<Product> {
        self.get_json(PRODUCTS_PATH, &query.to_query())
    }
}
