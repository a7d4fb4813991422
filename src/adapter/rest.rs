//! REST adapter
//!
//! Byte-native: values are sent and received as `application/octet-stream`
//! bodies at `<base>/<key>`. Every request carries basic credentials.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use reqwest::{StatusCode, Url};

use crate::config::{Config, Credentials};
use crate::error::{CompatError, Result};
use crate::protocol::ProtocolKind;

use super::{CacheAdapter, Lookup};

const PROTOCOL: ProtocolKind = ProtocolKind::Rest;
const OCTET_STREAM: &str = "application/octet-stream";

/// Client for one cache's REST resource
pub struct RestAdapter {
    /// `None` once released
    client: Option<Client>,

    /// Cache resource, e.g. `http://localhost:8080/rest/compat`
    base_url: Url,

    credentials: Credentials,
}

impl RestAdapter {
    /// Build a client for the configured REST endpoint
    pub fn connect(config: &Config) -> Result<Self> {
        Self::new(
            &config.rest_base_url(),
            config.credentials.clone(),
            config.rest_timeout_ms,
        )
    }

    /// Build a client for an explicit base URL (timeout 0 = none)
    pub fn new(base_url: &str, credentials: Credentials, timeout_ms: u64) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| CompatError::Config(format!("invalid REST base URL {base_url:?}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(CompatError::Config(format!(
                "REST base URL cannot hold key paths: {base_url}"
            )));
        }

        let timeout = (timeout_ms > 0).then(|| Duration::from_millis(timeout_ms));
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                CompatError::communication(PROTOCOL, format!("failed to create HTTP client: {e}"))
            })?;

        tracing::debug!("REST client ready for {}", base_url);

        Ok(Self {
            client: Some(client),
            base_url,
            credentials,
        })
    }

    /// Base URL of the cache resource
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resource URL for `key`; the key becomes a single path segment
    pub fn key_url(&self, key: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| CompatError::Config(format!("cannot append key to {}", self.base_url)))?
            .pop_if_empty()
            .push(key);
        Ok(url)
    }

    fn client(&self) -> Result<&Client> {
        self.client
            .as_ref()
            .ok_or_else(|| CompatError::communication(PROTOCOL, "client already closed"))
    }
}

fn transport(e: reqwest::Error) -> CompatError {
    CompatError::communication(PROTOCOL, e.to_string())
}

impl CacheAdapter for RestAdapter {
    fn protocol(&self) -> ProtocolKind {
        PROTOCOL
    }

    fn put(&mut self, key: &str, value: &[u8]) -> Result<()> {
        let url = self.key_url(key)?;
        tracing::trace!("REST PUT {} ({} bytes)", url, value.len());

        let response = self
            .client()?
            .put(url.clone())
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .header(CONTENT_TYPE, OCTET_STREAM)
            .body(value.to_vec())
            .send()
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(CompatError::UnexpectedStatus {
                method: "PUT".to_string(),
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(())
    }

    fn get(&mut self, key: &str) -> Result<Lookup> {
        let url = self.key_url(key)?;
        tracing::trace!("REST GET {}", url);

        let response = self
            .client()?
            .get(url.clone())
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .send()
            .map_err(transport)?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(CompatError::UnexpectedStatus {
                method: "GET".to_string(),
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().map_err(transport)?;
        Ok(Lookup::Found(body.to_vec()))
    }

    fn close(&mut self) -> Result<()> {
        if self.client.take().is_some() {
            tracing::debug!("REST client for {} released", self.base_url);
        }
        Ok(())
    }
}

impl Drop for RestAdapter {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
