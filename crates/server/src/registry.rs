//! Company-registry enrichment over HTTP.
//!
//! Looks up a tax ID against an external registry endpoint and returns the
//! registered legal name and fiscal address. The endpoint is optional:
//! without one, lookups resolve to `None` and the intake keeps whatever the
//! client typed.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use freightbot_core::{LookupError, RegistryEntry, RegistryLookup};

pub struct HttpRegistryLookup {
    http: reqwest::Client,
    lookup_url: Option<String>,
}

impl HttpRegistryLookup {
    pub fn new(lookup_url: Option<String>) -> Self {
        Self { http: reqwest::Client::new(), lookup_url }
    }
}

#[derive(Debug, Deserialize)]
struct RegistryPayload {
    #[serde(rename = "razonSocial")]
    legal_name: Option<String>,
    #[serde(rename = "direccion")]
    address: Option<String>,
}

#[async_trait]
impl RegistryLookup for HttpRegistryLookup {
    async fn lookup(&self, tax_id: &str) -> Result<Option<RegistryEntry>, LookupError> {
        let Some(base) = &self.lookup_url else {
            return Ok(None);
        };

        let response = self
            .http
            .get(base)
            .query(&[("ruc", tax_id)])
            .send()
            .await
            .map_err(|error| LookupError::Unavailable(error.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(LookupError::Unavailable(format!("registry returned {status}")));
        }

        let payload: RegistryPayload =
            response.json().await.map_err(|error| LookupError::Unavailable(error.to_string()))?;

        let Some(legal_name) = payload.legal_name.filter(|name| !name.trim().is_empty()) else {
            debug!(event_name = "registry.no_match", tax_id, "registry had no record");
            return Ok(None);
        };

        Ok(Some(RegistryEntry { legal_name, address: payload.address }))
    }
}

#[cfg(test)]
mod tests {
    use freightbot_core::RegistryLookup;

    use super::HttpRegistryLookup;

    #[tokio::test]
    async fn unset_endpoint_resolves_to_no_entry() {
        let lookup = HttpRegistryLookup::new(None);
        let entry = lookup.lookup("20123456789").await.expect("lookup");
        assert!(entry.is_none());
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_reported_as_unavailable() {
        let lookup = HttpRegistryLookup::new(Some("http://127.0.0.1:9/registry".to_string()));
        let result = lookup.lookup("20123456789").await;
        assert!(result.is_err());
    }
}
