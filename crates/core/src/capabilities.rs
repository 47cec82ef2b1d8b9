//! Capability seams of the intake flow. The engine and assembler are generic
//! over these traits so transports, renderers, and stores can be swapped for
//! deterministic fakes in tests.

use async_trait::async_trait;

use crate::errors::{ChannelError, LookupError, RenderError, StoreError};
use crate::lead::LeadRecord;
use crate::quote::QuoteRequest;

/// Outbound messaging plus media retrieval for one transport.
#[async_trait]
pub trait MessageChannel: Send + Sync {
    async fn send_text(&self, user_id: &str, body: &str) -> Result<(), ChannelError>;
    async fn send_image(&self, user_id: &str, link: &str, caption: &str)
        -> Result<(), ChannelError>;
    async fn send_document(
        &self,
        user_id: &str,
        link: &str,
        filename: &str,
        caption: &str,
    ) -> Result<(), ChannelError>;
    /// Downloads transport-held media and returns a retrievable local link.
    async fn download_media(&self, media_id: &str) -> Result<String, ChannelError>;
}

/// Renders a quote request into a retrievable document link.
#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    async fn render(&self, quote: &QuoteRequest) -> Result<String, RenderError>;
}

/// Append-only lead persistence.
#[async_trait]
pub trait LeadStore: Send + Sync {
    async fn append(&self, lead: &LeadRecord) -> Result<(), StoreError>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegistryEntry {
    pub legal_name: String,
    pub address: Option<String>,
}

/// Optional enrichment of a tax identifier into a registered legal name.
/// Absence and failure are equivalent to the caller.
#[async_trait]
pub trait RegistryLookup: Send + Sync {
    async fn lookup(&self, tax_id: &str) -> Result<Option<RegistryEntry>, LookupError>;
}

/// Lookup that always reports absence, for deployments without a registry
/// endpoint configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopRegistryLookup;

#[async_trait]
impl RegistryLookup for NoopRegistryLookup {
    async fn lookup(&self, _tax_id: &str) -> Result<Option<RegistryEntry>, LookupError> {
        Ok(None)
    }
}
