//! Deterministic in-memory fakes for the capability traits, shared by unit
//! tests across the crate.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::capabilities::{
    DocumentRenderer, LeadStore, MessageChannel, RegistryEntry, RegistryLookup,
};
use crate::errors::{ChannelError, LookupError, RenderError, StoreError};
use crate::lead::LeadRecord;
use crate::quote::QuoteRequest;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SentMessage {
    Text { user_id: String, body: String },
    Image { user_id: String, link: String, caption: String },
    Document { user_id: String, link: String, filename: String, caption: String },
}

/// Records every outbound call; `download_media` yields a predictable local
/// link derived from the media id.
#[derive(Default)]
pub struct RecordingChannel {
    sent: Mutex<Vec<SentMessage>>,
}

impl RecordingChannel {
    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().expect("sent lock").clone()
    }
}

#[async_trait]
impl MessageChannel for RecordingChannel {
    async fn send_text(&self, user_id: &str, body: &str) -> Result<(), ChannelError> {
        self.sent
            .lock()
            .expect("sent lock")
            .push(SentMessage::Text { user_id: user_id.to_string(), body: body.to_string() });
        Ok(())
    }

    async fn send_image(
        &self,
        user_id: &str,
        link: &str,
        caption: &str,
    ) -> Result<(), ChannelError> {
        self.sent.lock().expect("sent lock").push(SentMessage::Image {
            user_id: user_id.to_string(),
            link: link.to_string(),
            caption: caption.to_string(),
        });
        Ok(())
    }

    async fn send_document(
        &self,
        user_id: &str,
        link: &str,
        filename: &str,
        caption: &str,
    ) -> Result<(), ChannelError> {
        self.sent.lock().expect("sent lock").push(SentMessage::Document {
            user_id: user_id.to_string(),
            link: link.to_string(),
            filename: filename.to_string(),
            caption: caption.to_string(),
        });
        Ok(())
    }

    async fn download_media(&self, media_id: &str) -> Result<String, ChannelError> {
        Ok(format!("/public/packing_{media_id}.bin"))
    }
}

/// Captures every render request and returns a stable document link.
#[derive(Default)]
pub struct StubRenderer {
    rendered: Mutex<Vec<QuoteRequest>>,
}

impl StubRenderer {
    pub fn rendered(&self) -> Vec<QuoteRequest> {
        self.rendered.lock().expect("rendered lock").clone()
    }
}

#[async_trait]
impl DocumentRenderer for StubRenderer {
    async fn render(&self, quote: &QuoteRequest) -> Result<String, RenderError> {
        self.rendered.lock().expect("rendered lock").push(quote.clone());
        Ok(format!("/public/{}", quote.filename()))
    }
}

#[derive(Default)]
pub struct InMemoryLeadStore {
    records: Mutex<Vec<LeadRecord>>,
}

impl InMemoryLeadStore {
    pub fn records(&self) -> Vec<LeadRecord> {
        self.records.lock().expect("records lock").clone()
    }
}

#[async_trait]
impl LeadStore for InMemoryLeadStore {
    async fn append(&self, lead: &LeadRecord) -> Result<(), StoreError> {
        self.records.lock().expect("records lock").push(lead.clone());
        Ok(())
    }
}

/// Registry fake backed by a fixed map; empty by default.
#[derive(Default)]
pub struct StubLookup {
    entries: HashMap<String, RegistryEntry>,
}

impl StubLookup {
    pub fn with_entry(tax_id: &str, entry: RegistryEntry) -> Self {
        let mut entries = HashMap::new();
        entries.insert(tax_id.to_string(), entry);
        Self { entries }
    }
}

#[async_trait]
impl RegistryLookup for StubLookup {
    async fn lookup(&self, tax_id: &str) -> Result<Option<RegistryEntry>, LookupError> {
        Ok(self.entries.get(tax_id).cloned())
    }
}

/// Registry fake that always errors, for the degraded-lookup path.
pub struct FailingLookup;

#[async_trait]
impl RegistryLookup for FailingLookup {
    async fn lookup(&self, _tax_id: &str) -> Result<Option<RegistryEntry>, LookupError> {
        Err(LookupError::Unavailable("connection refused".to_string()))
    }
}
