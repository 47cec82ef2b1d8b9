use serde::{Deserialize, Serialize};

/// Canonical inbound event, already normalized by the transport adapter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundEvent {
    pub user_id: String,
    pub kind: EventKind,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    Text(String),
    Media { media_type: MediaType, media_id: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Image,
    Document,
    Audio,
    Video,
}

impl InboundEvent {
    pub fn text(user_id: impl Into<String>, body: impl Into<String>) -> Self {
        Self { user_id: user_id.into(), kind: EventKind::Text(body.into()) }
    }

    pub fn media(
        user_id: impl Into<String>,
        media_type: MediaType,
        media_id: impl Into<String>,
    ) -> Self {
        Self { user_id: user_id.into(), kind: EventKind::Media { media_type, media_id: media_id.into() } }
    }
}
