//! Webhook payload normalization and the subscription verify handshake.

use serde::Deserialize;
use serde_json::Value;

use freightbot_core::{EventKind, InboundEvent, MediaType};

/// Query parameters of the Graph API verification GET.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct VerifyParams {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VerifyResponse {
    /// Echo the challenge back with a 200.
    Challenge(String),
    /// Token mismatch or malformed request: 403.
    Forbidden,
}

/// One-time channel setup handshake, gated by the shared verify token.
pub fn verify_subscription(params: &VerifyParams, expected_token: &str) -> VerifyResponse {
    match (&params.mode, &params.verify_token, &params.challenge) {
        (Some(mode), Some(token), Some(challenge))
            if mode == "subscribe" && token == expected_token =>
        {
            VerifyResponse::Challenge(challenge.clone())
        }
        _ => VerifyResponse::Forbidden,
    }
}

#[derive(Debug, Deserialize)]
struct WebhookPayload {
    #[serde(default)]
    entry: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    #[serde(default)]
    changes: Vec<Change>,
}

#[derive(Debug, Deserialize)]
struct Change {
    #[serde(default)]
    value: ChangeValue,
}

#[derive(Debug, Default, Deserialize)]
struct ChangeValue {
    #[serde(default)]
    messages: Vec<Message>,
}

#[derive(Debug, Deserialize)]
struct Message {
    from: String,
    #[serde(rename = "type")]
    message_type: String,
    text: Option<TextBody>,
    image: Option<MediaBody>,
    document: Option<MediaBody>,
    audio: Option<MediaBody>,
    video: Option<MediaBody>,
}

#[derive(Debug, Deserialize)]
struct TextBody {
    body: String,
}

#[derive(Debug, Deserialize)]
struct MediaBody {
    id: String,
}

/// Extracts the first message of the delivery and maps it onto the canonical
/// event model. Status updates, unsupported types, and empty deliveries
/// yield `None`: the webhook acknowledges them without engaging the engine.
pub fn normalize_webhook_payload(payload: &Value) -> Option<InboundEvent> {
    let payload: WebhookPayload = serde_json::from_value(payload.clone()).ok()?;
    let message = payload.entry.into_iter().next()?.changes.into_iter().next()?.value.messages
        .into_iter()
        .next()?;

    let kind = match message.message_type.as_str() {
        "text" => EventKind::Text(message.text?.body.trim().to_string()),
        "image" => media_kind(MediaType::Image, message.image)?,
        "document" => media_kind(MediaType::Document, message.document)?,
        "audio" => media_kind(MediaType::Audio, message.audio)?,
        "video" => media_kind(MediaType::Video, message.video)?,
        _ => return None,
    };

    Some(InboundEvent { user_id: message.from, kind })
}

fn media_kind(media_type: MediaType, body: Option<MediaBody>) -> Option<EventKind> {
    Some(EventKind::Media { media_type, media_id: body?.id })
}
