//! Graph API client implementing the core `MessageChannel` capability.

use std::path::PathBuf;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use freightbot_core::{ChannelError, MessageChannel};

pub struct WhatsAppClient {
    http: reqwest::Client,
    graph_base_url: String,
    phone_number_id: String,
    api_token: SecretString,
    /// Directory downloaded media lands in, served at `/public`.
    public_dir: PathBuf,
    /// External base URL used to absolutize `/public/...` links before they
    /// go out over the channel.
    public_base_url: String,
}

impl WhatsAppClient {
    pub fn new(
        graph_base_url: impl Into<String>,
        phone_number_id: impl Into<String>,
        api_token: SecretString,
        public_dir: PathBuf,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            graph_base_url: graph_base_url.into(),
            phone_number_id: phone_number_id.into(),
            api_token,
            public_dir,
            public_base_url: public_base_url.into(),
        }
    }

    async fn send_message(&self, payload: Value) -> Result<(), ChannelError> {
        let url = format!("{}/{}/messages", self.graph_base_url, self.phone_number_id);
        let response = self
            .http
            .post(&url)
            .bearer_auth(self.api_token.expose_secret())
            .json(&payload)
            .send()
            .await
            .map_err(|error| ChannelError::Transport(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ChannelError::Api { status: status.as_u16(), message });
        }
        debug!(event_name = "whatsapp.message_sent", "outbound message accepted");
        Ok(())
    }

    fn absolute(&self, link: &str) -> String {
        if link.starts_with("http://") || link.starts_with("https://") {
            link.to_string()
        } else {
            format!("{}{}", self.public_base_url.trim_end_matches('/'), link)
        }
    }
}

#[derive(Debug, Deserialize)]
struct MediaMetadata {
    url: String,
    mime_type: Option<String>,
}

#[async_trait]
impl MessageChannel for WhatsAppClient {
    async fn send_text(&self, user_id: &str, body: &str) -> Result<(), ChannelError> {
        self.send_message(text_payload(user_id, body)).await
    }

    async fn send_image(
        &self,
        user_id: &str,
        link: &str,
        caption: &str,
    ) -> Result<(), ChannelError> {
        self.send_message(image_payload(user_id, &self.absolute(link), caption)).await
    }

    async fn send_document(
        &self,
        user_id: &str,
        link: &str,
        filename: &str,
        caption: &str,
    ) -> Result<(), ChannelError> {
        self.send_message(document_payload(user_id, &self.absolute(link), filename, caption)).await
    }

    /// Two-step Graph download: media metadata, then the content itself.
    /// The file lands in the public dir and the returned link is relative to
    /// it.
    async fn download_media(&self, media_id: &str) -> Result<String, ChannelError> {
        let meta_url = format!("{}/{}", self.graph_base_url, media_id);
        let metadata: MediaMetadata = self
            .http
            .get(&meta_url)
            .bearer_auth(self.api_token.expose_secret())
            .send()
            .await
            .map_err(|error| ChannelError::Transport(error.to_string()))?
            .error_for_status()
            .map_err(|error| ChannelError::Transport(error.to_string()))?
            .json()
            .await
            .map_err(|error| ChannelError::Transport(error.to_string()))?;

        let content = self
            .http
            .get(&metadata.url)
            .bearer_auth(self.api_token.expose_secret())
            .send()
            .await
            .map_err(|error| ChannelError::Transport(error.to_string()))?
            .error_for_status()
            .map_err(|error| ChannelError::Transport(error.to_string()))?
            .bytes()
            .await
            .map_err(|error| ChannelError::Transport(error.to_string()))?;

        let name = media_filename(media_id, metadata.mime_type.as_deref());
        tokio::fs::create_dir_all(&self.public_dir).await?;
        tokio::fs::write(self.public_dir.join(&name), &content).await?;
        Ok(format!("/public/{name}"))
    }
}

fn text_payload(to: &str, body: &str) -> Value {
    json!({
        "messaging_product": "whatsapp",
        "to": to,
        "type": "text",
        "text": { "body": body }
    })
}

fn image_payload(to: &str, link: &str, caption: &str) -> Value {
    json!({
        "messaging_product": "whatsapp",
        "to": to,
        "type": "image",
        "image": { "link": link, "caption": caption }
    })
}

fn document_payload(to: &str, link: &str, filename: &str, caption: &str) -> Value {
    json!({
        "messaging_product": "whatsapp",
        "to": to,
        "type": "document",
        "document": { "link": link, "filename": filename, "caption": caption }
    })
}

fn media_filename(media_id: &str, mime_type: Option<&str>) -> String {
    let extension = mime_type.and_then(|mime| mime.split('/').nth(1)).unwrap_or("bin");
    format!("packing_{media_id}.{extension}")
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::{document_payload, media_filename, text_payload, WhatsAppClient};

    fn client(public_base_url: &str) -> WhatsAppClient {
        WhatsAppClient::new(
            "https://graph.facebook.com/v20.0",
            "12345",
            String::from("token").into(),
            PathBuf::from("public"),
            public_base_url,
        )
    }

    #[test]
    fn relative_links_are_prefixed_with_the_public_base() {
        let client = client("https://bot.example.com/");
        assert_eq!(
            client.absolute("/public/COT_1.pdf"),
            "https://bot.example.com/public/COT_1.pdf"
        );
        assert_eq!(client.absolute("https://cdn.example.com/logo.png"), "https://cdn.example.com/logo.png");
    }

    #[test]
    fn outbound_payloads_match_the_cloud_api_shapes() {
        let text = text_payload("51999000111", "hello");
        assert_eq!(text["messaging_product"], "whatsapp");
        assert_eq!(text["type"], "text");
        assert_eq!(text["text"]["body"], "hello");

        let document =
            document_payload("51999000111", "https://x/y.pdf", "COT_1.pdf", "Pre-quote");
        assert_eq!(document["document"]["filename"], "COT_1.pdf");
        assert_eq!(document["document"]["link"], "https://x/y.pdf");
    }

    #[test]
    fn media_filename_derives_extension_from_mime_type() {
        assert_eq!(media_filename("m1", Some("image/jpeg")), "packing_m1.jpeg");
        assert_eq!(media_filename("m2", Some("application/pdf")), "packing_m2.pdf");
        assert_eq!(media_filename("m3", None), "packing_m3.bin");
    }
}
