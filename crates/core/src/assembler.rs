use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::capabilities::{DocumentRenderer, MessageChannel};
use crate::errors::EngineError;
use crate::pricing;
use crate::quote::QuoteRequest;
use crate::session::SessionData;

/// Maps session data plus pricing into the render contract and orchestrates
/// the render-then-send side effect.
pub struct QuoteAssembler<R, C> {
    renderer: Arc<R>,
    channel: Arc<C>,
}

impl<R, C> QuoteAssembler<R, C>
where
    R: DocumentRenderer,
    C: MessageChannel,
{
    pub fn new(renderer: Arc<R>, channel: Arc<C>) -> Self {
        Self { renderer, channel }
    }

    pub fn assemble(
        &self,
        data: &SessionData,
        user_id: &str,
        subtotal: Decimal,
        issued_at: DateTime<Utc>,
    ) -> QuoteRequest {
        QuoteRequest::from_session(data, user_id, pricing::breakdown(subtotal), issued_at)
    }

    /// Best-effort delivery: a render or send failure propagates to the
    /// webhook boundary and is not retried here.
    pub async fn render_and_send(
        &self,
        user_id: &str,
        quote: &QuoteRequest,
        caption: &str,
    ) -> Result<(), EngineError> {
        let link = self.renderer.render(quote).await?;
        self.channel.send_document(user_id, &link, &quote.filename(), caption).await?;
        tracing::info!(
            event_name = "assembler.quote_delivered",
            user_id,
            quote_number = %quote.number,
            total = %quote.total,
            "quote document rendered and sent"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    use crate::session::SessionData;
    use crate::testkit::{RecordingChannel, SentMessage, StubRenderer};

    use super::QuoteAssembler;

    #[tokio::test]
    async fn render_and_send_delivers_the_rendered_link() {
        let renderer = Arc::new(StubRenderer::default());
        let channel = Arc::new(RecordingChannel::default());
        let assembler = QuoteAssembler::new(renderer.clone(), channel.clone());

        let issued_at = Utc.with_ymd_and_hms(2025, 10, 15, 14, 30, 0).unwrap();
        let quote = assembler.assemble(
            &SessionData::default(),
            "51999000111",
            Decimal::new(1500, 0),
            issued_at,
        );
        assembler.render_and_send("51999000111", &quote, "Quote updated.").await.expect("deliver");

        assert_eq!(renderer.rendered().len(), 1);
        let sent = channel.sent();
        assert_eq!(sent.len(), 1);
        match &sent[0] {
            SentMessage::Document { user_id, filename, caption, .. } => {
                assert_eq!(user_id, "51999000111");
                assert_eq!(filename, "COT_20251015-1430-0111.pdf");
                assert_eq!(caption, "Quote updated.");
            }
            other => panic!("expected document, got {other:?}"),
        }
    }
}
