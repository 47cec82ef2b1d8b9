//! HTTP surface: webhook verification and delivery, the liveness root, and
//! static serving of generated documents.

use std::path::Path;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;
use tower_http::services::ServeDir;
use tracing::{info, warn};

use freightbot_core::engine::ConversationEngine;
use freightbot_db::{DbPool, SqlLeadStore};
use freightbot_whatsapp::{
    normalize_webhook_payload, verify_subscription, VerifyParams, VerifyResponse, WhatsAppClient,
};

use crate::health;
use crate::pdf::QuoteDocumentRenderer;
use crate::registry::HttpRegistryLookup;

pub type Engine =
    ConversationEngine<WhatsAppClient, QuoteDocumentRenderer, SqlLeadStore, HttpRegistryLookup>;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
    pub verify_token: String,
}

pub fn router(state: AppState, db_pool: DbPool, public_dir: &Path) -> Router {
    let sessions = state.engine.sessions();
    Router::new()
        .route("/", get(root))
        .route("/webhook", get(verify).post(receive))
        .with_state(state)
        .merge(health::router(db_pool, sessions))
        .nest_service("/public", ServeDir::new(public_dir))
}

async fn root() -> &'static str {
    "freightbot-server is running"
}

/// Channel subscription handshake: echo the challenge when the shared token
/// matches, 403 otherwise.
async fn verify(
    State(state): State<AppState>,
    Query(params): Query<VerifyParams>,
) -> axum::response::Response {
    match verify_subscription(&params, &state.verify_token) {
        VerifyResponse::Challenge(challenge) => {
            info!(event_name = "webhook.verified", "subscription handshake accepted");
            (StatusCode::OK, challenge).into_response()
        }
        VerifyResponse::Forbidden => {
            warn!(event_name = "webhook.verify_rejected", "subscription handshake rejected");
            StatusCode::FORBIDDEN.into_response()
        }
    }
}

/// Webhook deliveries are always acknowledged with a 200 so the platform
/// does not retry; processing failures are logged, never surfaced.
async fn receive(State(state): State<AppState>, Json(payload): Json<Value>) -> StatusCode {
    let Some(event) = normalize_webhook_payload(&payload) else {
        return StatusCode::OK;
    };

    match state.engine.handle(&event).await {
        Ok(outcome) => {
            info!(
                event_name = "webhook.handled",
                user_id = %event.user_id,
                step_after = ?outcome.step_after,
                disposition = ?outcome.disposition,
                "inbound event processed"
            );
        }
        Err(error) => {
            warn!(
                event_name = "webhook.handle_failed",
                user_id = %event.user_id,
                error = %error,
                "inbound event processing failed"
            );
        }
    }
    StatusCode::OK
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::json;
    use tower::util::ServiceExt;

    use freightbot_core::config::BrandingConfig;
    use freightbot_core::engine::{ConversationEngine, EngineBranding};
    use freightbot_core::session::SessionStore;
    use freightbot_db::{connect_with_settings, migrations, SqlLeadStore};
    use freightbot_whatsapp::WhatsAppClient;

    use crate::pdf::QuoteDocumentRenderer;
    use crate::registry::HttpRegistryLookup;

    use super::{router, AppState};

    async fn test_router() -> axum::Router {
        let pool = connect_with_settings("sqlite::memory:?cache=shared", 1, 5)
            .await
            .expect("pool should connect");
        migrations::run_pending(&pool).await.expect("migrations");

        let public_dir = std::env::temp_dir().join("freightbot-route-tests");
        let branding = BrandingConfig {
            company_name: "TH Logistics".to_string(),
            logo_url: "https://placehold.co/600x200".to_string(),
        };
        let channel = Arc::new(WhatsAppClient::new(
            "http://127.0.0.1:9",
            "12345",
            String::from("token").into(),
            public_dir.clone(),
            "http://127.0.0.1:9",
        ));
        let renderer = Arc::new(
            QuoteDocumentRenderer::new(None, public_dir.clone(), branding.clone())
                .expect("renderer"),
        );
        let engine = Arc::new(ConversationEngine::new(
            Arc::new(SessionStore::default()),
            channel,
            renderer,
            Arc::new(SqlLeadStore::new(pool.clone())),
            Arc::new(HttpRegistryLookup::new(None)),
            EngineBranding {
                company_name: branding.company_name,
                logo_url: branding.logo_url,
            },
        ));

        router(
            AppState { engine, verify_token: "shared-token".to_string() },
            pool,
            &PathBuf::from("public"),
        )
    }

    #[tokio::test]
    async fn verify_echoes_challenge_on_token_match() {
        let app = test_router().await;

        let response = app
            .oneshot(
                Request::get(
                    "/webhook?hub.mode=subscribe&hub.verify_token=shared-token&hub.challenge=4242",
                )
                .body(Body::empty())
                .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.expect("body");
        assert_eq!(&body[..], b"4242");
    }

    #[tokio::test]
    async fn verify_rejects_wrong_token() {
        let app = test_router().await;

        let response = app
            .oneshot(
                Request::get(
                    "/webhook?hub.mode=subscribe&hub.verify_token=wrong&hub.challenge=4242",
                )
                .body(Body::empty())
                .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn status_only_delivery_is_acknowledged() {
        let app = test_router().await;
        let payload = json!({
            "object": "whatsapp_business_account",
            "entry": [{ "changes": [{ "value": { "statuses": [{ "status": "delivered" }] } }] }]
        });

        let response = app
            .oneshot(
                Request::post("/webhook")
                    .header("content-type", "application/json")
                    .body(Body::from(payload.to_string()))
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn malformed_delivery_is_acknowledged() {
        let app = test_router().await;

        let response = app
            .oneshot(
                Request::post("/webhook")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"object":"other"}"#))
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn health_route_is_mounted() {
        let app = test_router().await;

        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).expect("request"))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn root_reports_liveness() {
        let app = test_router().await;

        let response = app
            .oneshot(Request::get("/").body(Body::empty()).expect("request"))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
    }
}
