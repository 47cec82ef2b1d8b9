//! Readiness probe: database reachability plus the live conversation count.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use freightbot_core::session::SessionStore;
use freightbot_db::DbPool;

#[derive(Clone)]
pub struct HealthState {
    db_pool: DbPool,
    sessions: Arc<SessionStore>,
}

/// Wire shape of `GET /health`. `database_error` appears only when the
/// readiness query fails and carries its detail.
#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub active_sessions: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_error: Option<String>,
    pub checked_at: String,
}

pub fn router(db_pool: DbPool, sessions: Arc<SessionStore>) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState { db_pool, sessions })
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthReport>) {
    let database_error = sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(&state.db_pool)
        .await
        .err()
        .map(|error| error.to_string());

    let ready = database_error.is_none();
    let report = HealthReport {
        status: if ready { "ok" } else { "degraded" },
        active_sessions: state.sessions.len().await,
        database_error,
        checked_at: Utc::now().to_rfc3339(),
    };

    let code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (code, Json(report))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{extract::State, http::StatusCode, Json};
    use freightbot_core::session::SessionStore;
    use freightbot_db::connect_with_settings;

    use super::{health, HealthState};

    #[tokio::test]
    async fn reports_ok_with_session_count_while_database_answers() {
        let pool = connect_with_settings("sqlite::memory:?cache=shared", 1, 5)
            .await
            .expect("pool should connect");
        let sessions = Arc::new(SessionStore::new());
        sessions.create_or_reset("51999000111").await;

        let (code, Json(report)) =
            health(State(HealthState { db_pool: pool.clone(), sessions })).await;

        assert_eq!(code, StatusCode::OK);
        assert_eq!(report.status, "ok");
        assert_eq!(report.active_sessions, 1);
        assert!(report.database_error.is_none());

        pool.close().await;
    }

    #[tokio::test]
    async fn degrades_when_the_database_is_gone() {
        let pool = connect_with_settings("sqlite::memory:?cache=shared", 1, 5)
            .await
            .expect("pool should connect");
        pool.close().await;

        let (code, Json(report)) =
            health(State(HealthState { db_pool: pool, sessions: Arc::new(SessionStore::new()) }))
                .await;

        assert_eq!(code, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(report.status, "degraded");
        assert_eq!(report.active_sessions, 0);
        assert!(report.database_error.is_some());
    }
}
