use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;

use freightbot_core::{LeadRecord, LeadStore, StoreError};

use crate::DbPool;

/// Append-only lead store backed by SQLite. Safe under concurrent writers:
/// every call is a single INSERT with no read-modify-write.
pub struct SqlLeadStore {
    pool: DbPool,
}

impl SqlLeadStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Most recent leads first; used by operator tooling and tests.
    pub async fn recent(&self, limit: i64) -> Result<Vec<LeadRecord>, StoreError> {
        let rows = sqlx::query(
            "SELECT recorded_at, user_id, client_name, tax_id, legal_name, email \
             FROM lead ORDER BY recorded_at DESC, id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| StoreError::Persistence(error.to_string()))?;

        rows.into_iter()
            .map(|row| {
                let recorded_at: String = row.get("recorded_at");
                let recorded_at = recorded_at
                    .parse::<DateTime<Utc>>()
                    .map_err(|error| StoreError::Persistence(error.to_string()))?;
                Ok(LeadRecord {
                    recorded_at,
                    user_id: row.get("user_id"),
                    client_name: row.get("client_name"),
                    tax_id: row.get("tax_id"),
                    legal_name: row.get("legal_name"),
                    email: row.get("email"),
                })
            })
            .collect()
    }
}

#[async_trait]
impl LeadStore for SqlLeadStore {
    async fn append(&self, lead: &LeadRecord) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO lead (recorded_at, user_id, client_name, tax_id, legal_name, email) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(lead.recorded_at.to_rfc3339())
        .bind(&lead.user_id)
        .bind(&lead.client_name)
        .bind(&lead.tax_id)
        .bind(&lead.legal_name)
        .bind(&lead.email)
        .execute(&self.pool)
        .await
        .map_err(|error| StoreError::Persistence(error.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use freightbot_core::{LeadRecord, LeadStore};

    use crate::{connect_with_settings, migrations};

    use super::SqlLeadStore;

    fn lead(email: &str) -> LeadRecord {
        LeadRecord {
            recorded_at: Utc::now(),
            user_id: "51999000111".to_string(),
            client_name: "Jane Doe".to_string(),
            tax_id: "20123456789".to_string(),
            legal_name: "Acme SAC".to_string(),
            email: email.to_string(),
        }
    }

    #[tokio::test]
    async fn append_then_read_back() {
        let pool = connect_with_settings("sqlite::memory:", 1, 5).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrate");
        let store = SqlLeadStore::new(pool.clone());

        store.append(&lead("ventas@acme.com")).await.expect("append");
        store.append(&lead("compras@acme.com")).await.expect("append");

        let recent = store.recent(10).await.expect("recent");
        assert_eq!(recent.len(), 2);
        assert!(recent.iter().any(|record| record.email == "ventas@acme.com"));
        assert_eq!(recent[0].tax_id, "20123456789");
        pool.close().await;
    }
}
