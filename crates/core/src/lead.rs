use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::SessionData;

/// Persisted record of a completed identity+contact intake, independent of
/// quote pricing. Append-only; never updated or deleted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LeadRecord {
    pub recorded_at: DateTime<Utc>,
    pub user_id: String,
    pub client_name: String,
    pub tax_id: String,
    pub legal_name: String,
    pub email: String,
}

impl LeadRecord {
    pub fn from_session(data: &SessionData, user_id: &str, recorded_at: DateTime<Utc>) -> Self {
        Self {
            recorded_at,
            user_id: user_id.to_string(),
            client_name: data.client_name.clone().unwrap_or_default(),
            tax_id: data.tax_id.clone().unwrap_or_default(),
            legal_name: data.legal_name.clone().unwrap_or_default(),
            email: data.email.clone().unwrap_or_default(),
        }
    }
}
