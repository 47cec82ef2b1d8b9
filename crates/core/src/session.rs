use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

/// Position in the guided intake sequence. Terminal step accepts free-form
/// commands only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    AskIdentity,
    AskDescription,
    AskWeight,
    AskPacking,
    AskAddresses,
    AskDate,
    AskPermits,
    AskEmail,
    SummaryAndQuote,
}

impl Step {
    pub fn is_terminal(self) -> bool {
        self == Step::SummaryAndQuote
    }

    /// Successor in the fixed intake order. The terminal step is its own
    /// successor; steps never regress except via explicit reset.
    pub fn next(self) -> Step {
        use Step::*;
        match self {
            AskIdentity => AskDescription,
            AskDescription => AskWeight,
            AskWeight => AskPacking,
            AskPacking => AskAddresses,
            AskAddresses => AskDate,
            AskDate => AskPermits,
            AskPermits => AskEmail,
            AskEmail => SummaryAndQuote,
            SummaryAndQuote => SummaryAndQuote,
        }
    }
}

/// Fields collected over the conversation. Populated monotonically as steps
/// advance; `packing_refs` is append-only.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    pub client_name: Option<String>,
    pub tax_id: Option<String>,
    pub legal_name: Option<String>,
    pub description: Option<String>,
    pub weight_kg: Option<Decimal>,
    pub packing_refs: Vec<String>,
    pub pickup_address: Option<String>,
    pub dropoff_address: Option<String>,
    pub service_date: Option<NaiveDate>,
    pub permits: Option<String>,
    pub email: Option<String>,
    pub price: Decimal,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub step: Step,
    pub data: SessionData,
}

impl Session {
    pub fn new() -> Self {
        Self { step: Step::AskIdentity, data: SessionData::default() }
    }

    /// Full restart: back to the initial step with empty data. The only
    /// sanctioned way a session regresses.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

pub type SessionHandle = Arc<Mutex<Session>>;

/// Process-wide map of one session per user identifier. Each handle wraps
/// its session in an async mutex, so concurrent deliveries for the same user
/// serialize while other users proceed independently.
///
/// Sessions are never evicted; abandoned conversations accrue until restart.
#[derive(Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, SessionHandle>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, user_id: &str) -> Option<SessionHandle> {
        self.sessions.lock().await.get(user_id).cloned()
    }

    /// Installs a fresh session for the user, replacing any existing one.
    /// An existing session is reset in place so holders of the old handle
    /// observe the restart instead of mutating a detached copy.
    pub async fn create_or_reset(&self, user_id: &str) -> SessionHandle {
        let mut sessions = self.sessions.lock().await;
        match sessions.get(user_id) {
            Some(handle) => {
                handle.lock().await.reset();
                handle.clone()
            }
            None => {
                let handle = Arc::new(Mutex::new(Session::new()));
                sessions.insert(user_id.to_string(), handle.clone());
                handle
            }
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{Session, SessionStore, Step};

    #[test]
    fn step_order_is_fixed_and_terminal_saturates() {
        let mut step = Step::AskIdentity;
        let expected = [
            Step::AskDescription,
            Step::AskWeight,
            Step::AskPacking,
            Step::AskAddresses,
            Step::AskDate,
            Step::AskPermits,
            Step::AskEmail,
            Step::SummaryAndQuote,
        ];
        for want in expected {
            step = step.next();
            assert_eq!(step, want);
        }
        assert!(step.is_terminal());
        assert_eq!(step.next(), Step::SummaryAndQuote);
    }

    #[test]
    fn reset_clears_data_and_returns_to_initial_step() {
        let mut session = Session::new();
        session.step = Step::AskEmail;
        session.data.client_name = Some("Jane Doe".to_string());
        session.data.packing_refs.push("/public/packing_1.jpg".to_string());

        session.reset();

        assert_eq!(session.step, Step::AskIdentity);
        assert!(session.data.client_name.is_none());
        assert!(session.data.packing_refs.is_empty());
    }

    #[tokio::test]
    async fn store_returns_absent_for_unseen_user() {
        let store = SessionStore::new();
        assert!(store.get("51999000111").await.is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn create_or_reset_reuses_the_existing_handle() {
        let store = SessionStore::new();
        let first = store.create_or_reset("51999000111").await;
        first.lock().await.step = Step::AskWeight;

        let second = store.create_or_reset("51999000111").await;

        assert!(std::sync::Arc::ptr_eq(&first, &second));
        assert_eq!(second.lock().await.step, Step::AskIdentity);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn sessions_are_independent_per_user() {
        let store = SessionStore::new();
        let a = store.create_or_reset("51999000111").await;
        let b = store.create_or_reset("51999000222").await;

        a.lock().await.step = Step::AskDate;

        assert_eq!(b.lock().await.step, Step::AskIdentity);
        assert_eq!(store.len().await, 2);
    }
}
