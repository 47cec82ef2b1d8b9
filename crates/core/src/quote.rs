use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::pricing::PriceBreakdown;
use crate::session::SessionData;

/// Fixed commercial terms printed at the foot of every quote document.
pub const DEFAULT_FOOT_NOTES: &str = "Notes: Rates do not include IGV (18%). \
Free hours: 4 (2 loading / 2 unloading). Stand-by per hour: 10% of the rate. \
Overnight in Lima: 50% of the rate. Dead freight: 50%-100% depending on \
conditions. Cargo insurance not included unless requested. Hazardous cargo: \
20% surcharge.";

/// Input contract of the document renderer. Ephemeral: constructed per
/// render call, never persisted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub number: String,
    pub issue_date: String,
    pub client_name: String,
    pub client_tax_id: String,
    pub client_address: String,
    pub description: String,
    pub weight_kg: String,
    pub pickup: String,
    pub dropoff: String,
    pub service_date: String,
    pub permits: String,
    pub email: String,
    pub subtotal: String,
    pub tax: String,
    pub total: String,
    pub foot_notes: String,
}

impl QuoteRequest {
    /// Maps accumulated session data plus a price breakdown into the render
    /// contract. Missing fields render as `-`, matching a quote issued
    /// before intake completed (the operator can reprice at any step).
    pub fn from_session(
        data: &SessionData,
        user_id: &str,
        pricing: PriceBreakdown,
        issued_at: DateTime<Utc>,
    ) -> Self {
        Self {
            number: quote_number(issued_at, user_id),
            issue_date: issued_at.format("%d.%m.%Y").to_string(),
            client_name: data
                .legal_name
                .clone()
                .or_else(|| data.client_name.clone())
                .unwrap_or_else(placeholder),
            client_tax_id: data.tax_id.clone().unwrap_or_else(placeholder),
            client_address: placeholder(),
            description: data.description.clone().unwrap_or_else(placeholder),
            weight_kg: data
                .weight_kg
                .map(|weight| weight.normalize().to_string())
                .unwrap_or_else(|| "0".to_string()),
            pickup: data.pickup_address.clone().unwrap_or_else(placeholder),
            dropoff: data.dropoff_address.clone().unwrap_or_else(placeholder),
            service_date: data
                .service_date
                .map(|date| date.format("%Y-%m-%d").to_string())
                .unwrap_or_else(placeholder),
            permits: data.permits.clone().unwrap_or_else(placeholder),
            email: data.email.clone().unwrap_or_else(placeholder),
            subtotal: money(pricing.subtotal),
            tax: money(pricing.tax),
            total: money(pricing.total),
            foot_notes: DEFAULT_FOOT_NOTES.to_string(),
        }
    }

    pub fn filename(&self) -> String {
        document_filename(&self.number)
    }
}

fn placeholder() -> String {
    "-".to_string()
}

fn money(amount: Decimal) -> String {
    format!("{:.2}", amount)
}

/// Human-readable, time-ordered identifier: coarse timestamp plus the last
/// four characters of the user identifier. Not globally unique; collisions
/// need the same user within the same minute, acceptable for a low-volume
/// human-reviewed trail.
pub fn quote_number(issued_at: DateTime<Utc>, user_id: &str) -> String {
    // Last four characters, not bytes: the transport's `from` field is an
    // arbitrary string and must never panic the quote path.
    let skip = user_id.chars().count().saturating_sub(4);
    let suffix: String = user_id.chars().skip(skip).collect();
    format!("{}-{}", issued_at.format("%Y%m%d-%H%M"), suffix)
}

pub fn document_filename(number: &str) -> String {
    let safe: String = number
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || *ch == '_' || *ch == '-')
        .collect();
    format!("COT_{safe}.pdf")
}
