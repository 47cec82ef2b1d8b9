//! Declarative parse rules for the free-text intake steps.
//!
//! Every rule reports failure through its return value; validation failures
//! are re-prompt material for the engine, never errors.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Identity block collected on the first step: one field per line, with an
/// 11-digit tax identifier somewhere in the message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdentityBlock {
    pub name: String,
    pub tax_id: String,
    pub legal_name: String,
}

/// Splits the message into trimmed non-empty lines and extracts the first
/// 11-digit run as the tax identifier. Line 1 is the contact name; the legal
/// name is line 3, falling back to line 2.
pub fn parse_identity(text: &str) -> Option<IdentityBlock> {
    let lines: Vec<&str> =
        text.split(['\n', '\r']).map(str::trim).filter(|line| !line.is_empty()).collect();
    let tax_id = extract_digit_run(text, 11)?;
    let name = lines.first()?.to_string();
    let legal_name = lines.get(2).or_else(|| lines.get(1)).unwrap_or(lines.first()?).to_string();
    Some(IdentityBlock { name, tax_id, legal_name })
}

fn extract_digit_run(text: &str, len: usize) -> Option<String> {
    let mut run = String::new();
    for ch in text.chars() {
        if ch.is_ascii_digit() {
            run.push(ch);
            if run.len() == len {
                return Some(run);
            }
        } else {
            run.clear();
        }
    }
    None
}

/// Weight in kilograms: decimal with comma or dot separator, strictly
/// positive.
pub fn parse_weight(text: &str) -> Option<Decimal> {
    let value = parse_decimal(text.trim())?;
    (value > Decimal::ZERO).then_some(value)
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    Decimal::from_str(&text.replace(',', ".")).ok()
}

/// Pickup and dropoff addresses, separated by a newline or an `->` arrow.
/// Leading `Pickup:` / `Dropoff:` labels are stripped case-insensitively.
pub fn parse_addresses(text: &str) -> Option<(String, String)> {
    let parts: Vec<String> = text
        .replace("->", "\n")
        .split(['\n', '\r'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect();
    if parts.len() < 2 {
        return None;
    }
    Some((strip_label(&parts[0], "pickup:"), strip_label(&parts[1], "dropoff:")))
}

fn strip_label(part: &str, label: &str) -> String {
    let lowered = part.to_ascii_lowercase();
    if lowered.starts_with(label) { part[label.len()..].trim().to_string() } else { part.to_string() }
}

/// Service date in any of the accepted calendar formats, canonicalized to a
/// `NaiveDate` (rendered as `YYYY-MM-DD` downstream).
pub fn parse_service_date(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();
    ["%Y-%m-%d", "%d/%m/%Y", "%d.%m.%Y"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
}

/// Basic `local@domain.tld` check, matching the intake contract rather than
/// the full RFC grammar.
pub fn parse_email(text: &str) -> Option<String> {
    let candidate = text.trim();
    if candidate.contains(char::is_whitespace) {
        return None;
    }
    let (local, domain) = candidate.split_once('@')?;
    if local.is_empty() || domain.contains('@') {
        return None;
    }
    let (host, tld) = domain.rsplit_once('.')?;
    if host.is_empty() || tld.is_empty() {
        return None;
    }
    Some(candidate.to_string())
}

/// Operator override of the shape `price <decimal>`, comma or dot separator,
/// case-insensitive. Anything else is ordinary user text.
pub fn parse_price_command(text: &str) -> Option<Decimal> {
    let mut tokens = text.trim().split_whitespace();
    if !tokens.next()?.eq_ignore_ascii_case("price") {
        return None;
    }
    let amount = tokens.next()?;
    if tokens.next().is_some() {
        return None;
    }
    if !amount.chars().all(|ch| ch.is_ascii_digit() || ch == '.' || ch == ',') {
        return None;
    }
    parse_decimal(amount)
}

/// Free-form commands accepted at the terminal step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FallbackCommand {
    Menu,
    Agent,
    NewQuote,
    Unknown,
}

pub fn parse_fallback_command(text: &str) -> FallbackCommand {
    let lowered = text.trim().to_ascii_lowercase();
    if ["menu", "help", "options"].iter().any(|token| lowered.contains(token)) {
        FallbackCommand::Menu
    } else if ["agent", "human", "advisor"].iter().any(|token| lowered.contains(token)) {
        FallbackCommand::Agent
    } else if ["quote", "new"].iter().any(|token| lowered.contains(token)) {
        FallbackCommand::NewQuote
    } else {
        FallbackCommand::Unknown
    }
}
