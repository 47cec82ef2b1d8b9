//! User-facing prompt copy for every step of the intake flow.

use crate::session::Step;

pub const IDENTITY: &str = "To get started, please send:\n1) *Full name*\n2) *Tax ID (11 digits)*\n3) *Legal name*";
pub const IDENTITY_RETRY: &str =
    "Invalid format. Send me:\n*Full name*\n*Tax ID (11 digits)*\n*Legal name*";
pub const DESCRIPTION: &str =
    "2) Briefly describe your requirement (cargo type, tentative origin/destination, etc.).";
pub const DESCRIPTION_RETRY: &str = "Write a short description of the service.";
pub const WEIGHT: &str = "3) Send the *total weight (kg)* to transport.";
pub const WEIGHT_RETRY: &str = "Send the total weight in kg (e.g. 1200).";
pub const PACKING: &str = "4) Send the *packing list* (images or PDF).";
pub const PACKING_RETRY: &str = "Attach the packing list. When you are done, type \"ok\".";
pub const PACKING_ACK: &str = "Packing list received. Send more or type \"ok\".";
pub const ADDRESSES: &str = "5) Send the pickup and dropoff *addresses* (both).";
pub const ADDRESSES_RETRY: &str = "Format:\n*Pickup:* ...\n*Dropoff:* ...";
pub const DATE: &str = "6) Send the *service date* (YYYY-MM-DD).";
pub const DATE_RETRY: &str = "Invalid date. Use YYYY-MM-DD (e.g. 2025-10-15).";
pub const PERMITS: &str =
    "7) Does the cargo need special permits/documentation? Answer yes/no and add details if applicable.";
pub const PERMITS_DEFAULT: &str = "not specified";
pub const EMAIL: &str = "8) Send the *email address* for the quote.";
pub const EMAIL_RETRY: &str = "Invalid email. E.g. sales@yourcompany.com";
pub const PREQUOTE_READY: &str =
    "Thanks. I have generated the *pre-quote*. To set pricing, an operator sends: price 1500";
pub const PREQUOTE_CAPTION: &str = "Pre-quote (no pricing).";
pub const REPRICED_CAPTION: &str = "Quote updated with pricing.";
pub const MENU: &str = "Options:\n- \"quote\" to start a new quote.\n- \"agent\" to talk to a person.\n- Operator: *price 1500* to reprice the PDF.";
pub const AGENT_HANDOFF: &str = "Connecting you with a human advisor.";
pub const RESTART: &str = "Let's start a new quote. Send me:\n1) *Full name*\n2) *Tax ID (11 digits)*\n3) *Legal name*";
pub const FALLBACK: &str =
    "I did not understand. Type \"menu\" for options or \"quote\" to start a new quote.";

/// Entry prompt sent when the conversation arrives at a step. The terminal
/// step has no entry prompt of its own; intake completion sends its copy
/// inline.
pub fn entry_prompt(step: Step) -> Option<&'static str> {
    match step {
        Step::AskIdentity => Some(IDENTITY),
        Step::AskDescription => Some(DESCRIPTION),
        Step::AskWeight => Some(WEIGHT),
        Step::AskPacking => Some(PACKING),
        Step::AskAddresses => Some(ADDRESSES),
        Step::AskDate => Some(DATE),
        Step::AskPermits => Some(PERMITS),
        Step::AskEmail => Some(EMAIL),
        Step::SummaryAndQuote => None,
    }
}

/// Corrective prompt sent when a step's validation rejects the input.
pub fn retry_prompt(step: Step) -> &'static str {
    match step {
        Step::AskIdentity => IDENTITY_RETRY,
        Step::AskDescription => DESCRIPTION_RETRY,
        Step::AskWeight => WEIGHT_RETRY,
        Step::AskPacking => PACKING_RETRY,
        Step::AskAddresses => ADDRESSES_RETRY,
        Step::AskDate => DATE_RETRY,
        // Permits accept any input; the entry prompt doubles as the retry.
        Step::AskPermits => PERMITS,
        Step::AskEmail => EMAIL_RETRY,
        Step::SummaryAndQuote => FALLBACK,
    }
}

pub fn greeting(company_name: &str) -> String {
    format!("Hi! I am the {company_name} virtual assistant.")
}
