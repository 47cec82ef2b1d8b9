//! WhatsApp Cloud API transport for freightbot.
//!
//! This crate is the only part of the system that knows the Graph API wire
//! shapes. It provides:
//! - **Client** (`client`) - outbound messaging + media download,
//!   implementing the core `MessageChannel` capability
//! - **Inbound** (`inbound`) - webhook payload normalization into canonical
//!   `InboundEvent`s, plus the one-time verify handshake
//!
//! # Setup
//!
//! 1. Create a Meta app with the WhatsApp product and a phone number id
//! 2. Point the webhook at `GET/POST /webhook` and set the verify token
//! 3. Set `FREIGHTBOT_WHATSAPP_TOKEN` and `FREIGHTBOT_PHONE_NUMBER_ID`

pub mod client;
pub mod inbound;

pub use client::WhatsAppClient;
pub use inbound::{normalize_webhook_payload, verify_subscription, VerifyParams, VerifyResponse};
