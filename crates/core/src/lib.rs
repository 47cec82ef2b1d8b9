//! Freightbot core - the conversational intake state machine.
//!
//! The intake flow walks a user through a fixed sequence of prompts,
//! accumulating shipment data in a per-user [`session::Session`], and hands
//! completed intakes to the quote pipeline. All I/O goes through the
//! capability traits in [`capabilities`], so the engine itself is testable
//! with in-memory fakes.

pub mod assembler;
pub mod capabilities;
pub mod config;
pub mod engine;
pub mod errors;
pub mod event;
pub mod lead;
pub mod parse;
pub mod pricing;
pub mod prompts;
pub mod quote;
pub mod session;

#[cfg(test)]
pub mod testkit;

pub use assembler::QuoteAssembler;
pub use capabilities::{
    DocumentRenderer, LeadStore, MessageChannel, NoopRegistryLookup, RegistryEntry, RegistryLookup,
};
pub use engine::{ConversationEngine, Disposition, EngineBranding, HandleOutcome};
pub use errors::{ChannelError, EngineError, LookupError, RenderError, StoreError};
pub use event::{EventKind, InboundEvent, MediaType};
pub use lead::LeadRecord;
pub use quote::QuoteRequest;
pub use session::{Session, SessionData, SessionHandle, SessionStore, Step};
