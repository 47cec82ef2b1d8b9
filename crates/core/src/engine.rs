//! The conversation state machine. Every decision is a function of the
//! current session and one inbound event; side effects go through the
//! injected capabilities.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;

use crate::assembler::QuoteAssembler;
use crate::capabilities::{DocumentRenderer, LeadStore, MessageChannel, RegistryLookup};
use crate::errors::EngineError;
use crate::event::{EventKind, InboundEvent};
use crate::lead::LeadRecord;
use crate::parse::{self, FallbackCommand};
use crate::prompts;
use crate::session::{Session, SessionStore, Step};

/// Branding injected into the welcome exchange.
#[derive(Clone, Debug)]
pub struct EngineBranding {
    pub company_name: String,
    pub logo_url: String,
}

/// What the engine did with one inbound event, for logging and tests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HandleOutcome {
    pub step_before: Option<Step>,
    pub step_after: Step,
    pub disposition: Disposition,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Disposition {
    /// First contact: session created, welcome sent, content not processed.
    Welcomed,
    /// Operator `price <amount>` override; step unchanged.
    PriceOverride,
    /// Media attachment stored; step unchanged.
    MediaStored,
    /// Step validation passed and the flow advanced.
    Advanced,
    /// Step validation failed; corrective prompt sent, step unchanged.
    Reprompted,
    /// Terminal-step free-form command.
    Command(FallbackCommand),
}

pub struct ConversationEngine<C, R, L, G> {
    sessions: Arc<SessionStore>,
    channel: Arc<C>,
    assembler: QuoteAssembler<R, C>,
    leads: Arc<L>,
    registry: Arc<G>,
    branding: EngineBranding,
}

impl<C, R, L, G> ConversationEngine<C, R, L, G>
where
    C: MessageChannel,
    R: DocumentRenderer,
    L: LeadStore,
    G: RegistryLookup,
{
    pub fn new(
        sessions: Arc<SessionStore>,
        channel: Arc<C>,
        renderer: Arc<R>,
        leads: Arc<L>,
        registry: Arc<G>,
        branding: EngineBranding,
    ) -> Self {
        let assembler = QuoteAssembler::new(renderer, channel.clone());
        Self { sessions, channel, assembler, leads, registry, branding }
    }

    pub fn sessions(&self) -> Arc<SessionStore> {
        self.sessions.clone()
    }

    /// Applies one inbound event. The session handle is locked for the whole
    /// call, so concurrent deliveries for the same user serialize.
    pub async fn handle(&self, event: &InboundEvent) -> Result<HandleOutcome, EngineError> {
        let Some(handle) = self.sessions.get(&event.user_id).await else {
            return self.welcome(&event.user_id).await;
        };
        let mut session = handle.lock().await;
        let step_before = session.step;

        let outcome = match &event.kind {
            EventKind::Text(text) => {
                let text = text.trim();
                if let Some(price) = parse::parse_price_command(text) {
                    self.reprice(&mut session, &event.user_id, price).await?
                } else {
                    self.apply_step(&mut session, &event.user_id, text).await?
                }
            }
            EventKind::Media { media_id, .. } => {
                self.store_packing_ref(&mut session, &event.user_id, media_id).await?
            }
        };

        Ok(HandleOutcome { step_before: Some(step_before), step_after: session.step, disposition: outcome })
    }

    async fn welcome(&self, user_id: &str) -> Result<HandleOutcome, EngineError> {
        let handle = self.sessions.create_or_reset(user_id).await;
        let step_after = handle.lock().await.step;
        tracing::info!(event_name = "engine.session_created", user_id, "first contact, session created");
        self.channel
            .send_image(user_id, &self.branding.logo_url, &prompts::greeting(&self.branding.company_name))
            .await?;
        self.channel.send_text(user_id, prompts::IDENTITY).await?;
        Ok(HandleOutcome { step_before: None, step_after, disposition: Disposition::Welcomed })
    }

    /// Operator override: set final pricing and regenerate the document
    /// without altering the step. Valid at any step, including terminal.
    async fn reprice(
        &self,
        session: &mut Session,
        user_id: &str,
        price: Decimal,
    ) -> Result<Disposition, EngineError> {
        session.data.price = price;
        let quote = self.assembler.assemble(&session.data, user_id, price, Utc::now());
        tracing::info!(
            event_name = "engine.price_override",
            user_id,
            subtotal = %quote.subtotal,
            total = %quote.total,
            step = ?session.step,
            "operator price override accepted"
        );
        self.assembler.render_and_send(user_id, &quote, prompts::REPRICED_CAPTION).await?;
        Ok(Disposition::PriceOverride)
    }

    /// Media at any step is treated as a packing-list attachment: download,
    /// append, acknowledge.
    async fn store_packing_ref(
        &self,
        session: &mut Session,
        user_id: &str,
        media_id: &str,
    ) -> Result<Disposition, EngineError> {
        let local_ref = self.channel.download_media(media_id).await?;
        session.data.packing_refs.push(local_ref);
        tracing::info!(
            event_name = "engine.packing_ref_stored",
            user_id,
            count = session.data.packing_refs.len(),
            "packing attachment stored"
        );
        self.channel.send_text(user_id, prompts::PACKING_ACK).await?;
        Ok(Disposition::MediaStored)
    }

    /// Step-local transition table: one arm per step, each arm validating,
    /// mutating, and advancing (or re-prompting on failure).
    async fn apply_step(
        &self,
        session: &mut Session,
        user_id: &str,
        text: &str,
    ) -> Result<Disposition, EngineError> {
        match session.step {
            Step::AskIdentity => match parse::parse_identity(text) {
                Some(block) => {
                    session.data.client_name = Some(block.name);
                    session.data.tax_id = Some(block.tax_id.clone());
                    session.data.legal_name = Some(block.legal_name);
                    self.enrich_legal_name(session, &block.tax_id).await;
                    self.advance(session, user_id).await
                }
                None => self.reprompt(session, user_id).await,
            },
            Step::AskDescription => {
                if text.is_empty() {
                    return self.reprompt(session, user_id).await;
                }
                session.data.description = Some(text.to_string());
                self.advance(session, user_id).await
            }
            Step::AskWeight => match parse::parse_weight(text) {
                Some(weight) => {
                    session.data.weight_kg = Some(weight);
                    self.advance(session, user_id).await
                }
                None => self.reprompt(session, user_id).await,
            },
            Step::AskPacking => {
                if text.eq_ignore_ascii_case("ok") || !session.data.packing_refs.is_empty() {
                    self.advance(session, user_id).await
                } else {
                    self.reprompt(session, user_id).await
                }
            }
            Step::AskAddresses => match parse::parse_addresses(text) {
                Some((pickup, dropoff)) => {
                    session.data.pickup_address = Some(pickup);
                    session.data.dropoff_address = Some(dropoff);
                    self.advance(session, user_id).await
                }
                None => self.reprompt(session, user_id).await,
            },
            Step::AskDate => match parse::parse_service_date(text) {
                Some(date) => {
                    session.data.service_date = Some(date);
                    self.advance(session, user_id).await
                }
                None => self.reprompt(session, user_id).await,
            },
            Step::AskPermits => {
                let permits =
                    if text.is_empty() { prompts::PERMITS_DEFAULT.to_string() } else { text.to_string() };
                session.data.permits = Some(permits);
                self.advance(session, user_id).await
            }
            Step::AskEmail => match parse::parse_email(text) {
                Some(email) => self.complete_intake(session, user_id, email).await,
                None => self.reprompt(session, user_id).await,
            },
            Step::SummaryAndQuote => self.fallback_command(session, user_id, text).await,
        }
    }

    async fn enrich_legal_name(&self, session: &mut Session, tax_id: &str) {
        match self.registry.lookup(tax_id).await {
            Ok(Some(entry)) => {
                session.data.legal_name = Some(entry.legal_name);
            }
            Ok(None) => {}
            Err(error) => {
                tracing::warn!(
                    event_name = "engine.registry_lookup_failed",
                    tax_id,
                    error = %error,
                    "registry lookup failed, keeping user-supplied legal name"
                );
            }
        }
    }

    async fn advance(&self, session: &mut Session, user_id: &str) -> Result<Disposition, EngineError> {
        let from = session.step;
        session.step = session.step.next();
        tracing::info!(
            event_name = "engine.step_advanced",
            user_id,
            from = ?from,
            to = ?session.step,
            "intake step advanced"
        );
        if let Some(prompt) = prompts::entry_prompt(session.step) {
            self.channel.send_text(user_id, prompt).await?;
        }
        Ok(Disposition::Advanced)
    }

    async fn reprompt(&self, session: &Session, user_id: &str) -> Result<Disposition, EngineError> {
        self.channel.send_text(user_id, prompts::retry_prompt(session.step)).await?;
        Ok(Disposition::Reprompted)
    }

    /// Intake completion: persist the lead, then send the zero-priced
    /// pre-quote. Session state settles before the best-effort sends, so a
    /// delivery failure never rolls back stored data or the step advance.
    async fn complete_intake(
        &self,
        session: &mut Session,
        user_id: &str,
        email: String,
    ) -> Result<Disposition, EngineError> {
        session.data.email = Some(email);
        session.step = session.step.next();

        let recorded_at = Utc::now();
        let lead = LeadRecord::from_session(&session.data, user_id, recorded_at);
        self.leads.append(&lead).await?;
        tracing::info!(
            event_name = "engine.lead_recorded",
            user_id,
            tax_id = %lead.tax_id,
            "lead persisted at intake completion"
        );

        let quote = self.assembler.assemble(&session.data, user_id, Decimal::ZERO, recorded_at);
        self.channel.send_text(user_id, prompts::PREQUOTE_READY).await?;
        self.assembler.render_and_send(user_id, &quote, prompts::PREQUOTE_CAPTION).await?;
        Ok(Disposition::Advanced)
    }

    async fn fallback_command(
        &self,
        session: &mut Session,
        user_id: &str,
        text: &str,
    ) -> Result<Disposition, EngineError> {
        let command = parse::parse_fallback_command(text);
        match command {
            FallbackCommand::Menu => {
                self.channel.send_text(user_id, prompts::MENU).await?;
            }
            FallbackCommand::Agent => {
                self.channel.send_text(user_id, prompts::AGENT_HANDOFF).await?;
            }
            FallbackCommand::NewQuote => {
                session.reset();
                self.channel.send_text(user_id, prompts::RESTART).await?;
            }
            FallbackCommand::Unknown => {
                self.channel.send_text(user_id, prompts::FALLBACK).await?;
            }
        }
        Ok(Disposition::Command(command))
    }
}
