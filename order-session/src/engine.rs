//! Session engine: one state machine per chat over an injectable [`SessionStore`].
//!
//! Every inbound message is one read-modify-write under that chat's lock. The lock only covers the
//! store access and the (synchronous) date parsing; sending replies and submitting orders is the
//! caller's job after [`SessionEngine::handle`] returns.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use date_resolver::{DateParser, DateResolver, ResolvedDate};
use intake_core::{Attachment, FinalizedOrder, InboundMessage};
use regex::{Regex, RegexBuilder};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, error, info, instrument, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::SessionConfig;
use crate::error::{Result, SessionError};
use crate::prompts;
use crate::session::Session;
use crate::state::{classify_command, Input, OrderState};
use crate::store::{InMemorySessionStore, SessionStore};
use crate::transition::{transition, Effect, Next};

/// What the caller should do after a message.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Send this text back to the chat.
    Reply(String),
    /// Hand `order` to the order sink and send `reply`. The session is gone.
    Finalized { order: FinalizedOrder, reply: String },
    /// The session was destroyed without an order; send this text once.
    Cancelled(String),
    /// No live session and the message does not open one. Nothing to send.
    NoSession,
    /// The message could not be processed (store failure). Nothing to send.
    Ignored,
}

impl Outcome {
    /// Text to send back, if any.
    pub fn reply(&self) -> Option<&str> {
        match self {
            Outcome::Reply(text) | Outcome::Cancelled(text) => Some(text),
            Outcome::Finalized { reply, .. } => Some(reply),
            Outcome::NoSession | Outcome::Ignored => None,
        }
    }

    pub fn order(&self) -> Option<&FinalizedOrder> {
        match self {
            Outcome::Finalized { order, .. } => Some(order),
            _ => None,
        }
    }
}

/// Holds one chat's lock; on drop releases it and forgets the chat when no one else is queued.
struct ChatGuard<'a> {
    locks: &'a DashMap<String, Arc<Mutex<()>>>,
    chat_id: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for ChatGuard<'_> {
    fn drop(&mut self) {
        self.guard.take();
        self.locks
            .remove_if(self.chat_id.as_str(), |_, lock| Arc::strong_count(lock) == 1);
    }
}

/// Drives order-intake conversations.
pub struct SessionEngine {
    store: Arc<dyn SessionStore>,
    dates: Arc<dyn DateParser>,
    clock: Arc<dyn Clock>,
    config: SessionConfig,
    trigger: Option<Regex>,
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl SessionEngine {
    /// In-memory store, Spanish date resolver in the configured offset, wall clock.
    pub fn new(config: SessionConfig) -> Self {
        let trigger = config.trigger.as_deref().and_then(|t| {
            RegexBuilder::new(&regex::escape(t))
                .case_insensitive(true)
                .build()
                .ok()
        });
        Self {
            store: Arc::new(InMemorySessionStore::new()),
            dates: Arc::new(DateResolver::new(config.utc_offset)),
            clock: Arc::new(SystemClock),
            config,
            trigger,
            locks: DashMap::new(),
        }
    }

    pub fn with_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.store = store;
        self
    }

    pub fn with_date_parser(mut self, dates: Arc<dyn DateParser>) -> Self {
        self.dates = dates;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Advances the chat's conversation with one message. Never fails: store errors are logged and
    /// reported as [`Outcome::Ignored`].
    #[instrument(skip(self, message), fields(chat_id = %message.chat_id))]
    pub async fn handle(&self, message: &InboundMessage) -> Outcome {
        match self.try_handle(message).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(error = %e, chat_id = %message.chat_id, "Session engine failed to process message");
                Outcome::Ignored
            }
        }
    }

    async fn try_handle(&self, message: &InboundMessage) -> Result<Outcome> {
        let _guard = self.lock_chat(&message.chat_id).await;
        let now = self.clock.now();

        match self.load_live(&message.chat_id, now).await? {
            Some(session) => self.advance(session, message, now).await,
            None => self.open(message, now).await,
        }
    }

    /// The only path that creates a session from a message.
    async fn open(&self, message: &InboundMessage, now: DateTime<Utc>) -> Result<Outcome> {
        let Some(text) = self.opening_text(message) else {
            debug!(chat_id = %message.chat_id, "Message does not open a session");
            return Ok(Outcome::NoSession);
        };

        let mut session = Session::new(&message.chat_id, &message.author_name, now);
        session.append_text(&text, self.config.title_max_chars);
        if let Some(attachment) = &message.attachment {
            session.append_attachment(attachment.clone());
        }
        let reply = prompts::start_confirmation(&session);
        self.store.insert(session).await?;

        info!(
            chat_id = %message.chat_id,
            author = %message.author_name,
            has_image = message.has_image(),
            "Session started"
        );
        Ok(Outcome::Reply(reply))
    }

    /// Text to seed a new session with, or `None` when the message does not qualify.
    fn opening_text(&self, message: &InboundMessage) -> Option<String> {
        let text = message.trimmed_text().unwrap_or("");
        if let Some(trigger) = &self.trigger {
            if !trigger.is_match(text) {
                return None;
            }
            let stripped = trigger.replace_all(text, "");
            return Some(stripped.split_whitespace().collect::<Vec<_>>().join(" "));
        }
        if message.has_image() {
            return Some(text.to_string());
        }
        if text.is_empty() || classify_command(text).is_some() {
            return None;
        }
        Some(text.to_string())
    }

    async fn advance(
        &self,
        mut session: Session,
        message: &InboundMessage,
        now: DateTime<Utc>,
    ) -> Result<Outcome> {
        let input = self.classify(&session, message, now);
        let step = transition(session.state, &input);
        debug!(
            chat_id = %session.chat_id,
            state = %session.state,
            input = ?input,
            next = ?step.next,
            "Transition"
        );

        if step.next == Next::Cancel {
            self.store.remove(&session.chat_id).await?;
            info!(chat_id = %session.chat_id, state = %session.state, "Session cancelled");
            return Ok(Outcome::Cancelled(prompts::render(step.prompt, &session, now)));
        }

        self.apply(&mut session, &step.effect, message);
        session.touch(now);

        match step.next {
            Next::Finalize => {
                self.store.remove(&session.chat_id).await?;
                let order = session.to_order(now);
                info!(
                    chat_id = %order.chat_id,
                    title = %order.title,
                    fragments = order.fragments.len(),
                    attachments = order.attachments.len(),
                    "Session finalized"
                );
                let reply = prompts::finalized(&order);
                Ok(Outcome::Finalized { order, reply })
            }
            Next::To(state) => {
                session.state = state;
                let reply = prompts::render(step.prompt, &session, now);
                self.store.insert(session).await?;
                Ok(Outcome::Reply(reply))
            }
            Next::Stay | Next::Cancel => {
                let reply = prompts::render(step.prompt, &session, now);
                self.store.insert(session).await?;
                Ok(Outcome::Reply(reply))
            }
        }
    }

    fn classify(&self, session: &Session, message: &InboundMessage, now: DateTime<Utc>) -> Input {
        let Some(text) = message.trimmed_text() else {
            return if message.has_image() {
                Input::ImageOnly
            } else {
                Input::Empty
            };
        };
        if let Some(command) = classify_command(text) {
            return Input::Command(command);
        }
        if session.state == OrderState::AwaitingDeliveryDate {
            let reference = now.with_timezone(&self.config.utc_offset);
            if let Some(date) = self.dates.parse(text, reference) {
                return Input::Date(date);
            }
        }
        Input::Text
    }

    fn apply(&self, session: &mut Session, effect: &Effect, message: &InboundMessage) {
        let max = self.config.title_max_chars;
        match effect {
            Effect::None => {}
            Effect::AppendContent => session.append_message(message, max),
            Effect::ProposeTitle => session.ensure_title(max),
            Effect::LockTitle => session.lock_title(),
            Effect::SetTitle => {
                session.set_title(&message.text, max);
            }
            Effect::SetDeliveryDate(date) => session.set_delivery_date(date.clone(), &message.text),
        }
    }

    /// Waits for the chat's lock. The entry is dropped from the lock table again once nobody holds
    /// or waits for it, so the table only tracks chats with operations in flight.
    async fn lock_chat(&self, chat_id: &str) -> ChatGuard<'_> {
        let lock = self
            .locks
            .entry(chat_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        ChatGuard {
            locks: &self.locks,
            chat_id: chat_id.to_string(),
            guard: Some(lock.lock_owned().await),
        }
    }

    /// Chats with an operation holding or waiting for their lock.
    pub fn locked_chats(&self) -> usize {
        self.locks.len()
    }

    /// Reads the session, purging it first if it has expired.
    async fn load_live(&self, chat_id: &str, now: DateTime<Utc>) -> Result<Option<Session>> {
        match self.store.get(chat_id).await? {
            Some(session) if session.is_expired(now, self.config.idle_timeout) => {
                self.store.remove(chat_id).await?;
                info!(chat_id = %chat_id, state = %session.state, "Session expired");
                Ok(None)
            }
            other => Ok(other),
        }
    }

    /// Runs `f` on the live session under the chat lock and stores the result.
    async fn update<F>(&self, chat_id: &str, f: F) -> Result<Session>
    where
        F: FnOnce(&mut Session),
    {
        let _guard = self.lock_chat(chat_id).await;
        let now = self.clock.now();
        let mut session = self
            .load_live(chat_id, now)
            .await?
            .ok_or_else(|| SessionError::NotFound(chat_id.to_string()))?;
        f(&mut session);
        session.touch(now);
        self.store.insert(session.clone()).await?;
        Ok(session)
    }

    /// Starts a fresh session, discarding any previous one for the chat.
    pub async fn start(&self, chat_id: &str, author_name: &str) -> Result<Session> {
        let _guard = self.lock_chat(chat_id).await;
        let session = Session::new(chat_id, author_name, self.clock.now());
        if self.store.remove(chat_id).await?.is_some() {
            warn!(chat_id = %chat_id, "Replaced an existing session");
        }
        self.store.insert(session.clone()).await?;
        Ok(session)
    }

    /// Snapshot of the live session.
    pub async fn session(&self, chat_id: &str) -> Result<Session> {
        let _guard = self.lock_chat(chat_id).await;
        self.load_live(chat_id, self.clock.now())
            .await?
            .ok_or_else(|| SessionError::NotFound(chat_id.to_string()))
    }

    pub async fn has_session(&self, chat_id: &str) -> bool {
        self.session(chat_id).await.is_ok()
    }

    pub async fn append_fragment(&self, chat_id: &str, text: &str) -> Result<Session> {
        let max = self.config.title_max_chars;
        self.update(chat_id, |s| {
            s.append_text(text, max);
        })
        .await
    }

    pub async fn append_attachment(&self, chat_id: &str, attachment: Attachment) -> Result<Session> {
        self.update(chat_id, |s| s.append_attachment(attachment)).await
    }

    /// Replaces the title. Blank text leaves it unchanged.
    pub async fn set_title(&self, chat_id: &str, text: &str) -> Result<Session> {
        let max = self.config.title_max_chars;
        self.update(chat_id, |s| {
            s.set_title(text, max);
        })
        .await
    }

    /// Resolves `text` and stores the date. `Ok(None)` when no date was found.
    pub async fn set_delivery_date(&self, chat_id: &str, text: &str) -> Result<Option<ResolvedDate>> {
        let reference = self.clock.now().with_timezone(&self.config.utc_offset);
        let Some(date) = self.dates.parse(text, reference) else {
            self.session(chat_id).await?;
            return Ok(None);
        };
        let stored = date.clone();
        self.update(chat_id, move |s| s.set_delivery_date(stored, text)).await?;
        Ok(Some(date))
    }

    /// Destroys the session without an order.
    pub async fn cancel(&self, chat_id: &str) -> Result<()> {
        let _guard = self.lock_chat(chat_id).await;
        self.load_live(chat_id, self.clock.now())
            .await?
            .ok_or_else(|| SessionError::NotFound(chat_id.to_string()))?;
        self.store.remove(chat_id).await?;
        info!(chat_id = %chat_id, "Session cancelled");
        Ok(())
    }

    /// Converts the session into an order and destroys it. A second call reports `NotFound`.
    pub async fn finalize(&self, chat_id: &str) -> Result<FinalizedOrder> {
        let _guard = self.lock_chat(chat_id).await;
        let now = self.clock.now();
        let mut session = self
            .load_live(chat_id, now)
            .await?
            .ok_or_else(|| SessionError::NotFound(chat_id.to_string()))?;
        self.store.remove(chat_id).await?;
        session.ensure_title(self.config.title_max_chars);
        info!(chat_id = %chat_id, "Session finalized");
        Ok(session.to_order(now))
    }

    /// Live sessions, oldest first.
    pub async fn active_sessions(&self) -> Result<Vec<Session>> {
        let now = self.clock.now();
        let mut sessions: Vec<Session> = self
            .store
            .list()
            .await?
            .into_iter()
            .filter(|s| !s.is_expired(now, self.config.idle_timeout))
            .collect();
        sessions.sort_by_key(|s| s.started_at);
        Ok(sessions)
    }

    /// Removes expired sessions. Returns how many were removed.
    pub async fn purge_expired(&self) -> Result<usize> {
        let candidates = self.store.list().await?;
        let mut removed = 0;
        for candidate in candidates {
            let _guard = self.lock_chat(&candidate.chat_id).await;
            let now = self.clock.now();
            if self.load_live(&candidate.chat_id, now).await?.is_none()
                && candidate.is_expired(now, self.config.idle_timeout)
            {
                removed += 1;
            }
        }
        if removed > 0 {
            info!(removed, "Purged expired sessions");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::TimeZone;

    fn engine_at(now: DateTime<Utc>) -> (SessionEngine, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(now));
        let engine = SessionEngine::new(SessionConfig::default()).with_clock(clock.clone());
        (engine, clock)
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 13, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_bare_command_does_not_open_session() {
        let (engine, _) = engine_at(t0());
        for text in ["sí", "no", "cancelar", "   "] {
            let out = engine.handle(&InboundMessage::text("c", "Ana", text)).await;
            assert_eq!(out, Outcome::NoSession, "{text}");
        }
        assert!(!engine.has_session("c").await);
    }

    #[tokio::test]
    async fn test_image_only_opens_session() {
        let (engine, _) = engine_at(t0());
        let msg = InboundMessage::text("c", "Ana", "").with_attachment(Attachment::new("m1"));
        let out = engine.handle(&msg).await;
        assert!(out.reply().unwrap().contains("imagen"));
        let s = engine.session("c").await.unwrap();
        assert!(s.fragments.is_empty());
        assert_eq!(s.attachments.len(), 1);
    }

    #[tokio::test]
    async fn test_start_replaces_existing() {
        let (engine, _) = engine_at(t0());
        engine.handle(&InboundMessage::text("c", "Ana", "Pedido viejo")).await;
        let fresh = engine.start("c", "Beto").await.unwrap();
        assert!(fresh.fragments.is_empty());
        assert_eq!(engine.session("c").await.unwrap().author_name, "Beto");
    }

    #[tokio::test]
    async fn test_explicit_ops_need_live_session() {
        let (engine, _) = engine_at(t0());
        assert!(matches!(engine.append_fragment("x", "hola").await, Err(SessionError::NotFound(_))));
        assert!(matches!(engine.set_title("x", "t").await, Err(SessionError::NotFound(_))));
        assert!(matches!(engine.set_delivery_date("x", "mañana").await, Err(SessionError::NotFound(_))));
        assert!(matches!(engine.set_delivery_date("x", "blah").await, Err(SessionError::NotFound(_))));
        assert!(matches!(engine.cancel("x").await, Err(SessionError::NotFound(_))));
        assert!(matches!(engine.finalize("x").await, Err(SessionError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_explicit_flow_and_finalize_twice() {
        let (engine, _) = engine_at(t0());
        engine.start("c", "Ana").await.unwrap();
        engine.append_fragment("c", "Maceta hexagonal").await.unwrap();
        engine.append_attachment("c", Attachment::new("m9")).await.unwrap();
        let date = engine.set_delivery_date("c", "el viernes").await.unwrap().unwrap();
        assert_eq!(date.date().to_string(), "2026-10-23");
        assert!(engine.set_delivery_date("c", "cuando puedas").await.unwrap().is_none());

        let order = engine.finalize("c").await.unwrap();
        assert_eq!(order.title, "Maceta hexagonal");
        assert_eq!(order.attachments.len(), 1);
        assert_eq!(order.delivery_date, Some(date.instant));
        assert!(matches!(engine.finalize("c").await, Err(SessionError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let (engine, clock) = engine_at(t0());
        engine.start("old", "Ana").await.unwrap();
        clock.advance(chrono::Duration::minutes(20));
        engine.start("new", "Beto").await.unwrap();
        clock.advance(chrono::Duration::minutes(15));

        assert_eq!(engine.purge_expired().await.unwrap(), 1);
        assert!(!engine.has_session("old").await);
        assert!(engine.has_session("new").await);
        assert_eq!(engine.active_sessions().await.unwrap().len(), 1);
    }
}
