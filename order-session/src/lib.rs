//! # order-session
//!
//! Conversation engine for order intake: one finite-state machine per chat that collects text and
//! image references, proposes a title, resolves a delivery date and emits a [`FinalizedOrder`].
//!
//! - [`state`] – [`OrderState`] and reply classification
//! - [`transition`] – the pure `(state, input)` transition table
//! - [`session`] – the per-chat draft [`Session`]
//! - [`store`] – [`SessionStore`] and the in-memory implementation
//! - [`engine`] – [`SessionEngine`]: per-chat locking, lazy expiry, explicit operations
//! - [`sweeper`] – optional periodic purge
//!
//! Sessions are volatile. A session untouched for longer than the idle timeout is treated as absent.
//!
//! [`FinalizedOrder`]: intake_core::FinalizedOrder

pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod prompts;
pub mod session;
pub mod state;
pub mod store;
pub mod sweeper;
pub mod transition;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::SessionConfig;
pub use engine::{Outcome, SessionEngine};
pub use error::{Result, SessionError};
pub use session::Session;
pub use state::OrderState;
pub use store::{InMemorySessionStore, SessionStore};
pub use sweeper::SessionSweeper;
