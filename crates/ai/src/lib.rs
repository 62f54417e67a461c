//! `charterwise-ai`
//!
//! **Responsibility:** canned assistant features.
//!
//! This crate is intentionally **not** part of the invoice domain:
//! - It must not depend on invoicing aggregates.
//! - It must not mutate domain state.
//! - It produces text for the user, nothing else.

pub mod advice;
pub mod chat;
pub mod error;

pub use advice::{AdviceCatalog, FeatureTag};
pub use chat::{ChatMessage, ChatRole, ChatTranscript, PendingReply};
pub use error::AiError;
