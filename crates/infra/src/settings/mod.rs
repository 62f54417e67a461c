//! User preferences for the assistant features.
//!
//! Two independent boolean flags, read once when the service is built and
//! written through to the store on every change.

mod json_file;
mod service;
mod store;

pub use json_file::JsonFileSettingsStore;
pub use service::{AiSettings, SettingsService};
pub use store::{InMemorySettingsStore, SettingsError, SettingsStore};

pub const ADVICE_ENABLED_KEY: &str = "aiAdviceEnabled";
pub const CHATBOT_ENABLED_KEY: &str = "aiChatbotEnabled";
