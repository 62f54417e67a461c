//! Infrastructure layer: configuration, settings persistence, simulated
//! collaborators and the session workspace that owns the invoice collection.

pub mod chat;
pub mod config;
pub mod delivery;
pub mod extraction;
pub mod in_flight;
pub mod notice;
pub mod settings;
pub mod workspace;

pub use chat::ChatResponder;
pub use config::{ConfigError, WorkspaceConfig};
pub use delivery::{DeliveryError, Mailer, OutgoingInvoice, SimulatedMailer};
pub use extraction::{ExtractionError, Extractor, SimulatedExtractor};
pub use in_flight::{InFlight, InFlightGuard};
pub use notice::{Notice, Severity};
pub use settings::{
    AiSettings, InMemorySettingsStore, JsonFileSettingsStore, SettingsError, SettingsService,
    SettingsStore,
};
pub use workspace::{InvoiceWorkspace, WorkflowError};
