//! Workspace configuration.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use thiserror::Error;

use charterwise_invoicing::{DEFAULT_DUE_DAYS, DEFAULT_TAX_RATE_PERCENT, TaxRate};

pub const ENV_PROCESSING_DELAY_MS: &str = "CHARTERWISE_PROCESSING_DELAY_MS";
pub const ENV_SEND_DELAY_MS: &str = "CHARTERWISE_SEND_DELAY_MS";
pub const ENV_CHAT_DELAY_MS: &str = "CHARTERWISE_CHAT_DELAY_MS";
pub const ENV_DEFAULT_TAX_RATE: &str = "CHARTERWISE_DEFAULT_TAX_RATE";
pub const ENV_DUE_DAYS: &str = "CHARTERWISE_DUE_DAYS";
pub const ENV_SETTINGS_PATH: &str = "CHARTERWISE_SETTINGS_PATH";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} is not a valid value: {value:?}")]
    Malformed { var: &'static str, value: String },

    #[error("{var} is out of range: {reason}")]
    OutOfRange { var: &'static str, reason: String },
}

/// Runtime knobs for an [`InvoiceWorkspace`](crate::InvoiceWorkspace).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceConfig {
    /// Simulated extraction latency.
    pub processing_delay: Duration,
    /// Simulated email latency.
    pub send_delay: Duration,
    /// Delay before the assistant answers.
    pub chat_reply_delay: Duration,
    /// Tax rate pre-filled on new drafts and applied to extracted invoices
    /// that carry none.
    pub default_tax_rate: TaxRate,
    pub default_due_days: u32,
    /// JSON file for settings; in-memory when `None`.
    pub settings_path: Option<PathBuf>,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            processing_delay: Duration::from_millis(2000),
            send_delay: Duration::from_millis(2000),
            chat_reply_delay: Duration::from_millis(1000),
            default_tax_rate: TaxRate::new(Decimal::from(DEFAULT_TAX_RATE_PERCENT)),
            default_due_days: DEFAULT_DUE_DAYS,
            settings_path: None,
        }
    }
}

impl WorkspaceConfig {
    /// Read overrides from `CHARTERWISE_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(ms) = parse_var::<u64, _>(&lookup, ENV_PROCESSING_DELAY_MS)? {
            config.processing_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, ENV_SEND_DELAY_MS)? {
            config.send_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, ENV_CHAT_DELAY_MS)? {
            config.chat_reply_delay = Duration::from_millis(ms);
        }
        if let Some(percent) = parse_var::<Decimal, _>(&lookup, ENV_DEFAULT_TAX_RATE)? {
            let rate = TaxRate::new(percent);
            rate.validate().map_err(|e| ConfigError::OutOfRange {
                var: ENV_DEFAULT_TAX_RATE,
                reason: e.to_string(),
            })?;
            config.default_tax_rate = rate;
        }
        if let Some(days) = parse_var::<u32, _>(&lookup, ENV_DUE_DAYS)? {
            config.default_due_days = days;
        }
        if let Some(path) = lookup(ENV_SETTINGS_PATH).filter(|p| !p.trim().is_empty()) {
            config.settings_path = Some(PathBuf::from(path));
        }

        Ok(config)
    }

    /// No simulated latency. Handy for tests and scripted sessions.
    pub fn instant() -> Self {
        Self {
            processing_delay: Duration::ZERO,
            send_delay: Duration::ZERO,
            chat_reply_delay: Duration::ZERO,
            ..Self::default()
        }
    }
}

fn parse_var<T, F>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(var) else {
        return Ok(None);
    };
    raw.trim().parse::<T>().map(Some).map_err(|_| {
        tracing::warn!(var, value = %raw, "malformed configuration value");
        ConfigError::Malformed { var, value: raw }
    })
}
