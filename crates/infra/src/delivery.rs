//! Outbound email collaborator.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use charterwise_invoicing::{EmailAddress, InvoiceId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("recipient rejected: {0}")]
    Rejected(String),

    #[error("mail transport unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingInvoice {
    pub invoice_id: InvoiceId,
    pub invoice_number: String,
    pub recipient: EmailAddress,
    pub message: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: &OutgoingInvoice) -> Result<(), DeliveryError>;
}

#[async_trait]
impl<M> Mailer for Arc<M>
where
    M: Mailer + ?Sized,
{
    async fn send(&self, mail: &OutgoingInvoice) -> Result<(), DeliveryError> {
        (**self).send(mail).await
    }
}

/// Succeeds after a fixed delay and remembers what it "sent".
#[derive(Debug, Default)]
pub struct SimulatedMailer {
    delay: Duration,
    outbox: Mutex<Vec<OutgoingInvoice>>,
}

impl SimulatedMailer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            outbox: Mutex::new(Vec::new()),
        }
    }

    pub fn outbox(&self) -> Vec<OutgoingInvoice> {
        self.outbox.lock().map(|o| o.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Mailer for SimulatedMailer {
    async fn send(&self, mail: &OutgoingInvoice) -> Result<(), DeliveryError> {
        debug!(invoice = %mail.invoice_id, recipient = mail.recipient.as_str(), "sending");
        tokio::time::sleep(self.delay).await;
        self.outbox
            .lock()
            .map_err(|_| DeliveryError::Unavailable("outbox lock poisoned".to_string()))?
            .push(mail.clone());
        Ok(())
    }
}
