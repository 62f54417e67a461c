//! Publish/subscribe abstraction (mechanics only).
//!
//! The bus distributes messages (domain events, user-visible notices) to any
//! number of subscribers. It makes minimal assumptions:
//!
//! - **Transport-agnostic**: in-memory channels today, anything else later
//! - **Broadcast**: every subscriber receives a copy of every message
//! - **No persistence**: the bus is for distribution; the invoice collection
//!   remains the source of truth

use std::sync::mpsc::Receiver;

/// A subscription to a message stream.
///
/// ```ignore
/// let subscription = bus.subscribe();
/// for notice in subscription.drain() {
///     show_toast(notice);
/// }
/// ```
///
/// Subscriptions are designed for single-threaded consumption.
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: Receiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: Receiver<M>) -> Self {
        Self { receiver }
    }

    /// Drain every message currently buffered, without blocking.
    pub fn drain(&self) -> Vec<M> {
        self.receiver.try_iter().collect()
    }
}

/// Message bus contract.
///
/// `publish()` can fail; callers decide whether that matters. Losing a notice
/// never rolls back the state change that produced it.
pub trait EventBus<M>: Send + Sync {
    type Error: core::fmt::Debug + Send + Sync + 'static;

    fn publish(&self, message: M) -> Result<(), Self::Error>;

    fn subscribe(&self) -> Subscription<M>;
}
