// SPDX-License-Identifier: GPL-3.0-only

//! Rotary input
//!
//! The host publishes scroll-wheel style events; one component at a time
//! subscribes to them. When an event is delivered the host skips its own
//! handling of that key or wheel movement.

use tokio::sync::mpsc;
use tracing::debug;

/// Direction of one rotary detent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotaryEvent {
    Forward,
    Backward,
}

/// Whether an event reached a subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Consumed,
    Ignored,
}

/// Subscription handle identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

/// Single-subscriber rotary event hub
#[derive(Debug, Default)]
pub struct RotaryInput {
    subscriber: Option<(SubscriptionId, mpsc::UnboundedSender<RotaryEvent>)>,
    next_id: u64,
}

impl RotaryInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe, replacing any previous subscriber
    pub fn subscribe(&mut self) -> (SubscriptionId, mpsc::UnboundedReceiver<RotaryEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        if self.subscriber.replace((id, tx)).is_some() {
            debug!("Rotary subscriber replaced");
        }
        (id, rx)
    }

    /// Remove the subscriber if `id` is still the active one
    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        if self.subscriber.as_ref().is_some_and(|(active, _)| *active == id) {
            self.subscriber = None;
        }
    }

    pub fn has_subscriber(&self) -> bool {
        self.subscriber
            .as_ref()
            .is_some_and(|(_, tx)| !tx.is_closed())
    }

    /// Deliver an event to the subscriber
    pub fn dispatch(&mut self, event: RotaryEvent) -> Dispatch {
        let Some((_, tx)) = &self.subscriber else {
            return Dispatch::Ignored;
        };
        if tx.send(event).is_err() {
            debug!("Rotary subscriber gone, dropping it");
            self.subscriber = None;
            return Dispatch::Ignored;
        }
        Dispatch::Consumed
    }
}
