// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Joborc Contributors

//! In-process pub/sub for UI updates and the Status Service (§4.1, §5).
//!
//! Unlike the teacher's WAL-backed bus, events here are ephemeral (per
//! [`joborc_core::Event`]'s own doc comment) — there is nothing to recover,
//! so subscribers are plain unbounded mpsc channels rather than a durable
//! log with replay. What carries over is the shape: a cheap `Clone`-able
//! handle for publishers, `send`/non-blocking-wake decoupled from a
//! receiver loop owned by whoever is consuming.
//!
//! Per-subscriber ordering falls out of the channel itself: `publish`
//! fans an event out to every subscriber's queue in one call, so two
//! events published in sequence arrive at each subscriber in that same
//! sequence. There is no cross-subscriber ordering guarantee, which §5
//! does not require.
//!
//! `publish`/`publish_sync` both take a [`CancellationToken`] as their
//! `ctx` (the same type the teacher's connection listener races against
//! client disconnect), erroring only if it is already cancelled before
//! dispatch begins. `publish` returns as soon as dispatch starts, same
//! as before; `publish_sync` waits for every live subscriber to actually
//! pull the event off its queue before returning.

use crate::error::EngineError;
use joborc_core::Event;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, Notify};
use tokio_util::sync::CancellationToken;

/// A message delivered to a subscriber's channel: a plain fire-and-forget
/// event, or one paired with a `Notify` that `publish_sync` waits on.
enum Delivery {
    Fire(Event),
    Sync(Event, Arc<Notify>),
}

/// Shared handle for publishing events. Cheap to clone; all clones refer
/// to the same subscriber set.
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<Mutex<Inner>>,
}

struct Inner {
    next_id: u64,
    subscribers: HashMap<u64, mpsc::UnboundedSender<Delivery>>,
}

/// A single subscription. Dropping it unregisters the subscriber so
/// `publish` stops holding a dead sender.
pub struct Subscription {
    id: u64,
    bus: Arc<Mutex<Inner>>,
    receiver: mpsc::UnboundedReceiver<Delivery>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self { inner: Arc::new(Mutex::new(Inner { next_id: 0, subscribers: HashMap::new() })) }
    }

    /// Register a new subscriber. The returned [`Subscription`] yields
    /// every event published after this call, in publish order.
    pub fn subscribe(&self) -> Subscription {
        let mut inner = self.inner.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        let (tx, rx) = mpsc::unbounded_channel();
        inner.subscribers.insert(id, tx);
        Subscription { id, bus: Arc::clone(&self.inner), receiver: rx }
    }

    /// Fan `event` out to every live subscriber, returning an error only
    /// if `ctx` was already cancelled before dispatch began (§4.1).
    /// Otherwise never blocks and never fails past that check: a
    /// subscriber that has stopped polling just accumulates an unbounded
    /// backlog until it is dropped.
    pub fn publish(&self, ctx: &CancellationToken, event: Event) -> Result<(), EngineError> {
        if ctx.is_cancelled() {
            return Err(EngineError::Other("publish cancelled before dispatch began".to_string()));
        }
        let inner = self.inner.lock();
        for tx in inner.subscribers.values() {
            let _ = tx.send(Delivery::Fire(event.clone()));
        }
        Ok(())
    }

    /// Same dispatch and same cancellation check as `publish`, but blocks
    /// until every live subscriber has pulled `event` off its queue
    /// before returning (§4.1's "blocks until all handlers return").
    pub async fn publish_sync(&self, ctx: &CancellationToken, event: Event) -> Result<(), EngineError> {
        if ctx.is_cancelled() {
            return Err(EngineError::Other("publish_sync cancelled before dispatch began".to_string()));
        }
        let acks: Vec<Arc<Notify>> = {
            let inner = self.inner.lock();
            inner
                .subscribers
                .values()
                .map(|tx| {
                    let notify = Arc::new(Notify::new());
                    let _ = tx.send(Delivery::Sync(event.clone(), Arc::clone(&notify)));
                    notify
                })
                .collect()
        };
        for notify in acks {
            notify.notified().await;
        }
        Ok(())
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().subscribers.len()
    }
}

impl Subscription {
    /// Wait for the next event. Returns `None` once the bus itself has
    /// been dropped (all publisher handles gone). A `Sync` delivery is
    /// acknowledged as soon as it is received, before the caller does
    /// anything with the returned event.
    pub async fn recv(&mut self) -> Option<Event> {
        match self.receiver.recv().await? {
            Delivery::Fire(event) => Some(event),
            Delivery::Sync(event, notify) => {
                notify.notify_one();
                Some(event)
            }
        }
    }

    /// Non-blocking poll, mainly for tests asserting "nothing was published".
    pub fn try_recv(&mut self) -> Result<Event, mpsc::error::TryRecvError> {
        match self.receiver.try_recv()? {
            Delivery::Fire(event) => Ok(event),
            Delivery::Sync(event, notify) => {
                notify.notify_one();
                Ok(event)
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.bus.lock().subscribers.remove(&self.id);
    }
}

#[cfg(test)]
#[path = "event_bus_tests.rs"]
mod tests;
