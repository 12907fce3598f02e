//! Publish/subscribe abstraction for ledger notifications.
//!
//! The bus carries transient messages (user-facing notices) from the command
//! path to whatever presents them. It stores nothing: a subscriber that is not
//! listening when a message is published never sees it.

use std::sync::Arc;
use std::sync::mpsc::{Receiver, TryRecvError};

/// Receiving end of a bus subscription.
///
/// Every subscription gets its own copy of each message published after it was
/// created, in publication order.
///
/// ```ignore
/// let subscription = bus.subscribe();
/// dispatcher.dispatch(command).await?;
/// for notice in subscription.drain() {
///     render(notice);
/// }
/// ```
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: Receiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: Receiver<M>) -> Self {
        Self { receiver }
    }

    /// Try to receive a message without blocking.
    pub fn try_recv(&self) -> Result<M, TryRecvError> {
        self.receiver.try_recv()
    }

    /// Everything already queued, without blocking.
    pub fn drain(&self) -> Vec<M> {
        self.receiver.try_iter().collect()
    }
}

/// Broadcast bus.
///
/// `publish` fans a message out to all live subscriptions. Implementations must
/// be shareable across threads; the dispatcher holds one behind an `Arc`.
pub trait EventBus<M>: Send + Sync {
    type Error: core::fmt::Debug + Send + Sync + 'static;

    fn publish(&self, message: M) -> Result<(), Self::Error>;

    fn subscribe(&self) -> Subscription<M>;
}

impl<M, B> EventBus<M> for Arc<B>
where
    B: EventBus<M> + ?Sized,
{
    type Error = B::Error;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        (**self).publish(message)
    }

    fn subscribe(&self) -> Subscription<M> {
        (**self).subscribe()
    }
}
