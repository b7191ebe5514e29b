//! Write notifications and live queries.
//!
//! # Responsibility
//! - Broadcast one [`ChangeEvent`] per committed write.
//! - Re-evaluate subscribed queries when a write touches their collections.
//!
//! # Invariants
//! - A live query subscribes before its first evaluation, so no write that
//!   lands after the initial snapshot is missed.
//! - Several writes may coalesce into one refresh; a lagged receiver counts
//!   as a change.
//! - A change stays pending until a refresh succeeds; a failed refresh is
//!   retried by the next `poll`/`wait`.
//! - Dropping or cancelling a live query releases its subscription.

use super::{Collection, RepoError, RepoResult};
use log::debug;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};

const CHANGE_BUS_CAPACITY: usize = 256;

/// One committed write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub collection: Collection,
    pub id: String,
}

/// Publish/subscribe channel shared by every store handle of one database.
#[derive(Debug, Clone)]
pub struct ChangeBus {
    sender: broadcast::Sender<ChangeEvent>,
}

impl ChangeBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANGE_BUS_CAPACITY);
        Self { sender }
    }

    pub fn publish(&self, collection: Collection, id: &str) {
        // A send error only means nobody is subscribed.
        let _ = self.sender.send(ChangeEvent {
            collection,
            id: id.to_string(),
        });
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ChangeBus {
    fn default() -> Self {
        Self::new()
    }
}

type Query<'a, S, T> = Box<dyn FnMut(&S) -> RepoResult<T> + 'a>;

/// Query result that is re-evaluated when its collections change.
pub struct LiveQuery<'a, S, T> {
    source: &'a S,
    query: Query<'a, S, T>,
    collections: Vec<Collection>,
    receiver: broadcast::Receiver<ChangeEvent>,
    current: T,
    dirty: bool,
}

impl<'a, S, T> LiveQuery<'a, S, T> {
    pub(crate) fn start(
        source: &'a S,
        bus: &ChangeBus,
        collections: &[Collection],
        mut query: impl FnMut(&S) -> RepoResult<T> + 'a,
    ) -> RepoResult<Self> {
        let receiver = bus.subscribe();
        let current = query(source)?;
        Ok(Self {
            source,
            query: Box::new(query),
            collections: collections.to_vec(),
            receiver,
            current,
            dirty: false,
        })
    }

    /// Latest evaluated result.
    pub fn current(&self) -> &T {
        &self.current
    }

    /// Refreshes if a relevant write happened since the last evaluation.
    ///
    /// Never blocks. Returns `None` when nothing relevant changed.
    pub fn poll(&mut self) -> RepoResult<Option<&T>> {
        self.drain_pending();
        if !self.dirty {
            return Ok(None);
        }
        self.refresh()?;
        Ok(Some(&self.current))
    }

    /// Blocks until a relevant write happens, then refreshes.
    ///
    /// Must not be called from inside an async runtime.
    pub fn wait(&mut self) -> RepoResult<&T> {
        self.drain_pending();
        while !self.dirty {
            match self.receiver.blocking_recv() {
                Ok(event) => self.dirty = self.touches(&event),
                Err(RecvError::Lagged(_)) => self.dirty = true,
                Err(RecvError::Closed) => return Err(RepoError::SubscriptionClosed),
            }
        }
        self.drain_pending();
        self.refresh()?;
        Ok(&self.current)
    }

    /// Stops notifications and releases the subscription.
    pub fn cancel(self) {
        debug!(
            "event=live_query_cancel module=repo status=ok collections={}",
            self.collections.len()
        );
    }

    fn refresh(&mut self) -> RepoResult<()> {
        self.current = (self.query)(self.source)?;
        self.dirty = false;
        Ok(())
    }

    fn touches(&self, event: &ChangeEvent) -> bool {
        self.collections.contains(&event.collection)
    }

    fn drain_pending(&mut self) {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => self.dirty |= self.touches(&event),
                Err(TryRecvError::Lagged(_)) => self.dirty = true,
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
    }
}
