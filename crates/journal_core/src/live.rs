//! Change notifications and re-executing ("live") reads.
//!
//! # Responsibility
//! - Publish one [`Change`] per successful service write.
//! - Let readers re-run their query when a collection they depend on changed,
//!   and only hand back results that actually differ.
//!
//! # Invariants
//! - A [`LiveQuery`] subscribes before its first execution, so no write
//!   committed after construction can be missed.
//! - Dropped subscribers are pruned on the next publish.
//! - Delivery across simultaneous writes is only eventually consistent with
//!   the latest committed state.

use crate::repo::RepoResult;
use log::debug;
use parking_lot::Mutex;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

/// Persisted collection touched by a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Entries,
    Tags,
}

impl Collection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Entries => "entries",
            Self::Tags => "tags",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
}

/// One committed write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Change {
    pub collection: Collection,
    pub kind: ChangeKind,
}

impl Change {
    pub fn new(collection: Collection, kind: ChangeKind) -> Self {
        Self { collection, kind }
    }
}

/// Cloneable publish/subscribe handle. Clones share one subscriber list.
#[derive(Debug, Clone, Default)]
pub struct ChangeFeed {
    subscribers: Arc<Mutex<Vec<Sender<Change>>>>,
}

impl ChangeFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new subscriber that sees every change published from now on.
    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::channel();
        self.subscribers.lock().push(tx);
        Subscription { rx }
    }

    pub fn publish(&self, change: Change) {
        let mut subscribers = self.subscribers.lock();
        subscribers.retain(|tx| tx.send(change).is_ok());
        debug!(
            "event=change_publish module=live collection={} kind={:?} subscribers={}",
            change.collection.as_str(),
            change.kind,
            subscribers.len()
        );
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}

/// Receiving end of a [`ChangeFeed`].
#[derive(Debug)]
pub struct Subscription {
    rx: Receiver<Change>,
}

impl Subscription {
    /// Returns every change received since the last drain, without blocking.
    pub fn drain(&self) -> Vec<Change> {
        self.rx.try_iter().collect()
    }
}

/// A read that re-executes whenever one of its collections changes.
///
/// The read closure usually borrows services or a connection, hence the
/// lifetime parameter.
pub struct LiveQuery<'a, T> {
    subscription: Subscription,
    collections: Vec<Collection>,
    read: Box<dyn FnMut() -> RepoResult<T> + 'a>,
    last: Option<T>,
}

impl<'a, T: Clone + PartialEq> LiveQuery<'a, T> {
    pub fn new(
        feed: &ChangeFeed,
        collections: &[Collection],
        read: impl FnMut() -> RepoResult<T> + 'a,
    ) -> Self {
        Self {
            subscription: feed.subscribe(),
            collections: collections.to_vec(),
            read: Box::new(read),
            last: None,
        }
    }

    /// Last delivered result, if any.
    pub fn current(&self) -> Option<&T> {
        self.last.as_ref()
    }

    /// Runs the read when needed and returns the result if it is new.
    ///
    /// - First call: always executes and delivers.
    /// - Later calls: execute only after a relevant change; deliver only when
    ///   the result differs from the previous delivery.
    pub fn poll(&mut self) -> RepoResult<Option<T>> {
        let relevant = self
            .subscription
            .drain()
            .iter()
            .any(|change| self.collections.contains(&change.collection));
        if self.last.is_some() && !relevant {
            return Ok(None);
        }

        let fresh = (self.read)()?;
        if self.last.as_ref() == Some(&fresh) {
            return Ok(None);
        }

        self.last = Some(fresh.clone());
        Ok(Some(fresh))
    }
}
