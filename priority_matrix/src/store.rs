//! The storage boundary.
//!
//! A store keeps the initiatives of one session, indexed by id, and tells its
//! subscribers about every change by handing them the full current snapshot.
//! Subscribers never see deltas.

use log::{debug, info};

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::config::*;

/// The full content of a session at one point in time.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Snapshot {
    pub initiatives: Vec<Initiative>,
}

impl Snapshot {
    pub fn get(&self, id: &str) -> Option<&Initiative> {
        self.initiatives.iter().find(|i| i.id == id)
    }
}

pub type SnapshotHandler = Box<dyn FnMut(&Snapshot)>;

/// Storage of the initiatives of a session.
pub trait InitiativeStore {
    type Error: std::error::Error;

    /// Replaces all the initiatives of the session with freshly ingested ones.
    ///
    /// Returns the ids assigned to the new initiatives, in input order.
    fn replace_all(
        &mut self,
        records: Vec<InitiativeFields>,
    ) -> Result<Vec<InitiativeId>, Self::Error>;

    /// The current content of the session.
    fn snapshot(&self) -> Snapshot;

    /// Overwrites the vote list of one initiative.
    fn update_votes(&mut self, id: &str, votes: Vec<Vote>) -> Result<(), Self::Error>;

    /// Registers a handler called with the full snapshot after every change.
    ///
    /// The handler is called once right away with the current snapshot. It
    /// stays registered until the returned handle is cancelled or dropped.
    fn subscribe(&mut self, handler: SnapshotHandler) -> Subscription;
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    handlers: Vec<(u64, SnapshotHandler)>,
    // Handlers taken out of the list while a notification runs.
    in_flight: Vec<u64>,
    // Handlers cancelled while they were in flight.
    cancelled: Vec<u64>,
}

impl Registry {
    fn contains(&self, id: u64) -> bool {
        let listed = self.handlers.iter().any(|(h, _)| *h == id) || self.in_flight.contains(&id);
        listed && !self.cancelled.contains(&id)
    }

    fn remove(&mut self, id: u64) {
        if self.in_flight.contains(&id) {
            self.cancelled.push(id);
        } else {
            self.handlers.retain(|(h, _)| *h != id);
        }
    }
}

/// Handle of a registered snapshot handler.
///
/// Dropping the handle unregisters the handler. This also holds when the
/// handle is dropped from inside a handler: a cancelled handler is not
/// called again, not even later in the same notification.
#[must_use = "the handler is unregistered when the subscription is dropped"]
pub struct Subscription {
    id: u64,
    registry: Weak<RefCell<Registry>>,
}

impl Subscription {
    pub fn cancel(self) {
        // Unregistration happens in drop.
    }

    pub fn is_active(&self) -> bool {
        self.registry
            .upgrade()
            .map(|r| r.borrow().contains(self.id))
            .unwrap_or(false)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.borrow_mut().remove(self.id);
            debug!("subscription {} cancelled", self.id);
        }
    }
}

/// A list of subscribers to snapshot changes.
///
/// Store implementations embed one and call `notify` after each successful write.
#[derive(Default)]
pub struct Subscribers {
    registry: Rc<RefCell<Registry>>,
}

impl Subscribers {
    pub fn add(&self, mut handler: SnapshotHandler, current: &Snapshot) -> Subscription {
        handler(current);
        let mut r = self.registry.borrow_mut();
        r.next_id += 1;
        let id = r.next_id;
        r.handlers.push((id, handler));
        Subscription {
            id,
            registry: Rc::downgrade(&self.registry),
        }
    }

    pub fn notify(&self, snapshot: &Snapshot) {
        // Handlers may drop subscriptions while they run.
        let mut handlers = {
            let mut r = self.registry.borrow_mut();
            let handlers = std::mem::take(&mut r.handlers);
            r.in_flight = handlers.iter().map(|(id, _)| *id).collect();
            handlers
        };
        debug!("notify: {} subscribers", handlers.len());
        for (id, handler) in handlers.iter_mut() {
            if self.registry.borrow().cancelled.contains(id) {
                continue;
            }
            handler(snapshot);
        }

        let mut r = self.registry.borrow_mut();
        let cancelled = std::mem::take(&mut r.cancelled);
        r.in_flight.clear();
        handlers.retain(|(id, _)| !cancelled.contains(id));
        handlers.append(&mut r.handlers);
        r.handlers = handlers;
    }

    pub fn len(&self) -> usize {
        let r = self.registry.borrow();
        r.handlers.len() + r.in_flight.len() - r.cancelled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Derives the id of an ingested initiative.
///
/// The id is a hash of the session, of the position of the row in the file and
/// of the initiative name, so that ingesting the same file in the same
/// session yields the same ids.
pub fn initiative_id(session_id: &str, ordinal: usize, fields: &InitiativeFields) -> InitiativeId {
    let data = format!("{}:{:08}:{}", session_id, ordinal, fields.name);
    let digest = sha256::digest(data.as_str());
    digest[..20].to_string()
}

/// Turns ingested records into new initiatives, without votes.
pub fn assign_ids(session_id: &str, records: Vec<InitiativeFields>) -> Vec<Initiative> {
    records
        .into_iter()
        .enumerate()
        .map(|(idx, fields)| {
            let id = initiative_id(session_id, idx, &fields);
            Initiative::new(&id, fields)
        })
        .collect()
}

/// A store that keeps everything in memory.
pub struct MemoryStore {
    session_id: String,
    snapshot: Snapshot,
    subscribers: Subscribers,
}

impl MemoryStore {
    pub fn new(session_id: &str) -> MemoryStore {
        MemoryStore::from_initiatives(session_id, Vec::new())
    }

    pub fn from_initiatives(session_id: &str, initiatives: Vec<Initiative>) -> MemoryStore {
        MemoryStore {
            session_id: session_id.to_string(),
            snapshot: Snapshot { initiatives },
            subscribers: Subscribers::default(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Replaces the whole content of the store and notifies the subscribers.
    pub fn reset(&mut self, initiatives: Vec<Initiative>) {
        self.snapshot = Snapshot { initiatives };
        self.subscribers.notify(&self.snapshot);
    }
}

impl InitiativeStore for MemoryStore {
    type Error = MatrixErrors;

    fn replace_all(
        &mut self,
        records: Vec<InitiativeFields>,
    ) -> Result<Vec<InitiativeId>, MatrixErrors> {
        let initiatives = assign_ids(&self.session_id, records);
        let ids: Vec<InitiativeId> = initiatives.iter().map(|i| i.id.clone()).collect();
        info!(
            "session {}: replacing {} initiatives with {}",
            self.session_id,
            self.snapshot.initiatives.len(),
            ids.len()
        );
        self.reset(initiatives);
        Ok(ids)
    }

    fn snapshot(&self) -> Snapshot {
        self.snapshot.clone()
    }

    fn update_votes(&mut self, id: &str, votes: Vec<Vote>) -> Result<(), MatrixErrors> {
        let initiative = self
            .snapshot
            .initiatives
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| MatrixErrors::InitiativeNotFound(id.to_string()))?;
        initiative.set_votes(votes);
        self.subscribers.notify(&self.snapshot);
        Ok(())
    }

    fn subscribe(&mut self, handler: SnapshotHandler) -> Subscription {
        self.subscribers.add(handler, &self.snapshot)
    }
}
