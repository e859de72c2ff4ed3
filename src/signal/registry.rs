//! Signal implementation

use std::sync::Arc;

use parking_lot::Mutex;

/// Shared callback invoked with a reference to the raised event
pub type Callback<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Identifier of a subscription within one [`Signal`]
///
/// Zero is reserved for "no subscription" ([`CallbackId::NONE`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CallbackId(u64);

impl CallbackId {
    /// The null subscription id
    pub const NONE: CallbackId = CallbackId(0);

    /// Check if this id refers to no subscription
    pub fn is_none(&self) -> bool {
        self.0 == 0
    }

    /// Raw id value
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for CallbackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

struct Subscriber<E> {
    id: CallbackId,
    callback: Callback<E>,
}

impl<E> Clone for Subscriber<E> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            callback: Arc::clone(&self.callback),
        }
    }
}

struct Slots<E> {
    next_id: u64,
    subscribers: Arc<Vec<Subscriber<E>>>,
}

/// Ordered, thread-safe fan-out of events to subscribed callbacks
pub struct Signal<E> {
    slots: Mutex<Slots<E>>,
}

impl<E> Signal<E> {
    /// Create a signal with no subscribers
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(Slots {
                next_id: 1,
                subscribers: Arc::new(Vec::new()),
            }),
        }
    }

    /// Subscribe a callback
    ///
    /// Returns an id unique within this signal and never [`CallbackId::NONE`].
    pub fn subscribe<F>(&self, callback: F) -> CallbackId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        self.subscribe_shared(Arc::new(callback))
    }

    /// Subscribe an already shared callback
    pub fn subscribe_shared(&self, callback: Callback<E>) -> CallbackId {
        let mut slots = self.slots.lock();
        let id = CallbackId(slots.next_id);
        slots.next_id += 1;
        Arc::make_mut(&mut slots.subscribers).push(Subscriber { id, callback });
        id
    }

    /// Remove the subscription identified by `id` and reset `id` to
    /// [`CallbackId::NONE`]
    ///
    /// Returns whether a subscriber was removed. Unknown or null ids are a no-op.
    pub fn unsubscribe(&self, id: &mut CallbackId) -> bool {
        let target = std::mem::take(id);
        if target.is_none() {
            return false;
        }

        let mut slots = self.slots.lock();
        match slots.subscribers.iter().position(|s| s.id == target) {
            Some(index) => {
                Arc::make_mut(&mut slots.subscribers).remove(index);
                true
            }
            None => false,
        }
    }

    /// Invoke every current subscriber in registration order
    ///
    /// Subscribers added or removed by a callback during this raise take
    /// effect from the next raise. Returns the number of callbacks invoked.
    pub fn raise(&self, event: &E) -> usize {
        let snapshot = Arc::clone(&self.slots.lock().subscribers);
        for subscriber in snapshot.iter() {
            (subscriber.callback)(event);
        }
        snapshot.len()
    }

    /// Number of current subscribers
    pub fn len(&self) -> usize {
        self.slots.lock().subscribers.len()
    }

    /// Check if there are no subscribers
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if `id` is a live subscription
    pub fn contains(&self, id: CallbackId) -> bool {
        !id.is_none() && self.slots.lock().subscribers.iter().any(|s| s.id == id)
    }
}

impl<E> Default for Signal<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> std::fmt::Debug for Signal<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("subscribers", &self.len())
            .finish()
    }
}
