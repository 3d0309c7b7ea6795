//! Subscription lists with detachable handles.

use std::fmt;

/// Handle returned by a subscription, used to detach it again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Raw numeric form of the handle.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Ordered list of callbacks that may be notified any number of times.
///
/// `F` is usually an unsized closure type such as `dyn FnMut(&Event) + Send`.
pub struct Subscribers<F: ?Sized> {
    entries: Vec<(SubscriptionId, Box<F>)>,
    next: u64,
}

impl<F: ?Sized> Subscribers<F> {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next: 0,
        }
    }

    /// Appends `callback` and returns the handle that detaches it.
    pub fn subscribe(&mut self, callback: Box<F>) -> SubscriptionId {
        self.next = self.next.saturating_add(1);
        let id = SubscriptionId(self.next);
        self.entries.push((id, callback));
        id
    }

    /// Detaches the callback registered under `id`.
    ///
    /// Returns `false` when the handle is unknown or was already detached.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let Some(index) = self.entries.iter().position(|(entry, _)| *entry == id) else {
            return false;
        };
        let _ = self.entries.remove(index);
        true
    }

    /// Callbacks in subscription order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut F> + '_ {
        self.entries.iter_mut().map(|(_, callback)| callback.as_mut())
    }

    /// Number of attached callbacks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether nothing is attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<F: ?Sized> Default for Subscribers<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: ?Sized> fmt::Debug for Subscribers<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscribers")
            .field("len", &self.entries.len())
            .finish()
    }
}

/// Signal that fires at most once, handing its listeners back to the caller.
///
/// Listeners are plain values (for example the identifier of the entity
/// watching a target). Firing drains them so the caller can notify each one
/// with full mutable access to the world; later subscriptions are refused.
#[derive(Clone, Debug)]
pub struct OnceSignal<L> {
    listeners: Vec<(SubscriptionId, L)>,
    next: u64,
    fired: bool,
}

impl<L> OnceSignal<L> {
    /// Creates a signal that has not fired.
    #[must_use]
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
            next: 0,
            fired: false,
        }
    }

    /// Registers `listener`.
    ///
    /// Returns `None` once the signal has fired.
    pub fn subscribe(&mut self, listener: L) -> Option<SubscriptionId> {
        if self.fired {
            return None;
        }
        self.next = self.next.saturating_add(1);
        let id = SubscriptionId(self.next);
        self.listeners.push((id, listener));
        Some(id)
    }

    /// Detaches the listener registered under `id`, returning it.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> Option<L> {
        let index = self.listeners.iter().position(|(entry, _)| *entry == id)?;
        Some(self.listeners.remove(index).1)
    }

    /// Fires the signal, returning the listeners in subscription order.
    ///
    /// Only the first call yields listeners; later calls return an empty list.
    pub fn fire(&mut self) -> Vec<L> {
        if self.fired {
            return Vec::new();
        }
        self.fired = true;
        self.listeners
            .drain(..)
            .map(|(_, listener)| listener)
            .collect()
    }

    /// Reports whether [`OnceSignal::fire`] has run.
    #[must_use]
    pub fn has_fired(&self) -> bool {
        self.fired
    }

    /// Number of listeners waiting for the signal.
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Reports whether nobody is waiting for the signal.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl<L> Default for OnceSignal<L> {
    fn default() -> Self {
        Self::new()
    }
}
