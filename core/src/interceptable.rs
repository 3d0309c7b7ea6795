//! Ordered modifier pipelines layered over base statistics.
//!
//! Every statistic an entity exposes (attack, range, attack speed, speed) is
//! computed by folding a chain of interceptors over the blueprint value, so
//! buffs and auras can be layered without touching the blueprint itself.

use std::{fmt, sync::Arc};

/// Priority assigned when the caller has no preference.
pub const DEFAULT_PRIORITY: i32 = 1;

/// Pure transform applied to a value, given read access to its owner.
pub type Interceptor<V, C> = Arc<dyn Fn(V, &C) -> V + Send + Sync>;

/// Wraps a closure as an [`Interceptor`].
///
/// Keep the returned handle to remove the interceptor later; removal matches
/// by handle identity, not by behaviour.
pub fn interceptor<V, C, F>(transform: F) -> Interceptor<V, C>
where
    F: Fn(V, &C) -> V + Send + Sync + 'static,
{
    Arc::new(transform)
}

struct Listener<V, C> {
    interceptor: Interceptor<V, C>,
    priority: i32,
}

/// Priority-ordered chain of interceptors over values of type `V`.
///
/// Listeners run in ascending priority. Equal priorities run in insertion
/// order, so the result only depends on the base value, the context and the
/// listener set.
pub struct Interceptable<V, C> {
    listeners: Vec<Listener<V, C>>,
}

impl<V, C> Interceptable<V, C> {
    /// Creates an empty pipeline.
    #[must_use]
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    /// Registers `interceptor` at `priority`.
    pub fn add(&mut self, interceptor: Interceptor<V, C>, priority: i32) {
        let index = self
            .listeners
            .partition_point(|listener| listener.priority <= priority);
        self.listeners.insert(
            index,
            Listener {
                interceptor,
                priority,
            },
        );
    }

    /// Removes the first registration of `interceptor`.
    ///
    /// Returns `false` when the handle was never registered.
    pub fn remove(&mut self, interceptor: &Interceptor<V, C>) -> bool {
        let Some(index) = self
            .listeners
            .iter()
            .position(|listener| Arc::ptr_eq(&listener.interceptor, interceptor))
        else {
            return false;
        };
        let _ = self.listeners.remove(index);
        true
    }

    /// Drops every registered interceptor.
    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    /// Number of registered interceptors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Reports whether no interceptor is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Folds the chain over `base`.
    pub fn value(&self, base: V, ctx: &C) -> V {
        self.listeners
            .iter()
            .fold(base, |value, listener| (listener.interceptor)(value, ctx))
    }
}

impl<V, C> Default for Interceptable<V, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, C> fmt::Debug for Interceptable<V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interceptable")
            .field(
                "priorities",
                &self
                    .listeners
                    .iter()
                    .map(|listener| listener.priority)
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}
