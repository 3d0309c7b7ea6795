//! Regenerating resource spent to play cards.

use lanecraft_core::{settle_delta, Millis};

use crate::blueprint::ManaBlueprint;

/// Mana pool owned by a player.
///
/// Every mutator keeps `0 <= current <= capacity`, whatever the input.
#[derive(Clone, Debug, PartialEq)]
pub struct ManaSystem {
    current: f64,
    rate: f64,
    capacity: f64,
}

impl ManaSystem {
    /// Creates a pool from its blueprint.
    #[must_use]
    pub fn new(blueprint: &ManaBlueprint) -> Self {
        let capacity = if blueprint.capacity.is_finite() {
            blueprint.capacity.max(0.0)
        } else {
            0.0
        };
        let rate = if blueprint.rate.is_finite() {
            blueprint.rate
        } else {
            0.0
        };
        let mut mana = Self {
            current: 0.0,
            rate,
            capacity,
        };
        mana.set(blueprint.initial);
        mana
    }

    /// Mana currently held.
    #[must_use]
    pub fn current(&self) -> f64 {
        self.current
    }

    /// Upper bound of the pool.
    #[must_use]
    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    /// Mana regenerated per millisecond.
    #[must_use]
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Regenerates `dt * rate` mana. Time never flows backwards here.
    pub fn tick(&mut self, dt: Millis) {
        self.add(settle_delta(dt) * self.rate);
    }

    /// Adds `amount`, clamping into the pool.
    pub fn add(&mut self, amount: f64) {
        self.set(self.current + amount);
    }

    /// Removes `amount`, clamping into the pool.
    pub fn subtract(&mut self, amount: f64) {
        self.set(self.current - amount);
    }

    /// Removes `amount` only when at least that much is held.
    ///
    /// Returns `false` and leaves the pool untouched otherwise.
    pub fn try_subtract(&mut self, amount: f64) -> bool {
        if amount.is_nan() || self.current < amount {
            return false;
        }
        self.subtract(amount);
        true
    }

    /// Overwrites the held amount, clamping into the pool.
    ///
    /// `NaN` leaves the pool untouched.
    pub fn set(&mut self, value: f64) {
        if value.is_nan() {
            return;
        }
        self.current = value.clamp(0.0, self.capacity);
    }
}
