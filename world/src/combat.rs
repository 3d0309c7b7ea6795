//! Shared combat plumbing for towers and units.
//!
//! State machines never touch another entity directly. During an update they
//! read the [`Battlefield`] captured at the start of the tick and record their
//! intentions in an [`Outbox`]: hits to land and targets they switched to.
//! The world resolves the outbox once every entity has been updated, which
//! keeps the update pass free of aliasing and makes damage simultaneous.

use lanecraft_core::{Bbox, Entity, EntityId, Millis, OnceSignal, Side, SubscriptionId, Vec2};
use serde::{Deserialize, Serialize};

/// Category of a combatant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CombatantKind {
    /// Static defensive structure.
    Tower,
    /// Mobile deployed unit.
    Unit,
}

/// Read-only picture of a living combatant taken at the start of a tick.
#[derive(Clone, Debug, PartialEq)]
pub struct Combatant {
    /// Identifier of the combatant.
    pub id: EntityId,
    /// Whether it is a tower or a unit.
    pub kind: CombatantKind,
    /// Player owning the combatant.
    pub owner: EntityId,
    /// Side the owner fights for.
    pub side: Side,
    /// Collision body.
    pub bbox: Bbox,
}

/// Every living combatant, in team, player and insertion order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Battlefield {
    combatants: Vec<Combatant>,
}

impl Battlefield {
    /// Builds a battlefield from already captured combatants.
    #[must_use]
    pub fn new(combatants: Vec<Combatant>) -> Self {
        Self { combatants }
    }

    /// Looks a combatant up by identifier.
    #[must_use]
    pub fn get(&self, id: &EntityId) -> Option<&Combatant> {
        self.combatants.iter().find(|combatant| &combatant.id == id)
    }

    /// All combatants.
    #[must_use]
    pub fn combatants(&self) -> &[Combatant] {
        &self.combatants
    }

    /// Enemies of `side` matching `kind`, in battlefield order.
    pub fn enemies(&self, side: Side, kind: CombatantKind) -> impl Iterator<Item = &Combatant> + '_ {
        self.combatants
            .iter()
            .filter(move |combatant| combatant.side != side && combatant.kind == kind)
    }

    /// Enemy of `side` and `kind` closest to `from` among those accepted by
    /// `filter`.
    ///
    /// Exact ties keep the earliest combatant in battlefield order.
    pub fn nearest_enemy(
        &self,
        from: Vec2,
        side: Side,
        kind: CombatantKind,
        filter: impl Fn(&Combatant) -> bool,
    ) -> Option<&Combatant> {
        self.enemies(side, kind)
            .filter(|combatant| filter(combatant))
            .map(|combatant| (from.distance(combatant.bbox.center()), combatant))
            .min_by(|(left, _), (right, _)| left.total_cmp(right))
            .map(|(_, combatant)| combatant)
    }
}

/// Damage an attacker deals to its target.
#[derive(Clone, Debug, PartialEq)]
pub struct Strike {
    /// Entity that attacked.
    pub attacker: EntityId,
    /// Entity that is hit.
    pub target: EntityId,
    /// Damage dealt.
    pub amount: f64,
}

/// Intentions recorded by state machines during one tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Outbox {
    strikes: Vec<Strike>,
    retargeted: Vec<EntityId>,
}

impl Outbox {
    /// Queues a hit.
    pub fn strike(&mut self, strike: Strike) {
        self.strikes.push(strike);
    }

    /// Records that `watcher` changed its target.
    pub fn retargeted(&mut self, watcher: &EntityId) {
        if !self.retargeted.contains(watcher) {
            self.retargeted.push(watcher.clone());
        }
    }

    /// Queued hits in the order they were recorded.
    #[must_use]
    pub fn strikes(&self) -> &[Strike] {
        &self.strikes
    }

    /// Splits the outbox into its hits and the entities that retargeted.
    #[must_use]
    pub fn into_parts(self) -> (Vec<Strike>, Vec<EntityId>) {
        (self.strikes, self.retargeted)
    }
}

/// Environment handed to tower and unit states during an update.
#[derive(Debug)]
pub struct Surroundings<'e> {
    /// Combatants alive at the start of the tick.
    pub field: &'e Battlefield,
    /// Intentions to resolve after the update pass.
    pub outbox: &'e mut Outbox,
}

/// Current and maximum health.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Health {
    current: f64,
    max: f64,
}

impl Health {
    /// Full health pool of `max` points.
    #[must_use]
    pub fn new(max: f64) -> Self {
        let max = max.max(0.0);
        Self { current: max, max }
    }

    /// Remaining health.
    #[must_use]
    pub fn current(&self) -> f64 {
        self.current
    }

    /// Starting health.
    #[must_use]
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Reports whether no health remains.
    #[must_use]
    pub fn is_depleted(&self) -> bool {
        self.current <= 0.0
    }

    /// Removes `amount` points, never going below zero.
    ///
    /// Returns `true` only for the hit that brings health from above zero to
    /// zero.
    pub fn take_damage(&mut self, amount: f64) -> bool {
        if self.is_depleted() || amount.is_nan() || amount <= 0.0 {
            return false;
        }
        self.current = (self.current - amount).max(0.0);
        self.is_depleted()
    }
}

/// Target subscription recorded after the world registered the watcher.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TargetLink {
    /// Watched target.
    pub target: EntityId,
    /// Handle on the target's destroy signal.
    pub subscription: SubscriptionId,
}

/// Target and attack timer of a combatant.
///
/// The target is a plain identifier. The world subscribes the owner to the
/// target's destroy signal and records the resulting [`TargetLink`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Engagement {
    target: Option<EntityId>,
    link: Option<TargetLink>,
    cooldown: Millis,
}

impl Engagement {
    /// Current target, if any.
    #[must_use]
    pub fn target(&self) -> Option<&EntityId> {
        self.target.as_ref()
    }

    /// Time left before the next hit may land.
    #[must_use]
    pub fn cooldown(&self) -> Millis {
        self.cooldown
    }

    /// Switches to `next`, telling the world when the target really changed.
    pub fn retarget(&mut self, owner: &EntityId, next: Option<&EntityId>, outbox: &mut Outbox) {
        if self.target.as_ref() == next {
            return;
        }
        self.target = next.cloned();
        outbox.retargeted(owner);
    }

    /// Counts the attack timer down and queues a hit once it runs out.
    pub fn swing(
        &mut self,
        owner: &EntityId,
        target: &EntityId,
        attack: f64,
        attack_speed: f64,
        dt: Millis,
        outbox: &mut Outbox,
    ) {
        if attack_speed.is_nan() || attack_speed <= 0.0 {
            return;
        }
        self.cooldown -= dt;
        if self.cooldown <= 0.0 {
            outbox.strike(Strike {
                attacker: owner.clone(),
                target: target.clone(),
                amount: attack,
            });
            self.cooldown = attack_interval(attack_speed);
        }
    }

    /// Reports whether the recorded subscription matches the current target.
    #[must_use]
    pub fn is_linked(&self) -> bool {
        self.target.as_ref() == self.link.as_ref().map(|link| &link.target)
    }

    /// Removes and returns the recorded subscription.
    pub fn take_link(&mut self) -> Option<TargetLink> {
        self.link.take()
    }

    /// Records the subscription on the current target.
    pub fn set_link(&mut self, link: TargetLink) {
        self.link = Some(link);
    }

    /// Forgets `target` if it is the current one. Returns whether it was.
    pub fn release(&mut self, target: &EntityId) -> bool {
        if self.target.as_ref() != Some(target) {
            return false;
        }
        self.target = None;
        if self.link.as_ref().is_some_and(|link| &link.target == target) {
            self.link = None;
        }
        true
    }
}

/// Time between two hits at `attack_speed` hits per second.
///
/// Combatants that cannot attack never land a hit.
#[must_use]
pub fn attack_interval(attack_speed: f64) -> Millis {
    if attack_speed > 0.0 {
        1000.0 / attack_speed
    } else {
        f64::INFINITY
    }
}

/// Anything that can be targeted, hit and destroyed.
pub trait Combat: Entity {
    /// Snapshot of the combatant for the next tick's battlefield.
    fn capture(&self) -> Combatant;

    /// Remaining and maximum health.
    fn health(&self) -> Health;

    /// Applies a hit. Returns `true` when it destroyed the combatant.
    fn take_damage(&mut self, amount: f64) -> bool;

    /// Destroy signal; listeners are the identifiers of watching entities.
    fn destroyed(&mut self) -> &mut OnceSignal<EntityId>;

    /// Target and attack timer.
    fn engagement(&mut self) -> &mut Engagement;

    /// Reacts to the destruction of the current target.
    fn lose_target(&mut self, target: &EntityId);
}
