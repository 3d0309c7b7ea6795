//! Static defensive structures.

use lanecraft_core::{
    Bbox, Circle, Entity, EntityId, Interceptable, OnceSignal, Side, State, StateMachine, Vec2,
};
use serde::{Deserialize, Serialize};

use crate::{
    blueprint::TowerStats,
    combat::{Combat, Combatant, CombatantKind, Engagement, Health, Surroundings},
    snapshot::TowerSnapshot,
};

/// Role a tower plays in a player's defence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TowerKind {
    /// Tower guarding the player's base.
    Inner,
    /// Tower guarding one of the lanes.
    Outer,
}

/// Behavioural state of a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TowerState {
    /// Scanning for enemy units in range.
    Idle,
    /// Hitting the current target.
    Attacking,
}

/// Modifier pipelines layered over a tower's blueprint statistics.
#[derive(Debug, Default)]
pub struct TowerModifiers {
    /// Damage per hit.
    pub attack: Interceptable<f64, TowerBody>,
    /// Radius of the attack circle.
    pub attack_range: Interceptable<f64, TowerBody>,
    /// Hits per second.
    pub attack_speed: Interceptable<f64, TowerBody>,
}

/// Data a tower's states operate on.
#[derive(Debug)]
pub struct TowerBody {
    id: EntityId,
    owner: EntityId,
    side: Side,
    kind: TowerKind,
    bbox: Bbox,
    stats: TowerStats,
    health: Health,
    engagement: Engagement,
    destroyed: OnceSignal<EntityId>,
    modifiers: TowerModifiers,
}

impl TowerBody {
    /// Player owning the tower.
    #[must_use]
    pub fn owner(&self) -> &EntityId {
        &self.owner
    }

    /// Side the tower fights for.
    #[must_use]
    pub fn side(&self) -> Side {
        self.side
    }

    /// Inner or outer tower.
    #[must_use]
    pub fn kind(&self) -> TowerKind {
        self.kind
    }

    /// Collision body.
    #[must_use]
    pub fn bbox(&self) -> Bbox {
        self.bbox
    }

    /// Remaining and maximum health.
    #[must_use]
    pub fn health(&self) -> Health {
        self.health
    }

    /// Current target, if any.
    #[must_use]
    pub fn target(&self) -> Option<&EntityId> {
        self.engagement.target()
    }

    /// Effective damage per hit.
    #[must_use]
    pub fn attack(&self) -> f64 {
        self.modifiers.attack.value(self.stats.attack, self)
    }

    /// Effective attack radius.
    #[must_use]
    pub fn attack_range(&self) -> f64 {
        self.modifiers
            .attack_range
            .value(self.stats.attack_range, self)
    }

    /// Effective hits per second.
    #[must_use]
    pub fn attack_speed(&self) -> f64 {
        self.modifiers
            .attack_speed
            .value(self.stats.attack_speed, self)
    }

    /// Circle enemies must overlap to be hit.
    #[must_use]
    pub fn attack_circle(&self) -> Circle {
        Circle::new(self.bbox.center(), self.attack_range())
    }

    fn can_attack(&self, bbox: &Bbox) -> bool {
        bbox.intersects_circle(&self.attack_circle())
    }

    fn scan(&mut self, env: &mut Surroundings<'_>) -> Option<TowerState> {
        let circle = self.attack_circle();
        let field = env.field;
        let nearest = field
            .nearest_enemy(self.bbox.center(), self.side, CombatantKind::Unit, |unit| {
                unit.bbox.intersects_circle(&circle)
            })?;
        self.engagement
            .retarget(&self.id, Some(&nearest.id), env.outbox);
        Some(TowerState::Attacking)
    }

    fn fire(&mut self, env: &mut Surroundings<'_>, dt: f64) -> Option<TowerState> {
        let field = env.field;
        let target = self
            .engagement
            .target()
            .and_then(|id| field.get(id))
            .filter(|target| self.can_attack(&target.bbox));
        let Some(target) = target else {
            self.engagement.retarget(&self.id, None, env.outbox);
            return Some(TowerState::Idle);
        };

        let (attack, attack_speed) = (self.attack(), self.attack_speed());
        self.engagement
            .swing(&self.id, &target.id, attack, attack_speed, dt, env.outbox);
        None
    }
}

impl State<TowerBody> for TowerState {
    type Env<'e> = Surroundings<'e>;

    fn on_update(self, body: &mut TowerBody, env: &mut Surroundings<'_>, dt: f64) -> Option<Self> {
        match self {
            Self::Idle => body.scan(env),
            Self::Attacking => body.fire(env, dt),
        }
    }
}

/// Tower owned by a player.
#[derive(Debug)]
pub struct Tower {
    body: TowerBody,
    machine: StateMachine<TowerState>,
}

impl Tower {
    pub(crate) fn new(
        id: EntityId,
        owner: EntityId,
        side: Side,
        kind: TowerKind,
        position: Vec2,
        stats: TowerStats,
    ) -> Self {
        let mut body = TowerBody {
            id,
            owner,
            side,
            kind,
            bbox: Bbox::new(position, stats.width, stats.height),
            stats,
            health: Health::new(stats.health),
            engagement: Engagement::default(),
            destroyed: OnceSignal::new(),
            modifiers: TowerModifiers::default(),
        };
        let machine = StateMachine::start(TowerState::Idle, &mut body);
        Self { body, machine }
    }

    /// Data the tower's states operate on.
    #[must_use]
    pub fn body(&self) -> &TowerBody {
        &self.body
    }

    /// Active state.
    #[must_use]
    pub fn state(&self) -> TowerState {
        self.machine.state()
    }

    /// Modifier pipelines of the tower.
    pub fn modifiers_mut(&mut self) -> &mut TowerModifiers {
        &mut self.body.modifiers
    }

    pub(crate) fn update(&mut self, env: &mut Surroundings<'_>, dt: f64) {
        self.machine.update(&mut self.body, env, dt);
    }

    /// Serializable view of the tower.
    #[must_use]
    pub fn snapshot(&self) -> TowerSnapshot {
        TowerSnapshot {
            id: self.body.id.clone(),
            player_id: self.body.owner.clone(),
            kind: self.body.kind,
            body: self.body.bbox,
            health: self.body.health,
            attack_range: self.body.attack_range(),
            state: self.state(),
        }
    }
}

impl Entity for Tower {
    fn id(&self) -> &EntityId {
        &self.body.id
    }
}

impl Combat for Tower {
    fn capture(&self) -> Combatant {
        Combatant {
            id: self.body.id.clone(),
            kind: CombatantKind::Tower,
            owner: self.body.owner.clone(),
            side: self.body.side,
            bbox: self.body.bbox,
        }
    }

    fn health(&self) -> Health {
        self.body.health
    }

    fn take_damage(&mut self, amount: f64) -> bool {
        self.body.health.take_damage(amount)
    }

    fn destroyed(&mut self) -> &mut OnceSignal<EntityId> {
        &mut self.body.destroyed
    }

    fn engagement(&mut self) -> &mut Engagement {
        &mut self.body.engagement
    }

    fn lose_target(&mut self, target: &EntityId) {
        if self.body.engagement.release(target) {
            let _ = self.machine.set_state(&mut self.body, TowerState::Idle);
        }
    }
}
