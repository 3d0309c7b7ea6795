//! Mobile units deployed during play.

use lanecraft_core::{
    Bbox, Circle, Entity, EntityId, Interceptable, Millis, OnceSignal, Side, State, StateMachine,
    Vec2,
};
use serde::{Deserialize, Serialize};

use crate::{
    blueprint::UnitStats,
    combat::{Combat, Combatant, CombatantKind, Engagement, Health, Surroundings},
    snapshot::UnitSnapshot,
};

/// Behavioural state of a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UnitState {
    /// Waiting out the spawn timer.
    Spawning,
    /// Walking towards the current target.
    Moving,
    /// Hitting the current target.
    Attacking,
}

/// Direction a unit faces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Orientation {
    /// Facing towards smaller x.
    Left,
    /// Facing towards larger x.
    #[default]
    Right,
}

/// Modifier pipelines layered over a unit's blueprint statistics.
#[derive(Debug, Default)]
pub struct UnitModifiers {
    /// Damage per hit.
    pub attack: Interceptable<f64, UnitBody>,
    /// Radius of the attack circle.
    pub attack_range: Interceptable<f64, UnitBody>,
    /// Hits per second.
    pub attack_speed: Interceptable<f64, UnitBody>,
    /// Cells travelled per second.
    pub speed: Interceptable<f64, UnitBody>,
}

/// Data a unit's states operate on.
#[derive(Debug)]
pub struct UnitBody {
    id: EntityId,
    owner: EntityId,
    side: Side,
    bbox: Bbox,
    stats: UnitStats,
    health: Health,
    engagement: Engagement,
    destroyed: OnceSignal<EntityId>,
    velocity: Vec2,
    orientation: Orientation,
    spawn_countdown: Millis,
    modifiers: UnitModifiers,
}

impl UnitBody {
    /// Player owning the unit.
    #[must_use]
    pub fn owner(&self) -> &EntityId {
        &self.owner
    }

    /// Side the unit fights for.
    #[must_use]
    pub fn side(&self) -> Side {
        self.side
    }

    /// Collision body.
    #[must_use]
    pub fn bbox(&self) -> Bbox {
        self.bbox
    }

    /// Centre of the collision body.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.bbox.center()
    }

    /// Direction the unit is heading in. Only its direction matters.
    #[must_use]
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Direction the unit faces.
    #[must_use]
    pub fn orientation(&self) -> Orientation {
        self.orientation
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

    /// Effective cells travelled per second.
    #[must_use]
    pub fn speed(&self) -> f64 {
        self.modifiers.speed.value(self.stats.speed, self)
    }

    /// Radius within which enemy units are preferred over towers.
    #[must_use]
    pub fn aggro_range(&self) -> f64 {
        self.stats.aggro_range
    }

    /// Circle targets must overlap to be hit.
    #[must_use]
    pub fn attack_circle(&self) -> Circle {
        Circle::new(self.position(), self.attack_range())
    }

    /// Circle enemy units must overlap to draw the unit's attention.
    #[must_use]
    pub fn aggro_circle(&self) -> Circle {
        Circle::new(self.position(), self.aggro_range())
    }

    fn can_attack(&self, bbox: &Bbox) -> bool {
        bbox.intersects_circle(&self.attack_circle())
    }

    fn count_down_spawn(&mut self, dt: Millis) -> Option<UnitState> {
        self.spawn_countdown -= dt;
        (self.spawn_countdown <= 0.0).then_some(UnitState::Moving)
    }

    fn seek(&mut self, env: &mut Surroundings<'_>) -> Option<UnitState> {
        let field = env.field;
        let position = self.position();
        let aggro = self.aggro_circle();
        let target = field
            .nearest_enemy(position, self.side, CombatantKind::Unit, |unit| {
                unit.bbox.intersects_circle(&aggro)
            })
            .or_else(|| field.nearest_enemy(position, self.side, CombatantKind::Tower, |_| true));
        self.engagement
            .retarget(&self.id, target.map(|target| &target.id), env.outbox);

        let Some(target) = target else {
            self.velocity = Vec2::ZERO;
            return None;
        };
        if self.can_attack(&target.bbox) {
            return Some(UnitState::Attacking);
        }
        self.velocity = target.bbox.center().sub(position);
        None
    }

    fn fight(&mut self, env: &mut Surroundings<'_>, dt: Millis) -> Option<UnitState> {
        let field = env.field;
        let target = self
            .engagement
            .target()
            .and_then(|id| field.get(id))
            .filter(|target| self.can_attack(&target.bbox));
        let Some(target) = target else {
            self.engagement.retarget(&self.id, None, env.outbox);
            return Some(UnitState::Moving);
        };

        let (attack, attack_speed) = (self.attack(), self.attack_speed());
        self.engagement
            .swing(&self.id, &target.id, attack, attack_speed, dt, env.outbox);
        None
    }
}

impl State<UnitBody> for UnitState {
    type Env<'e> = Surroundings<'e>;

    fn on_enter(self, body: &mut UnitBody) {
        if self == Self::Spawning {
            body.spawn_countdown = body.stats.spawn_time;
        }
    }

    fn on_update(self, body: &mut UnitBody, env: &mut Surroundings<'_>, dt: f64) -> Option<Self> {
        match self {
            Self::Spawning => body.count_down_spawn(dt),
            Self::Moving => body.seek(env),
            Self::Attacking => body.fight(env, dt),
        }
    }

    fn on_exit(self, body: &mut UnitBody) {
        if self == Self::Moving {
            body.velocity = Vec2::ZERO;
        }
    }
}

/// Unit owned by a player.
#[derive(Debug)]
pub struct Unit {
    body: UnitBody,
    machine: StateMachine<UnitState>,
}

impl Unit {
    pub(crate) fn new(
        id: EntityId,
        owner: EntityId,
        side: Side,
        position: Vec2,
        stats: UnitStats,
    ) -> Self {
        let mut body = UnitBody {
            id,
            owner,
            side,
            bbox: Bbox::new(position, stats.width, stats.height),
            stats,
            health: Health::new(stats.health),
            engagement: Engagement::default(),
            destroyed: OnceSignal::new(),
            velocity: Vec2::ZERO,
            orientation: Orientation::Right,
            spawn_countdown: 0.0,
            modifiers: UnitModifiers::default(),
        };
        let machine = StateMachine::start(UnitState::Spawning, &mut body);
        Self { body, machine }
    }

    /// Data the unit's states operate on.
    #[must_use]
    pub fn body(&self) -> &UnitBody {
        &self.body
    }

    /// Active state.
    #[must_use]
    pub fn state(&self) -> UnitState {
        self.machine.state()
    }

    /// Modifier pipelines of the unit.
    pub fn modifiers_mut(&mut self) -> &mut UnitModifiers {
        &mut self.body.modifiers
    }

    /// Runs the active state, then moves along the velocity direction.
    pub(crate) fn update(&mut self, env: &mut Surroundings<'_>, dt: Millis) {
        self.machine.update(&mut self.body, env, dt);

        let body = &mut self.body;
        let step = body.velocity.normalize().scale(body.speed() * dt / 1000.0);
        body.bbox.move_to(body.position().add(step));

        let target_x = body
            .engagement
            .target()
            .and_then(|id| env.field.get(id))
            .map(|target| target.bbox.x);
        body.orientation = match target_x {
            Some(x) if x < body.bbox.x => Orientation::Left,
            _ => Orientation::Right,
        };
    }

    /// Serializable view of the unit.
    #[must_use]
    pub fn snapshot(&self) -> UnitSnapshot {
        UnitSnapshot {
            id: self.body.id.clone(),
            player_id: self.body.owner.clone(),
            body: self.body.bbox,
            health: self.body.health,
            attack_range: self.body.attack_range(),
            aggro_range: self.body.aggro_range(),
            state: self.state(),
            velocity: self.body.velocity,
            orientation: self.body.orientation,
            speed: self.body.speed(),
        }
    }
}

impl Entity for Unit {
    fn id(&self) -> &EntityId {
        &self.body.id
    }
}

impl Combat for Unit {
    fn capture(&self) -> Combatant {
        Combatant {
            id: self.body.id.clone(),
            kind: CombatantKind::Unit,
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
        if self.body.engagement.release(target) && self.state() == UnitState::Attacking {
            let _ = self.machine.set_state(&mut self.body, UnitState::Moving);
        }
    }
}
