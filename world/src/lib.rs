#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Lanecraft.
//!
//! The world owns the board and both teams. Adapters mutate it exclusively
//! through [`apply`] and time moves forward only through [`advance`]; every
//! read goes through the [`query`] module.

pub mod blueprint;
pub mod board;
pub mod cards;
pub mod combat;
pub mod error;
pub mod mana;
pub mod player;
pub mod snapshot;
pub mod team;
pub mod tower;
pub mod unit;

use lanecraft_core::{settle_delta, Command, EntityId, IdAllocator, Millis, Side};
use tracing::debug;

pub use blueprint::SessionBlueprint;
pub use error::{BlueprintError, CommandError, DeckError};

use crate::{
    blueprint::Rules,
    board::Board,
    combat::{Battlefield, Combat, Outbox, Surroundings, TargetLink},
    player::Player,
    team::Team,
};

/// Represents the authoritative Lanecraft world state.
#[derive(Debug)]
pub struct World {
    board: Board,
    teams: [Team; 2],
    rules: Rules,
    ids: IdAllocator,
    tick_index: u64,
    elapsed: Millis,
}

impl World {
    /// Builds the board, both teams and every player from `blueprint`.
    pub fn from_blueprint(blueprint: &SessionBlueprint) -> Result<Self, BlueprintError> {
        blueprint.validate()?;
        let board = Board::new(&blueprint.board)?;

        let mut ids = IdAllocator::new();
        let first_id = ids.allocate("team");
        let second_id = ids.allocate("team");
        let first_players = blueprint.teams[0].players.len() as u64;

        let first = Team::new(
            first_id,
            Side::First,
            &blueprint.teams[0],
            &blueprint.rules,
            blueprint.seed,
            0,
            &mut ids,
        )?;
        let second = Team::new(
            second_id,
            Side::Second,
            &blueprint.teams[1],
            &blueprint.rules,
            blueprint.seed,
            first_players,
            &mut ids,
        )?;

        Ok(Self {
            board,
            teams: [first, second],
            rules: blueprint.rules,
            ids,
            tick_index: 0,
            elapsed: 0.0,
        })
    }

    /// Mutable player carrying `id`, searched across both teams.
    ///
    /// Used to attach card listeners and stat modifiers.
    pub fn player_mut(&mut self, id: &EntityId) -> Option<&mut Player> {
        self.teams
            .iter_mut()
            .find_map(|team| team.player_mut(id))
    }

    fn combatant_mut(&mut self, id: &EntityId) -> Option<&mut dyn Combat> {
        self.teams
            .iter_mut()
            .find_map(|team| team.combatant_mut(id))
    }

    /// Moves the destroy subscription of `watcher` onto its current target.
    fn relink(&mut self, watcher: &EntityId) {
        let Some(entity) = self.combatant_mut(watcher) else {
            return;
        };
        let engagement = entity.engagement();
        if engagement.is_linked() {
            return;
        }
        let stale = engagement.take_link();
        let desired = engagement.target().cloned();

        if let Some(link) = stale {
            self.unlink(&link);
        }
        let Some(target) = desired else {
            return;
        };

        let subscription = self
            .combatant_mut(&target)
            .and_then(|entity| entity.destroyed().subscribe(watcher.clone()));
        let Some(entity) = self.combatant_mut(watcher) else {
            return;
        };
        match subscription {
            Some(subscription) => entity.engagement().set_link(TargetLink {
                target,
                subscription,
            }),
            None => entity.lose_target(&target),
        }
    }

    fn unlink(&mut self, link: &TargetLink) {
        if let Some(target) = self.combatant_mut(&link.target) {
            let _ = target.destroyed().unsubscribe(link.subscription);
        }
    }

    /// Notifies every watcher of `destroyed` that its target is gone.
    fn announce_destruction(&mut self, destroyed: &EntityId) {
        let watchers = match self.combatant_mut(destroyed) {
            Some(entity) => entity.destroyed().fire(),
            None => return,
        };
        debug!(
            target: "lanecraft_world",
            entity = %destroyed,
            watchers = watchers.len(),
            "combatant destroyed"
        );
        for watcher in watchers {
            if let Some(entity) = self.combatant_mut(&watcher) {
                entity.lose_target(destroyed);
            }
        }
    }
}

/// Outcome of a command the world accepted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Applied {
    /// A unit was deployed under the given identifier.
    UnitSpawned(EntityId),
    /// The card was played and its cost paid.
    CardPlayed,
    /// The card could not be played right now; nothing changed.
    CardRejected,
}

/// Applies the provided command to the world.
///
/// Gameplay rejections are reported through [`Applied::CardRejected`]; only
/// commands naming a player outside the session fail.
pub fn apply(world: &mut World, command: Command) -> Result<Applied, CommandError> {
    match command {
        Command::SpawnTestUnit { player, position } => {
            let stats = world.rules.test_unit;
            let World { teams, ids, .. } = world;
            let owner = teams
                .iter_mut()
                .find_map(|team| team.player_mut(&player))
                .ok_or_else(|| CommandError::UnknownPlayer(player.clone()))?;
            Ok(Applied::UnitSpawned(owner.deploy_unit(ids, stats, position)))
        }
        Command::PlayCard {
            player,
            slot,
            target,
        } => {
            let owner = world
                .player_mut(&player)
                .ok_or_else(|| CommandError::UnknownPlayer(player.clone()))?;
            if owner.play_card(slot, target) {
                Ok(Applied::CardPlayed)
            } else {
                Ok(Applied::CardRejected)
            }
        }
    }
}

/// Advances the simulation by `dt` milliseconds.
///
/// Every team is updated against the combatants captured at the start of the
/// tick. Target subscriptions are then reconciled and hits land together, so
/// two entities can destroy each other in the same tick. Destroyed entities
/// are removed once every watcher has released them. A negative or
/// non-finite `dt` advances by zero.
pub fn advance(world: &mut World, dt: Millis) {
    let dt = settle_delta(dt);
    let field = Battlefield::new(world.teams.iter().flat_map(Team::combatants).collect());
    let mut outbox = Outbox::default();
    {
        let mut env = Surroundings {
            field: &field,
            outbox: &mut outbox,
        };
        for team in &mut world.teams {
            team.update(&mut env, dt);
        }
    }

    let (strikes, retargeted) = outbox.into_parts();
    for watcher in &retargeted {
        world.relink(watcher);
    }

    let mut destroyed = Vec::new();
    for strike in strikes {
        let Some(target) = world.combatant_mut(&strike.target) else {
            continue;
        };
        if target.take_damage(strike.amount) {
            destroyed.push(strike.target);
        }
    }
    for id in &destroyed {
        world.announce_destruction(id);
    }

    let stale: Vec<TargetLink> = world
        .teams
        .iter_mut()
        .flat_map(Team::prune_destroyed)
        .collect();
    for link in &stale {
        world.unlink(link);
    }

    world.tick_index = world.tick_index.saturating_add(1);
    world.elapsed += dt;
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use lanecraft_core::{EntityId, Millis, Side};

    use super::World;
    use crate::{
        blueprint::Rules,
        board::Board,
        player::Player,
        snapshot::{BoardLayout, InitialState, Snapshot, TowerSnapshot, UnitSnapshot},
        team::Team,
    };

    /// Number of ticks simulated so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Simulated time elapsed so far.
    #[must_use]
    pub fn elapsed(world: &World) -> Millis {
        world.elapsed
    }

    /// Gameplay constants the world was built with.
    #[must_use]
    pub fn rules(world: &World) -> &Rules {
        &world.rules
    }

    /// Immutable board.
    #[must_use]
    pub fn board(world: &World) -> &Board {
        &world.board
    }

    /// Team fighting on `side`.
    #[must_use]
    pub fn team(world: &World, side: Side) -> &Team {
        &world.teams[side.index()]
    }

    /// Both teams in blueprint order.
    #[must_use]
    pub fn teams(world: &World) -> &[Team; 2] {
        &world.teams
    }

    /// Player carrying `id`, searched across both teams.
    #[must_use]
    pub fn player<'w>(world: &'w World, id: &EntityId) -> Option<&'w Player> {
        world.teams.iter().find_map(|team| team.player(id))
    }

    /// Players of the team opposing the player carrying `id`.
    ///
    /// Empty when no such player exists.
    #[must_use]
    pub fn opponents<'w>(world: &'w World, id: &EntityId) -> &'w [Player] {
        match player(world, id) {
            Some(player) => team(world, player.side().opponent()).players(),
            None => &[],
        }
    }

    /// Serializable state of every team, tower and unit.
    #[must_use]
    pub fn snapshot(world: &World) -> Snapshot {
        Snapshot {
            tick: world.tick_index,
            elapsed: world.elapsed,
            teams: world.teams.iter().map(Team::summary).collect(),
            towers: towers(world),
            units: units(world),
            events: Vec::new(),
        }
    }

    /// One-time description of the board and teams for renderers.
    #[must_use]
    pub fn initial_state(world: &World) -> InitialState {
        InitialState {
            board: BoardLayout {
                width: world.board.width(),
                height: world.board.height(),
                cells: world.board.cells().to_vec(),
            },
            teams: world.teams.iter().map(Team::layout).collect(),
            towers: towers(world),
            units: units(world),
        }
    }

    fn players(world: &World) -> impl Iterator<Item = &Player> + '_ {
        world.teams.iter().flat_map(|team| team.players().iter())
    }

    fn towers(world: &World) -> Vec<TowerSnapshot> {
        players(world)
            .flat_map(|player| player.towers().iter().map(|tower| tower.snapshot()))
            .collect()
    }

    fn units(world: &World) -> Vec<UnitSnapshot> {
        players(world)
            .flat_map(|player| player.units().iter().map(|unit| unit.snapshot()))
            .collect()
    }
}
