//! Players and the entities they own.

use lanecraft_core::{CardTarget, Entity, EntityId, HandSlot, IdAllocator, Millis, Side, Vec2};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::{
    blueprint::{PlayerBlueprint, Rules, UnitStats},
    cards::{Deck, DeckSystem},
    combat::{Combat, Combatant, Surroundings, TargetLink},
    error::BlueprintError,
    mana::ManaSystem,
    snapshot::{CardSummary, ManaSummary, PlayerSummary},
    tower::{Tower, TowerKind},
    unit::Unit,
};

/// Participant owning towers, units, a mana pool and a deck.
#[derive(Debug)]
pub struct Player {
    id: EntityId,
    side: Side,
    mana: ManaSystem,
    deck: DeckSystem,
    towers: Vec<Tower>,
    units: Vec<Unit>,
}

impl Player {
    /// Builds the player with its towers, mana pool and dealt deck.
    ///
    /// `seed` drives the deck shuffles of this player only.
    pub fn new(
        blueprint: &PlayerBlueprint,
        side: Side,
        rules: &Rules,
        seed: u64,
        ids: &mut IdAllocator,
    ) -> Result<Self, BlueprintError> {
        let deck = DeckSystem::new(
            Deck::new(&blueprint.deck),
            ChaCha8Rng::seed_from_u64(seed),
        )
        .map_err(|source| BlueprintError::Deck {
            player: blueprint.id.clone(),
            source,
        })?;

        let mut towers = Vec::with_capacity(1 + blueprint.outer_towers.len());
        towers.push(Tower::new(
            ids.allocate("tower"),
            blueprint.id.clone(),
            side,
            TowerKind::Inner,
            blueprint.inner_tower,
            rules.inner_tower,
        ));
        for &position in &blueprint.outer_towers {
            towers.push(Tower::new(
                ids.allocate("tower"),
                blueprint.id.clone(),
                side,
                TowerKind::Outer,
                position,
                rules.outer_tower,
            ));
        }

        Ok(Self {
            id: blueprint.id.clone(),
            side,
            mana: ManaSystem::new(&blueprint.mana),
            deck,
            towers,
            units: Vec::new(),
        })
    }

    /// Side the player fights for.
    #[must_use]
    pub fn side(&self) -> Side {
        self.side
    }

    /// Mana pool.
    #[must_use]
    pub fn mana(&self) -> &ManaSystem {
        &self.mana
    }

    /// Deck, hand and piles.
    #[must_use]
    pub fn deck(&self) -> &DeckSystem {
        &self.deck
    }

    /// Mutable access to the deck, used to attach play listeners.
    pub fn deck_mut(&mut self) -> &mut DeckSystem {
        &mut self.deck
    }

    /// Towers still standing.
    #[must_use]
    pub fn towers(&self) -> &[Tower] {
        &self.towers
    }

    /// Units still alive.
    #[must_use]
    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    /// Mutable access to the towers, used to layer modifiers.
    pub fn towers_mut(&mut self) -> &mut [Tower] {
        &mut self.towers
    }

    /// Mutable access to the units, used to layer modifiers.
    pub fn units_mut(&mut self) -> &mut [Unit] {
        &mut self.units
    }

    /// Places a new unit at `position`. It starts in the spawning state.
    pub fn deploy_unit(
        &mut self,
        ids: &mut IdAllocator,
        stats: UnitStats,
        position: Vec2,
    ) -> EntityId {
        let id = ids.allocate("unit");
        debug!(
            target: "lanecraft_world::player",
            player = %self.id,
            unit = %id,
            x = position.x,
            y = position.y,
            "unit deployed"
        );
        self.units.push(Unit::new(
            id.clone(),
            self.id.clone(),
            self.side,
            position,
            stats,
        ));
        id
    }

    /// Tries to play the card in `slot` onto `target`.
    pub fn play_card(&mut self, slot: HandSlot, target: CardTarget) -> bool {
        self.deck.try_play(&self.id, &mut self.mana, target, slot)
    }

    /// Regenerates mana, cools cards down and runs every tower and unit.
    pub(crate) fn update(&mut self, env: &mut Surroundings<'_>, dt: Millis) {
        self.mana.tick(dt);
        self.deck.update(dt);
        for tower in &mut self.towers {
            tower.update(env, dt);
        }
        for unit in &mut self.units {
            unit.update(env, dt);
        }
    }

    /// Living combatants, towers first.
    pub(crate) fn combatants(&self) -> impl Iterator<Item = Combatant> + '_ {
        let towers = self.towers.iter().map(Combat::capture);
        let units = self.units.iter().map(Combat::capture);
        towers.chain(units)
    }

    /// Tower or unit carrying `id`.
    pub(crate) fn combatant_mut(&mut self, id: &EntityId) -> Option<&mut dyn Combat> {
        if let Some(tower) = self.towers.iter_mut().find(|tower| tower.id() == id) {
            return Some(tower);
        }
        self.units
            .iter_mut()
            .find(|unit| unit.id() == id)
            .map(|unit| unit as &mut dyn Combat)
    }

    /// Stops listing destroyed towers and units.
    ///
    /// Returns the target subscriptions the removed entities still held.
    pub(crate) fn prune_destroyed(&mut self) -> Vec<TargetLink> {
        let mut stale = Vec::new();
        prune(&mut self.towers, &mut stale);
        prune(&mut self.units, &mut stale);
        stale
    }

    /// Serializable summary of the player.
    #[must_use]
    pub fn summary(&self) -> PlayerSummary {
        PlayerSummary {
            id: self.id.clone(),
            mana: ManaSummary {
                current: self.mana.current(),
                capacity: self.mana.capacity(),
            },
            hand: self
                .deck
                .hand()
                .iter()
                .map(|card| CardSummary {
                    id: card.id().clone(),
                    name: card.name().to_owned(),
                    cost: card.cost(),
                    targets: card.targets().to_vec(),
                    cooldown_progress: card.cooldown_progress(),
                })
                .collect(),
        }
    }
}

impl Entity for Player {
    fn id(&self) -> &EntityId {
        &self.id
    }
}

fn prune<C: Combat>(entities: &mut Vec<C>, stale: &mut Vec<TargetLink>) {
    entities.retain_mut(|entity| {
        if !entity.health().is_depleted() {
            return true;
        }
        debug!(target: "lanecraft_world::player", entity = %entity.id(), "entity destroyed");
        stale.extend(entity.engagement().take_link());
        false
    });
}
