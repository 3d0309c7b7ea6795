//! Teams grouping the players of one side.

use lanecraft_core::{Entity, EntityId, IdAllocator, Millis, Rect, Side};

use crate::{
    blueprint::{Rules, TeamBlueprint},
    combat::{Combat, Combatant, Surroundings, TargetLink},
    error::BlueprintError,
    player::Player,
    snapshot::{TeamLayout, TeamSummary},
};

/// Players fighting on the same side, sharing a deploy zone.
#[derive(Debug)]
pub struct Team {
    id: EntityId,
    side: Side,
    deploy_zone: Rect,
    players: Vec<Player>,
}

impl Team {
    /// Builds the team and its players.
    ///
    /// Player `n` of the team receives the deck seed `seed + first_player + n`
    /// so that every player across the session shuffles independently.
    pub(crate) fn new(
        id: EntityId,
        side: Side,
        blueprint: &TeamBlueprint,
        rules: &Rules,
        seed: u64,
        first_player: u64,
        ids: &mut IdAllocator,
    ) -> Result<Self, BlueprintError> {
        let players = blueprint
            .players
            .iter()
            .zip(first_player..)
            .map(|(player, index)| {
                Player::new(player, side, rules, seed.wrapping_add(index), ids)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            id,
            side,
            deploy_zone: blueprint.deploy_zone,
            players,
        })
    }

    /// Side the team fights on.
    #[must_use]
    pub fn side(&self) -> Side {
        self.side
    }

    /// Region the team deploys units into.
    #[must_use]
    pub fn deploy_zone(&self) -> Rect {
        self.deploy_zone
    }

    /// Players in blueprint order.
    #[must_use]
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Mutable access to the players.
    pub fn players_mut(&mut self) -> &mut [Player] {
        &mut self.players
    }

    /// Player carrying `id`.
    #[must_use]
    pub fn player(&self, id: &EntityId) -> Option<&Player> {
        self.players.iter().find(|player| player.id() == id)
    }

    /// Mutable player carrying `id`.
    pub fn player_mut(&mut self, id: &EntityId) -> Option<&mut Player> {
        self.players.iter_mut().find(|player| player.id() == id)
    }

    pub(crate) fn update(&mut self, env: &mut Surroundings<'_>, dt: Millis) {
        for player in &mut self.players {
            player.update(env, dt);
        }
    }

    pub(crate) fn combatants(&self) -> impl Iterator<Item = Combatant> + '_ {
        self.players.iter().flat_map(Player::combatants)
    }

    pub(crate) fn combatant_mut(&mut self, id: &EntityId) -> Option<&mut dyn Combat> {
        self.players
            .iter_mut()
            .find_map(|player| player.combatant_mut(id))
    }

    pub(crate) fn prune_destroyed(&mut self) -> Vec<TargetLink> {
        self.players
            .iter_mut()
            .flat_map(Player::prune_destroyed)
            .collect()
    }

    /// Serializable summary of the team's players.
    #[must_use]
    pub fn summary(&self) -> TeamSummary {
        TeamSummary {
            id: self.id.clone(),
            side: self.side,
            players: self.players.iter().map(Player::summary).collect(),
        }
    }

    /// Team description used to bootstrap a renderer.
    #[must_use]
    pub fn layout(&self) -> TeamLayout {
        TeamLayout {
            id: self.id.clone(),
            side: self.side,
            deploy_zone: self.deploy_zone,
            players: self.players.iter().map(Player::summary).collect(),
        }
    }
}

impl Entity for Team {
    fn id(&self) -> &EntityId {
        &self.id
    }
}
