//! Plain construction records consumed once when a world is assembled.
//!
//! Every record derives `serde` so sessions can be described in TOML or JSON.
//! Nothing here carries behaviour beyond defaults and validation.

use std::collections::BTreeSet;

use lanecraft_core::{CardTarget, EntityId, Millis, Rect, Vec2};
use serde::{Deserialize, Serialize};

use crate::{
    board::{Board, Cell},
    error::{ensure_non_negative, BlueprintError},
};

/// Blueprint statistics shared by every tower of one kind.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TowerStats {
    /// Damage dealt per hit.
    pub attack: f64,
    /// Radius of the attack circle in cells.
    pub attack_range: f64,
    /// Hits per second.
    pub attack_speed: f64,
    /// Starting and maximum health.
    pub health: f64,
    /// Body width in cells.
    pub width: f64,
    /// Body height in cells.
    pub height: f64,
}

impl TowerStats {
    /// Statistics of the tower guarding a player's base.
    pub const INNER: TowerStats = TowerStats {
        attack: 15.0,
        attack_range: 3.0,
        attack_speed: 1.0,
        health: 800.0,
        width: 1.0,
        height: 1.0,
    };

    /// Statistics of the towers guarding a player's lanes.
    pub const OUTER: TowerStats = TowerStats {
        attack: 10.0,
        attack_range: 3.0,
        attack_speed: 1.0,
        health: 500.0,
        width: 1.0,
        height: 1.0,
    };

    fn validate(&self, field: &'static str) -> Result<(), BlueprintError> {
        for value in [
            self.attack,
            self.attack_range,
            self.attack_speed,
            self.health,
            self.width,
            self.height,
        ] {
            ensure_non_negative(field, value)?;
        }
        Ok(())
    }
}

/// Blueprint statistics of a deployable unit.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnitStats {
    /// Damage dealt per hit.
    pub attack: f64,
    /// Radius of the attack circle in cells.
    pub attack_range: f64,
    /// Radius within which enemy units are preferred over towers.
    pub aggro_range: f64,
    /// Hits per second.
    pub attack_speed: f64,
    /// Starting and maximum health.
    pub health: f64,
    /// Cells travelled per second.
    pub speed: f64,
    /// Time spent in the spawning state before the unit moves.
    pub spawn_time: Millis,
    /// Body width in cells.
    pub width: f64,
    /// Body height in cells.
    pub height: f64,
}

impl UnitStats {
    /// Fixed statistics used by the unit spawn command.
    pub const TEST_UNIT: UnitStats = UnitStats {
        attack: 10.0,
        attack_range: 1.0,
        aggro_range: 2.0,
        attack_speed: 1.4,
        health: 50.0,
        speed: 1.0,
        spawn_time: 500.0,
        width: 0.5,
        height: 0.5,
    };

    fn validate(&self) -> Result<(), BlueprintError> {
        for value in [
            self.attack,
            self.attack_range,
            self.aggro_range,
            self.attack_speed,
            self.health,
            self.speed,
            self.spawn_time,
            self.width,
            self.height,
        ] {
            ensure_non_negative("rules.test_unit", value)?;
        }
        Ok(())
    }
}

/// Session-wide gameplay constants.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    /// Statistics of every inner tower.
    pub inner_tower: TowerStats,
    /// Statistics of every outer tower.
    pub outer_tower: TowerStats,
    /// Statistics of units deployed by the spawn command.
    pub test_unit: UnitStats,
    /// Fixed rate at which the session loop ticks.
    pub ticks_per_second: u32,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            inner_tower: TowerStats::INNER,
            outer_tower: TowerStats::OUTER,
            test_unit: UnitStats::TEST_UNIT,
            ticks_per_second: 20,
        }
    }
}

/// Starting configuration of a player's mana pool.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManaBlueprint {
    /// Mana held when the session starts.
    pub initial: f64,
    /// Mana regenerated per millisecond.
    pub rate: f64,
    /// Upper bound of the pool.
    pub capacity: f64,
}

impl Default for ManaBlueprint {
    fn default() -> Self {
        Self {
            initial: 0.0,
            rate: 0.001,
            capacity: 10.0,
        }
    }
}

/// Construction record of a single card.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CardBlueprint {
    /// Identifier of the card within its deck.
    pub id: EntityId,
    /// Display name.
    pub name: String,
    /// Mana spent when the card is played.
    pub cost: f64,
    /// Targets the card may be played onto.
    pub targets: Vec<CardTarget>,
    /// Cooldown applied after any card is played.
    pub cooldown: Millis,
}

/// Ordered card list a deck is built from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeckBlueprint {
    /// Cards in the order they are instantiated.
    pub cards: Vec<CardBlueprint>,
}

impl Default for DeckBlueprint {
    /// Six single-cost cards playable on the owner's board, with cooldowns
    /// stepping from one to six seconds.
    fn default() -> Self {
        let cards = (1..=6_u32)
            .map(|index| CardBlueprint {
                id: EntityId::new(format!("card{index}")),
                name: format!("CARD {index}"),
                cost: 1.0,
                targets: vec![CardTarget::PlayerBoard],
                cooldown: f64::from(index) * 1000.0,
            })
            .collect();
        Self { cards }
    }
}

/// Construction record of a player.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerBlueprint {
    /// Identifier commands use to address the player.
    pub id: EntityId,
    /// Centre of the player's inner tower.
    pub inner_tower: Vec2,
    /// Centres of the player's outer towers.
    #[serde(default)]
    pub outer_towers: Vec<Vec2>,
    /// Mana pool configuration.
    #[serde(default)]
    pub mana: ManaBlueprint,
    /// Deck configuration.
    #[serde(default)]
    pub deck: DeckBlueprint,
}

/// Construction record of a team.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TeamBlueprint {
    /// Region the team may deploy units into.
    pub deploy_zone: Rect,
    /// Players fighting for the team.
    pub players: Vec<PlayerBlueprint>,
}

/// Static layout of the board.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardBlueprint {
    /// Number of columns.
    pub width: u32,
    /// Number of rows.
    pub height: u32,
    /// Cells in row-major order.
    pub cells: Vec<Cell>,
}

/// Everything required to assemble a world.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionBlueprint {
    /// Board layout.
    pub board: BoardBlueprint,
    /// The two opposing teams, in side order.
    pub teams: [TeamBlueprint; 2],
    /// Seed feeding every deck shuffle.
    #[serde(default)]
    pub seed: u64,
    /// Gameplay constants.
    #[serde(default)]
    pub rules: Rules,
}

const REFERENCE_COLUMNS: u32 = 11;
const REFERENCE_ROWS: u32 = 7;

const GRASS: Cell = Cell::open(0, 0);
const WATER: Cell = Cell::solid(1, 0);
const BRIDGE: Cell = Cell::open(2, 0);
const BRIDGE_BASE: Cell = Cell::solid(3, 0);
const PATH_H: Cell = Cell::open(0, 1);
const PATH_V: Cell = Cell::open(1, 1);
const CORNER_TL: Cell = Cell::open(2, 1);
const CORNER_TR: Cell = Cell::open(3, 1);
const CORNER_BL: Cell = Cell::open(0, 2);
const CORNER_BR: Cell = Cell::open(1, 2);

#[rustfmt::skip]
const REFERENCE_CELLS: [Cell; (REFERENCE_COLUMNS * REFERENCE_ROWS) as usize] = [
    GRASS,     GRASS, GRASS,  GRASS,  GRASS,  WATER,       GRASS,  GRASS,  GRASS,  GRASS, GRASS,
    CORNER_TL, GRASS, PATH_H, PATH_H, PATH_H, BRIDGE,      PATH_H, PATH_H, PATH_H, GRASS, CORNER_TR,
    PATH_V,    GRASS, GRASS,  GRASS,  GRASS,  BRIDGE_BASE, GRASS,  GRASS,  GRASS,  GRASS, PATH_V,
    GRASS,     GRASS, GRASS,  GRASS,  GRASS,  WATER,       GRASS,  GRASS,  GRASS,  GRASS, GRASS,
    PATH_V,    GRASS, GRASS,  GRASS,  GRASS,  WATER,       GRASS,  GRASS,  GRASS,  GRASS, PATH_V,
    CORNER_BL, GRASS, PATH_H, PATH_H, PATH_H, BRIDGE,      PATH_H, PATH_H, PATH_H, GRASS, CORNER_BR,
    GRASS,     GRASS, GRASS,  GRASS,  GRASS,  BRIDGE_BASE, GRASS,  GRASS,  GRASS,  GRASS, GRASS,
];

impl SessionBlueprint {
    /// Two-lane 11x7 map with one player per team.
    ///
    /// The board is split by a river crossed by two bridges. Each player
    /// guards an inner tower at the middle of its back column and two outer
    /// towers in front of it.
    #[must_use]
    pub fn reference() -> Self {
        let width = f64::from(REFERENCE_COLUMNS);
        let height = f64::from(REFERENCE_ROWS);
        let middle = (height / 2.0).floor() + 0.5;
        let lanes = [1.5, height - 2.0 + 0.5];

        let player = |id: &str, inner_x: f64, outer_x: f64, capacity: f64| PlayerBlueprint {
            id: EntityId::new(id),
            inner_tower: Vec2::new(inner_x, middle),
            outer_towers: lanes.iter().map(|&y| Vec2::new(outer_x, y)).collect(),
            mana: ManaBlueprint {
                capacity,
                ..ManaBlueprint::default()
            },
            deck: DeckBlueprint::default(),
        };

        Self {
            board: BoardBlueprint {
                width: REFERENCE_COLUMNS,
                height: REFERENCE_ROWS,
                cells: REFERENCE_CELLS.to_vec(),
            },
            teams: [
                TeamBlueprint {
                    deploy_zone: Rect::new(0.0, 0.0, 5.0, height),
                    players: vec![player("player1", 0.5, 1.5, 5.0)],
                },
                TeamBlueprint {
                    deploy_zone: Rect::new(6.0, 0.0, 5.0, height),
                    players: vec![player("player2", width - 0.5, width - 1.5, 10.0)],
                },
            ],
            seed: 0,
            rules: Rules::default(),
        }
    }

    /// Checks the blueprint for problems that would make the world unusable.
    ///
    /// Deck sizes are checked when the decks are built.
    pub fn validate(&self) -> Result<(), BlueprintError> {
        let _ = Board::new(&self.board)?;

        self.rules.inner_tower.validate("rules.inner_tower")?;
        self.rules.outer_tower.validate("rules.outer_tower")?;
        self.rules.test_unit.validate()?;

        let mut seen = BTreeSet::new();
        for player in self.teams.iter().flat_map(|team| team.players.iter()) {
            if !seen.insert(&player.id) {
                return Err(BlueprintError::DuplicatePlayer(player.id.clone()));
            }
            ensure_non_negative("mana.initial", player.mana.initial)?;
            ensure_non_negative("mana.rate", player.mana.rate)?;
            ensure_non_negative("mana.capacity", player.mana.capacity)?;
            for card in &player.deck.cards {
                ensure_non_negative("card.cost", card.cost)?;
                ensure_non_negative("card.cooldown", card.cooldown)?;
            }
        }
        Ok(())
    }
}
