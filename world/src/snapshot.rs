//! Serializable projections of the world handed to observers.
//!
//! Field names follow the camelCase convention of the JSON wire format that
//! renderers consume.

use lanecraft_core::{Bbox, CardTarget, EntityId, Millis, Rect, Side, Vec2};
use serde::{Deserialize, Serialize};

use crate::{
    board::Cell,
    combat::Health,
    tower::{TowerKind, TowerState},
    unit::{Orientation, UnitState},
};

/// Transient happenings reported alongside a snapshot.
///
/// No event kinds are emitted yet; the list is always empty.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {}

/// View of a tower.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TowerSnapshot {
    /// Tower identifier.
    pub id: EntityId,
    /// Player owning the tower.
    pub player_id: EntityId,
    /// Inner or outer tower.
    pub kind: TowerKind,
    /// Collision body, anchored at its centre.
    pub body: Bbox,
    /// Remaining and maximum health.
    pub health: Health,
    /// Effective attack radius.
    pub attack_range: f64,
    /// Active state.
    pub state: TowerState,
}

/// View of a unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitSnapshot {
    /// Unit identifier.
    pub id: EntityId,
    /// Player owning the unit.
    pub player_id: EntityId,
    /// Collision body, anchored at its centre.
    pub body: Bbox,
    /// Remaining and maximum health.
    pub health: Health,
    /// Effective attack radius.
    pub attack_range: f64,
    /// Radius within which enemy units are engaged first.
    pub aggro_range: f64,
    /// Active state.
    pub state: UnitState,
    /// Heading of the unit.
    pub velocity: Vec2,
    /// Direction the unit faces.
    pub orientation: Orientation,
    /// Effective cells travelled per second.
    pub speed: f64,
}

/// View of a card in hand.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardSummary {
    /// Card identifier.
    pub id: EntityId,
    /// Display name.
    pub name: String,
    /// Mana cost.
    pub cost: f64,
    /// Allowed targets.
    pub targets: Vec<CardTarget>,
    /// Cooldown progress from `0.0` to `1.0`.
    pub cooldown_progress: f64,
}

/// View of a player's mana pool.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManaSummary {
    /// Mana currently held.
    pub current: f64,
    /// Upper bound of the pool.
    pub capacity: f64,
}

/// View of a player.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSummary {
    /// Player identifier.
    pub id: EntityId,
    /// Mana pool.
    pub mana: ManaSummary,
    /// Cards in hand, in slot order.
    pub hand: Vec<CardSummary>,
}

/// View of a team.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamSummary {
    /// Team identifier.
    pub id: EntityId,
    /// Side the team fights on.
    pub side: Side,
    /// Players of the team.
    pub players: Vec<PlayerSummary>,
}

/// State published after every tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Number of ticks simulated so far.
    pub tick: u64,
    /// Simulated time elapsed so far.
    pub elapsed: Millis,
    /// Per-team player summaries.
    pub teams: Vec<TeamSummary>,
    /// Every tower across both teams.
    pub towers: Vec<TowerSnapshot>,
    /// Every unit across both teams.
    pub units: Vec<UnitSnapshot>,
    /// Transient events of the tick.
    pub events: Vec<GameEvent>,
}

/// Static board layout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardLayout {
    /// Number of columns.
    pub width: u32,
    /// Number of rows.
    pub height: u32,
    /// Cells in row-major order.
    pub cells: Vec<Cell>,
}

/// Team description used to bootstrap a renderer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamLayout {
    /// Team identifier.
    pub id: EntityId,
    /// Side the team fights on.
    pub side: Side,
    /// Region the team deploys units into.
    pub deploy_zone: Rect,
    /// Players of the team.
    pub players: Vec<PlayerSummary>,
}

/// One-time description of the session for renderers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialState {
    /// Board layout.
    pub board: BoardLayout,
    /// Teams with their deploy zones and players.
    pub teams: Vec<TeamLayout>,
    /// Every tower across both teams.
    pub towers: Vec<TowerSnapshot>,
    /// Every unit across both teams.
    pub units: Vec<UnitSnapshot>,
}
