#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Lanecraft simulation.
//!
//! This crate defines the vocabulary that connects adapters, the
//! authoritative world, and the session loop. Adapters submit [`Command`]
//! values describing desired mutations, the world executes them through its
//! `apply` entry point, and observers only ever read serialized snapshots.
//! The generic building blocks used by every simulation entity also live
//! here: geometry, modifier pipelines, state machines and subscription lists.

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod geometry;
pub mod interceptable;
pub mod signal;
pub mod state_machine;

pub use geometry::{Bbox, Circle, Rect, Vec2};
pub use interceptable::{interceptor, Interceptable, Interceptor, DEFAULT_PRIORITY};
pub use signal::{OnceSignal, Subscribers, SubscriptionId};
pub use state_machine::{State, StateMachine};

/// Simulation time measured in milliseconds.
///
/// Rates (mana per millisecond), cooldowns and spawn timers all share this
/// unit so that no conversions happen inside the simulation.
pub type Millis = f64;

/// Turns a raw tick delta into one the simulation can integrate.
///
/// Negative, infinite and NaN deltas collapse to zero so time never runs
/// backwards.
#[must_use]
pub fn settle_delta(dt: Millis) -> Millis {
    if dt.is_finite() && dt > 0.0 {
        dt
    } else {
        0.0
    }
}

/// Number of card slots in a player's hand.
pub const HAND_SIZE: usize = 4;

/// Stable, opaque identifier carried by every simulation object.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Wraps the provided string as an identifier.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrowed string form of the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Anything that participates in the simulation under a stable identifier.
///
/// Two entities are the same entity exactly when their identifiers match.
pub trait Entity {
    /// Identifier assigned when the entity was constructed.
    fn id(&self) -> &EntityId;

    /// Reports whether `other` refers to the same entity.
    fn is_same(&self, other: &dyn Entity) -> bool {
        self.id() == other.id()
    }
}

/// Single allocation point for identifiers minted during a session.
#[derive(Debug, Default)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    /// Creates an allocator whose first identifier carries the suffix `1`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates the next identifier, prefixed with `kind`.
    pub fn allocate(&mut self, kind: &str) -> EntityId {
        self.next = self.next.saturating_add(1);
        EntityId(format!("{kind}-{}", self.next))
    }
}

/// One of the two opposing teams on the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Side {
    /// Team listed first in the session blueprint.
    First,
    /// Team listed second in the session blueprint.
    Second,
}

impl Side {
    /// Both sides in blueprint order.
    pub const ALL: [Side; 2] = [Side::First, Side::Second];

    /// The opposing side.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::First => Self::Second,
            Self::Second => Self::First,
        }
    }

    /// Zero-based index of the side in blueprint order.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::First => 0,
            Self::Second => 1,
        }
    }
}

/// Kinds of things a card may be played onto.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardTarget {
    /// The acting player's half of the board.
    PlayerBoard,
    /// A unit owned by the acting player.
    PlayerUnit,
    /// A tower owned by the acting player.
    PlayerTower,
    /// The opponent's half of the board.
    OpponentBoard,
    /// A unit owned by an opponent.
    OpponentUnit,
    /// A tower owned by an opponent.
    OpponentTower,
}

/// Index of a card slot in a player's hand, always below [`HAND_SIZE`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct HandSlot(u8);

impl HandSlot {
    /// Every slot in hand order.
    pub const ALL: [HandSlot; HAND_SIZE] = [HandSlot(0), HandSlot(1), HandSlot(2), HandSlot(3)];

    /// Zero-based position of the slot.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Rejection produced when converting an out-of-range hand slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InvalidHandSlot(pub u8);

impl fmt::Display for InvalidHandSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hand slot {} is outside 0..{HAND_SIZE}", self.0)
    }
}

impl std::error::Error for InvalidHandSlot {}

impl TryFrom<u8> for HandSlot {
    type Error = InvalidHandSlot;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if usize::from(value) < HAND_SIZE {
            Ok(Self(value))
        } else {
            Err(InvalidHandSlot(value))
        }
    }
}

impl From<HandSlot> for u8 {
    fn from(slot: HandSlot) -> Self {
        slot.0
    }
}

/// Commands that express all permissible player-driven world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Deploys a unit with the fixed test statistics at a board position.
    SpawnTestUnit {
        /// Player that will own the unit.
        player: EntityId,
        /// Board position of the unit's centre.
        position: Vec2,
    },
    /// Attempts to play the card held in a hand slot.
    PlayCard {
        /// Player whose hand is played from.
        player: EntityId,
        /// Hand slot holding the card.
        slot: HandSlot,
        /// Target the card is played onto.
        target: CardTarget,
    },
}

impl Command {
    /// Player the command acts on behalf of.
    #[must_use]
    pub fn player(&self) -> &EntityId {
        match self {
            Self::SpawnTestUnit { player, .. } | Self::PlayCard { player, .. } => player,
        }
    }
}
