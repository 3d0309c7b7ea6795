//! Error types raised while building or mutating the world.

use lanecraft_core::EntityId;
use thiserror::Error;

/// Failures raised while assembling a player's deck.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DeckError {
    /// The deck holds fewer cards than a full hand plus one draw.
    #[error("expected a deck with at least {minimum} cards but got one with {actual}")]
    TooSmall {
        /// Smallest playable deck size.
        minimum: usize,
        /// Number of cards supplied.
        actual: usize,
    },
}

/// Failures raised while turning a session blueprint into a world.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum BlueprintError {
    /// The cell list does not cover the declared board dimensions.
    #[error("board of {width}x{height} needs {expected} cells but {actual} were supplied")]
    BoardSize {
        /// Declared column count.
        width: u32,
        /// Declared row count.
        height: u32,
        /// Cell count implied by the dimensions.
        expected: usize,
        /// Cell count actually supplied.
        actual: usize,
    },
    /// Two players share an identifier.
    #[error("player id `{0}` is used more than once")]
    DuplicatePlayer(EntityId),
    /// A player's deck could not be assembled.
    #[error("deck of player `{player}` is unusable")]
    Deck {
        /// Player owning the deck.
        player: EntityId,
        /// Underlying deck failure.
        #[source]
        source: DeckError,
    },
    /// A numeric field is negative or not finite.
    #[error("`{field}` must be a finite, non-negative number but was {value}")]
    InvalidValue {
        /// Name of the offending field.
        field: &'static str,
        /// Supplied value.
        value: f64,
    },
}

/// Rejections raised while applying a command to the world.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    /// No player in either team carries the identifier.
    #[error("no player with id `{0}` takes part in the session")]
    UnknownPlayer(EntityId),
}

/// Ensures `value` is finite and not negative.
pub(crate) fn ensure_non_negative(field: &'static str, value: f64) -> Result<(), BlueprintError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(BlueprintError::InvalidValue { field, value })
    }
}
