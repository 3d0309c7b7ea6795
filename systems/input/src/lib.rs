#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Input pipeline that turns raw commands from external actors into world
//! mutations.
//!
//! Producers hold a [`CommandSender`] and may live on any thread. Dispatch
//! only checks that the command type is known; the payload is decoded when
//! the command executes during [`InputSystem::process`], at the start of the
//! next tick.

use crossbeam_channel::{Receiver, Sender};
use lanecraft_core::{CardTarget, Command, EntityId, HandSlot, Vec2};
use lanecraft_world::{self as world, Applied, CommandError, World};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, trace, warn};

/// Command as submitted by an external actor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawCommand {
    /// Registered name of the command type.
    #[serde(rename = "type")]
    pub kind: String,
    /// JSON payload, decoded against the type's schema on execution.
    #[serde(default)]
    pub payload: Value,
}

impl RawCommand {
    /// Creates a raw command from a type name and payload.
    #[must_use]
    pub fn new(kind: impl Into<String>, payload: Value) -> Self {
        Self {
            kind: kind.into(),
            payload,
        }
    }
}

/// Command types the pipeline recognises.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// Deploys a unit with the test statistics. Payload: `playerId`, `x`, `y`.
    SpawnUnit,
    /// Plays a card from hand. Payload: `playerId`, `slot` (or `card2play`)
    /// and an optional `target` defaulting to the player's board.
    PlayCard,
}

impl CommandKind {
    /// Every registered command type.
    pub const ALL: [CommandKind; 2] = [CommandKind::SpawnUnit, CommandKind::PlayCard];

    /// Name under which the type is dispatched.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::SpawnUnit => "spawn-unit",
            Self::PlayCard => "play-card",
        }
    }

    /// Finds the command type registered under `name`.
    #[must_use]
    pub fn lookup(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Validates `payload` against the type's schema and builds the command.
    pub fn decode(self, payload: Value) -> Result<Command, InputError> {
        let invalid = |source| InputError::InvalidPayload {
            kind: self.name(),
            source,
        };
        match self {
            Self::SpawnUnit => {
                let payload: SpawnUnitPayload = serde_json::from_value(payload).map_err(invalid)?;
                Ok(Command::SpawnTestUnit {
                    player: payload.player_id,
                    position: Vec2::new(payload.x, payload.y),
                })
            }
            Self::PlayCard => {
                let payload: PlayCardPayload = serde_json::from_value(payload).map_err(invalid)?;
                Ok(Command::PlayCard {
                    player: payload.player_id,
                    slot: payload.slot,
                    target: payload.target,
                })
            }
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpawnUnitPayload {
    player_id: EntityId,
    x: f64,
    y: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayCardPayload {
    player_id: EntityId,
    #[serde(alias = "card2play")]
    slot: HandSlot,
    #[serde(default = "own_board")]
    target: CardTarget,
}

fn own_board() -> CardTarget {
    CardTarget::PlayerBoard
}

/// Failures raised while executing a queued command.
#[derive(Debug, Error)]
pub enum InputError {
    /// The payload does not match the command type's schema.
    #[error("payload of `{kind}` command is invalid: {source}")]
    InvalidPayload {
        /// Name of the command type.
        kind: &'static str,
        /// Decoding failure.
        #[source]
        source: serde_json::Error,
    },
    /// The world refused the command.
    #[error(transparent)]
    Command(#[from] CommandError),
}

/// Result of handing a raw command to the pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dispatch {
    /// The command was queued for the next tick.
    Queued,
    /// The command type is unknown or the pipeline is gone; nothing was queued.
    Dropped,
}

#[derive(Debug)]
struct PendingCommand {
    kind: CommandKind,
    payload: Value,
}

/// Cloneable producer handle that queues commands from any thread.
#[derive(Clone, Debug)]
pub struct CommandSender {
    tx: Sender<PendingCommand>,
}

impl CommandSender {
    /// Queues `raw` if its type is registered.
    pub fn dispatch(&self, raw: RawCommand) -> Dispatch {
        let Some(kind) = CommandKind::lookup(&raw.kind) else {
            debug!(
                target: "lanecraft_system_input",
                kind = %raw.kind,
                "dropping unknown command type"
            );
            return Dispatch::Dropped;
        };
        let pending = PendingCommand {
            kind,
            payload: raw.payload,
        };
        match self.tx.send(pending) {
            Ok(()) => Dispatch::Queued,
            Err(_) => {
                debug!(
                    target: "lanecraft_system_input",
                    kind = kind.name(),
                    "input system is gone"
                );
                Dispatch::Dropped
            }
        }
    }
}

/// Consumer side of the command queue, drained once per tick.
#[derive(Debug)]
pub struct InputSystem {
    tx: Sender<PendingCommand>,
    rx: Receiver<PendingCommand>,
}

impl Default for InputSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSystem {
    /// Creates an empty pipeline.
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self { tx, rx }
    }

    /// Producer handle feeding this pipeline.
    #[must_use]
    pub fn sender(&self) -> CommandSender {
        CommandSender {
            tx: self.tx.clone(),
        }
    }

    /// Queues `raw` through an internal producer handle.
    pub fn dispatch(&self, raw: RawCommand) -> Dispatch {
        self.sender().dispatch(raw)
    }

    /// Number of commands waiting for the next tick.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.rx.len()
    }

    /// Executes the queued commands against `world` in submission order.
    ///
    /// Only the commands present when draining starts are executed; anything
    /// submitted meanwhile waits for the next call. A failing command is
    /// logged and skipped. Returns the number of commands drained.
    pub fn process(&mut self, world: &mut World) -> usize {
        let queued = self.rx.len();
        let mut drained = 0;
        for pending in self.rx.try_iter().take(queued) {
            drained += 1;
            let kind = pending.kind.name();
            match execute(world, pending) {
                Ok(Applied::CardRejected) => {
                    trace!(target: "lanecraft_system_input", kind, "card play rejected");
                }
                Ok(_) => {}
                Err(error) => {
                    warn!(target: "lanecraft_system_input", kind, %error, "skipping command");
                }
            }
        }
        drained
    }
}

fn execute(world: &mut World, pending: PendingCommand) -> Result<Applied, InputError> {
    let command = pending.kind.decode(pending.payload)?;
    Ok(world::apply(world, command)?)
}
