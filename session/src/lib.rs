#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Game session driving the Lanecraft world at a fixed tick rate.
//!
//! A [`GameSession`] owns the world and the input pipeline. Every tick it
//! executes the commands queued since the previous tick, advances the world
//! by the measured delta and publishes a snapshot to its subscribers.
//! [`SessionDriver`] runs a session on a dedicated thread.

mod clock;
mod driver;

use std::time::{Duration, Instant};

use lanecraft_core::{EntityId, Millis, Subscribers, SubscriptionId};
use lanecraft_system_input::{CommandSender, Dispatch, InputSystem, RawCommand};
use lanecraft_world::{
    self as world,
    cards::{PlayListener, PlayPhase, PlaySubscription},
    query,
    snapshot::{InitialState, Snapshot},
    BlueprintError, CommandError, SessionBlueprint, World,
};
use tracing::{debug, trace};

pub use clock::{Clock, ManualClock, SystemClock};
pub use driver::{DriverError, SessionDriver};

/// Callback receiving the snapshot published after every tick.
pub type SnapshotListener = dyn FnMut(&Snapshot) + Send;

/// Authoritative game session.
#[derive(Debug)]
pub struct GameSession {
    world: World,
    input: InputSystem,
    clock: Box<dyn Clock>,
    running: bool,
    subscribers: Subscribers<SnapshotListener>,
}

impl GameSession {
    /// Builds a session measuring ticks with the wall clock.
    pub fn new(blueprint: &SessionBlueprint) -> Result<Self, BlueprintError> {
        Self::with_clock(blueprint, Box::new(SystemClock::new()))
    }

    /// Builds a session measuring ticks with `clock`.
    pub fn with_clock(
        blueprint: &SessionBlueprint,
        clock: Box<dyn Clock>,
    ) -> Result<Self, BlueprintError> {
        Ok(Self {
            world: World::from_blueprint(blueprint)?,
            input: InputSystem::new(),
            clock,
            running: false,
            subscribers: Subscribers::new(),
        })
    }

    /// Starts ticking. Does nothing when already running.
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        self.clock.reset();
        debug!(
            target: "lanecraft_session",
            tick = query::tick_index(&self.world),
            "session started"
        );
    }

    /// Stops ticking. Does nothing when already paused.
    pub fn pause(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        debug!(
            target: "lanecraft_session",
            tick = query::tick_index(&self.world),
            "session paused"
        );
    }

    /// Reports whether [`GameSession::tick`] currently advances the world.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Time between two ticks at the configured rate.
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        let rate = query::rules(&self.world).ticks_per_second.max(1);
        Duration::from_nanos(1_000_000_000 / u64::from(rate))
    }

    /// Runs one tick using the clock's delta.
    ///
    /// Returns `None` without touching the world while paused.
    pub fn tick(&mut self) -> Option<Snapshot> {
        if !self.running {
            return None;
        }
        let _ = self.input.process(&mut self.world);
        let dt = self.clock.lap();
        Some(self.step(dt))
    }

    /// Runs one tick of exactly `dt` milliseconds, running or not.
    pub fn tick_with(&mut self, dt: Millis) -> Snapshot {
        let _ = self.input.process(&mut self.world);
        self.step(dt)
    }

    fn step(&mut self, dt: Millis) -> Snapshot {
        let started = Instant::now();
        world::advance(&mut self.world, dt);
        let snapshot = query::snapshot(&self.world);
        for listener in self.subscribers.iter_mut() {
            listener(&snapshot);
        }
        trace!(
            target: "lanecraft_session",
            tick = snapshot.tick,
            dt,
            elapsed_us = started.elapsed().as_micros() as u64,
            "tick completed"
        );
        snapshot
    }

    /// Registers `listener` for the snapshot published after every tick.
    pub fn subscribe(&mut self, listener: Box<SnapshotListener>) -> SubscriptionId {
        self.subscribers.subscribe(listener)
    }

    /// Detaches a snapshot listener. Returns `false` when it was unknown.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    /// Attaches a card play listener to the deck of `player`.
    ///
    /// Listeners resolve the effects of played cards.
    pub fn subscribe_card_plays(
        &mut self,
        player: &EntityId,
        phase: PlayPhase,
        listener: Box<PlayListener>,
    ) -> Result<PlaySubscription, CommandError> {
        let player = self
            .world
            .player_mut(player)
            .ok_or_else(|| CommandError::UnknownPlayer(player.clone()))?;
        Ok(player.deck_mut().subscribe(phase, listener))
    }

    /// Producer handle for submitting commands from any thread.
    #[must_use]
    pub fn commands(&self) -> CommandSender {
        self.input.sender()
    }

    /// Queues `raw` for the next tick.
    pub fn dispatch(&self, raw: RawCommand) -> Dispatch {
        self.input.dispatch(raw)
    }

    /// State as of the last tick.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        query::snapshot(&self.world)
    }

    /// One-time description of the board and teams for renderers.
    #[must_use]
    pub fn initial_state(&self) -> InitialState {
        query::initial_state(&self.world)
    }

    /// Read access to the world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }
}
