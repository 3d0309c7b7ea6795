//! Dedicated thread ticking a session at its configured rate.

use std::{
    thread::{self, JoinHandle},
    time::Instant,
};

use crossbeam_channel::{RecvTimeoutError, Sender};
use thiserror::Error;
use tracing::debug;

use crate::GameSession;

/// Failures raised while stopping a driver.
#[derive(Debug, Error)]
pub enum DriverError {
    /// The session thread panicked; the session is lost.
    #[error("session thread panicked")]
    Panicked,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Control {
    Start,
    Pause,
    Shutdown,
}

/// Runs a [`GameSession`] on its own thread.
///
/// Ticks never overlap: a tick that overruns its slot pushes the next
/// deadline out instead of queueing the missed fires. Commands still reach
/// the session through the sender obtained before spawning.
#[derive(Debug)]
pub struct SessionDriver {
    control: Sender<Control>,
    handle: Option<JoinHandle<GameSession>>,
}

impl SessionDriver {
    /// Moves `session` onto a new thread. The session keeps its running state.
    #[must_use]
    pub fn spawn(session: GameSession) -> Self {
        let (control, rx) = crossbeam_channel::unbounded();
        let handle = thread::spawn(move || run(session, &rx));
        Self {
            control,
            handle: Some(handle),
        }
    }

    /// Asks the session to start ticking.
    pub fn start(&self) {
        self.send(Control::Start);
    }

    /// Asks the session to stop ticking.
    pub fn pause(&self) {
        self.send(Control::Pause);
    }

    /// Stops the thread and hands the session back.
    pub fn shutdown(mut self) -> Result<GameSession, DriverError> {
        self.send(Control::Shutdown);
        let handle = self.handle.take().ok_or(DriverError::Panicked)?;
        handle.join().map_err(|_| DriverError::Panicked)
    }

    fn send(&self, message: Control) {
        if self.control.send(message).is_err() {
            debug!(target: "lanecraft_session", ?message, "session thread is gone");
        }
    }
}

impl Drop for SessionDriver {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.send(Control::Shutdown);
            let _ = handle.join();
        }
    }
}

fn run(mut session: GameSession, control: &crossbeam_channel::Receiver<Control>) -> GameSession {
    let interval = session.tick_interval();
    let mut deadline = Instant::now() + interval;
    loop {
        let timeout = deadline.saturating_duration_since(Instant::now());
        match control.recv_timeout(timeout) {
            Ok(Control::Start) => session.start(),
            Ok(Control::Pause) => session.pause(),
            Ok(Control::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {
                let _ = session.tick();
                let now = Instant::now();
                deadline += interval;
                if deadline <= now {
                    deadline = now + interval;
                }
            }
        }
    }
    session.pause();
    session
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            atomic::{AtomicU64, Ordering},
            Arc,
        },
        thread,
        time::Duration,
    };

    use lanecraft_world::{snapshot::Snapshot, SessionBlueprint};

    use super::SessionDriver;
    use crate::GameSession;

    #[test]
    fn driver_ticks_only_while_started() {
        let mut session = GameSession::new(&SessionBlueprint::reference()).expect("session");
        let ticks = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&ticks);
        let _ = session.subscribe(Box::new(move |snapshot: &Snapshot| {
            counter.store(snapshot.tick, Ordering::SeqCst);
        }));

        let driver = SessionDriver::spawn(session);
        thread::sleep(Duration::from_millis(120));
        assert_eq!(ticks.load(Ordering::SeqCst), 0);

        driver.start();
        thread::sleep(Duration::from_millis(400));
        driver.pause();
        thread::sleep(Duration::from_millis(100));
        let paused_at = ticks.load(Ordering::SeqCst);
        assert!(paused_at > 0);

        thread::sleep(Duration::from_millis(200));
        assert_eq!(ticks.load(Ordering::SeqCst), paused_at);

        let session = driver.shutdown().expect("session back");
        assert_eq!(session.snapshot().tick, paused_at);
        assert!(!session.is_running());
    }
}
