//! Minimal finite state machine driven by the owning entity.
//!
//! States are plain `Copy` values (usually a fieldless enum) implementing
//! [`State`]. Every hook is optional. The machine itself only remembers which
//! state is active; the data the hooks work on lives in the context passed
//! to each call, which keeps the machine free of back-references to its owner.

/// Behaviour attached to a named state.
///
/// `Ctx` is the data the state manipulates. [`State::Env`] is read/write
/// access to the surroundings that only exists during an update, such as the
/// battlefield and the combat outbox.
pub trait State<Ctx: ?Sized>: Copy + Eq + std::fmt::Debug {
    /// Surroundings handed to [`State::on_update`].
    type Env<'e>: ?Sized;

    /// Runs when the state becomes active.
    fn on_enter(self, _ctx: &mut Ctx) {}

    /// Runs once per update while the state is active.
    ///
    /// Returning `Some(next)` asks the machine to transition once the hook
    /// returns.
    fn on_update(self, _ctx: &mut Ctx, _env: &mut Self::Env<'_>, _dt: f64) -> Option<Self> {
        None
    }

    /// Runs when the state stops being active.
    fn on_exit(self, _ctx: &mut Ctx) {}
}

/// Tracks the active state of an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StateMachine<S> {
    current: S,
}

impl<S: Copy + Eq> StateMachine<S> {
    /// Activates `initial`, running its enter hook.
    pub fn start<Ctx: ?Sized>(initial: S, ctx: &mut Ctx) -> Self
    where
        S: State<Ctx>,
    {
        initial.on_enter(ctx);
        Self { current: initial }
    }

    /// Currently active state.
    #[must_use]
    pub fn state(&self) -> S {
        self.current
    }

    /// Reports whether `state` is the active state.
    #[must_use]
    pub fn is_current_state(&self, state: S) -> bool {
        self.current == state
    }

    /// Transitions to `next`, running the old state's exit hook and then the
    /// new state's enter hook.
    ///
    /// Requesting the active state is ignored and returns `false`.
    pub fn set_state<Ctx: ?Sized>(&mut self, ctx: &mut Ctx, next: S) -> bool
    where
        S: State<Ctx>,
    {
        if self.current == next {
            return false;
        }
        self.current.on_exit(ctx);
        self.current = next;
        next.on_enter(ctx);
        true
    }

    /// Dispatches to the active state's update hook and applies any
    /// transition it requests.
    pub fn update<Ctx: ?Sized>(
        &mut self,
        ctx: &mut Ctx,
        env: &mut <S as State<Ctx>>::Env<'_>,
        dt: f64,
    ) where
        S: State<Ctx>,
    {
        if let Some(next) = self.current.on_update(ctx, env, dt) {
            let _ = self.set_state(ctx, next);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{State, StateMachine};

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    enum Light {
        Red,
        Green,
        Amber,
    }

    #[derive(Debug, PartialEq)]
    enum Hook {
        Enter(Light),
        Update(Light),
        Exit(Light),
    }

    #[derive(Default)]
    struct Journal {
        hooks: Vec<Hook>,
        elapsed: f64,
    }

    impl State<Journal> for Light {
        type Env<'e> = Option<Light>;

        fn on_enter(self, ctx: &mut Journal) {
            ctx.hooks.push(Hook::Enter(self));
        }

        fn on_update(self, ctx: &mut Journal, env: &mut Option<Light>, dt: f64) -> Option<Self> {
            ctx.hooks.push(Hook::Update(self));
            ctx.elapsed += dt;
            env.take()
        }

        fn on_exit(self, ctx: &mut Journal) {
            ctx.hooks.push(Hook::Exit(self));
        }
    }

    #[test]
    fn start_enters_the_initial_state() {
        let mut journal = Journal::default();
        let machine = StateMachine::start(Light::Red, &mut journal);
        assert_eq!(machine.state(), Light::Red);
        assert_eq!(journal.hooks, vec![Hook::Enter(Light::Red)]);
    }

    #[test]
    fn set_state_pairs_exit_with_enter() {
        let mut journal = Journal::default();
        let mut machine = StateMachine::start(Light::Red, &mut journal);
        journal.hooks.clear();

        assert!(machine.set_state(&mut journal, Light::Green));
        assert!(machine.set_state(&mut journal, Light::Amber));
        assert!(machine.set_state(&mut journal, Light::Red));

        assert_eq!(
            journal.hooks,
            vec![
                Hook::Exit(Light::Red),
                Hook::Enter(Light::Green),
                Hook::Exit(Light::Green),
                Hook::Enter(Light::Amber),
                Hook::Exit(Light::Amber),
                Hook::Enter(Light::Red),
            ]
        );
    }

    #[test]
    fn requesting_the_active_state_runs_no_hooks() {
        let mut journal = Journal::default();
        let mut machine = StateMachine::start(Light::Green, &mut journal);
        journal.hooks.clear();

        assert!(!machine.set_state(&mut journal, Light::Green));
        assert!(journal.hooks.is_empty());
        assert!(machine.is_current_state(Light::Green));
    }

    #[test]
    fn update_only_reaches_the_active_state() {
        let mut journal = Journal::default();
        let mut machine = StateMachine::start(Light::Red, &mut journal);
        journal.hooks.clear();

        machine.update(&mut journal, &mut None, 16.0);
        machine.update(&mut journal, &mut None, 16.0);

        assert_eq!(
            journal.hooks,
            vec![Hook::Update(Light::Red), Hook::Update(Light::Red)]
        );
        assert!((journal.elapsed - 32.0).abs() < f64::EPSILON);
    }

    #[test]
    fn transition_requested_by_update_completes_before_next_update() {
        let mut journal = Journal::default();
        let mut machine = StateMachine::start(Light::Red, &mut journal);
        journal.hooks.clear();

        machine.update(&mut journal, &mut Some(Light::Green), 10.0);
        machine.update(&mut journal, &mut None, 10.0);

        assert_eq!(
            journal.hooks,
            vec![
                Hook::Update(Light::Red),
                Hook::Exit(Light::Red),
                Hook::Enter(Light::Green),
                Hook::Update(Light::Green),
            ]
        );
    }
}
