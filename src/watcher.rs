//! Watcher State Machine Module
//!
//! A watcher is a named liveness monitor. Callers mark progress with
//! `feed()`, mark the start of a new attempt with `starve()`, and the house
//! evaluates starvation at `check()` time. The stored state is only ever
//! `Pending` or `Fed`; "starved" is a predicate over accumulated count and
//! elapsed time, not a persisted transition.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use crate::house::Shared;
use crate::policy::StarvePolicy;

/// Per-watcher bookkeeping, owned by the house and guarded by its lock.
#[derive(Debug)]
pub(crate) struct WatcherState {
    policy: StarvePolicy,
    last_fed_at: Instant,
    event_count: u64,
    fed: bool,
    active: bool,
}

impl WatcherState {
    pub(crate) fn new(policy: StarvePolicy, now: Instant) -> Self {
        Self {
            policy,
            last_fed_at: now,
            event_count: 0,
            fed: false,
            active: true,
        }
    }

    /// The watched activity completed successfully. Idempotent; repeated
    /// calls only refresh the timestamp.
    pub(crate) fn feed(&mut self, now: Instant) {
        self.fed = true;
        self.event_count = 0;
        self.last_fed_at = now;
    }

    /// A new attempt has begun and has not yet succeeded.
    pub(crate) fn starve(&mut self) {
        self.fed = false;
        self.event_count += 1;
    }

    /// Pure query: has this watcher breached a configured limit without
    /// being fed? A fed or kenneled watcher is never starved.
    pub(crate) fn is_starved(&self, now: Instant) -> bool {
        if self.fed || !self.active {
            return false;
        }
        let timed_out = self
            .policy
            .timeout
            .map_or(false, |timeout| {
                now.saturating_duration_since(self.last_fed_at) >= timeout
            });
        let over_count = self
            .policy
            .max_events
            .map_or(false, |max_events| self.event_count >= max_events);
        timed_out || over_count
    }

    /// Re-enter `Pending` for the next monitoring interval. Invoked by the
    /// house after every check cycle, fed or starved alike.
    pub(crate) fn reset(&mut self, now: Instant) {
        self.fed = false;
        self.event_count = 0;
        self.last_fed_at = now;
    }

    /// Deactivate: a kenneled watcher does not need feeding and is skipped
    /// by starvation checks.
    pub(crate) fn send_to_kennel(&mut self) {
        self.active = false;
    }

    /// Reactivate. Feeds on the way in so the watcher does not starve on
    /// the very next check.
    pub(crate) fn send_to_home(&mut self, now: Instant) {
        self.feed(now);
        self.active = true;
    }

    #[cfg(test)]
    pub(crate) fn fed(&self) -> bool {
        self.fed
    }

    #[cfg(test)]
    pub(crate) fn event_count(&self) -> u64 {
        self.event_count
    }
}

/// Handle to a registered watcher.
///
/// Handles are cheap to clone and safe to hand to the thread doing the
/// actual work while another thread drives `House::check()`. Every operation
/// goes through the house's single lock. A handle whose watcher has been
/// abandoned becomes inert: its operations log a warning and do nothing.
#[derive(Clone)]
pub struct Watcher {
    name: String,
    shared: Arc<Shared>,
}

impl Watcher {
    pub(crate) fn new(name: String, shared: Arc<Shared>) -> Self {
        Self { name, shared }
    }

    /// The name this watcher was adopted under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Signal that the watched activity completed successfully within the
    /// current interval.
    pub fn feed(&self) {
        let now = self.shared.clock.now();
        self.with_state(|state| state.feed(now));
    }

    /// Signal that a new attempt of the watched activity has begun,
    /// clearing any prior fed status.
    pub fn starve(&self) {
        self.with_state(|state| state.starve());
    }

    /// Would this watcher be reported starved if `check()` ran right now?
    /// Returns false for an abandoned watcher.
    pub fn is_starved(&self) -> bool {
        let now = self.shared.clock.now();
        let registry = self.shared.registry.lock();
        registry
            .watchers
            .get(&self.name)
            .map_or(false, |state| state.is_starved(now))
    }

    /// Mark this watcher as away at the kennel: it does not need feeding
    /// and will never be reported starved until it comes home.
    pub fn send_to_kennel(&self) {
        self.with_state(|state| state.send_to_kennel());
    }

    /// Bring this watcher home and resume monitoring. The watcher comes
    /// home fed so it does not starve immediately.
    pub fn send_to_home(&self) {
        let now = self.shared.clock.now();
        self.with_state(|state| state.send_to_home(now));
    }

    fn with_state(&self, apply: impl FnOnce(&mut WatcherState)) {
        let mut registry = self.shared.registry.lock();
        match registry.watchers.get_mut(&self.name) {
            Some(state) => apply(state),
            None => {
                tracing::warn!(name = %self.name, "operation on abandoned watcher ignored");
            }
        }
    }
}

impl fmt::Debug for Watcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Watcher").field("name", &self.name).finish()
    }
}
