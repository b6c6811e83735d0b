//! House Registry Module
//!
//! The house owns every adopted watcher plus the recovery actions to run
//! when any of them starves. Callers mutate individual watchers through
//! their handles, then periodically drive [`House::check`], which evaluates
//! all watchers, fires recovery if needed, and unconditionally resets every
//! watcher for the next monitoring interval.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::clock::{Clock, SystemClock};
use crate::error::{HouseError, ResetFnError, Result};
use crate::policy::StarvePolicy;
use crate::watcher::{Watcher, WatcherState};

/// A recovery action, run in registration order when any watcher starves.
pub type ResetFn = Box<dyn FnMut() -> std::result::Result<(), ResetFnError> + Send>;

/// State shared between a house and its watcher handles.
pub(crate) struct Shared {
    pub(crate) clock: Box<dyn Clock>,
    pub(crate) registry: Mutex<Registry>,
}

pub(crate) struct Registry {
    pub(crate) watchers: HashMap<String, WatcherState>,
    reset_functions: Vec<ResetFn>,
}

/// Outcome of one check cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    /// Names of the watchers found starved, sorted. Empty on a healthy cycle.
    pub starved: Vec<String>,

    /// Whether the recovery sequence ran, i.e. whether any watcher starved.
    /// True even when the house holds zero reset functions.
    pub recovery_ran: bool,
}

/// Registry of watchers sharing one set of recovery actions.
///
/// A house is an explicit instance, not a process-wide singleton; multiple
/// independent houses may coexist. All operations on a house and on the
/// handles it hands out go through one internal lock, so a worker thread
/// may feed while a monitor thread checks. Recovery callbacks run under
/// that lock and must not call back into the same house.
pub struct House {
    shared: Arc<Shared>,
}

impl House {
    /// Create a house with the given recovery actions, driven by the
    /// system clock.
    pub fn new(reset_functions: Vec<ResetFn>) -> Self {
        Self::with_clock(reset_functions, SystemClock)
    }

    /// Create a house with an injected clock. Timeout evaluation follows
    /// that clock exclusively, which keeps checks deterministic in tests.
    pub fn with_clock(reset_functions: Vec<ResetFn>, clock: impl Clock + 'static) -> Self {
        if reset_functions.is_empty() {
            tracing::warn!("no reset functions registered; checks will detect but not recover");
        }
        Self {
            shared: Arc::new(Shared {
                clock: Box::new(clock),
                registry: Mutex::new(Registry {
                    watchers: HashMap::new(),
                    reset_functions,
                }),
            }),
        }
    }

    /// Register a new watcher under `name` and return a handle to it.
    ///
    /// Fails with [`HouseError::InvalidPolicy`] if the policy sets neither
    /// limit or sets one to zero, and with [`HouseError::DuplicateName`] if
    /// the name is taken; the existing watcher is left untouched.
    pub fn adopt(&self, name: impl Into<String>, policy: StarvePolicy) -> Result<Watcher> {
        policy.validate()?;
        let name = name.into();
        let now = self.shared.clock.now();
        let mut registry = self.shared.registry.lock();
        match registry.watchers.entry(name.clone()) {
            Entry::Occupied(_) => {
                tracing::debug!(%name, "attempted to adopt the same watcher twice");
                Err(HouseError::DuplicateName { name })
            }
            Entry::Vacant(slot) => {
                slot.insert(WatcherState::new(policy, now));
                tracing::debug!(%name, ?policy, "adopted watcher");
                Ok(Watcher::new(name, Arc::clone(&self.shared)))
            }
        }
    }

    /// Remove a watcher from the registry. Outstanding handles for the name
    /// become inert. Fails with [`HouseError::NotFound`] for unknown names.
    pub fn abandon(&self, name: &str) -> Result<()> {
        let mut registry = self.shared.registry.lock();
        if registry.watchers.remove(name).is_some() {
            tracing::debug!(name, "abandoned watcher");
            Ok(())
        } else {
            Err(HouseError::NotFound {
                name: name.to_string(),
            })
        }
    }

    /// Evaluate every watcher at the clock's current instant.
    pub fn check(&self) -> Result<CheckResult> {
        self.check_at(self.shared.clock.now())
    }

    /// Evaluate every watcher at an explicit instant.
    ///
    /// If any watcher is starved, the cycle has failed and every reset
    /// function runs in registration order; the first failure skips the
    /// rest and surfaces as [`HouseError::Recovery`]. Either way, every
    /// watcher is reset before this returns: the monitoring interval
    /// restarts unconditionally, so state never gets stuck behind a failed
    /// recovery. The whole evaluate-recover-reset sequence holds the house
    /// lock, so no concurrent `feed()` can land between evaluation and
    /// reset.
    pub fn check_at(&self, now: Instant) -> Result<CheckResult> {
        let mut registry = self.shared.registry.lock();

        let mut starved: Vec<String> = registry
            .watchers
            .iter()
            .filter(|(_, state)| state.is_starved(now))
            .map(|(name, _)| name.clone())
            .collect();
        starved.sort();

        let mut failure = None;
        let recovery_ran = !starved.is_empty();
        if recovery_ran {
            tracing::error!(?starved, "starved watchers detected, running recovery");
            for (index, reset_function) in registry.reset_functions.iter_mut().enumerate() {
                if let Err(source) = reset_function() {
                    tracing::warn!(index, error = %source, "reset function failed, skipping the rest");
                    failure = Some((index, source));
                    break;
                }
            }
        }

        for state in registry.watchers.values_mut() {
            state.reset(now);
        }

        match failure {
            Some((index, source)) => Err(HouseError::Recovery {
                index,
                starved,
                source,
            }),
            None => Ok(CheckResult {
                starved,
                recovery_ran,
            }),
        }
    }

    /// Number of registered watchers.
    pub fn len(&self) -> usize {
        self.shared.registry.lock().watchers.len()
    }

    /// True if no watchers are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True if a watcher with this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.shared.registry.lock().watchers.contains_key(name)
    }
}

impl fmt::Debug for House {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.shared.registry.lock();
        f.debug_struct("House")
            .field("watchers", &registry.watchers.len())
            .field("reset_functions", &registry.reset_functions.len())
            .finish()
    }
}
