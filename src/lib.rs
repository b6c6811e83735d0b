//! doghouse - in-process liveness monitoring
//!
//! Callers adopt named watchers into a [`House`], each with a starvation
//! policy: a wall-time limit, an attempt-count limit, or both. The watched
//! code feeds its watcher to signal progress and starves it to mark the
//! start of a new attempt. A monitor loop drives [`House::check`], which
//! reports any starved watchers, runs the registered recovery actions, and
//! resets every watcher for the next interval. This recovers from problems
//! that degrade progress without completely halting the code.
//!
//! The house never schedules anything itself: the caller decides when to
//! check. Time comes from an injectable [`Clock`], so checks stay
//! deterministic under test.
//!
//! ```
//! use std::time::Duration;
//! use doghouse::{House, StarvePolicy};
//!
//! let house = House::new(vec![Box::new(|| {
//!     // e.g. restart the stalled worker, dispatch an alert
//!     Ok(())
//! })]);
//!
//! let spot = house.adopt("spot", StarvePolicy::timeout(Duration::from_secs(30)))?;
//! spot.starve(); // an attempt began
//! spot.feed();   // ...and completed in time
//!
//! let result = house.check()?;
//! assert!(result.starved.is_empty());
//! # Ok::<(), doghouse::HouseError>(())
//! ```

pub mod clock;
pub mod error;
pub mod house;
pub mod policy;
pub mod watcher;


// Re-export commonly used items
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{HouseError, ResetFnError, Result};
pub use house::{CheckResult, House, ResetFn};
pub use policy::StarvePolicy;
pub use watcher::Watcher;
