//! Starvation Policy Module
//!
//! A policy sets the limits a watcher is held to between feedings: a wall
//! time limit, an attempt count limit, or both. Policies are validated when
//! the watcher is adopted.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::HouseError;

/// Limits that decide when an unfed watcher counts as starved.
///
/// At least one limit must be set; a policy with neither is rejected at
/// `adopt()` time, as are zero-valued limits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarvePolicy {
    /// Maximum wall time between feedings.
    pub timeout: Option<Duration>,

    /// Maximum number of `starve()` calls (started attempts) between feedings.
    pub max_events: Option<u64>,
}

impl StarvePolicy {
    /// Policy limited by elapsed time only.
    pub fn timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            max_events: None,
        }
    }

    /// Policy limited by attempt count only.
    pub fn max_events(max_events: u64) -> Self {
        Self {
            timeout: None,
            max_events: Some(max_events),
        }
    }

    /// Policy limited by both elapsed time and attempt count; breaching
    /// either one starves the watcher.
    pub fn both(timeout: Duration, max_events: u64) -> Self {
        Self {
            timeout: Some(timeout),
            max_events: Some(max_events),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), HouseError> {
        if self.timeout.is_none() && self.max_events.is_none() {
            return Err(HouseError::InvalidPolicy {
                reason: "must supply a timeout or max_events".to_string(),
            });
        }
        if self.timeout == Some(Duration::ZERO) {
            return Err(HouseError::InvalidPolicy {
                reason: "timeout must be positive".to_string(),
            });
        }
        if self.max_events == Some(0) {
            return Err(HouseError::InvalidPolicy {
                reason: "max_events must be positive".to_string(),
            });
        }
        Ok(())
    }
}
