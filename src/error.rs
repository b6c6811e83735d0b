//! Error types for doghouse
//!
//! All errors surface synchronously at the call site that caused them; there
//! is no background error channel and no automatic retry. If a starvation
//! condition persists across cycles, recovery simply fires again on the next
//! `check()`.

use thiserror::Error;

/// Result type alias for doghouse operations.
pub type Result<T> = std::result::Result<T, HouseError>;

/// Error returned by a caller-supplied recovery callback.
pub type ResetFnError = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for doghouse
#[derive(Error, Debug)]
pub enum HouseError {
    /// The starvation policy supplied to `adopt()` is unusable. Not retried;
    /// the caller must fix the call site.
    #[error("invalid starve policy: {reason}")]
    InvalidPolicy { reason: String },

    /// A watcher with this name is already registered. The original watcher
    /// is left untouched.
    #[error("watcher already adopted: {name}")]
    DuplicateName { name: String },

    /// `abandon()` was called for a name the house does not know.
    #[error("no watcher named: {name}")]
    NotFound { name: String },

    /// A recovery callback failed while starved watchers were being handled.
    /// Remaining callbacks were skipped, but every watcher was still reset
    /// before this error propagated, so monitoring does not get stuck.
    #[error("reset function {index} failed while recovering from starved watchers {starved:?}: {source}")]
    Recovery {
        /// 0-based index of the failing reset function, in registration order.
        index: usize,
        /// Names of the watchers that were starved, sorted.
        starved: Vec<String>,
        /// The callback's own error.
        #[source]
        source: ResetFnError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recovery_error_names_the_failing_function() {
        let err = HouseError::Recovery {
            index: 1,
            starved: vec!["spot".to_string()],
            source: "restart failed".into(),
        };
        let message = err.to_string();
        assert!(message.contains("reset function 1"));
        assert!(message.contains("spot"));
        assert!(message.contains("restart failed"));
    }

    #[test]
    fn test_duplicate_name_error_names_the_watcher() {
        let err = HouseError::DuplicateName {
            name: "tops".to_string(),
        };
        assert!(err.to_string().contains("tops"));
    }
}
