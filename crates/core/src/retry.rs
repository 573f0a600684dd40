//! Failure handling policy for catalog consumers
//!
//! The catalog client itself never retries. Consumers feed each failure into
//! a [`FailureTracker`], which answers whether to re-issue the same request
//! or give up and alert the user. A consumer shows a single alert and stops
//! loading, so no later failure is ever surfaced on top of it.

/// Automatic retries before a failure is surfaced
pub const DEFAULT_MAX_RETRIES: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailurePolicy {
    pub max_retries: u32,
}

impl Default for FailurePolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

/// What a consumer should do about a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureAction {
    /// Re-issue the failed request; `attempt` counts from 1
    Retry { attempt: u32 },
    /// Retries are exhausted; show the failure to the user
    Alert,
}

#[derive(Debug, Clone, Default)]
pub struct FailureTracker {
    policy: FailurePolicy,
    retries: u32,
}

impl FailureTracker {
    pub fn new(policy: FailurePolicy) -> Self {
        Self { policy, retries: 0 }
    }

    pub fn record_failure(&mut self) -> FailureAction {
        if self.retries < self.policy.max_retries {
            self.retries += 1;
            FailureAction::Retry {
                attempt: self.retries,
            }
        } else {
            FailureAction::Alert
        }
    }

    pub fn record_success(&mut self) {
        self.retries = 0;
    }

    pub fn retries(&self) -> u32 {
        self.retries
    }
}

/// User-facing text for a failure that exhausted its retries
pub fn alert_message(error: &str) -> String {
    format!("Apologies, a network error has occurred: {error}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retries_before_alert() {
        let mut tracker = FailureTracker::default();

        assert_eq!(tracker.record_failure(), FailureAction::Retry { attempt: 1 });
        assert_eq!(tracker.record_failure(), FailureAction::Retry { attempt: 2 });
        assert_eq!(tracker.record_failure(), FailureAction::Alert);
    }

    #[test]
    fn test_no_retries_alerts_immediately() {
        let mut tracker = FailureTracker::new(FailurePolicy { max_retries: 0 });

        assert_eq!(tracker.record_failure(), FailureAction::Alert);
        assert_eq!(tracker.retries(), 0);
    }

    #[test]
    fn test_success_resets_retries() {
        let mut tracker = FailureTracker::default();

        tracker.record_failure();
        tracker.record_failure();
        tracker.record_success();

        assert_eq!(tracker.retries(), 0);
        assert_eq!(tracker.record_failure(), FailureAction::Retry { attempt: 1 });
    }

    #[test]
    fn test_retries_are_counted_across_pages_until_success() {
        let mut tracker = FailureTracker::new(FailurePolicy { max_retries: 1 });

        assert_eq!(tracker.record_failure(), FailureAction::Retry { attempt: 1 });
        tracker.record_success();
        assert_eq!(tracker.record_failure(), FailureAction::Retry { attempt: 1 });
        assert_eq!(tracker.record_failure(), FailureAction::Alert);
    }

    #[test]
    fn test_alert_message() {
        assert_eq!(
            alert_message("connection refused"),
            "Apologies, a network error has occurred: connection refused"
        );
    }
}
