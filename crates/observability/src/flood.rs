//! Complain/relief flood control.
//!
//! Rate-limits repeated error logs from one call-site: the first failure
//! always logs, then the site stays quiet for `interval` calls before logging
//! again. A matching relief call emits exactly one recovery line once the
//! condition clears.
//!
//! Each call-site owns one [`Complaint`]; a site driven from multiple threads
//! must serialize its own updates.

use contracts::Severity;
use tracing::{error, info, warn};

/// Per-call-site suppression state.
///
/// Two logical states: Armed (`delay == 0`, may log) and Quiet (`delay > 0`,
/// suppressed). Zero-initialized state is Armed, so the first failure always
/// logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Complaint {
    /// Calls to stay quiet after logging. `0` logs on every call.
    interval: u32,
    /// Remaining suppressed calls.
    delay: u32,
    /// Whether a complaint was emitted since the last relief.
    complained: bool,
}

impl Complaint {
    /// State that suppresses `interval` calls between logged complaints.
    pub fn new(interval: u32) -> Self {
        Self {
            interval,
            delay: 0,
            complained: false,
        }
    }

    /// Whether the next [`complain`] call would log.
    pub fn armed(&self) -> bool {
        self.delay == 0
    }
}

/// Report a recurring failure, logging only when the state is Armed.
///
/// On a logged complaint the state turns Quiet for `max(1, interval)` calls
/// (an interval of zero never suppresses). Quiet calls decrement the delay
/// silently; reaching zero re-arms, so the next call logs again.
///
/// Returns whether a line was emitted.
pub fn complain(severity: Severity, state: &mut Complaint, message: &str) -> bool {
    if state.delay > 0 {
        state.delay -= 1;
        return false;
    }
    if state.interval > 0 {
        state.delay = state.interval.max(1);
    }
    state.complained = true;
    emit(severity, message);
    true
}

/// Report recovery from a previously complained-about condition.
///
/// Logs exactly one recovery line if a complaint was emitted since the last
/// relief, then resets the state to Armed. A no-op otherwise.
///
/// Returns whether a line was emitted.
pub fn relief(severity: Severity, state: &mut Complaint, message: &str) -> bool {
    if !state.complained {
        return false;
    }
    state.complained = false;
    state.delay = 0;
    emit(severity, message);
    true
}

fn emit(severity: Severity, message: &str) {
    match severity {
        Severity::Failure => error!(severity = %severity, "{message}"),
        Severity::Warning => warn!(severity = %severity, "{message}"),
        Severity::Okay => info!(severity = %severity, "{message}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_complaint_always_logs() {
        let mut state = Complaint::default();
        assert!(complain(Severity::Failure, &mut state, "down"));
    }

    #[test]
    fn interval_three_logs_every_fourth_call() {
        let mut state = Complaint::new(3);
        let mut logged = Vec::new();
        for call in 1..=13 {
            if complain(Severity::Failure, &mut state, "down") {
                logged.push(call);
            }
        }
        assert_eq!(logged, vec![1, 5, 9, 13]);
    }

    #[test]
    fn zero_interval_never_suppresses() {
        let mut state = Complaint::new(0);
        for _ in 0..5 {
            assert!(complain(Severity::Warning, &mut state, "flaky"));
        }
    }

    #[test]
    fn relief_without_prior_complaint_is_noop() {
        let mut state = Complaint::new(3);
        assert!(!relief(Severity::Okay, &mut state, "healthy"));
    }

    #[test]
    fn relief_logs_once_and_rearms() {
        let mut state = Complaint::new(3);
        complain(Severity::Failure, &mut state, "down");
        complain(Severity::Failure, &mut state, "down"); // suppressed

        assert!(relief(Severity::Okay, &mut state, "recovered"));
        assert!(!relief(Severity::Okay, &mut state, "recovered"));

        // Re-armed: the next complaint logs immediately.
        assert!(complain(Severity::Failure, &mut state, "down again"));
    }

    #[test]
    fn relief_applies_even_while_suppressed() {
        let mut state = Complaint::new(10);
        complain(Severity::Failure, &mut state, "down");
        assert!(!state.armed());

        assert!(relief(Severity::Okay, &mut state, "recovered"));
        assert!(state.armed());
    }
}
