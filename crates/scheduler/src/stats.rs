//! Run statistics.
//!
//! One counter bucket per item outcome. The stats object returned by a
//! pass is the engine's whole observability surface; nothing per-user
//! leaves the process by default.

use serde::Serialize;

use crate::eligibility::Eligibility;

/// Counters for one notification pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NotificationRunStats {
    /// Users examined.
    pub processed: u64,
    /// Notifications dispatched.
    pub sent: u64,
    /// Local hour did not match any schedule.
    pub skipped_wrong_time: u64,
    /// Suppressed by local weekend.
    pub skipped_weekend: u64,
    /// Onboarding not finished.
    pub skipped_not_onboarded: u64,
    /// Billing snapshot denied access.
    pub skipped_no_subscription: u64,
    /// Check-in/reflection already completed.
    pub skipped_already_done: u64,
    /// Equivalent notification already existed for the period.
    pub skipped_already_notified: u64,
    /// Per-user failures (the pass continued).
    pub errors: u64,
}

impl NotificationRunStats {
    /// Count one skip outcome.
    pub fn record_skip(&mut self, outcome: Eligibility) {
        match outcome {
            Eligibility::Due => {}
            Eligibility::WrongTime => self.skipped_wrong_time += 1,
            Eligibility::Weekend => self.skipped_weekend += 1,
            Eligibility::NotOnboarded => self.skipped_not_onboarded += 1,
            Eligibility::NoSubscription => self.skipped_no_subscription += 1,
            Eligibility::AlreadyDone => self.skipped_already_done += 1,
        }
    }
}

/// Counters for one call-reminder pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReminderRunStats {
    /// Jobs examined.
    pub processed: u64,
    /// Jobs that reached the Sent state this run.
    pub sent: u64,
    /// Jobs deleted because their call snapshot went stale.
    pub discarded_stale: u64,
    /// Per-job failures (job left unsent with the error recorded).
    pub errors: u64,
}
