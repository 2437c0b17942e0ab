//! Database models.
//!
//! All timestamps are RFC 3339 UTC strings (`2026-08-06T17:00:00Z`), so
//! lexicographic comparison in SQL matches chronological order.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A member of the product, mirrored from the auth provider.
///
/// The billing columns are a read-only snapshot of the payment provider's
/// subscription state; this crate never computes billing, only stores it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Auth provider user id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// IANA timezone (e.g. "America/New_York"). Missing or invalid values
    /// fall back to UTC at evaluation time.
    pub timezone: Option<String>,
    /// Whether the user finished onboarding.
    pub onboarding_completed: bool,
    /// Subscription status: none, active, trialing, canceled, past_due.
    pub billing_status: Option<String>,
    /// End of the current billing period, if any.
    pub current_period_end: Option<String>,
}

/// A morning or evening check-in record for one local day.
///
/// Created by the check-in handlers when the user acts; the scheduler only
/// reads `completed_at` to suppress same-day notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct DailyCheckin {
    /// Owning user.
    pub user_id: String,
    /// Local calendar date (YYYY-MM-DD) in the user's timezone.
    pub local_date: String,
    /// "morning_checkin" or "evening_checkin".
    pub kind: String,
    /// When the check-in was completed, if it was.
    pub completed_at: Option<String>,
}

/// A weekly reflection record, keyed by the ISO Monday date of the week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct WeeklyReflection {
    /// Owning user.
    pub user_id: String,
    /// Monday date of the ISO week (YYYY-MM-DD).
    pub week_id: String,
    /// When the reflection was completed, if it was.
    pub completed_at: Option<String>,
}

/// An in-app notification. Immutable once created except for `is_read`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct NotificationRecord {
    /// Notification id.
    pub id: String,
    /// Recipient user.
    pub user_id: String,
    /// Notification kind (see the scheduler's `NotificationKind`).
    pub kind: String,
    /// Short title shown in the notification list.
    pub title: String,
    /// Body text.
    pub body: String,
    /// In-app route the notification links to.
    pub action_route: String,
    /// Creation instant, UTC.
    pub created_at: String,
    /// Whether the user has opened the notification.
    pub is_read: bool,
}

/// An accountability squad. The owning entity for scheduled calls.
///
/// Premium squads hold their current call schedule inline in the `call_*`
/// fields; standard squads vote on calls that live in the `calls` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Squad {
    /// Squad id.
    pub id: String,
    /// Squad display name.
    pub name: String,
    /// Whether this squad is on the premium (coach-scheduled) plan.
    pub premium: bool,
    /// Chat provider channel for the squad, once provisioned.
    pub chat_channel_id: Option<String>,
    /// Premium path: current call start instant, UTC.
    pub call_datetime_utc: Option<String>,
    /// Premium path: timezone the call is scheduled in.
    pub call_timezone: Option<String>,
    /// Premium path: meeting location or link.
    pub call_location: Option<String>,
    /// Premium path: call title.
    pub call_title: Option<String>,
}

/// The authoritative record for a scheduled squad call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct CallRecord {
    /// Call id.
    pub id: String,
    /// Owning squad.
    pub squad_id: String,
    /// "pending", "confirmed", or "canceled".
    pub status: String,
    /// Call start instant, UTC.
    pub start_datetime_utc: String,
    /// Timezone the call was scheduled in (for display).
    pub timezone: String,
    /// Meeting location or link, if any.
    pub location: Option<String>,
    /// Call title.
    pub title: String,
}

/// A scheduled chat reminder for an upcoming call.
///
/// Created when a call is confirmed; consumed exactly once by the batch
/// processor. The call fields are a snapshot taken at creation time and are
/// validated against the authoritative record at fire time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ReminderJob {
    /// Job id (one job per squad or coaching client).
    pub id: String,
    /// Owning squad.
    pub squad_id: String,
    /// "inline" (premium snapshot) or "call_ref" (voted call pointer).
    pub source: String,
    /// Referenced call id, for "call_ref" jobs.
    pub call_id: Option<String>,
    /// Snapshot of the call start instant, UTC.
    pub call_datetime_utc: String,
    /// Snapshot of the call timezone.
    pub timezone: String,
    /// Snapshot of the call location.
    pub location: Option<String>,
    /// Snapshot of the call title.
    pub title: String,
    /// Chat channel to post the reminder in.
    pub chat_channel_id: Option<String>,
    /// Instant the reminder becomes due, UTC.
    pub reminder_time_utc: String,
    /// Set once, after a delivery attempt resolved.
    pub sent: bool,
    /// When the reminder was sent.
    pub sent_at: Option<String>,
    /// Last delivery error, if any.
    pub error: Option<String>,
    /// When the last delivery error happened.
    pub last_error_at: Option<String>,
}

/// Reminder job source discriminants stored in the `source` column.
pub mod job_source {
    /// Premium path: the job carries the call snapshot inline.
    pub const INLINE: &str = "inline";
    /// Standard path: the job points at a voted call record.
    pub const CALL_REF: &str = "call_ref";
}

/// Call status values stored in the `status` column.
pub mod call_status {
    pub const PENDING: &str = "pending";
    pub const CONFIRMED: &str = "confirmed";
    pub const CANCELED: &str = "canceled";
}
