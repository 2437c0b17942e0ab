//! Eligibility evaluation for recurring notifications.
//!
//! A notification is due only when the user's local clock, onboarding
//! state, billing access, and completion records all agree. The orchestrator
//! runs hourly and the hour checks are exact matches: a missed tick drops
//! that period's notification with no catch-up.

use chrono::{DateTime, Utc};
use database::{checkin, Database, User};
use serde::Serialize;

use crate::error::Result;
use crate::localtime::{parse_rfc3339, LocalTime};

/// Local hour at which the morning check-in reminder fires.
pub const MORNING_HOUR: u32 = 7;
/// Local hour at which the evening check-in reminder fires.
pub const EVENING_HOUR: u32 = 17;
/// Local hour at which the weekly reflection reminder fires (weekends only).
pub const WEEKLY_HOUR: u32 = 9;

/// The recurring notification kinds the engine can dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    MorningCheckin,
    EveningCheckinIncompleteTasks,
    EveningCheckinTasksCompleted,
    WeeklyReflection,
}

impl NotificationKind {
    /// The value stored in the notification record's `kind` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MorningCheckin => "morning_checkin",
            Self::EveningCheckinIncompleteTasks => "evening_checkin_incomplete_tasks",
            Self::EveningCheckinTasksCompleted => "evening_checkin_tasks_completed",
            Self::WeeklyReflection => "weekly_reflection",
        }
    }

    /// Kinds that are mutually substitutable for dedup purposes within one
    /// period. The two evening kinds are one class: a "tasks completed"
    /// congratulation and an "incomplete tasks" nudge never both fire on
    /// the same day.
    pub fn equivalence_class(&self) -> &'static [&'static str] {
        match self {
            Self::MorningCheckin => &["morning_checkin"],
            Self::EveningCheckinIncompleteTasks | Self::EveningCheckinTasksCompleted => &[
                "evening_checkin_incomplete_tasks",
                "evening_checkin_tasks_completed",
            ],
            Self::WeeklyReflection => &["weekly_reflection"],
        }
    }

    /// Whether the dedup/completion window is the week rather than the day.
    pub fn is_weekly(&self) -> bool {
        matches!(self, Self::WeeklyReflection)
    }

    /// Notification title.
    pub fn title(&self) -> &'static str {
        match self {
            Self::MorningCheckin => "Morning check-in",
            Self::EveningCheckinIncompleteTasks => "Evening check-in",
            Self::EveningCheckinTasksCompleted => "All tasks done!",
            Self::WeeklyReflection => "Weekly reflection",
        }
    }

    /// Default notification body.
    pub fn default_body(&self) -> &'static str {
        match self {
            Self::MorningCheckin => "Start your day: what will you get done today?",
            Self::EveningCheckinIncompleteTasks => {
                "You still have open tasks. Take two minutes to close out your day."
            }
            Self::EveningCheckinTasksCompleted => {
                "You finished everything you planned today. Log your evening check-in."
            }
            Self::WeeklyReflection => "Look back at your week and set up the next one.",
        }
    }

    /// In-app route the notification links to.
    pub fn action_route(&self) -> &'static str {
        match self {
            Self::MorningCheckin => "/checkin/morning",
            Self::EveningCheckinIncompleteTasks | Self::EveningCheckinTasksCompleted => {
                "/checkin/evening"
            }
            Self::WeeklyReflection => "/reflection",
        }
    }
}

/// Outcome of an eligibility evaluation. Every non-`Due` variant maps to
/// one skip counter in the run stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    /// All gates passed; the notification should be dispatched.
    Due,
    /// The local hour does not match this kind's schedule.
    WrongTime,
    /// Daily kinds are suppressed on local weekends.
    Weekend,
    /// The user has not finished onboarding.
    NotOnboarded,
    /// The billing snapshot does not grant access.
    NoSubscription,
    /// The corresponding check-in/reflection is already completed.
    AlreadyDone,
}

/// Billing access predicate, evaluated fresh each tick.
///
/// No snapshot at all grants access (legacy users predate billing and
/// absence of data must never block). Canceled subscriptions keep access
/// until the paid period ends.
pub fn has_active_access(
    billing_status: Option<&str>,
    current_period_end: Option<&str>,
    now: DateTime<Utc>,
) -> bool {
    let Some(status) = billing_status else {
        return true;
    };

    match status {
        "active" | "trialing" => true,
        "canceled" => current_period_end
            .and_then(parse_rfc3339)
            .map(|end| end > now)
            .unwrap_or(false),
        _ => false,
    }
}

/// Pure schedule gate: hour and weekday checks only.
///
/// Daily kinds fire on weekdays at their hour; the weekly reflection fires
/// at its hour on Saturday and Sunday (a weekday at 09 is simply the wrong
/// time for it, not a weekend suppression).
pub fn schedule_gate(kind: NotificationKind, local: &LocalTime) -> Eligibility {
    match kind {
        NotificationKind::MorningCheckin => {
            if local.hour != MORNING_HOUR {
                Eligibility::WrongTime
            } else if local.is_weekend() {
                Eligibility::Weekend
            } else {
                Eligibility::Due
            }
        }
        NotificationKind::EveningCheckinIncompleteTasks
        | NotificationKind::EveningCheckinTasksCompleted => {
            if local.hour != EVENING_HOUR {
                Eligibility::WrongTime
            } else if local.is_weekend() {
                Eligibility::Weekend
            } else {
                Eligibility::Due
            }
        }
        NotificationKind::WeeklyReflection => {
            if local.hour != WEEKLY_HOUR || !local.is_weekend() {
                Eligibility::WrongTime
            } else {
                Eligibility::Due
            }
        }
    }
}

/// Full eligibility evaluation for one user, one kind, one tick.
pub async fn evaluate(
    db: &Database,
    user: &User,
    kind: NotificationKind,
    now: DateTime<Utc>,
) -> Result<Eligibility> {
    let local = LocalTime::resolve(user.timezone.as_deref(), now);

    let gate = schedule_gate(kind, &local);
    if gate != Eligibility::Due {
        return Ok(gate);
    }

    if !user.onboarding_completed {
        return Ok(Eligibility::NotOnboarded);
    }

    if !has_active_access(
        user.billing_status.as_deref(),
        user.current_period_end.as_deref(),
        now,
    ) {
        return Ok(Eligibility::NoSubscription);
    }

    let completed = match kind {
        NotificationKind::MorningCheckin => {
            checkin::daily_completed(
                db.pool(),
                &user.id,
                &local.date_string(),
                checkin::checkin_kind::MORNING,
            )
            .await?
        }
        NotificationKind::EveningCheckinIncompleteTasks
        | NotificationKind::EveningCheckinTasksCompleted => {
            checkin::daily_completed(
                db.pool(),
                &user.id,
                &local.date_string(),
                checkin::checkin_kind::EVENING,
            )
            .await?
        }
        NotificationKind::WeeklyReflection => {
            checkin::weekly_completed(db.pool(), &user.id, &local.week_id()).await?
        }
    };

    if completed {
        return Ok(Eligibility::AlreadyDone);
    }

    Ok(Eligibility::Due)
}
