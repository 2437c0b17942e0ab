//! Call-reminder processing.
//!
//! A reminder job is a snapshot of a call taken when the call was
//! confirmed. Between then and the fire instant the call can be
//! rescheduled or canceled, or the squad deleted, so every job is
//! re-validated against the authoritative record before anything is sent.
//! Stale jobs are deleted outright; there is nothing left to remind about.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use database::models::{call_status, job_source};
use database::{call, reminder, squad, Database, ReminderJob};
use tracing::{info, warn};

use crate::error::Result;
use crate::localtime::{parse_rfc3339, rfc3339};
use crate::sender::ChannelSender;

/// Page size for one batch of due jobs.
pub const DEFAULT_PAGE_SIZE: i64 = 50;

/// Where a job's authoritative call lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallSource {
    /// Premium path: the squad carries its schedule inline.
    Inline,
    /// Standard path: a voted call record.
    Referenced {
        /// The authoritative call record's id.
        call_id: String,
    },
}

impl CallSource {
    /// Classify a job by its stored source. `None` means the job cannot
    /// be resolved at all (unknown source, or a call_ref job that lost
    /// its pointer) and is treated as stale.
    pub fn from_job(job: &ReminderJob) -> Option<Self> {
        match job.source.as_str() {
            job_source::INLINE => Some(Self::Inline),
            job_source::CALL_REF => job
                .call_id
                .clone()
                .map(|call_id| Self::Referenced { call_id }),
            _ => None,
        }
    }
}

/// Validated call details used to format the reminder message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSnapshot {
    /// Call start instant, UTC.
    pub datetime_utc: String,
    /// Timezone the call is scheduled in.
    pub timezone: String,
    /// Meeting location or link.
    pub location: Option<String>,
    /// Call title.
    pub title: String,
}

/// Terminal state a job reached this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    /// The job was marked sent (possibly with a no-channel note).
    Sent,
    /// The job was stale and deleted.
    Discarded,
}

/// Resolve the authoritative call for a job, or `None` when the job is
/// stale: owning squad gone, call pointer dangling, call unconfirmed, or
/// the start time moved since the snapshot was taken.
pub async fn resolve_authoritative_call(
    db: &Database,
    job: &ReminderJob,
) -> Result<Option<CallSnapshot>> {
    let Some(owner) = squad::find_squad(db.pool(), &job.squad_id).await? else {
        return Ok(None);
    };

    let Some(source) = CallSource::from_job(job) else {
        return Ok(None);
    };

    let current = match source {
        CallSource::Inline => match owner.call_datetime_utc.as_deref() {
            Some(current) => current.to_string(),
            None => return Ok(None),
        },
        CallSource::Referenced { call_id } => {
            let Some(record) = call::find_call(db.pool(), &call_id).await? else {
                return Ok(None);
            };
            if record.status != call_status::CONFIRMED {
                return Ok(None);
            }
            record.start_datetime_utc
        }
    };

    if !same_instant(&current, &job.call_datetime_utc) {
        return Ok(None);
    }

    // The snapshot is proven current, so the job's own fields are safe to
    // format the message from.
    Ok(Some(CallSnapshot {
        datetime_utc: job.call_datetime_utc.clone(),
        timezone: job.timezone.clone(),
        location: job.location.clone(),
        title: job.title.clone(),
    }))
}

/// Drive one job to a terminal state.
///
/// Errors from the chat provider or the store bubble up to the caller,
/// which records them on the job and moves on; the job stays unsent and
/// is retried on the next run.
pub async fn process_job(
    db: &Database,
    chat: &dyn ChannelSender,
    job: &ReminderJob,
    now: DateTime<Utc>,
) -> Result<JobOutcome> {
    let Some(snapshot) = resolve_authoritative_call(db, job).await? else {
        info!(job_id = %job.id, "Discarding stale reminder job");
        reminder::delete_job(db.pool(), &job.id).await?;
        return Ok(JobOutcome::Discarded);
    };

    // A job with no channel can never be delivered; marking it sent with a
    // note is the terminal state, not an endless retry.
    let Some(channel_id) = job.chat_channel_id.as_deref() else {
        warn!(job_id = %job.id, "Reminder job has no chat channel");
        reminder::mark_sent(
            db.pool(),
            &job.id,
            &rfc3339(&now),
            Some("no chat channel to deliver to"),
        )
        .await?;
        return Ok(JobOutcome::Sent);
    };

    chat.ensure_sender().await?;
    chat.send_to_channel(channel_id, &format_reminder(&snapshot)).await?;

    reminder::mark_sent(db.pool(), &job.id, &rfc3339(&now), None).await?;
    info!(job_id = %job.id, channel_id = %channel_id, "Call reminder sent");
    Ok(JobOutcome::Sent)
}

/// Format the chat message for a validated call.
pub fn format_reminder(snapshot: &CallSnapshot) -> String {
    let when = parse_rfc3339(&snapshot.datetime_utc)
        .map(|instant| {
            let zone: Tz = snapshot.timezone.parse().unwrap_or(Tz::UTC);
            instant
                .with_timezone(&zone)
                .format("%A at %H:%M %Z")
                .to_string()
        })
        .unwrap_or_else(|| snapshot.datetime_utc.clone());

    match snapshot.location.as_deref() {
        Some(location) => format!(
            "Reminder: {} is coming up {}. Where: {}",
            snapshot.title, when, location
        ),
        None => format!("Reminder: {} is coming up {}.", snapshot.title, when),
    }
}

/// Whether two stored instants denote the same moment. Unparseable values
/// never match; a corrupted snapshot reads as stale rather than sending a
/// reminder for the wrong time.
fn same_instant(a: &str, b: &str) -> bool {
    match (parse_rfc3339(a), parse_rfc3339(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}
