//! Notification dispatch.
//!
//! Creates the notification record and hands it to the push gateway. The
//! dedup guard is re-checked here, immediately before the write, so a
//! race between the orchestrator's pre-check and the insert still cannot
//! produce a second record for the period.

use chrono::{DateTime, Utc};
use database::{notification, Database, NotificationRecord, User};
use tracing::info;
use uuid::Uuid;

use crate::dedup;
use crate::eligibility::NotificationKind;
use crate::error::Result;
use crate::localtime::rfc3339;
use crate::sender::PushGateway;

/// Content of a notification to dispatch.
#[derive(Debug, Clone)]
pub struct NotificationPayload {
    /// Title shown in the notification list and push banner.
    pub title: String,
    /// Body text.
    pub body: String,
    /// In-app route the notification opens.
    pub action_route: String,
}

impl NotificationPayload {
    /// The standard payload for a recurring kind.
    pub fn for_kind(kind: NotificationKind) -> Self {
        Self {
            title: kind.title().to_string(),
            body: kind.default_body().to_string(),
            action_route: kind.action_route().to_string(),
        }
    }
}

/// Create and deliver one notification.
///
/// Returns the new record's id, or `None` when the guard says an
/// equivalent notification already exists for the period, a normal skip
/// the orchestrator counts separately from errors. Record creation is
/// exactly-once via the guard; gateway delivery is at-least-once, so a
/// failure after the write surfaces as an error while the record stands
/// and suppresses any retry's duplicate.
pub async fn dispatch(
    db: &Database,
    gateway: &dyn PushGateway,
    user: &User,
    kind: NotificationKind,
    payload: &NotificationPayload,
    now: DateTime<Utc>,
) -> Result<Option<String>> {
    if dedup::already_notified(db, user, kind, now).await? {
        return Ok(None);
    }

    let record = NotificationRecord {
        id: Uuid::new_v4().to_string(),
        user_id: user.id.clone(),
        kind: kind.as_str().to_string(),
        title: payload.title.clone(),
        body: payload.body.clone(),
        action_route: payload.action_route.clone(),
        created_at: rfc3339(&now),
        is_read: false,
    };
    notification::create_notification(db.pool(), &record).await?;

    gateway.deliver(&user.id, &payload.title, &payload.body).await?;

    info!(user_id = %user.id, kind = %kind.as_str(), "Notification dispatched");
    Ok(Some(record.id))
}
