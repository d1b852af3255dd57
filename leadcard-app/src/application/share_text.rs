use super::relative_time::verified_from_now;
use super::services::{Clipboard, ShareTarget};
use super::NotificationChannel;
use crate::domain::RecordFields;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const COPIED_MESSAGE: &str = "Information Copied to Clipboard";
const FOOTER_PREFIX: &str = "To find more such covid related information leads, visit:";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShareOutcome {
    Shared,
    Unavailable,
    Failed,
}

pub struct ShareTextComposer {
    origin: String,
    clipboard: Arc<dyn Clipboard>,
    share_target: Option<Arc<dyn ShareTarget>>,
    notifications: NotificationChannel,
}

impl ShareTextComposer {
    pub fn new(
        origin: String,
        clipboard: Arc<dyn Clipboard>,
        share_target: Option<Arc<dyn ShareTarget>>,
        notifications: NotificationChannel,
    ) -> Self {
        Self {
            origin,
            clipboard,
            share_target,
            notifications,
        }
    }

    pub fn compose(&self, record: &RecordFields) -> String {
        self.compose_at(record, Utc::now())
    }

    /// Builds the summary with "Last Verified" measured against `now`.
    pub fn compose_at(&self, record: &RecordFields, now: DateTime<Utc>) -> String {
        let mut lines: Vec<String> = Vec::new();

        if let Some(resource_type) = record.resource_type() {
            lines.push(format!("{} lead information", resource_type));
        }
        if let Some(title) = record.title() {
            lines.push(title.to_string());
        }
        if let Some(last_verified) = record.last_verified() {
            lines.push(format!(
                "Last Verified: {}",
                verified_from_now(last_verified, now)
            ));
        }
        if let Some(phone) = record.phone() {
            lines.push(format!("Phone Number - {}", phone));
        }
        if let Some(state) = record.state() {
            lines.push(format!("State - {}", state));
        }
        if let Some(city) = record.city() {
            lines.push(format!("City - {}", city));
        }
        if let Some(location) = record.location() {
            lines.push(format!("Address - {}", location));
        }
        if let Some(details) = record.details() {
            lines.push(format!("Other details - {}", details));
        }

        lines.push(String::new());
        lines.push(format!("{} {}", FOOTER_PREFIX, self.origin));
        lines.join("\n")
    }

    /// Copies the summary and tells the user it was copied.
    ///
    /// Clipboard errors are logged but the user still sees the copied message.
    pub async fn compose_for_clipboard(&self, record: &RecordFields) -> String {
        let text = self.compose(record);
        if let Err(e) = self.clipboard.write_text(&text).await {
            tracing::warn!("Clipboard write failed for ticket {}: {}", record.ticket_id, e);
        }
        self.notifications.post(COPIED_MESSAGE);
        text
    }

    pub fn can_share(&self) -> bool {
        self.share_target.is_some()
    }

    /// Hands the summary to the share target when one is available. The
    /// outcome never reaches the notification channel.
    pub async fn compose_for_share(&self, record: &RecordFields) -> ShareOutcome {
        let Some(target) = &self.share_target else {
            tracing::debug!("No share target configured, skipping share");
            return ShareOutcome::Unavailable;
        };

        let title = share_title(record);
        let text = self.compose(record);
        match target.share(&title, &text).await {
            Ok(()) => {
                tracing::info!("Shared ticket {}", record.ticket_id);
                ShareOutcome::Shared
            }
            Err(e) => {
                tracing::warn!("Error sharing ticket {}: {}", record.ticket_id, e);
                ShareOutcome::Failed
            }
        }
    }
}

fn share_title(record: &RecordFields) -> String {
    match record.resource_type() {
        Some(resource_type) => format!("{} Lead", resource_type),
        None => "Lead".to_string(),
    }
}
