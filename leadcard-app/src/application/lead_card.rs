use super::{
    verified_from_now, Clipboard, NotificationChannel, ShareOutcome, ShareTarget,
    ShareTextComposer, TicketVoteService, VoteController, VoteOutcome,
};
use crate::domain::{parse_initial_count, CardSnapshot, RecordFields};
use crate::infrastructure::clipboard::MemoryClipboard;
use chrono::Utc;
use leadcard_errors::AppError;
use serde_json::Value;
use std::sync::Arc;

/// Capabilities shared by every card built from the same context.
#[derive(Clone)]
pub struct CardServices {
    pub vote_service: Arc<dyn TicketVoteService>,
    /// Shared clipboard; when `None` every card keeps its own copied text.
    pub clipboard: Option<Arc<dyn Clipboard>>,
    pub share_target: Option<Arc<dyn ShareTarget>>,
    pub origin: String,
}

/// One lead card: its record plus the vote, notification and share state
/// that live as long as the card does.
pub struct LeadCard {
    record: RecordFields,
    votes: VoteController,
    composer: ShareTextComposer,
    notifications: NotificationChannel,
    copied: Option<Arc<MemoryClipboard>>,
}

impl LeadCard {
    pub fn new(record: RecordFields, initial_count: Option<&Value>, services: &CardServices) -> Self {
        let notifications = NotificationChannel::new();
        let votes = VoteController::new(
            record.ticket_id.clone(),
            parse_initial_count(initial_count),
            services.vote_service.clone(),
            notifications.clone(),
        );
        let (clipboard, copied): (Arc<dyn Clipboard>, _) = match &services.clipboard {
            Some(shared) => (shared.clone(), None),
            None => {
                let own = Arc::new(MemoryClipboard::new());
                (own.clone(), Some(own))
            }
        };
        let composer = ShareTextComposer::new(
            services.origin.clone(),
            clipboard,
            services.share_target.clone(),
            notifications.clone(),
        );

        Self {
            record,
            votes,
            composer,
            notifications,
            copied,
        }
    }

    pub fn record(&self) -> &RecordFields {
        &self.record
    }

    /// Last text copied from this card, when it copies into its own memory.
    pub fn last_copied(&self) -> Option<String> {
        self.copied.as_ref().and_then(|clipboard| clipboard.contents())
    }

    pub fn can_share(&self) -> bool {
        self.composer.can_share()
    }

    /// "verified ..." phrase as of now, when the record carries a stamp.
    pub fn verified_ago(&self) -> Option<String> {
        self.record
            .last_verified()
            .map(|stamp| verified_from_now(stamp, Utc::now()))
    }

    pub async fn upvote(&self) -> Result<VoteOutcome, AppError> {
        self.votes.upvote().await
    }

    pub async fn downvote(&self) -> Result<VoteOutcome, AppError> {
        self.votes.downvote().await
    }

    pub fn share_text(&self) -> String {
        self.composer.compose(&self.record)
    }

    pub async fn copy_to_clipboard(&self) -> String {
        self.composer.compose_for_clipboard(&self.record).await
    }

    pub async fn share(&self) -> ShareOutcome {
        self.composer.compose_for_share(&self.record).await
    }

    pub fn dismiss_notification(&self) {
        self.notifications.dismiss();
    }

    pub fn snapshot(&self) -> CardSnapshot {
        CardSnapshot::new(
            self.record.ticket_id.clone(),
            self.votes.vote_state(),
            self.votes.permissions(),
            self.notifications.current(),
        )
    }
}
