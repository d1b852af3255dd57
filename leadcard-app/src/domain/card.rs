use super::{Notification, PermissionFlags, VotePhase, VoteState};
use serde::{Deserialize, Serialize};

/// Everything a rendering surface needs to draw one card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardSnapshot {
    pub ticket_id: String,
    pub vote: VoteState,
    pub permissions: PermissionFlags,
    pub phase: VotePhase,
    pub up_badge: Option<i64>,
    pub down_badge: Option<i64>,
    pub notification: Notification,
}

impl CardSnapshot {
    pub fn new(
        ticket_id: String,
        vote: VoteState,
        permissions: PermissionFlags,
        notification: Notification,
    ) -> Self {
        Self {
            ticket_id,
            up_badge: vote.up_badge(),
            down_badge: vote.down_badge(),
            phase: VotePhase::from(permissions),
            vote,
            permissions,
            notification,
        }
    }
}
