//! Capabilities the card core consumes from its environment.

use crate::domain::VoteAck;
use async_trait::async_trait;
use leadcard_errors::AppError;

/// Remote ticket vote mutations.
///
/// An `Ok` ack may still carry a failure status; the controller decides what
/// counts as accepted.
#[async_trait]
pub trait TicketVoteService: Send + Sync {
    async fn upvote_ticket(&self, ticket_id: &str) -> Result<VoteAck, AppError>;

    async fn downvote_ticket(&self, ticket_id: &str) -> Result<VoteAck, AppError>;
}

#[async_trait]
pub trait Clipboard: Send + Sync {
    async fn write_text(&self, text: &str) -> Result<(), AppError>;
}

/// Native share sheet (or whatever stands in for it).
#[async_trait]
pub trait ShareTarget: Send + Sync {
    async fn share(&self, title: &str, text: &str) -> Result<(), AppError>;
}
