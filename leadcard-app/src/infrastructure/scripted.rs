//! In-process stand-ins for the remote capabilities, used by tests and local
//! runs without a ticket backend.

use crate::application::{ShareTarget, TicketVoteService};
use crate::domain::{VoteAck, VoteDirection};
use async_trait::async_trait;
use leadcard_errors::AppError;
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::oneshot;

enum Reply {
    Ack(VoteAck),
    Error(AppError),
    Gated(VoteAck, oneshot::Receiver<()>),
}

/// Replays queued replies in order, one per call, and records every call.
#[derive(Default)]
pub struct ScriptedVoteService {
    replies: Mutex<VecDeque<Reply>>,
    calls: Mutex<Vec<(VoteDirection, String)>>,
}

impl ScriptedVoteService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_ack(&self, ack: VoteAck) {
        self.push(Reply::Ack(ack));
    }

    pub fn push_error(&self, error: AppError) {
        self.push(Reply::Error(error));
    }

    /// Queues an ack that is only delivered once `gate` fires.
    pub fn push_gated_ack(&self, ack: VoteAck, gate: oneshot::Receiver<()>) {
        self.push(Reply::Gated(ack, gate));
    }

    pub fn calls(&self) -> Vec<(VoteDirection, String)> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn push(&self, reply: Reply) {
        self.replies
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push_back(reply);
    }

    async fn answer(&self, direction: VoteDirection, ticket_id: &str) -> Result<VoteAck, AppError> {
        let reply = {
            self.calls
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .push((direction, ticket_id.to_string()));
            self.replies
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .pop_front()
        };

        match reply {
            Some(Reply::Ack(ack)) => Ok(ack),
            Some(Reply::Error(error)) => Err(error),
            Some(Reply::Gated(ack, gate)) => {
                gate.await
                    .map_err(|_| AppError::TransportFailure("gate dropped".to_string()))?;
                Ok(ack)
            }
            None => Err(AppError::TransportFailure(
                "no scripted reply left".to_string(),
            )),
        }
    }
}

#[async_trait]
impl TicketVoteService for ScriptedVoteService {
    async fn upvote_ticket(&self, ticket_id: &str) -> Result<VoteAck, AppError> {
        self.answer(VoteDirection::Up, ticket_id).await
    }

    async fn downvote_ticket(&self, ticket_id: &str) -> Result<VoteAck, AppError> {
        self.answer(VoteDirection::Down, ticket_id).await
    }
}

/// Share target that keeps what it was handed.
#[derive(Default)]
pub struct RecordingShareTarget {
    shared: Mutex<Vec<(String, String)>>,
    fail: bool,
}

impl RecordingShareTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// A target that rejects every share, like a user cancelling the sheet.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn shared(&self) -> Vec<(String, String)> {
        self.shared
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl ShareTarget for RecordingShareTarget {
    async fn share(&self, title: &str, text: &str) -> Result<(), AppError> {
        if self.fail {
            return Err(AppError::Share("share cancelled".to_string()));
        }
        self.shared
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((title.to_string(), text.to_string()));
        Ok(())
    }
}
