use super::services::TicketVoteService;
use super::NotificationChannel;
use crate::domain::{PermissionFlags, VoteDirection, VotePhase, VoteState};
use leadcard_errors::{AppError, RETRY_LATER_MESSAGE};
use std::sync::{Arc, Mutex, MutexGuard};

/// What happened to a vote click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteOutcome {
    /// The service acknowledged the vote; carries the resulting state.
    Applied(VoteState),
    /// The direction is currently forbidden, nothing was sent.
    NotPermitted,
    /// A request in this direction is still outstanding, nothing was sent.
    AlreadyInFlight,
}

#[derive(Default)]
struct ControllerState {
    vote: VoteState,
    permissions: PermissionFlags,
    upvote_in_flight: bool,
    downvote_in_flight: bool,
}

impl ControllerState {
    fn in_flight_mut(&mut self, direction: VoteDirection) -> Option<&mut bool> {
        match direction {
            VoteDirection::Up => Some(&mut self.upvote_in_flight),
            VoteDirection::Down => Some(&mut self.downvote_in_flight),
            VoteDirection::None => None,
        }
    }
}

/// Vote state for one card.
///
/// Flags only flip once the service acknowledges a vote. Results are folded
/// into whatever the state is when they arrive, so concurrent clicks in
/// opposite directions never overwrite each other.
pub struct VoteController {
    ticket_id: String,
    service: Arc<dyn TicketVoteService>,
    notifications: NotificationChannel,
    state: Mutex<ControllerState>,
}

impl VoteController {
    pub fn new(
        ticket_id: String,
        initial_count: i64,
        service: Arc<dyn TicketVoteService>,
        notifications: NotificationChannel,
    ) -> Self {
        Self {
            ticket_id,
            service,
            notifications,
            state: Mutex::new(ControllerState {
                vote: VoteState::new(initial_count),
                ..ControllerState::default()
            }),
        }
    }

    pub fn vote_state(&self) -> VoteState {
        self.lock_state().vote
    }

    pub fn permissions(&self) -> PermissionFlags {
        self.lock_state().permissions
    }

    pub fn phase(&self) -> VotePhase {
        VotePhase::from(self.permissions())
    }

    pub fn is_in_flight(&self, direction: VoteDirection) -> bool {
        self.lock_state()
            .in_flight_mut(direction)
            .is_some_and(|flag| *flag)
    }

    pub async fn upvote(&self) -> Result<VoteOutcome, AppError> {
        self.cast(VoteDirection::Up).await
    }

    pub async fn downvote(&self) -> Result<VoteOutcome, AppError> {
        self.cast(VoteDirection::Down).await
    }

    async fn cast(&self, direction: VoteDirection) -> Result<VoteOutcome, AppError> {
        let _in_flight = match self.begin(direction) {
            Ok(guard) => guard,
            Err(outcome) => return Ok(outcome),
        };

        let response = match direction {
            VoteDirection::Up => self.service.upvote_ticket(&self.ticket_id).await,
            VoteDirection::Down => self.service.downvote_ticket(&self.ticket_id).await,
            VoteDirection::None => return Ok(VoteOutcome::NotPermitted),
        };

        let accepted = response.and_then(|ack| {
            if ack.is_success() {
                Ok(ack)
            } else {
                Err(AppError::rejected(ack.status, ack.message))
            }
        });

        match accepted {
            Ok(_) => {
                let mut state = self.lock_state();
                state.vote = state.vote.acknowledge(direction);
                state.permissions = state.permissions.after(direction);
                tracing::info!(
                    "Ticket {} {:?} vote acknowledged, count = {}",
                    self.ticket_id,
                    direction,
                    state.vote.count
                );
                Ok(VoteOutcome::Applied(state.vote))
            }
            Err(e) => {
                tracing::warn!("Ticket {} {:?} vote failed: {}", self.ticket_id, direction, e);
                self.notifications.post(RETRY_LATER_MESSAGE);
                Err(e)
            }
        }
    }

    /// Checks permission and marks the direction as in flight.
    fn begin(&self, direction: VoteDirection) -> Result<InFlightGuard<'_>, VoteOutcome> {
        let mut state = self.lock_state();
        if !state.permissions.allows(direction) {
            tracing::debug!("Ticket {} {:?} vote not permitted", self.ticket_id, direction);
            return Err(VoteOutcome::NotPermitted);
        }

        let Some(flag) = state.in_flight_mut(direction) else {
            return Err(VoteOutcome::NotPermitted);
        };
        if *flag {
            tracing::debug!("Ticket {} {:?} vote already in flight", self.ticket_id, direction);
            return Err(VoteOutcome::AlreadyInFlight);
        }
        *flag = true;

        Ok(InFlightGuard {
            controller: self,
            direction,
        })
    }

    fn lock_state(&self) -> MutexGuard<'_, ControllerState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Clears the in-flight mark when the request resolves or its future is dropped.
struct InFlightGuard<'a> {
    controller: &'a VoteController,
    direction: VoteDirection,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.controller.lock_state();
        if let Some(flag) = state.in_flight_mut(self.direction) {
            *flag = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{parse_initial_count, VoteAck};
    use crate::infrastructure::scripted::ScriptedVoteService;
    use serde_json::json;
    use tokio::sync::oneshot;

    fn controller(initial: i64, service: Arc<ScriptedVoteService>) -> (VoteController, NotificationChannel) {
        let notifications = NotificationChannel::new();
        let controller = VoteController::new(
            "ticket-1".to_string(),
            initial,
            service,
            notifications.clone(),
        );
        (controller, notifications)
    }

    #[tokio::test]
    async fn test_upvote_success_increments_and_flips_flags() {
        let service = Arc::new(ScriptedVoteService::new());
        service.push_ack(VoteAck::new("200", "ok"));
        let (controller, notifications) = controller(0, service.clone());

        let outcome = controller.upvote().await.unwrap();

        assert_eq!(
            outcome,
            VoteOutcome::Applied(VoteState { count: 1, direction: VoteDirection::Up })
        );
        assert_eq!(
            controller.permissions(),
            PermissionFlags { can_upvote: false, can_downvote: true }
        );
        assert_eq!(controller.phase(), VotePhase::Upvoted);
        assert!(!notifications.current().visible);
        assert_eq!(service.calls(), vec![(VoteDirection::Up, "ticket-1".to_string())]);
    }

    #[tokio::test]
    async fn test_downvote_success_decrements_below_zero() {
        let service = Arc::new(ScriptedVoteService::new());
        service.push_ack(VoteAck::new("200", "ok"));
        let (controller, _) = controller(0, service);

        controller.downvote().await.unwrap();

        assert_eq!(
            controller.vote_state(),
            VoteState { count: -1, direction: VoteDirection::Down }
        );
        assert_eq!(
            controller.permissions(),
            PermissionFlags { can_upvote: true, can_downvote: false }
        );
        assert_eq!(controller.vote_state().down_badge(), Some(-1));
    }

    #[tokio::test]
    async fn test_upvote_from_largest_count_does_not_overflow() {
        let service = Arc::new(ScriptedVoteService::new());
        service.push_ack(VoteAck::new("200", "ok"));
        let initial = parse_initial_count(Some(&json!("9223372036854775807")));
        let (controller, _) = controller(initial, service);

        let outcome = controller.upvote().await.unwrap();

        assert_eq!(
            outcome,
            VoteOutcome::Applied(VoteState { count: i64::MAX, direction: VoteDirection::Up })
        );
        assert_eq!(controller.phase(), VotePhase::Upvoted);
    }

    #[tokio::test]
    async fn test_forbidden_direction_sends_nothing() {
        let service = Arc::new(ScriptedVoteService::new());
        service.push_ack(VoteAck::new("200", "ok"));
        let (controller, _) = controller(5, service.clone());

        controller.upvote().await.unwrap();
        let before = (controller.vote_state(), controller.permissions());

        let outcome = controller.upvote().await.unwrap();

        assert_eq!(outcome, VoteOutcome::NotPermitted);
        assert_eq!((controller.vote_state(), controller.permissions()), before);
        assert_eq!(service.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_rejection_leaves_state_and_posts_retry() {
        let service = Arc::new(ScriptedVoteService::new());
        service.push_ack(VoteAck::new("500", "server error"));
        let (controller, notifications) = controller(2, service);

        let err = controller.upvote().await.unwrap_err();

        assert!(matches!(err, AppError::RemoteRejection { ref status, .. } if status == "500"));
        assert_eq!(controller.vote_state(), VoteState::new(2));
        assert_eq!(controller.permissions(), PermissionFlags::default());
        let notification = notifications.current();
        assert!(notification.visible);
        assert_eq!(notification.text, RETRY_LATER_MESSAGE);
    }

    #[tokio::test]
    async fn test_transport_failure_leaves_state_and_posts_retry() {
        let service = Arc::new(ScriptedVoteService::new());
        service.push_error(AppError::TransportFailure("connection reset".to_string()));
        let (controller, notifications) = controller(-1, service);

        let err = controller.downvote().await.unwrap_err();

        assert!(matches!(err, AppError::TransportFailure(_)));
        assert_eq!(controller.vote_state(), VoteState::new(-1));
        assert_eq!(controller.phase(), VotePhase::Neutral);
        assert_eq!(notifications.current().text, RETRY_LATER_MESSAGE);
        assert!(!controller.is_in_flight(VoteDirection::Down));
    }

    #[tokio::test]
    async fn test_toggle_between_voted_states() {
        let service = Arc::new(ScriptedVoteService::new());
        service.push_ack(VoteAck::new("200", "ok"));
        service.push_ack(VoteAck::new("200", "ok"));
        service.push_ack(VoteAck::new("200", "ok"));
        let (controller, _) = controller(0, service);

        controller.upvote().await.unwrap();
        controller.downvote().await.unwrap();
        assert_eq!(controller.phase(), VotePhase::Downvoted);
        assert_eq!(controller.vote_state().count, 0);

        controller.upvote().await.unwrap();
        assert_eq!(controller.phase(), VotePhase::Upvoted);
        assert_eq!(controller.vote_state().count, 1);
    }

    #[tokio::test]
    async fn test_second_click_while_in_flight_is_skipped() {
        let service = Arc::new(ScriptedVoteService::new());
        let (release, gate) = oneshot::channel();
        service.push_gated_ack(VoteAck::new("200", "ok"), gate);
        let (controller, _) = controller(0, service.clone());

        let first = controller.upvote();
        let second = async {
            tokio::task::yield_now().await;
            let outcome = controller.upvote().await;
            release.send(()).unwrap();
            outcome
        };
        let (first, second) = tokio::join!(first, second);

        assert_eq!(second.unwrap(), VoteOutcome::AlreadyInFlight);
        assert_eq!(
            first.unwrap(),
            VoteOutcome::Applied(VoteState { count: 1, direction: VoteDirection::Up })
        );
        assert_eq!(service.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_late_result_applies_to_current_state() {
        let service = Arc::new(ScriptedVoteService::new());
        let (release_up, gate_up) = oneshot::channel();
        service.push_gated_ack(VoteAck::new("200", "ok"), gate_up);
        service.push_ack(VoteAck::new("200", "ok"));
        let (controller, _) = controller(10, service);

        let up = controller.upvote();
        let down = async {
            tokio::task::yield_now().await;
            let outcome = controller.downvote().await;
            release_up.send(()).unwrap();
            outcome
        };
        let (up, down) = tokio::join!(up, down);

        assert!(matches!(down.unwrap(), VoteOutcome::Applied(_)));
        assert!(matches!(up.unwrap(), VoteOutcome::Applied(_)));
        // Both acknowledgments count: 10 - 1 + 1.
        assert_eq!(controller.vote_state().count, 10);
        assert_eq!(controller.phase(), VotePhase::Upvoted);
    }
}
