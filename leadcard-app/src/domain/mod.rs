mod card;
mod notification;
mod record;
mod vote;

pub use card::CardSnapshot;
pub use notification::Notification;
pub use record::{LastVerified, RecordFields};
pub use vote::{parse_initial_count, PermissionFlags, VoteAck, VoteDirection, VotePhase, VoteState};
