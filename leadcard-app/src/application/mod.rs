mod lead_card;
mod notification_channel;
mod relative_time;
mod services;
mod share_text;
mod vote_controller;

pub use lead_card::{CardServices, LeadCard};
pub use notification_channel::{NotificationChannel, NOTIFICATION_TIMEOUT};
pub use relative_time::verified_from_now;
pub use services::{Clipboard, ShareTarget, TicketVoteService};
pub use share_text::{ShareOutcome, ShareTextComposer, COPIED_MESSAGE};
pub use vote_controller::{VoteController, VoteOutcome};
