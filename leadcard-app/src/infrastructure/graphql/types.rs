use crate::domain::VoteAck;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const UPVOTE_TICKET: &str = "mutation($ticketId: String) {
  upvoteTicket(input: { ticketId: $ticketId }) {
    status
    message
  }
}";

pub const DOWNVOTE_TICKET: &str = "mutation($ticketId: String) {
  downvoteTicket(input: { ticketId: $ticketId }) {
    status
    message
  }
}";

#[derive(Debug, Serialize)]
pub struct GraphqlRequest<'a> {
    pub query: &'a str,
    pub variables: TicketVariables<'a>,
}

#[derive(Debug, Serialize)]
pub struct TicketVariables<'a> {
    #[serde(rename = "ticketId")]
    pub ticket_id: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct GraphqlResponse {
    #[serde(default)]
    pub data: Option<HashMap<String, Option<VoteAck>>>,
    #[serde(default)]
    pub errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
pub struct GraphqlError {
    pub message: String,
}

impl<'a> GraphqlRequest<'a> {
    pub fn new(query: &'a str, ticket_id: &'a str) -> Self {
        Self {
            query,
            variables: TicketVariables { ticket_id },
        }
    }
}

impl GraphqlResponse {
    /// Pulls the mutation payload stored under `field`, if any.
    pub fn take_payload(&mut self, field: &str) -> Option<VoteAck> {
        self.data.as_mut()?.remove(field).flatten()
    }
}
