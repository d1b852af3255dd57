use super::types::{GraphqlRequest, GraphqlResponse, DOWNVOTE_TICKET, UPVOTE_TICKET};
use crate::application::TicketVoteService;
use crate::domain::VoteAck;
use async_trait::async_trait;
use leadcard_errors::AppError;
use std::time::Duration;

pub struct GraphqlTicketClient {
    http_client: reqwest::Client,
    endpoint: url::Url,
}

impl GraphqlTicketClient {
    pub fn new(endpoint: url::Url, timeout: Duration) -> Result<Self, AppError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            endpoint,
        })
    }

    async fn mutate(&self, query: &str, field: &str, ticket_id: &str) -> Result<VoteAck, AppError> {
        let request = GraphqlRequest::new(query, ticket_id);

        let response = self
            .http_client
            .post(self.endpoint.clone())
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::TransportFailure(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!("GraphQL endpoint error: {} - {}", status, body);
            return Err(AppError::TransportFailure(format!("HTTP error: {}", status)));
        }

        let mut body: GraphqlResponse = response
            .json()
            .await
            .map_err(|e| AppError::TransportFailure(e.to_string()))?;

        if let Some(first) = body.errors.first() {
            return Err(AppError::rejected("graphql", first.message.clone()));
        }

        body.take_payload(field)
            .ok_or_else(|| AppError::rejected("", format!("No {} payload in response", field)))
    }
}

#[async_trait]
impl TicketVoteService for GraphqlTicketClient {
    async fn upvote_ticket(&self, ticket_id: &str) -> Result<VoteAck, AppError> {
        self.mutate(UPVOTE_TICKET, "upvoteTicket", ticket_id).await
    }

    async fn downvote_ticket(&self, ticket_id: &str) -> Result<VoteAck, AppError> {
        self.mutate(DOWNVOTE_TICKET, "downvoteTicket", ticket_id).await
    }
}
